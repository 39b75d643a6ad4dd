//! # Taskboard Shared Library
//!
//! Domain types, persistence and auth primitives used by the Taskboard API.
//!
//! ## Module Organization
//!
//! - `models`: users, boards and tasks, with their SQL queries
//! - `store`: board and account services over Postgres or in-memory repositories
//! - `auth`: password hashing, JWT sessions, reset tokens, request authentication
//! - `email`: outbound email senders
//! - `db`: connection pool and migrations

pub mod auth;
pub mod db;
pub mod email;
pub mod models;
pub mod store;

/// Current version of the Taskboard shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
