/// Middleware for the API server
///
/// - `security`: security response headers
///
/// Bearer authentication lives in [`crate::app`] next to the router, on top
/// of `taskboard_shared::auth::middleware`.

pub mod security;
