//! Shared harness for HTTP tests
//!
//! Builds the full router over in-memory stores and a recording email
//! sender, so no database or SMTP relay is needed.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use taskboard_api::app::{build_router, AppState};
use taskboard_api::config::Config;
use taskboard_shared::email::RecordingEmailSender;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "test-secret-key-at-least-32-bytes-long";

pub struct TestContext {
    pub app: Router,
    pub outbox: RecordingEmailSender,
}

pub fn test_config(extra: &[(&str, &str)]) -> Config {
    let mut vars: HashMap<String, String> = [
        ("STORAGE_BACKEND", "memory"),
        ("JWT_SECRET", JWT_SECRET),
        ("FRONTEND_URL", "http://localhost:5173"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (k, v) in extra {
        vars.insert(k.to_string(), v.to_string());
    }

    Config::from_lookup(move |key| vars.get(key).cloned()).expect("test config should load")
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(test_config(&[]))
    }

    pub fn with_config(config: Config) -> Self {
        let outbox = RecordingEmailSender::new();
        let state = AppState::in_memory(config, Arc::new(outbox.clone()));

        Self {
            app: build_router(state),
            outbox,
        }
    }

    /// Sends a request and returns status plus parsed JSON body
    /// (`Value::Null` for an empty or non-JSON body)
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    /// Registers a user and returns `(token, user_id)`
    pub async fn register(&self, email: &str) -> (String, String) {
        let (status, body) = self
            .send(
                Method::POST,
                "/v1/users/register",
                None,
                Some(json!({
                    "name": "Ada Lovelace",
                    "email": email,
                    "password": "secret1",
                    "country": "UK"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);

        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_str().unwrap().to_string(),
        )
    }

    /// Plaintext token from the most recent reset email
    pub fn last_reset_token(&self) -> String {
        let body = self.outbox.last().expect("reset email should be sent").body;
        let start = body.find("/reset-password/").expect("link in body") + "/reset-password/".len();
        body[start..]
            .chars()
            .take_while(|c| c.is_ascii_hexdigit())
            .collect()
    }
}
