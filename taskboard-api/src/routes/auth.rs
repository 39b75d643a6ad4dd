/// Session endpoints
///
/// - `POST /v1/auth/login`: exchange email and password for a session token
/// - `GET  /v1/auth/validate-token`: check the bearer token, returns `{ userId }` (JWT)
/// - `POST /v1/auth/logout`: confirmation only; sessions are stateless and
///   the client drops its token
///
/// Registration lives under `/v1/users/register` (see [`super::users`]) and
/// issues a token through [`issue_token`] as well.

use super::MessageResponse;
use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{
        jwt::{create_token, Claims},
        middleware::AuthContext,
    },
    models::user::PublicUser,
};
use uuid::Uuid;
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Session token plus the public user view
#[derive(Debug, Serialize, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: PublicUser,
}

/// Identity behind a valid session token
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub user_id: Uuid,
}

/// Signs a session token for `user_id`
pub fn issue_token(state: &AppState, user_id: Uuid) -> ApiResult<String> {
    let claims = Claims::with_expiration(user_id, state.jwt_lifetime());
    Ok(create_token(&claims, state.jwt_secret())?)
}

/// Login
///
/// ```text
/// POST /v1/auth/login
/// { "email": "ada@example.com", "password": "secret1" }
/// ```
///
/// # Errors
///
/// - `422`: malformed body
/// - `401`: unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    req.validate()?;

    let user = state.accounts.authenticate(&req.email, &req.password).await?;
    let token = issue_token(&state, user.id)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(Json(AuthResponse { token, user }))
}

/// Validate the caller's session token
///
/// The auth layer has already rejected missing, expired and forged tokens
/// with `401` by the time this runs.
pub async fn validate_token(Extension(auth): Extension<AuthContext>) -> Json<TokenInfo> {
    Json(TokenInfo {
        user_id: auth.user_id,
    })
}

pub async fn logout() -> Json<MessageResponse> {
    Json(MessageResponse::new("Logged out successfully"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_validate_token_echoes_caller() {
        let user_id = Uuid::new_v4();

        let Json(info) = validate_token(Extension(AuthContext::new(user_id))).await;
        assert_eq!(info.user_id, user_id);

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["userId"], user_id.to_string());
    }

    #[tokio::test]
    async fn test_logout_confirms() {
        let Json(body) = logout().await;
        assert_eq!(body.message, "Logged out successfully");
    }
}
