/// User account endpoints
///
/// - `POST /v1/users/register`: create an account, returns `{ token, user }`
/// - `GET  /v1/users/profile`: caller's public profile (JWT)
/// - `GET  /v1/users/me`: same as `GET /profile` (JWT)
/// - `PUT  /v1/users/profile`: partial profile update (JWT)
/// - `PUT  /v1/users/password`: change password (JWT)
/// - `POST /v1/users/forgot-password`: email a reset link
/// - `POST /v1/users/reset-password/:token`: set a new password with a reset token

use super::{auth::issue_token, auth::AuthResponse, MessageResponse};
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::user::{ProfileUpdate, PublicUser},
    store::Registration,
};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: String,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 320, message = "Email is too long")
    )]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,

    #[validate(length(min = 1, max = 255, message = "Country must be 1 to 255 characters"))]
    pub country: String,

    /// Opaque reference to an already-uploaded photo
    #[serde(default)]
    #[validate(length(max = 1024, message = "Profile photo reference is too long"))]
    pub profile_photo: Option<String>,
}

/// Profile update request; omitted fields are left unchanged
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 255, message = "Name must be 1 to 255 characters"))]
    pub name: Option<String>,

    #[validate(
        email(message = "Invalid email format"),
        length(max = 320, message = "Email is too long")
    )]
    pub email: Option<String>,

    #[validate(length(min = 1, max = 255, message = "Country must be 1 to 255 characters"))]
    pub country: Option<String>,

    #[validate(length(max = 1024, message = "Profile photo reference is too long"))]
    pub profile_photo: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub new_password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters long"))]
    pub password: String,
}

/// Register a new user
///
/// ```text
/// POST /v1/users/register
/// {
///   "name": "Ada Lovelace",
///   "email": "ada@example.com",
///   "password": "secret1",
///   "country": "UK",
///   "profilePhoto": "https://cdn.example.com/ada.png"
/// }
/// ```
///
/// # Errors
///
/// - `422`: body validation failed
/// - `409`: email already registered
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    req.validate()?;

    let user = state
        .accounts
        .register(Registration {
            name: req.name,
            email: req.email,
            password: req.password,
            country: req.country,
            profile_photo: req.profile_photo,
        })
        .await?;

    let token = issue_token(&state, user.id)?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token, user })))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<PublicUser>> {
    Ok(Json(state.accounts.get_profile(auth.user_id).await?))
}

/// Update the caller's profile
///
/// # Errors
///
/// - `422`: a supplied field is empty or the email is malformed
/// - `409`: the new email belongs to another account
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<UpdateProfileRequest>,
) -> ApiResult<Json<PublicUser>> {
    req.validate()?;

    let user = state
        .accounts
        .update_profile(
            auth.user_id,
            ProfileUpdate {
                name: req.name,
                email: req.email,
                country: req.country,
                profile_photo: req.profile_photo,
            },
        )
        .await?;

    Ok(Json(user))
}

/// Change the caller's password
///
/// # Errors
///
/// - `401`: current password is wrong
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    state
        .accounts
        .change_password(auth.user_id, &req.current_password, &req.new_password)
        .await?;

    Ok(Json(MessageResponse::new("Password successfully updated")))
}

/// Email a password reset link
///
/// # Errors
///
/// - `404`: no account uses this email
/// - `500`: the email could not be delivered
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(req): Json<ForgotPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    state.accounts.request_password_reset(&req.email).await?;

    Ok(Json(MessageResponse::new(
        "Password reset link sent to your email",
    )))
}

/// Complete a password reset
///
/// # Errors
///
/// - `422`: new password too short
/// - `400`: token unknown, already used or expired
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    Json(req): Json<ResetPasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    req.validate()?;

    state
        .accounts
        .complete_password_reset(&token, &req.password)
        .await?;

    Ok(Json(MessageResponse::new("Password successfully updated")))
}
