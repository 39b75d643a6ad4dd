/// Board endpoints (all require a JWT)
///
/// - `POST   /v1/boards`: create a board with optional tasks
/// - `GET    /v1/boards`: caller's boards, newest first
/// - `GET    /v1/boards/:id`
/// - `PUT    /v1/boards/:id`: rename, optionally replacing all tasks
/// - `DELETE /v1/boards/:id`: delete the board and its tasks
///
/// Boards owned by someone else answer `404`, same as missing ones.

use super::MessageResponse;
use crate::{app::AppState, error::ApiResult};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::{board::Board, task::NewTask},
};
use uuid::Uuid;
use validator::Validate;

/// Create or update request
///
/// ```json
/// {
///   "name": "Sprint 1",
///   "tasks": [{ "title": "A" }, { "title": "B", "description": "...", "status": "DONE" }]
/// }
/// ```
#[derive(Debug, Deserialize, Validate)]
pub struct BoardRequest {
    #[validate(length(min = 1, max = 255, message = "Board name must be 1 to 255 characters"))]
    pub name: String,

    #[serde(default)]
    pub tasks: Option<Vec<NewTask>>,
}

pub async fn create_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(req): Json<BoardRequest>,
) -> ApiResult<(StatusCode, Json<Board>)> {
    req.validate()?;

    let board = state
        .boards
        .create_board(auth.user_id, &req.name, req.tasks.unwrap_or_default())
        .await?;

    Ok((StatusCode::CREATED, Json(board)))
}

pub async fn list_boards(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<Vec<Board>>> {
    Ok(Json(state.boards.list_boards(auth.user_id).await?))
}

pub async fn get_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<Board>> {
    Ok(Json(state.boards.get_board(auth.user_id, board_id).await?))
}

/// Rename a board; a non-empty `tasks` replaces every existing task
pub async fn update_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
    Json(req): Json<BoardRequest>,
) -> ApiResult<Json<Board>> {
    req.validate()?;

    let board = state
        .boards
        .update_board(auth.user_id, board_id, &req.name, req.tasks)
        .await?;

    Ok(Json(board))
}

pub async fn delete_board(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Path(board_id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    state.boards.delete_board(auth.user_id, board_id).await?;

    Ok(Json(MessageResponse::new("Board deleted successfully")))
}
