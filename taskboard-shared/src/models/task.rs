/// Task model and database operations
///
/// A task always belongs to exactly one board. Tasks are never written on
/// their own: every insert and delete here is driven by a board operation,
/// usually inside the board's transaction.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY,
///     board_id UUID NOT NULL REFERENCES boards(id) ON DELETE CASCADE,
///     title VARCHAR(255) NOT NULL CHECK (length(title) > 0),
///     description TEXT NOT NULL DEFAULT '',
///     status VARCHAR(50) NOT NULL DEFAULT 'TODO',
///     position INTEGER NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgExecutor};
use uuid::Uuid;

use super::check_text_column;
use crate::store::error::{StoreError, StoreResult};

/// Status assigned to tasks created without one
pub const DEFAULT_TASK_STATUS: &str = "TODO";

/// Column width of `tasks.title`
pub const MAX_TASK_TITLE_LEN: usize = 255;

/// Column width of `tasks.status`
pub const MAX_TASK_STATUS_LEN: usize = 50;

/// Task model
///
/// Serializes to `{ id, title, description, status, boardId }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Task title (required)
    pub title: String,

    /// Free-form description, empty by default
    pub description: String,

    /// Workflow status, `"TODO"` by default
    pub status: String,

    /// Board this task belongs to
    pub board_id: Uuid,

    /// Zero-based insertion order within the board
    #[serde(skip)]
    pub position: i32,

    /// When the task was created
    #[serde(skip)]
    pub created_at: DateTime<Utc>,
}

/// Input for a task created as part of a board operation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    /// Task title
    pub title: String,

    /// Optional description (defaults to empty)
    #[serde(default)]
    pub description: Option<String>,

    /// Optional status (defaults to `"TODO"`)
    #[serde(default)]
    pub status: Option<String>,
}

impl NewTask {
    /// Creates a task input with only a title
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Checks the title is present and every field fits its column
    pub fn validate(&self) -> StoreResult<()> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(StoreError::Validation("Task title is required".to_string()));
        }
        check_text_column("Task title", title, Some(MAX_TASK_TITLE_LEN))?;

        if let Some(status) = &self.status {
            check_text_column("Task status", status.trim(), Some(MAX_TASK_STATUS_LEN))?;
        }
        if let Some(description) = &self.description {
            check_text_column("Task description", description, None)?;
        }
        Ok(())
    }

    /// Materializes the task for `board_id` at `position`
    ///
    /// Missing or blank description/status fall back to their defaults.
    pub fn into_task(self, board_id: Uuid, position: i32, created_at: DateTime<Utc>) -> Task {
        let status = self
            .status
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_TASK_STATUS.to_string());

        Task {
            id: Uuid::new_v4(),
            title: self.title.trim().to_string(),
            description: self.description.unwrap_or_default(),
            status,
            board_id,
            position,
            created_at,
        }
    }
}

/// Validates every task in a replacement or creation set
pub fn validate_task_list(tasks: &[NewTask]) -> StoreResult<()> {
    tasks.iter().try_for_each(NewTask::validate)
}

impl Task {
    /// Inserts a set of tasks for a board, preserving the given order
    ///
    /// Expected to run on a transaction connection so that a failure part
    /// way through leaves nothing behind.
    pub async fn insert_many(
        conn: &mut PgConnection,
        board_id: Uuid,
        tasks: Vec<NewTask>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let now = Utc::now();
        let mut inserted = Vec::with_capacity(tasks.len());

        for (position, new_task) in tasks.into_iter().enumerate() {
            let task = new_task.into_task(board_id, position as i32, now);

            let row = sqlx::query_as::<_, Task>(
                r#"
                INSERT INTO tasks (id, board_id, title, description, status, position, created_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)
                RETURNING id, title, description, status, board_id, position, created_at
                "#,
            )
            .bind(task.id)
            .bind(task.board_id)
            .bind(&task.title)
            .bind(&task.description)
            .bind(&task.status)
            .bind(task.position)
            .bind(task.created_at)
            .fetch_one(&mut *conn)
            .await?;

            inserted.push(row);
        }

        Ok(inserted)
    }

    /// Lists the tasks of one board in insertion order
    pub async fn list_by_board<'e>(
        executor: impl PgExecutor<'e>,
        board_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, board_id, position, created_at
            FROM tasks
            WHERE board_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(board_id)
        .fetch_all(executor)
        .await
    }

    /// Lists the tasks of several boards, grouped by board then position
    pub async fn list_by_boards<'e>(
        executor: impl PgExecutor<'e>,
        board_ids: &[Uuid],
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, Task>(
            r#"
            SELECT id, title, description, status, board_id, position, created_at
            FROM tasks
            WHERE board_id = ANY($1)
            ORDER BY board_id, position ASC
            "#,
        )
        .bind(board_ids)
        .fetch_all(executor)
        .await
    }

    /// Deletes every task of a board, returning how many were removed
    pub async fn delete_by_board<'e>(
        executor: impl PgExecutor<'e>,
        board_id: Uuid,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE board_id = $1")
            .bind(board_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected())
    }
}
