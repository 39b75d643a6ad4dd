/// Board model and database operations
///
/// A board is owned by exactly one user and carries an ordered collection of
/// tasks. The task collection is not stored on the board row: it is derived
/// from `tasks.board_id`, which keeps the board/task relation consistent by
/// construction.
///
/// Every lookup here is scoped by `owner_id`. A board that exists but belongs
/// to someone else is reported exactly like a board that does not exist.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE boards (
///     id UUID PRIMARY KEY,
///     owner_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(255) NOT NULL CHECK (length(name) >= 3),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgExecutor;
use uuid::Uuid;

use super::check_text_column;
use super::task::Task;
use crate::store::error::{StoreError, StoreResult};

/// Minimum number of characters in a board name
pub const MIN_BOARD_NAME_LEN: usize = 3;

/// Maximum number of characters in a board name (column width)
pub const MAX_BOARD_NAME_LEN: usize = 255;

/// Board row without its tasks
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BoardRecord {
    /// Unique board ID
    pub id: Uuid,

    /// Owning user
    pub owner_id: Uuid,

    /// Board name (at least 3 characters)
    pub name: String,

    /// When the board was created
    pub created_at: DateTime<Utc>,

    /// When the board was last renamed or had its tasks replaced
    pub updated_at: DateTime<Utc>,
}

/// Board aggregate: the board together with its resolved tasks
///
/// Serializes to `{ id, name, ownerId, tasks, createdAt }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub owner_id: Uuid,
    pub tasks: Vec<Task>,
    pub created_at: DateTime<Utc>,
}

impl Board {
    /// Assembles the aggregate from its row and tasks
    pub fn from_parts(record: BoardRecord, tasks: Vec<Task>) -> Self {
        Self {
            id: record.id,
            name: record.name,
            owner_id: record.owner_id,
            tasks,
            created_at: record.created_at,
        }
    }
}

/// Validates a board name and returns it trimmed
///
/// # Errors
///
/// `StoreError::Validation` if the trimmed name is empty, shorter than
/// three characters, or longer than the column allows.
pub fn validate_board_name(name: &str) -> StoreResult<String> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();

    if len == 0 {
        return Err(StoreError::Validation("Board name is required".to_string()));
    }
    if len < MIN_BOARD_NAME_LEN {
        return Err(StoreError::Validation(format!(
            "Board name must be at least {} characters",
            MIN_BOARD_NAME_LEN
        )));
    }
    check_text_column("Board name", trimmed, Some(MAX_BOARD_NAME_LEN))?;

    Ok(trimmed.to_string())
}

impl BoardRecord {
    /// Inserts a new board row
    pub async fn insert<'e>(
        executor: impl PgExecutor<'e>,
        owner_id: Uuid,
        name: &str,
    ) -> Result<Self, sqlx::Error> {
        let now = Utc::now();

        sqlx::query_as::<_, BoardRecord>(
            r#"
            INSERT INTO boards (id, owner_id, name, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, owner_id, name, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(owner_id)
        .bind(name)
        .bind(now)
        .fetch_one(executor)
        .await
    }

    /// Finds a board by ID, only if owned by `owner_id`
    pub async fn find_owned<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, BoardRecord>(
            r#"
            SELECT id, owner_id, name, created_at, updated_at
            FROM boards
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(executor)
        .await
    }

    /// Finds a board by ID and locks its row for the rest of the transaction
    pub async fn find_owned_for_update<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, BoardRecord>(
            r#"
            SELECT id, owner_id, name, created_at, updated_at
            FROM boards
            WHERE id = $1 AND owner_id = $2
            FOR UPDATE
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .fetch_optional(executor)
        .await
    }

    /// Lists every board of an owner, newest first
    pub async fn list_by_owner<'e>(
        executor: impl PgExecutor<'e>,
        owner_id: Uuid,
    ) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, BoardRecord>(
            r#"
            SELECT id, owner_id, name, created_at, updated_at
            FROM boards
            WHERE owner_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(owner_id)
        .fetch_all(executor)
        .await
    }

    /// Renames an owned board
    ///
    /// Returns `None` if the board does not exist or is not owned by `owner_id`.
    pub async fn rename<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        owner_id: Uuid,
        name: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, BoardRecord>(
            r#"
            UPDATE boards
            SET name = $3,
                updated_at = NOW()
            WHERE id = $1 AND owner_id = $2
            RETURNING id, owner_id, name, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(name)
        .fetch_optional(executor)
        .await
    }

    /// Deletes an owned board row
    ///
    /// Returns true if a row was removed.
    pub async fn delete_owned<'e>(
        executor: impl PgExecutor<'e>,
        id: Uuid,
        owner_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM boards WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(executor)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
