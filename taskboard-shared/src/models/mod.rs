/// Database models for Taskboard
///
/// Row types, their wire representations and the SQL that reads and writes
/// them. Consistency rules spanning several rows (board + tasks) live in the
/// stores, which call into these models inside a transaction.
///
/// # Models
///
/// - `user`: User accounts, credentials and pending password resets
/// - `board`: Boards owned by a user
/// - `task`: Tasks belonging to a board

pub mod board;
pub mod task;
pub mod user;

use crate::store::error::{StoreError, StoreResult};

/// Checks that `value` can be stored in a text column of `max` characters
///
/// Postgres rejects NUL in text and counts `VARCHAR(n)` in characters.
/// `max: None` is an unbounded `TEXT` column.
pub fn check_text_column(field: &str, value: &str, max: Option<usize>) -> StoreResult<()> {
    if value.contains('\0') {
        return Err(StoreError::Validation(format!(
            "{} contains invalid characters",
            field
        )));
    }
    if let Some(max) = max {
        if value.chars().count() > max {
            return Err(StoreError::Validation(format!(
                "{} must be at most {} characters",
                field, max
            )));
        }
    }
    Ok(())
}
