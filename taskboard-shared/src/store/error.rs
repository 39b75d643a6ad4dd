/// Error taxonomy shared by the board and account stores
///
/// Every store operation returns `StoreResult<T>`. The HTTP layer maps each
/// variant to a status code; variants carrying infrastructure detail
/// (`Storage`, `Email`, `Hashing`) are logged server-side and never echoed
/// back to clients.

use crate::auth::password::PasswordError;
use crate::email::EmailError;

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Typed failure returned by every store operation
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Malformed input (minimum length, required field)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Entity absent, or not owned by the caller
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Duplicate unique key (e.g. email)
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Bad credentials; identical for unknown email and wrong password
    #[error("Invalid email or password")]
    Auth,

    /// Presented reset token matches no pending reset
    #[error("Invalid or expired reset token")]
    InvalidToken,

    /// Reset token matched but its expiry has passed
    #[error("Reset token has expired")]
    ExpiredToken,

    /// Underlying persistence failure
    #[error("Storage error: {0}")]
    Storage(String),

    /// Email delivery collaborator failed
    #[error("Email delivery failed: {0}")]
    Email(String),

    /// Password hashing or verification failed
    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl StoreError {
    /// Whether the error carries infrastructure detail that must not reach clients
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            StoreError::Storage(_) | StoreError::Email(_) | StoreError::Hashing(_)
        )
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            if let Some(constraint) = db_err.constraint() {
                if constraint.contains("email") {
                    return StoreError::Conflict("Email already exists".to_string());
                }
            }
        }

        StoreError::Storage(err.to_string())
    }
}

impl From<PasswordError> for StoreError {
    fn from(err: PasswordError) -> Self {
        StoreError::Hashing(err.to_string())
    }
}

impl From<EmailError> for StoreError {
    fn from(err: EmailError) -> Self {
        StoreError::Email(err.to_string())
    }
}
