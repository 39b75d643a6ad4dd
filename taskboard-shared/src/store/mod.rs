/// Board and account stores
///
/// Each store is a service over a repository trait:
///
/// - [`BoardStore`] over [`BoardRepository`]: the board aggregate (a board
///   and its ordered tasks), always scoped to the owning user
/// - [`AccountStore`] over [`UserRepository`]: registration, credentials,
///   profile and the password reset lifecycle
///
/// Services validate input, enforce business rules and log; repositories
/// persist already-validated data atomically. Two repository backends are
/// provided: [`postgres`] (sqlx, one transaction per aggregate mutation) and
/// [`memory`] (a single `RwLock` write guard per mutation).
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use taskboard_shared::models::task::NewTask;
/// use taskboard_shared::store::{memory::MemoryBoardRepository, BoardStore};
/// use uuid::Uuid;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let boards = BoardStore::new(Arc::new(MemoryBoardRepository::new()));
/// let owner = Uuid::new_v4();
///
/// let board = boards
///     .create_board(owner, "Sprint 1", vec![NewTask::titled("A"), NewTask::titled("B")])
///     .await?;
/// assert_eq!(board.tasks.len(), 2);
/// # Ok(())
/// # }
/// ```

pub mod account_store;
pub mod board_store;
pub mod error;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::board::Board;
use crate::models::task::NewTask;
use crate::models::user::{ClaimedReset, NewUser, ProfileUpdate, ResetCredential, User};

pub use account_store::{AccountStore, Registration, ResetSettings};
pub use board_store::BoardStore;
pub use error::{StoreError, StoreResult};

/// Persistence for the board aggregate
///
/// Every method is scoped by `owner_id`; a board owned by someone else is
/// treated exactly like a missing one.
#[async_trait]
pub trait BoardRepository: Send + Sync {
    /// Inserts a board and its tasks atomically
    async fn create_board(
        &self,
        owner_id: Uuid,
        name: String,
        tasks: Vec<NewTask>,
    ) -> StoreResult<Board>;

    /// Boards of `owner_id`, newest first, tasks in position order
    async fn list_boards(&self, owner_id: Uuid) -> StoreResult<Vec<Board>>;

    async fn find_board(&self, owner_id: Uuid, board_id: Uuid) -> StoreResult<Option<Board>>;

    /// Renames the board and, when `replacement` is given, swaps its whole
    /// task set, all atomically
    ///
    /// Returns `None` if the board is absent or not owned by `owner_id`.
    async fn update_board(
        &self,
        owner_id: Uuid,
        board_id: Uuid,
        name: String,
        replacement: Option<Vec<NewTask>>,
    ) -> StoreResult<Option<Board>>;

    /// Removes the board and every task it owns atomically
    ///
    /// Returns false if the board is absent or not owned by `owner_id`.
    async fn delete_board(&self, owner_id: Uuid, board_id: Uuid) -> StoreResult<bool>;
}

/// Persistence for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a user; `StoreError::Conflict` if the email is taken
    async fn insert_user(&self, user: NewUser) -> StoreResult<User>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Applies a partial update; `StoreError::Conflict` if the new email
    /// belongs to another user
    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> StoreResult<Option<User>>;

    /// Returns false if the user does not exist
    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> StoreResult<bool>;

    /// Stores a pending reset, replacing any previous one
    async fn set_reset_credential(
        &self,
        id: Uuid,
        credential: &ResetCredential,
    ) -> StoreResult<bool>;

    /// Reads and clears the pending reset whose hash is `token_hash`
    ///
    /// At most one caller can ever claim a given credential.
    async fn take_reset_credential(&self, token_hash: &str) -> StoreResult<Option<ClaimedReset>>;
}
