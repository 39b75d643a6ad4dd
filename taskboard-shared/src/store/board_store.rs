/// Board aggregate service
///
/// Validates names and task titles, then delegates to the repository.
/// A board that is missing and a board owned by someone else produce the
/// same `NotFound`.

use std::sync::Arc;

use uuid::Uuid;

use super::{BoardRepository, StoreError, StoreResult};
use crate::models::board::{validate_board_name, Board};
use crate::models::task::{validate_task_list, NewTask};

#[derive(Clone)]
pub struct BoardStore {
    repo: Arc<dyn BoardRepository>,
}

impl BoardStore {
    pub fn new(repo: Arc<dyn BoardRepository>) -> Self {
        Self { repo }
    }

    /// Creates a board with its initial tasks
    ///
    /// # Errors
    ///
    /// `Validation` for a short name or an untitled task; nothing is
    /// written in that case.
    pub async fn create_board(
        &self,
        owner_id: Uuid,
        name: &str,
        tasks: Vec<NewTask>,
    ) -> StoreResult<Board> {
        let name = validate_board_name(name)?;
        validate_task_list(&tasks)?;

        let board = self.repo.create_board(owner_id, name, tasks).await?;

        tracing::info!(
            board_id = %board.id,
            owner_id = %owner_id,
            tasks = board.tasks.len(),
            "Board created"
        );

        Ok(board)
    }

    pub async fn list_boards(&self, owner_id: Uuid) -> StoreResult<Vec<Board>> {
        self.repo.list_boards(owner_id).await
    }

    pub async fn get_board(&self, owner_id: Uuid, board_id: Uuid) -> StoreResult<Board> {
        self.repo
            .find_board(owner_id, board_id)
            .await?
            .ok_or(StoreError::NotFound("Board"))
    }

    /// Renames a board and optionally replaces its tasks
    ///
    /// A non-empty `tasks` replaces the whole task set. `None` or an empty
    /// list leaves existing tasks untouched.
    pub async fn update_board(
        &self,
        owner_id: Uuid,
        board_id: Uuid,
        name: &str,
        tasks: Option<Vec<NewTask>>,
    ) -> StoreResult<Board> {
        let name = validate_board_name(name)?;

        let replacement = tasks.filter(|t| !t.is_empty());
        if let Some(new_tasks) = &replacement {
            validate_task_list(new_tasks)?;
        }
        let replaced = replacement.is_some();

        let board = self
            .repo
            .update_board(owner_id, board_id, name, replacement)
            .await?
            .ok_or(StoreError::NotFound("Board"))?;

        tracing::info!(
            board_id = %board_id,
            owner_id = %owner_id,
            tasks_replaced = replaced,
            "Board updated"
        );

        Ok(board)
    }

    /// Deletes a board together with all of its tasks
    pub async fn delete_board(&self, owner_id: Uuid, board_id: Uuid) -> StoreResult<()> {
        if !self.repo.delete_board(owner_id, board_id).await? {
            return Err(StoreError::NotFound("Board"));
        }

        tracing::info!(board_id = %board_id, owner_id = %owner_id, "Board deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryBoardRepository;

    fn store() -> BoardStore {
        BoardStore::new(Arc::new(MemoryBoardRepository::new()))
    }

    #[tokio::test]
    async fn test_create_rejects_short_name() {
        let err = store()
            .create_board(Uuid::new_v4(), "ab", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_create_rejects_untitled_task() {
        let boards = store();
        let owner = Uuid::new_v4();

        let err = boards
            .create_board(owner, "Sprint 1", vec![NewTask::titled("A"), NewTask::titled("  ")])
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert!(boards.list_boards(owner).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_validates_before_lookup() {
        let err = store()
            .update_board(Uuid::new_v4(), Uuid::new_v4(), "x", None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_board() {
        let err = store()
            .delete_board(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound("Board")));
    }
}
