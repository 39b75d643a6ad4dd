/// PostgreSQL repositories
///
/// Aggregate mutations run in one transaction: the board row and its task
/// rows commit together or not at all. Task deletion is explicit inside the
/// transaction even though the foreign key also cascades.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{BoardRepository, StoreResult, UserRepository};
use crate::models::board::{Board, BoardRecord};
use crate::models::task::{NewTask, Task};
use crate::models::user::{ClaimedReset, NewUser, ProfileUpdate, ResetCredential, User};

#[derive(Debug, Clone)]
pub struct PgBoardRepository {
    pool: PgPool,
}

impl PgBoardRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BoardRepository for PgBoardRepository {
    async fn create_board(
        &self,
        owner_id: Uuid,
        name: String,
        tasks: Vec<NewTask>,
    ) -> StoreResult<Board> {
        let mut tx = self.pool.begin().await?;

        let record = BoardRecord::insert(&mut *tx, owner_id, &name).await?;
        let tasks = Task::insert_many(&mut tx, record.id, tasks).await?;

        tx.commit().await?;

        Ok(Board::from_parts(record, tasks))
    }

    async fn list_boards(&self, owner_id: Uuid) -> StoreResult<Vec<Board>> {
        let records = BoardRecord::list_by_owner(&self.pool, owner_id).await?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = records.iter().map(|r| r.id).collect();
        let mut tasks_by_board: HashMap<Uuid, Vec<Task>> = HashMap::new();
        for task in Task::list_by_boards(&self.pool, &ids).await? {
            tasks_by_board.entry(task.board_id).or_default().push(task);
        }

        Ok(records
            .into_iter()
            .map(|record| {
                let tasks = tasks_by_board.remove(&record.id).unwrap_or_default();
                Board::from_parts(record, tasks)
            })
            .collect())
    }

    async fn find_board(&self, owner_id: Uuid, board_id: Uuid) -> StoreResult<Option<Board>> {
        let Some(record) = BoardRecord::find_owned(&self.pool, board_id, owner_id).await? else {
            return Ok(None);
        };

        let tasks = Task::list_by_board(&self.pool, record.id).await?;
        Ok(Some(Board::from_parts(record, tasks)))
    }

    async fn update_board(
        &self,
        owner_id: Uuid,
        board_id: Uuid,
        name: String,
        replacement: Option<Vec<NewTask>>,
    ) -> StoreResult<Option<Board>> {
        let mut tx = self.pool.begin().await?;

        if BoardRecord::find_owned_for_update(&mut *tx, board_id, owner_id)
            .await?
            .is_none()
        {
            return Ok(None);
        }

        let Some(record) = BoardRecord::rename(&mut *tx, board_id, owner_id, &name).await? else {
            return Ok(None);
        };

        let tasks = match replacement {
            Some(new_tasks) => {
                let removed = Task::delete_by_board(&mut *tx, board_id).await?;
                tracing::debug!(board_id = %board_id, removed, "Replacing board tasks");
                Task::insert_many(&mut tx, board_id, new_tasks).await?
            }
            None => Task::list_by_board(&mut *tx, board_id).await?,
        };

        tx.commit().await?;

        Ok(Some(Board::from_parts(record, tasks)))
    }

    async fn delete_board(&self, owner_id: Uuid, board_id: Uuid) -> StoreResult<bool> {
        let mut tx = self.pool.begin().await?;

        if BoardRecord::find_owned_for_update(&mut *tx, board_id, owner_id)
            .await?
            .is_none()
        {
            return Ok(false);
        }

        Task::delete_by_board(&mut *tx, board_id).await?;
        let deleted = BoardRecord::delete_owned(&mut *tx, board_id, owner_id).await?;

        tx.commit().await?;

        Ok(deleted)
    }
}

#[derive(Debug, Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, user).await?)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> StoreResult<Option<User>> {
        Ok(User::update_profile(&self.pool, id, update).await?)
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> StoreResult<bool> {
        Ok(User::set_password_hash(&self.pool, id, password_hash).await?)
    }

    async fn set_reset_credential(
        &self,
        id: Uuid,
        credential: &ResetCredential,
    ) -> StoreResult<bool> {
        Ok(User::set_reset_credential(&self.pool, id, credential).await?)
    }

    async fn take_reset_credential(&self, token_hash: &str) -> StoreResult<Option<ClaimedReset>> {
        Ok(User::take_reset_credential(&self.pool, token_hash).await?)
    }
}
