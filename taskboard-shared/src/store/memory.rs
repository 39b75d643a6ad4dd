/// In-memory repositories
///
/// Used for tests and `STORAGE_BACKEND=memory`. Each mutation takes one
/// write guard for its whole duration, so readers never see a board
/// without its tasks or a half-replaced task set.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BoardRepository, StoreError, StoreResult, UserRepository};
use crate::models::board::{Board, BoardRecord};
use crate::models::task::{NewTask, Task};
use crate::models::user::{ClaimedReset, NewUser, ProfileUpdate, ResetCredential, User};

#[derive(Debug, Default)]
struct BoardTables {
    /// Insertion order
    boards: Vec<BoardRecord>,
    tasks: Vec<Task>,
}

impl BoardTables {
    fn tasks_of(&self, board_id: Uuid) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .tasks
            .iter()
            .filter(|t| t.board_id == board_id)
            .cloned()
            .collect();
        tasks.sort_by_key(|t| t.position);
        tasks
    }

    fn owned_index(&self, owner_id: Uuid, board_id: Uuid) -> Option<usize> {
        self.boards
            .iter()
            .position(|b| b.id == board_id && b.owner_id == owner_id)
    }

    fn insert_tasks(&mut self, board_id: Uuid, tasks: Vec<NewTask>) {
        let now = Utc::now();
        self.tasks.extend(
            tasks
                .into_iter()
                .enumerate()
                .map(|(position, task)| task.into_task(board_id, position as i32, now)),
        );
    }

    fn assemble(&self, record: &BoardRecord) -> Board {
        Board::from_parts(record.clone(), self.tasks_of(record.id))
    }
}

#[derive(Debug, Default)]
pub struct MemoryBoardRepository {
    tables: RwLock<BoardTables>,
}

impl MemoryBoardRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored task of a board, regardless of owner
    pub async fn tasks_for_board(&self, board_id: Uuid) -> Vec<Task> {
        self.tables.read().await.tasks_of(board_id)
    }
}

#[async_trait]
impl BoardRepository for MemoryBoardRepository {
    async fn create_board(
        &self,
        owner_id: Uuid,
        name: String,
        tasks: Vec<NewTask>,
    ) -> StoreResult<Board> {
        let mut tables = self.tables.write().await;

        let now = Utc::now();
        let record = BoardRecord {
            id: Uuid::new_v4(),
            owner_id,
            name,
            created_at: now,
            updated_at: now,
        };

        tables.insert_tasks(record.id, tasks);
        tables.boards.push(record.clone());

        Ok(tables.assemble(&record))
    }

    async fn list_boards(&self, owner_id: Uuid) -> StoreResult<Vec<Board>> {
        let tables = self.tables.read().await;

        Ok(tables
            .boards
            .iter()
            .rev()
            .filter(|b| b.owner_id == owner_id)
            .map(|b| tables.assemble(b))
            .collect())
    }

    async fn find_board(&self, owner_id: Uuid, board_id: Uuid) -> StoreResult<Option<Board>> {
        let tables = self.tables.read().await;

        Ok(tables
            .owned_index(owner_id, board_id)
            .map(|i| tables.assemble(&tables.boards[i])))
    }

    async fn update_board(
        &self,
        owner_id: Uuid,
        board_id: Uuid,
        name: String,
        replacement: Option<Vec<NewTask>>,
    ) -> StoreResult<Option<Board>> {
        let mut tables = self.tables.write().await;

        let Some(index) = tables.owned_index(owner_id, board_id) else {
            return Ok(None);
        };

        let record = &mut tables.boards[index];
        record.name = name;
        record.updated_at = Utc::now();
        let record = record.clone();

        if let Some(new_tasks) = replacement {
            tables.tasks.retain(|t| t.board_id != board_id);
            tables.insert_tasks(board_id, new_tasks);
        }

        Ok(Some(tables.assemble(&record)))
    }

    async fn delete_board(&self, owner_id: Uuid, board_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;

        let Some(index) = tables.owned_index(owner_id, board_id) else {
            return Ok(false);
        };

        tables.boards.remove(index);
        tables.tasks.retain(|t| t.board_id != board_id);

        Ok(true)
    }
}

#[derive(Debug, Default)]
pub struct MemoryUserRepository {
    users: RwLock<HashMap<Uuid, User>>,
}

impl MemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored record including credentials
    pub async fn stored_user(&self, id: Uuid) -> Option<User> {
        self.users.read().await.get(&id).cloned()
    }
}

fn email_taken(users: &HashMap<Uuid, User>, email: &str, except: Option<Uuid>) -> bool {
    users
        .values()
        .any(|u| u.email == email && Some(u.id) != except)
}

#[async_trait]
impl UserRepository for MemoryUserRepository {
    async fn insert_user(&self, user: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;

        if email_taken(&users, &user.email, None) {
            return Err(StoreError::Conflict("Email already exists".to_string()));
        }

        let user = User::from_new(user);
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn update_profile(&self, id: Uuid, update: ProfileUpdate) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;

        if let Some(email) = &update.email {
            if email_taken(&users, email, Some(id)) {
                return Err(StoreError::Conflict("Email already exists".to_string()));
            }
        }

        Ok(users.get_mut(&id).map(|user| {
            user.apply_update(update);
            user.clone()
        }))
    }

    async fn set_password_hash(&self, id: Uuid, password_hash: &str) -> StoreResult<bool> {
        let mut users = self.users.write().await;

        Ok(users
            .get_mut(&id)
            .map(|user| {
                user.password_hash = password_hash.to_string();
                user.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn set_reset_credential(
        &self,
        id: Uuid,
        credential: &ResetCredential,
    ) -> StoreResult<bool> {
        let mut users = self.users.write().await;

        Ok(users
            .get_mut(&id)
            .map(|user| {
                user.reset_token_hash = Some(credential.token_hash.clone());
                user.reset_expires_at = Some(credential.expires_at);
                user.updated_at = Utc::now();
            })
            .is_some())
    }

    async fn take_reset_credential(&self, token_hash: &str) -> StoreResult<Option<ClaimedReset>> {
        let mut users = self.users.write().await;

        let Some(user) = users
            .values_mut()
            .find(|u| u.reset_token_hash.as_deref() == Some(token_hash))
        else {
            return Ok(None);
        };

        let claimed = user.reset_expires_at.map(|expires_at| ClaimedReset {
            user_id: user.id,
            expires_at,
        });

        user.reset_token_hash = None;
        user.reset_expires_at = None;
        user.updated_at = Utc::now();

        Ok(claimed)
    }
}
