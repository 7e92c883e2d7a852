/// In-process store
///
/// Keeps users and to-do items in memory behind `tokio::sync::RwLock`.
/// Nothing survives a restart. Selected with `STORE_BACKEND=memory` and used
/// by the HTTP integration tests.
///
/// Email uniqueness is checked and the insert performed under the same write
/// lock, so concurrent signups for one address admit exactly one user.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{StoreError, StoreResult, TodoStore, UserStore};
use crate::models::{
    todo::{CreateTodo, Todo},
    user::{CreateUser, User},
};

/// In-memory implementation of [`UserStore`] and [`TodoStore`]
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    todos: RwLock<Vec<Todo>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered users
    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }

    /// Number of stored to-do items
    pub async fn todo_count(&self) -> usize {
        self.todos.read().await.len()
    }

    /// To-do items owned by `user_id`, oldest first
    pub async fn todos_for_user(&self, user_id: Uuid) -> Vec<Todo> {
        self.todos
            .read()
            .await
            .iter()
            .filter(|t| t.user_id == Some(user_id))
            .cloned()
            .collect()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        let mut users = self.users.write().await;

        if users.values().any(|u| u.email == data.email) {
            return Err(StoreError::DuplicateEmail);
        }

        let user = User::from_create(data);
        users.insert(user.id, user.clone());
        debug!(user_id = %user.id, "Stored user in memory");

        Ok(user)
    }

    async fn append_token(&self, user_id: Uuid, token_digest: &str) -> StoreResult<bool> {
        let mut users = self.users.write().await;

        match users.get_mut(&user_id) {
            Some(user) => {
                user.tokens.push(token_digest.to_string());
                user.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn create_todo(&self, data: CreateTodo) -> StoreResult<Todo> {
        if let Some(field) = data.missing_field() {
            return Err(StoreError::MissingField(field));
        }

        let todo = Todo::from_create(data);
        self.todos.write().await.push(todo.clone());

        Ok(todo)
    }
}
