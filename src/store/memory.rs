use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, TodoStore, UserStore};
use crate::error::AppError;
use crate::models::{AuthToken, Todo, TodoPatch, User};

/// Process-local store used when no database is configured, and by the tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    todos: RwLock<Vec<Todo>>,
    users: RwLock<Vec<User>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn todo_count(&self) -> usize {
        self.todos.read().await.len()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl TodoStore for MemoryStore {
    async fn insert_todo(&self, todo: Todo) -> Result<Todo, AppError> {
        let mut todos = self.todos.write().await;
        if todos.iter().any(|t| t.id == todo.id) {
            return Err(AppError::Conflict("Todo already exists".into()));
        }
        todos.push(todo.clone());
        Ok(todo)
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, AppError> {
        Ok(self.todos.read().await.clone())
    }

    async fn find_todo(&self, id: Uuid) -> Result<Option<Todo>, AppError> {
        Ok(self.todos.read().await.iter().find(|t| t.id == id).cloned())
    }

    async fn update_todo(
        &self,
        id: Uuid,
        patch: &TodoPatch,
        now_ms: i64,
    ) -> Result<Option<Todo>, AppError> {
        let mut todos = self.todos.write().await;
        Ok(todos.iter_mut().find(|t| t.id == id).map(|todo| {
            todo.apply(patch, now_ms);
            todo.clone()
        }))
    }

    async fn delete_todo(&self, id: Uuid) -> Result<Option<Todo>, AppError> {
        let mut todos = self.todos.write().await;
        Ok(todos
            .iter()
            .position(|t| t.id == id)
            .map(|index| todos.remove(index)))
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, user: User) -> Result<User, AppError> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("Email already registered".into()));
        }
        if users.iter().any(|u| u.id == user.id) {
            return Err(AppError::Conflict("User already exists".into()));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_token(&self, id: Uuid, token: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .users
            .read()
            .await
            .iter()
            .find(|u| u.id == id && u.has_token(token))
            .cloned())
    }

    async fn push_token(&self, id: Uuid, token: AuthToken) -> Result<bool, AppError> {
        let mut users = self.users.write().await;
        match users.iter_mut().find(|u| u.id == id) {
            Some(user) => {
                user.tokens.push(token);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn pull_token(&self, id: Uuid, token: &str) -> Result<bool, AppError> {
        let mut users = self.users.write().await;
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };
        let before = user.tokens.len();
        user.tokens.retain(|t| t.token != token);
        Ok(user.tokens.len() != before)
    }
}

impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }
}
