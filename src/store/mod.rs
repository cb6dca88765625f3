//! Persistence behind the HTTP handlers.
//!
//! Handlers receive the store as `web::Data<dyn Store>` and never know which backend
//! they talk to. Every method touches a single record (a user together with its token
//! list counts as one record), so no operation needs a multi-record transaction.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{AuthToken, Todo, TodoPatch, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait TodoStore: Send + Sync {
    async fn insert_todo(&self, todo: Todo) -> Result<Todo, AppError>;

    /// All todos in insertion order.
    async fn list_todos(&self) -> Result<Vec<Todo>, AppError>;

    async fn find_todo(&self, id: Uuid) -> Result<Option<Todo>, AppError>;

    /// Applies `patch` atomically (see [`Todo::apply`]) and returns the updated record.
    async fn update_todo(
        &self,
        id: Uuid,
        patch: &TodoPatch,
        now_ms: i64,
    ) -> Result<Option<Todo>, AppError>;

    /// Removes the todo and returns what was removed.
    async fn delete_todo(&self, id: Uuid) -> Result<Option<Todo>, AppError>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user together with its initial tokens.
    ///
    /// Fails with [`AppError::Conflict`] when the email is already registered.
    async fn insert_user(&self, user: User) -> Result<User, AppError>;

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError>;

    /// The user with `id`, provided `token` is one of its active auth tokens.
    async fn find_user_by_token(&self, id: Uuid, token: &str) -> Result<Option<User>, AppError>;

    /// Appends a token; `false` when the user does not exist.
    async fn push_token(&self, id: Uuid, token: AuthToken) -> Result<bool, AppError>;

    /// Removes every entry equal to `token`; `false` when nothing was removed.
    async fn pull_token(&self, id: Uuid, token: &str) -> Result<bool, AppError>;
}

pub trait Store: TodoStore + UserStore {
    /// Short name of the backend, reported by `GET /health`.
    fn backend(&self) -> &'static str;
}
