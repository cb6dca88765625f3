//! PostgreSQL-backed store.
//!
//! Users live in `users`, their sessions in `user_tokens` (ordered by the serial id),
//! todos in `todos` (ordered by `seq`). The schema is embedded from `migrations/`.
//! The unique index on `users.email` enforces email uniqueness.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{Store, TodoStore, UserStore};
use crate::error::AppError;
use crate::models::{AuthToken, Todo, TodoPatch, User};

const TODO_COLUMNS: &str = "id, text, completed, completed_at, creator";

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password: String,
}

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    async fn load_tokens(&self, user_id: Uuid) -> Result<Vec<AuthToken>, AppError> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT access, token FROM user_tokens WHERE user_id = $1 ORDER BY id")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(access, token)| AuthToken { access, token })
            .collect())
    }

    async fn hydrate(&self, row: Option<UserRow>) -> Result<Option<User>, AppError> {
        match row {
            Some(row) => {
                let tokens = self.load_tokens(row.id).await?;
                Ok(Some(User {
                    id: row.id,
                    email: row.email,
                    password: row.password,
                    tokens,
                }))
            }
            None => Ok(None),
        }
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn insert_todo(&self, todo: Todo) -> Result<Todo, AppError> {
        let sql = format!(
            "INSERT INTO todos (id, text, completed, completed_at, creator) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {}",
            TODO_COLUMNS
        );
        let todo = sqlx::query_as::<_, Todo>(&sql)
            .bind(todo.id)
            .bind(&todo.text)
            .bind(todo.completed)
            .bind(todo.completed_at)
            .bind(todo.creator)
            .fetch_one(&self.pool)
            .await?;
        Ok(todo)
    }

    async fn list_todos(&self) -> Result<Vec<Todo>, AppError> {
        let sql = format!("SELECT {} FROM todos ORDER BY seq", TODO_COLUMNS);
        Ok(sqlx::query_as::<_, Todo>(&sql).fetch_all(&self.pool).await?)
    }

    async fn find_todo(&self, id: Uuid) -> Result<Option<Todo>, AppError> {
        let sql = format!("SELECT {} FROM todos WHERE id = $1", TODO_COLUMNS);
        Ok(sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_todo(
        &self,
        id: Uuid,
        patch: &TodoPatch,
        now_ms: i64,
    ) -> Result<Option<Todo>, AppError> {
        // Same rules as `Todo::apply`, evaluated against the row's current values.
        let sql = format!(
            "UPDATE todos SET \
                 text = COALESCE($2, text), \
                 completed = COALESCE($3, completed), \
                 completed_at = CASE \
                     WHEN $3::BOOLEAN IS NULL THEN completed_at \
                     WHEN NOT $3::BOOLEAN THEN NULL \
                     WHEN completed AND completed_at IS NOT NULL THEN completed_at \
                     ELSE $4 \
                 END \
             WHERE id = $1 RETURNING {}",
            TODO_COLUMNS
        );
        Ok(sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .bind(patch.text.as_deref().map(str::trim))
            .bind(patch.completed)
            .bind(now_ms)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn delete_todo(&self, id: Uuid) -> Result<Option<Todo>, AppError> {
        let sql = format!("DELETE FROM todos WHERE id = $1 RETURNING {}", TODO_COLUMNS);
        Ok(sqlx::query_as::<_, Todo>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, user: User) -> Result<User, AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO users (id, email, password) VALUES ($1, $2, $3)")
            .bind(user.id)
            .bind(&user.email)
            .bind(&user.password)
            .execute(&mut *tx)
            .await
            .map_err(|e| match AppError::from(e) {
                AppError::Conflict(_) => AppError::Conflict("Email already registered".into()),
                other => other,
            })?;

        for token in &user.tokens {
            sqlx::query("INSERT INTO user_tokens (user_id, access, token) VALUES ($1, $2, $3)")
                .bind(user.id)
                .bind(&token.access)
                .bind(&token.token)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(user)
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT id, email, password FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        self.hydrate(row).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let row =
            sqlx::query_as::<_, UserRow>("SELECT id, email, password FROM users WHERE email = $1")
                .bind(email)
                .fetch_optional(&self.pool)
                .await?;
        self.hydrate(row).await
    }

    async fn find_user_by_token(&self, id: Uuid, token: &str) -> Result<Option<User>, AppError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT u.id, u.email, u.password FROM users u \
             WHERE u.id = $1 AND EXISTS ( \
                 SELECT 1 FROM user_tokens t \
                 WHERE t.user_id = u.id AND t.token = $2 AND t.access = 'auth')",
        )
        .bind(id)
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        self.hydrate(row).await
    }

    async fn push_token(&self, id: Uuid, token: AuthToken) -> Result<bool, AppError> {
        let result = sqlx::query(
            "INSERT INTO user_tokens (user_id, access, token) \
             SELECT $1, $2, $3 WHERE EXISTS (SELECT 1 FROM users WHERE id = $1)",
        )
        .bind(id)
        .bind(&token.access)
        .bind(&token.token)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn pull_token(&self, id: Uuid, token: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM user_tokens WHERE user_id = $1 AND token = $2")
            .bind(id)
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }
}
