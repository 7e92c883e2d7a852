/// PostgreSQL store
///
/// Backs [`UserStore`] and [`TodoStore`] with the `users` and `todos` tables
/// created by the migrations in `todo-shared/migrations`.
///
/// Email uniqueness is the `users_email_key` unique constraint. A signup that
/// loses the race against a concurrent insert sees the constraint violation,
/// reported as [`StoreError::DuplicateEmail`].
///
/// # Example
///
/// ```no_run
/// use todo_shared::db::pool::{create_pool, DatabaseConfig};
/// use todo_shared::store::{postgres::PgStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgStore::new(pool);
/// let user = store.find_user_by_email("user@example.com").await?;
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreError, StoreResult, TodoStore, UserStore};
use crate::models::{
    todo::{CreateTodo, Todo},
    user::{CreateUser, User},
};

/// Name of the unique constraint on `users.email`
pub const EMAIL_UNIQUE_CONSTRAINT: &str = "users_email_key";

/// sqlx-backed implementation of [`UserStore`] and [`TodoStore`]
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wraps an existing connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Underlying pool
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Maps a unique violation on the email constraint to `DuplicateEmail`
fn map_insert_error(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT) {
            return StoreError::DuplicateEmail;
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, tokens, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, tokens, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, data: CreateUser) -> StoreResult<User> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, tokens, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)
    }

    async fn append_token(&self, user_id: Uuid, token_digest: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET tokens = array_append(tokens, $2), updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id)
        .bind(token_digest)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> StoreResult<()> {
        crate::db::pool::health_check(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl TodoStore for PgStore {
    async fn create_todo(&self, data: CreateTodo) -> StoreResult<Todo> {
        if let Some(field) = data.missing_field() {
            return Err(StoreError::MissingField(field));
        }

        let todo = sqlx::query_as::<_, Todo>(
            r#"
            INSERT INTO todos (id, task, task_description, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, task, task_description, user_id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(data.task)
        .bind(data.task_description)
        .bind(data.user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(todo)
    }
}
