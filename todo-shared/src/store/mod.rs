/// Credential and to-do stores
///
/// Handlers talk to persistence through two narrow traits, [`UserStore`] and
/// [`TodoStore`], so the HTTP layer only ever needs find/save operations.
///
/// # Backends
///
/// - [`postgres::PgStore`]: PostgreSQL via sqlx (production)
/// - [`memory::MemoryStore`]: in-process maps behind a `RwLock` (development and tests)
///
/// Both enforce the same invariants: email addresses are unique, and a to-do
/// is only saved with non-empty `task` and `taskDescription`.
///
/// # Example
///
/// ```
/// use todo_shared::models::user::CreateUser;
/// use todo_shared::store::{memory::MemoryStore, UserStore};
///
/// # async fn example() -> Result<(), todo_shared::store::StoreError> {
/// let store = MemoryStore::new();
/// let user = store
///     .create_user(CreateUser {
///         email: "user@example.com".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     })
///     .await?;
///
/// let found = store.find_user_by_email("user@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    todo::{CreateTodo, Todo},
    user::{CreateUser, User},
};

pub mod memory;
pub mod postgres;

/// Store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Email already belongs to another user
    #[error("Email already registered")]
    DuplicateEmail,

    /// A required field was absent or empty
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Store result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence for user accounts
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Finds a user by exact email address
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Finds a user by ID; used to confirm a token's owner still exists
    async fn find_user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// `StoreError::DuplicateEmail` if the email is taken, even when another
    /// request inserted it after the caller's own lookup
    async fn create_user(&self, data: CreateUser) -> StoreResult<User>;

    /// Appends a token digest to the user's issued-token list
    ///
    /// Returns false if the user does not exist.
    async fn append_token(&self, user_id: Uuid, token_digest: &str) -> StoreResult<bool>;

    /// Checks the backend is reachable
    async fn ping(&self) -> StoreResult<()>;
}

/// Persistence for to-do items
#[async_trait]
pub trait TodoStore: Send + Sync {
    /// Inserts a new to-do item
    ///
    /// # Errors
    ///
    /// `StoreError::MissingField` if `task` or `task_description` is empty
    async fn create_todo(&self, data: CreateTodo) -> StoreResult<Todo>;
}
