/// Authentication utilities
///
/// This module provides the authentication primitives for the to-do API:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Signed, time-limited bearer tokens
/// - [`middleware`]: Axum middleware resolving the caller from a bearer token
///
/// # Example
///
/// ```no_run
/// use todo_shared::auth::password::{PasswordConfig, PasswordHasher};
/// use todo_shared::auth::jwt::TokenService;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = PasswordHasher::new(PasswordConfig::default())?;
/// let hash = hasher.hash("user_password")?;
/// assert!(hasher.verify("user_password", &hash)?);
///
/// let tokens = TokenService::new("secret-key-at-least-32-bytes-long!!", "todo-api");
/// let token = tokens.issue(Uuid::new_v4())?;
/// let claims = tokens.verify(&token)?;
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
