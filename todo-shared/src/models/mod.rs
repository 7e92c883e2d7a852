/// Record types for the to-do API
///
/// # Models
///
/// - `user`: Accounts, credentials and issued-token audit trail
/// - `todo`: To-do items owned by a user
///
/// Persistence lives behind the traits in [`crate::store`]; these types carry
/// no database handle of their own.

pub mod todo;
pub mod user;
