/// API route handlers
///
/// Handlers are organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Signup and login
/// - `todos`: To-do creation (authenticated)

pub mod auth;
pub mod health;
pub mod todos;
