/// Database bootstrap
///
/// - `pool`: PostgreSQL connection pool with a startup health check
/// - `migrations`: Embedded schema migrations for `users` and `todos`
///
/// The record-level queries live in [`crate::store::postgres`].

pub mod migrations;
pub mod pool;
