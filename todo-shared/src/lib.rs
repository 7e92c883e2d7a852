//! # Todo Shared Library
//!
//! Shared types, authentication primitives and persistence used by the
//! to-do API server.
//!
//! ## Module Organization
//!
//! - `auth`: Password hashing, token issuance/verification, auth middleware
//! - `db`: PostgreSQL pool and migrations
//! - `models`: User and to-do records
//! - `store`: Credential and to-do store traits with PostgreSQL and in-process backends

pub mod auth;
pub mod db;
pub mod models;
pub mod store;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
