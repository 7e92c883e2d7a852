//! # Todo API Server Library
//!
//! Core of the to-do API server: signup and login issuing bearer tokens, and
//! an authenticated endpoint for creating to-do items.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
