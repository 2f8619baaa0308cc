//! # Infrastructure Layer
//!
//! Concrete implementations of the `pz_core` repository traits:
//! MySQL persistence via SQLx and connection-pool management.

pub mod database;

pub use database::{create_pool, MySqlPrincipalRepository, MySqlTokenRepository};
