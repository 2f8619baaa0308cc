//! Authentication route handlers
//!
//! This module contains the session-lifecycle endpoints:
//! - Login (credential verification and token issuance)
//! - Token refresh (rotation)
//! - Logout (single session)
//! - Logout everywhere (all sessions)

pub mod login;
pub mod logout;
pub mod logout_all;
pub mod refresh;

pub use login::AppState;
