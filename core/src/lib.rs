//! # Plaza Core
//!
//! Core business logic and domain layer for the Plaza backend.
//! This crate contains the authentication session-lifecycle subsystem:
//! domain entities, token issuance and rotation services, repository
//! interfaces, and the domain error taxonomy.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::entities::principal::{Principal, Role};
pub use domain::entities::token::{Claims, RefreshTokenRecord, SessionMeta, TokenKind, TokenPair};
pub use domain::value_objects::AuthResponse;
pub use errors::{AuthError, DomainError, DomainResult, TokenError};
pub use repositories::{PrincipalRepository, TokenRepository};
pub use services::{AuthService, TokenConfig, TokenService};
