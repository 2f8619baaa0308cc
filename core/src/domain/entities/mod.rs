//! Domain entities

pub mod principal;
pub mod token;

pub use principal::{Principal, Role};
pub use token::{Claims, RefreshTokenRecord, SessionMeta, TokenPair};
