//! Repository traits (persistence boundaries) and test mocks

pub mod principal;
pub mod token;

pub use principal::PrincipalRepository;
pub use token::TokenRepository;
