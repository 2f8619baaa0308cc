//! MySQL repository implementations

mod principal_repository_impl;
mod token_repository_impl;

pub use principal_repository_impl::MySqlPrincipalRepository;
pub use token_repository_impl::MySqlTokenRepository;
