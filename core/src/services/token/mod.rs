//! Token issuance, verification, and rotation

mod config;
mod service;

pub use config::TokenConfig;
pub use service::TokenService;

#[cfg(test)]
mod tests;
