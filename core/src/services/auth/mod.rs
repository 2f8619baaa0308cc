//! Authentication flow orchestration

mod service;

pub use service::AuthService;
