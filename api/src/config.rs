//! Application configuration loaded from the environment.
//!
//! Nested fields use a double-underscore separator, so `PLAZA__JWT__SECRET`
//! sets `jwt.secret` and `PLAZA__SERVER__PORT` sets `server.port`. Every
//! field has a development default.

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

use pz_shared::{DatabaseConfig, JwtConfig, ServerConfig};

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub jwt: JwtConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            jwt: JwtConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from `PLAZA__`-prefixed environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(
                Environment::with_prefix("PLAZA")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
