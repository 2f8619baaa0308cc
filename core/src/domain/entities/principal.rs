//! Principal entity representing a registered account in the Plaza system.
//!
//! Principals are owned by the credential store; the authentication core
//! only ever reads them (plus a last-login timestamp touch).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Role assigned to a principal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// A regular marketplace user
    User,
    /// A platform administrator
    Admin,
}

impl Role {
    /// String form used in JWT claims and API responses
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Principal entity representing a registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// Unique identifier for the principal
    pub id: Uuid,

    /// Login identifier (unique)
    pub email: String,

    /// Bcrypt hash of the principal's password
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Role assigned to the principal
    pub role: Role,

    /// Whether the account is suspended
    pub is_suspended: bool,

    /// Timestamp when the principal was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the principal's last login
    pub last_login_at: Option<DateTime<Utc>>,
}

impl Principal {
    /// Creates a new Principal instance
    pub fn new(email: String, password_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            email,
            password_hash,
            role,
            is_suspended: false,
            created_at: Utc::now(),
            last_login_at: None,
        }
    }

    /// Checks if the principal may authenticate
    pub fn can_login(&self) -> bool {
        !self.is_suspended
    }

    /// Suspends the account
    pub fn suspend(&mut self) {
        self.is_suspended = true;
    }
}
