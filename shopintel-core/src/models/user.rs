use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub type UserId = i64;

/// Account record owned by the authentication/admin backend.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(default, deserialize_with = "super::timestamp::deserialize_option")]
    pub last_login: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

impl User {
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            full_name: None,
            company_name: None,
            is_active: true,
            last_login: None,
        }
    }

    pub fn with_full_name(mut self, full_name: impl Into<String>) -> Self {
        self.full_name = Some(full_name.into());
        self
    }

    pub fn with_company(mut self, company_name: impl Into<String>) -> Self {
        self.company_name = Some(company_name.into());
        self
    }

    /// Full name when set, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.username)
    }
}

/// Signed-in user handed to the controller at construction.
#[derive(Clone, Debug)]
pub struct Session {
    pub user: User,
    pub token: Option<String>,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user, token: None }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn guest() -> Self {
        Self::new(User::new(0, "guest"))
    }
}

/// Platform-wide counters shown on the admin dashboard.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformStats {
    pub active_users: u64,
    pub datasets_processed: u64,
    pub api_requests: u64,
    pub storage_used_mb: f64,
}

impl PlatformStats {
    pub fn storage_label(&self) -> String {
        format!("{:.1} MB", self.storage_used_mb)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemHealth {
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(flatten)]
    pub details: BTreeMap<String, Value>,
}

fn default_status() -> String {
    "healthy".to_string()
}

impl Default for SystemHealth {
    fn default() -> Self {
        Self {
            status: default_status(),
            details: BTreeMap::new(),
        }
    }
}

impl SystemHealth {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy") || self.status.eq_ignore_ascii_case("ok")
    }
}
