//! Admin console: platform stats, user roster, system health and account
//! activation.
//!
//! Deactivation is destructive, so it is split into
//! [`AdminConsole::request_deactivation`], which issues a one-shot
//! [`DeactivationToken`], and [`AdminConsole::confirm_deactivation`], which
//! consumes it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::errors::{AdminActionError, AdminResult};
use crate::models::{PlatformStats, SystemHealth, User, UserId};
use crate::services::UserAdministration;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminSection {
    #[default]
    Dashboard,
    Users,
    System,
    Reports,
}

impl AdminSection {
    pub const ALL: [AdminSection; 4] = [
        AdminSection::Dashboard,
        AdminSection::Users,
        AdminSection::System,
        AdminSection::Reports,
    ];
}

impl fmt::Display for AdminSection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AdminSection::Dashboard => "dashboard",
            AdminSection::Users => "users",
            AdminSection::System => "system",
            AdminSection::Reports => "reports",
        })
    }
}

impl FromStr for AdminSection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dashboard" => Ok(AdminSection::Dashboard),
            "users" => Ok(AdminSection::Users),
            "system" => Ok(AdminSection::System),
            "reports" => Ok(AdminSection::Reports),
            _ => Err(format!("unknown admin section '{s}'")),
        }
    }
}

/// One-shot confirmation handle for a pending deactivation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeactivationToken(Uuid);

impl fmt::Display for DeactivationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Data currently shown by the console.
#[derive(Clone, Debug, Default, Serialize)]
pub struct AdminSnapshot {
    pub section: AdminSection,
    pub stats: PlatformStats,
    pub users: Vec<User>,
    pub health: SystemHealth,
    /// At least one refresh has succeeded.
    pub loaded: bool,
}

impl AdminSnapshot {
    pub fn user(&self, user_id: UserId) -> Option<&User> {
        self.users.iter().find(|user| user.id == user_id)
    }
}

#[derive(Default)]
struct ConsoleState {
    snapshot: AdminSnapshot,
    pending: HashMap<DeactivationToken, UserId>,
}

pub struct AdminConsole {
    backend: Arc<dyn UserAdministration>,
    state: Mutex<ConsoleState>,
}

impl AdminConsole {
    pub fn new(backend: Arc<dyn UserAdministration>) -> Self {
        Self {
            backend,
            state: Mutex::new(ConsoleState::default()),
        }
    }

    pub async fn snapshot(&self) -> AdminSnapshot {
        self.state.lock().await.snapshot.clone()
    }

    pub async fn set_section(&self, section: AdminSection) {
        self.state.lock().await.snapshot.section = section;
    }

    /// Load stats, roster and health concurrently. On failure the previously
    /// loaded data is kept.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> AdminResult<AdminSnapshot> {
        let (stats, users, health) = tokio::try_join!(
            self.backend.platform_stats(),
            self.backend.list_users(),
            self.backend.system_health(),
        )?;
        info!(users = users.len(), status = %health.status, "Admin data loaded");

        let mut state = self.state.lock().await;
        state.snapshot.stats = stats;
        state.snapshot.users = users;
        state.snapshot.health = health;
        state.snapshot.loaded = true;
        Ok(state.snapshot.clone())
    }

    #[instrument(skip(self))]
    pub async fn activate_user(&self, user_id: UserId) -> AdminResult<AdminSnapshot> {
        self.backend.activate_user(user_id).await?;
        info!("Activated user {}", user_id);
        self.reload().await
    }

    /// Issue a confirmation token for deactivating an active user from the
    /// loaded roster. Nothing is sent to the backend yet.
    pub async fn request_deactivation(&self, user_id: UserId) -> AdminResult<DeactivationToken> {
        let mut state = self.state.lock().await;
        let user = state
            .snapshot
            .user(user_id)
            .ok_or(AdminActionError::UnknownUser(user_id))?;
        if !user.is_active {
            return Err(AdminActionError::AlreadyInactive(user_id));
        }

        let token = DeactivationToken(Uuid::new_v4());
        state.pending.insert(token, user_id);
        info!("Deactivation of user {} awaiting confirmation", user_id);
        Ok(token)
    }

    /// Consume a token and deactivate its user. The token stays valid if the
    /// backend rejects the call, so the same confirmation can be retried.
    #[instrument(skip(self))]
    pub async fn confirm_deactivation(&self, token: DeactivationToken) -> AdminResult<AdminSnapshot> {
        let user_id = self
            .state
            .lock()
            .await
            .pending
            .remove(&token)
            .ok_or(AdminActionError::UnknownToken)?;

        if let Err(err) = self.backend.deactivate_user(user_id).await {
            warn!("Deactivating user {} failed: {}", user_id, err);
            self.state.lock().await.pending.insert(token, user_id);
            return Err(err);
        }
        info!("Deactivated user {}", user_id);
        {
            let mut state = self.state.lock().await;
            if let Some(user) = state.snapshot.users.iter_mut().find(|u| u.id == user_id) {
                user.is_active = false;
            }
        }
        self.reload().await
    }

    /// Drop a pending token. Returns whether it existed.
    pub async fn cancel_deactivation(&self, token: DeactivationToken) -> bool {
        self.state.lock().await.pending.remove(&token).is_some()
    }

    async fn reload(&self) -> AdminResult<AdminSnapshot> {
        self.refresh().await.map_err(|err| {
            warn!("Reload after admin action failed: {}", err);
            AdminActionError::Reload(err.to_string())
        })
    }
}
