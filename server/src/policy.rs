use chrono::{DateTime, Utc};

use crate::auth::Role;
use crate::config;

/// Decides whether a refresh may run now, given who is asking and when the
/// last sync attempt started. Pure: all inputs are passed in, nothing is read
/// from ambient state.
#[derive(Debug, Clone, Copy)]
pub struct RefreshPolicy {
    cooldown_secs: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    Allowed,
    Blocked { retry_after_secs: i64 },
}

impl RefreshPolicy {
    pub fn from_config() -> Self {
        Self {
            cooldown_secs: config::refresh_cooldown_secs(),
        }
    }

    #[cfg(test)]
    pub fn with_cooldown_secs(cooldown_secs: i64) -> Self {
        Self { cooldown_secs }
    }

    pub fn evaluate(
        &self,
        role: Role,
        last_sync_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> RefreshDecision {
        if role.can_bypass_cooldown() {
            return RefreshDecision::Allowed;
        }
        let Some(last) = last_sync_at else {
            return RefreshDecision::Allowed;
        };
        let elapsed_secs = now.signed_duration_since(last).num_seconds();
        if elapsed_secs >= self.cooldown_secs {
            return RefreshDecision::Allowed;
        }
        RefreshDecision::Blocked {
            retry_after_secs: self.cooldown_secs - elapsed_secs,
        }
    }
}
