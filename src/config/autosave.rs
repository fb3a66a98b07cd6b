//! Autosave configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::AutoSaveConfig;

/// Debounce settings for background saves.
#[derive(Debug, Clone, Deserialize)]
pub struct AutoSaveSettings {
    /// Quiet period after the last edit before a save starts, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// How long a fully saved session stays open without requests, in seconds
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

impl AutoSaveSettings {
    pub fn to_autosave_config(&self) -> AutoSaveConfig {
        AutoSaveConfig::default().with_debounce(Duration::from_millis(self.debounce_ms))
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }

    /// Validate autosave configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.debounce_ms == 0 || self.debounce_ms > 60_000 {
            return Err(ValidationError::InvalidDebounce);
        }
        if self.session_idle_secs == 0 {
            return Err(ValidationError::InvalidSessionIdle);
        }
        Ok(())
    }
}

impl Default for AutoSaveSettings {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    1000
}

fn default_session_idle_secs() -> u64 {
    300
}
