//! Core configuration for lottie-view-core.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ViewError;
use crate::surface::ResizeMode;

/// Per-view configuration. Every field has a default, so hosts may pass a partial JSON object.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Progress sampling period in milliseconds.
    pub progress_interval_ms: u64,
    /// Extension appended to extensionless named sources ("spinner" -> "spinner.json").
    pub asset_extension: String,
    /// Queue length at which new progress samples are dropped until the host drains.
    pub max_pending_events: usize,
    /// Content mode used when no resize mode was set and there is no previous handle to inherit from.
    pub default_content_mode: ResizeMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            progress_interval_ms: 50,
            asset_extension: "json".to_string(),
            max_pending_events: 1024,
            default_content_mode: ResizeMode::Contain,
        }
    }
}

impl Config {
    /// Parse and validate a JSON config object.
    pub fn from_json(s: &str) -> Result<Self, ViewError> {
        let cfg: Config = serde_json::from_str(s).map_err(|e| ViewError::Config {
            reason: e.to_string(),
        })?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ViewError> {
        if self.progress_interval_ms == 0 {
            return Err(ViewError::Config {
                reason: "progress_interval_ms must be > 0".into(),
            });
        }
        if self.max_pending_events == 0 {
            return Err(ViewError::Config {
                reason: "max_pending_events must be > 0".into(),
            });
        }
        if self.asset_extension.is_empty() || self.asset_extension.contains('.') {
            return Err(ViewError::Config {
                reason: format!(
                    "asset_extension must be a bare extension, got '{}'",
                    self.asset_extension
                ),
            });
        }
        if self.default_content_mode == ResizeMode::Unset {
            return Err(ViewError::Config {
                reason: "default_content_mode cannot be unset".into(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn progress_interval(&self) -> Duration {
        Duration::from_millis(self.progress_interval_ms)
    }
}
