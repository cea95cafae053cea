//! Error types for the view layer.
//!
//! None of these are surfaced to the host as faults: the container view recovers
//! locally (keeps the previous handle, skips the bad override) and logs.

use serde::{Deserialize, Serialize};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum ViewError {
    /// Malformed animation document
    #[error("Parse error: {reason}")]
    Parse { reason: String },

    /// Asset not found or unreadable
    #[error("IO error at '{path}': {reason}")]
    Io { path: String, reason: String },

    /// Malformed color-override entry
    #[error("Binding error in color filter #{index}: {reason}")]
    Binding { index: usize, reason: String },

    /// Rejected configuration value
    #[error("Invalid config: {reason}")]
    Config { reason: String },
}

impl ViewError {
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }

    pub fn io(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub fn binding(index: usize, reason: impl Into<String>) -> Self {
        Self::Binding {
            index,
            reason: reason.into(),
        }
    }

    /// Load and binding failures degrade visually; only a bad config is fatal to construction.
    #[inline]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Config { .. })
    }

    /// Get error category for logging
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Parse { .. } => "parse",
            Self::Io { .. } => "io",
            Self::Binding { .. } => "binding",
            Self::Config { .. } => "config",
        }
    }
}

impl From<serde_json::Error> for ViewError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}
