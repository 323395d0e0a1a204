//! General utility events for warnings, errors, and operations

use crate::meta::EventLevel;
use serde::{Deserialize, Serialize};

/// General utility events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeneralEvent {
    /// Generic warning message
    Warning { message: String },

    /// Generic error message
    Error { message: String },

    /// Debug logging
    DebugLog { message: String },

    /// Generic operation started notification
    OperationStarted { operation: String },

    /// Generic operation completion with success status
    OperationCompleted { operation: String, success: bool },

    /// Generic operation failure with error details
    OperationFailed { operation: String, error: String },
}

impl GeneralEvent {
    /// Create a debug log event
    pub fn debug(message: impl Into<String>) -> Self {
        Self::DebugLog {
            message: message.into(),
        }
    }

    /// Create a warning event
    pub fn warning(message: impl Into<String>) -> Self {
        Self::Warning {
            message: message.into(),
        }
    }

    /// Create an error event
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::DebugLog { .. } => EventLevel::Debug,
            Self::Warning { .. } => EventLevel::Warn,
            Self::Error { .. } | Self::OperationFailed { .. } => EventLevel::Error,
            Self::OperationStarted { .. } | Self::OperationCompleted { .. } => EventLevel::Info,
        }
    }
}
