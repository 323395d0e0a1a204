//! Structured metadata attached to event emissions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::Level;
use uuid::Uuid;

use crate::events::AppEvent;

/// Severity used for routing events into logging systems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl EventLevel {
    /// Map to a tracing level for structured logging
    #[must_use]
    pub fn tracing_level(self) -> Level {
        match self {
            Self::Debug => Level::DEBUG,
            Self::Info => Level::INFO,
            Self::Warn => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }
}

/// Subsystem that originated an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventSource {
    Build,
    Resolver,
    General,
}

impl EventSource {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Resolver => "resolver",
            Self::General => "general",
        }
    }
}

/// Structured metadata that accompanies an event when the CLI routes it
/// into tracing. Gives consumers stable identifiers and timestamps for
/// correlation without burdening emitters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMeta {
    /// Unique identifier for this specific event
    pub event_id: Uuid,
    /// Timestamp captured at emission time
    pub timestamp: DateTime<Utc>,
    /// Severity used for routing to logging systems
    pub level: EventLevel,
    /// Subsystem that originated the event
    pub source: EventSource,
}

impl EventMeta {
    /// Derive metadata for an event
    #[must_use]
    pub fn for_event(event: &AppEvent) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            level: event.level(),
            source: event.source(),
        }
    }
}
