//! Domain-grouped event definitions

mod build;
mod general;
mod resolver;

pub use build::BuildEvent;
pub use general::GeneralEvent;
pub use resolver::ResolverEvent;

use crate::meta::{EventLevel, EventSource};
use serde::{Deserialize, Serialize};

/// Top-level event type covering all domains
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "lowercase")]
pub enum AppEvent {
    Build(BuildEvent),
    Resolver(ResolverEvent),
    General(GeneralEvent),
}

impl AppEvent {
    /// Subsystem the event belongs to
    #[must_use]
    pub fn source(&self) -> EventSource {
        match self {
            Self::Build(_) => EventSource::Build,
            Self::Resolver(_) => EventSource::Resolver,
            Self::General(_) => EventSource::General,
        }
    }

    /// Severity for log routing
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::Build(event) => event.level(),
            Self::Resolver(_) => EventLevel::Debug,
            Self::General(event) => event.level(),
        }
    }
}
