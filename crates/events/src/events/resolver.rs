//! Dependency resolution events

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Resolver-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ResolverEvent {
    /// Registry file loaded and validated
    RegistryLoaded { path: PathBuf, packages: usize },

    /// A disabled toggle's dependencies were deliberately not resolved
    ToggleSkipped { toggle: String },
}
