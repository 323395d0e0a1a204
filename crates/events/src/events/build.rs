//! Build pipeline events

use crate::meta::EventLevel;
use kiln_types::{Stage, Version};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Build-specific events for the event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BuildEvent {
    /// Build session started
    SessionStarted { package: String, version: Version },

    /// Build session completed
    SessionCompleted {
        package: String,
        version: Version,
        duration_ms: u64,
        artifacts: usize,
    },

    /// Pipeline stage started
    StageStarted { package: String, stage: Stage },

    /// Pipeline stage completed
    StageCompleted {
        package: String,
        stage: Stage,
        duration_ms: u64,
    },

    /// Pipeline stage failed; terminal for the session
    StageFailed {
        package: String,
        stage: Stage,
        error: String,
    },

    /// External command invoked
    CommandStarted {
        command: String,
        working_dir: PathBuf,
    },

    /// External command finished
    CommandCompleted {
        command: String,
        exit_code: Option<i32>,
    },

    /// Patch file applied to the source tree
    PatchApplied { patch: String },

    /// Artifacts enumerated after install
    ArtifactsCollected { install_root: PathBuf, count: usize },
}

impl BuildEvent {
    #[must_use]
    pub fn level(&self) -> EventLevel {
        match self {
            Self::StageFailed { .. } => EventLevel::Error,
            Self::CommandStarted { .. } | Self::CommandCompleted { .. } => EventLevel::Debug,
            _ => EventLevel::Info,
        }
    }
}
