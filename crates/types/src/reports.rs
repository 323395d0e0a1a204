//! Report type definitions for completed builds

use crate::stage::{Stage, StageStatus};
use crate::Version;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A library artifact discovered in the install tree
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Library stem without prefix or suffix (e.g. "pdalcpp")
    pub stem: String,
    /// Path relative to the install root
    pub path: PathBuf,
}

/// Per-stage record for the final report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StageRecord {
    pub stage: Stage,
    pub status: StageStatus,
    pub duration_ms: u64,
}

/// Build report
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildReport {
    /// Package that was built
    pub package: String,
    /// Version that was built
    pub version: Version,
    /// Install root the artifacts were materialized under
    pub install_root: PathBuf,
    /// Stages in execution order
    pub stages: Vec<StageRecord>,
    /// Artifacts found after install
    pub artifacts: Vec<ArtifactEntry>,
    /// Total execution time
    pub duration_ms: u64,
}

impl BuildReport {
    /// Whether every stage completed
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.stages.iter().all(|record| record.status.is_success())
    }
}
