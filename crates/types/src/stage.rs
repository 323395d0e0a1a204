//! Pipeline stage identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// One discrete step of the build pipeline.
///
/// Stages run in declaration order with no back-edges; a failure in any
/// stage is terminal for the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Fetch,
    Patch,
    Configure,
    Build,
    Install,
    Collect,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fetch => "fetch",
            Self::Patch => "patch",
            Self::Configure => "configure",
            Self::Build => "build",
            Self::Install => "install",
            Self::Collect => "collect",
        };
        write!(f, "{name}")
    }
}

/// Outcome of one executed stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "reason")]
pub enum StageStatus {
    Success,
    Skipped,
    Failure(String),
}

impl StageStatus {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success | Self::Skipped)
    }
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Skipped => write!(f, "skipped"),
            Self::Failure(reason) => write!(f, "failed: {reason}"),
        }
    }
}
