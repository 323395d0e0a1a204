#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for the kiln build orchestrator
//!
//! This crate provides the fundamental types used throughout the system:
//! resolved dependency descriptors, platform profiles, feature toggles,
//! build variables, and pipeline stages.

pub mod package;
pub mod platform;
pub mod reports;
pub mod stage;
pub mod toggle;
pub mod variables;

// Re-export commonly used types
pub use package::PackageDescriptor;
pub use platform::{Os, PlatformProfile};
pub use reports::{ArtifactEntry, BuildReport, StageRecord};
pub use semver::Version;
pub use stage::{Stage, StageStatus};
pub use toggle::{OptionToggle, ToggleDependency};
pub use variables::{VariableMap, VariableValue};

use serde::{Deserialize, Serialize};

/// Output format for CLI commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Plain,
    Tty,
    Json,
}
