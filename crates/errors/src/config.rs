//! Configuration error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ConfigError {
    #[error("missing mandatory dependency: {name}")]
    MissingDependency { name: String },

    #[error("dependency {name} version {found} does not satisfy {required}")]
    DependencyVersionMismatch {
        name: String,
        required: String,
        found: String,
    },

    #[error("unknown toggle: {name}")]
    UnknownToggle { name: String },

    #[error("config not found: {path}")]
    NotFound { path: String },

    #[error("invalid config: {message}")]
    Invalid { message: String },

    #[error("config parse error: {message}")]
    ParseError { message: String },
}

impl UserFacingError for ConfigError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingDependency { .. } => {
                Some("Every dependency the manifest names must have a registry entry.")
            }
            Self::DependencyVersionMismatch { .. } => {
                Some("Point the registry at a package version the manifest accepts.")
            }
            Self::UnknownToggle { .. } => {
                Some("Toggles passed on the command line must be declared in the manifest.")
            }
            Self::NotFound { .. } | Self::Invalid { .. } | Self::ParseError { .. } => {
                Some("Check your kiln configuration file.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MissingDependency { .. } => "config.missing_dependency",
            Self::DependencyVersionMismatch { .. } => "config.dependency_version_mismatch",
            Self::UnknownToggle { .. } => "config.unknown_toggle",
            Self::NotFound { .. } => "config.not_found",
            Self::Invalid { .. } => "config.invalid",
            Self::ParseError { .. } => "config.parse_error",
        };
        Some(code)
    }
}
