//! Dependency resolution error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ResolverError {
    #[error("package {package} has no library search path")]
    NoSearchPath { package: String },

    #[error("package not found in registry: {package}")]
    PackageNotFound { package: String },

    #[error("duplicate registry entry: {package}")]
    DuplicateEntry { package: String },

    #[error("registry parse error: {message}")]
    ParseError { message: String },
}

impl UserFacingError for ResolverError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NoSearchPath { .. } => {
                Some("The registry entry must list at least one lib path for the package.")
            }
            Self::PackageNotFound { .. } => {
                Some("Add the package to the registry file or disable the feature that needs it.")
            }
            Self::DuplicateEntry { .. } | Self::ParseError { .. } => {
                Some("Fix the registry file and rerun.")
            }
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NoSearchPath { .. } => "resolver.no_search_path",
            Self::PackageNotFound { .. } => "resolver.package_not_found",
            Self::DuplicateEntry { .. } => "resolver.duplicate_entry",
            Self::ParseError { .. } => "resolver.parse_error",
        };
        Some(code)
    }
}
