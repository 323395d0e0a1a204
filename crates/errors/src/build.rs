//! Build pipeline error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum BuildError {
    #[error("fetch failed: {url}")]
    FetchFailed { url: String },

    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("patch failed: {patch}: {message}")]
    PatchFailed { patch: String, message: String },

    #[error("patch already applied: {patch}")]
    PatchAlreadyApplied { patch: String },

    #[error("configure failed: {message}")]
    ConfigureFailed { message: String },

    #[error("compile failed: {message}")]
    CompileFailed { message: String },

    #[error("install failed: {message}")]
    InstallFailed { message: String },

    #[error("manifest error: {message}")]
    ManifestError { message: String },

    #[error("missing tool: {name}")]
    MissingTool { name: String },

    #[error("stage {stage} failed: {message}")]
    StageFailed { stage: String, message: String },
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::FetchFailed { .. } => {
                Some("Check network access or place the extracted sources in the source directory.")
            }
            Self::PatchFailed { .. } => {
                Some("Update the patch so it applies cleanly to the current sources.")
            }
            Self::PatchAlreadyApplied { .. } => {
                Some("Start from a pristine source tree; patching is not idempotent.")
            }
            Self::MissingTool { .. } => Some("Install the tool or make sure it is on PATH."),
            Self::ManifestError { .. } => {
                Some("Correct the project manifest before retrying the build.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::FetchFailed { .. } => "build.fetch_failed",
            Self::ExtractionFailed { .. } => "build.extraction_failed",
            Self::PatchFailed { .. } => "build.patch_failed",
            Self::PatchAlreadyApplied { .. } => "build.patch_already_applied",
            Self::ConfigureFailed { .. } => "build.configure_failed",
            Self::CompileFailed { .. } => "build.compile_failed",
            Self::InstallFailed { .. } => "build.install_failed",
            Self::ManifestError { .. } => "build.manifest_error",
            Self::MissingTool { .. } => "build.missing_tool",
            Self::StageFailed { .. } => "build.stage_failed",
        };
        Some(code)
    }
}
