//! Patch tool seam and its system `patch` implementation

use crate::context::BuildContext;
use async_trait::async_trait;
use kiln_errors::{BuildError, Result};
use kiln_events::{AppEvent, BuildEvent, EventEmitter};
use std::path::Path;

/// The consumed patch-application primitive.
///
/// Patch application is not idempotent: applying against an already-patched
/// tree corrupts state, so implementations must refuse unclean applications
/// before touching anything.
#[async_trait]
pub trait Patcher: Send + Sync {
    /// Apply `patch_file` to `target_dir`, failing without side effects when
    /// it does not apply cleanly.
    async fn apply(&self, ctx: &BuildContext, patch_file: &Path, target_dir: &Path) -> Result<()>;
}

/// Patcher backed by the system `patch` tool
#[derive(Debug, Clone, Default)]
pub struct SystemPatcher;

impl SystemPatcher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Patcher for SystemPatcher {
    async fn apply(&self, ctx: &BuildContext, patch_file: &Path, target_dir: &Path) -> Result<()> {
        let patch_arg = patch_file.display().to_string();
        let patch_name = patch_file
            .file_name()
            .map_or_else(|| patch_arg.clone(), |n| n.to_string_lossy().into_owned());

        // Probe before mutating anything
        let dry = ctx
            .run_command(
                "patch",
                &["-p0", "--dry-run", "--batch", "-i", &patch_arg],
                target_dir,
            )
            .await?;

        if !dry.success {
            // A patch that reverse-applies cleanly is already in the tree;
            // distinguish that from a genuine content mismatch.
            let reverse = ctx
                .run_command(
                    "patch",
                    &["-p0", "--dry-run", "--batch", "-R", "-i", &patch_arg],
                    target_dir,
                )
                .await?;

            if reverse.success {
                return Err(BuildError::PatchAlreadyApplied { patch: patch_name }.into());
            }
            return Err(BuildError::PatchFailed {
                patch: patch_name,
                message: format!(
                    "does not apply cleanly (exit {:?}): {}",
                    dry.exit_code,
                    dry.stdout.trim()
                ),
            }
            .into());
        }

        let applied = ctx
            .run_command("patch", &["-p0", "--batch", "-i", &patch_arg], target_dir)
            .await?;

        if !applied.success {
            return Err(BuildError::PatchFailed {
                patch: patch_name,
                message: format!(
                    "application failed after clean dry run (exit {:?}): {}",
                    applied.exit_code,
                    applied.stdout.trim()
                ),
            }
            .into());
        }

        ctx.emit(AppEvent::Build(BuildEvent::PatchApplied { patch: patch_name }));
        Ok(())
    }
}
