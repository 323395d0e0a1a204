//! Build context and external command execution

use kiln_errors::{Error, Result};
use kiln_events::{AppEvent, BuildEvent, EventEmitter, EventSender};
use kiln_types::{PlatformProfile, Version};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Captured outcome of one external command
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Everything one build needs to know about itself.
///
/// The source/build/staging triple is exclusively owned by this context for
/// its lifetime; isolation between concurrent builds is achieved by giving
/// each its own triple, never by in-process locking.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Package name being built
    pub name: String,
    /// Package version being built
    pub version: Version,
    /// Target platform
    pub profile: PlatformProfile,
    /// Extracted source tree
    pub source_dir: PathBuf,
    /// Out-of-source build directory
    pub build_dir: PathBuf,
    /// Install root artifacts are materialized under
    pub install_root: PathBuf,
    /// Parallel build jobs
    pub jobs: usize,
    /// Event channel back to the CLI
    pub event_sender: Option<EventSender>,
}

impl BuildContext {
    /// Create a context rooted at `build_root`, deriving the conventional
    /// source/build/staging triple below it.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        version: Version,
        profile: PlatformProfile,
        build_root: &Path,
    ) -> Self {
        Self {
            name: name.into(),
            version,
            profile,
            source_dir: build_root.join("source"),
            build_dir: build_root.join("build"),
            install_root: build_root.join("install"),
            jobs: 1,
            event_sender: None,
        }
    }

    /// Set the parallel job count
    #[must_use]
    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Attach an event sender
    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Execute an external command, capturing output.
    ///
    /// A non-zero exit is reported in the result, not as an `Err`; callers
    /// decide which domain error a failure maps to.
    ///
    /// # Errors
    ///
    /// Returns an error only when the command cannot be spawned at all
    /// (missing binary, bad working directory).
    pub async fn run_command(
        &self,
        program: &str,
        args: &[&str],
        working_dir: &Path,
    ) -> Result<CommandResult> {
        let rendered = format!("{program} {}", args.join(" "));
        self.emit(AppEvent::Build(BuildEvent::CommandStarted {
            command: rendered.clone(),
            working_dir: working_dir.to_path_buf(),
        }));

        let output = Command::new(program)
            .args(args)
            .current_dir(working_dir)
            .output()
            .await
            .map_err(|e| Error::io_with_path(&e, working_dir))?;

        let result = CommandResult {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        self.emit(AppEvent::Build(BuildEvent::CommandCompleted {
            command: rendered,
            exit_code: result.exit_code,
        }));

        Ok(result)
    }
}

impl EventEmitter for BuildContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_types::Os;

    #[test]
    fn triple_derives_from_build_root() {
        let profile = PlatformProfile::new(Os::Linux, "x86_64", "gcc");
        let ctx = BuildContext::new(
            "pdal",
            Version::new(1, 8, 0),
            profile,
            Path::new("/tmp/kiln/pdal"),
        );
        assert_eq!(ctx.source_dir, PathBuf::from("/tmp/kiln/pdal/source"));
        assert_eq!(ctx.build_dir, PathBuf::from("/tmp/kiln/pdal/build"));
        assert_eq!(ctx.install_root, PathBuf::from("/tmp/kiln/pdal/install"));
    }

    #[test]
    fn jobs_never_zero() {
        let profile = PlatformProfile::new(Os::Linux, "x86_64", "gcc");
        let ctx = BuildContext::new("pdal", Version::new(1, 8, 0), profile, Path::new("/b"))
            .with_jobs(0);
        assert_eq!(ctx.jobs, 1);
    }

    #[tokio::test]
    async fn captures_command_output() {
        let profile = PlatformProfile::new(Os::Linux, "x86_64", "gcc");
        let dir = tempfile::tempdir().unwrap();
        let ctx = BuildContext::new("pdal", Version::new(1, 8, 0), profile, dir.path());

        let result = ctx
            .run_command("sh", &["-c", "echo out; echo err >&2"], dir.path())
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.stdout.trim(), "out");
        assert_eq!(result.stderr.trim(), "err");
    }
}
