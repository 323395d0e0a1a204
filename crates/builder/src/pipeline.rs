//! Build pipeline orchestration
//!
//! Sequences fetch -> patch -> configure -> build -> configure -> install
//! -> collect with hard ordering and fail-fast semantics. Configure runs a
//! second time before install so the install step always sees freshly
//! recomputed variables; with identical inputs the rerun is a no-op.

use crate::artifacts::collect_artifacts;
use crate::cmake::{BuildDriver, CMakeDriver};
use crate::context::BuildContext;
use crate::fetch::{HttpFetcher, SourceFetcher};
use crate::manifest::ProjectManifest;
use crate::patch::{Patcher, SystemPatcher};
use crate::variables::build_variables;
use kiln_errors::{BuildError, Error, Result};
use kiln_events::{AppEvent, BuildEvent, EventEmitter, ResolverEvent};
use kiln_resolver::Registry;
use kiln_types::{BuildReport, OptionToggle, Stage, StageRecord, StageStatus, VariableMap};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

/// Orchestrates one library build end to end.
///
/// The external collaborators default to the real implementations (CMake,
/// the system patch tool, HTTP tarball fetching) and can be swapped at the
/// trait seams.
#[derive(Clone)]
pub struct Builder {
    registry: Registry,
    driver: Arc<dyn BuildDriver>,
    patcher: Arc<dyn Patcher>,
    fetcher: Arc<dyn SourceFetcher>,
}

impl Builder {
    /// Create a builder over a loaded registry with default collaborators
    #[must_use]
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            driver: Arc::new(CMakeDriver::new()),
            patcher: Arc::new(SystemPatcher::new()),
            fetcher: Arc::new(HttpFetcher::new()),
        }
    }

    /// Replace the native build driver
    #[must_use]
    pub fn with_driver(mut self, driver: Arc<dyn BuildDriver>) -> Self {
        self.driver = driver;
        self
    }

    /// Replace the patch tool
    #[must_use]
    pub fn with_patcher(mut self, patcher: Arc<dyn Patcher>) -> Self {
        self.patcher = patcher;
        self
    }

    /// Replace the source fetcher
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: Arc<dyn SourceFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Run the full pipeline for one manifest.
    ///
    /// `manifest_dir` anchors relative paths in the manifest (the patch
    /// file). Toggle overrides are applied on top of manifest defaults and
    /// frozen before any stage runs.
    ///
    /// # Errors
    ///
    /// Returns the first stage failure; later stages do not run and no
    /// partial results are promoted.
    pub async fn build(
        &self,
        ctx: &BuildContext,
        manifest: &ProjectManifest,
        manifest_dir: &Path,
        enable: &[String],
        disable: &[String],
    ) -> Result<BuildReport> {
        let toggles = manifest.resolve_toggles(enable, disable)?;

        ctx.emit(AppEvent::Build(BuildEvent::SessionStarted {
            package: ctx.name.clone(),
            version: ctx.version.clone(),
        }));
        for toggle in toggles.iter().filter(|t| !t.enabled) {
            ctx.emit(AppEvent::Resolver(ResolverEvent::ToggleSkipped {
                toggle: toggle.name.clone(),
            }));
        }

        let started = Instant::now();
        let mut records = Vec::new();

        self.fetch_stage(ctx, manifest, &mut records).await?;
        self.patch_stage(ctx, manifest, manifest_dir, &mut records)
            .await?;

        let vars = self.configure_stage(ctx, manifest, &toggles, &mut records).await?;

        run_stage(ctx, Stage::Build, &mut records, self.driver.build(ctx)).await?;

        // Re-run configure so install consumes freshly recomputed variables;
        // identical inputs make this a cache no-op for the driver.
        let reconfigured = self.configure_stage(ctx, manifest, &toggles, &mut records).await?;
        debug_assert_eq!(vars, reconfigured);

        run_stage(ctx, Stage::Install, &mut records, self.driver.install(ctx)).await?;

        let artifacts = {
            let collected = run_stage_value(
                ctx,
                Stage::Collect,
                &mut records,
                collect_artifacts(&ctx.install_root, &ctx.profile),
            )
            .await?;
            ctx.emit(AppEvent::Build(BuildEvent::ArtifactsCollected {
                install_root: ctx.install_root.clone(),
                count: collected.len(),
            }));
            collected
        };

        let duration_ms = elapsed_ms(started);
        ctx.emit(AppEvent::Build(BuildEvent::SessionCompleted {
            package: ctx.name.clone(),
            version: ctx.version.clone(),
            duration_ms,
            artifacts: artifacts.len(),
        }));

        Ok(BuildReport {
            package: ctx.name.clone(),
            version: ctx.version.clone(),
            install_root: ctx.install_root.clone(),
            stages: records,
            artifacts,
            duration_ms,
        })
    }

    async fn fetch_stage(
        &self,
        ctx: &BuildContext,
        manifest: &ProjectManifest,
        records: &mut Vec<StageRecord>,
    ) -> Result<()> {
        if ctx.source_dir.exists() {
            ctx.emit_debug(format!(
                "source tree present at {}, skipping fetch",
                ctx.source_dir.display()
            ));
            records.push(StageRecord {
                stage: Stage::Fetch,
                status: StageStatus::Skipped,
                duration_ms: 0,
            });
            return Ok(());
        }

        let Some(url) = manifest.package.source_url.clone() else {
            let err: Error = BuildError::ManifestError {
                message: format!(
                    "no source tree at {} and no source_url to fetch",
                    ctx.source_dir.display()
                ),
            }
            .into();
            record_failure(ctx, Stage::Fetch, records, &err);
            return Err(err);
        };

        let dest = ctx.source_dir.clone();
        run_stage(
            ctx,
            Stage::Fetch,
            records,
            self.fetcher.fetch(ctx, &url, &dest),
        )
        .await
    }

    async fn patch_stage(
        &self,
        ctx: &BuildContext,
        manifest: &ProjectManifest,
        manifest_dir: &Path,
        records: &mut Vec<StageRecord>,
    ) -> Result<()> {
        let Some(patch) = &manifest.package.patch else {
            records.push(StageRecord {
                stage: Stage::Patch,
                status: StageStatus::Skipped,
                duration_ms: 0,
            });
            return Ok(());
        };

        let patch_file: PathBuf = if patch.is_absolute() {
            patch.clone()
        } else {
            manifest_dir.join(patch)
        };

        run_stage(
            ctx,
            Stage::Patch,
            records,
            self.patcher.apply(ctx, &patch_file, &ctx.source_dir),
        )
        .await
    }

    async fn configure_stage(
        &self,
        ctx: &BuildContext,
        manifest: &ProjectManifest,
        toggles: &[OptionToggle],
        records: &mut Vec<StageRecord>,
    ) -> Result<VariableMap> {
        run_stage_value(ctx, Stage::Configure, records, async {
            let vars = build_variables(
                &self.registry,
                &manifest.dependencies,
                toggles,
                &ctx.profile,
            )?;
            self.driver.configure(ctx, &vars).await?;
            Ok(vars)
        })
        .await
    }
}

/// Run a stage producing a value, recording outcome and emitting events.
async fn run_stage_value<T, F>(
    ctx: &BuildContext,
    stage: Stage,
    records: &mut Vec<StageRecord>,
    fut: F,
) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    ctx.emit(AppEvent::Build(BuildEvent::StageStarted {
        package: ctx.name.clone(),
        stage,
    }));

    let started = Instant::now();
    match fut.await {
        Ok(value) => {
            let duration_ms = elapsed_ms(started);
            records.push(StageRecord {
                stage,
                status: StageStatus::Success,
                duration_ms,
            });
            ctx.emit(AppEvent::Build(BuildEvent::StageCompleted {
                package: ctx.name.clone(),
                stage,
                duration_ms,
            }));
            Ok(value)
        }
        Err(err) => {
            record_failure(ctx, stage, records, &err);
            Err(err)
        }
    }
}

/// Run a unit stage
async fn run_stage<F>(
    ctx: &BuildContext,
    stage: Stage,
    records: &mut Vec<StageRecord>,
    fut: F,
) -> Result<()>
where
    F: Future<Output = Result<()>>,
{
    run_stage_value(ctx, stage, records, fut).await
}

fn record_failure(ctx: &BuildContext, stage: Stage, records: &mut Vec<StageRecord>, err: &Error) {
    records.push(StageRecord {
        stage,
        status: StageStatus::Failure(err.to_string()),
        duration_ms: 0,
    });
    ctx.emit(AppEvent::Build(BuildEvent::StageFailed {
        package: ctx.name.clone(),
        stage,
        error: err.to_string(),
    }));
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
