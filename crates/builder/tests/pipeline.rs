//! Pipeline integration tests with mocked external collaborators

use async_trait::async_trait;
use kiln_builder::{BuildContext, BuildDriver, Builder, Patcher, ProjectManifest};
use kiln_errors::{BuildError, ConfigError, Error, Result};
use kiln_resolver::Registry;
use kiln_types::{Os, PackageDescriptor, PlatformProfile, Stage, StageStatus, VariableMap, Version};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Records driver invocations and fakes an install tree
struct MockDriver {
    calls: Arc<Mutex<Vec<String>>>,
    installs: PathBuf,
}

#[async_trait]
impl BuildDriver for MockDriver {
    async fn configure(&self, _ctx: &BuildContext, vars: &VariableMap) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("configure:{}", vars.len()));
        Ok(())
    }

    async fn build(&self, _ctx: &BuildContext) -> Result<()> {
        self.calls.lock().unwrap().push("build".to_string());
        Ok(())
    }

    async fn install(&self, ctx: &BuildContext) -> Result<()> {
        self.calls.lock().unwrap().push("install".to_string());
        let lib_dir = ctx.install_root.join("lib");
        std::fs::create_dir_all(&lib_dir).unwrap();
        std::fs::write(lib_dir.join(&self.installs), b"").unwrap();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Patcher that always reports an unclean application
struct RejectingPatcher;

#[async_trait]
impl Patcher for RejectingPatcher {
    async fn apply(&self, _ctx: &BuildContext, patch_file: &Path, _target: &Path) -> Result<()> {
        Err(BuildError::PatchFailed {
            patch: patch_file.display().to_string(),
            message: "content mismatch".to_string(),
        }
        .into())
    }
}

fn manifest(patch: bool, with_toggle_default: bool) -> ProjectManifest {
    let patch_line = if patch { "patch = \"pdal.patch\"\n" } else { "" };
    let toml = format!(
        r#"
[package]
name = "pdal"
version = "1.8.0"
{patch_line}
[[dependencies]]
name = "gdal"
prefix = "GDAL"

[[toggles]]
name = "with_laszip"
flag = "WITH_LASZIP"
default = {with_toggle_default}

[[toggles.requires]]
name = "laszip"
prefix = "LASZIP"
stems = ["laszip", "laszip_api"]
"#
    );
    toml::from_str(&toml).unwrap()
}

fn registry_with_gdal(deps_root: &Path) -> Registry {
    let include = deps_root.join("gdal/include");
    let lib = deps_root.join("gdal/lib");
    std::fs::create_dir_all(&include).unwrap();
    std::fs::create_dir_all(&lib).unwrap();
    std::fs::write(lib.join("libgdal.so"), b"").unwrap();

    let gdal = PackageDescriptor::new("gdal", Version::new(2, 3, 2))
        .with_include_path(include)
        .with_lib_path(lib)
        .with_lib("gdal");
    Registry::from_descriptors([gdal]).unwrap()
}

fn context(root: &Path) -> BuildContext {
    let profile = PlatformProfile::new(Os::Linux, "x86_64", "gcc");
    let ctx = BuildContext::new("pdal", Version::new(1, 8, 0), profile, root);
    std::fs::create_dir_all(&ctx.source_dir).unwrap();
    ctx
}

#[tokio::test]
async fn successful_run_configures_twice_and_collects() {
    let root = tempfile::tempdir().unwrap();
    let deps = tempfile::tempdir().unwrap();
    let ctx = context(root.path());

    let calls = Arc::new(Mutex::new(Vec::new()));
    let driver = MockDriver {
        calls: calls.clone(),
        installs: PathBuf::from("libpdalcpp.so"),
    };

    let builder = Builder::new(registry_with_gdal(deps.path())).with_driver(Arc::new(driver));
    let report = builder
        .build(&ctx, &manifest(false, false), root.path(), &[], &[])
        .await
        .unwrap();

    let calls = calls.lock().unwrap().clone();
    assert_eq!(
        calls,
        vec!["configure:5", "build", "configure:5", "install"]
    );

    assert!(report.succeeded());
    let stages: Vec<Stage> = report.stages.iter().map(|r| r.stage).collect();
    assert_eq!(
        stages,
        vec![
            Stage::Fetch,
            Stage::Patch,
            Stage::Configure,
            Stage::Build,
            Stage::Configure,
            Stage::Install,
            Stage::Collect,
        ]
    );
    assert_eq!(report.stages[0].status, StageStatus::Skipped);
    assert_eq!(report.stages[1].status, StageStatus::Skipped);

    assert_eq!(report.artifacts.len(), 1);
    assert_eq!(report.artifacts[0].stem, "pdalcpp");
}

#[tokio::test]
async fn failed_patch_halts_before_configure() {
    let root = tempfile::tempdir().unwrap();
    let deps = tempfile::tempdir().unwrap();
    let ctx = context(root.path());

    let calls = Arc::new(Mutex::new(Vec::new()));
    let driver = MockDriver {
        calls: calls.clone(),
        installs: PathBuf::from("libpdalcpp.so"),
    };

    let builder = Builder::new(registry_with_gdal(deps.path()))
        .with_driver(Arc::new(driver))
        .with_patcher(Arc::new(RejectingPatcher));

    let err = builder
        .build(&ctx, &manifest(true, false), root.path(), &[], &[])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Build(BuildError::PatchFailed { .. })
    ));
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn enabled_toggle_without_registry_entry_fails_configure() {
    let root = tempfile::tempdir().unwrap();
    let deps = tempfile::tempdir().unwrap();
    let ctx = context(root.path());

    let calls = Arc::new(Mutex::new(Vec::new()));
    let driver = MockDriver {
        calls: calls.clone(),
        installs: PathBuf::from("libpdalcpp.so"),
    };

    let builder = Builder::new(registry_with_gdal(deps.path())).with_driver(Arc::new(driver));
    let err = builder
        .build(
            &ctx,
            &manifest(false, false),
            root.path(),
            &["with_laszip".to_string()],
            &[],
        )
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Config(ConfigError::MissingDependency { ref name }) if name == "laszip"
    ));
    // The driver is never reached; variable assembly fails first
    assert!(calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn missing_source_and_url_is_a_manifest_error() {
    let root = tempfile::tempdir().unwrap();
    let deps = tempfile::tempdir().unwrap();
    let profile = PlatformProfile::new(Os::Linux, "x86_64", "gcc");
    // No source dir created and the manifest has no source_url
    let ctx = BuildContext::new("pdal", Version::new(1, 8, 0), profile, root.path());

    let builder = Builder::new(registry_with_gdal(deps.path()));
    let err = builder
        .build(&ctx, &manifest(false, false), root.path(), &[], &[])
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Build(BuildError::ManifestError { .. })
    ));
}
