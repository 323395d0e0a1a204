//! Native build driver seam and its CMake implementation

use crate::context::BuildContext;
use async_trait::async_trait;
use kiln_errors::{BuildError, Result};
use kiln_types::VariableMap;
use tokio::fs;

/// The consumed configure/build/install primitives.
///
/// kiln drives these, it never reimplements them. The trait boundary also
/// lets the pipeline be tested without a native toolchain installed.
#[async_trait]
pub trait BuildDriver: Send + Sync {
    /// Configure the source tree into the build directory with the given
    /// variable mapping. Must be safe to run repeatedly with identical
    /// inputs; the pipeline re-runs it before install.
    async fn configure(&self, ctx: &BuildContext, vars: &VariableMap) -> Result<()>;

    /// Compile the configured tree.
    async fn build(&self, ctx: &BuildContext) -> Result<()>;

    /// Materialize artifacts under the context's install root.
    async fn install(&self, ctx: &BuildContext) -> Result<()>;

    /// Driver name for diagnostics
    fn name(&self) -> &'static str;
}

/// CMake build driver
#[derive(Debug, Clone, Default)]
pub struct CMakeDriver;

impl CMakeDriver {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn configure_args(ctx: &BuildContext, vars: &VariableMap) -> Vec<String> {
        let mut args = vec![ctx.source_dir.display().to_string()];
        args.push(format!(
            "-DCMAKE_INSTALL_PREFIX={}",
            ctx.install_root.display()
        ));
        for (key, value) in vars {
            args.push(format!("-D{key}={}", value.render()));
        }
        args
    }
}

#[async_trait]
impl BuildDriver for CMakeDriver {
    async fn configure(&self, ctx: &BuildContext, vars: &VariableMap) -> Result<()> {
        // Out-of-source build; the build dir may not exist on the first run
        fs::create_dir_all(&ctx.build_dir).await?;

        let args = Self::configure_args(ctx, vars);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();
        let result = ctx.run_command("cmake", &arg_refs, &ctx.build_dir).await?;

        if !result.success {
            return Err(BuildError::ConfigureFailed {
                message: format!(
                    "cmake configuration failed (exit {:?}): {}",
                    result.exit_code, result.stderr
                ),
            }
            .into());
        }

        Ok(())
    }

    async fn build(&self, ctx: &BuildContext) -> Result<()> {
        let jobs = ctx.jobs.to_string();
        let result = ctx
            .run_command(
                "cmake",
                &["--build", ".", "--parallel", &jobs],
                &ctx.build_dir,
            )
            .await?;

        if !result.success {
            return Err(BuildError::CompileFailed {
                message: format!(
                    "cmake build failed (exit {:?}): {}",
                    result.exit_code, result.stderr
                ),
            }
            .into());
        }

        Ok(())
    }

    async fn install(&self, ctx: &BuildContext) -> Result<()> {
        let result = ctx
            .run_command("cmake", &["--install", "."], &ctx.build_dir)
            .await?;

        if !result.success {
            return Err(BuildError::InstallFailed {
                message: format!(
                    "cmake install failed (exit {:?}): {}",
                    result.exit_code, result.stderr
                ),
            }
            .into());
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "cmake"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_types::{Os, PlatformProfile, VariableValue, Version};
    use std::path::Path;

    #[test]
    fn configure_args_are_ordered_and_complete() {
        let profile = PlatformProfile::new(Os::Linux, "x86_64", "gcc");
        let ctx = BuildContext::new(
            "pdal",
            Version::new(1, 8, 0),
            profile,
            Path::new("/b/pdal"),
        );

        let mut vars = VariableMap::new();
        vars.insert("WITH_LASZIP".to_string(), VariableValue::flag(false));
        vars.insert(
            "GDAL_INCLUDE_DIR".to_string(),
            VariableValue::Scalar("/d/include".to_string()),
        );

        let args = CMakeDriver::configure_args(&ctx, &vars);
        assert_eq!(args[0], "/b/pdal/source");
        assert_eq!(args[1], "-DCMAKE_INSTALL_PREFIX=/b/pdal/install");
        // BTreeMap ordering keeps repeated invocations identical
        assert_eq!(args[2], "-DGDAL_INCLUDE_DIR=/d/include");
        assert_eq!(args[3], "-DWITH_LASZIP=OFF");
    }
}
