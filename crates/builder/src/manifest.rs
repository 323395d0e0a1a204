//! Project manifest parsing and validation
//!
//! The manifest is the declarative recipe for one library build: package
//! identity, where the sources come from, which patch to apply, which
//! dependency packages are mandatory (with their variable prefixes), and
//! which feature toggles exist with their activated dependencies.

use kiln_errors::{BuildError, ConfigError, Error};
use kiln_types::{OptionToggle, ToggleDependency, Version};
use semver::VersionReq;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

/// `[package]` section of the manifest
#[derive(Debug, Clone, Deserialize)]
pub struct PackageSection {
    pub name: String,
    pub version: Version,
    /// Source archive URL; omit when the source tree is provided locally
    #[serde(default)]
    pub source_url: Option<String>,
    /// Patch file applied before configure, relative to the manifest
    #[serde(default)]
    pub patch: Option<PathBuf>,
}

/// One mandatory dependency and its build-variable prefix
#[derive(Debug, Clone, Deserialize)]
pub struct DependencySpec {
    pub name: String,
    /// Prefix for the emitted `_INCLUDE_DIR` / `_LIBRARY` pair (e.g. "GDAL")
    pub prefix: String,
    /// Accepted registry versions; any version when omitted
    #[serde(default)]
    pub version: Option<VersionReq>,
    /// Library stems to probe instead of the descriptor's own list
    #[serde(default)]
    pub stems: Option<Vec<String>>,
}

/// Toggle declaration with manifest default
#[derive(Debug, Clone, Deserialize)]
pub struct ToggleSpec {
    pub name: String,
    pub flag: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub requires: Vec<ToggleDependency>,
}

/// Parsed project manifest
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectManifest {
    pub package: PackageSection,
    #[serde(default)]
    pub dependencies: Vec<DependencySpec>,
    #[serde(default)]
    pub toggles: Vec<ToggleSpec>,
}

impl ProjectManifest {
    /// Load and validate a manifest file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;

        let manifest: Self = toml::from_str(&contents).map_err(|e| BuildError::ManifestError {
            message: format!("{}: {e}", path.display()),
        })?;

        manifest.validate()?;
        Ok(manifest)
    }

    /// Validate structural invariants the type system cannot express
    ///
    /// # Errors
    ///
    /// Returns `BuildError::ManifestError` on empty names or duplicate
    /// dependency/toggle declarations.
    pub fn validate(&self) -> Result<(), Error> {
        if self.package.name.is_empty() {
            return Err(BuildError::ManifestError {
                message: "package name must not be empty".to_string(),
            }
            .into());
        }

        let mut seen = HashSet::new();
        for dep in &self.dependencies {
            if !seen.insert(dep.name.as_str()) {
                return Err(BuildError::ManifestError {
                    message: format!("dependency {} declared twice", dep.name),
                }
                .into());
            }
        }

        let mut seen = HashSet::new();
        for toggle in &self.toggles {
            if !seen.insert(toggle.name.as_str()) {
                return Err(BuildError::ManifestError {
                    message: format!("toggle {} declared twice", toggle.name),
                }
                .into());
            }
        }

        Ok(())
    }

    /// Fix toggle states from manifest defaults plus CLI overrides.
    ///
    /// The returned toggles are immutable for the rest of the build.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::UnknownToggle` when an override names a toggle
    /// the manifest does not declare.
    pub fn resolve_toggles(
        &self,
        enable: &[String],
        disable: &[String],
    ) -> Result<Vec<OptionToggle>, Error> {
        let declared: HashSet<&str> = self.toggles.iter().map(|t| t.name.as_str()).collect();
        for name in enable.iter().chain(disable) {
            if !declared.contains(name.as_str()) {
                return Err(ConfigError::UnknownToggle { name: name.clone() }.into());
            }
        }

        Ok(self
            .toggles
            .iter()
            .map(|spec| {
                let enabled = if disable.contains(&spec.name) {
                    false
                } else if enable.contains(&spec.name) {
                    true
                } else {
                    spec.default
                };
                OptionToggle {
                    name: spec.name.clone(),
                    flag: spec.flag.clone(),
                    enabled,
                    requires: spec.requires.clone(),
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST_TOML: &str = r#"
[package]
name = "pdal"
version = "1.8.0"
source_url = "https://example.invalid/PDAL-1.8.0.tar.gz"
patch = "pdal.patch"

[[dependencies]]
name = "gdal"
prefix = "GDAL"
version = ">=2.3, <3"

[[dependencies]]
name = "libgeotiff"
prefix = "GEOTIFF"

[[toggles]]
name = "with_laszip"
flag = "WITH_LASZIP"
default = false

[[toggles.requires]]
name = "laszip"
prefix = "LASZIP"
stems = ["laszip", "laszip_api"]
"#;

    #[tokio::test]
    async fn parses_full_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("kiln.toml");
        std::fs::write(&path, MANIFEST_TOML).unwrap();

        let manifest = ProjectManifest::load(&path).await.unwrap();
        assert_eq!(manifest.package.name, "pdal");
        assert_eq!(manifest.package.version, Version::new(1, 8, 0));
        assert_eq!(manifest.dependencies.len(), 2);
        assert!(manifest.dependencies[0]
            .version
            .as_ref()
            .unwrap()
            .matches(&Version::new(2, 3, 2)));
        assert_eq!(manifest.toggles.len(), 1);
        assert_eq!(
            manifest.toggles[0].requires[0].stems,
            Some(vec!["laszip".to_string(), "laszip_api".to_string()])
        );
    }

    #[test]
    fn toggle_defaults_and_overrides() {
        let manifest: ProjectManifest = toml::from_str(MANIFEST_TOML).unwrap();

        let toggles = manifest.resolve_toggles(&[], &[]).unwrap();
        assert!(!toggles[0].enabled);

        let toggles = manifest
            .resolve_toggles(&["with_laszip".to_string()], &[])
            .unwrap();
        assert!(toggles[0].enabled);
        assert_eq!(toggles[0].flag, "WITH_LASZIP");
    }

    #[test]
    fn unknown_override_is_rejected() {
        let manifest: ProjectManifest = toml::from_str(MANIFEST_TOML).unwrap();
        let err = manifest
            .resolve_toggles(&["with_lazperf".to_string()], &[])
            .unwrap_err();
        assert!(err.to_string().contains("unknown toggle"));
    }

    #[test]
    fn duplicate_dependency_fails_validation() {
        let manifest: ProjectManifest = toml::from_str(
            r#"
[package]
name = "pdal"
version = "1.8.0"

[[dependencies]]
name = "gdal"
prefix = "GDAL"

[[dependencies]]
name = "gdal"
prefix = "GDAL2"
"#,
        )
        .unwrap();
        assert!(manifest.validate().is_err());
    }
}
