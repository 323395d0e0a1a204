//! Configuration variable assembly
//!
//! Translates resolved dependency packages and toggle decisions into the
//! flat variable mapping handed to the native build driver. Output is
//! deterministic: identical descriptors, toggle states, and filesystem
//! contents produce a byte-for-byte identical mapping.

use crate::manifest::DependencySpec;
use kiln_errors::{ConfigError, Error, Result};
use kiln_resolver::{resolve_artifacts, Registry};
use kiln_types::{OptionToggle, PackageDescriptor, PlatformProfile, VariableMap, VariableValue};

/// Build the full variable mapping for one configure invocation.
///
/// Every mandatory dependency contributes `<PREFIX>_INCLUDE_DIR` and
/// `<PREFIX>_LIBRARY`. An enabled toggle contributes `<FLAG>=ON` plus the
/// same pair for each dependency it activates; a disabled toggle
/// contributes exactly `<FLAG>=OFF` and its dependencies are deliberately
/// never resolved, even when descriptors for them exist. Self-tests and
/// example builds of the target library are always suppressed.
///
/// # Errors
///
/// Returns `ConfigError::MissingDependency` when a required descriptor is
/// absent from the registry, and propagates resolver failures for
/// descriptors without a library search path.
pub fn build_variables(
    registry: &Registry,
    dependencies: &[DependencySpec],
    toggles: &[OptionToggle],
    profile: &PlatformProfile,
) -> Result<VariableMap> {
    let mut vars = VariableMap::new();

    for dep in dependencies {
        let descriptor = lookup(registry, &dep.name)?;
        if let Some(required) = &dep.version {
            if !required.matches(&descriptor.version) {
                return Err(ConfigError::DependencyVersionMismatch {
                    name: dep.name.clone(),
                    required: required.to_string(),
                    found: descriptor.version.to_string(),
                }
                .into());
            }
        }
        insert_dependency_vars(
            &mut vars,
            descriptor,
            &dep.prefix,
            dep.stems.as_deref(),
            profile,
        )?;
    }

    for toggle in toggles {
        vars.insert(toggle.flag.clone(), VariableValue::flag(toggle.enabled));
        if !toggle.enabled {
            continue;
        }
        for req in &toggle.requires {
            let descriptor = lookup(registry, &req.name)?;
            insert_dependency_vars(
                &mut vars,
                descriptor,
                &req.prefix,
                req.stems.as_deref(),
                profile,
            )?;
        }
    }

    // Library-only, non-interactive build policy
    vars.insert("WITH_TESTS".to_string(), VariableValue::flag(false));
    vars.insert("WITH_EXAMPLES".to_string(), VariableValue::flag(false));

    Ok(vars)
}

fn lookup<'a>(registry: &'a Registry, name: &str) -> Result<&'a PackageDescriptor> {
    registry.lookup(name).ok_or_else(|| {
        Error::from(ConfigError::MissingDependency {
            name: name.to_string(),
        })
    })
}

fn insert_dependency_vars(
    vars: &mut VariableMap,
    descriptor: &PackageDescriptor,
    prefix: &str,
    stems: Option<&[String]>,
    profile: &PlatformProfile,
) -> Result<()> {
    let include_dir = descriptor.include_paths.first().ok_or_else(|| {
        Error::from(ConfigError::Invalid {
            message: format!("package {} has no include path", descriptor.name),
        })
    })?;

    let artifacts = resolve_artifacts(descriptor, stems, profile)?;
    let rendered: Vec<String> = artifacts
        .iter()
        .map(|p| p.display().to_string())
        .collect();

    vars.insert(
        format!("{prefix}_INCLUDE_DIR"),
        VariableValue::Scalar(include_dir.display().to_string()),
    );
    vars.insert(format!("{prefix}_LIBRARY"), VariableValue::List(rendered));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_types::{Os, ToggleDependency, Version};
    use std::fs;
    use std::path::Path;

    fn linux() -> PlatformProfile {
        PlatformProfile::new(Os::Linux, "x86_64", "gcc")
    }

    fn gdal_descriptor(root: &Path) -> PackageDescriptor {
        PackageDescriptor::new("gdal", Version::new(2, 3, 2))
            .with_include_path(root.join("include"))
            .with_lib_path(root.join("lib"))
            .with_lib("gdal")
    }

    fn spec(name: &str, prefix: &str) -> DependencySpec {
        DependencySpec {
            name: name.to_string(),
            prefix: prefix.to_string(),
            version: None,
            stems: None,
        }
    }

    #[test]
    fn mandatory_dependency_emits_include_and_library() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("lib")).unwrap();
        fs::create_dir_all(dir.path().join("include")).unwrap();
        fs::write(dir.path().join("lib/libgdal.so"), b"").unwrap();

        let registry = Registry::from_descriptors([gdal_descriptor(dir.path())]).unwrap();
        let vars =
            build_variables(&registry, &[spec("gdal", "GDAL")], &[], &linux()).unwrap();

        assert_eq!(
            vars["GDAL_INCLUDE_DIR"].render(),
            dir.path().join("include").display().to_string()
        );
        assert_eq!(
            vars["GDAL_LIBRARY"].render(),
            dir.path().join("lib/libgdal.so").display().to_string()
        );
    }

    #[test]
    fn missing_mandatory_dependency_is_config_error() {
        let registry = Registry::default();
        let err =
            build_variables(&registry, &[spec("gdal", "GDAL")], &[], &linux()).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingDependency { ref name }) if name == "gdal"
        ));
    }

    #[test]
    fn version_mismatch_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("lib")).unwrap();
        fs::create_dir_all(dir.path().join("include")).unwrap();

        let registry = Registry::from_descriptors([gdal_descriptor(dir.path())]).unwrap();
        let mut dep = spec("gdal", "GDAL");
        dep.version = Some(">=3.0".parse().unwrap());

        let err = build_variables(&registry, &[dep], &[], &linux()).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::DependencyVersionMismatch { ref found, .. })
                if found == "2.3.2"
        ));
    }

    #[test]
    fn disabled_toggle_emits_only_its_flag() {
        let toggle = OptionToggle::new("with_laszip", "WITH_LASZIP", false).with_dependency(
            ToggleDependency {
                name: "laszip".to_string(),
                prefix: "LASZIP".to_string(),
                stems: Some(vec!["laszip".to_string(), "laszip_api".to_string()]),
            },
        );

        // No laszip descriptor registered; a disabled toggle must not care.
        let registry = Registry::default();
        let vars = build_variables(&registry, &[], &[toggle], &linux()).unwrap();

        assert_eq!(vars["WITH_LASZIP"].render(), "OFF");
        assert!(!vars.keys().any(|k| k.starts_with("LASZIP_")));
    }

    #[test]
    fn enabled_toggle_without_descriptor_is_config_error() {
        let toggle = OptionToggle::new("with_laszip", "WITH_LASZIP", true).with_dependency(
            ToggleDependency {
                name: "laszip".to_string(),
                prefix: "LASZIP".to_string(),
                stems: None,
            },
        );

        let registry = Registry::default();
        let err = build_variables(&registry, &[], &[toggle], &linux()).unwrap_err();
        assert!(matches!(
            err,
            Error::Config(ConfigError::MissingDependency { ref name }) if name == "laszip"
        ));
    }

    #[test]
    fn enabled_toggle_resolves_its_dependencies() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("lib")).unwrap();
        fs::create_dir_all(dir.path().join("include")).unwrap();
        fs::write(dir.path().join("lib/liblaszip.so"), b"").unwrap();
        fs::write(dir.path().join("lib/liblaszip_api.so"), b"").unwrap();

        let laszip = PackageDescriptor::new("laszip", Version::new(3, 1, 1))
            .with_include_path(dir.path().join("include"))
            .with_lib_path(dir.path().join("lib"))
            .with_lib("laszip");
        let registry = Registry::from_descriptors([laszip]).unwrap();

        let toggle = OptionToggle::new("with_laszip", "WITH_LASZIP", true).with_dependency(
            ToggleDependency {
                name: "laszip".to_string(),
                prefix: "LASZIP".to_string(),
                stems: Some(vec!["laszip".to_string(), "laszip_api".to_string()]),
            },
        );

        let vars = build_variables(&registry, &[], &[toggle], &linux()).unwrap();
        assert_eq!(vars["WITH_LASZIP"].render(), "ON");
        assert_eq!(
            vars["LASZIP_LIBRARY"].render(),
            format!(
                "{};{}",
                dir.path().join("lib/liblaszip.so").display(),
                dir.path().join("lib/liblaszip_api.so").display()
            )
        );
    }

    #[test]
    fn suppression_flags_always_present() {
        let registry = Registry::default();
        let vars = build_variables(&registry, &[], &[], &linux()).unwrap();
        assert_eq!(vars["WITH_TESTS"].render(), "OFF");
        assert_eq!(vars["WITH_EXAMPLES"].render(), "OFF");
        assert_eq!(vars.len(), 2);
    }

    #[test]
    fn identical_inputs_yield_identical_output() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("lib")).unwrap();
        fs::create_dir_all(dir.path().join("include")).unwrap();
        fs::write(dir.path().join("lib/libgdal.so"), b"").unwrap();

        let registry = Registry::from_descriptors([gdal_descriptor(dir.path())]).unwrap();
        let deps = [spec("gdal", "GDAL")];
        let toggles = [OptionToggle::new("with_laszip", "WITH_LASZIP", false)];

        let first = build_variables(&registry, &deps, &toggles, &linux()).unwrap();
        let second = build_variables(&registry, &deps, &toggles, &linux()).unwrap();
        assert_eq!(first, second);
    }
}
