//! TOML-backed dependency package registry

use kiln_errors::{Error, ResolverError};
use kiln_types::PackageDescriptor;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;

/// On-disk registry document
#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    packages: Vec<PackageDescriptor>,
}

/// Typed mapping from dependency name to its resolved descriptor.
///
/// Descriptors are validated at load time and immutable afterwards; lookup
/// failures are decided by the caller (the configuration builder treats a
/// missing mandatory dependency as fatal, a disabled toggle never looks).
#[derive(Debug, Clone, Default)]
pub struct Registry {
    packages: HashMap<String, PackageDescriptor>,
}

impl Registry {
    /// Load and validate a registry file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// names the same package twice.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;

        let file: RegistryFile = toml::from_str(&contents).map_err(|e| {
            ResolverError::ParseError {
                message: format!("{}: {e}", path.display()),
            }
        })?;

        Self::from_descriptors(file.packages)
    }

    /// Build a registry from already-resolved descriptors
    ///
    /// # Errors
    ///
    /// Returns `ResolverError::DuplicateEntry` if two descriptors share a name.
    pub fn from_descriptors(
        descriptors: impl IntoIterator<Item = PackageDescriptor>,
    ) -> Result<Self, Error> {
        let mut packages = HashMap::new();
        for descriptor in descriptors {
            let name = descriptor.name.clone();
            if packages.insert(name.clone(), descriptor).is_some() {
                return Err(ResolverError::DuplicateEntry { package: name }.into());
            }
        }
        Ok(Self { packages })
    }

    /// Look up a package by name
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&PackageDescriptor> {
        self.packages.get(name)
    }

    /// Number of registered packages
    #[must_use]
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    /// Whether the registry is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_types::Version;

    const REGISTRY_TOML: &str = r#"
[[packages]]
name = "gdal"
version = "2.3.2"
include_paths = ["/deps/gdal/include"]
lib_paths = ["/deps/gdal/lib"]
libs = ["gdal"]

[[packages]]
name = "libgeotiff"
version = "1.4.2"
include_paths = ["/deps/libgeotiff/include"]
lib_paths = ["/deps/libgeotiff/lib"]
libs = ["geotiff", "xtiff"]
"#;

    #[tokio::test]
    async fn loads_and_indexes_packages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.toml");
        std::fs::write(&path, REGISTRY_TOML).unwrap();

        let registry = Registry::load(&path).await.unwrap();
        assert_eq!(registry.len(), 2);

        let gdal = registry.lookup("gdal").unwrap();
        assert_eq!(gdal.version, Version::new(2, 3, 2));
        assert_eq!(gdal.libs, vec!["gdal".to_string()]);
        assert!(registry.lookup("laszip").is_none());
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let a = PackageDescriptor::new("geos", Version::new(3, 7, 0));
        let b = PackageDescriptor::new("geos", Version::new(3, 8, 0));
        let err = Registry::from_descriptors([a, b]).unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }
}
