//! Resolved dependency package metadata

use crate::Version;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Resolved metadata for one external dependency package.
///
/// Descriptors are produced by the registry and are immutable afterwards;
/// the configuration builder owns a lookup table of them for the duration
/// of a single build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageDescriptor {
    pub name: String,
    pub version: Version,
    /// Header search paths, most specific first
    #[serde(default)]
    pub include_paths: Vec<PathBuf>,
    /// Library search paths, most specific first
    #[serde(default)]
    pub lib_paths: Vec<PathBuf>,
    /// Library file stems without prefix or suffix (e.g. "gdal")
    #[serde(default)]
    pub libs: Vec<String>,
}

impl PackageDescriptor {
    /// Create a descriptor with empty path sets
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            include_paths: Vec::new(),
            lib_paths: Vec::new(),
            libs: Vec::new(),
        }
    }

    /// Add an include path
    #[must_use]
    pub fn with_include_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.include_paths.push(path.into());
        self
    }

    /// Add a library search path
    #[must_use]
    pub fn with_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.lib_paths.push(path.into());
        self
    }

    /// Add a library stem
    #[must_use]
    pub fn with_lib(mut self, stem: impl Into<String>) -> Self {
        self.libs.push(stem.into());
        self
    }
}

impl fmt::Display for PackageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_accumulates_paths_in_order() {
        let desc = PackageDescriptor::new("gdal", Version::new(2, 3, 2))
            .with_include_path("/deps/gdal/include")
            .with_lib_path("/deps/gdal/lib")
            .with_lib("gdal");

        assert_eq!(desc.include_paths, vec![PathBuf::from("/deps/gdal/include")]);
        assert_eq!(desc.lib_paths, vec![PathBuf::from("/deps/gdal/lib")]);
        assert_eq!(desc.libs, vec!["gdal".to_string()]);
        assert_eq!(desc.to_string(), "gdal-2.3.2");
    }
}
