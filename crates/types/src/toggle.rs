//! Feature toggles and the dependencies they activate

use serde::{Deserialize, Serialize};

/// A dependency activated by an enabled toggle.
///
/// `stems` overrides the descriptor's own library list when the feature
/// links against a subset (or superset) of what the package installs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleDependency {
    pub name: String,
    /// Variable prefix for the emitted `_INCLUDE_DIR` / `_LIBRARY` pair
    pub prefix: String,
    #[serde(default)]
    pub stems: Option<Vec<String>>,
}

/// A named boolean build feature.
///
/// State is fixed at configuration start from manifest defaults plus CLI
/// overrides and never mutated afterwards. A disabled toggle contributes
/// exactly one `<flag>=OFF` variable; its dependencies are deliberately
/// not resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionToggle {
    pub name: String,
    /// Build-system variable name (e.g. "WITH_LASZIP")
    pub flag: String,
    pub enabled: bool,
    #[serde(default)]
    pub requires: Vec<ToggleDependency>,
}

impl OptionToggle {
    /// Create a toggle with no activated dependencies
    pub fn new(name: impl Into<String>, flag: impl Into<String>, enabled: bool) -> Self {
        Self {
            name: name.into(),
            flag: flag.into(),
            enabled,
            requires: Vec::new(),
        }
    }

    /// Attach a dependency activated when the toggle is on
    #[must_use]
    pub fn with_dependency(mut self, dep: ToggleDependency) -> Self {
        self.requires.push(dep);
        self
    }
}
