//! Build-system variable values

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The full variable set handed to the native build driver.
///
/// A `BTreeMap` keeps iteration order stable, which makes the emitted
/// configuration byte-for-byte reproducible for identical inputs.
pub type VariableMap = BTreeMap<String, VariableValue>;

/// Value of a single build variable.
///
/// Lists render joined with ";", the list separator the native build
/// driver expects for multi-path cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Scalar(String),
    List(Vec<String>),
}

impl VariableValue {
    /// Scalar "ON"/"OFF" from a boolean
    #[must_use]
    pub fn flag(enabled: bool) -> Self {
        Self::Scalar(if enabled { "ON" } else { "OFF" }.to_string())
    }

    /// Render the value the way it is passed to the build driver
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Scalar(s) => s.clone(),
            Self::List(items) => items.join(";"),
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl From<String> for VariableValue {
    fn from(s: String) -> Self {
        Self::Scalar(s)
    }
}

impl From<&str> for VariableValue {
    fn from(s: &str) -> Self {
        Self::Scalar(s.to_string())
    }
}

impl From<Vec<String>> for VariableValue {
    fn from(items: Vec<String>) -> Self {
        Self::List(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_join_with_semicolons() {
        let value = VariableValue::List(vec![
            "/d/lib/libgdal.so".to_string(),
            "/d/lib/gdal.so".to_string(),
        ]);
        assert_eq!(value.render(), "/d/lib/libgdal.so;/d/lib/gdal.so");
    }

    #[test]
    fn flags_render_on_off() {
        assert_eq!(VariableValue::flag(true).render(), "ON");
        assert_eq!(VariableValue::flag(false).render(), "OFF");
    }

    #[test]
    fn serializes_untagged() {
        let scalar = serde_json::to_value(VariableValue::Scalar("ON".to_string())).unwrap();
        assert_eq!(scalar, serde_json::json!("ON"));

        let list =
            serde_json::to_value(VariableValue::List(vec!["/a.so".to_string()])).unwrap();
        assert_eq!(list, serde_json::json!(["/a.so"]));
    }

    #[test]
    fn map_iterates_in_key_order() {
        let mut map = VariableMap::new();
        map.insert("WITH_TESTS".to_string(), VariableValue::flag(false));
        map.insert("GDAL_INCLUDE_DIR".to_string(), "/d/include".into());
        let keys: Vec<&str> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["GDAL_INCLUDE_DIR", "WITH_TESTS"]);
    }
}
