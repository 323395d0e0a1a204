//! Target platform description

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Target operating system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Os {
    Windows,
    Linux,
    #[value(name = "macos")]
    MacOs,
    Other,
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Linux => write!(f, "linux"),
            Self::MacOs => write!(f, "macos"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Immutable description of the build target, derived once from the CLI
/// tuple and passed explicitly wherever platform behavior matters.
///
/// The shared-library suffix is a data-driven lookup rather than scattered
/// conditionals, so every consumer names files the same way.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub os: Os,
    pub arch: String,
    pub compiler: String,
    /// Shared-library filename suffix including the dot (e.g. ".so")
    pub lib_suffix: String,
}

impl PlatformProfile {
    /// Build a profile for a target tuple
    #[must_use]
    pub fn new(os: Os, arch: impl Into<String>, compiler: impl Into<String>) -> Self {
        Self {
            os,
            arch: arch.into(),
            compiler: compiler.into(),
            lib_suffix: Self::suffix_for(os).to_string(),
        }
    }

    /// Shared-library suffix for an operating system
    #[must_use]
    pub fn suffix_for(os: Os) -> &'static str {
        match os {
            Os::Windows => ".lib",
            Os::MacOs => ".dylib",
            Os::Linux | Os::Other => ".so",
        }
    }
}

impl fmt::Display for PlatformProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.os, self.arch, self.compiler)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_lookup_is_total() {
        assert_eq!(PlatformProfile::suffix_for(Os::Windows), ".lib");
        assert_eq!(PlatformProfile::suffix_for(Os::Linux), ".so");
        assert_eq!(PlatformProfile::suffix_for(Os::MacOs), ".dylib");
        assert_eq!(PlatformProfile::suffix_for(Os::Other), ".so");
    }

    #[test]
    fn profile_carries_suffix() {
        let profile = PlatformProfile::new(Os::Linux, "x86_64", "gcc");
        assert_eq!(profile.lib_suffix, ".so");
        assert_eq!(profile.to_string(), "linux-x86_64-gcc");
    }
}
