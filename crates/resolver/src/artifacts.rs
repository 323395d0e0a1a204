//! Library artifact probing
//!
//! Maps a package's library stems to absolute file paths under its first
//! library search path, trying both `<stem><suffix>` and `lib<stem><suffix>`
//! naming conventions. Both may match for the same stem and both are then
//! collected; callers that want a stricter policy filter afterwards.

use kiln_errors::{Error, ResolverError};
use kiln_types::{PackageDescriptor, PlatformProfile};
use std::path::PathBuf;

/// Resolve a package's library artifacts on disk.
///
/// `stems` overrides the descriptor's own library list when provided.
/// A package whose search path exists but holds no matching file resolves
/// to an empty vector - a representable state the caller judges, not an
/// error. Probing is read-only.
///
/// # Errors
///
/// Returns `ResolverError::NoSearchPath` when the descriptor carries no
/// library search path at all; that is a registry misconfiguration and must
/// not be silently skipped.
pub fn resolve_artifacts(
    pkg: &PackageDescriptor,
    stems: Option<&[String]>,
    profile: &PlatformProfile,
) -> Result<Vec<PathBuf>, Error> {
    let search_path = pkg
        .lib_paths
        .first()
        .ok_or_else(|| ResolverError::NoSearchPath {
            package: pkg.name.clone(),
        })?;

    let stems = stems.unwrap_or(&pkg.libs);
    let mut found = Vec::new();

    for stem in stems {
        let plain = search_path.join(format!("{stem}{}", profile.lib_suffix));
        if plain.is_file() {
            found.push(plain);
        }

        let prefixed = search_path.join(format!("lib{stem}{}", profile.lib_suffix));
        if prefixed.is_file() {
            found.push(prefixed);
        }
    }

    Ok(found)
}
