//! Install-tree artifact collection
//!
//! Purely observational: walks the install root after the install stage and
//! reports every file carrying the platform's library suffix. An empty
//! result is a value for the caller to judge, never an error.

use kiln_errors::Result;
use kiln_types::{ArtifactEntry, PlatformProfile};
use std::path::Path;
use tokio::fs;

/// Enumerate library artifacts under `install_root`.
///
/// Entries are sorted by stem then path so repeated collection over an
/// unchanged tree is deterministic.
///
/// # Errors
///
/// Returns an error when directory traversal itself fails; a missing or
/// empty install root yields an empty vector.
pub async fn collect_artifacts(
    install_root: &Path,
    profile: &PlatformProfile,
) -> Result<Vec<ArtifactEntry>> {
    if !install_root.exists() {
        return Ok(Vec::new());
    }

    let mut found = Vec::new();
    walk(install_root, install_root, &profile.lib_suffix, &mut found).await?;
    found.sort_by(|a, b| a.stem.cmp(&b.stem).then_with(|| a.path.cmp(&b.path)));
    Ok(found)
}

async fn walk(
    root: &Path,
    dir: &Path,
    suffix: &str,
    found: &mut Vec<ArtifactEntry>,
) -> Result<()> {
    let mut entries = fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let file_type = entry.file_type().await?;

        if file_type.is_dir() {
            Box::pin(walk(root, &path, suffix, found)).await?;
        } else if file_type.is_file() {
            if let Some(stem) = library_stem(&path, suffix) {
                let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
                found.push(ArtifactEntry {
                    stem,
                    path: relative,
                });
            }
        }
    }
    Ok(())
}

/// Library stem for a path, if the file name carries the platform suffix.
/// The conventional `lib` prefix is stripped so consumers get link names.
fn library_stem(path: &Path, suffix: &str) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(suffix)?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.strip_prefix("lib").unwrap_or(stem).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kiln_types::Os;
    use std::fs as std_fs;

    fn linux() -> PlatformProfile {
        PlatformProfile::new(Os::Linux, "x86_64", "gcc")
    }

    #[tokio::test]
    async fn missing_root_is_empty() {
        let artifacts = collect_artifacts(Path::new("/nonexistent/install"), &linux())
            .await
            .unwrap();
        assert!(artifacts.is_empty());
    }

    #[tokio::test]
    async fn collects_recursively_and_sorts() {
        let dir = tempfile::tempdir().unwrap();
        std_fs::create_dir_all(dir.path().join("lib")).unwrap();
        std_fs::create_dir_all(dir.path().join("lib/pdal/plugins")).unwrap();
        std_fs::write(dir.path().join("lib/libpdalcpp.so"), b"").unwrap();
        std_fs::write(dir.path().join("lib/libpdal_util.so"), b"").unwrap();
        std_fs::write(dir.path().join("lib/pdal/plugins/libpdal_plugin_e57.so"), b"").unwrap();
        // Not a library artifact on this platform
        std_fs::write(dir.path().join("lib/pdal.pc"), b"").unwrap();

        let artifacts = collect_artifacts(dir.path(), &linux()).await.unwrap();
        let stems: Vec<&str> = artifacts.iter().map(|a| a.stem.as_str()).collect();
        assert_eq!(stems, vec!["pdal_plugin_e57", "pdal_util", "pdalcpp"]);
        assert_eq!(artifacts[2].path, Path::new("lib/libpdalcpp.so"));
    }

    #[test]
    fn stem_strips_lib_prefix_and_suffix() {
        assert_eq!(
            library_stem(Path::new("libgdal.so"), ".so"),
            Some("gdal".to_string())
        );
        assert_eq!(
            library_stem(Path::new("gdal.lib"), ".lib"),
            Some("gdal".to_string())
        );
        assert_eq!(library_stem(Path::new("gdal.so"), ".lib"), None);
        assert_eq!(library_stem(Path::new(".so"), ".so"), None);
    }
}
