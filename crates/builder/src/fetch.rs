//! Source archive acquisition
//!
//! Downloads the project's source tarball and relocates the extracted tree
//! onto the context's source directory. The mechanism sits behind a trait:
//! the pipeline only consumes `fetch`, it does not care how sources arrive.

use crate::context::BuildContext;
use async_trait::async_trait;
use flate2::read::GzDecoder;
use kiln_errors::{BuildError, Error, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// The consumed fetch/extract primitive
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch `url` and leave an extracted source tree at `dest`.
    async fn fetch(&self, ctx: &BuildContext, url: &str, dest: &Path) -> Result<()>;
}

/// Fetcher for gzip-compressed tarballs over HTTP(S)
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher;

impl HttpFetcher {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn fetch(&self, _ctx: &BuildContext, url: &str, dest: &Path) -> Result<()> {
        let response = reqwest::get(url)
            .await
            .map_err(|_| BuildError::FetchFailed {
                url: url.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(BuildError::FetchFailed {
                url: url.to_string(),
            }
            .into());
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|_| BuildError::FetchFailed {
                url: url.to_string(),
            })?;

        let parent = dest
            .parent()
            .ok_or_else(|| Error::internal("source directory has no parent"))?;
        fs::create_dir_all(parent).await?;

        let staging = tempfile::tempdir_in(parent).map_err(Error::from)?;
        let staging_path = staging.path().to_path_buf();

        // tar/flate2 are synchronous; keep the runtime responsive
        let unpack_root = staging_path.clone();
        tokio::task::spawn_blocking(move || -> std::result::Result<(), String> {
            let decoder = GzDecoder::new(&bytes[..]);
            let mut archive = tar::Archive::new(decoder);
            archive.unpack(&unpack_root).map_err(|e| e.to_string())
        })
        .await
        .map_err(|e| Error::internal(format!("extraction task panicked: {e}")))?
        .map_err(|message| BuildError::ExtractionFailed { message })?;

        let extracted = single_top_level_dir(&staging_path).await?;
        fs::rename(&extracted, dest)
            .await
            .map_err(|e| Error::io_with_path(&e, dest))?;

        Ok(())
    }
}

/// Archives conventionally wrap everything in one `name-version/` directory;
/// that directory becomes the source tree.
async fn single_top_level_dir(root: &Path) -> Result<PathBuf> {
    let mut entries = fs::read_dir(root).await?;
    let mut dirs = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        if entry.file_type().await?.is_dir() {
            dirs.push(entry.path());
        }
    }

    match dirs.as_slice() {
        [single] => Ok(single.clone()),
        [] => Err(BuildError::ExtractionFailed {
            message: "archive contained no directory".to_string(),
        }
        .into()),
        _ => Err(BuildError::ExtractionFailed {
            message: format!("archive contained {} top-level directories", dirs.len()),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn rejects_multiple_top_level_dirs() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::create_dir(dir.path().join("b")).unwrap();

        let err = single_top_level_dir(dir.path()).await.unwrap_err();
        assert!(err.to_string().contains("top-level directories"));
    }

    #[tokio::test]
    async fn picks_the_single_dir() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("PDAL-1.8.0")).unwrap();

        let found = single_top_level_dir(dir.path()).await.unwrap();
        assert_eq!(found, dir.path().join("PDAL-1.8.0"));
    }
}
