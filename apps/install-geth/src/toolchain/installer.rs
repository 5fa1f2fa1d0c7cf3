//! The install pipeline.
//!
//! ```text
//! resolve ─► cache restore ─┬─ hit ──────────────────────────────► publish
//!                           └─ miss ─► commit hash ─► locate ─► download
//!                                      ─► extract ─► remove archive
//!                                      ─► flatten ─► cache save ─► publish
//! ```
//!
//! Cache restore and save only ever log. Every other step is fatal, so a
//! failed run never puts a half-populated directory on the search path.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

use super::archive;
use super::cache::{CacheGateway, CacheStore, cache_key};
use super::download::ArtifactFetcher;
use super::github::ReleaseMetadata;
use super::locator::{ArchiveFormat, locate};
use super::platform::PlatformArch;
use super::search_path::SearchPath;
use super::version::{VersionSpec, commit_hash_for, resolve};
use crate::config::Config;
use crate::errors::SetupError;

/// Outcome of a successful pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    /// Concrete version that was installed.
    pub version: String,
    /// Directory holding the binaries.
    pub dir: PathBuf,
    /// Whether the directory came from the cache.
    pub from_cache: bool,
}

/// Runs the install pipeline for one target.
pub struct Installer<'a, M, S, F> {
    config: &'a Config,
    target: PlatformArch,
    metadata: M,
    cache: CacheGateway<S>,
    fetcher: F,
}

impl<'a, M, S, F> Installer<'a, M, S, F>
where
    M: ReleaseMetadata,
    S: CacheStore,
    F: ArtifactFetcher,
{
    #[must_use]
    pub fn new(
        config: &'a Config,
        target: PlatformArch,
        metadata: M,
        cache: S,
        fetcher: F,
    ) -> Self {
        Self {
            config,
            target,
            metadata,
            cache: CacheGateway::new(cache),
            fetcher,
        }
    }

    /// Resolves `spec`, installs it and publishes the install directory on
    /// `search_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if any step other than caching fails; `search_path`
    /// is left untouched in that case.
    pub async fn run(
        &self,
        spec: &VersionSpec,
        search_path: &mut SearchPath,
    ) -> Result<Installation> {
        let version = resolve(spec, &self.metadata).await?;
        let installation = self.install(&version).await?;
        search_path.prepend(&installation.dir);
        tracing::debug!(dir = %installation.dir.display(), "Published install directory");
        Ok(installation)
    }

    /// Installs a concrete version into its install directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the commit lookup, artifact location, download,
    /// extraction, archive removal or flattening fails.
    pub async fn install(&self, version: &str) -> Result<Installation> {
        let install_dir = self.config.install_dir(version);
        let key = cache_key(version, &self.target);

        println!(
            "Version to install: {version} (target directory: {})",
            install_dir.display()
        );

        if self.cache.try_restore(&key, &install_dir) {
            println!("geth {version} has been restored from cache");
            return Ok(Installation {
                version: version.to_string(),
                dir: install_dir,
                from_cache: true,
            });
        }

        self.download_and_unpack(version, &install_dir).await?;
        self.cache.save(&key, &install_dir);

        Ok(Installation {
            version: version.to_string(),
            dir: install_dir,
            from_cache: false,
        })
    }

    async fn download_and_unpack(&self, version: &str, install_dir: &Path) -> Result<()> {
        let commit_hash = commit_hash_for(version, &self.metadata).await?;
        let artifact = locate(
            &self.config.dist_url,
            &self.target,
            version,
            &commit_hash,
        )?;

        if ArchiveFormat::from_name(&artifact.url) != Some(artifact.format) {
            return Err(SetupError::unsupported_format(&artifact.url).into());
        }

        let unpack_dir = self.config.unpack_dir();
        clear_dir(&unpack_dir)?;
        clear_dir(install_dir)?;

        println!("Downloading geth from {}", artifact.url);
        let archive_path = self.fetcher.fetch(&artifact.url, &self.config.tmp_dir).await?;

        tracing::debug!(
            archive = %archive_path.display(),
            unpack_dir = %unpack_dir.display(),
            format = %artifact.format,
            "Extracting"
        );
        archive::extract(artifact.format, &archive_path, &unpack_dir)?;

        std::fs::remove_file(&archive_path)
            .with_context(|| format!("Failed to remove archive: {}", archive_path.display()))?;

        let moved = flatten_into(&unpack_dir, install_dir)?;
        tracing::info!(files = moved, dir = %install_dir.display(), "Installed files");

        if let Err(e) = std::fs::remove_dir_all(&unpack_dir) {
            tracing::debug!("Failed to remove {}: {e}", unpack_dir.display());
        }

        Ok(())
    }
}

/// Removes `dir` left behind by an earlier run or a partial cache restore.
fn clear_dir(dir: &Path) -> Result<()> {
    if dir.exists() {
        std::fs::remove_dir_all(dir)
            .with_context(|| format!("Failed to clear stale directory: {}", dir.display()))?;
    }
    Ok(())
}

/// Moves every non-directory entry under `src` directly into `dest`, keeping
/// only its file name.
///
/// Entries are moved one at a time as the walk discovers them. Returns the
/// number of files moved.
///
/// # Errors
///
/// Returns an error if `dest` cannot be created, `src` cannot be walked, or
/// a file cannot be moved.
pub fn flatten_into(src: &Path, dest: &Path) -> Result<usize> {
    std::fs::create_dir_all(dest)
        .with_context(|| format!("Failed to create directory: {}", dest.display()))?;

    let mut moved = 0;
    for entry in WalkDir::new(src) {
        let entry = entry.with_context(|| format!("Failed to walk {}", src.display()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let target = dest.join(entry.file_name());
        move_file(entry.path(), &target)?;
        moved += 1;
    }
    Ok(moved)
}

/// Renames `from` to `to`, copying across filesystems when renaming fails.
fn move_file(from: &Path, to: &Path) -> Result<()> {
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to)
        .and_then(|_| std::fs::remove_file(from))
        .with_context(|| format!("Failed to move {} to {}", from.display(), to.display()))
}
