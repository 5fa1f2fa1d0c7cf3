//! Install directory caching.
//!
//! A finished install directory is stored under a key derived from the
//! version and target, so later runs on the same kind of machine can skip
//! the metadata lookup, the download and the extraction.
//!
//! Caching is an optimisation only: [`CacheGateway`] logs every store failure
//! as a warning and carries on as if the cache were empty.
//!
//! ## Filesystem layout
//!
//! ```text
//! <cache_root>/
//!   geth-cache-1.13.5-linux-x64.tar.gz
//!   geth-cache-1.14.0-darwin-arm64.tar.gz
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::archive::{extract_tar_gz, pack_tar_gz};
use super::platform::PlatformArch;
use crate::actions;
use crate::config::TOOL_NAME;
use crate::errors::SetupError;

/// Cache key for a version on a target: `geth-cache-<version>-<os>-<arch>`.
#[must_use]
pub fn cache_key(version: &str, target: &PlatformArch) -> String {
    format!(
        "{TOOL_NAME}-cache-{version}-{}-{}",
        target.os.as_str(),
        target.arch.as_str()
    )
}

/// A key/value store of directory snapshots.
pub trait CacheStore {
    /// Restores the snapshot stored under `key` into `dir`.
    ///
    /// Returns `Ok(false)` when nothing is stored under `key`.
    fn restore(&self, key: &str, dir: &Path) -> Result<bool>;

    /// Stores a snapshot of `dir` under `key`.
    fn save(&self, key: &str, dir: &Path) -> Result<()>;
}

impl<T: CacheStore + ?Sized> CacheStore for Box<T> {
    fn restore(&self, key: &str, dir: &Path) -> Result<bool> {
        (**self).restore(key, dir)
    }

    fn save(&self, key: &str, dir: &Path) -> Result<()> {
        (**self).save(key, dir)
    }
}

/// Store that never holds anything.
pub struct NoCache;

impl CacheStore for NoCache {
    fn restore(&self, _key: &str, _dir: &Path) -> Result<bool> {
        Ok(false)
    }

    fn save(&self, _key: &str, _dir: &Path) -> Result<()> {
        Ok(())
    }
}

/// Store keeping one tar.gz snapshot per key in a local directory.
///
/// Entries are immutable: saving under an existing key fails with
/// [`SetupError::CacheEntryExists`].
#[derive(Debug, Clone)]
pub struct FsCacheStore {
    root: PathBuf,
}

impl FsCacheStore {
    #[must_use]
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.tar.gz"))
    }
}

impl CacheStore for FsCacheStore {
    fn restore(&self, key: &str, dir: &Path) -> Result<bool> {
        let entry = self.entry_path(key);
        if !entry.is_file() {
            return Ok(false);
        }
        extract_tar_gz(&entry, dir)
            .with_context(|| format!("Failed to restore cache entry {key}"))?;
        Ok(true)
    }

    fn save(&self, key: &str, dir: &Path) -> Result<()> {
        let entry = self.entry_path(key);
        if entry.exists() {
            return Err(SetupError::cache_entry_exists(key).into());
        }

        std::fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create directory: {}", self.root.display()))?;

        // Write next to the final name so a crash never leaves a truncated entry.
        let partial = entry.with_extension("partial");
        if let Err(e) = pack_tar_gz(dir, &partial) {
            let _ = std::fs::remove_file(&partial);
            return Err(e.context(format!("Failed to save cache entry {key}")));
        }
        std::fs::rename(&partial, &entry)
            .with_context(|| format!("Failed to finalize cache entry: {}", entry.display()))?;
        Ok(())
    }
}

/// Best-effort wrapper around a [`CacheStore`].
pub struct CacheGateway<S> {
    store: S,
}

impl<S: CacheStore> CacheGateway<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns `true` only on a definite hit; errors count as a miss.
    pub fn try_restore(&self, key: &str, dir: &Path) -> bool {
        match self.store.restore(key, dir) {
            Ok(hit) => {
                tracing::debug!(key, hit, "Cache lookup");
                hit
            }
            Err(e) => {
                degraded("restore", &e);
                false
            }
        }
    }

    /// Saves `dir` under `key`, logging instead of failing.
    pub fn save(&self, key: &str, dir: &Path) {
        match self.store.save(key, dir) {
            Ok(()) => tracing::info!(key, "Saved install directory to cache"),
            Err(e) => degraded("save", &e),
        }
    }
}

fn degraded(operation: &str, error: &anyhow::Error) {
    tracing::warn!("Cache {operation} failed: {error:#}");
    actions::warning(&format!("Cache {operation} failed: {error:#}"));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::platform::{Arch, Os};

    struct BrokenStore;

    impl CacheStore for BrokenStore {
        fn restore(&self, _key: &str, _dir: &Path) -> Result<bool> {
            anyhow::bail!("cache service unavailable")
        }

        fn save(&self, _key: &str, _dir: &Path) -> Result<()> {
            anyhow::bail!("quota exceeded")
        }
    }

    fn linux_x64() -> PlatformArch {
        PlatformArch::new(Os::Linux, Arch::X64)
    }

    #[test]
    fn cache_key_has_expected_shape() {
        assert_eq!(cache_key("1.13.5", &linux_x64()), "geth-cache-1.13.5-linux-x64");
        assert_eq!(
            cache_key("1.13.5", &PlatformArch::new(Os::Darwin, Arch::Arm64)),
            "geth-cache-1.13.5-darwin-arm64"
        );
    }

    #[test]
    fn cache_key_is_deterministic_and_version_sensitive() {
        assert_eq!(cache_key("1.13.5", &linux_x64()), cache_key("1.13.5", &linux_x64()));
        assert_ne!(cache_key("1.13.5", &linux_x64()), cache_key("1.13.4", &linux_x64()));
        assert_ne!(
            cache_key("1.13.5", &linux_x64()),
            cache_key("1.13.5", &PlatformArch::new(Os::Linux, Arch::Arm64))
        );
    }

    #[test]
    fn fs_store_misses_when_empty() {
        let temp = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(temp.path().join("cache"));
        assert!(!store.restore("geth-cache-x", &temp.path().join("dir")).unwrap());
    }

    #[test]
    fn fs_store_round_trips_a_directory() {
        let temp = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(temp.path().join("cache"));

        let install = temp.path().join("geth-1.13.5");
        std::fs::create_dir_all(&install).unwrap();
        std::fs::write(install.join("geth"), b"geth binary").unwrap();

        store.save("geth-cache-1.13.5-linux-x64", &install).unwrap();

        let restored = temp.path().join("restored");
        assert!(store.restore("geth-cache-1.13.5-linux-x64", &restored).unwrap());
        assert_eq!(std::fs::read(restored.join("geth")).unwrap(), b"geth binary");
    }

    #[test]
    fn fs_store_refuses_to_overwrite() {
        let temp = tempfile::tempdir().unwrap();
        let store = FsCacheStore::new(temp.path().join("cache"));
        let install = temp.path().join("geth-1.13.5");
        std::fs::create_dir_all(&install).unwrap();

        store.save("k", &install).unwrap();
        let err = store.save("k", &install).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SetupError>(),
            Some(SetupError::CacheEntryExists { .. })
        ));
    }

    #[test]
    fn gateway_treats_restore_errors_as_miss() {
        let temp = tempfile::tempdir().unwrap();
        let gateway = CacheGateway::new(BrokenStore);
        assert!(!gateway.try_restore("k", temp.path()));
    }

    #[test]
    fn gateway_swallows_save_errors() {
        let temp = tempfile::tempdir().unwrap();
        let gateway = CacheGateway::new(BrokenStore);
        gateway.save("k", temp.path());
    }

    #[test]
    fn no_cache_always_misses() {
        let temp = tempfile::tempdir().unwrap();
        let gateway = CacheGateway::new(NoCache);
        assert!(!gateway.try_restore("k", temp.path()));
        gateway.save("k", temp.path());
    }
}
