//! Executable search path handling.
//!
//! The search path is carried as a value instead of being written back into
//! the process environment: the verifier resolves binaries against it and
//! hands it to child processes, and later CI steps pick the install
//! directory up from `GITHUB_PATH` (see [`crate::actions::add_path`]).

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Reads `PATH` from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var_os("PATH")
            .map(|value| Self::from_dirs(std::env::split_paths(&value)))
            .unwrap_or_default()
    }

    #[must_use]
    pub fn from_dirs(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            dirs: dirs.into_iter().collect(),
        }
    }

    /// Puts `dir` first, removing any later occurrence of it.
    pub fn prepend(&mut self, dir: &Path) {
        self.dirs.retain(|existing| existing != dir);
        self.dirs.insert(0, dir.to_path_buf());
    }

    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Joins the directories with the platform separator.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory contains the separator character.
    pub fn to_os_string(&self) -> Result<OsString> {
        std::env::join_paths(&self.dirs).context("Search path contains an invalid directory")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prepend_puts_directory_first() {
        let mut search_path =
            SearchPath::from_dirs([PathBuf::from("/usr/bin"), PathBuf::from("/bin")]);
        search_path.prepend(Path::new("/tmp/geth-1.13.5"));
        assert_eq!(
            search_path.dirs(),
            &[
                PathBuf::from("/tmp/geth-1.13.5"),
                PathBuf::from("/usr/bin"),
                PathBuf::from("/bin")
            ]
        );
    }

    #[test]
    fn prepend_does_not_duplicate() {
        let mut search_path =
            SearchPath::from_dirs([PathBuf::from("/usr/bin"), PathBuf::from("/opt/geth")]);
        search_path.prepend(Path::new("/opt/geth"));
        search_path.prepend(Path::new("/opt/geth"));
        assert_eq!(
            search_path.dirs(),
            &[PathBuf::from("/opt/geth"), PathBuf::from("/usr/bin")]
        );
    }

    #[test]
    fn join_round_trips_through_split() {
        let search_path = SearchPath::from_dirs([PathBuf::from("a"), PathBuf::from("b")]);
        let joined = search_path.to_os_string().unwrap();
        let split: Vec<PathBuf> = std::env::split_paths(&joined).collect();
        assert_eq!(split, search_path.dirs());
    }

    #[test]
    fn empty_search_path_joins_to_empty_string() {
        assert!(SearchPath::default().to_os_string().unwrap().is_empty());
    }
}
