//! GitHub Actions workflow commands.
//!
//! When running inside Actions (`GITHUB_ACTIONS=true`) output is grouped into
//! collapsible sections and warnings/errors are annotated on the run.
//! Outside Actions the group and annotation helpers print nothing extra.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

const GITHUB_ACTIONS_ENV: &str = "GITHUB_ACTIONS";

/// Returns whether the process runs inside GitHub Actions.
#[must_use]
pub fn is_enabled() -> bool {
    std::env::var(GITHUB_ACTIONS_ENV).is_ok_and(|v| v == "true")
}

/// Escapes message data for a workflow command.
#[must_use]
pub fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// An output group that is closed when dropped.
#[must_use = "the group is closed as soon as the guard is dropped"]
pub struct Group {
    enabled: bool,
}

impl Drop for Group {
    fn drop(&mut self) {
        if self.enabled {
            println!("::endgroup::");
        }
    }
}

/// Opens a collapsible output group.
pub fn group(title: &str) -> Group {
    let enabled = is_enabled();
    if enabled {
        println!("::group::{}", escape_data(title));
    } else {
        println!("{title}");
    }
    Group { enabled }
}

/// Annotates the run with a warning.
pub fn warning(message: &str) {
    if is_enabled() {
        println!("::warning::{}", escape_data(message));
    }
}

/// Annotates the run with an error.
pub fn error(message: &str) {
    if is_enabled() {
        println!("::error::{}", escape_data(message));
    }
}

/// Appends `dir` to the `GITHUB_PATH` file so later steps find its binaries.
///
/// Does nothing when no such file is configured.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or written.
pub fn add_path(github_path: Option<&Path>, dir: &Path) -> Result<()> {
    let Some(github_path) = github_path else {
        tracing::debug!("GITHUB_PATH not set; install directory is not exported");
        return Ok(());
    };

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(github_path)
        .with_context(|| format!("Failed to open {}", github_path.display()))?;
    writeln!(file, "{}", dir.display())
        .with_context(|| format!("Failed to write {}", github_path.display()))?;
    Ok(())
}
