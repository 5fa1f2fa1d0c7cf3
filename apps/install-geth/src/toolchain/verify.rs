//! Post-install verification.
//!
//! An install only counts when the binary can be found on the search path
//! and `<tool> version` exits successfully. The first catches empty archives
//! and publishing mistakes; the second catches corrupt binaries, wrong
//! architectures and missing shared libraries.

use std::path::PathBuf;
use std::process::Stdio;

use anyhow::{Context, Result};

use super::search_path::SearchPath;
use crate::errors::SetupError;

/// Locates `tool` on `search_path` and runs `<tool> version` with output captured.
///
/// Returns the resolved binary path.
///
/// # Errors
///
/// Returns [`SetupError::BinaryNotFound`] if the tool is not on the search
/// path and [`SetupError::VersionCheckFailed`] if the version command exits
/// unsuccessfully.
pub async fn verify(tool: &str, search_path: &SearchPath) -> Result<PathBuf> {
    let path_value = search_path.to_os_string()?;
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;

    tracing::debug!(tool, dirs = ?search_path.dirs(), "Looking up binary");
    let binary = which::which_in(tool, Some(&path_value), cwd)
        .map_err(|_| SetupError::binary_not_found(tool))?;

    tracing::debug!(binary = %binary.display(), "Running version check");

    let output = tokio::process::Command::new(&binary)
        .arg("version")
        .env("PATH", &path_value)
        .stdin(Stdio::null())
        .output()
        .await
        .with_context(|| format!("Failed to execute {}", binary.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SetupError::version_check_failed(tool, output.status.code(), stderr).into());
    }

    tracing::debug!(
        stdout = %String::from_utf8_lossy(&output.stdout).trim(),
        "Version check output"
    );

    Ok(binary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    fn write_script(dir: &std::path::Path, name: &str, body: &str) {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    }

    #[tokio::test]
    async fn missing_binary_names_the_tool() {
        let temp = tempfile::tempdir().unwrap();
        let search_path = SearchPath::from_dirs([temp.path().to_path_buf()]);

        let err = verify("geth", &search_path).await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<SetupError>(),
            Some(SetupError::BinaryNotFound { tool }) if tool == "geth"
        ));
        assert!(err.to_string().contains("geth"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn succeeding_version_check_returns_path() {
        let temp = tempfile::tempdir().unwrap();
        write_script(temp.path(), "geth", "echo 'Geth Version: 1.13.5-stable'");
        let search_path = SearchPath::from_dirs([temp.path().to_path_buf()]);

        let binary = verify("geth", &search_path).await.unwrap();

        assert_eq!(binary, temp.path().join("geth"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_version_check_surfaces_exit_code() {
        let temp = tempfile::tempdir().unwrap();
        write_script(temp.path(), "geth", "echo 'cannot execute binary file' >&2\nexit 3");
        let search_path = SearchPath::from_dirs([temp.path().to_path_buf()]);

        let err = verify("geth", &search_path).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "`geth version` failed (exit code 3): cannot execute binary file"
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn version_argument_is_passed() {
        let temp = tempfile::tempdir().unwrap();
        write_script(temp.path(), "geth", "[ \"$1\" = version ] || exit 9");
        let search_path = SearchPath::from_dirs([temp.path().to_path_buf()]);

        assert!(verify("geth", &search_path).await.is_ok());
    }
}
