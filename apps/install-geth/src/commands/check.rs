//! Check command for the install-geth CLI.
//!
//! Runs the post-install check on its own against the current `PATH`, for
//! jobs that install geth some other way or want to re-check later.

use anyhow::Result;

use crate::config::TOOL_NAME;
use crate::toolchain::{SearchPath, verify};

/// Executes the check command.
///
/// # Errors
///
/// Returns an error if geth is not on `PATH` or `geth version` fails.
pub async fn execute() -> Result<()> {
    let binary = verify(TOOL_NAME, &SearchPath::from_env()).await?;
    println!("{TOOL_NAME} found: {}", binary.display());
    Ok(())
}
