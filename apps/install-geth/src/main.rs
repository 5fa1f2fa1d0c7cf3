#![warn(clippy::pedantic)]

//! # install-geth
//!
//! Installs a go-ethereum (`geth`) release build into a CI job. The build is
//! looked up from the upstream release metadata, downloaded from the upstream
//! build store (or restored from a local cache), unpacked into a flat
//! directory and put on `PATH` for the following steps.
//!
//! ## Subcommands
//!
//! - `install` - Install a version and publish it on `PATH` (default)
//! - `locate` - Print the artifact URL and cache key for a version
//! - `check` - Verify that `geth version` runs from `PATH`
//!
//! ## Examples
//!
//! Install the newest release:
//! ```bash
//! install-geth latest
//! ```
//!
//! See which build a macOS arm64 runner would get:
//! ```bash
//! install-geth locate 1.13.5 --platform darwin --arch arm64
//! ```

mod actions;
mod commands;
mod config;
mod errors;
mod toolchain;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use commands::{check, install, locate};
use tracing_subscriber::EnvFilter;

/// Installs a geth release build and publishes it on PATH.
#[derive(Parser)]
#[command(
    name = "install-geth",
    author,
    version,
    about = "Installs a go-ethereum (geth) release build for CI jobs",
    args_conflicts_with_subcommands = true,
    after_help = "\
ENVIRONMENT VARIABLES:
    INPUT_VERSION           Version to install when no argument is given
    INPUT_GITHUB-TOKEN      Token for GitHub API requests
    GITHUB_TOKEN            Fallback token for GitHub API requests
    GITHUB_PATH             File the install directory is appended to
    INSTALL_GETH_API_URL    GitHub API base URL (default: https://api.github.com)
    INSTALL_GETH_DIST_URL   Build store base URL
    INSTALL_GETH_TMP_DIR    Install root (default: RUNNER_TEMP, then the OS temp dir)
    INSTALL_GETH_CACHE_DIR  Cache root (default: <user cache dir>/install-geth)
    RUST_LOG                Log filter, overrides -v"
)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Arguments for the default `install` command.
    #[command(flatten)]
    install: install::InstallArgs,

    /// The subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Install a geth version and publish it on PATH.
    ///
    /// Restores the build from the cache when possible, otherwise downloads
    /// and unpacks it and saves it to the cache. Runs `geth version` at the
    /// end.
    Install(install::InstallArgs),

    /// Print where a build would come from without downloading it.
    Locate(locate::LocateArgs),

    /// Check that geth on PATH runs.
    Check,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        let message = format!("{e:#}");
        actions::error(&message);
        eprintln!("Error: {message}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Install(args)) => install::execute(&args).await,
        Some(Commands::Locate(args)) => locate::execute(&args).await,
        Some(Commands::Check) => check::execute().await,
        None => install::execute(&cli.install).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_version_argument_selects_default_install() {
        let cli = Cli::try_parse_from(["install-geth", "1.13.5"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.install.version.as_deref(), Some("1.13.5"));
    }

    #[test]
    fn version_argument_reaches_subcommands() {
        let cli = Cli::try_parse_from(["install-geth", "locate", "v1.13.5", "--arch", "arm64"])
            .unwrap();
        match cli.command {
            Some(Commands::Locate(args)) => {
                assert_eq!(args.version.as_deref(), Some("v1.13.5"));
                assert_eq!(args.arch.as_deref(), Some("arm64"));
            }
            _ => panic!("expected the locate command"),
        }
    }
}
