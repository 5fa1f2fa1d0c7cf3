//! Locate command for the install-geth CLI.
//!
//! Resolves a version and its release commit, then prints the artifact that
//! would be installed without downloading anything. `--platform` and
//! `--arch` look up builds for other machines.

use anyhow::Result;
use clap::Args;

use super::install::parse_version_arg;
use crate::config::{Config, TOOL_NAME};
use crate::toolchain::{
    GitHubClient, PlatformArch, cache_key, commit_hash_for, locate, resolve,
};

/// Arguments for the locate command.
#[derive(Args, Debug)]
pub struct LocateArgs {
    /// Version to locate: `latest`, `1.13.5` or `v1.13.5`.
    #[arg(id = "version_input", value_name = "VERSION", env = "INPUT_VERSION")]
    pub version: Option<String>,

    /// Platform to locate a build for (`linux`, `darwin`, `windows`).
    #[arg(long)]
    pub platform: Option<String>,

    /// Architecture to locate a build for (`x64`, `x32`, `arm64`).
    #[arg(long)]
    pub arch: Option<String>,

    /// Token for GitHub API requests (falls back to `GITHUB_TOKEN`).
    #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,
}

/// Executes the locate command.
///
/// # Errors
///
/// Returns an error if the version is missing, a metadata lookup fails, or
/// the target has no upstream build.
pub async fn execute(args: &LocateArgs) -> Result<()> {
    let spec = parse_version_arg(args.version.as_deref())?;
    let config = Config::from_env().with_auth_token(args.auth_token.as_deref());
    let target =
        PlatformArch::detect_with_overrides(args.platform.as_deref(), args.arch.as_deref());

    let client = GitHubClient::new(&config.api_url, config.auth_token.as_deref())?;
    let version = resolve(&spec, &client).await?;
    let commit = commit_hash_for(&version, &client).await?;
    let artifact = locate(&config.dist_url, &target, &version, &commit)?;

    let binary = config
        .install_dir(&version)
        .join(target.executable_name(TOOL_NAME));

    println!("version:   {version}");
    println!("commit:    {commit}");
    println!("target:    {target}");
    println!("url:       {}", artifact.url);
    println!("file:      {}", artifact.filename());
    println!("format:    {}", artifact.format);
    println!("cache key: {}", cache_key(&version, &target));
    println!("binary:    {}", binary.display());

    Ok(())
}
