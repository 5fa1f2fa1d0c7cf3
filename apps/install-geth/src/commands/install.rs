//! Install command for the install-geth CLI.
//!
//! Resolves the requested version, installs it (from the cache when
//! possible), exports the install directory to later CI steps and checks
//! that the installed binary runs.
//!
//! ## Usage
//!
//! ```bash
//! install-geth 1.13.5                 # same as `install-geth install 1.13.5`
//! install-geth install latest
//! INPUT_VERSION=v1.13.5 install-geth  # GitHub Actions input
//! ```

use anyhow::Result;
use clap::Args;

use crate::actions;
use crate::config::{Config, TOOL_NAME};
use crate::errors::SetupError;
use crate::toolchain::{
    CacheStore, FsCacheStore, GitHubClient, HttpFetcher, Installer, NoCache, PlatformArch,
    SearchPath, VersionSpec, verify,
};

/// Arguments for the install command.
#[derive(Args, Debug, Default)]
pub struct InstallArgs {
    /// Version to install: `latest`, `1.13.5` or `v1.13.5`.
    #[arg(id = "version_input", value_name = "VERSION", env = "INPUT_VERSION")]
    pub version: Option<String>,

    /// Token for GitHub API requests (falls back to `GITHUB_TOKEN`).
    #[arg(long, env = "INPUT_GITHUB-TOKEN", hide_env_values = true)]
    pub auth_token: Option<String>,

    /// Neither restore from nor save to the cache.
    #[arg(long)]
    pub no_cache: bool,
}

/// Executes the install command.
///
/// # Errors
///
/// Returns an error if the version is missing, any install step fails, the
/// install directory cannot be exported, or the installed binary fails its
/// check.
pub async fn execute(args: &InstallArgs) -> Result<()> {
    let spec = parse_version_arg(args.version.as_deref())?;

    let mut config = Config::from_env().with_auth_token(args.auth_token.as_deref());
    if args.no_cache {
        config = config.without_cache();
    }

    let target = PlatformArch::detect();
    tracing::debug!(%target, %spec, "Starting install");

    let metadata = GitHubClient::new(&config.api_url, config.auth_token.as_deref())?;
    let store: Box<dyn CacheStore> = match &config.cache_dir {
        Some(dir) => Box::new(FsCacheStore::new(dir.clone())),
        None => Box::new(NoCache),
    };
    let fetcher = HttpFetcher::new()?;
    let mut search_path = SearchPath::from_env();

    let installation = {
        let _group = actions::group(&format!("Install {TOOL_NAME}"));
        Installer::new(&config, target, metadata, store, fetcher)
            .run(&spec, &mut search_path)
            .await?
    };

    tracing::info!(
        version = %installation.version,
        dir = %installation.dir.display(),
        from_cache = installation.from_cache,
        "Installed"
    );
    actions::add_path(config.github_path.as_deref(), &installation.dir)?;

    let _group = actions::group("Installation check");
    let binary = verify(TOOL_NAME, &search_path).await?;
    println!(
        "{TOOL_NAME} {} installed: {}",
        installation.version,
        binary.display()
    );

    Ok(())
}

/// Parses the version argument, rejecting a missing or blank value.
///
/// # Errors
///
/// Returns [`SetupError::InvalidArguments`] when no version was given.
pub fn parse_version_arg(version: Option<&str>) -> Result<VersionSpec, SetupError> {
    let missing =
        || SetupError::invalid_arguments("a version is required (`latest` or e.g. `1.13.5`)");

    match VersionSpec::parse(version.ok_or_else(missing)?) {
        VersionSpec::Exact(v) if v.is_empty() => Err(missing()),
        spec => Ok(spec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_argument_is_normalised() {
        assert_eq!(
            parse_version_arg(Some(" v1.13.5 ")).unwrap(),
            VersionSpec::Exact("1.13.5".to_string())
        );
        assert_eq!(parse_version_arg(Some("LATEST")).unwrap(), VersionSpec::Latest);
    }

    #[test]
    fn missing_or_blank_version_is_rejected() {
        for input in [None, Some(""), Some("   "), Some("v")] {
            assert!(
                matches!(
                    parse_version_arg(input),
                    Err(SetupError::InvalidArguments { .. })
                ),
                "{input:?}"
            );
        }
    }
}
