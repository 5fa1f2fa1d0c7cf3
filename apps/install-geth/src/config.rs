//! Runtime configuration for install-geth.
//!
//! Every tunable comes from the environment, with a built-in default used
//! when the variable is unset, empty or whitespace-only. Command line flags
//! (see `main.rs`) take precedence over the values collected here.
//!
//! ## Environment Variables
//!
//! - `INSTALL_GETH_API_URL`: GitHub REST API base (default `https://api.github.com`)
//! - `INSTALL_GETH_DIST_URL`: artifact host base (default: the upstream build store)
//! - `INSTALL_GETH_TMP_DIR`: scratch and install root (default `RUNNER_TEMP`, then the OS temp dir)
//! - `INSTALL_GETH_CACHE_DIR`: filesystem cache root (default `<user cache dir>/install-geth`)
//! - `GITHUB_TOKEN`: fallback auth token for metadata requests
//! - `GITHUB_PATH`: file to which the install directory is appended for later steps

use std::path::PathBuf;

use crate::toolchain::locator::DEFAULT_DIST_URL;

/// Name of the installed binary and prefix of every derived path and key.
pub const TOOL_NAME: &str = "geth";

/// Owner of the upstream repository on GitHub.
pub const UPSTREAM_OWNER: &str = "ethereum";

/// Name of the upstream repository on GitHub.
pub const UPSTREAM_REPO: &str = "go-ethereum";

/// Default GitHub REST API base URL.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

pub const API_URL_ENV: &str = "INSTALL_GETH_API_URL";
pub const DIST_URL_ENV: &str = "INSTALL_GETH_DIST_URL";
pub const TMP_DIR_ENV: &str = "INSTALL_GETH_TMP_DIR";
pub const CACHE_DIR_ENV: &str = "INSTALL_GETH_CACHE_DIR";
const RUNNER_TEMP_ENV: &str = "RUNNER_TEMP";
const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
const GITHUB_PATH_ENV: &str = "GITHUB_PATH";

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Config {
    /// GitHub REST API base URL, without a trailing slash.
    pub api_url: String,
    /// Artifact host base URL, without a trailing slash.
    pub dist_url: String,
    /// Root for the install directory, the unpack directory and downloads.
    pub tmp_dir: PathBuf,
    /// Root of the filesystem cache; `None` disables caching.
    pub cache_dir: Option<PathBuf>,
    /// Token for metadata requests.
    pub auth_token: Option<String>,
    /// File that exports `PATH` additions to later CI steps.
    pub github_path: Option<PathBuf>,
}

impl Config {
    /// Builds the configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_url = var(API_URL_ENV).map_or_else(|| DEFAULT_API_URL.to_string(), trim_url);
        let dist_url = var(DIST_URL_ENV).map_or_else(|| DEFAULT_DIST_URL.to_string(), trim_url);

        let tmp_dir = var(TMP_DIR_ENV)
            .or_else(|| var(RUNNER_TEMP_ENV))
            .map_or_else(std::env::temp_dir, PathBuf::from);

        let cache_dir = var(CACHE_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| dirs::cache_dir().map(|dir| dir.join("install-geth")));

        Self {
            api_url,
            dist_url,
            tmp_dir,
            cache_dir,
            auth_token: var(GITHUB_TOKEN_ENV),
            github_path: var(GITHUB_PATH_ENV).map(PathBuf::from),
        }
    }

    /// Overrides the auth token when one was given explicitly.
    ///
    /// Blank tokens are ignored: CI runners pass unset inputs as empty strings.
    #[must_use]
    pub fn with_auth_token(mut self, token: Option<&str>) -> Self {
        if let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) {
            self.auth_token = Some(token.to_string());
        }
        self
    }

    /// Disables the filesystem cache.
    #[must_use]
    pub fn without_cache(mut self) -> Self {
        self.cache_dir = None;
        self
    }

    /// Final install directory for a version: `<tmp>/geth-<version>`.
    #[must_use]
    pub fn install_dir(&self, version: &str) -> PathBuf {
        self.tmp_dir.join(format!("{TOOL_NAME}-{version}"))
    }

    /// Scratch directory archives are unpacked into: `<tmp>/geth.tmp`.
    #[must_use]
    pub fn unpack_dir(&self) -> PathBuf {
        self.tmp_dir.join(format!("{TOOL_NAME}.tmp"))
    }
}

fn trim_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_with(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = config_with(&[]);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.dist_url, DEFAULT_DIST_URL);
        assert_eq!(config.tmp_dir, std::env::temp_dir());
        assert!(config.auth_token.is_none());
        assert!(config.github_path.is_none());
    }

    #[test]
    fn overrides_are_trimmed_of_trailing_slashes() {
        let config = config_with(&[
            (API_URL_ENV, "http://127.0.0.1:9000/"),
            (DIST_URL_ENV, " http://mirror.local/builds// "),
        ]);
        assert_eq!(config.api_url, "http://127.0.0.1:9000");
        assert_eq!(config.dist_url, "http://mirror.local/builds");
    }

    #[test]
    fn whitespace_values_are_treated_as_unset() {
        let config = config_with(&[(API_URL_ENV, "   "), (GITHUB_TOKEN_ENV, "")]);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.auth_token.is_none());
    }

    #[test]
    fn explicit_tmp_dir_wins_over_runner_temp() {
        let config = config_with(&[(RUNNER_TEMP_ENV, "/runner/tmp")]);
        assert_eq!(config.tmp_dir, PathBuf::from("/runner/tmp"));

        let config = config_with(&[(RUNNER_TEMP_ENV, "/runner/tmp"), (TMP_DIR_ENV, "/custom")]);
        assert_eq!(config.tmp_dir, PathBuf::from("/custom"));
    }

    #[test]
    fn install_and_unpack_dirs_are_derived_from_tmp() {
        let config = config_with(&[(TMP_DIR_ENV, "/work")]);
        assert_eq!(config.install_dir("1.13.5"), PathBuf::from("/work/geth-1.13.5"));
        assert_eq!(config.unpack_dir(), PathBuf::from("/work/geth.tmp"));
    }

    #[test]
    fn explicit_token_overrides_environment_but_blank_does_not() {
        let config = config_with(&[(GITHUB_TOKEN_ENV, "from-env")]);
        assert_eq!(
            config.clone().with_auth_token(Some("from-flag")).auth_token.as_deref(),
            Some("from-flag")
        );
        assert_eq!(
            config.with_auth_token(Some("  ")).auth_token.as_deref(),
            Some("from-env")
        );
    }

    #[test]
    fn cache_dir_override_and_disable() {
        let config = config_with(&[(CACHE_DIR_ENV, "/cache")]);
        assert_eq!(config.cache_dir, Some(PathBuf::from("/cache")));
        assert!(config.without_cache().cache_dir.is_none());
    }
}
