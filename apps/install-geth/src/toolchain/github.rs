//! Release metadata lookups against the GitHub REST API.
//!
//! Two endpoints of the upstream repository are used:
//!
//! - `GET /repos/{owner}/{repo}/releases/latest` for the newest published release
//! - `GET /repos/{owner}/{repo}/git/ref/tags/{tag}` for the object a tag points at
//!
//! Requests are authenticated when a token is configured; unauthenticated
//! requests work too but hit lower rate limits.

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::{UPSTREAM_OWNER, UPSTREAM_REPO};
use crate::errors::SetupError;

/// Request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// User-Agent header for HTTP requests; the API rejects requests without one.
const USER_AGENT: &str = concat!("install-geth/", env!("CARGO_PKG_VERSION"));

const GITHUB_MEDIA_TYPE: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "X-GitHub-Api-Version";
const API_VERSION: &str = "2022-11-28";

/// Source of upstream release information.
pub trait ReleaseMetadata {
    /// Tag name of the most recent published release, e.g. `v1.13.5`.
    async fn latest_release_tag(&self) -> Result<String>;

    /// Full SHA of the object the given tag points at.
    async fn tag_commit_sha(&self, tag: &str) -> Result<String>;
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct GitRef {
    object: GitObject,
}

#[derive(Debug, Deserialize)]
struct GitObject {
    sha: String,
}

/// GitHub REST API client scoped to the upstream repository.
pub struct GitHubClient {
    http: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Creates a client for the given API base URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(api_url: &str, token: Option<&str>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            api_url: api_url.trim_end_matches('/').to_string(),
            token: token.map(str::to_string),
        })
    }

    fn repo_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{UPSTREAM_OWNER}/{UPSTREAM_REPO}/{path}",
            self.api_url
        )
    }

    /// Sends a GET request and decodes a successful JSON body.
    ///
    /// Non-success statuses come back as the inner `Err(status)` so that the
    /// caller can give 404 its own meaning.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Result<T, StatusCode>> {
        let mut request = self
            .http
            .get(url)
            .header(ACCEPT, GITHUB_MEDIA_TYPE)
            .header(API_VERSION_HEADER, API_VERSION);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        tracing::debug!(url, authenticated = self.token.is_some(), "GitHub API request");

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to connect to {url}"))?;

        let status = response.status();
        if !status.is_success() {
            return Ok(Err(status));
        }

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response from {url}"))?;

        let body = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse response from {url}"))?;
        Ok(Ok(body))
    }
}

impl ReleaseMetadata for GitHubClient {
    async fn latest_release_tag(&self) -> Result<String> {
        let url = self.repo_url("releases/latest");
        match self.get_json::<Release>(&url).await? {
            Ok(release) => Ok(release.tag_name),
            Err(status) => Err(SetupError::metadata(status.as_u16(), url).into()),
        }
    }

    async fn tag_commit_sha(&self, tag: &str) -> Result<String> {
        let url = self.repo_url(&format!("git/ref/tags/{tag}"));
        match self.get_json::<GitRef>(&url).await? {
            Ok(git_ref) => Ok(git_ref.object.sha),
            Err(StatusCode::NOT_FOUND) => Err(SetupError::release_not_found(tag).into()),
            Err(status) => Err(SetupError::metadata(status.as_u16(), url).into()),
        }
    }
}
