//! Version input handling and resolution.
//!
//! A version input is either the token `latest` (any case) or an explicit
//! release such as `1.13.5`, optionally written with a leading `v`/`V`.

use std::fmt;

use anyhow::{Context, Result};

use super::github::ReleaseMetadata;

/// A parsed version input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionSpec {
    /// The most recent published release.
    Latest,
    /// An explicit release, never carrying a leading `v`.
    Exact(String),
}

impl VersionSpec {
    /// Parses a version input.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        let version = strip_version_prefix(input.trim());
        if version.eq_ignore_ascii_case("latest") {
            Self::Latest
        } else {
            Self::Exact(version.to_string())
        }
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str("latest"),
            Self::Exact(version) => f.write_str(version),
        }
    }
}

/// Removes a single leading `v` or `V`.
#[must_use]
pub fn strip_version_prefix(version: &str) -> &str {
    version
        .strip_prefix(['v', 'V'])
        .unwrap_or(version)
}

/// Upstream tag name for a version: `v<version>`.
#[must_use]
pub fn release_tag(version: &str) -> String {
    format!("v{version}")
}

/// Turns a version input into a concrete version string.
///
/// # Errors
///
/// Returns an error if `latest` was requested and the metadata lookup fails.
pub async fn resolve(spec: &VersionSpec, metadata: &impl ReleaseMetadata) -> Result<String> {
    match spec {
        VersionSpec::Exact(version) => Ok(version.clone()),
        VersionSpec::Latest => {
            tracing::debug!("Requesting latest geth version...");
            let tag = metadata
                .latest_release_tag()
                .await
                .context("Failed to resolve the latest geth release")?;
            let version = strip_version_prefix(&tag).to_string();
            tracing::debug!(%version, "Latest version");
            Ok(version)
        }
    }
}

/// Looks up the full commit hash of the release tag for `version`.
///
/// Doubles as a check that the version exists upstream.
///
/// # Errors
///
/// Returns an error if the tag does not exist or the lookup fails.
pub async fn commit_hash_for(version: &str, metadata: &impl ReleaseMetadata) -> Result<String> {
    let tag = release_tag(version);
    let sha = metadata.tag_commit_sha(&tag).await?;
    tracing::debug!(%tag, %sha, "Resolved release commit");
    Ok(sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    struct FixedMetadata {
        latest: &'static str,
        requested_tags: RefCell<Vec<String>>,
    }

    impl FixedMetadata {
        fn new(latest: &'static str) -> Self {
            Self {
                latest,
                requested_tags: RefCell::new(Vec::new()),
            }
        }
    }

    impl ReleaseMetadata for FixedMetadata {
        async fn latest_release_tag(&self) -> Result<String> {
            Ok(self.latest.to_string())
        }

        async fn tag_commit_sha(&self, tag: &str) -> Result<String> {
            self.requested_tags.borrow_mut().push(tag.to_string());
            Ok("8be800ffa9c4992666e2620e0ab4725a1a83352b".to_string())
        }
    }

    struct FailingMetadata;

    impl ReleaseMetadata for FailingMetadata {
        async fn latest_release_tag(&self) -> Result<String> {
            anyhow::bail!("connection refused")
        }

        async fn tag_commit_sha(&self, _tag: &str) -> Result<String> {
            anyhow::bail!("connection refused")
        }
    }

    #[test]
    fn prefix_is_stripped_case_insensitively() {
        for input in ["v1.10.15", "V1.10.15", "1.10.15"] {
            assert_eq!(
                VersionSpec::parse(input),
                VersionSpec::Exact("1.10.15".to_string()),
                "{input}"
            );
        }
    }

    #[test]
    fn stripping_is_idempotent() {
        let once = strip_version_prefix("v1.13.5");
        assert_eq!(strip_version_prefix(once), once);
        assert_eq!(strip_version_prefix("1.13.5"), "1.13.5");
    }

    #[test]
    fn only_one_prefix_character_is_removed() {
        assert_eq!(strip_version_prefix("vv1.0.0"), "v1.0.0");
    }

    #[test]
    fn latest_token_is_case_insensitive() {
        for input in ["latest", "LATEST", "Latest", " latest "] {
            assert_eq!(VersionSpec::parse(input), VersionSpec::Latest, "{input}");
        }
    }

    #[test]
    fn display_matches_parsed_value() {
        assert_eq!(VersionSpec::parse("V1.2.3").to_string(), "1.2.3");
        assert_eq!(VersionSpec::parse("latest").to_string(), "latest");
    }

    #[tokio::test]
    async fn latest_resolves_to_stripped_tag() {
        let metadata = FixedMetadata::new("v1.13.5");
        let version = resolve(&VersionSpec::Latest, &metadata).await.unwrap();
        assert_eq!(version, "1.13.5");
    }

    #[tokio::test]
    async fn exact_version_is_returned_without_lookup() {
        let version = resolve(&VersionSpec::Exact("1.10.15".to_string()), &FailingMetadata)
            .await
            .unwrap();
        assert_eq!(version, "1.10.15");
    }

    #[tokio::test]
    async fn latest_lookup_failure_is_fatal() {
        let err = resolve(&VersionSpec::Latest, &FailingMetadata)
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("connection refused"));
    }

    #[tokio::test]
    async fn commit_lookup_queries_v_prefixed_tag() {
        let metadata = FixedMetadata::new("v1.13.5");
        let sha = commit_hash_for("1.13.5", &metadata).await.unwrap();
        assert_eq!(sha, "8be800ffa9c4992666e2620e0ab4725a1a83352b");
        assert_eq!(*metadata.requested_tags.borrow(), vec!["v1.13.5".to_string()]);
    }
}
