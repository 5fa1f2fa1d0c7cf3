//! Error types for the install-geth CLI.
//!
//! `SetupError` classifies the failures that abort an installation run with a
//! user-facing message. Plumbing failures (I/O, HTTP transport, JSON decoding)
//! travel as `anyhow::Error` with context attached; both kinds end up in the
//! same top-level handler in `main`.

use thiserror::Error;

/// Classified fatal errors for an installation run.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The operating system has no upstream builds at all.
    #[error("unsupported platform ({platform})")]
    UnsupportedPlatform {
        /// Operating system identifier, e.g. `freebsd`.
        platform: String,
    },

    /// The operating system is known but the CPU architecture has no build.
    #[error("unsupported architecture for platform {platform} ({arch})")]
    UnsupportedArchitecture {
        /// Operating system identifier.
        platform: String,
        /// CPU architecture identifier.
        arch: String,
    },

    /// The artifact URL does not end in an archive format we can extract.
    #[error("unsupported distributive format: {url}")]
    UnsupportedFormat {
        /// The offending artifact URL.
        url: String,
    },

    /// The upstream repository has no such release tag.
    #[error("release tag not found upstream: {tag}")]
    ReleaseNotFound {
        /// The tag that was looked up, e.g. `v1.13.5`.
        tag: String,
    },

    /// The release metadata service answered with a non-success status.
    #[error("release metadata request failed with HTTP {status}: {url}")]
    Metadata {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The artifact host answered with a non-success status.
    #[error("download failed with HTTP {status}: {url}")]
    Download {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// The tool could not be found on the search path after installation.
    #[error("{tool} binary file not found in $PATH")]
    BinaryNotFound {
        /// Name of the binary that was looked up.
        tool: String,
    },

    /// The tool was found but `<tool> version` did not exit successfully.
    #[error("`{tool} version` failed ({status}){}", stderr_suffix(.stderr))]
    VersionCheckFailed {
        /// Name of the binary that was executed.
        tool: String,
        /// Human readable exit status, e.g. `exit code 2`.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The cache already holds an entry under this key.
    #[error("cache entry already exists: {key}")]
    CacheEntryExists {
        /// The cache key.
        key: String,
    },

    /// Invalid command line arguments or inputs.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        /// Description of what was invalid.
        message: String,
    },
}

fn stderr_suffix(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

impl SetupError {
    /// Creates a new `UnsupportedPlatform` error.
    #[must_use]
    pub fn unsupported_platform(platform: impl Into<String>) -> Self {
        Self::UnsupportedPlatform {
            platform: platform.into(),
        }
    }

    /// Creates a new `UnsupportedArchitecture` error.
    #[must_use]
    pub fn unsupported_architecture(platform: impl Into<String>, arch: impl Into<String>) -> Self {
        Self::UnsupportedArchitecture {
            platform: platform.into(),
            arch: arch.into(),
        }
    }

    /// Creates a new `UnsupportedFormat` error.
    #[must_use]
    pub fn unsupported_format(url: impl Into<String>) -> Self {
        Self::UnsupportedFormat { url: url.into() }
    }

    /// Creates a new `ReleaseNotFound` error.
    #[must_use]
    pub fn release_not_found(tag: impl Into<String>) -> Self {
        Self::ReleaseNotFound { tag: tag.into() }
    }

    /// Creates a new `Metadata` error.
    #[must_use]
    pub fn metadata(status: u16, url: impl Into<String>) -> Self {
        Self::Metadata {
            status,
            url: url.into(),
        }
    }

    /// Creates a new `Download` error.
    #[must_use]
    pub fn download(status: u16, url: impl Into<String>) -> Self {
        Self::Download {
            status,
            url: url.into(),
        }
    }

    /// Creates a new `BinaryNotFound` error.
    #[must_use]
    pub fn binary_not_found(tool: impl Into<String>) -> Self {
        Self::BinaryNotFound { tool: tool.into() }
    }

    /// Creates a new `VersionCheckFailed` error from a process exit code.
    ///
    /// A missing code means the process was terminated by a signal.
    #[must_use]
    pub fn version_check_failed(
        tool: impl Into<String>,
        code: Option<i32>,
        stderr: impl Into<String>,
    ) -> Self {
        let status = match code {
            Some(code) => format!("exit code {code}"),
            None => "terminated by signal".to_string(),
        };
        Self::VersionCheckFailed {
            tool: tool.into(),
            status,
            stderr: stderr.into().trim().to_string(),
        }
    }

    /// Creates a new `CacheEntryExists` error.
    #[must_use]
    pub fn cache_entry_exists(key: impl Into<String>) -> Self {
        Self::CacheEntryExists { key: key.into() }
    }

    /// Creates a new `InvalidArguments` error.
    #[must_use]
    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self::InvalidArguments {
            message: message.into(),
        }
    }
}
