//! Artifact location for upstream geth builds.
//!
//! Upstream publishes one "alltools" archive per platform, architecture and
//! release, named after the Go target and the first eight characters of the
//! release commit:
//!
//! ```text
//! <base>/geth-alltools-linux-amd64-1.13.5-8be800ff.tar.gz
//! <base>/geth-alltools-windows-386-1.13.5-8be800ff.zip
//! ```
//!
//! The support matrix lives in [`BUILD_TARGETS`]; anything not listed there
//! has no build and fails to locate.

use std::fmt;

use super::platform::{Arch, Os, PlatformArch};
use crate::config::TOOL_NAME;
use crate::errors::SetupError;

/// Default artifact host.
pub const DEFAULT_DIST_URL: &str = "https://gethstore.blob.core.windows.net/builds";

/// Length of the commit hash prefix embedded in artifact names.
pub const SHORT_HASH_LEN: usize = 8;

/// Archive container of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    TarGz,
    Zip,
}

impl ArchiveFormat {
    /// File extension without the leading dot.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::TarGz => "tar.gz",
            Self::Zip => "zip",
        }
    }

    /// Determines the format from a URL or file name suffix.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else {
            None
        }
    }
}

impl fmt::Display for ArchiveFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Where to download a build from and how to unpack it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactDescriptor {
    pub url: String,
    pub format: ArchiveFormat,
}

impl ArtifactDescriptor {
    /// Last path segment of the URL.
    #[must_use]
    pub fn filename(&self) -> &str {
        self.url.rsplit('/').next().unwrap_or(&self.url)
    }
}

/// One row of the support matrix.
pub struct BuildTarget {
    pub os: Os,
    pub arch: Arch,
    /// Go operating system name used in the artifact name.
    pub os_token: &'static str,
    /// Go architecture name used in the artifact name.
    pub arch_token: &'static str,
    pub format: ArchiveFormat,
}

/// Every (platform, architecture) pair with an upstream build.
pub static BUILD_TARGETS: &[BuildTarget] = &[
    BuildTarget {
        os: Os::Linux,
        arch: Arch::X64,
        os_token: "linux",
        arch_token: "amd64",
        format: ArchiveFormat::TarGz,
    },
    BuildTarget {
        os: Os::Linux,
        arch: Arch::X32,
        os_token: "linux",
        arch_token: "386",
        format: ArchiveFormat::TarGz,
    },
    BuildTarget {
        os: Os::Linux,
        arch: Arch::Arm64,
        os_token: "linux",
        arch_token: "arm64",
        format: ArchiveFormat::TarGz,
    },
    BuildTarget {
        os: Os::Darwin,
        arch: Arch::X64,
        os_token: "darwin",
        arch_token: "amd64",
        format: ArchiveFormat::TarGz,
    },
    // darwin/arm64 builds exist since 1.13.5
    BuildTarget {
        os: Os::Darwin,
        arch: Arch::Arm64,
        os_token: "darwin",
        arch_token: "arm64",
        format: ArchiveFormat::TarGz,
    },
    BuildTarget {
        os: Os::Windows,
        arch: Arch::X64,
        os_token: "windows",
        arch_token: "amd64",
        format: ArchiveFormat::Zip,
    },
    BuildTarget {
        os: Os::Windows,
        arch: Arch::X32,
        os_token: "windows",
        arch_token: "386",
        format: ArchiveFormat::Zip,
    },
];

/// First [`SHORT_HASH_LEN`] characters of a commit hash.
///
/// Hashes shorter than that are returned whole.
#[must_use]
pub fn short_hash(commit_hash: &str) -> &str {
    commit_hash.get(..SHORT_HASH_LEN).unwrap_or(commit_hash)
}

/// Locates the artifact for a release on the build host at `base_url`.
///
/// # Errors
///
/// Returns [`SetupError::UnsupportedPlatform`] for operating systems without
/// builds and [`SetupError::UnsupportedArchitecture`] for architectures the
/// operating system has no build for.
pub fn locate(
    base_url: &str,
    target: &PlatformArch,
    version: &str,
    commit_hash: &str,
) -> Result<ArtifactDescriptor, SetupError> {
    if let Os::Other(name) = &target.os {
        return Err(SetupError::unsupported_platform(name.as_str()));
    }

    let build = BUILD_TARGETS
        .iter()
        .find(|b| b.os == target.os && b.arch == target.arch)
        .ok_or_else(|| {
            SetupError::unsupported_architecture(target.os.as_str(), target.arch.as_str())
        })?;

    let url = format!(
        "{base}/{TOOL_NAME}-alltools-{os}-{arch}-{version}-{hash}.{ext}",
        base = base_url.trim_end_matches('/'),
        os = build.os_token,
        arch = build.arch_token,
        hash = short_hash(commit_hash),
        ext = build.format.extension(),
    );

    Ok(ArtifactDescriptor {
        url,
        format: build.format,
    })
}
