//! Locating, fetching and installing geth builds.
//!
//! ## Module Structure
//!
//! - [`platform`] - OS and architecture detection
//! - [`locator`] - Mapping a target and release to an artifact URL
//! - [`github`] - Release metadata from the GitHub REST API
//! - [`version`] - Version token normalisation and resolution
//! - [`download`] - Streaming HTTP download
//! - [`archive`] - tar.gz and ZIP extraction
//! - [`cache`] - Install directory cache
//! - [`installer`] - The install pipeline
//! - [`search_path`] - Executable search path handling
//! - [`verify`] - Post-install verification

pub mod archive;
pub mod cache;
pub mod download;
pub mod github;
pub mod installer;
pub mod locator;
pub mod platform;
pub mod search_path;
pub mod verify;
pub mod version;

pub use cache::{CacheStore, FsCacheStore, NoCache, cache_key};
pub use download::HttpFetcher;
pub use github::GitHubClient;
pub use installer::Installer;
pub use locator::locate;
pub use platform::PlatformArch;
pub use search_path::SearchPath;
pub use verify::verify;
pub use version::{VersionSpec, commit_hash_for, resolve};
