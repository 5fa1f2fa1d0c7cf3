//! Command modules for the install-geth CLI.
//!
//! - [`install`] - Install a geth build and publish it on `PATH` (default)
//! - [`locate`] - Print where a build would come from without downloading it
//! - [`check`] - Verify a geth binary on the current `PATH`

pub mod check;
pub mod install;
pub mod locate;
