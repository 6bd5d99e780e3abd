//! llpkg generator library.
//!
//! This crate regenerates llpkg Go binding packages with llcppg and checks
//! that a submitted package tree matches what the generator produces. It is
//! used by the `llpkg-generator` CLI binary and can be driven
//! programmatically through the [`exec::CommandExecutor`] seam.
//!
//! # Modules
//!
//! - [`cli`] - Command-line argument definitions
//! - [`config`] - `llpkg.cfg` parsing and generator settings
//! - [`context`] - Per-call generation context and scratch directories
//! - [`diff`] - Line diffs for mismatched files
//! - [`digest`] - SHA-256 content digests
//! - [`error`] - Error taxonomy with generate/check markers
//! - [`exec`] - Subprocess invocation capability
//! - [`hashing`] - Hashable-path policy and directory hash collection
//! - [`llcppg`] - llcppg invocation and tree verification
//! - [`logging`] - Stderr `log` backend
//! - [`merge`] - Tree merging that never overwrites
//! - [`output`] - Stderr reporting helpers
//! - [`package_name`] - Semantic wrapper for package names
//! - [`toolchain`] - Pinned Go toolchain environment
//! - [`upstream`] - Upstream C library installers
//! - [`verification`] - Verification outcomes and reports
//! - [`workflow`] - End-to-end generate and verify runs

pub mod cli;
pub mod config;
pub mod context;
pub mod diff;
pub mod digest;
pub mod error;
pub mod exec;
pub mod hashing;
pub mod llcppg;
pub mod logging;
pub mod merge;
pub mod output;
pub mod package_name;
#[cfg(any(test, feature = "test-support"))]
pub mod test_utils;
pub mod toolchain;
pub mod upstream;
pub mod verification;
pub mod workflow;
