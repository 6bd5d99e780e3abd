//! Go toolchain pinning for llcppg invocations.
//!
//! llcppg must run against an exact Go release and must resolve the C library
//! through the pkg-config files the upstream installer produced. Both are
//! expressed as a per-invocation environment overlay.

use crate::exec::Invocation;
use camino::{Utf8Path, Utf8PathBuf};

/// Go version llcppg is run with unless overridden.
pub const DEFAULT_GO_VERSION: &str = "1.20.14";

/// Environment variable that selects the Go toolchain.
pub const GO_TOOLCHAIN_VAR: &str = "GOTOOLCHAIN";

/// Environment variable searched by pkg-config for `.pc` files.
pub const PKG_CONFIG_PATH_VAR: &str = "PKG_CONFIG_PATH";

/// A pinned Go toolchain plus the pkg-config directory for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolchainPin {
    go_version: String,
    pkg_config_dir: Utf8PathBuf,
}

impl ToolchainPin {
    /// Pin `go_version` and advertise `pkg_config_dir` to child processes.
    #[must_use]
    pub fn new(go_version: impl Into<String>, pkg_config_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            go_version: go_version.into(),
            pkg_config_dir: pkg_config_dir.into(),
        }
    }

    /// Return the `GOTOOLCHAIN` value, for example `go1.20.14`.
    #[must_use]
    pub fn toolchain(&self) -> String {
        format!("go{}", self.go_version)
    }

    /// Return the directory holding the installer's `.pc` files.
    #[must_use]
    pub fn pkg_config_dir(&self) -> &Utf8Path {
        &self.pkg_config_dir
    }

    /// Add the pkg-config overlay only.
    #[must_use]
    pub fn with_pkg_config(&self, invocation: Invocation) -> Invocation {
        invocation.env(PKG_CONFIG_PATH_VAR, self.pkg_config_dir.as_str())
    }

    /// Add both the pkg-config and the Go toolchain overlay.
    #[must_use]
    pub fn apply(&self, invocation: Invocation) -> Invocation {
        self.with_pkg_config(invocation)
            .env(GO_TOOLCHAIN_VAR, self.toolchain())
    }
}
