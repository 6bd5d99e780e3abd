//! Package configuration and generator settings.
//!
//! Every llpkg directory carries an `llpkg.cfg` JSON file naming the upstream
//! C package and the installer that provides it. [`GeneratorSettings`] holds
//! the tunables of an llcppg run.

use crate::diff::DEFAULT_DIFF_PROGRAM;
use crate::error::WorkflowError;
use crate::package_name::PackageName;
use crate::toolchain::DEFAULT_GO_VERSION;
use camino::Utf8Path;
use serde::Deserialize;
use std::collections::BTreeMap;

/// File that identifies an llpkg directory.
pub const LLPKG_CONFIG_FILE: &str = "llpkg.cfg";

/// llcppg configuration file that must exist before generation.
pub const LLCPPG_CONFIG_FILE: &str = "llcppg.cfg";

/// Public symbol manifest copied alongside the config when present.
pub const LLCPPG_PUB_FILE: &str = "llcppg.pub";

/// Pattern for the optional generated-symbol JSON file.
pub const SYMB_JSON_PATTERN: &str = "*.symb.json";

/// Repository that generated packages are published under.
pub const DEFAULT_MODULE_ROOT: &str = "github.com/luoliwoshang/goplus-llpkg";

/// Parsed contents of `llpkg.cfg`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LlpkgConfig {
    /// Where the C library comes from.
    pub upstream: UpstreamConfig,
}

/// Upstream section of `llpkg.cfg`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpstreamConfig {
    /// Installer used to fetch and build the C library.
    #[serde(default)]
    pub installer: InstallerConfig,
    /// The C package itself.
    pub package: Package,
}

/// Installer descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstallerConfig {
    /// Installer name, currently only `conan`.
    #[serde(default = "default_installer_name")]
    pub name: String,
    /// Extra installer options.
    #[serde(default)]
    pub config: BTreeMap<String, String>,
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            name: default_installer_name(),
            config: BTreeMap::new(),
        }
    }
}

fn default_installer_name() -> String {
    "conan".to_owned()
}

/// An upstream C package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Package {
    /// Package name, reused as the generated Go package name.
    pub name: PackageName,
    /// Upstream version.
    pub version: String,
}

impl Package {
    /// Return the package name as a [`PackageName`].
    #[must_use]
    pub fn package_name(&self) -> PackageName {
        self.name.clone()
    }
}

impl LlpkgConfig {
    /// Parse `llpkg.cfg` contents.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed, a required field is missing,
    /// or the package name is not a single directory name.
    pub fn parse(contents: &str, path: &Utf8Path) -> Result<Self, WorkflowError> {
        serde_json::from_str(contents).map_err(|e| WorkflowError::Config {
            path: path.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Read and parse the `llpkg.cfg` inside `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(dir: &Utf8Path) -> Result<Self, WorkflowError> {
        let path = dir.join(LLPKG_CONFIG_FILE);
        let contents = std::fs::read_to_string(&path).map_err(|e| WorkflowError::Config {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        Self::parse(&contents, &path)
    }
}

/// Tunables for an llcppg run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    /// Module root the package path is derived from.
    pub module_root: String,
    /// Go version exported through `GOTOOLCHAIN`.
    pub go_version: String,
    /// llcppg executable.
    pub llcppg_program: String,
    /// llcppcfg executable.
    pub llcppcfg_program: String,
    /// Program invoked as `<program> diff --no-index`.
    pub diff_program: String,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            module_root: DEFAULT_MODULE_ROOT.to_owned(),
            go_version: DEFAULT_GO_VERSION.to_owned(),
            llcppg_program: "llcppg".to_owned(),
            llcppcfg_program: "llcppcfg".to_owned(),
            diff_program: DEFAULT_DIFF_PROGRAM.to_owned(),
        }
    }
}
