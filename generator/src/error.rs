//! Error types for llcppg generation and verification.
//!
//! Every failure that crosses the generator boundary is tagged with the stage
//! that produced it, so callers can tell a generation failure from a check
//! failure without inspecting message text.

use crate::merge::{CollisionError, MergeError};
use crate::package_name::PackageName;
use crate::verification::Violations;
use camino::Utf8PathBuf;
use std::fmt;
use std::process::ExitStatus;
use thiserror::Error;

/// The generator component an error originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Preparing inputs, running llcppg, or merging its output.
    Generate,
    /// Validating generator output or comparing trees.
    Check,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Generate => f.write_str("generate"),
            Self::Check => f.write_str("check"),
        }
    }
}

/// Errors returned by [`crate::llcppg::LlcppgGenerator`].
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// llcppg could not produce a package.
    #[error("llcppg: cannot generate: {0}")]
    Generate(#[source] Failure),

    /// Generated output could not be validated.
    #[error("llcppg: check fail: {0}")]
    Check(#[source] Failure),
}

impl GeneratorError {
    /// Return the stage marker attached to this error.
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self {
            Self::Generate(_) => Stage::Generate,
            Self::Check(_) => Stage::Check,
        }
    }

    /// Return the underlying failure.
    #[must_use]
    pub fn failure(&self) -> &Failure {
        match self {
            Self::Generate(failure) | Self::Check(failure) => failure,
        }
    }

    pub(crate) fn generate(failure: impl Into<Failure>) -> Self {
        Self::Generate(failure.into())
    }

    pub(crate) fn check(failure: impl Into<Failure>) -> Self {
        Self::Check(failure.into())
    }
}

/// The concrete reason a generation or check step failed.
#[derive(Debug, Error)]
pub enum Failure {
    /// The primary llcppg configuration file is missing from the source directory.
    #[error("required config file {path} not found")]
    MissingConfig {
        /// Path where the config file was expected.
        path: Utf8PathBuf,
    },

    /// Copying an input file into the target directory failed.
    #[error("failed to copy {from} to {to}")]
    Copy {
        /// Source of the copy.
        from: Utf8PathBuf,
        /// Destination of the copy.
        to: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The external program could not be started.
    #[error("failed to run {program}")]
    Spawn {
        /// Name of the program.
        program: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The external program ran but exited unsuccessfully.
    #[error("{program} exited unexpectedly ({status}): {stderr}")]
    ExitStatus {
        /// Name of the program.
        program: String,
        /// Exit status reported by the operating system.
        status: ExitStatus,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// The generator finished but did not create the package directory.
    #[error("generate fail: {path} was not produced")]
    MissingOutput {
        /// Path of the expected package directory.
        path: Utf8PathBuf,
    },

    /// Merging generated output would have overwritten existing files.
    #[error(transparent)]
    Collision(#[from] CollisionError),

    /// Hashing a directory tree failed.
    #[error("failed to hash {root}")]
    Hash {
        /// Root of the tree being hashed.
        root: Utf8PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A path could not be represented as UTF-8.
    #[error("path is not valid UTF-8: {path}")]
    NonUtf8Path {
        /// Lossy rendering of the offending path.
        path: String,
    },

    /// A scratch directory could not be created.
    #[error("failed to create scratch directory")]
    Scratch {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<MergeError> for Failure {
    fn from(err: MergeError) -> Self {
        match err {
            MergeError::Collision(collision) => Self::Collision(collision),
            MergeError::Io(source) => Self::Io(source),
        }
    }
}

/// Result type alias using [`GeneratorError`].
pub type Result<T> = std::result::Result<T, GeneratorError>;

/// Errors raised by the end-to-end `generate` and `verify` workflows.
#[derive(Debug, Error)]
pub enum WorkflowError {
    /// The package configuration file could not be read or parsed.
    #[error("parse config error: {path}: {reason}")]
    Config {
        /// Path to the configuration file.
        path: Utf8PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The configured upstream installer is not supported.
    #[error("unsupported installer {name}")]
    UnsupportedInstaller {
        /// Installer name from the configuration.
        name: String,
    },

    /// The upstream installer failed to provide the C library.
    #[error("failed to install {package}: {message}")]
    Install {
        /// Package that was being installed.
        package: PackageName,
        /// Description of the failure.
        message: String,
    },

    /// `llcppcfg` could not produce an llcppg configuration.
    #[error("llcppcfg execute fail: {message}")]
    ConfigGeneration {
        /// Combined output of the failed invocation.
        message: String,
    },

    /// Generation or comparison failed.
    #[error(transparent)]
    Generator(#[from] GeneratorError),

    /// The submitted tree does not match a fresh generation.
    #[error("llcppg: check fail: {package} does not match generated output\n{violations}")]
    Violations {
        /// Package that was checked.
        package: PackageName,
        /// Every difference that was found.
        violations: Violations,
    },

    /// An I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
