//! Per-call generation context and scoped scratch directories.

use crate::error::Failure;
use crate::package_name::PackageName;
use camino::{Utf8Path, Utf8PathBuf};
use std::io;
use tempfile::TempDir;

/// Prefix for scratch directories created by this crate.
pub const SCRATCH_PREFIX: &str = "llpkg-tool";

/// A temporary directory that is deleted when dropped.
///
/// Deletion happens on every exit path, including early returns and unwinding.
#[derive(Debug)]
pub struct ScratchDir {
    dir: TempDir,
    path: Utf8PathBuf,
}

impl ScratchDir {
    /// Create a fresh scratch directory in the system temporary location.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or its path is not
    /// valid UTF-8.
    pub fn new(prefix: &str) -> Result<Self, Failure> {
        let dir = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir()
            .map_err(|source| Failure::Scratch { source })?;
        let path = Utf8PathBuf::try_from(dir.path().to_path_buf()).map_err(|e| {
            Failure::NonUtf8Path {
                path: e.into_path_buf().display().to_string(),
            }
        })?;
        Ok(Self { dir, path })
    }

    /// Return the directory path.
    #[must_use]
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// Delete the directory now, reporting any failure.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}

/// Everything a single `generate` or `verify` call needs to know.
///
/// The context owns the scratch directory holding the installer's pkg-config
/// files; dropping the context releases it.
#[derive(Debug)]
pub struct GenerationContext {
    source_dir: Utf8PathBuf,
    package: PackageName,
    pkg_config: ScratchDir,
}

impl GenerationContext {
    /// Build a context for the package whose configuration lives in `source_dir`.
    #[must_use]
    pub fn new(
        source_dir: impl Into<Utf8PathBuf>,
        package: PackageName,
        pkg_config: ScratchDir,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            package,
            pkg_config,
        }
    }

    /// Directory holding `llcppg.cfg` and the submitted generated tree.
    #[must_use]
    pub fn source_dir(&self) -> &Utf8Path {
        &self.source_dir
    }

    /// Package being generated.
    #[must_use]
    pub fn package(&self) -> &PackageName {
        &self.package
    }

    /// Directory holding the installer's `.pc` files.
    #[must_use]
    pub fn pkg_config_dir(&self) -> &Utf8Path {
        self.pkg_config.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_dir_is_removed_on_drop() {
        let scratch = ScratchDir::new(SCRATCH_PREFIX).expect("scratch dir");
        let path = scratch.path().to_owned();
        assert!(path.is_dir());
        drop(scratch);
        assert!(!path.exists());
    }

    #[test]
    fn context_releases_scratch_with_itself() {
        let scratch = ScratchDir::new(SCRATCH_PREFIX).expect("scratch dir");
        let package = PackageName::try_from("cjson").expect("valid package name");
        let context = GenerationContext::new("/tmp/cjson", package, scratch);
        let pc_dir = context.pkg_config_dir().to_owned();
        assert!(pc_dir.is_dir());
        drop(context);
        assert!(!pc_dir.exists());
    }
}
