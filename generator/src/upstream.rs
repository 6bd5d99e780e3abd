//! Upstream C library installation.
//!
//! An installer fetches and builds the C library described in `llpkg.cfg`
//! into a scratch directory and leaves pkg-config files behind for llcppg.

use crate::config::{InstallerConfig, Package};
use crate::error::WorkflowError;
use crate::exec::{CommandExecutor, Invocation, combined_output};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;

/// Extension of pkg-config files.
const PC_EXTENSION: &str = "pc";

/// Installs an upstream package and reports its pkg-config name.
pub trait PackageInstaller {
    /// Install `package` into `dir` and return the pkg-config name of the
    /// library, i.e. the stem of its `.pc` file.
    ///
    /// # Errors
    ///
    /// Returns an error if the installation fails or leaves no `.pc` file.
    fn install(&self, package: &Package, dir: &Utf8Path) -> Result<String, WorkflowError>;
}

/// Installs packages from Conan Center via the `conan` CLI.
pub struct ConanInstaller<'a> {
    executor: &'a dyn CommandExecutor,
    options: &'a InstallerConfig,
}

impl<'a> ConanInstaller<'a> {
    /// Create an installer that runs conan through `executor`.
    #[must_use]
    pub fn new(executor: &'a dyn CommandExecutor, options: &'a InstallerConfig) -> Self {
        Self { executor, options }
    }

    fn invocation(&self, package: &Package, dir: &Utf8Path) -> Invocation {
        let mut invocation = Invocation::new("conan").args([
            "install".to_owned(),
            "--requires".to_owned(),
            format!("{}/{}", package.name, package.version),
            "--generator".to_owned(),
            "PkgConfigDeps".to_owned(),
            "--build".to_owned(),
            "missing".to_owned(),
            "--output-folder".to_owned(),
            dir.to_string(),
        ]);
        for (key, value) in &self.options.config {
            invocation = invocation.args(["-o".to_owned(), format!("{key}={value}")]);
        }
        invocation
    }
}

impl PackageInstaller for ConanInstaller<'_> {
    fn install(&self, package: &Package, dir: &Utf8Path) -> Result<String, WorkflowError> {
        let invocation = self.invocation(package, dir);
        log::info!("installing {}/{} with conan", package.name, package.version);

        let output = self
            .executor
            .run(&invocation)
            .map_err(|e| WorkflowError::Install {
                package: package.package_name(),
                message: format!("failed to run conan: {e}"),
            })?;
        if !output.status.success() {
            return Err(WorkflowError::Install {
                package: package.package_name(),
                message: combined_output(&output).trim().to_owned(),
            });
        }

        let files = pkg_config_files(dir)?;
        pkg_config_name(package.name.as_str(), &files).ok_or_else(|| WorkflowError::Install {
            package: package.package_name(),
            message: format!("no .pc file found in {dir}"),
        })
    }
}

/// Run `conan profile detect`, ignoring the result.
///
/// Conan refuses to install without a default profile; detection fails
/// harmlessly when one already exists.
pub fn detect_conan_profile(executor: &dyn CommandExecutor) {
    let invocation = Invocation::new("conan").args(["profile", "detect"]);
    match executor.run(&invocation) {
        Ok(output) if !output.status.success() => {
            log::debug!("`{invocation}` exited with {}", output.status);
        }
        Ok(_) => {}
        Err(err) => log::debug!("`{invocation}` failed: {err}"),
    }
}

/// Resolve the installer named in the configuration.
///
/// # Errors
///
/// Returns [`WorkflowError::UnsupportedInstaller`] for unknown names.
pub fn installer_for<'a>(
    options: &'a InstallerConfig,
    executor: &'a dyn CommandExecutor,
) -> Result<ConanInstaller<'a>, WorkflowError> {
    match options.name.as_str() {
        "conan" => Ok(ConanInstaller::new(executor, options)),
        other => Err(WorkflowError::UnsupportedInstaller {
            name: other.to_owned(),
        }),
    }
}

/// List the `.pc` files directly inside `dir`, sorted by path.
///
/// # Errors
///
/// Returns an error if `dir` cannot be read.
pub fn pkg_config_files(dir: &Utf8Path) -> io::Result<Vec<Utf8PathBuf>> {
    let pattern = format!("{}/*.{PC_EXTENSION}", glob::Pattern::escape(dir.as_str()));
    let paths = glob::glob(&pattern).map_err(|e| io::Error::other(e.to_string()))?;

    let mut files = Vec::new();
    for entry in paths {
        let path = entry.map_err(glob::GlobError::into_error)?;
        match Utf8PathBuf::try_from(path) {
            Ok(path) if path.is_file() => files.push(path),
            Ok(_) => {}
            Err(e) => log::warn!("skipping non UTF-8 path {}", e.as_path().display()),
        }
    }
    files.sort();
    Ok(files)
}

/// Pick the pkg-config name for `package` among `files`.
///
/// Prefers a file named exactly after the package, otherwise the first file.
#[must_use]
pub fn pkg_config_name(package: &str, files: &[Utf8PathBuf]) -> Option<String> {
    let stems: Vec<&str> = files.iter().filter_map(|f| f.file_stem()).collect();
    stems
        .iter()
        .find(|stem| **stem == package)
        .or_else(|| stems.first())
        .map(|stem| (*stem).to_owned())
}

/// Copy every `.pc` file from `from` into `to`, replacing older copies.
///
/// The copies are kept next to the package for debugging failed generations.
///
/// # Errors
///
/// Returns an error if listing or copying fails.
pub fn copy_pkg_config_files(from: &Utf8Path, to: &Utf8Path) -> io::Result<usize> {
    let files = pkg_config_files(from)?;
    for file in &files {
        if let Some(name) = file.file_name() {
            fs::copy(file, to.join(name))?;
        }
    }
    Ok(files.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package_name::PackageName;
    use crate::test_utils::{ExpectedCall, StubExecutor, failure_output, success_output};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn package() -> Package {
        Package {
            name: PackageName::try_from("cjson").expect("valid package name"),
            version: "1.7.18".to_owned(),
        }
    }

    fn utf8(dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(dir.path().to_path_buf()).expect("temp dir path not UTF-8")
    }

    fn conan_args(dir: &Utf8Path) -> Vec<String> {
        [
            "install",
            "--requires",
            "cjson/1.7.18",
            "--generator",
            "PkgConfigDeps",
            "--build",
            "missing",
            "--output-folder",
            dir.as_str(),
        ]
        .iter()
        .map(|s| (*s).to_owned())
        .collect()
    }

    #[test]
    fn install_returns_matching_pc_name() {
        let dir = TempDir::new().expect("temp dir");
        let root = utf8(&dir);
        fs::write(root.join("cjson.pc"), "Name: cjson").expect("write pc");
        fs::write(root.join("zlib.pc"), "Name: zlib").expect("write pc");

        let executor = StubExecutor::new(vec![ExpectedCall {
            program: "conan",
            args: conan_args(&root),
            result: Ok(success_output()),
        }]);
        let options = InstallerConfig::default();
        let installer = ConanInstaller::new(&executor, &options);

        let name = installer.install(&package(), &root).expect("install should succeed");
        assert_eq!(name, "cjson");
        executor.assert_finished();
    }

    #[test]
    fn install_passes_options() {
        let dir = TempDir::new().expect("temp dir");
        let root = utf8(&dir);
        fs::write(root.join("libcjson.pc"), "Name: cjson").expect("write pc");

        let mut args = conan_args(&root);
        args.extend(["-o".to_owned(), "shared=True".to_owned()]);
        let executor = StubExecutor::new(vec![ExpectedCall {
            program: "conan",
            args,
            result: Ok(success_output()),
        }]);
        let options = InstallerConfig {
            name: "conan".to_owned(),
            config: BTreeMap::from([("shared".to_owned(), "True".to_owned())]),
        };
        let installer = ConanInstaller::new(&executor, &options);

        let name = installer.install(&package(), &root).expect("install should succeed");
        assert_eq!(name, "libcjson");
    }

    #[test]
    fn install_failure_surfaces_conan_output() {
        let dir = TempDir::new().expect("temp dir");
        let root = utf8(&dir);
        let executor = StubExecutor::new(vec![ExpectedCall {
            program: "conan",
            args: conan_args(&root),
            result: Ok(failure_output("ERROR: Package 'cjson/1.7.18' not resolved")),
        }]);
        let options = InstallerConfig::default();
        let installer = ConanInstaller::new(&executor, &options);

        let err = installer.install(&package(), &root).expect_err("install should fail");
        assert!(err.to_string().contains("not resolved"));
    }

    #[test]
    fn install_without_pc_file_fails() {
        let dir = TempDir::new().expect("temp dir");
        let root = utf8(&dir);
        let executor = StubExecutor::new(vec![ExpectedCall {
            program: "conan",
            args: conan_args(&root),
            result: Ok(success_output()),
        }]);
        let options = InstallerConfig::default();
        let installer = ConanInstaller::new(&executor, &options);

        let err = installer.install(&package(), &root).expect_err("install should fail");
        assert!(err.to_string().contains("no .pc file"));
    }

    #[test]
    fn profile_detection_ignores_failure() {
        let executor = StubExecutor::new(vec![ExpectedCall {
            program: "conan",
            args: vec!["profile".to_owned(), "detect".to_owned()],
            result: Ok(failure_output("ERROR: Profile already exists")),
        }]);
        detect_conan_profile(&executor);
        executor.assert_finished();
    }

    #[test]
    fn unknown_installer_is_rejected() {
        let executor = StubExecutor::new(Vec::new());
        let options = InstallerConfig {
            name: "vcpkg".to_owned(),
            config: BTreeMap::new(),
        };
        let result = installer_for(&options, &executor);
        assert!(matches!(
            result,
            Err(WorkflowError::UnsupportedInstaller { name }) if name == "vcpkg"
        ));
    }

    #[test]
    fn copies_only_pc_files() {
        let from = TempDir::new().expect("temp dir");
        let to = TempDir::new().expect("temp dir");
        let (from_path, to_path) = (utf8(&from), utf8(&to));
        fs::write(from_path.join("cjson.pc"), "Name: cjson").expect("write pc");
        fs::write(from_path.join("conanbuild.sh"), "#!/bin/sh").expect("write script");

        let copied = copy_pkg_config_files(&from_path, &to_path).expect("copy should succeed");
        assert_eq!(copied, 1);
        assert!(to_path.join("cjson.pc").is_file());
        assert!(!to_path.join("conanbuild.sh").exists());
    }
}
