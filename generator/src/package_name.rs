//! Semantic wrapper for llpkg package names.
//!
//! This module provides the [`PackageName`] newtype used to name the directory
//! llcppg generates and to derive the Go module path of the package.

use camino::{Utf8Component, Utf8Path};
use serde::Deserialize;
use std::fmt;
use thiserror::Error;

/// A string that cannot name a package directory.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid package name {name:?}: {reason}")]
pub struct InvalidPackageName {
    name: String,
    reason: &'static str,
}

/// A semantic package name, for example `cjson`.
///
/// The name doubles as the directory llcppg writes its output to and as the
/// final segment of the package's module path, so it is always a single
/// normal path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct PackageName(String);

impl PackageName {
    /// Get the package name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Return the module path of this package under `module_root`.
    ///
    /// ```
    /// use llpkg_generator::package_name::PackageName;
    ///
    /// let name = PackageName::try_from("cjson")?;
    /// assert_eq!(
    ///     name.module_path("github.com/luoliwoshang/goplus-llpkg"),
    ///     "github.com/luoliwoshang/goplus-llpkg/cjson"
    /// );
    /// # Ok::<(), llpkg_generator::package_name::InvalidPackageName>(())
    /// ```
    #[must_use]
    pub fn module_path(&self, module_root: &str) -> String {
        format!("{}/{}", module_root.trim_end_matches('/'), self.0)
    }
}

fn validate(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("package name must not be empty");
    }
    if name.contains(['/', '\\']) {
        return Err("package name must not contain path separators");
    }
    if name == "." || name == ".." {
        return Err("package name must not be a relative directory");
    }
    if name.contains('\0') {
        return Err("package name must not contain NUL");
    }
    match Utf8Path::new(name).components().collect::<Vec<_>>().as_slice() {
        [Utf8Component::Normal(component)] if *component == name => Ok(()),
        _ => Err("package name must be a single directory name"),
    }
}

impl TryFrom<String> for PackageName {
    type Error = InvalidPackageName;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        match validate(&name) {
            Ok(()) => Ok(Self(name)),
            Err(reason) => Err(InvalidPackageName { name, reason }),
        }
    }
}

impl TryFrom<&str> for PackageName {
    type Error = InvalidPackageName;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        Self::try_from(name.to_owned())
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
