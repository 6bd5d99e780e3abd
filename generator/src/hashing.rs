//! Content hashing for generated package trees.
//!
//! A [`HashPolicy`] decides which relative paths take part in verification.
//! [`collect_hashes`] walks a tree, applies the policy, and records a
//! [`ContentDigest`] for every eligible file.

use crate::digest::ContentDigest;
use camino::{Utf8Path, Utf8PathBuf};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fs;
use std::io::{self, Read};
use walkdir::WalkDir;

/// Marker contained in the name of every generated Go source file.
const GO_SOURCE_MARKER: &str = ".go";

/// Non-source artefacts whose content is part of the generation contract.
pub const HASHABLE_ARTEFACTS: &[&str] = &["llcppg.pub", "go.mod", "go.sum"];

/// Decides whether a relative path participates in verification.
///
/// Implementations must be pure: the answer may depend only on the path,
/// never on file content or external state.
pub trait HashPolicy {
    /// Return `true` when `relative` should be hashed and compared.
    fn is_hashable(&self, relative: &Utf8Path) -> bool;
}

impl<F> HashPolicy for F
where
    F: Fn(&Utf8Path) -> bool,
{
    fn is_hashable(&self, relative: &Utf8Path) -> bool {
        self(relative)
    }
}

/// Policy for llcppg output: Go sources plus the symbol manifest and module files.
///
/// ```
/// use camino::Utf8Path;
/// use llpkg_generator::hashing::{HashPolicy, LlcppgHashPolicy};
///
/// assert!(LlcppgHashPolicy.is_hashable(Utf8Path::new("cjson.go")));
/// assert!(LlcppgHashPolicy.is_hashable(Utf8Path::new("go.sum")));
/// assert!(!LlcppgHashPolicy.is_hashable(Utf8Path::new("libcjson.pc")));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LlcppgHashPolicy;

impl HashPolicy for LlcppgHashPolicy {
    fn is_hashable(&self, relative: &Utf8Path) -> bool {
        let Some(name) = relative.file_name() else {
            return false;
        };
        name.contains(GO_SOURCE_MARKER) || HASHABLE_ARTEFACTS.contains(&name)
    }
}

/// Content digests of the hashable files in a tree, keyed by relative path.
///
/// Keys always use forward slashes regardless of platform.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectoryHashes {
    entries: BTreeMap<String, ContentDigest>,
}

impl DirectoryHashes {
    /// Return the digest recorded for `relative`, if any.
    #[must_use]
    pub fn get(&self, relative: &str) -> Option<&ContentDigest> {
        self.entries.get(relative)
    }

    /// Return `true` when `relative` was recorded.
    #[must_use]
    pub fn contains(&self, relative: &str) -> bool {
        self.entries.contains_key(relative)
    }

    /// Iterate over `(relative path, digest)` pairs in path order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, ContentDigest> {
        self.entries.iter()
    }

    /// Iterate over the recorded relative paths in order.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Number of recorded files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no files were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a DirectoryHashes {
    type Item = (&'a String, &'a ContentDigest);
    type IntoIter = btree_map::Iter<'a, String, ContentDigest>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Compute the SHA-256 digest of a file.
///
/// Reads the file at `path` in chunks.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn hash_file(path: &Utf8Path) -> io::Result<ContentDigest> {
    let mut file = fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let bytes_read = file.read(&mut buffer)?;
        if bytes_read == 0 {
            break;
        }
        hasher.update(buffer.get(..bytes_read).unwrap_or_default());
    }
    Ok(ContentDigest::from_bytes(hasher.finalize().into()))
}

/// Walk `root` and hash every regular file accepted by `policy`.
///
/// Symbolic links are not followed. Any error while walking or reading aborts
/// the collection; partial results are never returned.
///
/// # Errors
///
/// Returns an error if `root` does not exist, cannot be read, or contains a
/// path that is not valid UTF-8.
pub fn collect_hashes(root: &Utf8Path, policy: &dyn HashPolicy) -> io::Result<DirectoryHashes> {
    let mut entries = BTreeMap::new();

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = Utf8Path::from_path(entry.path()).ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("path is not valid UTF-8: {}", entry.path().display()),
            )
        })?;
        let relative = relative_to(root, path)?;

        if !policy.is_hashable(&relative) {
            continue;
        }

        let digest = hash_file(path)?;
        entries.insert(normalise_key(&relative), digest);
    }

    Ok(DirectoryHashes { entries })
}

fn relative_to(root: &Utf8Path, path: &Utf8Path) -> io::Result<Utf8PathBuf> {
    path.strip_prefix(root).map(Utf8Path::to_path_buf).map_err(|_| {
        io::Error::other(format!("{path} is not inside {root}"))
    })
}

/// Join the components of `relative` with `/`.
pub(crate) fn normalise_key(relative: &Utf8Path) -> String {
    relative
        .components()
        .map(|component| component.as_str())
        .collect::<Vec<_>>()
        .join("/")
}
