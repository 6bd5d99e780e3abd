//! Safe merging of a generated tree into a destination tree.
//!
//! llcppg writes its output into a package subdirectory. The merger copies
//! that output over the destination while guaranteeing that, unless
//! explicitly allowed, no file that already exists is touched.

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::fs;
use std::io;
use thiserror::Error;
use walkdir::WalkDir;

/// Whether existing destination files may be replaced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MergePolicy {
    /// Any existing destination file aborts the merge.
    #[default]
    RejectOverwrite,
    /// Existing destination files are replaced.
    AllowOverwrite,
}

/// A merge would have replaced files that already exist in the destination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("refusing to overwrite existing files: {}", CollisionList(.paths))]
pub struct CollisionError {
    paths: Vec<Utf8PathBuf>,
}

impl CollisionError {
    /// Destination paths that already existed, in walk order.
    #[must_use]
    pub fn paths(&self) -> &[Utf8PathBuf] {
        &self.paths
    }
}

struct CollisionList<'a>(&'a [Utf8PathBuf]);

impl fmt::Display for CollisionList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, path) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{path}")?;
        }
        Ok(())
    }
}

/// Errors that can occur while merging trees.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The merge would overwrite existing content.
    #[error(transparent)]
    Collision(#[from] CollisionError),

    /// Reading the source or writing the destination failed.
    #[error("merge I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Counts of what a successful merge wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Number of files copied.
    pub files: usize,
    /// Number of directories created.
    pub directories: usize,
}

#[derive(Debug)]
enum Step {
    Directory(Utf8PathBuf),
    File { from: Utf8PathBuf, to: Utf8PathBuf },
}

/// Copy every entry below `source` into `dest`, preserving relative structure.
///
/// All collisions are detected before anything is written, so a rejected
/// merge leaves `dest` untouched. Directory creation is idempotent.
///
/// # Errors
///
/// Returns [`MergeError::Collision`] when `policy` is
/// [`MergePolicy::RejectOverwrite`] and any source file already exists in
/// `dest`, or when a source file would replace a destination directory.
/// Returns [`MergeError::Io`] if the source cannot be walked or a copy fails.
pub fn merge_tree(
    dest: &Utf8Path,
    source: &Utf8Path,
    policy: MergePolicy,
) -> Result<MergeSummary, MergeError> {
    let steps = plan(dest, source, policy)?;
    let mut summary = MergeSummary::default();

    for step in &steps {
        match step {
            Step::Directory(path) => {
                if !path.is_dir() {
                    fs::create_dir_all(path)?;
                    summary.directories += 1;
                }
            }
            Step::File { from, to } => {
                copy_file(from, to, policy)?;
                summary.files += 1;
            }
        }
    }

    Ok(summary)
}

fn plan(dest: &Utf8Path, source: &Utf8Path, policy: MergePolicy) -> Result<Vec<Step>, MergeError> {
    let mut steps = Vec::new();
    let mut collisions = Vec::new();

    for entry in WalkDir::new(source).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        let from = Utf8PathBuf::try_from(entry.path().to_path_buf())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        let relative = from
            .strip_prefix(source)
            .map_err(|e| io::Error::other(e.to_string()))?;
        let to = dest.join(relative);

        if entry.file_type().is_dir() {
            if to.exists() && !to.is_dir() {
                collisions.push(to);
            } else {
                steps.push(Step::Directory(to));
            }
            continue;
        }

        let occupied = to.symlink_metadata().is_ok();
        if occupied && (policy == MergePolicy::RejectOverwrite || to.is_dir()) {
            collisions.push(to);
        } else {
            steps.push(Step::File { from, to });
        }
    }

    if collisions.is_empty() {
        Ok(steps)
    } else {
        Err(CollisionError { paths: collisions }.into())
    }
}

fn copy_file(from: &Utf8Path, to: &Utf8Path, policy: MergePolicy) -> Result<(), MergeError> {
    if policy == MergePolicy::AllowOverwrite {
        fs::copy(from, to)?;
        return Ok(());
    }

    // Re-check at write time in case the destination appeared after planning.
    let mut target = match fs::OpenOptions::new().write(true).create_new(true).open(to) {
        Ok(file) => file,
        Err(err) if err.kind() == io::ErrorKind::AlreadyExists => {
            return Err(CollisionError {
                paths: vec![to.to_owned()],
            }
            .into());
        }
        Err(err) => return Err(err.into()),
    };
    let mut reader = fs::File::open(from)?;
    io::copy(&mut reader, &mut target)?;
    fs::set_permissions(to, fs::metadata(from)?.permissions())?;
    Ok(())
}
