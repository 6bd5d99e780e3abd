//! Line diffs for mismatched files.
//!
//! Diff text is diagnostic only. The external tool is preferred so reviewers
//! see familiar output; when it cannot run or prints nothing, an in-process
//! unified diff is produced instead.

use crate::exec::{CommandExecutor, Invocation, combined_output};
use camino::Utf8Path;
use similar::TextDiff;
use std::fs;

/// Program used for external diffs unless overridden.
pub const DEFAULT_DIFF_PROGRAM: &str = "git";

/// Return a textual diff between the files at `old` and `new`.
///
/// Runs `<program> diff --no-index -- old new` and returns its combined
/// output whatever the exit status. Never fails.
pub fn diff_files(
    executor: &dyn CommandExecutor,
    program: &str,
    old: &Utf8Path,
    new: &Utf8Path,
) -> String {
    let invocation = Invocation::new(program).args([
        "diff",
        "--no-index",
        "--",
        old.as_str(),
        new.as_str(),
    ]);

    match executor.run(&invocation) {
        Ok(output) => {
            let text = combined_output(&output);
            if !text.trim().is_empty() {
                return text;
            }
            log::warn!("`{invocation}` produced no output; using built-in diff");
        }
        Err(err) => log::warn!("failed to run `{invocation}`: {err}; using built-in diff"),
    }

    unified_diff(old, new)
}

/// Produce a unified diff of two files without external tools.
///
/// Unreadable files are treated as empty.
#[must_use]
pub fn unified_diff(old: &Utf8Path, new: &Utf8Path) -> String {
    let old_text = read_lossy(old);
    let new_text = read_lossy(new);
    let diff = TextDiff::from_lines(&old_text, &new_text);
    let text = diff
        .unified_diff()
        .context_radius(3)
        .header(old.as_str(), new.as_str())
        .to_string();

    if text.is_empty() {
        // Only possible when the files differ in bytes the lossy decode hides.
        format!("--- {old}\n+++ {new}\nbinary content differs\n")
    } else {
        text
    }
}

fn read_lossy(path: &Utf8Path) -> String {
    fs::read(path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default()
}
