//! Stderr reporting helpers for the CLI.

use std::fmt::Display;
use std::io::Write;

/// Write one line to `stderr`, ignoring write failures.
pub fn write_stderr_line(stderr: &mut dyn Write, message: impl Display) {
    if writeln!(stderr, "{message}").is_err() {
        // Best-effort logging; ignore write failures.
    }
}

/// Map a run result to a process exit code, printing any error.
pub fn exit_code_for_run_result<E: Display>(result: Result<(), E>, stderr: &mut dyn Write) -> i32 {
    match result {
        Ok(()) => 0,
        Err(err) => {
            write_stderr_line(stderr, err);
            1
        }
    }
}

/// Summarise a run over several package directories.
///
/// ```
/// use llpkg_generator::output::summary_message;
///
/// assert_eq!(summary_message("verified", 1), "verified 1 package");
/// assert_eq!(summary_message("generated", 3), "generated 3 packages");
/// ```
#[must_use]
pub fn summary_message(action: &str, count: usize) -> String {
    let plural = if count == 1 { "package" } else { "packages" };
    format!("{action} {count} {plural}")
}
