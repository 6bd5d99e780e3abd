//! Shared test utilities for the generator crate.

use crate::exec::{CommandExecutor, Invocation};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::process::{ExitStatus, Output};

/// Creates an `ExitStatus` from an exit code (Unix implementation).
#[cfg(unix)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;

    ExitStatus::from_raw(code << 8)
}

/// Creates an `ExitStatus` from an exit code (Windows implementation).
#[cfg(windows)]
#[must_use]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;

    ExitStatus::from_raw(code as u32)
}

/// Creates a successful command `Output` with empty stdout and stderr.
#[must_use]
pub fn success_output() -> Output {
    Output {
        status: exit_status(0),
        stdout: Vec::new(),
        stderr: Vec::new(),
    }
}

/// Creates a failed command `Output` with the given stderr message.
#[must_use]
pub fn failure_output(stderr: &str) -> Output {
    Output {
        status: exit_status(1),
        stdout: Vec::new(),
        stderr: stderr.as_bytes().to_vec(),
    }
}

/// Represents an expected command invocation for testing.
#[derive(Debug)]
pub struct ExpectedCall {
    /// The program to execute (e.g., "conan").
    pub program: &'static str,
    /// The arguments to pass to the program.
    pub args: Vec<String>,
    /// The result to return when this command is invoked.
    pub result: io::Result<Output>,
}

/// A stub implementation of `CommandExecutor` for testing.
///
/// Records expected command invocations and returns predefined results,
/// allowing tests to verify command execution without side effects.
#[derive(Debug, Default)]
pub struct StubExecutor {
    expected: RefCell<VecDeque<ExpectedCall>>,
    seen: RefCell<Vec<Invocation>>,
}

impl StubExecutor {
    /// Creates a new `StubExecutor` with the given expected calls.
    #[must_use]
    pub fn new(expected: Vec<ExpectedCall>) -> Self {
        Self {
            expected: RefCell::new(expected.into()),
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Returns every invocation received so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.seen.borrow().clone()
    }

    /// Asserts that all expected command invocations have been consumed.
    ///
    /// # Panics
    ///
    /// Panics if there are remaining expected calls that were not invoked.
    pub fn assert_finished(&self) {
        assert!(
            self.expected.borrow().is_empty(),
            "expected no further command invocations"
        );
    }
}

impl CommandExecutor for StubExecutor {
    fn run(&self, invocation: &Invocation) -> io::Result<Output> {
        self.seen.borrow_mut().push(invocation.clone());
        let mut expected = self.expected.borrow_mut();
        let Some(call) = expected.pop_front() else {
            panic!("unexpected command invocation: {invocation}");
        };

        assert_eq!(call.program, invocation.program());
        assert_eq!(call.args.as_slice(), invocation.arguments());

        call.result
    }
}

/// A `CommandExecutor` that delegates every invocation to a closure.
///
/// Useful for simulating programs that write files, such as llcppg creating
/// its package directory inside the working directory.
pub struct ScriptedExecutor<F>
where
    F: Fn(&Invocation) -> io::Result<Output>,
{
    script: F,
    seen: RefCell<Vec<Invocation>>,
}

impl<F> ScriptedExecutor<F>
where
    F: Fn(&Invocation) -> io::Result<Output>,
{
    /// Wrap `script` as an executor.
    pub fn new(script: F) -> Self {
        Self {
            script,
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Returns every invocation received so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<Invocation> {
        self.seen.borrow().clone()
    }
}

impl<F> CommandExecutor for ScriptedExecutor<F>
where
    F: Fn(&Invocation) -> io::Result<Output>,
{
    fn run(&self, invocation: &Invocation) -> io::Result<Output> {
        self.seen.borrow_mut().push(invocation.clone());
        (self.script)(invocation)
    }
}
