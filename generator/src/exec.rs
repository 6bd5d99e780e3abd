//! Capability interface for running external programs.
//!
//! llcppg, llcppcfg, conan, and the diff tool are all driven through
//! [`CommandExecutor`], which receives a fully described [`Invocation`]. The
//! environment of an invocation is an additive overlay applied to that child
//! process only; the current process environment is never modified.

use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::io;
use std::process::{Command, Output};

/// A single external program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    current_dir: Option<Utf8PathBuf>,
    env: Vec<(String, String)>,
}

impl Invocation {
    /// Describe an invocation of `program` with no arguments.
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            env: Vec::new(),
        }
    }

    /// Append a single argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Append several arguments.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Run the program with `dir` as its working directory.
    #[must_use]
    pub fn current_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Add or replace an environment variable for this invocation only.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let key = key.into();
        let value = value.into();
        match self.env.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value,
            None => self.env.push((key, value)),
        }
        self
    }

    /// Program name or path.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments in order.
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    /// Working directory, when one was set.
    #[must_use]
    pub fn working_dir(&self) -> Option<&Utf8Path> {
        self.current_dir.as_deref()
    }

    /// Environment overlay entries in insertion order.
    #[must_use]
    pub fn env_overlay(&self) -> &[(String, String)] {
        &self.env
    }

    /// Look up a value in the environment overlay.
    #[must_use]
    pub fn env_value(&self, key: &str) -> Option<&str> {
        self.env
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value.as_str())
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Abstraction for running external commands.
#[cfg_attr(test, mockall::automock)]
pub trait CommandExecutor {
    /// Runs the invocation to completion and returns the captured output.
    ///
    /// A non-zero exit status is reported through [`Output::status`], not as
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns any I/O errors encountered while spawning or running the command.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use llpkg_generator::exec::{CommandExecutor, Invocation, SystemCommandExecutor};
    ///
    /// let executor = SystemCommandExecutor;
    /// let output = executor.run(&Invocation::new("llcppg").arg("-h"))?;
    /// println!("{}", output.status);
    /// # Ok::<(), std::io::Error>(())
    /// ```
    fn run(&self, invocation: &Invocation) -> io::Result<Output>;
}

/// Executes commands on the host system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandExecutor;

impl CommandExecutor for SystemCommandExecutor {
    fn run(&self, invocation: &Invocation) -> io::Result<Output> {
        let mut cmd = Command::new(invocation.program());
        cmd.args(invocation.arguments());
        cmd.envs(invocation.env_overlay().iter().map(|(k, v)| (k, v)));
        if let Some(dir) = invocation.working_dir() {
            cmd.current_dir(dir);
        }
        log::debug!(
            "running `{invocation}` in {}",
            invocation.working_dir().map_or(".", Utf8Path::as_str)
        );
        cmd.output()
    }
}

/// Render captured stdout followed by stderr as text.
#[must_use]
pub fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}

/// Return trimmed stderr, or a placeholder when the program wrote nothing.
#[must_use]
pub fn stderr_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let trimmed = stderr.trim();
    if trimmed.is_empty() {
        "unknown error".to_owned()
    } else {
        trimmed.to_owned()
    }
}
