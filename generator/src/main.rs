//! llpkg generator CLI entrypoint.
//!
//! `generate` regenerates llpkg packages in place with llcppg; `verify`
//! regenerates them into scratch directories and reports every difference
//! from the submitted trees.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use llpkg_generator::cli::{Cli, Command};
use llpkg_generator::error::WorkflowError;
use llpkg_generator::exec::SystemCommandExecutor;
use llpkg_generator::output::{exit_code_for_run_result, summary_message, write_stderr_line};
use llpkg_generator::upstream::detect_conan_profile;
use llpkg_generator::workflow::Workflow;

fn main() {
    let cli = Cli::parse();
    let mut stderr = std::io::stderr();
    if let Err(err) = llpkg_generator::logging::init(cli.verbosity, cli.quiet) {
        write_stderr_line(&mut stderr, format!("failed to initialise logging: {err}"));
    }
    let run_result = run(&cli);
    let exit_code = exit_code_for_run_result(run_result, &mut stderr);
    if exit_code != 0 {
        std::process::exit(exit_code);
    }
}

fn run(cli: &Cli) -> Result<(), WorkflowError> {
    let settings = cli.settings();
    let executor = SystemCommandExecutor;
    let workflow = Workflow::new(&settings, &executor);
    let dirs = package_dirs(cli.command.dirs())?;

    detect_conan_profile(&executor);

    for dir in &dirs {
        match &cli.command {
            Command::Generate(_) => workflow.generate_dir(dir)?,
            Command::Verify(_) => workflow.verify_dir(dir)?,
        }
    }

    let action = match &cli.command {
        Command::Generate(_) => "generated",
        Command::Verify(_) => "verified",
    };
    log::info!("{}", summary_message(action, dirs.len()));
    Ok(())
}

/// Resolve the requested directories, or the current directory when none
/// was given.
///
/// A requested directory that cannot be made absolute is skipped with a
/// warning.
fn package_dirs(requested: &[Utf8PathBuf]) -> Result<Vec<Utf8PathBuf>, WorkflowError> {
    if requested.is_empty() {
        let cwd = std::env::current_dir()?;
        let cwd = Utf8PathBuf::try_from(cwd).map_err(|e| WorkflowError::Io(e.into_io_error()))?;
        return Ok(vec![cwd]);
    }
    Ok(requested
        .iter()
        .map(Utf8PathBuf::as_path)
        .filter_map(resolve_dir)
        .collect())
}

fn resolve_dir(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let absolute = match std::path::absolute(dir) {
        Ok(path) => path,
        Err(err) => {
            log::warn!("skipping {dir:?}: cannot resolve an absolute path: {err}");
            return None;
        }
    };
    match Utf8PathBuf::try_from(absolute) {
        Ok(path) => Some(path),
        Err(err) => {
            log::warn!("skipping {dir:?}: {err}");
            None
        }
    }
}
