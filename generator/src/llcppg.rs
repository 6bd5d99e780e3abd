//! llcppg-backed package generation and verification.
//!
//! [`LlcppgGenerator::generate`] stages the llcppg inputs into a target
//! directory, runs llcppg with a pinned Go toolchain, and merges the package
//! it produces into the target without overwriting anything.
//! [`LlcppgGenerator::check`] compares a generated tree with the submitted
//! one, and [`LlcppgGenerator::verify`] does both against a scratch copy.

use crate::config::{GeneratorSettings, LLCPPG_CONFIG_FILE, LLCPPG_PUB_FILE, SYMB_JSON_PATTERN};
use crate::context::{GenerationContext, SCRATCH_PREFIX, ScratchDir};
use crate::diff::diff_files;
use crate::error::{Failure, GeneratorError, Result};
use crate::exec::{CommandExecutor, Invocation, stderr_message};
use crate::hashing::{DirectoryHashes, HashPolicy, LlcppgHashPolicy, collect_hashes};
use crate::merge::{MergePolicy, merge_tree};
use crate::toolchain::ToolchainPin;
use crate::verification::{Mismatch, VerificationOutcome, Violations};
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};
use std::fs;
use std::process::Output;

/// Generates and verifies one llpkg package with llcppg.
pub struct LlcppgGenerator<'a> {
    context: &'a GenerationContext,
    settings: &'a GeneratorSettings,
    executor: &'a dyn CommandExecutor,
}

impl<'a> LlcppgGenerator<'a> {
    /// Create a generator for `context`.
    #[must_use]
    pub fn new(
        context: &'a GenerationContext,
        settings: &'a GeneratorSettings,
        executor: &'a dyn CommandExecutor,
    ) -> Self {
        Self {
            context,
            settings,
            executor,
        }
    }

    /// Module path passed to llcppg, for example
    /// `github.com/luoliwoshang/goplus-llpkg/cjson`.
    #[must_use]
    pub fn module_path(&self) -> String {
        self.context.package().module_path(&self.settings.module_root)
    }

    /// Generate the package into `to_dir`.
    ///
    /// The package subdirectory llcppg creates is merged into `to_dir` and
    /// then removed. Existing files in `to_dir` are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Generate`] when `llcppg.cfg` is missing or
    /// cannot be copied, llcppg cannot be started or exits
    /// unsuccessfully, or the merge would overwrite an existing file.
    /// Returns [`GeneratorError::Check`] when llcppg exits cleanly without
    /// producing the package directory.
    pub fn generate(&self, to_dir: &Utf8Path) -> Result<()> {
        let target = absolute(to_dir).map_err(GeneratorError::generate)?;
        self.copy_config_files_to(&target)
            .map_err(GeneratorError::generate)?;

        self.run_llcppg(&target)?;

        let generated = target.join(self.context.package().as_str());
        if !generated.is_dir() {
            return Err(GeneratorError::check(Failure::MissingOutput { path: generated }));
        }

        let summary = merge_tree(&target, &generated, MergePolicy::RejectOverwrite)
            .map_err(GeneratorError::generate)?;
        info!(
            "merged {} file(s) from {generated} into {target}",
            summary.files
        );

        if let Err(err) = fs::remove_dir_all(&generated) {
            warn!("failed to remove {generated}: {err}");
        }
        Ok(())
    }

    /// Compare the tree at `generated_dir` with the submitted source directory.
    ///
    /// Only hashable files take part. Submitted files absent from the
    /// generated tree are unexpected, generated files absent from the
    /// submission are missing, and files present in both with different
    /// content are mismatched and carry a line diff.
    ///
    /// # Errors
    ///
    /// Returns [`GeneratorError::Check`] if either tree cannot be hashed.
    pub fn check(&self, generated_dir: &Utf8Path) -> Result<VerificationOutcome> {
        let base = absolute(generated_dir).map_err(GeneratorError::check)?;
        let source = self.context.source_dir();

        let generated = hash_tree(&base)?;
        let submitted = hash_tree(source)?;

        let violations = self.compare(&generated, &submitted, &base);
        if violations.is_empty() {
            info!("{} matches generated output", self.context.package());
        } else {
            info!(
                "{} differs from generated output: {} violation(s)",
                self.context.package(),
                violations.len()
            );
        }
        Ok(violations.into_outcome())
    }

    /// Generate into a fresh scratch directory and check it.
    ///
    /// The scratch directory is removed before returning, whatever the result.
    ///
    /// # Errors
    ///
    /// Returns any error from [`Self::generate`] or [`Self::check`].
    pub fn verify(&self) -> Result<VerificationOutcome> {
        let scratch = ScratchDir::new(SCRATCH_PREFIX).map_err(GeneratorError::generate)?;
        self.generate(scratch.path())?;
        self.check(scratch.path())
    }

    fn compare(
        &self,
        generated: &DirectoryHashes,
        submitted: &DirectoryHashes,
        base: &Utf8Path,
    ) -> Violations {
        let policy = LlcppgHashPolicy;
        let source = self.context.source_dir();
        let mut violations = Violations::default();

        for (name, hash) in submitted {
            match generated.get(name) {
                None => {
                    if policy.is_hashable(Utf8Path::new(name)) {
                        violations.unexpected.push(name.clone());
                    }
                }
                Some(expected) if expected != hash => {
                    let diff = diff_files(
                        self.executor,
                        &self.settings.diff_program,
                        &source.join(name),
                        &base.join(name),
                    );
                    violations.mismatched.push(Mismatch {
                        path: name.clone(),
                        diff,
                    });
                }
                Some(_) => {}
            }
        }

        violations.missing = generated
            .paths()
            .filter(|name| !submitted.contains(name))
            .map(str::to_owned)
            .collect();

        violations
    }

    fn copy_config_files_to(&self, target: &Utf8Path) -> std::result::Result<(), Failure> {
        let source = self.context.source_dir();
        let config = source.join(LLCPPG_CONFIG_FILE);
        if !config.is_file() {
            return Err(Failure::MissingConfig { path: config });
        }
        if same_directory(source, target) {
            return Ok(());
        }

        fs::create_dir_all(target)?;
        copy_input(&config, &target.join(LLCPPG_CONFIG_FILE))?;

        let symb = find_symb_json(source);
        if let Some((symb, name)) = symb.as_ref().and_then(|p| Some((p, p.file_name()?))) {
            copy_optional_input(symb, &target.join(name));
        }

        let public = source.join(LLCPPG_PUB_FILE);
        if public.is_file() {
            copy_optional_input(&public, &target.join(LLCPPG_PUB_FILE));
        }

        Ok(())
    }

    fn run_llcppg(&self, target: &Utf8Path) -> Result<()> {
        let pin = ToolchainPin::new(
            self.settings.go_version.as_str(),
            self.context.pkg_config_dir(),
        );
        let invocation = pin.apply(
            Invocation::new(self.settings.llcppg_program.as_str())
                .args(["-mod".to_owned(), self.module_path()])
                .arg(LLCPPG_CONFIG_FILE)
                .current_dir(target),
        );

        info!("running `{invocation}` in {target}");
        let output = self.executor.run(&invocation).map_err(|source| {
            GeneratorError::generate(Failure::Spawn {
                program: invocation.program().to_owned(),
                source,
            })
        })?;
        forward_output(&output);

        // llcppg writes diagnostics to stderr on success; only the exit
        // status decides failure.
        if !output.status.success() {
            return Err(GeneratorError::generate(Failure::ExitStatus {
                program: invocation.program().to_owned(),
                status: output.status,
                stderr: stderr_message(&output),
            }));
        }
        Ok(())
    }
}

fn hash_tree(root: &Utf8Path) -> Result<DirectoryHashes> {
    collect_hashes(root, &LlcppgHashPolicy).map_err(|source| {
        GeneratorError::check(Failure::Hash {
            root: root.to_owned(),
            source,
        })
    })
}

fn copy_input(from: &Utf8Path, to: &Utf8Path) -> std::result::Result<(), Failure> {
    debug!("copying {from} to {to}");
    fs::copy(from, to).map(drop).map_err(|source| Failure::Copy {
        from: from.to_owned(),
        to: to.to_owned(),
        source,
    })
}

/// Copy an input llcppg can do without; failures are logged and skipped.
fn copy_optional_input(from: &Utf8Path, to: &Utf8Path) {
    debug!("copying {from} to {to}");
    if let Err(err) = fs::copy(from, to) {
        warn!("skipping {from}: failed to copy to {to}: {err}");
    }
}

/// Return the first `*.symb.json` file in `dir`, if any.
fn find_symb_json(dir: &Utf8Path) -> Option<Utf8PathBuf> {
    let pattern = format!("{}/{SYMB_JSON_PATTERN}", glob::Pattern::escape(dir.as_str()));
    glob::glob(&pattern)
        .ok()?
        .filter_map(std::result::Result::ok)
        .filter_map(|path| Utf8PathBuf::try_from(path).ok())
        .find(|path| path.is_file())
}

fn forward_output(output: &Output) {
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        debug!("llcppg: {line}");
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        debug!("llcppg: {line}");
    }
}

/// Resolve `path` against the current directory without touching the filesystem.
pub(crate) fn absolute(path: &Utf8Path) -> std::result::Result<Utf8PathBuf, Failure> {
    let resolved = std::path::absolute(path)?;
    Utf8PathBuf::try_from(resolved).map_err(|e| Failure::NonUtf8Path {
        path: e.into_path_buf().display().to_string(),
    })
}

fn same_directory(a: &Utf8Path, b: &Utf8Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize_utf8(), b.canonicalize_utf8()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
