//! End-to-end `generate` and `verify` runs for one package directory.
//!
//! A run reads `llpkg.cfg`, installs the upstream C library into a scratch
//! directory, and hands the resulting pkg-config files to llcppg through a
//! [`GenerationContext`].

use crate::config::{GeneratorSettings, LLCPPG_CONFIG_FILE, LlpkgConfig};
use crate::context::{GenerationContext, SCRATCH_PREFIX, ScratchDir};
use crate::error::{GeneratorError, WorkflowError};
use crate::exec::{CommandExecutor, Invocation, combined_output};
use crate::llcppg::{LlcppgGenerator, absolute};
use crate::toolchain::ToolchainPin;
use crate::upstream::{PackageInstaller, copy_pkg_config_files, installer_for};
use crate::verification::VerificationOutcome;
use camino::{Utf8Path, Utf8PathBuf};
use log::{debug, info, warn};

/// Drives generation and verification for package directories.
pub struct Workflow<'a> {
    settings: &'a GeneratorSettings,
    executor: &'a dyn CommandExecutor,
}

/// A package whose upstream library has been installed.
struct Prepared {
    dir: Utf8PathBuf,
    config: LlpkgConfig,
    scratch: ScratchDir,
    pc_name: String,
}

impl<'a> Workflow<'a> {
    /// Create a workflow running subprocesses through `executor`.
    #[must_use]
    pub fn new(settings: &'a GeneratorSettings, executor: &'a dyn CommandExecutor) -> Self {
        Self { settings, executor }
    }

    /// Regenerate the package in `dir` in place.
    ///
    /// Copies the installer's `.pc` files into `dir` and runs `llcppcfg`
    /// when `llcppg.cfg` is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if any step fails.
    pub fn generate_dir(&self, dir: &Utf8Path) -> Result<(), WorkflowError> {
        let prepared = self.prepare(dir)?;

        match copy_pkg_config_files(prepared.scratch.path(), &prepared.dir) {
            Ok(count) => debug!("copied {count} .pc file(s) into {}", prepared.dir),
            Err(err) => warn!("failed to copy .pc files into {}: {err}", prepared.dir),
        }
        if !prepared.dir.join(LLCPPG_CONFIG_FILE).exists() {
            self.run_llcppcfg(&prepared)?;
        }

        let dir = prepared.dir.clone();
        let context = prepared.into_context();
        LlcppgGenerator::new(&context, self.settings, self.executor).generate(&dir)?;
        Ok(())
    }

    /// Check that the submitted tree in `dir` matches a fresh generation.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Violations`] when the trees differ, or
    /// another error if preparation or generation fails.
    pub fn verify_dir(&self, dir: &Utf8Path) -> Result<(), WorkflowError> {
        let context = self.prepare(dir)?.into_context();
        let generator = LlcppgGenerator::new(&context, self.settings, self.executor);

        match generator.verify()? {
            VerificationOutcome::Equal => {
                info!("{} verified", context.package());
                Ok(())
            }
            VerificationOutcome::Violations(violations) => Err(WorkflowError::Violations {
                package: context.package().clone(),
                violations,
            }),
        }
    }

    fn prepare(&self, dir: &Utf8Path) -> Result<Prepared, WorkflowError> {
        let dir = absolute(dir).map_err(GeneratorError::generate)?;
        let config = LlpkgConfig::load(&dir)?;
        let upstream = &config.upstream;
        let installer = installer_for(&upstream.installer, self.executor)?;
        info!("Start to generate {}", upstream.package.name);

        let scratch = ScratchDir::new(SCRATCH_PREFIX).map_err(GeneratorError::generate)?;
        let pc_name = installer.install(&upstream.package, scratch.path())?;
        debug!("installed {} as pkg-config package {pc_name}", upstream.package.name);

        Ok(Prepared {
            dir,
            config,
            scratch,
            pc_name,
        })
    }

    fn run_llcppcfg(&self, prepared: &Prepared) -> Result<(), WorkflowError> {
        let pin = ToolchainPin::new(&self.settings.go_version, prepared.scratch.path());
        let invocation = pin.with_pkg_config(
            Invocation::new(&self.settings.llcppcfg_program)
                .arg(&prepared.pc_name)
                .current_dir(&prepared.dir),
        );
        info!("{LLCPPG_CONFIG_FILE} not found, running `{invocation}`");

        let output = self
            .executor
            .run(&invocation)
            .map_err(|e| WorkflowError::ConfigGeneration {
                message: e.to_string(),
            })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(WorkflowError::ConfigGeneration {
                message: combined_output(&output),
            })
        }
    }
}

impl Prepared {
    fn into_context(self) -> GenerationContext {
        let package = self.config.upstream.package.package_name();
        GenerationContext::new(self.dir, package, self.scratch)
    }
}
