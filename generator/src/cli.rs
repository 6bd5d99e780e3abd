//! CLI argument definitions for the llpkg generator.
//!
//! Kept apart from the entrypoint so the binary only orchestrates.

use crate::config::GeneratorSettings;
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Generate and verify llpkg packages with llcppg.
#[derive(Parser, Debug)]
#[command(name = "llpkg-generator")]
#[command(version, about)]
#[command(after_help = concat!(
    "EXAMPLES:\n",
    "  Regenerate the package in the current directory:\n",
    "    $ llpkg-generator generate\n\n",
    "  Check that submitted packages match a fresh generation:\n",
    "    $ llpkg-generator verify cjson zlib\n",
))]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// Increase log verbosity (repeatable: -v, -vv).
    #[arg(
        short,
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        conflicts_with = "quiet"
    )]
    pub verbosity: u8,

    /// Only report errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Go version exported through `GOTOOLCHAIN`.
    #[arg(long, value_name = "VERSION", global = true)]
    pub go_version: Option<String>,

    /// Module root the package path is derived from.
    #[arg(long, value_name = "MODULE", global = true)]
    pub module_root: Option<String>,

    /// llcppg executable to run.
    #[arg(long, value_name = "PROGRAM", global = true)]
    pub llcppg: Option<String>,
}

/// Available subcommands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Install the upstream library and regenerate the package in place.
    Generate(PackageDirs),

    /// Regenerate into a scratch directory and compare with the submission.
    Verify(PackageDirs),
}

/// Package directories to process.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageDirs {
    /// Directories holding `llpkg.cfg` [default: current directory].
    #[arg(value_name = "DIR")]
    pub dirs: Vec<Utf8PathBuf>,
}

impl Command {
    /// Return the requested directories.
    #[must_use]
    pub fn dirs(&self) -> &[Utf8PathBuf] {
        match self {
            Self::Generate(args) | Self::Verify(args) => &args.dirs,
        }
    }
}

impl Cli {
    /// Build generator settings from the defaults and any overrides.
    ///
    /// # Examples
    ///
    /// ```
    /// use clap::Parser;
    /// use llpkg_generator::cli::Cli;
    ///
    /// let cli = Cli::parse_from(["llpkg-generator", "generate", "--go-version", "1.21.0"]);
    /// assert_eq!(cli.settings().go_version, "1.21.0");
    /// assert_eq!(cli.settings().llcppg_program, "llcppg");
    /// ```
    #[must_use]
    pub fn settings(&self) -> GeneratorSettings {
        let mut settings = GeneratorSettings::default();
        if let Some(version) = &self.go_version {
            settings.go_version.clone_from(version);
        }
        if let Some(root) = &self.module_root {
            settings.module_root.clone_from(root);
        }
        if let Some(program) = &self.llcppg {
            settings.llcppg_program.clone_from(program);
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn generate_defaults_to_no_directories() {
        let cli = Cli::try_parse_from(["llpkg-generator", "generate"]).expect("valid arguments");
        assert_eq!(cli.command, Command::Generate(PackageDirs::default()));
        assert_eq!(cli.settings(), GeneratorSettings::default());
    }

    #[test]
    fn verify_accepts_many_directories() {
        let cli = Cli::try_parse_from(["llpkg-generator", "verify", "cjson", "zlib"])
            .expect("valid arguments");
        assert_eq!(
            cli.command.dirs(),
            &[Utf8PathBuf::from("cjson"), Utf8PathBuf::from("zlib")]
        );
    }

    #[rstest]
    #[case::none(&["llpkg-generator", "verify"], 0)]
    #[case::one(&["llpkg-generator", "-v", "verify"], 1)]
    #[case::after_subcommand(&["llpkg-generator", "verify", "-vv"], 2)]
    fn counts_verbosity(#[case] args: &[&str], #[case] expected: u8) {
        let cli = Cli::try_parse_from(args).expect("valid arguments");
        assert_eq!(cli.verbosity, expected);
    }

    #[test]
    fn quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["llpkg-generator", "-q", "-v", "generate"]).is_err());
    }

    #[test]
    fn overrides_apply_to_settings() {
        let cli = Cli::try_parse_from([
            "llpkg-generator",
            "generate",
            "--module-root",
            "example.com/pkgs",
            "--llcppg",
            "/opt/llcppg",
        ])
        .expect("valid arguments");
        let settings = cli.settings();
        assert_eq!(settings.module_root, "example.com/pkgs");
        assert_eq!(settings.llcppg_program, "/opt/llcppg");
        assert_eq!(settings.go_version, GeneratorSettings::default().go_version);
    }
}
