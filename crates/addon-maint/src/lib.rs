//! Library interface for the `addon-maint` CLI.
//!
//! This crate exposes the CLI's argument parser and command structure as a library,
//! primarily for documentation generation and testing. The actual entry point is
//! in `main.rs`.
//!
//! # Structure
//!
//! - [`Cli`] - The root argument parser (clap derive)
//! - [`Commands`] - Available subcommands
//! - [`commands`] - Command implementations

pub mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;

/// Color output preference.
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum ColorChoice {
    /// Detect terminal capabilities automatically.
    #[default]
    Auto,
    /// Always emit colors.
    Always,
    /// Never emit colors.
    Never,
}

impl ColorChoice {
    /// Configure global color output based on this choice.
    ///
    /// Call this once at startup to set the color mode.
    pub fn apply(self) {
        match self {
            Self::Auto => {} // owo-colors auto-detects by default
            Self::Always => owo_colors::set_override(true),
            Self::Never => owo_colors::set_override(false),
        }
    }
}

const ENV_HELP: &str = "\
ENVIRONMENT VARIABLES:
    RUST_LOG                     Log filter (e.g., debug, addon_maint=trace)
    ADDON_MAINT_LOG_PATH         Explicit log file path
    ADDON_MAINT_LOG_DIR          Log directory
    ADDON_MAINT_MAX_LINE_LENGTH  Default maximum line length for reflow
    ADDON_MAINT_RELEASE__OWNER   Owner of the add-on release repositories
";

/// Command-line interface definition for addon-maint.
#[derive(Parser)]
#[command(name = "addon-maint")]
#[command(about = "Markdown reflow and release version tooling for add-on repositories", long_about = None)]
#[command(version, arg_required_else_help = true)]
#[command(after_long_help = ENV_HELP)]
pub struct Cli {
    /// The subcommand to execute.
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Print only the version number (for scripting)
    #[arg(long)]
    pub version_only: bool,

    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Run as if started in DIR
    #[arg(short = 'C', long, global = true)]
    pub chdir: Option<PathBuf>,

    /// Only print errors (suppresses warnings/info)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// More detail (repeatable; e.g. -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Colorize output
    #[arg(long, global = true, value_enum, default_value_t)]
    pub color: ColorChoice,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available subcommands for the CLI.
#[derive(Subcommand)]
pub enum Commands {
    /// Fix (or check) over-long lines in Markdown files
    Reflow(commands::reflow::ReflowArgs),

    /// Update an add-on's version across config.yaml, build.yaml and README.md
    Bump(commands::bump::BumpArgs),

    /// Show package information
    Info(commands::info::InfoArgs),
}

/// Returns the clap command for documentation generation
pub fn command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        command().debug_assert();
    }

    #[test]
    fn parses_reflow_with_options() {
        let cli = Cli::try_parse_from([
            "addon-maint",
            "reflow",
            "--check",
            "--max-length",
            "80",
            "README.md",
            "docs/guide.md",
        ])
        .unwrap();
        let Some(Commands::Reflow(args)) = cli.command else {
            panic!("expected reflow command");
        };
        assert!(args.check);
        assert_eq!(args.max_length, Some(80));
        assert_eq!(args.files.len(), 2);
    }

    #[test]
    fn parses_bump_with_flags() {
        let cli = Cli::try_parse_from([
            "addon-maint",
            "bump",
            "fritz-callmonitor2mqtt",
            "1.7.2",
            "--dry-run",
            "--check-release",
        ])
        .unwrap();
        let Some(Commands::Bump(args)) = cli.command else {
            panic!("expected bump command");
        };
        assert_eq!(args.addon, "fritz-callmonitor2mqtt");
        assert_eq!(args.version, "1.7.2");
        assert!(args.dry_run);
        assert!(args.check_release);
        assert!(!args.yes);
    }
}
