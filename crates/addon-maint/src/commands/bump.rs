//! Bump command implementation

use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use dialoguer::Confirm;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use addon_maint_core::config::Config;
use addon_maint_core::release::{ReleaseChecker, ReleaseStatus};
use addon_maint_core::version::{self, BumpOutcome, BumpReport, FileOutcome, FileStatus};

/// Arguments for the `bump` subcommand.
#[derive(Args, Debug)]
pub struct BumpArgs {
    /// Add-on directory (e.g. fritz-callmonitor2mqtt).
    pub addon: Utf8PathBuf,

    /// New release version (X.Y.Z).
    pub version: String,

    /// Check that the release tag exists on GitHub before bumping.
    #[arg(long)]
    pub check_release: bool,

    /// Show what would change without writing files.
    #[arg(long)]
    pub dry_run: bool,

    /// Continue without asking when the release tag is not found.
    #[arg(short, long)]
    pub yes: bool,
}

/// Release check result as printed with `--json`.
#[derive(Debug, Serialize)]
struct ReleaseCheck {
    url: String,
    #[serde(flatten)]
    status: ReleaseStatus,
}

#[derive(Debug, Serialize)]
struct BumpOutput<'a> {
    #[serde(flatten)]
    report: &'a BumpReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    release: Option<ReleaseCheck>,
}

/// Bump the add-on version.
#[instrument(name = "cmd_bump", skip_all, fields(addon = %args.addon, version = %args.version))]
pub fn cmd_bump(args: BumpArgs, global_json: bool, config: &Config) -> anyhow::Result<()> {
    debug!(dry_run = args.dry_run, check_release = args.check_release, "executing bump command");

    version::validate_version(&args.version)?;
    version::ensure_addon_dir(&args.addon)?;

    let release = if args.check_release {
        Some(check_release(&args, global_json, config)?)
    } else {
        None
    };

    let report = version::bump_addon(&args.addon, &args.version, args.dry_run)?;

    if global_json {
        let output = BumpOutput {
            report: &report,
            release,
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_report(&report);
    }

    if !report.outcome.is_success() {
        bail!(
            "only {}/{} files were updated",
            report.updated,
            report.files.len()
        );
    }

    Ok(())
}

/// Name used for the add-on's repository: the directory's final component.
fn addon_name(addon: &Utf8Path) -> anyhow::Result<String> {
    let name = match addon.file_name() {
        Some(name) => name.to_string(),
        None => {
            let canonical = addon
                .canonicalize_utf8()
                .with_context(|| format!("failed to resolve {addon}"))?;
            canonical
                .file_name()
                .map(str::to_string)
                .with_context(|| format!("cannot derive add-on name from {addon}"))?
        }
    };
    Ok(name)
}

fn check_release(
    args: &BumpArgs,
    global_json: bool,
    config: &Config,
) -> anyhow::Result<ReleaseCheck> {
    let name = addon_name(&args.addon)?;
    let checker = ReleaseChecker::new(&config.release)?;
    let url = checker.url(&name, &args.version);

    if !global_json {
        println!("Checking release: {url}");
    }
    let status = checker.check(&name, &args.version);

    if !global_json {
        match &status {
            ReleaseStatus::Found => println!("  {} release v{} exists", "OK".green(), args.version),
            ReleaseStatus::NotFound { http_status } => println!(
                "  {} release v{} not found (HTTP {http_status})",
                "WARN".yellow(),
                args.version
            ),
            ReleaseStatus::Unreachable { reason } => {
                println!("  {} could not check release: {reason}", "WARN".yellow());
            }
        }
    }

    if !status.exists() && !args.dry_run && !args.yes {
        let proceed = Confirm::new()
            .with_prompt("Continue anyway?")
            .default(false)
            .interact()
            .context("failed to read confirmation (use --yes to skip the prompt)")?;
        if !proceed {
            bail!("Aborted");
        }
    }

    Ok(ReleaseCheck { url, status })
}

fn print_report(report: &BumpReport) {
    let verb = if report.dry_run {
        "Would update"
    } else {
        "Updated"
    };
    println!(
        "Bumping {} to {}{}",
        report.addon_dir.bold(),
        report.version.bold(),
        if report.dry_run { " (dry run)" } else { "" }
    );

    for file in &report.files {
        print_file(file, verb);
    }

    println!(
        "\n{verb} {}/{} files",
        report.updated,
        report.files.len()
    );

    match report.outcome {
        BumpOutcome::AllUpdated if !report.dry_run => {
            println!("\nNext steps:");
            println!("  git add {}", report.addon_dir);
            println!(
                "  git commit -m \"chore({}): bump version to {}\"",
                report.addon_dir.file_name().unwrap_or(report.addon_dir.as_str()),
                report.version
            );
        }
        BumpOutcome::NothingToUpdate => {
            println!("Nothing to update (already at target version?)");
        }
        _ => {}
    }
}

fn print_file(file: &FileOutcome, verb: &str) {
    match &file.status {
        FileStatus::Updated => println!("  {} {verb} {}", "OK".green(), file.file),
        FileStatus::AlreadyCurrent => {
            println!("  {} {} already at target version", "SKIP".dimmed(), file.file);
        }
        FileStatus::PatternNotFound => {
            println!("  {} {}: no version reference found", "WARN".yellow(), file.file);
        }
        FileStatus::Missing => println!("  {} {}: file not found", "WARN".yellow(), file.file),
        FileStatus::Failed { error } => {
            eprintln!("  {} {}: {error}", "FAIL".red(), file.file);
        }
    }
    if file.is_updated() {
        for change in &file.changes {
            println!("      {}: {} → {}", change.label, change.old, change.new.green());
        }
    }
}
