//! Reflow command: fix or check over-long lines in Markdown files.
//!
//! Files come from `--glob` or from the positional arguments. Paths that
//! do not exist, are not regular files, or match a configured `exclude`
//! pattern are skipped. A file that fails to read or write is reported
//! and the run continues with the next one.

use anyhow::{Context, bail};
use camino::{Utf8Path, Utf8PathBuf};
use clap::Args;
use globset::{Glob, GlobSet, GlobSetBuilder};
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use addon_maint_core::config::Config;
use addon_maint_core::reflow::{self, LongLine, ReflowMode, ReflowSettings};

use super::read_input_file;

/// Arguments for the `reflow` subcommand.
#[derive(Args, Debug)]
pub struct ReflowArgs {
    /// Markdown files to process.
    pub files: Vec<Utf8PathBuf>,

    /// Glob pattern for files (e.g. "**/*.md"); takes precedence over FILES.
    #[arg(long, value_name = "PATTERN")]
    pub glob: Option<String>,

    /// Maximum line length (default: 120, or `max_line_length` from config).
    #[arg(long, value_name = "N")]
    pub max_length: Option<usize>,

    /// Only check, don't modify files.
    #[arg(long)]
    pub check: bool,
}

/// Result for one processed file.
#[derive(Debug, Serialize)]
pub struct FileResult {
    /// Path as given or discovered.
    pub path: Utf8PathBuf,
    /// Over-length lines found before any rewrite.
    pub long_lines: Vec<LongLine>,
    /// Whether the file was rewritten.
    pub fixed: bool,
    /// Read or write failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    fn failed(path: &Utf8Path, error: &anyhow::Error) -> Self {
        Self {
            path: path.to_path_buf(),
            long_lines: Vec::new(),
            fixed: false,
            error: Some(format!("{error:#}")),
        }
    }
}

/// Totals for a reflow run, printed with `--json`.
#[derive(Debug, Serialize)]
pub struct ReflowSummary {
    /// Check or write.
    pub mode: ReflowMode,
    /// Limit applied.
    pub max_line_length: usize,
    /// Files that were read.
    pub files_processed: usize,
    /// Files with at least one over-length line.
    pub files_with_long_lines: usize,
    /// Files rewritten.
    pub files_fixed: usize,
    /// Files that could not be processed.
    pub errors: usize,
    /// Per-file details.
    pub files: Vec<FileResult>,
}

impl ReflowSummary {
    fn new(settings: &ReflowSettings) -> Self {
        Self {
            mode: settings.mode,
            max_line_length: settings.max_line_length,
            files_processed: 0,
            files_with_long_lines: 0,
            files_fixed: 0,
            errors: 0,
            files: Vec::new(),
        }
    }

    fn record(&mut self, result: FileResult) {
        if result.error.is_some() {
            self.errors += 1;
        } else {
            self.files_processed += 1;
        }
        if !result.long_lines.is_empty() {
            self.files_with_long_lines += 1;
        }
        if result.fixed {
            self.files_fixed += 1;
        }
        self.files.push(result);
    }
}

/// Reflow (or check) the selected Markdown files.
#[instrument(name = "cmd_reflow", skip_all, fields(check = args.check))]
pub fn cmd_reflow(
    args: ReflowArgs,
    global_json: bool,
    config: &Config,
    max_input_bytes: Option<usize>,
) -> anyhow::Result<()> {
    debug!(files = args.files.len(), glob = ?args.glob, max_length = ?args.max_length, "executing reflow command");

    let max_line_length = args.max_length.unwrap_or_else(|| config.max_line_length());
    if max_line_length == 0 {
        bail!("maximum line length must be a positive integer");
    }
    let settings = ReflowSettings {
        max_line_length,
        mode: if args.check {
            ReflowMode::Check
        } else {
            ReflowMode::Write
        },
    };

    let candidates = collect_files(&args)?;
    let exclude = exclude_set(config.exclude.as_deref())?;
    let cwd = current_dir();
    let mut summary = ReflowSummary::new(&settings);

    for path in candidates {
        if !path.is_file() {
            debug!(%path, "skipping missing or non-regular file");
            continue;
        }
        if is_excluded(&exclude, &path, cwd.as_deref()) {
            debug!(%path, "skipping excluded file");
            continue;
        }

        let result = process_file(&path, &settings, max_input_bytes);
        if !global_json {
            print_file_result(&result, &settings);
        }
        summary.record(result);
    }

    if global_json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    if summary.errors > 0 {
        bail!("failed to process {} files", summary.errors);
    }

    match settings.mode {
        ReflowMode::Check if summary.files_with_long_lines > 0 => {
            bail!(
                "found {} files with long lines (max: {})",
                summary.files_with_long_lines,
                settings.max_line_length
            );
        }
        ReflowMode::Check => {
            if !global_json {
                println!(
                    "{} no lines over {} characters in {} files",
                    "PASS:".green(),
                    settings.max_line_length,
                    summary.files_processed
                );
            }
        }
        ReflowMode::Write => {
            if !global_json {
                println!(
                    "\nProcessed {} files, fixed {} files.",
                    summary.files_processed, summary.files_fixed
                );
            }
        }
    }

    Ok(())
}

/// Resolve the files to process from `--glob` or the positional arguments.
fn collect_files(args: &ReflowArgs) -> anyhow::Result<Vec<Utf8PathBuf>> {
    if let Some(ref pattern) = args.glob {
        let entries =
            glob::glob(pattern).with_context(|| format!("invalid glob pattern: {pattern}"))?;
        let mut files = Vec::new();
        for entry in entries {
            match entry {
                Ok(path) => match Utf8PathBuf::from_path_buf(path) {
                    Ok(path) => files.push(path),
                    Err(path) => warn!(path = %path.display(), "skipping non-UTF-8 path"),
                },
                Err(e) => warn!(error = %e, "skipping unreadable glob entry"),
            }
        }
        debug!(%pattern, matched = files.len(), "glob expanded");
        Ok(files)
    } else if !args.files.is_empty() {
        Ok(args.files.clone())
    } else {
        bail!("No files specified. Use --glob or provide file names.");
    }
}

/// Compile the configured exclude patterns.
///
/// Invalid patterns are skipped with a warning.
fn exclude_set(patterns: Option<&[String]>) -> anyhow::Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns.unwrap_or_default() {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => warn!(%pattern, error = %e, "skipping invalid exclude pattern"),
        }
    }
    builder.build().context("failed to compile exclude patterns")
}

/// Match `path` against the exclude set.
///
/// Patterns are anchored at the working directory: absolute paths below
/// `cwd` are made relative first, and a leading `./` is ignored. Use
/// `**/NAME` to exclude a file name at any depth.
fn is_excluded(exclude: &GlobSet, path: &Utf8Path, cwd: Option<&Utf8Path>) -> bool {
    let relative = cwd
        .and_then(|cwd| path.strip_prefix(cwd).ok())
        .unwrap_or(path);
    let relative = relative.strip_prefix(".").unwrap_or(relative);
    exclude.is_match(relative.as_std_path())
}

fn current_dir() -> Option<Utf8PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    Utf8PathBuf::from_path_buf(cwd).ok()
}

fn process_file(
    path: &Utf8Path,
    settings: &ReflowSettings,
    max_input_bytes: Option<usize>,
) -> FileResult {
    let content = match read_input_file(path, max_input_bytes) {
        Ok(content) => content,
        Err(e) => {
            warn!(%path, error = %e, "failed to read file");
            return FileResult::failed(path, &e);
        }
    };

    let report = reflow::reflow_document(&content, settings);

    let mut fixed = false;
    if let Some(ref reflowed) = report.reflowed {
        if let Err(e) = std::fs::write(path.as_std_path(), reflowed)
            .with_context(|| format!("failed to write {path}"))
        {
            warn!(%path, error = %e, "failed to write file");
            return FileResult::failed(path, &e);
        }
        fixed = true;
        debug!(%path, "file rewritten");
    }

    FileResult {
        path: path.to_path_buf(),
        long_lines: report.long_lines,
        fixed,
        error: None,
    }
}

fn print_file_result(result: &FileResult, settings: &ReflowSettings) {
    if let Some(ref error) = result.error {
        eprintln!("{} {}: {}", "ERROR:".red(), result.path, error);
        return;
    }
    if result.long_lines.is_empty() {
        return;
    }

    println!("Found long lines in: {}", result.path.bold());
    if result.fixed {
        println!("  {} {}", "FIXED:".green(), result.path);
    } else {
        for line in &result.long_lines {
            println!(
                "  Line {}: {} chars (max: {})",
                line.line_number,
                line.length.yellow(),
                settings.max_line_length
            );
        }
    }
}
