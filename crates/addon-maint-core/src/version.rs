//! Version bumping across the files of an add-on directory.
//!
//! An add-on directory carries its release version in three places:
//!
//! - `config.yaml`: `version: "X.Y.Z-N"` (the build suffix resets to `-0`)
//! - `build.yaml`: `VERSION: "X.Y.Z"`
//! - `README.md`: the shields.io release badge and the GitHub release link
//!
//! The `bump_*` functions are pure rewrites of file content. [`bump_addon`]
//! applies them to a directory and reports a [`FileStatus`] per file.

use camino::{Utf8Path, Utf8PathBuf};
use regex::{Captures, Regex};
use serde::Serialize;
use std::sync::LazyLock;

use crate::error::{BumpError, BumpResult};

/// Plain `X.Y.Z`.
static RELEASE_VERSION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+$").expect("valid regex"));

/// `version: "X.Y.Z-N"` in `config.yaml`.
static CONFIG_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^(\s*version:\s*["'])([0-9]+\.[0-9]+\.[0-9]+-[0-9]+)(["'].*?)$"#)
        .expect("valid regex")
});

/// `VERSION: "X.Y.Z"` in `build.yaml`.
static BUILD_VERSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^(\s*VERSION:\s*["'])([0-9]+\.[0-9]+\.[0-9]+)(["'].*?)$"#)
        .expect("valid regex")
});

/// `[release-shield]: https://img.shields.io/badge/version-vX.Y.Z-blue.svg`
static README_SHIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\[release-shield\]:\s*https://img\.shields\.io/badge/version-v)([0-9]+\.[0-9]+\.[0-9]+)(-blue\.svg)",
    )
    .expect("valid regex")
});

/// `[release]: https://github.com/<owner>/<repo>/tree/vX.Y.Z`
static README_RELEASE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(\[release\]:\s*https://github\.com/[^/\s]+/[^/\s]+/tree/v)([0-9]+\.[0-9]+\.[0-9]+)()",
    )
    .expect("valid regex")
});

/// One of the version-carrying files in an add-on directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddonFile {
    /// `config.yaml`
    Config,
    /// `build.yaml`
    Build,
    /// `README.md`
    Readme,
}

impl AddonFile {
    /// All files, in update order.
    pub const ALL: [Self; 3] = [Self::Config, Self::Build, Self::Readme];

    /// File name inside the add-on directory.
    pub const fn file_name(&self) -> &'static str {
        match self {
            Self::Config => "config.yaml",
            Self::Build => "build.yaml",
            Self::Readme => "README.md",
        }
    }

    /// Rewrite this file's content for `version`, or `None` if it carries no version.
    pub fn rewrite(&self, content: &str, version: &str) -> Option<Rewrite> {
        match self {
            Self::Config => bump_config_yaml(content, version),
            Self::Build => bump_build_yaml(content, version),
            Self::Readme => bump_readme(content, version),
        }
    }
}

impl std::fmt::Display for AddonFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.file_name())
    }
}

/// A single version value replaced in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionChange {
    /// What was changed (`version`, `VERSION`, `badge`, `release link`).
    pub label: &'static str,
    /// Value before the bump.
    pub old: String,
    /// Value after the bump.
    pub new: String,
}

/// Rewritten file content plus the values that were replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    /// New file content.
    pub content: String,
    /// Replaced values, in the order they were found.
    pub changes: Vec<VersionChange>,
}

/// Check that `version` is a plain `X.Y.Z` release version.
pub fn validate_version(version: &str) -> BumpResult<()> {
    if RELEASE_VERSION.is_match(version) {
        Ok(())
    } else {
        Err(BumpError::InvalidVersion(version.to_string()))
    }
}

/// Replace every match of `pattern` with `new` in its version group.
///
/// The old value is taken from the first match. Returns `None` when the
/// pattern does not occur.
fn substitute(
    pattern: &Regex,
    content: &str,
    new: &str,
    label: &'static str,
) -> Option<(String, VersionChange)> {
    let old = pattern.captures(content)?.get(2)?.as_str().to_string();
    let replaced = pattern
        .replace_all(content, |caps: &Captures<'_>| {
            format!("{}{new}{}", &caps[1], &caps[3])
        })
        .into_owned();
    Some((
        replaced,
        VersionChange {
            label,
            old,
            new: new.to_string(),
        },
    ))
}

/// Set `version: "X.Y.Z-0"` in `config.yaml` content.
pub fn bump_config_yaml(content: &str, version: &str) -> Option<Rewrite> {
    let full = format!("{version}-0");
    let (content, change) = substitute(&CONFIG_VERSION, content, &full, "version")?;
    Some(Rewrite {
        content,
        changes: vec![change],
    })
}

/// Set `VERSION: "X.Y.Z"` in `build.yaml` content.
pub fn bump_build_yaml(content: &str, version: &str) -> Option<Rewrite> {
    let (content, change) = substitute(&BUILD_VERSION, content, version, "VERSION")?;
    Some(Rewrite {
        content,
        changes: vec![change],
    })
}

/// Update the release badge and release link in `README.md` content.
///
/// Either reference may be missing; `None` only when neither is present.
pub fn bump_readme(content: &str, version: &str) -> Option<Rewrite> {
    let mut current = content.to_string();
    let mut changes = Vec::new();

    for (pattern, label) in [(&*README_SHIELD, "badge"), (&*README_RELEASE, "release link")] {
        if let Some((replaced, change)) = substitute(pattern, &current, version, label) {
            current = replaced;
            changes.push(change);
        }
    }

    (!changes.is_empty()).then_some(Rewrite {
        content: current,
        changes,
    })
}

/// What happened to one file during a bump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum FileStatus {
    /// Content changed (and was written, unless dry run).
    Updated,
    /// The version is already the target version.
    AlreadyCurrent,
    /// The file has no recognizable version reference.
    PatternNotFound,
    /// The file does not exist.
    Missing,
    /// Reading or writing the file failed.
    Failed {
        /// Error message.
        error: String,
    },
}

/// Result for one file of the add-on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileOutcome {
    /// Which file.
    pub file: AddonFile,
    /// Full path.
    pub path: Utf8PathBuf,
    /// What happened.
    #[serde(flatten)]
    pub status: FileStatus,
    /// Version values found (old and new).
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub changes: Vec<VersionChange>,
}

impl FileOutcome {
    fn new(file: AddonFile, path: Utf8PathBuf, status: FileStatus) -> Self {
        Self {
            file,
            path,
            status,
            changes: Vec::new(),
        }
    }

    /// Returns `true` if the file was (or would be) updated.
    pub fn is_updated(&self) -> bool {
        self.status == FileStatus::Updated
    }
}

/// Overall verdict of a bump across all files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BumpOutcome {
    /// Every file was updated.
    AllUpdated,
    /// No file needed an update.
    NothingToUpdate,
    /// Some files were updated, others were not.
    Partial,
}

impl BumpOutcome {
    /// Returns `true` unless the bump left the add-on half-updated.
    pub const fn is_success(&self) -> bool {
        !matches!(self, Self::Partial)
    }
}

/// Report for a whole add-on bump.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BumpReport {
    /// Add-on directory.
    pub addon_dir: Utf8PathBuf,
    /// Target release version.
    pub version: String,
    /// Whether files were left untouched.
    pub dry_run: bool,
    /// Per-file results, in update order.
    pub files: Vec<FileOutcome>,
    /// Number of updated files.
    pub updated: usize,
    /// Overall verdict.
    pub outcome: BumpOutcome,
}

/// Check that `addon_dir` exists and contains a `config.yaml`.
pub fn ensure_addon_dir(addon_dir: &Utf8Path) -> BumpResult<()> {
    if !addon_dir.is_dir() {
        return Err(BumpError::AddonNotFound(addon_dir.to_path_buf()));
    }
    if !addon_dir.join(AddonFile::Config.file_name()).is_file() {
        return Err(BumpError::NotAnAddon(addon_dir.to_path_buf()));
    }
    Ok(())
}

/// Bump every version reference in `addon_dir` to `version`.
///
/// Fails without touching anything if the version is malformed or the
/// directory is not an add-on. Per-file problems are reported in the
/// returned [`BumpReport`] instead.
#[tracing::instrument(skip(addon_dir), fields(addon_dir = %addon_dir))]
pub fn bump_addon(addon_dir: &Utf8Path, version: &str, dry_run: bool) -> BumpResult<BumpReport> {
    validate_version(version)?;
    ensure_addon_dir(addon_dir)?;

    let files: Vec<FileOutcome> = AddonFile::ALL
        .iter()
        .map(|file| update_file(addon_dir, *file, version, dry_run))
        .collect();

    let updated = files.iter().filter(|f| f.is_updated()).count();
    let outcome = if updated == files.len() {
        BumpOutcome::AllUpdated
    } else if updated == 0 {
        BumpOutcome::NothingToUpdate
    } else {
        BumpOutcome::Partial
    };

    tracing::info!(updated, total = files.len(), ?outcome, "bump finished");

    Ok(BumpReport {
        addon_dir: addon_dir.to_path_buf(),
        version: version.to_string(),
        dry_run,
        files,
        updated,
        outcome,
    })
}

fn update_file(addon_dir: &Utf8Path, file: AddonFile, version: &str, dry_run: bool) -> FileOutcome {
    let path = addon_dir.join(file.file_name());
    if !path.is_file() {
        tracing::warn!(%path, "file not found");
        return FileOutcome::new(file, path, FileStatus::Missing);
    }

    let content = match std::fs::read_to_string(path.as_std_path()) {
        Ok(content) => content,
        Err(e) => {
            tracing::warn!(%path, error = %e, "failed to read");
            let status = FileStatus::Failed {
                error: e.to_string(),
            };
            return FileOutcome::new(file, path, status);
        }
    };

    let Some(rewrite) = file.rewrite(&content, version) else {
        tracing::warn!(%path, "no version reference found");
        return FileOutcome::new(file, path, FileStatus::PatternNotFound);
    };

    let status = if rewrite.content == content {
        FileStatus::AlreadyCurrent
    } else if dry_run {
        FileStatus::Updated
    } else {
        match std::fs::write(path.as_std_path(), &rewrite.content) {
            Ok(()) => FileStatus::Updated,
            Err(e) => {
                tracing::warn!(%path, error = %e, "failed to write");
                FileStatus::Failed {
                    error: e.to_string(),
                }
            }
        }
    };
    tracing::debug!(%path, ?status, "file processed");

    FileOutcome {
        file,
        path,
        status,
        changes: rewrite.changes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CONFIG: &str = "name: Fritz Callmonitor\nversion: \"1.7.1-3\"\nslug: fritz\n";
    const BUILD: &str = "build_from:\n  amd64: base\nargs:\n  VERSION: '1.7.1' # upstream\n";
    const README: &str = "# Add-on\n\n![Release][release-shield]\n\n\
        [release-shield]: https://img.shields.io/badge/version-v1.7.1-blue.svg\n\
        [release]: https://github.com/akentner/homeassistant-addons/tree/v1.7.1\n";

    fn addon_dir(config: Option<&str>, build: Option<&str>, readme: Option<&str>) -> TempDir {
        let tmp = TempDir::new().unwrap();
        for (name, content) in [
            ("config.yaml", config),
            ("build.yaml", build),
            ("README.md", readme),
        ] {
            if let Some(content) = content {
                fs::write(tmp.path().join(name), content).unwrap();
            }
        }
        tmp
    }

    fn utf8(tmp: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(tmp.path().to_path_buf()).unwrap()
    }

    #[test]
    fn validates_release_versions() {
        assert!(validate_version("1.7.2").is_ok());
        assert!(validate_version("10.0.123").is_ok());
        for bad in ["1.7", "v1.7.2", "1.7.2-1", "1.7.2 ", "a.b.c", ""] {
            assert!(
                matches!(validate_version(bad), Err(BumpError::InvalidVersion(_))),
                "accepted {bad:?}"
            );
        }
    }

    #[test]
    fn config_version_gets_reset_suffix() {
        let rewrite = bump_config_yaml(CONFIG, "1.8.0").unwrap();
        assert!(rewrite.content.contains("version: \"1.8.0-0\"\n"));
        assert!(rewrite.content.contains("slug: fritz"));
        assert_eq!(
            rewrite.changes,
            vec![VersionChange {
                label: "version",
                old: "1.7.1-3".to_string(),
                new: "1.8.0-0".to_string(),
            }]
        );
    }

    #[test]
    fn config_without_suffix_is_not_matched() {
        assert!(bump_config_yaml("version: \"1.7.1\"\n", "1.8.0").is_none());
    }

    #[test]
    fn build_version_keeps_quotes_and_trailing_text() {
        let rewrite = bump_build_yaml(BUILD, "1.8.0").unwrap();
        assert!(rewrite.content.contains("  VERSION: '1.8.0' # upstream\n"));
        assert_eq!(rewrite.changes[0].old, "1.7.1");
    }

    #[test]
    fn readme_updates_badge_and_release_link() {
        let rewrite = bump_readme(README, "1.8.0").unwrap();
        assert!(
            rewrite
                .content
                .contains("https://img.shields.io/badge/version-v1.8.0-blue.svg")
        );
        assert!(
            rewrite
                .content
                .contains("https://github.com/akentner/homeassistant-addons/tree/v1.8.0")
        );
        let labels: Vec<_> = rewrite.changes.iter().map(|c| c.label).collect();
        assert_eq!(labels, vec!["badge", "release link"]);
    }

    #[test]
    fn readme_with_only_badge() {
        let content = "[release-shield]: https://img.shields.io/badge/version-v0.1.0-blue.svg\n";
        let rewrite = bump_readme(content, "0.2.0").unwrap();
        assert_eq!(rewrite.changes.len(), 1);
        assert_eq!(rewrite.changes[0].old, "0.1.0");
    }

    #[test]
    fn readme_without_references() {
        assert!(bump_readme("# Nothing here\n", "1.0.0").is_none());
    }

    #[test]
    fn bumps_all_files() {
        let tmp = addon_dir(Some(CONFIG), Some(BUILD), Some(README));
        let report = bump_addon(&utf8(&tmp), "1.8.0", false).unwrap();

        assert_eq!(report.outcome, BumpOutcome::AllUpdated);
        assert_eq!(report.updated, 3);
        let config = fs::read_to_string(tmp.path().join("config.yaml")).unwrap();
        assert!(config.contains("1.8.0-0"));
        let readme = fs::read_to_string(tmp.path().join("README.md")).unwrap();
        assert!(!readme.contains("1.7.1"));
    }

    #[test]
    fn dry_run_leaves_files_untouched() {
        let tmp = addon_dir(Some(CONFIG), Some(BUILD), Some(README));
        let report = bump_addon(&utf8(&tmp), "1.8.0", true).unwrap();

        assert_eq!(report.outcome, BumpOutcome::AllUpdated);
        assert!(report.dry_run);
        let config = fs::read_to_string(tmp.path().join("config.yaml")).unwrap();
        assert_eq!(config, CONFIG);
    }

    #[test]
    fn second_bump_finds_nothing_to_update() {
        let tmp = addon_dir(Some(CONFIG), Some(BUILD), Some(README));
        bump_addon(&utf8(&tmp), "1.8.0", false).unwrap();
        let report = bump_addon(&utf8(&tmp), "1.8.0", false).unwrap();

        assert_eq!(report.outcome, BumpOutcome::NothingToUpdate);
        assert!(report.outcome.is_success());
        assert!(
            report
                .files
                .iter()
                .all(|f| f.status == FileStatus::AlreadyCurrent)
        );
    }

    #[test]
    fn missing_file_makes_bump_partial() {
        let tmp = addon_dir(Some(CONFIG), None, Some(README));
        let report = bump_addon(&utf8(&tmp), "1.8.0", false).unwrap();

        assert_eq!(report.outcome, BumpOutcome::Partial);
        assert!(!report.outcome.is_success());
        assert_eq!(report.files[1].file, AddonFile::Build);
        assert_eq!(report.files[1].status, FileStatus::Missing);
    }

    #[test]
    fn readme_without_references_is_reported() {
        let tmp = addon_dir(Some(CONFIG), Some(BUILD), Some("# Plain\n"));
        let report = bump_addon(&utf8(&tmp), "1.8.0", true).unwrap();
        assert_eq!(report.files[2].status, FileStatus::PatternNotFound);
        assert_eq!(report.updated, 2);
    }

    #[test]
    fn rejects_bad_version_before_touching_files() {
        let tmp = addon_dir(Some(CONFIG), Some(BUILD), Some(README));
        let err = bump_addon(&utf8(&tmp), "1.8", false).unwrap_err();
        assert!(matches!(err, BumpError::InvalidVersion(_)));
        let config = fs::read_to_string(tmp.path().join("config.yaml")).unwrap();
        assert_eq!(config, CONFIG);
    }

    #[test]
    fn rejects_missing_directory() {
        let tmp = TempDir::new().unwrap();
        let missing = utf8(&tmp).join("nope");
        assert!(matches!(
            bump_addon(&missing, "1.0.0", false),
            Err(BumpError::AddonNotFound(_))
        ));
    }

    #[test]
    fn rejects_directory_without_config() {
        let tmp = addon_dir(None, Some(BUILD), Some(README));
        assert!(matches!(
            bump_addon(&utf8(&tmp), "1.0.0", false),
            Err(BumpError::NotAnAddon(_))
        ));
    }

    #[test]
    fn report_serializes_status_inline() {
        let tmp = addon_dir(Some(CONFIG), None, Some(README));
        let report = bump_addon(&utf8(&tmp), "1.8.0", true).unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outcome"], "partial");
        assert_eq!(json["files"][0]["file"], "config");
        assert_eq!(json["files"][0]["status"], "updated");
        assert_eq!(json["files"][1]["status"], "missing");
    }
}
