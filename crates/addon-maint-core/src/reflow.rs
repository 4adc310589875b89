//! Markdown line-length reflow.
//!
//! Breaks over-length lines with one of two strategies, picked by the
//! shape of the line:
//!
//! - **Labelled list items** (`- **Label**: text`) are split once, after
//!   the first acceptable separator (`" at "`, `" from "`, `" in "`, `", "`,
//!   `" - "`, in that priority) or at a fixed fallback offset. The
//!   continuation is indented by two spaces so it stays inside the item.
//! - **Everything else** is greedily word-wrapped on whitespace.
//!
//! Lengths are counted in characters, not bytes. A whitespace-free token
//! that is longer than the limit on its own is passed through unchanged.
//!
//! The per-line function is pure; [`reflow_document`] is the entry point
//! for callers that hold a whole file and a [`ReflowSettings`].

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Default maximum line length when none is configured.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 120;

/// Characters kept free before the limit when choosing a list-item break.
const BREAK_MARGIN: usize = 10;

/// Indentation prefixed to the continuation of a split list item.
const CONTINUATION_INDENT: &str = "  ";

/// List-item separators, highest priority first.
const BREAK_POINTS: &[&str] = &[" at ", " from ", " in ", ", ", " - "];

/// Bullet, bold label, colon: `  - **Label**: `.
static LABELED_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\s*[-*+]\s+\*\*[^*]+\*\*:\s*)").expect("valid regex"));

/// Whether a reflow run only reports or also rewrites.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReflowMode {
    /// Report over-length lines without producing rewritten content.
    Check,
    /// Produce rewritten content for documents with over-length lines.
    #[default]
    Write,
}

impl ReflowMode {
    /// Returns the mode as a lowercase string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Check => "check",
            Self::Write => "write",
        }
    }
}

/// Settings for a reflow run, passed explicitly to [`reflow_document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflowSettings {
    /// Maximum permitted line length in characters.
    pub max_line_length: usize,
    /// Check-only or write mode.
    pub mode: ReflowMode,
}

impl Default for ReflowSettings {
    fn default() -> Self {
        Self {
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            mode: ReflowMode::default(),
        }
    }
}

/// One line over the configured limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LongLine {
    /// 1-based line number.
    pub line_number: usize,
    /// Length in characters.
    pub length: usize,
}

/// Result of running a document through [`reflow_document`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentReport {
    /// The limit the document was checked against.
    pub max_line_length: usize,
    /// Over-length lines in the original document.
    pub long_lines: Vec<LongLine>,
    /// Rewritten document. Only set in write mode when there was something to fix.
    pub reflowed: Option<String>,
}

impl DocumentReport {
    /// Returns `true` if the original document had over-length lines.
    pub const fn has_long_lines(&self) -> bool {
        !self.long_lines.is_empty()
    }
}

/// Reflow a single line so that it fits within `max_length` characters.
///
/// Returns the replacement lines in order. A line that already fits is
/// returned as-is.
pub fn reflow_line(line: &str, max_length: usize) -> Vec<String> {
    if char_len(line) <= max_length {
        return vec![line.to_string()];
    }

    match LABELED_ITEM.find(line) {
        Some(prefix) => {
            split_list_item(line, prefix.as_str(), &line[prefix.end()..], max_length)
        }
        None => wrap_words(line, max_length),
    }
}

/// Split a labelled list item into a head line and an indented continuation.
fn split_list_item(line: &str, prefix: &str, remainder: &str, max_length: usize) -> Vec<String> {
    let prefix_len = char_len(prefix);
    let remainder_len = char_len(remainder);

    // Unreachable from `reflow_line`, which returns fitting lines first.
    if prefix_len + remainder_len <= max_length {
        return vec![line.to_string()];
    }

    let split_at = match separator_break(prefix_len, remainder, max_length) {
        Some(byte_offset) => byte_offset,
        None => {
            if remainder_len < 2 {
                return vec![line.to_string()];
            }
            let offset = max_length
                .saturating_sub(prefix_len + BREAK_MARGIN)
                .clamp(1, remainder_len - 1);
            byte_offset(remainder, offset)
        }
    };

    let (head, tail) = remainder.split_at(split_at);
    vec![
        format!("{prefix}{}", head.trim_end()),
        format!("{CONTINUATION_INDENT}{}", tail.trim_start()),
    ]
}

/// Byte offset just past the first acceptable separator in `remainder`.
///
/// Candidates are tried in priority order; only the first occurrence of
/// each counts, and it must start before `max_length - BREAK_MARGIN`
/// once the prefix is accounted for.
fn separator_break(prefix_len: usize, remainder: &str, max_length: usize) -> Option<usize> {
    BREAK_POINTS.iter().find_map(|separator| {
        let start = remainder.find(separator)?;
        let position = char_len(&remainder[..start]);
        (prefix_len + position + BREAK_MARGIN < max_length).then_some(start + separator.len())
    })
}

/// Greedy word wrap on whitespace.
fn wrap_words(line: &str, max_length: usize) -> Vec<String> {
    if !line.contains(char::is_whitespace) {
        return vec![line.to_string()];
    }

    let mut words = line.split_whitespace();
    let Some(first) = words.next() else {
        // Whitespace only: nothing to keep.
        return vec![String::new()];
    };

    let mut lines = Vec::new();
    let mut current = first.to_string();
    let mut current_len = char_len(first);

    for word in words {
        let word_len = char_len(word);
        if current_len + 1 + word_len <= max_length {
            current.push(' ');
            current.push_str(word);
            current_len += 1 + word_len;
        } else {
            lines.push(std::mem::replace(&mut current, word.to_string()));
            current_len = word_len;
        }
    }
    lines.push(current);

    lines
}

/// Lazily reflow every line of a block of text.
pub fn reflow_lines(text: &str, max_length: usize) -> impl Iterator<Item = String> + '_ {
    text.lines()
        .flat_map(move |line| reflow_line(line, max_length))
}

/// Reflow a block of text, joining the result with `\n`.
///
/// A trailing newline on the input is kept.
#[tracing::instrument(skip(text), fields(text_len = text.len()))]
pub fn reflow_text(text: &str, max_length: usize) -> String {
    let mut output = reflow_lines(text, max_length).collect::<Vec<_>>().join("\n");
    if text.ends_with('\n') {
        output.push('\n');
    }
    output
}

/// List the lines of `text` longer than `max_length` characters.
pub fn find_long_lines(text: &str, max_length: usize) -> Vec<LongLine> {
    text.lines()
        .enumerate()
        .filter_map(|(index, line)| {
            let length = char_len(line);
            (length > max_length).then_some(LongLine {
                line_number: index + 1,
                length,
            })
        })
        .collect()
}

/// Check a document against the settings and, in write mode, reflow it.
#[tracing::instrument(skip(text), fields(text_len = text.len(), mode = settings.mode.as_str()))]
pub fn reflow_document(text: &str, settings: &ReflowSettings) -> DocumentReport {
    let long_lines = find_long_lines(text, settings.max_line_length);
    let reflowed = (settings.mode == ReflowMode::Write && !long_lines.is_empty())
        .then(|| reflow_text(text, settings.max_line_length));

    tracing::debug!(long_lines = long_lines.len(), "document checked");

    DocumentReport {
        max_line_length: settings.max_line_length,
        long_lines,
        reflowed,
    }
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte index of the `n`th character, or the string length past the end.
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(index, _)| index)
}
