//! Diff rendering for dry runs.

use crate::codemod::RunCodemodOkResult;
use similar::{ChangeTag, TextDiff};
use std::fmt;
use std::path::Path;

const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const CYAN: &str = "\x1b[36m";
const RESET: &str = "\x1b[0m";

/// Generates a unified diff between two strings.
pub fn unified_diff(original: &str, modified: &str, path: &Path) -> String {
    render(original, modified, path, false)
}

/// Unified diff with ANSI colors for terminal display.
pub fn colorized_diff(original: &str, modified: &str, path: &Path) -> String {
    render(original, modified, path, true)
}

fn render(original: &str, modified: &str, path: &Path, color: bool) -> String {
    let diff = TextDiff::from_lines(original, modified);
    let paint = |code: &'static str| if color { code } else { "" };
    let mut output = String::new();

    output.push_str(&format!("{}--- a/{}{}\n", paint(CYAN), path.display(), paint(RESET)));
    output.push_str(&format!("{}+++ b/{}{}\n", paint(CYAN), path.display(), paint(RESET)));

    for (idx, group) in diff.grouped_ops(3).iter().enumerate() {
        if idx > 0 {
            output.push('\n');
        }
        for op in group {
            for change in diff.iter_changes(op) {
                let (sign, code) = match change.tag() {
                    ChangeTag::Delete => ("-", RED),
                    ChangeTag::Insert => ("+", GREEN),
                    ChangeTag::Equal => (" ", ""),
                };
                let value = change.value();
                if code.is_empty() || !color {
                    output.push_str(&format!("{sign}{value}"));
                } else {
                    output.push_str(&format!("{code}{sign}{value}{RESET}"));
                }
                if change.missing_newline() {
                    output.push('\n');
                }
            }
        }
    }

    output
}

/// Diffs of every changed file in `results`, concatenated in order.
pub fn results_diff(results: &[RunCodemodOkResult], color: bool) -> String {
    results
        .iter()
        .filter(|r| r.has_changes)
        .map(|r| render(&r.original, &r.content, &r.full_path, color))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Represents a summary of changes.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DiffSummary {
    pub files_changed: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl DiffSummary {
    /// Creates a summary from original and modified content.
    pub fn from_diff(original: &str, modified: &str) -> Self {
        let diff = TextDiff::from_lines(original, modified);
        let mut insertions = 0;
        let mut deletions = 0;

        for change in diff.iter_all_changes() {
            match change.tag() {
                ChangeTag::Insert => insertions += 1,
                ChangeTag::Delete => deletions += 1,
                ChangeTag::Equal => {}
            }
        }

        Self {
            files_changed: usize::from(insertions > 0 || deletions > 0),
            insertions,
            deletions,
        }
    }

    /// Sums the summaries of every result.
    pub fn from_results(results: &[RunCodemodOkResult]) -> Self {
        let mut summary = Self::default();
        for result in results.iter().filter(|r| r.has_changes) {
            summary.merge(&Self::from_diff(&result.original, &result.content));
        }
        summary
    }

    /// Combines two summaries.
    pub fn merge(&mut self, other: &DiffSummary) {
        self.files_changed += other.files_changed;
        self.insertions += other.insertions;
        self.deletions += other.deletions;
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} file(s) changed, {} insertions(+), {} deletions(-)",
            self.files_changed, self.insertions, self.deletions
        )
    }
}
