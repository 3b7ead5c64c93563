//! Per-file edit history across successive edit-commit-reparse cycles.

use crate::error::Result;
use crate::tree::{Edit, SyntaxTree};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Running count of edits applied to one file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModificationsReport {
    pub changes_applied: usize,
}

/// A tree plus the record of how it got there.
///
/// `history` holds one tree per committed, non-empty edit batch, oldest
/// first; the last entry is the current `tree`.
#[derive(Debug, Clone)]
pub struct Modifications {
    pub tree: Arc<SyntaxTree>,
    pub report: ModificationsReport,
    pub language: &'static str,
    pub filename: Option<PathBuf>,
    pub history: Vec<Arc<SyntaxTree>>,
}

impl Modifications {
    /// Starts tracking an already parsed tree.
    pub fn new(tree: SyntaxTree, filename: Option<&Path>) -> Self {
        let language = tree.language().name();
        Self {
            tree: Arc::new(tree),
            report: ModificationsReport::default(),
            language,
            filename: filename.map(Path::to_path_buf),
            history: Vec::new(),
        }
    }

    /// Parses `source` under `language` and starts tracking it.
    pub fn parse(language: &str, source: impl Into<String>, filename: Option<&Path>) -> Result<Self> {
        Ok(Self::new(SyntaxTree::parse(language, source)?, filename))
    }

    /// Current text.
    pub fn text(&self) -> &str {
        self.tree.text()
    }

    /// Whether any edit has been applied.
    pub fn has_changes(&self) -> bool {
        self.report.changes_applied > 0
    }

    /// See [`commit_edit_modifications`].
    pub fn commit(self, edits: &[Edit]) -> Result<Self> {
        commit_edit_modifications(edits, self)
    }
}

/// Commits `edits` against the current tree and records the result.
///
/// An empty batch returns `modifications` untouched. Otherwise the edits are
/// committed, the text is re-parsed under the tracked language, the counter
/// grows by the number of edits applied and the new tree is appended to the
/// history.
pub fn commit_edit_modifications(edits: &[Edit], modifications: Modifications) -> Result<Modifications> {
    if edits.is_empty() {
        return Ok(modifications);
    }

    let committed = modifications.tree.commit_edits(edits);
    let tree = Arc::new(modifications.tree.reparse(committed.text)?);

    let mut history = modifications.history;
    history.push(Arc::clone(&tree));

    Ok(Modifications {
        tree,
        report: ModificationsReport {
            changes_applied: modifications.report.changes_applied + committed.applied,
        },
        history,
        ..modifications
    })
}
