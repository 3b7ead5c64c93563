//! Syntax trees, matched nodes and edits.
//!
//! This is the thin adapter over tree-sitter that the find-and-replace engine
//! consumes: parse a source under a language, find the nodes a [`Rule`]
//! matches, turn a node into an [`Edit`], and commit a batch of edits back
//! into text.

mod rule;

pub use rule::Rule;

use crate::error::{CodemodError, Result};
use crate::lang::{self, Language};
use std::fmt;
use std::ops::Range;
use streaming_iterator::StreamingIterator;
use tree_sitter::{QueryCursor, Tree};

/// A single textual replacement at a byte span.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Edit {
    pub position: usize,
    pub deleted_length: usize,
    pub inserted_text: String,
}

impl Edit {
    /// Creates an edit replacing `range` with `text`.
    pub fn new(range: Range<usize>, text: impl Into<String>) -> Self {
        Self {
            position: range.start,
            deleted_length: range.end.saturating_sub(range.start),
            inserted_text: text.into(),
        }
    }

    /// End offset (exclusive) of the replaced span, or `None` when it
    /// overflows.
    pub fn end(&self) -> Option<usize> {
        self.position.checked_add(self.deleted_length)
    }
}

/// Text produced by committing edits, with the number actually applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommittedEdits {
    pub text: String,
    pub applied: usize,
}

/// A parsed source file.
#[derive(Clone)]
pub struct SyntaxTree {
    language: &'static Language,
    source: String,
    tree: Tree,
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("language", &self.language.name())
            .field("len", &self.source.len())
            .finish()
    }
}

impl SyntaxTree {
    /// Parses `source` with the grammar registered for `language`.
    pub fn parse(language: &str, source: impl Into<String>) -> Result<Self> {
        let language = lang::lookup(language)
            .ok_or_else(|| CodemodError::UnsupportedLanguage(language.to_string()))?;
        Self::parse_with(language, source)
    }

    /// Parses `source` with an already resolved language.
    pub fn parse_with(language: &'static Language, source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let tree = language.parse(&source)?;
        Ok(Self {
            language,
            source,
            tree,
        })
    }

    /// Re-parses new text under the same language.
    pub fn reparse(&self, source: impl Into<String>) -> Result<Self> {
        Self::parse_with(self.language, source)
    }

    /// The language this tree was parsed with.
    pub fn language(&self) -> &'static Language {
        self.language
    }

    /// The full source text.
    pub fn text(&self) -> &str {
        &self.source
    }

    /// The root node.
    pub fn root(&self) -> Node<'_> {
        Node {
            inner: self.tree.root_node(),
            source: &self.source,
        }
    }

    /// Finds every node matched by `rule`, in match order.
    pub fn find_all(&self, rule: &Rule) -> Result<Vec<Node<'_>>> {
        let query = self.language.query(rule.query_source())?;
        let capture_index = match rule.capture_name() {
            Some(name) => Some(query.capture_index_for_name(name).ok_or_else(|| {
                CodemodError::InvalidConfig(format!(
                    "capture '@{name}' is not defined by query '{}'",
                    rule.query_source()
                ))
            })?),
            None => None,
        };

        let mut cursor = QueryCursor::new();
        let mut nodes = Vec::new();
        let mut query_matches = cursor.matches(&query, self.tree.root_node(), self.source.as_bytes());
        while let Some(query_match) = query_matches.next() {
            for capture in query_match.captures {
                if capture_index.is_some_and(|index| index != capture.index) {
                    continue;
                }
                nodes.push(Node {
                    inner: capture.node,
                    source: &self.source,
                });
            }
        }

        Ok(nodes)
    }

    /// Applies `edits` to the source text.
    ///
    /// Edits are applied in ascending position order. An edit that overlaps
    /// one already applied, falls outside the text or splits a character is
    /// dropped and not counted.
    pub fn commit_edits(&self, edits: &[Edit]) -> CommittedEdits {
        let mut sorted: Vec<&Edit> = edits.iter().collect();
        sorted.sort();
        sorted.dedup();

        let mut text = String::with_capacity(self.source.len());
        let mut cursor = 0;
        let mut applied = 0;
        for edit in sorted {
            if edit.position < cursor {
                continue;
            }
            let Some(end) = edit.end() else {
                continue;
            };
            let (Some(kept), Some(_)) = (self.source.get(cursor..edit.position), self.source.get(edit.position..end))
            else {
                continue;
            };
            text.push_str(kept);
            text.push_str(&edit.inserted_text);
            cursor = end;
            applied += 1;
        }
        text.push_str(&self.source[cursor..]);

        CommittedEdits { text, applied }
    }
}

/// A node borrowed from a [`SyntaxTree`].
#[derive(Clone, Copy)]
pub struct Node<'t> {
    inner: tree_sitter::Node<'t>,
    source: &'t str,
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("kind", &self.kind())
            .field("range", &self.range())
            .field("text", &self.text())
            .finish()
    }
}

impl<'t> Node<'t> {
    /// Source text covered by this node.
    pub fn text(&self) -> &'t str {
        self.source.get(self.inner.byte_range()).unwrap_or_default()
    }

    /// Grammar kind, e.g. `call_expression`.
    pub fn kind(&self) -> &'static str {
        self.inner.kind()
    }

    /// Byte range in the source.
    pub fn range(&self) -> Range<usize> {
        self.inner.byte_range()
    }

    /// Zero-based `(row, column)` of the first byte.
    pub fn start_position(&self) -> (usize, usize) {
        let point = self.inner.start_position();
        (point.row, point.column)
    }

    /// Whether the node is named in the grammar.
    pub fn is_named(&self) -> bool {
        self.inner.is_named()
    }

    /// The enclosing node, if any.
    pub fn parent(&self) -> Option<Self> {
        self.inner.parent().map(|inner| Self {
            inner,
            source: self.source,
        })
    }

    /// An edit replacing this node's span with `text`.
    pub fn replace(&self, text: impl Into<String>) -> Edit {
        Edit::new(self.range(), text)
    }
}

/// Walks up from `node` and returns the nearest ancestor satisfying `predicate`.
///
/// The starting node itself is not considered.
pub fn traverse_up<'t>(node: Node<'t>, mut predicate: impl FnMut(&Node<'t>) -> bool) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(candidate) = current {
        if predicate(&candidate) {
            return Some(candidate);
        }
        current = candidate.parent();
    }
    None
}
