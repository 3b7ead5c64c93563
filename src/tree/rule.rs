//! Declarative match rules.

use serde::{Deserialize, Serialize};

/// Describes which syntax-tree nodes a find-and-replace pass targets.
///
/// `query` is a tree-sitter S-expression query and is opaque to the rest of
/// the crate. Without a `capture`, every capture of every match is a target,
/// in match order; with one, only nodes bound to that capture name are.
///
/// `pattern` is the literal meta-variable pattern (for example
/// `"$LEFT + $RIGHT"`) used to pull sub-texts out of each matched node so a
/// replacement template can reference them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rule {
    query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    capture: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pattern: Option<String>,
}

impl Rule {
    /// Creates a rule from a tree-sitter query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            capture: None,
            pattern: None,
        }
    }

    /// Restricts matches to nodes bound to the named capture (without `@`).
    pub fn capture(mut self, name: impl Into<String>) -> Self {
        self.capture = Some(name.into().trim_start_matches('@').to_string());
        self
    }

    /// Sets the meta-variable pattern for this rule.
    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.pattern = Some(pattern.into());
        self
    }

    /// The tree-sitter query source.
    pub fn query_source(&self) -> &str {
        &self.query
    }

    /// The capture filter, if any.
    pub fn capture_name(&self) -> Option<&str> {
        self.capture.as_deref()
    }

    /// The meta-variable pattern, if any.
    pub fn pattern_str(&self) -> Option<&str> {
        self.pattern.as_deref()
    }
}
