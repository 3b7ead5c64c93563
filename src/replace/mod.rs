//! Rule-based find and replace over syntax trees.
//!
//! A pass finds every node a [`Rule`] matches and asks a [`Transformer`] what
//! to put there. Literal replacements may reference the rule's meta-variables
//! (see [`metavar`]); replacements identical to the node's current text are
//! dropped. Multi-stage configurations re-parse between stages so each stage
//! sees the previous one's output.

pub mod metavar;

pub use metavar::{MetaPattern, MetaVariable, MetaVariables, Placeholder};

use crate::error::Result;
use crate::modifications::{Modifications, commit_edit_modifications};
use crate::tree::{Edit, Node, Rule, SyntaxTree};
use std::fmt;
use std::sync::Arc;

/// What a transformer produces for one matched node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
    /// Replacement text for the node, subject to meta-variable substitution.
    Text(String),
    /// A prepared edit, passed through untouched.
    Edit(Edit),
}

impl From<String> for Replacement {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for Replacement {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Edit> for Replacement {
    fn from(edit: Edit) -> Self {
        Self::Edit(edit)
    }
}

/// Signature of a node transformer. An empty result skips the node.
pub type NodeTransformFn = dyn for<'t> Fn(&Node<'t>, &Rule) -> Vec<Replacement> + Send + Sync;

/// Computes replacements for matched nodes.
#[derive(Clone)]
pub enum Transformer {
    /// The same text for every match.
    Literal(String),
    /// A function of the matched node.
    Function(Arc<NodeTransformFn>),
}

impl Transformer {
    /// Creates a literal transformer.
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Creates a transformer from a function of the matched node.
    pub fn function<F>(f: F) -> Self
    where
        F: for<'t> Fn(&Node<'t>, &Rule) -> Vec<Replacement> + Send + Sync + 'static,
    {
        Self::Function(Arc::new(f))
    }

    fn replacements(&self, node: &Node<'_>, rule: &Rule) -> Vec<Replacement> {
        match self {
            Self::Literal(text) => vec![Replacement::Text(text.clone())],
            Self::Function(f) => f(node, rule),
        }
    }
}

impl fmt::Debug for Transformer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Self::Function(_) => f.write_str("Function(..)"),
        }
    }
}

impl From<&str> for Transformer {
    fn from(text: &str) -> Self {
        Self::literal(text)
    }
}

impl From<String> for Transformer {
    fn from(text: String) -> Self {
        Self::Literal(text)
    }
}

/// One stage of a multi-stage find and replace.
#[derive(Debug, Clone)]
pub struct FindAndReplaceConfig {
    pub rule: Rule,
    pub transformer: Transformer,
}

impl FindAndReplaceConfig {
    /// Creates a stage.
    pub fn new(rule: Rule, transformer: impl Into<Transformer>) -> Self {
        Self {
            rule,
            transformer: transformer.into(),
        }
    }
}

/// Computes the edits of one pass of `rule` over `tree`, in match order.
///
/// For each node, edits generated from replacement text come first, followed
/// by the edits the transformer returned as-is.
pub fn find_and_replace_edits(tree: &SyntaxTree, rule: &Rule, transformer: &Transformer) -> Result<Vec<Edit>> {
    let nodes = tree.find_all(rule)?;
    let meta_pattern = rule.pattern_str().and_then(MetaPattern::compile);

    let mut edits = Vec::new();
    for node in &nodes {
        let replacements = transformer.replacements(node, rule);
        if replacements.is_empty() {
            continue;
        }

        let (texts, passthrough): (Vec<_>, Vec<_>) = replacements
            .into_iter()
            .partition(|r| matches!(r, Replacement::Text(_)));

        let variables = meta_pattern
            .as_ref()
            .map(|p| p.extract(node.text()))
            .unwrap_or_default();

        let current = node.text();
        for replacement in texts {
            let Replacement::Text(text) = replacement else {
                continue;
            };
            let text = metavar::substitute(&text, &variables);
            if text != current {
                edits.push(node.replace(text));
            }
        }
        edits.extend(passthrough.into_iter().filter_map(|r| match r {
            Replacement::Edit(edit) => Some(edit),
            Replacement::Text(_) => None,
        }));
    }

    Ok(edits)
}

/// Runs one pass and returns the committed text.
pub fn find_and_replace(tree: &SyntaxTree, rule: &Rule, transformer: &Transformer) -> Result<String> {
    let edits = find_and_replace_edits(tree, rule, transformer)?;
    Ok(tree.commit_edits(&edits).text)
}

/// Runs `stages` in order, re-parsing after every stage that produced edits.
///
/// Returns the final text, which is the original text when no stage matched.
pub fn find_and_replace_config(tree: &SyntaxTree, stages: &[FindAndReplaceConfig]) -> Result<String> {
    let mut current: Option<SyntaxTree> = None;
    for stage in stages {
        let tree_in = current.as_ref().unwrap_or(tree);
        let edits = find_and_replace_edits(tree_in, &stage.rule, &stage.transformer)?;
        if edits.is_empty() {
            continue;
        }
        let committed = tree_in.commit_edits(&edits);
        current = Some(tree_in.reparse(committed.text)?);
    }

    Ok(current.as_ref().unwrap_or(tree).text().to_string())
}

/// Stateful sibling of [`find_and_replace_config`] that records every stage
/// in the modification history.
pub fn find_and_replace_config_modifications(
    modifications: Modifications,
    stages: &[FindAndReplaceConfig],
) -> Result<Modifications> {
    let mut modifications = modifications;
    for stage in stages {
        let edits = find_and_replace_edits(&modifications.tree, &stage.rule, &stage.transformer)?;
        modifications = commit_edit_modifications(&edits, modifications)?;
    }
    Ok(modifications)
}
