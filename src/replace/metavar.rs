//! Meta-variable extraction from matched node text.
//!
//! A pattern such as `"$CALLEE($$$ARGS)"` holds single-token (`$NAME`) and
//! multi-token (`$$$NAME`) placeholders. Placeholder names are runs of ASCII
//! capital letters; any other `$`-prefixed text is literal.
//!
//! Values are recovered heuristically: the pattern is turned into a regular
//! expression (literals escaped verbatim, whitespace included; single
//! placeholders become `(.+?)` and multi placeholders `(.*?)`) and matched
//! against the whole node text. When a name appears more than once the first capture
//! wins; the regex engine cannot check that repeated captures agree.

use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\$\$([A-Z]+)\b|\$([A-Z]+)\b").expect("invalid regex"));

/// A placeholder declared by a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub name: String,
    pub is_multiple: bool,
    /// The placeholder as written, e.g. `$$$ARGS`.
    pub token: String,
}

/// A placeholder bound to text from one matched node.
///
/// `start` and `end` are character offsets of the first occurrence of
/// `value` in the node text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetaVariable {
    pub name: String,
    pub is_multiple: bool,
    pub start: usize,
    pub end: usize,
    pub value: String,
    pub original_token: String,
}

/// Meta-variables of one match, keyed by placeholder name.
pub type MetaVariables = BTreeMap<String, MetaVariable>;

/// Collects placeholders in order of appearance.
pub fn placeholders(pattern: &str) -> Vec<Placeholder> {
    PLACEHOLDER
        .captures_iter(pattern)
        .filter_map(|caps| placeholder_from(&caps))
        .collect()
}

fn placeholder_from(caps: &Captures<'_>) -> Option<Placeholder> {
    let token = caps.get(0)?.as_str().to_string();
    if let Some(name) = caps.get(1) {
        return Some(Placeholder {
            name: name.as_str().to_string(),
            is_multiple: true,
            token,
        });
    }
    caps.get(2).map(|name| Placeholder {
        name: name.as_str().to_string(),
        is_multiple: false,
        token,
    })
}

/// A pattern compiled for repeated extraction.
#[derive(Debug, Clone)]
pub struct MetaPattern {
    placeholders: Vec<Placeholder>,
    regex: Regex,
}

impl MetaPattern {
    /// Compiles `pattern`. Returns `None` when it declares no placeholders.
    pub fn compile(pattern: &str) -> Option<Self> {
        let placeholders = placeholders(pattern);
        if placeholders.is_empty() {
            return None;
        }

        let mut source = String::from("(?s)^");
        let mut last = 0;
        for found in PLACEHOLDER.find_iter(pattern) {
            source.push_str(&regex::escape(&pattern[last..found.start()]));
            if found.as_str().starts_with("$$$") {
                source.push_str("(.*?)");
            } else {
                source.push_str("(.+?)");
            }
            last = found.end();
        }
        source.push_str(&regex::escape(&pattern[last..]));
        source.push('$');

        // Escaped literals and fixed groups always form a valid expression.
        let regex = Regex::new(&source).ok()?;
        Some(Self { placeholders, regex })
    }

    /// Placeholders in order of appearance.
    pub fn placeholders(&self) -> &[Placeholder] {
        &self.placeholders
    }

    /// Extracts meta-variables from the text of a matched node.
    ///
    /// Returns an empty map when the derived expression does not match.
    pub fn extract(&self, text: &str) -> MetaVariables {
        let mut variables = MetaVariables::new();
        let Some(caps) = self.regex.captures(text) else {
            return variables;
        };

        for (index, placeholder) in self.placeholders.iter().enumerate() {
            let Some(value) = caps.get(index + 1).map(|m| m.as_str()) else {
                continue;
            };
            if value.is_empty() || variables.contains_key(&placeholder.name) {
                continue;
            }
            let byte_start = text.find(value).unwrap_or_default();
            let start = text[..byte_start].chars().count();
            variables.insert(
                placeholder.name.clone(),
                MetaVariable {
                    name: placeholder.name.clone(),
                    is_multiple: placeholder.is_multiple,
                    start,
                    end: start + value.chars().count(),
                    value: value.to_string(),
                    original_token: placeholder.token.clone(),
                },
            );
        }

        variables
    }
}

/// One-shot extraction of `pattern`'s meta-variables from `text`.
pub fn extract(pattern: &str, text: &str) -> MetaVariables {
    MetaPattern::compile(pattern)
        .map(|compiled| compiled.extract(text))
        .unwrap_or_default()
}

/// Replaces every placeholder token in `template` that has a bound value.
///
/// A token is only replaced by a variable captured with the same form, so
/// `$ARGS` is left alone when the pattern declared `$$$ARGS`.
pub fn substitute(template: &str, variables: &MetaVariables) -> String {
    if variables.is_empty() {
        return template.to_string();
    }
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            let token = &caps[0];
            placeholder_from(caps)
                .and_then(|p| variables.get(&p.name))
                .filter(|v| v.original_token == token)
                .map_or_else(|| token.to_string(), |v| v.value.clone())
        })
        .into_owned()
}
