//! Language-to-extension resolution and tree-sitter grammar lookup.
//!
//! A codemod declares the languages it applies to by name. The names resolve
//! to a set of file extensions used for target selection, and to the
//! tree-sitter grammar used when a declarative codemod parses a file.
//!
//! An unknown language resolves to an *empty* extension set. Callers treat an
//! empty set as "no extension filter", so a codemod that declares nothing
//! resolvable runs against every file.

use crate::error::{CodemodError, Result};
use std::collections::BTreeSet;
use std::path::Path;
use tree_sitter::{Language as TsLanguage, Parser, Query, Tree};

const JAVASCRIPT_EXTENSIONS: &[&str] = &[".js", ".cjs", ".mjs"];
const TYPESCRIPT_EXTENSIONS: &[&str] = &[".js", ".cjs", ".mjs", ".ts", ".mts"];
const TSX_EXTENSIONS: &[&str] = &[".jsx", ".tsx"];
const JSX_EXTENSIONS: &[&str] = &[".jsx"];

/// A language known to the runner.
#[derive(Debug)]
pub struct Language {
    name: &'static str,
    aliases: &'static [&'static str],
    extensions: &'static [&'static str],
    grammar: fn() -> TsLanguage,
}

impl Language {
    /// Canonical lowercase name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Alternative names accepted by [`lookup`].
    pub fn aliases(&self) -> &'static [&'static str] {
        self.aliases
    }

    /// File extensions, each with its leading dot.
    pub fn extensions(&self) -> &'static [&'static str] {
        self.extensions
    }

    /// Returns the tree-sitter language grammar.
    pub fn grammar(&self) -> TsLanguage {
        (self.grammar)()
    }

    /// Parses source code into a tree-sitter AST.
    pub fn parse(&self, source: &str) -> Result<Tree> {
        let mut parser = Parser::new();
        parser
            .set_language(&self.grammar())
            .map_err(|e| CodemodError::Parse {
                language: self.name.to_string(),
                message: format!("Failed to set language: {e}"),
            })?;

        parser.parse(source, None).ok_or_else(|| CodemodError::Parse {
            language: self.name.to_string(),
            message: "Failed to parse source".to_string(),
        })
    }

    /// Compiles a tree-sitter query for this language.
    pub fn query(&self, pattern: &str) -> Result<Query> {
        Ok(Query::new(&self.grammar(), pattern)?)
    }

    /// Checks if this language handles the given extension (with or without dot).
    pub fn matches_extension(&self, ext: &str) -> bool {
        let ext = ext.trim_start_matches('.');
        self.extensions
            .iter()
            .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
    }

    fn answers_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name) || self.aliases.iter().any(|a| a.eq_ignore_ascii_case(name))
    }
}

fn typescript() -> TsLanguage {
    tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()
}

fn tsx() -> TsLanguage {
    tree_sitter_typescript::LANGUAGE_TSX.into()
}

fn rust() -> TsLanguage {
    tree_sitter_rust::LANGUAGE.into()
}

fn python() -> TsLanguage {
    tree_sitter_python::LANGUAGE.into()
}

fn go() -> TsLanguage {
    tree_sitter_go::LANGUAGE.into()
}

fn java() -> TsLanguage {
    tree_sitter_java::LANGUAGE.into()
}

fn csharp() -> TsLanguage {
    tree_sitter_c_sharp::LANGUAGE.into()
}

fn ruby() -> TsLanguage {
    tree_sitter_ruby::LANGUAGE.into()
}

// JavaScript sources are parsed with the TypeScript grammar, which accepts them.
static LANGUAGES: &[Language] = &[
    Language {
        name: "typescript",
        aliases: &["ts"],
        extensions: TYPESCRIPT_EXTENSIONS,
        grammar: typescript,
    },
    Language {
        name: "tsx",
        aliases: &[],
        extensions: TSX_EXTENSIONS,
        grammar: tsx,
    },
    Language {
        name: "jsx",
        aliases: &[],
        extensions: JSX_EXTENSIONS,
        grammar: tsx,
    },
    Language {
        name: "javascript",
        aliases: &["js"],
        extensions: JAVASCRIPT_EXTENSIONS,
        grammar: typescript,
    },
    Language {
        name: "rust",
        aliases: &["rs"],
        extensions: &[".rs"],
        grammar: rust,
    },
    Language {
        name: "python",
        aliases: &["py"],
        extensions: &[".py", ".pyi"],
        grammar: python,
    },
    Language {
        name: "go",
        aliases: &["golang"],
        extensions: &[".go"],
        grammar: go,
    },
    Language {
        name: "java",
        aliases: &[],
        extensions: &[".java"],
        grammar: java,
    },
    Language {
        name: "csharp",
        aliases: &["c#", "cs"],
        extensions: &[".cs", ".csx"],
        grammar: csharp,
    },
    Language {
        name: "ruby",
        aliases: &["rb"],
        extensions: &[".rb", ".rake", ".gemspec"],
        grammar: ruby,
    },
];

/// Returns all known languages.
pub fn all() -> &'static [Language] {
    LANGUAGES
}

/// Finds a language by name or alias, ignoring case.
pub fn lookup(name: &str) -> Option<&'static Language> {
    LANGUAGES.iter().find(|l| l.answers_to(name))
}

/// Resolves a declared language to its extension set.
///
/// Unknown languages resolve to an empty set.
pub fn resolve(name: &str) -> BTreeSet<&'static str> {
    lookup(name)
        .map(|l| l.extensions.iter().copied().collect())
        .unwrap_or_default()
}

/// Union of [`resolve`] over every declared language.
pub fn resolve_all<'a>(names: impl IntoIterator<Item = &'a str>) -> BTreeSet<&'static str> {
    names.into_iter().flat_map(resolve).collect()
}

/// Detects the language for a given file path from its extension.
pub fn detect(path: &Path) -> Option<&'static Language> {
    let ext = path.extension()?.to_str()?;
    LANGUAGES.iter().find(|l| l.matches_extension(ext))
}

/// Returns the extension of `path` in the resolver's `.ext` form.
pub fn dotted_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{e}"))
}
