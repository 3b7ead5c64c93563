//! # Codemod Runner
//!
//! Run source-to-source transformations across many repositories and open a
//! pull request for every repository that changed.
//!
//! This crate provides:
//! - Declarative find-and-replace over tree-sitter syntax trees, with
//!   meta-variable patterns (`$NAME`, `$$$ARGS`)
//! - A codemod runner that selects target files by language and glob,
//!   transforms them in parallel and isolates per-file failures
//! - A repository state machine that clones, resets and rebases each
//!   repository onto a working branch before any file is touched
//! - Publishing: commit, push and open a pull request per changed repository
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use codemod_runner::prelude::*;
//!
//! let rename = Codemod::from_stages(
//!     "rename-logger",
//!     ["typescript"],
//!     vec![FindAndReplaceConfig::new(
//!         Rule::new(r#"((call_expression function: (identifier) @fn) @call (#eq? @fn "oldLog"))"#)
//!             .capture("call")
//!             .pattern("oldLog($$$ARGS)"),
//!         "newLog($$$ARGS)",
//!     )],
//! );
//!
//! let outcomes = CodemodRunner::new(
//!     "/tmp/codemods",
//!     vec![RepositoryToClone::new("git@github.com:acme/web.git", ["frontend"])],
//! )
//! .run(&[RunnerCodemod::new(rename).tags(["frontend"])]);
//!
//! for (name, outcome) in &outcomes {
//!     for publication in &outcome.publications {
//!         println!("{name}: {} {:?}", publication.repository, publication.outcome);
//!     }
//! }
//! ```
//!
//! ## Find and Replace
//!
//! ```rust
//! use codemod_runner::prelude::*;
//!
//! let tree = SyntaxTree::parse("typescript", "const total = add(a, b);")?;
//! let rule = Rule::new("(call_expression) @call").pattern("add($X, $Y)");
//!
//! let output = find_and_replace(&tree, &rule, &Transformer::literal("sum($Y, $X)"))?;
//!
//! assert_eq!(output, "const total = sum(b, a);");
//! # Ok::<(), codemod_runner::error::CodemodError>(())
//! ```
//!
//! ## Supported Languages
//!
//! - TypeScript/JavaScript (`.ts`, `.mts`, `.js`, `.cjs`, `.mjs`)
//! - TSX/JSX (`.tsx`, `.jsx`)
//! - Rust (`.rs`)
//! - Python (`.py`, `.pyi`)
//! - Go (`.go`)
//! - Java (`.java`)
//! - C# (`.cs`, `.csx`)
//! - Ruby (`.rb`, `.rake`, `.gemspec`)

pub mod codemod;
pub mod config;
pub mod diff;
pub mod error;
pub mod git;
pub mod github;
pub mod lang;
pub mod modifications;
pub mod process;
pub mod publish;
pub mod replace;
pub mod report;
pub mod runner;
pub mod tree;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::codemod::{
        Codemod, RunCodemodError, RunCodemodHooks, RunCodemodOkResult, RunCodemodOptions,
        RunCodemodResult, TargetFilter, group_results, run_codemod, run_codemods,
    };
    pub use crate::config::{CodemodConfig, HostingKind, RunConfig, StageConfig};
    pub use crate::diff::{DiffSummary, colorized_diff, unified_diff};
    pub use crate::error::{CodemodError, Result};
    pub use crate::git::{Branch, GitContext, GitError, Repository, RepositoryToClone};
    pub use crate::github::{GhCli, GitHubApi, Hosting, NewPullRequest};
    pub use crate::lang::Language;
    pub use crate::modifications::{Modifications, ModificationsReport};
    pub use crate::process::{CommandOutput, CommandRunner, SystemCommandRunner};
    pub use crate::publish::{Publication, PublishOutcome, publish_all, publish_codemod_result};
    pub use crate::replace::{
        FindAndReplaceConfig, Replacement, Transformer, find_and_replace, find_and_replace_config,
        find_and_replace_config_modifications,
    };
    pub use crate::report::{Reporter, SilentReporter, TracingReporter};
    pub use crate::runner::{CodemodOutcome, CodemodRunner, RunnerCodemod};
    pub use crate::tree::{Edit, Node, Rule, SyntaxTree};
}

pub use prelude::*;
