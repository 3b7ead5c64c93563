//! End-to-end orchestration: prepare repositories, run codemods, publish.
//!
//! # Example
//!
//! ```rust,no_run
//! use codemod_runner::codemod::Codemod;
//! use codemod_runner::git::RepositoryToClone;
//! use codemod_runner::runner::{CodemodRunner, RunnerCodemod};
//!
//! let rename = Codemod::new("rename-logger", ["typescript"], |content, _| {
//!     Ok(content.replace("oldLog(", "newLog("))
//! });
//!
//! let outcomes = CodemodRunner::new(
//!     "/tmp/codemods",
//!     vec![RepositoryToClone::new("git@github.com:acme/web.git", ["frontend"])],
//! )
//! .run(&[RunnerCodemod::new(rename).tags(["frontend"])]);
//!
//! for (name, outcome) in &outcomes {
//!     println!("{name}: {} files, {} pull requests", outcome.results.len(), outcome.publications.len());
//! }
//! ```

use crate::codemod::{Codemod, RunCodemodHooks, RunCodemodOptions, RunCodemodResult, run_codemod};
use crate::error::{CodemodError, Result};
use crate::git::{GitContext, Repository, RepositoryToClone, clone_repositories, prepare_repositories};
use crate::github::{GhCli, Hosting};
use crate::process::{CommandRunner, SystemCommandRunner};
use crate::publish::{Publication, publish_codemod_result};
use crate::report::{Reporter, TracingReporter};
use std::collections::{BTreeMap, BTreeSet};
use std::ffi::OsString;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// A codemod together with how it is published.
#[derive(Debug, Clone)]
pub struct RunnerCodemod {
    pub codemod: Codemod,
    /// Repositories sharing a tag are selected; no tags selects all.
    pub tags: BTreeSet<String>,
    pub working_branch: String,
    pub commit_message: String,
}

impl RunnerCodemod {
    /// Wraps `codemod` with the default branch `codemods/<name>` and commit
    /// message `codemod: <name>`.
    pub fn new(codemod: Codemod) -> Self {
        let name = codemod.name().to_string();
        Self {
            codemod,
            tags: BTreeSet::new(),
            working_branch: format!("codemods/{name}"),
            commit_message: format!("codemod: {name}"),
        }
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn working_branch(mut self, branch: impl Into<String>) -> Self {
        self.working_branch = branch.into();
        self
    }

    pub fn commit_message(mut self, message: impl Into<String>) -> Self {
        self.commit_message = message.into();
        self
    }

    pub fn name(&self) -> &str {
        self.codemod.name()
    }

    /// Whether the codemod should run against `repository`.
    pub fn applies_to(&self, repository: &RepositoryToClone) -> bool {
        self.tags.is_empty() || !self.tags.is_disjoint(&repository.tags)
    }
}

/// Per-file results and per-repository publications of one codemod.
#[derive(Debug, Default)]
pub struct CodemodOutcome {
    pub results: Vec<RunCodemodResult>,
    pub publications: Vec<Publication>,
    /// Why the codemod could not run at all, e.g. a failing pre-run hook.
    pub error: Option<CodemodError>,
}

impl CodemodOutcome {
    fn failed(error: CodemodError) -> Self {
        Self {
            error: Some(error),
            ..Self::default()
        }
    }
}

/// Runs codemods against a set of repositories.
///
/// Each codemod gets its own working directory, `<workspace>/<name>`, into
/// which its repositories are cloned and reconciled onto its working branch
/// before any file is transformed. Codemods run one after another.
pub struct CodemodRunner {
    workspace: PathBuf,
    repositories: Vec<RepositoryToClone>,
    runner: Arc<dyn CommandRunner>,
    hosting: Option<Arc<dyn Hosting>>,
    reporter: Arc<dyn Reporter>,
    dry: bool,
}

impl CodemodRunner {
    pub fn new(workspace: impl Into<PathBuf>, repositories: Vec<RepositoryToClone>) -> Self {
        Self {
            workspace: workspace.into(),
            repositories,
            runner: Arc::new(SystemCommandRunner),
            hosting: None,
            reporter: Arc::new(TracingReporter),
            dry: false,
        }
    }

    /// Sets the process runner. Unless a hosting is set, `gh` runs through it too.
    pub fn runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn hosting(mut self, hosting: Arc<dyn Hosting>) -> Self {
        self.hosting = Some(hosting);
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Transform without writing files or publishing.
    pub fn dry_run(mut self) -> Self {
        self.dry = true;
        self
    }

    fn context(&self) -> GitContext {
        let hosting: Arc<dyn Hosting> = match &self.hosting {
            Some(hosting) => Arc::clone(hosting),
            None => Arc::new(GhCli::new(Arc::clone(&self.runner))),
        };
        GitContext::new(Arc::clone(&self.runner), hosting)
    }

    /// Runs every codemod in order and returns their outcomes by name.
    ///
    /// A codemod that cannot run is reported and recorded in its outcome's
    /// `error`; the codemods after it still run.
    pub fn run(&self, codemods: &[RunnerCodemod]) -> BTreeMap<String, CodemodOutcome> {
        let context = self.context();
        let mut outcomes = BTreeMap::new();
        for codemod in codemods {
            let outcome = self.run_one(codemod, &context).unwrap_or_else(|e| {
                self.reporter.codemod_failed(codemod.name(), &e);
                CodemodOutcome::failed(e)
            });
            outcomes.insert(codemod.name().to_string(), outcome);
        }
        outcomes
    }

    fn run_one(&self, codemod: &RunnerCodemod, context: &GitContext) -> Result<CodemodOutcome> {
        let started = Instant::now();
        let work_dir = self.workspace.join(codemod.name());
        let selected: Vec<RepositoryToClone> = self
            .repositories
            .iter()
            .filter(|r| codemod.applies_to(r))
            .cloned()
            .collect();
        info!(codemod = codemod.name(), repositories = selected.len(), "preparing repositories");

        let cloned = clone_repositories(&selected, &work_dir, context, self.reporter.as_ref())?;
        let mut prepared: Vec<Repository> =
            prepare_repositories(cloned, &codemod.working_branch, self.reporter.as_ref());

        let prepared_names: BTreeSet<OsString> = prepared.iter().map(|r| OsString::from(r.name())).collect();
        let hooks = RunCodemodHooks::new().target_filtering(move |relative| {
            relative
                .components()
                .next()
                .is_some_and(|root| prepared_names.contains(root.as_os_str()))
        });
        let options = RunCodemodOptions::new()
            .hooks(hooks)
            .dry(self.dry)
            .root_paths(prepared.iter().map(|r| r.path().to_path_buf()))
            .reporter(Arc::clone(&self.reporter));

        let results = run_codemod(&codemod.codemod, &work_dir, &options)?;
        let publications = if self.dry {
            Vec::new()
        } else {
            publish_codemod_result(codemod, &results, &mut prepared, self.reporter.as_ref())
        };

        info!(
            codemod = codemod.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "codemod run complete"
        );
        Ok(CodemodOutcome {
            results,
            publications,
            error: None,
        })
    }
}

impl std::fmt::Debug for CodemodRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodemodRunner")
            .field("workspace", &self.workspace)
            .field("repositories", &self.repositories)
            .field("dry", &self.dry)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> Codemod {
        Codemod::new(name, ["typescript"], |c, _| Ok(c.to_string()))
    }

    #[test]
    fn test_defaults_derive_from_name() {
        let codemod = RunnerCodemod::new(noop("rename-logger"));

        assert_eq!(codemod.working_branch, "codemods/rename-logger");
        assert_eq!(codemod.commit_message, "codemod: rename-logger");
    }

    #[test]
    fn test_tag_selection() {
        let web = RepositoryToClone::new("git@github.com:acme/web.git", ["frontend"]);
        let api = RepositoryToClone::new("git@github.com:acme/api.git", ["backend"]);

        let untagged = RunnerCodemod::new(noop("all"));
        let frontend = RunnerCodemod::new(noop("fe")).tags(["frontend", "design"]);

        assert!(untagged.applies_to(&web) && untagged.applies_to(&api));
        assert!(frontend.applies_to(&web));
        assert!(!frontend.applies_to(&api));
    }
}
