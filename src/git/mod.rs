//! Git working copies and the branch reconciliation state machine.
//!
//! A [`Repository`] is one working copy. All of its operations shell out to
//! `git` through a [`CommandRunner`] and ask a [`Hosting`] for the default
//! branch, and all of them return a [`GitError`] instead of panicking.
//!
//! Before a codemod runs, each repository goes through
//! [`Repository::prepare_for_update`]: check out the working branch, discard
//! local noise, fetch, and rebase onto the default branch, recreating the
//! working branch from scratch when the rebase is not possible.
//!
//! # Example
//!
//! ```rust,no_run
//! use codemod_runner::git::Repository;
//! use std::path::Path;
//!
//! let mut repo = Repository::from_address_and_cwd("git@github.com:acme/web.git", Path::new("/tmp/work"), [] as [&str; 0])
//!     .expect("address has a name");
//! repo.clone_repository()?;
//! repo.prepare_for_update("codemods/rename-logger")?;
//! // ... run codemods ...
//! repo.commit("codemod: rename logger")?;
//! repo.push()?;
//! # Ok::<(), codemod_runner::git::GitError>(())
//! ```

mod branch;
mod error;
mod prepare;
mod repository;

pub use branch::Branch;
pub use error::{Cause, GitError};
pub use prepare::{RepositoryToClone, clone_repositories, prepare_repositories};
pub use repository::Repository;

use crate::github::{GhCli, Hosting};
use crate::process::{CommandRunner, SystemCommandRunner};
use std::sync::Arc;

/// The external collaborators a repository works through.
#[derive(Clone)]
pub struct GitContext {
    pub runner: Arc<dyn CommandRunner>,
    pub hosting: Arc<dyn Hosting>,
}

impl GitContext {
    pub fn new(runner: Arc<dyn CommandRunner>, hosting: Arc<dyn Hosting>) -> Self {
        Self { runner, hosting }
    }
}

impl Default for GitContext {
    /// System `git` plus the `gh` CLI.
    fn default() -> Self {
        let runner: Arc<dyn CommandRunner> = Arc::new(SystemCommandRunner);
        let hosting = Arc::new(GhCli::new(Arc::clone(&runner)));
        Self { runner, hosting }
    }
}

impl std::fmt::Debug for GitContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitContext").finish_non_exhaustive()
    }
}
