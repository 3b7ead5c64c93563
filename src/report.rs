//! Progress reporting for codemod runs.
//!
//! Runs never print directly; they emit events through a [`Reporter`].
//! [`TracingReporter`] turns them into `tracing` events and
//! [`SilentReporter`] drops them.

use crate::error::CodemodError;
use crate::git::GitError;
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

/// Observer for codemod, repository and publishing events.
///
/// Every method defaults to doing nothing.
pub trait Reporter: Send + Sync {
    /// Targets were selected for a codemod.
    fn targets_found(&self, _codemod: &str, _count: usize) {}

    /// A file was transformed with changes.
    fn file_transformed(&self, _codemod: &str, _path: &Path, _written: bool) {}

    /// Reading, transforming or writing a file failed.
    fn file_failed(&self, _codemod: &str, _path: &Path, _error: &CodemodError) {}

    /// A codemod finished processing its targets.
    fn codemod_finished(&self, _codemod: &str, _elapsed: Duration) {}

    /// A codemod could not run at all; later codemods still do.
    fn codemod_failed(&self, _codemod: &str, _error: &CodemodError) {}

    /// A codemod produced no changes, so nothing will be published.
    fn nothing_transformed(&self, _codemod: &str) {}

    /// A repository dropped out of the run while cloning or preparing.
    fn repository_failed(&self, _error: &GitError) {}

    /// Committing a repository's changes failed.
    fn commit_failed(&self, _error: &GitError) {}

    /// Pushing a repository's working branch failed.
    fn push_failed(&self, _error: &GitError) {}

    /// A pull request was opened.
    fn pull_request_created(&self, _repository: &str, _url: &str) {}

    /// Opening a pull request failed, most likely because one is already open.
    fn pull_request_already_open(&self, _repository: &str) {}
}

/// Reports through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn targets_found(&self, codemod: &str, count: usize) {
        let noun = if count == 1 { "file" } else { "files" };
        info!(codemod, count, "targeting {count} {noun} to transform");
    }

    fn file_transformed(&self, codemod: &str, path: &Path, written: bool) {
        info!(codemod, path = %path.display(), written, "transformed file");
    }

    fn file_failed(&self, codemod: &str, path: &Path, error: &CodemodError) {
        error!(codemod, path = %path.display(), %error, "failed to transform file");
    }

    fn codemod_finished(&self, codemod: &str, elapsed: Duration) {
        let elapsed_ms = elapsed.as_millis() as u64;
        info!(codemod, elapsed_ms, "finished codemod in {elapsed_ms}ms");
    }

    fn codemod_failed(&self, codemod: &str, error: &CodemodError) {
        error!(codemod, %error, "codemod failed");
    }

    fn nothing_transformed(&self, codemod: &str) {
        info!(codemod, "nothing transformed");
    }

    fn repository_failed(&self, error: &GitError) {
        error!(repository = error.address(), %error, "skipping repository");
    }

    fn commit_failed(&self, error: &GitError) {
        error!(repository = error.address(), %error, "failed to commit changes");
    }

    fn push_failed(&self, error: &GitError) {
        error!(repository = error.address(), %error, "failed to push changes");
    }

    fn pull_request_created(&self, repository: &str, url: &str) {
        info!(repository, url, "pull request created");
    }

    fn pull_request_already_open(&self, repository: &str) {
        warn!(repository, "transformation already pushed, pull request not created");
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {}
