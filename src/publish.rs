//! Publishing codemod results as pull requests.
//!
//! After a codemod has run, every repository holding a changed file is
//! committed, pushed and given a pull request. A push failure stops that
//! repository before the pull request; a failure to open the pull request is
//! taken to mean one is already open for the branch.

use crate::codemod::{RunCodemodResult, group_results};
use crate::error::{CodemodError, Result};
use crate::git::{GitError, Repository};
use crate::github::NewPullRequest;
use crate::report::Reporter;
use crate::runner::RunnerCodemod;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// What happened to one repository.
#[derive(Debug)]
pub enum PublishOutcome {
    PullRequestCreated { url: String },
    /// Opening the pull request failed; re-runs against an open pull request
    /// land here.
    AlreadyOpen,
    CommitFailed(GitError),
    PushFailed(GitError),
}

/// Publishing outcome for one repository.
#[derive(Debug)]
pub struct Publication {
    pub repository: String,
    pub outcome: PublishOutcome,
}

impl Publication {
    pub fn is_published(&self) -> bool {
        matches!(
            self.outcome,
            PublishOutcome::PullRequestCreated { .. } | PublishOutcome::AlreadyOpen
        )
    }
}

/// Publishes one codemod's results.
///
/// Only repositories whose path is the root of a changed file are touched.
/// Returns an empty list, after reporting it, when nothing changed.
pub fn publish_codemod_result(
    codemod: &RunnerCodemod,
    results: &[RunCodemodResult],
    repositories: &mut [Repository],
    reporter: &dyn Reporter,
) -> Vec<Publication> {
    let (success, _) = group_results(results.iter().map(|r| r.as_ref()));
    let changed_roots: BTreeSet<&Path> = success
        .iter()
        .filter(|r| r.has_changes)
        .map(|r| r.root.as_path())
        .collect();
    if changed_roots.is_empty() {
        reporter.nothing_transformed(codemod.name());
        return Vec::new();
    }

    repositories
        .par_iter_mut()
        .filter(|repository| changed_roots.contains(repository.path()))
        .map(|repository| Publication {
            repository: repository.address().to_string(),
            outcome: publish_repository(codemod, repository, reporter),
        })
        .collect()
}

fn publish_repository(codemod: &RunnerCodemod, repository: &mut Repository, reporter: &dyn Reporter) -> PublishOutcome {
    if let Err(e) = repository.commit(&codemod.commit_message) {
        reporter.commit_failed(&e);
        return PublishOutcome::CommitFailed(e);
    }
    if let Err(e) = repository.push() {
        reporter.push_failed(&e);
        return PublishOutcome::PushFailed(e);
    }

    let head = codemod.working_branch.clone();
    match repository.create_pull_request(&NewPullRequest::new(&codemod.commit_message, head)) {
        Ok(url) => {
            reporter.pull_request_created(repository.address(), &url);
            PublishOutcome::PullRequestCreated { url }
        }
        Err(_) => {
            reporter.pull_request_already_open(repository.address());
            PublishOutcome::AlreadyOpen
        }
    }
}

/// Publishes the results of several codemods, in name order.
///
/// Every result set must belong to one of `codemods`; an unknown name is an
/// invariant violation.
pub fn publish_all(
    codemods: &[RunnerCodemod],
    results: &BTreeMap<String, Vec<RunCodemodResult>>,
    repositories: &mut [Repository],
    reporter: &dyn Reporter,
) -> Result<BTreeMap<String, Vec<Publication>>> {
    let mut publications = BTreeMap::new();
    for (name, codemod_results) in results {
        let codemod = codemods
            .iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| CodemodError::Invariant(format!("no codemod named '{name}' to publish results for")))?;
        let published = publish_codemod_result(codemod, codemod_results, repositories, reporter);
        publications.insert(name.clone(), published);
    }
    Ok(publications)
}
