//! Code hosting integration.
//!
//! The repository state machine needs two things from the hosting platform:
//! the repository's default branch, and a way to open a pull request. Both go
//! through the [`Hosting`] trait. [`GhCli`] drives the `gh` CLI and is the
//! default; [`GitHubApi`] talks to the REST API through octocrab.
//!
//! # Example
//!
//! ```rust,no_run
//! use codemod_runner::github::{GhCli, Hosting};
//! use std::path::Path;
//!
//! let gh = GhCli::default();
//! let branch = gh.default_branch("git@github.com:acme/web.git", Path::new("./web"))?;
//! println!("default branch: {branch}");
//! # Ok::<(), codemod_runner::error::CodemodError>(())
//! ```

mod api;
mod cli;

pub use api::GitHubApi;
pub use cli::GhCli;

use crate::error::Result;
use std::path::Path;

/// A pull request to open from a pushed working branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPullRequest {
    pub title: String,
    /// Branch holding the changes.
    pub head: String,
    pub body: Option<String>,
}

impl NewPullRequest {
    pub fn new(title: impl Into<String>, head: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            head: head.into(),
            body: None,
        }
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Hosting platform operations.
///
/// Both operations may fail; callers turn failures into their own error
/// values rather than aborting.
pub trait Hosting: Send + Sync {
    /// Name of the repository's default branch as the platform reports it.
    fn default_branch(&self, address: &str, path: &Path) -> Result<String>;

    /// Opens a pull request from `request.head` and returns its URL.
    fn create_pull_request(&self, address: &str, path: &Path, request: &NewPullRequest) -> Result<String>;
}

/// Owner and name of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSlug {
    pub owner: String,
    pub repo: String,
}

impl RepoSlug {
    /// Extracts the slug from an SSH, scp-like or HTTPS remote address.
    ///
    /// ```rust
    /// use codemod_runner::github::RepoSlug;
    ///
    /// let slug = RepoSlug::parse("git@github.com:acme/web.git").unwrap();
    /// assert_eq!((slug.owner.as_str(), slug.repo.as_str()), ("acme", "web"));
    /// ```
    pub fn parse(address: &str) -> Option<Self> {
        let trimmed = address.trim().trim_end_matches('/');
        let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);

        let path = match trimmed.split_once("://") {
            Some((_, rest)) => rest.split_once('/')?.1,
            None => trimmed.split_once(':').map_or(trimmed, |(_, path)| path),
        };

        let mut segments = path.rsplit('/').filter(|s| !s.is_empty());
        let repo = segments.next()?;
        let owner = segments.next()?;
        Some(Self {
            owner: owner.to_string(),
            repo: repo.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slug_from_remote_forms() {
        for address in [
            "git@github.com:acme/web.git",
            "https://github.com/acme/web.git",
            "https://github.com/acme/web",
            "ssh://git@github.com/acme/web.git",
            "https://github.com/acme/web/",
        ] {
            let slug = RepoSlug::parse(address).unwrap_or_else(|| panic!("no slug for {address}"));
            assert_eq!(slug.owner, "acme", "{address}");
            assert_eq!(slug.repo, "web", "{address}");
        }
    }

    #[test]
    fn test_slug_requires_owner() {
        assert!(RepoSlug::parse("web.git").is_none());
        assert!(RepoSlug::parse("https://github.com/web").is_none());
    }
}
