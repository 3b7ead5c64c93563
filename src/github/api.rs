//! Hosting through the GitHub REST API.

use super::{Hosting, NewPullRequest, RepoSlug};
use crate::error::{CodemodError, Result};
use octocrab::Octocrab;
use std::future::Future;
use std::path::Path;
use tokio::runtime::Runtime;

/// GitHub REST client driven on a private runtime.
pub struct GitHubApi {
    octocrab: Octocrab,
    runtime: Runtime,
}

impl GitHubApi {
    /// Creates a client authenticated with a personal access token.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;
        let octocrab = {
            let _guard = runtime.enter();
            Octocrab::builder()
                .personal_token(token.into())
                .build()
                .map_err(|e| CodemodError::GitHub {
                    message: format!("Failed to build GitHub client: {e}"),
                })?
        };
        Ok(Self { octocrab, runtime })
    }

    /// Creates a client using the `GITHUB_TOKEN` environment variable.
    pub fn from_env() -> Result<Self> {
        let token = std::env::var("GITHUB_TOKEN").map_err(|_| CodemodError::GitHub {
            message: "GITHUB_TOKEN environment variable not set".into(),
        })?;
        Self::new(token)
    }

    fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn slug(address: &str) -> Result<RepoSlug> {
        RepoSlug::parse(address).ok_or_else(|| CodemodError::GitHub {
            message: format!("Cannot derive owner/repository from '{address}'"),
        })
    }
}

impl std::fmt::Debug for GitHubApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GitHubApi").finish_non_exhaustive()
    }
}

impl Hosting for GitHubApi {
    fn default_branch(&self, address: &str, _path: &Path) -> Result<String> {
        let slug = Self::slug(address)?;
        let repository = self
            .block_on(self.octocrab.repos(&slug.owner, &slug.repo).get())
            .map_err(|e| CodemodError::GitHub {
                message: format!("Failed to get {}/{}: {e}", slug.owner, slug.repo),
            })?;

        repository.default_branch.ok_or_else(|| CodemodError::GitHub {
            message: format!("{}/{} reports no default branch", slug.owner, slug.repo),
        })
    }

    fn create_pull_request(&self, address: &str, path: &Path, request: &NewPullRequest) -> Result<String> {
        let slug = Self::slug(address)?;
        let base = self.default_branch(address, path)?;
        let body = request.body.clone().unwrap_or_default();

        let pull = self
            .block_on(async {
                self.octocrab
                    .pulls(&slug.owner, &slug.repo)
                    .create(&request.title, &request.head, &base)
                    .body(&body)
                    .send()
                    .await
            })
            .map_err(|e| CodemodError::GitHub {
                message: format!("Failed to create PR: {e}"),
            })?;

        Ok(pull.html_url.map(|u| u.to_string()).unwrap_or_default())
    }
}
