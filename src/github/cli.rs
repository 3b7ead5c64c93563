//! Hosting through the `gh` CLI.

use super::{Hosting, NewPullRequest};
use crate::error::{CodemodError, Result};
use crate::process::{CommandRunner, SystemCommandRunner};
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RepoView {
    default_branch_ref: BranchRef,
}

#[derive(Debug, Deserialize)]
struct BranchRef {
    name: String,
}

/// Runs `gh` inside the repository checkout, relying on its own auth.
#[derive(Clone)]
pub struct GhCli {
    runner: Arc<dyn CommandRunner>,
}

impl GhCli {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn gh(&self, path: &Path, args: &[&str]) -> Result<String> {
        let output = self.runner.run(path, "gh", args)?;
        if !output.success {
            return Err(CodemodError::GitHub {
                message: format!("gh {} failed: {}", args.join(" "), output.message()),
            });
        }
        Ok(output.stdout)
    }
}

impl Default for GhCli {
    fn default() -> Self {
        Self::new(Arc::new(SystemCommandRunner))
    }
}

impl std::fmt::Debug for GhCli {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GhCli").finish_non_exhaustive()
    }
}

impl Hosting for GhCli {
    fn default_branch(&self, _address: &str, path: &Path) -> Result<String> {
        let stdout = self.gh(path, &["repo", "view", "--json", "defaultBranchRef"])?;
        let view: RepoView = serde_json::from_str(&stdout)?;
        Ok(view.default_branch_ref.name)
    }

    fn create_pull_request(&self, _address: &str, path: &Path, request: &NewPullRequest) -> Result<String> {
        let mut args = vec!["pr", "create", "--title", request.title.as_str()];
        match &request.body {
            Some(body) => args.extend(["--body", body.as_str()]),
            None => args.push("--fill"),
        }
        let stdout = self.gh(path, &args)?;
        Ok(stdout.trim().to_string())
    }
}
