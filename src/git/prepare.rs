//! Cloning and preparing a set of repositories.

use super::{GitContext, Repository};
use crate::error::Result;
use crate::report::Reporter;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// A repository to clone, with the tags codemods select it by.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryToClone {
    pub address: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl RepositoryToClone {
    pub fn new(address: impl Into<String>, tags: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            address: address.into(),
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// Clones `repositories` into `location`, one directory per derived name.
///
/// Addresses that derive the same name are cloned once (first wins), and
/// directories that already exist are reused. Repositories that fail to
/// clone are reported and left out of the result.
pub fn clone_repositories(
    repositories: &[RepositoryToClone],
    location: &Path,
    context: &GitContext,
    reporter: &dyn Reporter,
) -> Result<Vec<Repository>> {
    fs::create_dir_all(location)?;

    let mut names = BTreeSet::new();
    let deduped: Vec<Repository> = repositories
        .iter()
        .filter_map(|r| Repository::from_address_and_cwd(r.address.as_str(), location, r.tags.iter().cloned()))
        .filter(|r| names.insert(r.name().to_string()))
        .map(|r| r.with_context(context.clone()))
        .collect();

    Ok(deduped
        .into_par_iter()
        .filter_map(|mut repository| match repository.clone_repository() {
            Ok(()) => Some(repository),
            Err(e) => {
                reporter.repository_failed(&e);
                None
            }
        })
        .collect())
}

/// Runs [`Repository::prepare_for_update`] on every repository in parallel.
///
/// Repositories that cannot be brought onto `working_branch` are reported
/// and left out of the result.
pub fn prepare_repositories(repositories: Vec<Repository>, working_branch: &str, reporter: &dyn Reporter) -> Vec<Repository> {
    repositories
        .into_par_iter()
        .filter_map(|mut repository| match repository.prepare_for_update(working_branch) {
            Ok(()) => Some(repository),
            Err(e) => {
                reporter.repository_failed(&e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result as CodemodResult;
    use crate::git::GitError;
    use crate::github::{Hosting, NewPullRequest};
    use crate::process::{CommandOutput, CommandRunner};
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Clones by creating the directory; addresses containing "broken" fail.
    #[derive(Default)]
    struct Cloner {
        clones: Mutex<Vec<String>>,
    }

    impl CommandRunner for Cloner {
        fn run(&self, cwd: &Path, _program: &str, args: &[&str]) -> io::Result<CommandOutput> {
            match args {
                ["clone", address, name] => {
                    self.clones.lock().unwrap().push(address.to_string());
                    if address.contains("broken") {
                        return Ok(CommandOutput::failed("fatal: repository not found"));
                    }
                    fs::create_dir_all(cwd.join(name))?;
                    Ok(CommandOutput::ok(""))
                }
                ["branch"] => Ok(CommandOutput::ok("* main\n")),
                ["remote"] => Ok(CommandOutput::ok("origin\n")),
                _ => Ok(CommandOutput::ok("")),
            }
        }
    }

    struct NoHosting;

    impl Hosting for NoHosting {
        fn default_branch(&self, _: &str, _: &Path) -> CodemodResult<String> {
            Ok("main".into())
        }

        fn create_pull_request(&self, _: &str, _: &Path, _: &NewPullRequest) -> CodemodResult<String> {
            Ok(String::new())
        }
    }

    #[derive(Default)]
    struct Failures(Mutex<Vec<String>>);

    impl Reporter for Failures {
        fn repository_failed(&self, error: &GitError) {
            self.0.lock().unwrap().push(error.address().to_string());
        }
    }

    fn context(runner: Arc<Cloner>) -> GitContext {
        GitContext::new(runner, Arc::new(NoHosting))
    }

    #[test]
    fn test_clone_dedupes_by_name() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(Cloner::default());
        let input = [
            RepositoryToClone::new("git@github.com:acme/web.git", ["frontend"]),
            RepositoryToClone::new("https://github.com/other/web.git", ["backend"]),
            RepositoryToClone::new("git@github.com:acme/api.git", [] as [&str; 0]),
        ];

        let repos = clone_repositories(&input, dir.path(), &context(runner.clone()), &Failures::default()).unwrap();

        let names: Vec<_> = repos.iter().map(Repository::name).collect();
        assert_eq!(names, vec!["web", "api"]);
        assert!(repos[0].tags().contains("frontend"));
        assert_eq!(runner.clones.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_existing_directories_are_not_recloned() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("web")).unwrap();
        let runner = Arc::new(Cloner::default());
        let input = [RepositoryToClone::new("git@github.com:acme/web.git", [] as [&str; 0])];

        let repos = clone_repositories(&input, dir.path(), &context(runner.clone()), &Failures::default()).unwrap();

        assert_eq!(repos.len(), 1);
        assert!(runner.clones.lock().unwrap().is_empty());
    }

    #[test]
    fn test_failed_clones_are_reported_and_dropped() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(Cloner::default());
        let failures = Failures::default();
        let input = [
            RepositoryToClone::new("git@github.com:acme/broken.git", [] as [&str; 0]),
            RepositoryToClone::new("git@github.com:acme/web.git", [] as [&str; 0]),
        ];

        let repos = clone_repositories(&input, dir.path(), &context(runner), &failures).unwrap();

        assert_eq!(repos.len(), 1);
        assert_eq!(repos[0].name(), "web");
        assert_eq!(*failures.0.lock().unwrap(), vec!["git@github.com:acme/broken.git"]);
    }

    #[test]
    fn test_prepare_drops_repositories_that_fail() {
        let dir = TempDir::new().unwrap();
        let runner = Arc::new(Cloner::default());
        let failures = Failures::default();
        let input = [RepositoryToClone::new("git@github.com:acme/web.git", [] as [&str; 0])];
        let repos = clone_repositories(&input, dir.path(), &context(runner), &failures).unwrap();

        let prepared = prepare_repositories(repos, "main", &failures);

        assert!(prepared.is_empty());
        assert_eq!(failures.0.lock().unwrap().len(), 1);
    }
}
