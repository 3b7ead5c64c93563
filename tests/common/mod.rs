//! Scripted git, hosting and reporter fakes shared by the integration tests.

#![allow(dead_code)]

use codemod_runner::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
struct FakeRepo {
    branches: Vec<String>,
    current: String,
}

#[derive(Default)]
struct GitState {
    /// Files written into a repository when it is cloned, by address.
    seeds: BTreeMap<String, Vec<(PathBuf, String)>>,
    /// Addresses whose clone fails.
    broken: BTreeSet<String>,
    /// Working branches already pushed to the remote.
    remote_branches: BTreeSet<String>,
    repos: BTreeMap<String, FakeRepo>,
    log: Vec<(String, String)>,
}

/// In-memory git keyed by the repository directory name.
#[derive(Clone, Default)]
pub struct FakeGit(Arc<Mutex<GitState>>);

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Files the clone of `address` will contain.
    pub fn seed(&self, address: &str, files: &[(&str, &str)]) -> &Self {
        self.0.lock().unwrap().seeds.insert(
            address.to_string(),
            files.iter().map(|(p, c)| (PathBuf::from(p), c.to_string())).collect(),
        );
        self
    }

    pub fn break_clone(&self, address: &str) -> &Self {
        self.0.lock().unwrap().broken.insert(address.to_string());
        self
    }

    pub fn remote_branch(&self, branch: &str) -> &Self {
        self.0.lock().unwrap().remote_branches.insert(branch.to_string());
        self
    }

    /// Every `git` invocation as `(repository directory, "args joined")`.
    pub fn log(&self) -> Vec<(String, String)> {
        self.0.lock().unwrap().log.clone()
    }

    /// Invocations in `repo` whose arguments start with `prefix`.
    pub fn calls(&self, repo: &str, prefix: &str) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|(r, args)| r == repo && args.starts_with(prefix))
            .map(|(_, args)| args)
            .collect()
    }

    pub fn current_branch(&self, repo: &str) -> Option<String> {
        self.0.lock().unwrap().repos.get(repo).map(|r| r.current.clone())
    }
}

impl CommandRunner for FakeGit {
    fn run(&self, cwd: &Path, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        assert_eq!(program, "git", "only git is scripted");
        let mut state = self.0.lock().unwrap();

        if let ["clone", address, name] = args {
            state.log.push((name.to_string(), args.join(" ")));
            if state.broken.contains(*address) {
                return Ok(CommandOutput::failed("fatal: repository not found"));
            }
            let root = cwd.join(name);
            fs::create_dir_all(&root)?;
            for (path, content) in state.seeds.get(*address).cloned().unwrap_or_default() {
                let full = root.join(path);
                if let Some(parent) = full.parent() {
                    fs::create_dir_all(parent)?;
                }
                fs::write(full, content)?;
            }
            state.repos.insert(
                name.to_string(),
                FakeRepo {
                    branches: vec!["main".into()],
                    current: "main".into(),
                },
            );
            return Ok(CommandOutput::ok(""));
        }

        let name = cwd
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        state.log.push((name.clone(), args.join(" ")));
        let remote_heads: String = state
            .remote_branches
            .iter()
            .map(|b| format!("0000000\trefs/heads/{b}\n"))
            .collect();
        let Some(repo) = state.repos.get_mut(&name) else {
            return Ok(CommandOutput::failed("fatal: not a git repository"));
        };

        let output = match args {
            ["branch"] => CommandOutput::ok(
                repo.branches
                    .iter()
                    .map(|b| if *b == repo.current { format!("* {b}\n") } else { format!("  {b}\n") })
                    .collect::<String>(),
            ),
            ["branch", "-D", branch] => {
                repo.branches.retain(|b| b != branch);
                CommandOutput::ok("")
            }
            ["checkout", "--detach", _] => {
                repo.current = String::new();
                CommandOutput::ok("")
            }
            ["checkout", "-b", branch, ..] => {
                if !repo.branches.iter().any(|b| b == branch) {
                    repo.branches.push(branch.to_string());
                }
                repo.current = branch.to_string();
                CommandOutput::ok("")
            }
            ["checkout", branch] => {
                if repo.branches.iter().any(|b| b == branch) {
                    repo.current = branch.to_string();
                    CommandOutput::ok("")
                } else {
                    CommandOutput::failed(format!("error: pathspec '{branch}' did not match"))
                }
            }
            ["remote"] => CommandOutput::ok("origin\n"),
            ["ls-remote", "--heads"] => CommandOutput::ok(remote_heads),
            _ => CommandOutput::ok(""),
        };
        Ok(output)
    }
}

/// Hosting whose default branch is always `main`.
#[derive(Default)]
pub struct FakeHosting {
    /// `(address, head, title)` of every pull request opened.
    pub opened: Mutex<Vec<(String, String, String)>>,
    /// Addresses that already have an open pull request.
    pub already_open: BTreeSet<String>,
}

impl FakeHosting {
    pub fn with_open_pull_request(address: &str) -> Self {
        Self {
            already_open: BTreeSet::from([address.to_string()]),
            ..Self::default()
        }
    }

    pub fn opened(&self) -> Vec<(String, String, String)> {
        self.opened.lock().unwrap().clone()
    }
}

impl Hosting for FakeHosting {
    fn default_branch(&self, _address: &str, _path: &Path) -> Result<String> {
        Ok("main".into())
    }

    fn create_pull_request(&self, address: &str, _path: &Path, request: &NewPullRequest) -> Result<String> {
        if self.already_open.contains(address) {
            return Err(CodemodError::GitHub {
                message: "a pull request already exists".into(),
            });
        }
        let mut opened = self.opened.lock().unwrap();
        opened.push((address.to_string(), request.head.clone(), request.title.clone()));
        Ok(format!("https://github.com/acme/pull/{}", opened.len()))
    }
}

/// Records reporter events as short strings.
#[derive(Default)]
pub struct RecordingReporter(Mutex<Vec<String>>);

impl RecordingReporter {
    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    fn push(&self, event: String) {
        self.0.lock().unwrap().push(event);
    }
}

impl Reporter for RecordingReporter {
    fn targets_found(&self, codemod: &str, count: usize) {
        self.push(format!("targets {codemod} {count}"));
    }

    fn codemod_failed(&self, codemod: &str, _error: &CodemodError) {
        self.push(format!("codemod_failed {codemod}"));
    }

    fn nothing_transformed(&self, codemod: &str) {
        self.push(format!("nothing {codemod}"));
    }

    fn repository_failed(&self, error: &GitError) {
        self.push(format!("repository_failed {}", error.address()));
    }

    fn pull_request_created(&self, repository: &str, _url: &str) {
        self.push(format!("pr_created {repository}"));
    }

    fn pull_request_already_open(&self, repository: &str) {
        self.push(format!("pr_open {repository}"));
    }
}
