//! A single git working copy.

use super::GitContext;
use super::branch::{Branch, parse_branch_list, parse_remote_heads};
use super::error::GitError;
use crate::github::NewPullRequest;
use crate::process::CommandOutput;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A git working copy addressed by its remote.
///
/// Every mutating operation takes `&mut self`, so one repository's checkout
/// is never touched by two operations at once.
#[derive(Debug, Clone)]
pub struct Repository {
    name: String,
    address: String,
    path: PathBuf,
    tags: BTreeSet<String>,
    context: GitContext,
    current_branch: Option<Branch>,
}

impl Repository {
    /// Derives a repository from its remote address, located at `cwd/<name>`.
    ///
    /// The name is the address's last path segment without its extension
    /// (`git@github.com:acme/web.git` gives `web`). Returns `None` when no
    /// name can be derived.
    pub fn from_address_and_cwd(
        address: impl Into<String>,
        cwd: &Path,
        tags: impl IntoIterator<Item = impl Into<String>>,
    ) -> Option<Self> {
        let address = address.into();
        let name = name_from_address(&address)?;
        Some(Self {
            path: cwd.join(&name),
            name,
            address,
            tags: tags.into_iter().map(Into::into).collect(),
            context: GitContext::default(),
            current_branch: None,
        })
    }

    /// Replaces the runner and hosting collaborators.
    pub fn with_context(mut self, context: GitContext) -> Self {
        self.context = context;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Clones the repository into its path, unless the path already exists.
    pub fn clone_repository(&mut self) -> Result<(), GitError> {
        if self.path.exists() {
            debug!(repository = %self.address, "already cloned");
            return Ok(());
        }

        let clone_error = |cause: Option<super::Cause>| GitError::Clone {
            address: self.address.clone(),
            cause,
        };
        let parent = self.path.parent().unwrap_or(Path::new("."));
        fs::create_dir_all(parent).map_err(|e| clone_error(Some(Box::new(e))))?;
        let output = self
            .context
            .runner
            .run(parent, "git", &["clone", self.address.as_str(), self.name.as_str()])
            .map_err(|e| clone_error(Some(Box::new(e))))?;
        if !output.success {
            return Err(clone_error(self.command_error(&["clone"], &output).boxed()));
        }
        Ok(())
    }

    /// Local branches, as listed by `git branch`.
    pub fn branches(&self) -> Result<Vec<Branch>, GitError> {
        let output = self.git(&["branch"])?;
        Ok(parse_branch_list(&output.stdout))
    }

    /// Branches on the remote, as listed by `git ls-remote --heads`.
    pub fn remote_branches(&self) -> Result<Vec<Branch>, GitError> {
        let output = self.git(&["ls-remote", "--heads"])?;
        Ok(parse_remote_heads(&output.stdout))
    }

    /// The first configured remote, if any.
    pub fn remote_name(&self) -> Result<Option<String>, GitError> {
        let output = self.git(&["remote"])?;
        Ok(output
            .stdout
            .lines()
            .next()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(str::to_string))
    }

    /// The checked-out branch.
    ///
    /// Served from the cache when present; otherwise read from `git branch`
    /// and memoized.
    pub fn selected_branch(&mut self) -> Result<Option<Branch>, GitError> {
        if let Some(branch) = &self.current_branch {
            return Ok(Some(branch.clone()));
        }

        let selected = self.branches()?.into_iter().find(|b| b.is_selected);
        self.current_branch = selected.clone();
        Ok(selected)
    }

    /// Name of the default branch according to the hosting platform.
    pub fn main_branch_name(&self) -> Result<String, GitError> {
        self.context
            .hosting
            .default_branch(&self.address, &self.path)
            .map_err(|e| GitError::GetMainBranch {
                address: self.address.clone(),
                cause: Some(Box::new(e)),
            })
    }

    /// The local branch matching the default branch.
    pub fn main_branch(&self) -> Result<Branch, GitError> {
        let name = self.main_branch_name()?;
        self.branches()?
            .into_iter()
            .find(|b| b.name == name)
            .ok_or_else(|| GitError::GetMainBranch {
                address: self.address.clone(),
                cause: None,
            })
    }

    /// Checks out `branch_name`.
    ///
    /// Already being on the branch is a no-op, an existing local branch is
    /// checked out, and anything else (including `force_create_new`) creates
    /// the branch from the current HEAD.
    pub fn checkout_branch(&mut self, branch_name: &str, force_create_new: bool) -> Result<Branch, GitError> {
        if !force_create_new
            && let Some(current) = self.selected_branch().map_err(|e| self.checkout_error(branch_name, e))?
            && current.name == branch_name
        {
            return Ok(current);
        }

        let exists = self
            .branches()
            .map_err(|e| self.checkout_error(branch_name, e))?
            .iter()
            .any(|b| b.name == branch_name);
        let checkout = if exists && !force_create_new {
            self.git(&["checkout", branch_name])
        } else {
            self.git(&["checkout", "-b", branch_name])
        };

        match checkout {
            Ok(_) => {
                let branch = Branch::new(branch_name, true);
                self.current_branch = Some(branch.clone());
                Ok(branch)
            }
            Err(e) => {
                self.current_branch = None;
                Err(self.checkout_error(branch_name, e))
            }
        }
    }

    /// Force-deletes a local branch.
    pub fn delete_branch(&mut self, branch_name: &str) -> Result<(), GitError> {
        self.current_branch = None;
        self.git(&["branch", "-D", branch_name]).map(drop)
    }

    /// Stages and hard-resets all local changes, then fetches.
    pub fn reset_and_fetch(&mut self) -> Result<(), GitError> {
        self.git(&["add", "."])?;
        self.git(&["reset", "--hard"])?;
        self.git(&["fetch"])?;
        Ok(())
    }

    /// [`reset_and_fetch`](Self::reset_and_fetch), then
    /// [`update_branch_to_latest_main`](Self::update_branch_to_latest_main).
    pub fn reset_branch(&mut self, working_branch: &str) -> Result<(), GitError> {
        self.reset_and_fetch()?;
        self.update_branch_to_latest_main(working_branch)
    }

    /// Rebases `working_branch` onto the remote default branch.
    ///
    /// When the rebase fails, or the working branch has never been pushed,
    /// the working branch is deleted and recreated from `<remote>/<main>`,
    /// never from the local default branch. Ending up on the default branch
    /// is an invariant violation.
    pub fn update_branch_to_latest_main(&mut self, working_branch: &str) -> Result<(), GitError> {
        let main = self.main_branch_name().map_err(|e| GitError::Rebase {
            address: self.address.clone(),
            cause: e.boxed(),
        })?;
        let remote = self
            .remote_name()
            .map_err(|e| GitError::Rebase {
                address: self.address.clone(),
                cause: e.boxed(),
            })?
            .ok_or_else(|| GitError::Rebase {
                address: self.address.clone(),
                cause: None,
            })?;

        let exists_in_remote = self
            .remote_branches()?
            .iter()
            .any(|b| b.name == working_branch);
        self.checkout_branch(working_branch, false)?;

        let upstream = format!("{remote}/{main}");
        let rebased = self.try_rebase(&upstream)?;
        if rebased && exists_in_remote {
            return Ok(());
        }

        debug!(
            repository = %self.address,
            branch = working_branch,
            rebased,
            exists_in_remote,
            "recreating working branch from {upstream}"
        );
        if working_branch == main {
            return Err(self.invariant("checked out branch is main branch"));
        }
        // Rebuilt from the fetched tip; the local default branch may be stale or missing.
        self.git(&["checkout", "--detach", upstream.as_str()])
            .map_err(|e| self.checkout_error(&upstream, e))?;
        // A missing branch is fine; it is recreated right after.
        let _ = self.delete_branch(working_branch);
        self.git(&["checkout", "-b", working_branch, upstream.as_str()])
            .map_err(|e| self.checkout_error(working_branch, e))?;

        self.current_branch = None;
        match self.selected_branch()? {
            None => Err(self.invariant("failed to find current branch")),
            Some(current) if current.name == main => Err(self.invariant("checked out branch is main branch")),
            Some(_) => Ok(()),
        }
    }

    /// Checks out the working branch and reconciles it with the default
    /// branch. The single entry point before any transformation runs.
    pub fn prepare_for_update(&mut self, working_branch: &str) -> Result<(), GitError> {
        self.checkout_branch(working_branch, false)?;
        self.reset_branch(working_branch)
    }

    /// Stages everything and commits. Having nothing to commit is success.
    pub fn commit(&mut self, message: &str) -> Result<(), GitError> {
        let commit_error = |e: GitError| GitError::Commit {
            address: self.address.clone(),
            cause: e.boxed(),
        };
        self.git(&["add", "."]).map_err(commit_error)?;

        let args = ["commit", "-m", message, "--no-verify"];
        let output = self.git_output(&args).map_err(commit_error)?;
        if output.success || is_nothing_to_commit(&output) {
            return Ok(());
        }
        Err(commit_error(self.command_error(&args, &output)))
    }

    /// Force-pushes the checked-out branch with upstream tracking.
    ///
    /// Refuses, without touching the network, when the checked-out branch
    /// is the default branch.
    pub fn push(&mut self) -> Result<(), GitError> {
        let address = self.address.clone();
        let push_error = |message: &str, cause: Option<super::Cause>| GitError::Push {
            address: address.clone(),
            message: message.to_string(),
            cause,
        };

        let remote = self.remote_name().map_err(|e| push_error("failed to find remote name", e.boxed()))?;
        let current = self
            .selected_branch()
            .map_err(|e| push_error("failed to find current branch", e.boxed()))?;
        let (Some(remote), Some(current)) = (remote, current) else {
            return Err(push_error("failed to find remote name", None));
        };
        let main = self.main_branch_name()?;
        if current.name == main {
            return Err(push_error("can't push to main branch", None));
        }

        self.git(&["add", "."])
            .map_err(|e| push_error("failed to stage changes", e.boxed()))?;
        self.git(&["push", "--force", "--no-verify", "--set-upstream", remote.as_str(), current.name.as_str()])
            .map_err(|e| push_error("push rejected", e.boxed()))?;
        Ok(())
    }

    /// Opens a pull request through the hosting platform.
    pub fn create_pull_request(&self, request: &NewPullRequest) -> crate::error::Result<String> {
        self.context.hosting.create_pull_request(&self.address, &self.path, request)
    }

    /// Runs `git rebase <upstream>`, aborting it on failure.
    fn try_rebase(&self, upstream: &str) -> Result<bool, GitError> {
        let output = self.git_output(&["rebase", upstream])?;
        if output.success {
            return Ok(true);
        }
        debug!(repository = %self.address, "rebase onto {upstream} failed: {}", output.message());
        // Leaves no conflict state behind; fails harmlessly when no rebase is in progress.
        let _ = self.git_output(&["rebase", "--abort"]);
        Ok(false)
    }

    /// Runs git, failing on a non-zero exit.
    fn git(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        let output = self.git_output(args)?;
        if !output.success {
            return Err(self.command_error(args, &output));
        }
        Ok(output)
    }

    /// Runs git, failing only when it cannot be started.
    fn git_output(&self, args: &[&str]) -> Result<CommandOutput, GitError> {
        self.context
            .runner
            .run(&self.path, "git", args)
            .map_err(|e| GitError::Command {
                address: self.address.clone(),
                command: format!("git {}", args.join(" ")),
                message: e.to_string(),
            })
    }

    fn command_error(&self, args: &[&str], output: &CommandOutput) -> GitError {
        GitError::Command {
            address: self.address.clone(),
            command: format!("git {}", args.join(" ")),
            message: output.message().to_string(),
        }
    }

    fn checkout_error(&self, branch: &str, cause: GitError) -> GitError {
        GitError::Checkout {
            address: self.address.clone(),
            branch: branch.to_string(),
            cause: cause.boxed(),
        }
    }

    fn invariant(&self, message: &str) -> GitError {
        GitError::Invariant {
            address: self.address.clone(),
            message: message.to_string(),
        }
    }
}

fn name_from_address(address: &str) -> Option<String> {
    let last = address.trim_end_matches('/').rsplit('/').next()?;
    let name = last.rsplit_once('.').map_or(last, |(stem, _)| stem);
    (!name.is_empty()).then(|| name.to_string())
}

fn is_nothing_to_commit(output: &CommandOutput) -> bool {
    output.stdout.contains("nothing to commit") || output.stderr.contains("nothing to commit")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CodemodError, Result as CodemodResult};
    use crate::github::Hosting;
    use crate::process::CommandRunner;
    use std::collections::BTreeMap;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// In-memory git that understands the commands the repository issues.
    #[derive(Default)]
    struct FakeGitState {
        local: Vec<String>,
        current: String,
        remote: Vec<String>,
        remote_name: String,
        rebase_fails: bool,
        dirty: bool,
        /// Start point each branch was created from; HEAD when none was given.
        bases: BTreeMap<String, String>,
        log: Vec<String>,
    }

    #[derive(Clone)]
    struct FakeGit(Arc<Mutex<FakeGitState>>);

    impl FakeGit {
        fn new(main: &str) -> Self {
            Self(Arc::new(Mutex::new(FakeGitState {
                local: vec![main.to_string()],
                current: main.to_string(),
                remote: vec![main.to_string()],
                remote_name: "origin".to_string(),
                ..Default::default()
            })))
        }

        fn state(&self) -> std::sync::MutexGuard<'_, FakeGitState> {
            self.0.lock().unwrap()
        }

        fn ran(&self, command: &str) -> bool {
            self.state().log.iter().any(|c| c == command)
        }

        fn base_of(&self, branch: &str) -> Option<String> {
            self.state().bases.get(branch).cloned()
        }
    }

    impl FakeGitState {
        fn is_remote_ref(&self, reference: &str) -> bool {
            reference
                .strip_prefix(&format!("{}/", self.remote_name))
                .is_some_and(|branch| self.remote.iter().any(|b| b == branch))
        }
    }

    impl CommandRunner for FakeGit {
        fn run(&self, _cwd: &Path, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
            let mut s = self.state();
            s.log.push(format!("{program} {}", args.join(" ")));
            let out = match args {
                ["branch"] => CommandOutput::ok(
                    s.local
                        .iter()
                        .map(|b| if *b == s.current { format!("* {b}\n") } else { format!("  {b}\n") })
                        .collect::<String>(),
                ),
                ["remote"] => CommandOutput::ok(format!("{}\n", s.remote_name)),
                ["ls-remote", "--heads"] => CommandOutput::ok(
                    s.remote
                        .iter()
                        .map(|b| format!("abc123\trefs/heads/{b}\n"))
                        .collect::<String>(),
                ),
                ["checkout", "--detach", start] => {
                    if s.is_remote_ref(start) {
                        s.current = String::new();
                        CommandOutput::ok("")
                    } else {
                        CommandOutput::failed(format!("fatal: invalid reference: {start}"))
                    }
                }
                ["checkout", "-b", name, ..] if s.local.iter().any(|b| b == name) => {
                    CommandOutput::failed(format!("fatal: a branch named '{name}' already exists"))
                }
                ["checkout", "-b", name, start] => {
                    if s.is_remote_ref(start) {
                        s.local.push(name.to_string());
                        s.bases.insert(name.to_string(), start.to_string());
                        s.current = name.to_string();
                        CommandOutput::ok("")
                    } else {
                        CommandOutput::failed(format!("fatal: invalid reference: {start}"))
                    }
                }
                ["checkout", "-b", name] => {
                    let head = s.current.clone();
                    s.local.push(name.to_string());
                    s.bases.insert(name.to_string(), head);
                    s.current = name.to_string();
                    CommandOutput::ok("")
                }
                ["checkout", name] => {
                    if s.local.iter().any(|b| b == name) {
                        s.current = name.to_string();
                        CommandOutput::ok("")
                    } else {
                        CommandOutput::failed(format!("error: pathspec '{name}' did not match"))
                    }
                }
                ["branch", "-D", name] => {
                    if s.current == *name {
                        CommandOutput::failed("error: cannot delete branch checked out")
                    } else {
                        s.local.retain(|b| b != name);
                        CommandOutput::ok("")
                    }
                }
                ["rebase", "--abort"] => CommandOutput::ok(""),
                ["rebase", _] if s.rebase_fails => CommandOutput::failed("CONFLICT (content)"),
                ["commit", ..] if !s.dirty => CommandOutput {
                    stdout: "nothing to commit, working tree clean\n".into(),
                    stderr: String::new(),
                    success: false,
                },
                ["commit", ..] => {
                    s.dirty = false;
                    CommandOutput::ok("")
                }
                ["push", .., branch] => {
                    let branch = branch.to_string();
                    if !s.remote.contains(&branch) {
                        s.remote.push(branch);
                    }
                    CommandOutput::ok("")
                }
                _ => CommandOutput::ok(""),
            };
            Ok(out)
        }
    }

    struct FixedHosting(Option<&'static str>);

    impl Hosting for FixedHosting {
        fn default_branch(&self, _address: &str, _path: &Path) -> CodemodResult<String> {
            self.0.map(str::to_string).ok_or_else(|| CodemodError::GitHub {
                message: "gh unavailable".into(),
            })
        }

        fn create_pull_request(&self, _: &str, _: &Path, _: &NewPullRequest) -> CodemodResult<String> {
            Ok(String::new())
        }
    }

    fn repository(git: &FakeGit, main: Option<&'static str>) -> Repository {
        Repository::from_address_and_cwd("git@github.com:acme/web.git", Path::new("/work"), ["frontend"])
            .unwrap()
            .with_context(GitContext::new(Arc::new(git.clone()), Arc::new(FixedHosting(main))))
    }

    #[test]
    fn test_from_address_and_cwd() {
        let repo = Repository::from_address_and_cwd("git@github.com:acme/web.git", Path::new("/work"), ["a"]).unwrap();
        assert_eq!(repo.name(), "web");
        assert_eq!(repo.path(), Path::new("/work/web"));
        assert!(repo.tags().contains("a"));

        let dotted = Repository::from_address_and_cwd("https://host/acme/my.repo.git", Path::new("/w"), [] as [&str; 0]);
        assert_eq!(dotted.unwrap().name(), "my.repo");

        let bare = Repository::from_address_and_cwd("https://host/acme/web", Path::new("/w"), [] as [&str; 0]);
        assert_eq!(bare.unwrap().name(), "web");

        assert!(Repository::from_address_and_cwd("https://host/acme/.git", Path::new("/w"), [] as [&str; 0]).is_none());
    }

    #[test]
    fn test_checkout_current_branch_is_noop() {
        let git = FakeGit::new("main");
        let mut repo = repository(&git, Some("main"));

        let branch = repo.checkout_branch("main", false).unwrap();

        assert_eq!(branch, Branch::new("main", true));
        assert!(!git.state().log.iter().any(|c| c.starts_with("git checkout")));
    }

    #[test]
    fn test_checkout_existing_and_new_branches() {
        let git = FakeGit::new("main");
        git.state().local.push("feature".into());
        let mut repo = repository(&git, Some("main"));

        repo.checkout_branch("feature", false).unwrap();
        repo.checkout_branch("fresh", false).unwrap();

        assert!(git.ran("git checkout feature"));
        assert!(git.ran("git checkout -b fresh"));
        assert_eq!(repo.selected_branch().unwrap().unwrap().name, "fresh");
    }

    #[test]
    fn test_checkout_failure_names_branch_and_clears_cache() {
        let git = FakeGit::new("main");
        git.state().local.push("taken".into());
        let mut repo = repository(&git, Some("main"));

        let err = repo.checkout_branch("taken", true).unwrap_err();

        assert!(matches!(&err, GitError::Checkout { branch, .. } if branch == "taken"));
        assert_eq!(repo.selected_branch().unwrap().unwrap().name, "main");
    }

    #[test]
    fn test_reconcile_clean_rebase_keeps_branch() {
        let git = FakeGit::new("main");
        {
            let mut s = git.state();
            s.local.push("codemods/x".into());
            s.remote.push("codemods/x".into());
        }
        let mut repo = repository(&git, Some("main"));

        repo.prepare_for_update("codemods/x").unwrap();

        assert!(git.ran("git rebase origin/main"));
        assert!(!git.state().log.iter().any(|c| c.starts_with("git branch -D")));
        assert_eq!(git.state().current, "codemods/x");
    }

    #[test]
    fn test_reconcile_conflicting_rebase_recreates_branch() {
        let git = FakeGit::new("main");
        {
            let mut s = git.state();
            s.local.push("codemods/x".into());
            s.remote.push("codemods/x".into());
            s.rebase_fails = true;
        }
        let mut repo = repository(&git, Some("main"));

        repo.prepare_for_update("codemods/x").unwrap();

        let log = git.state().log.clone();
        let abort = log.iter().position(|c| c == "git rebase --abort").unwrap();
        let detach = log.iter().position(|c| c == "git checkout --detach origin/main").unwrap();
        let delete = log.iter().position(|c| c == "git branch -D codemods/x").unwrap();
        let recreate = log.iter().position(|c| c == "git checkout -b codemods/x origin/main").unwrap();
        assert!(abort < detach && detach < delete && delete < recreate);
        assert_eq!(git.state().current, "codemods/x");
        assert_eq!(git.base_of("codemods/x").as_deref(), Some("origin/main"));
    }

    #[test]
    fn test_recreated_branch_ignores_stale_local_default() {
        let git = FakeGit::new("main");
        {
            let mut s = git.state();
            s.local.push("codemods/x".into());
            s.remote.push("codemods/x".into());
            s.rebase_fails = true;
        }
        let mut repo = repository(&git, Some("main"));

        repo.update_branch_to_latest_main("codemods/x").unwrap();

        assert!(!git.ran("git checkout main"));
        assert_eq!(git.base_of("codemods/x").as_deref(), Some("origin/main"));
    }

    #[test]
    fn test_recreated_branch_without_local_default() {
        // The host renamed the default branch after the workspace was cloned.
        let git = FakeGit::new("master");
        {
            let mut s = git.state();
            s.remote = vec!["main".into(), "codemods/x".into()];
            s.local.push("codemods/x".into());
            s.rebase_fails = true;
        }
        let mut repo = repository(&git, Some("main"));

        repo.prepare_for_update("codemods/x").unwrap();

        assert!(!git.state().log.iter().any(|c| c == "git checkout -b main"));
        assert!(!git.state().local.contains(&"main".to_string()));
        assert_eq!(git.base_of("codemods/x").as_deref(), Some("origin/main"));
        assert_eq!(git.state().current, "codemods/x");
    }

    #[test]
    fn test_reconcile_unpushed_branch_is_recreated() {
        let git = FakeGit::new("main");
        let mut repo = repository(&git, Some("main"));

        repo.prepare_for_update("codemods/new").unwrap();

        assert!(git.ran("git branch -D codemods/new"));
        assert_eq!(git.state().current, "codemods/new");
    }

    #[test]
    fn test_reconcile_onto_main_itself_is_invariant_violation() {
        let git = FakeGit::new("main");
        git.state().rebase_fails = true;
        let mut repo = repository(&git, Some("main"));

        let err = repo.update_branch_to_latest_main("main").unwrap_err();

        assert!(err.is_invariant());
    }

    #[test]
    fn test_reconcile_without_default_branch_is_rebase_error() {
        let git = FakeGit::new("main");
        let mut repo = repository(&git, None);

        let err = repo.update_branch_to_latest_main("codemods/x").unwrap_err();

        assert!(matches!(err, GitError::Rebase { cause: Some(_), .. }));
    }

    #[test]
    fn test_push_refuses_default_branch_without_network() {
        let git = FakeGit::new("main");
        let mut repo = repository(&git, Some("main"));

        let err = repo.push().unwrap_err();

        assert!(matches!(&err, GitError::Push { message, .. } if message.contains("main branch")));
        assert!(!git.state().log.iter().any(|c| c.starts_with("git push")));
    }

    #[test]
    fn test_push_working_branch() {
        let git = FakeGit::new("main");
        let mut repo = repository(&git, Some("main"));
        repo.checkout_branch("codemods/x", false).unwrap();

        repo.push().unwrap();

        assert!(git.ran("git push --force --no-verify --set-upstream origin codemods/x"));
    }

    #[test]
    fn test_commit_tolerates_nothing_to_commit() {
        let git = FakeGit::new("main");
        let mut repo = repository(&git, Some("main"));

        repo.commit("codemod: noop").unwrap();
        git.state().dirty = true;
        repo.commit("codemod: real").unwrap();

        assert!(git.ran("git commit -m codemod: real --no-verify"));
    }

    #[test]
    fn test_main_branch() {
        let git = FakeGit::new("trunk");
        let repo = repository(&git, Some("trunk"));
        assert_eq!(repo.main_branch().unwrap(), Branch::new("trunk", true));

        let missing = repository(&git, Some("main"));
        assert!(matches!(missing.main_branch(), Err(GitError::GetMainBranch { cause: None, .. })));
    }

    #[test]
    fn test_clone_skips_existing_path() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("web")).unwrap();
        let git = FakeGit::new("main");
        let mut repo = Repository::from_address_and_cwd("git@github.com:acme/web.git", dir.path(), [] as [&str; 0])
            .unwrap()
            .with_context(GitContext::new(Arc::new(git.clone()), Arc::new(FixedHosting(Some("main")))));

        repo.clone_repository().unwrap();

        assert!(git.state().log.is_empty());
    }
}
