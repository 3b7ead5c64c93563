//! Serializable run configuration.
//!
//! A run configuration lists the repositories to work on and the declarative
//! codemods to run against them.
//!
//! # Example YAML
//!
//! ```yaml
//! workspace: /tmp/codemods
//! hosting: gh
//! repositories:
//!   - address: git@github.com:acme/web.git
//!     tags: [frontend]
//! codemods:
//!   - name: rename-logger
//!     languages: [typescript]
//!     tags: [frontend]
//!     branch: chore/rename-logger
//!     commit_message: "chore: rename logger"
//!     include: ["src/**"]
//!     exclude: ["**/*.spec.ts"]
//!     stages:
//!       - query: '((call_expression function: (identifier) @fn) @call (#eq? @fn "oldLog"))'
//!         capture: call
//!         pattern: "oldLog($$$ARGS)"
//!         replace: "newLog($$$ARGS)"
//! ```

use crate::codemod::{Codemod, TargetFilter};
use crate::error::{CodemodError, Result};
use crate::git::RepositoryToClone;
use crate::github::{GhCli, GitHubApi, Hosting};
use crate::lang;
use crate::process::CommandRunner;
use crate::replace::FindAndReplaceConfig;
use crate::runner::RunnerCodemod;
use crate::tree::Rule;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where pull requests are opened.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HostingKind {
    /// The `gh` command line client.
    #[default]
    Gh,
    /// The GitHub REST API, authenticated with `GITHUB_TOKEN`.
    GithubApi,
}

/// One find-and-replace stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Tree-sitter query selecting the nodes to replace.
    pub query: String,

    /// Only nodes bound to this capture are replaced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<String>,

    /// Meta-variable pattern matched against each node's text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,

    /// Replacement template; may reference the pattern's meta-variables.
    pub replace: String,
}

impl StageConfig {
    fn to_stage(&self) -> FindAndReplaceConfig {
        let mut rule = Rule::new(&self.query);
        if let Some(capture) = &self.capture {
            rule = rule.capture(capture);
        }
        if let Some(pattern) = &self.pattern {
            rule = rule.pattern(pattern);
        }
        FindAndReplaceConfig::new(rule, self.replace.as_str())
    }
}

/// A declarative codemod.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodemodConfig {
    pub name: String,

    #[serde(default)]
    pub languages: Vec<String>,

    /// Repositories sharing one of these tags are selected; none selects all.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Working branch; defaults to `codemods/<name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    /// Commit message and pull request title; defaults to `codemod: <name>`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commit_message: Option<String>,

    /// Globs, relative to each repository, that targets must match.
    #[serde(default)]
    pub include: Vec<String>,

    /// Globs, relative to each repository, that exclude targets.
    #[serde(default)]
    pub exclude: Vec<String>,

    pub stages: Vec<StageConfig>,
}

impl CodemodConfig {
    /// Checks languages and queries without touching any file.
    ///
    /// Every language must be known, and every stage's query must compile
    /// under at least one declared language.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(CodemodError::InvalidConfig("codemod name is empty".into()));
        }
        if self.stages.is_empty() {
            return Err(CodemodError::InvalidConfig(format!("codemod '{}' has no stages", self.name)));
        }

        let mut languages = Vec::new();
        for name in &self.languages {
            let language = lang::lookup(name).ok_or_else(|| {
                CodemodError::InvalidConfig(format!("codemod '{}' declares unknown language '{name}'", self.name))
            })?;
            languages.push(language);
        }

        for (index, stage) in self.stages.iter().enumerate() {
            if !languages.is_empty() && !languages.iter().any(|l| l.query(&stage.query).is_ok()) {
                return Err(CodemodError::InvalidConfig(format!(
                    "codemod '{}' stage {}: query does not compile for {}",
                    self.name,
                    index + 1,
                    self.languages.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Builds the runnable codemod.
    pub fn to_runner_codemod(&self) -> Result<RunnerCodemod> {
        self.validate()?;

        let stages = self.stages.iter().map(StageConfig::to_stage).collect();
        let mut codemod = Codemod::from_stages(&self.name, &self.languages, stages);
        if !self.include.is_empty() || !self.exclude.is_empty() {
            let filter = TargetFilter::new(self.include.as_slice(), self.exclude.as_slice())?;
            codemod = codemod.target_filtering(move |relative| filter.is_match(relative));
        }

        let mut runnable = RunnerCodemod::new(codemod).tags(&self.tags);
        if let Some(branch) = &self.branch {
            runnable = runnable.working_branch(branch);
        }
        if let Some(message) = &self.commit_message {
            runnable = runnable.commit_message(message);
        }
        Ok(runnable)
    }
}

/// The top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Directory holding one working directory per codemod.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace: Option<PathBuf>,

    #[serde(default)]
    pub hosting: HostingKind,

    #[serde(default)]
    pub repositories: Vec<RepositoryToClone>,

    pub codemods: Vec<CodemodConfig>,
}

impl RunConfig {
    /// Load config from a YAML file.
    pub fn from_yaml(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            CodemodError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config file {}: {}", path.as_ref().display(), e),
            ))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Parse config from YAML text.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)
            .map_err(|e| CodemodError::InvalidConfig(format!("Failed to parse YAML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects duplicate codemod names and invalid codemods.
    pub fn validate(&self) -> Result<()> {
        let mut names = BTreeSet::new();
        for codemod in &self.codemods {
            if !names.insert(codemod.name.as_str()) {
                return Err(CodemodError::InvalidConfig(format!("duplicate codemod name '{}'", codemod.name)));
            }
            codemod.validate()?;
        }
        Ok(())
    }

    /// The configured workspace, else `codemods` under the system temp dir.
    pub fn workspace(&self) -> PathBuf {
        self.workspace
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("codemods"))
    }

    /// Builds every configured codemod, in file order.
    pub fn runner_codemods(&self) -> Result<Vec<RunnerCodemod>> {
        self.codemods.iter().map(CodemodConfig::to_runner_codemod).collect()
    }

    /// Builds the configured hosting. `gh` runs through `runner`.
    pub fn hosting(&self, runner: Arc<dyn CommandRunner>) -> Result<Arc<dyn Hosting>> {
        Ok(match self.hosting {
            HostingKind::Gh => Arc::new(GhCli::new(runner)),
            HostingKind::GithubApi => Arc::new(GitHubApi::from_env()?),
        })
    }
}
