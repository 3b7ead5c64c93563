//! Named codemods and the runner that applies them to a file tree.
//!
//! A [`Codemod`] is a name, the languages it targets and a transformer from
//! file content to new content. [`run_codemod`] selects the target files under
//! a root directory, transforms them in parallel with per-file failure
//! isolation, writes the results back (unless dry) and hands each repository's
//! successful results to the codemod's post-transform hook.
//!
//! # Example
//!
//! ```rust,no_run
//! use codemod_runner::codemod::{Codemod, RunCodemodOptions, run_codemod};
//! use std::path::Path;
//!
//! let codemod = Codemod::new("uppercase-todo", ["typescript"], |content, _path| {
//!     Ok(content.replace("todo:", "TODO:"))
//! });
//!
//! let results = run_codemod(&codemod, Path::new("./repos"), &RunCodemodOptions::default())?;
//! println!("{} files processed", results.len());
//! # Ok::<(), codemod_runner::error::CodemodError>(())
//! ```

mod executor;
mod filter;

pub use executor::{RunCodemodError, RunCodemodResult, group_results, run_codemod, run_codemods};
pub use filter::TargetFilter;

use crate::error::{CodemodError, Result};
use crate::lang::{self, Language};
use crate::replace::{FindAndReplaceConfig, find_and_replace_config};
use crate::report::{Reporter, SilentReporter, TracingReporter};
use crate::tree::SyntaxTree;
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Content transformer: `(content, full_path) -> new content`.
pub type TransformFn = dyn Fn(&str, &Path) -> Result<String> + Send + Sync;

/// Structural hook run once per repository root after its files are done.
pub type PostTransformFn = dyn Fn(&Path, &[RunCodemodOkResult]) + Send + Sync;

/// Target predicate over paths relative to the run root.
pub type TargetFilterFn = dyn Fn(&Path) -> bool + Send + Sync;

/// Hook run before target selection.
pub type PreCodemodRunFn = dyn Fn(&Codemod) -> Result<()> + Send + Sync;

/// Text hook applied to changed content before it is written.
pub type PostTransformTextFn = dyn Fn(String) -> Result<String> + Send + Sync;

/// A named source transformation.
///
/// Identity is the name, which also keys the codemod's working directory
/// when run through [`crate::runner::CodemodRunner`].
#[derive(Clone)]
pub struct Codemod {
    name: String,
    languages: BTreeSet<String>,
    transformer: Arc<TransformFn>,
    post_transform: Option<Arc<PostTransformFn>>,
    target_filtering: Option<Arc<TargetFilterFn>>,
}

impl Codemod {
    /// Creates a codemod from a content transformer.
    pub fn new<F>(name: impl Into<String>, languages: impl IntoIterator<Item = impl Into<String>>, transformer: F) -> Self
    where
        F: Fn(&str, &Path) -> Result<String> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            languages: languages.into_iter().map(Into::into).collect(),
            transformer: Arc::new(transformer),
            post_transform: None,
            target_filtering: None,
        }
    }

    /// Creates a declarative codemod that runs find-and-replace `stages`.
    ///
    /// Each file is parsed under the declared language that claims its
    /// extension, else the first declared language with a grammar, else the
    /// language detected from the extension.
    pub fn from_stages(
        name: impl Into<String>,
        languages: impl IntoIterator<Item = impl Into<String>>,
        stages: Vec<FindAndReplaceConfig>,
    ) -> Self {
        let languages: BTreeSet<String> = languages.into_iter().map(Into::into).collect();
        let declared: Vec<&'static Language> = languages.iter().filter_map(|l| lang::lookup(l)).collect();

        let mut codemod = Self::new(name, Vec::<String>::new(), move |content, path| {
            let language = language_for(&declared, path)
                .ok_or_else(|| CodemodError::UnsupportedLanguage(path.display().to_string()))?;
            let tree = SyntaxTree::parse_with(language, content)?;
            find_and_replace_config(&tree, &stages)
        });
        codemod.languages = languages;
        codemod
    }

    /// Sets the per-repository structural hook.
    pub fn post_transform<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Path, &[RunCodemodOkResult]) + Send + Sync + 'static,
    {
        self.post_transform = Some(Arc::new(hook));
        self
    }

    /// Restricts the codemod's targets.
    pub fn target_filtering<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.target_filtering = Some(Arc::new(filter));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn languages(&self) -> &BTreeSet<String> {
        &self.languages
    }

    /// Union of the extensions of every declared language.
    pub fn extensions(&self) -> BTreeSet<&'static str> {
        lang::resolve_all(self.languages.iter().map(String::as_str))
    }

    /// Runs the transformer.
    pub fn transform(&self, content: &str, path: &Path) -> Result<String> {
        (self.transformer)(content, path)
    }

    pub(crate) fn accepts(&self, relative: &Path) -> bool {
        self.target_filtering.as_ref().is_none_or(|filter| filter(relative))
    }

    pub(crate) fn finish_root(&self, root: &Path, results: &[RunCodemodOkResult]) {
        if let Some(hook) = &self.post_transform {
            hook(root, results);
        }
    }
}

impl fmt::Debug for Codemod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codemod")
            .field("name", &self.name)
            .field("languages", &self.languages)
            .field("post_transform", &self.post_transform.is_some())
            .field("target_filtering", &self.target_filtering.is_some())
            .finish()
    }
}

fn language_for(declared: &[&'static Language], path: &Path) -> Option<&'static Language> {
    let ext = path.extension().and_then(|e| e.to_str());
    ext.and_then(|ext| declared.iter().copied().find(|l| l.matches_extension(ext)))
        .or_else(|| declared.first().copied())
        .or_else(|| lang::detect(path))
}

/// Caller-supplied hooks for a run. Unset hooks default at call time.
#[derive(Clone, Default)]
pub struct RunCodemodHooks {
    /// Target predicate; defaults to accepting every path.
    pub target_filtering: Option<Arc<TargetFilterFn>>,
    /// Runs before target selection; defaults to a no-op.
    pub pre_codemod_run: Option<Arc<PreCodemodRunFn>>,
    /// Rewrites changed content before it is written; defaults to identity.
    pub post_transform: Option<Arc<PostTransformTextFn>>,
}

impl RunCodemodHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target_filtering<F>(mut self, filter: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        self.target_filtering = Some(Arc::new(filter));
        self
    }

    pub fn pre_codemod_run<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Codemod) -> Result<()> + Send + Sync + 'static,
    {
        self.pre_codemod_run = Some(Arc::new(hook));
        self
    }

    pub fn post_transform<F>(mut self, hook: F) -> Self
    where
        F: Fn(String) -> Result<String> + Send + Sync + 'static,
    {
        self.post_transform = Some(Arc::new(hook));
        self
    }

    pub(crate) fn accepts(&self, relative: &Path) -> bool {
        self.target_filtering.as_ref().is_none_or(|filter| filter(relative))
    }

    pub(crate) fn before_run(&self, codemod: &Codemod) -> Result<()> {
        match &self.pre_codemod_run {
            Some(hook) => hook(codemod).map_err(|e| CodemodError::HookFailed {
                hook: "pre_codemod_run",
                message: e.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn rewrite(&self, content: String) -> Result<String> {
        match &self.post_transform {
            Some(hook) => hook(content),
            None => Ok(content),
        }
    }
}

impl fmt::Debug for RunCodemodHooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunCodemodHooks")
            .field("target_filtering", &self.target_filtering.is_some())
            .field("pre_codemod_run", &self.pre_codemod_run.is_some())
            .field("post_transform", &self.post_transform.is_some())
            .finish()
    }
}

/// Options for [`run_codemod`].
#[derive(Clone)]
pub struct RunCodemodOptions {
    pub hooks: RunCodemodHooks,
    /// Emit progress events; when false the reporter is bypassed.
    pub log: bool,
    /// Compute everything but write nothing.
    pub dry: bool,
    /// Repository roots that get the post-transform hook even without results.
    pub root_paths: Vec<PathBuf>,
    pub reporter: Arc<dyn Reporter>,
}

impl Default for RunCodemodOptions {
    fn default() -> Self {
        Self {
            hooks: RunCodemodHooks::default(),
            log: true,
            dry: false,
            root_paths: Vec::new(),
            reporter: Arc::new(TracingReporter),
        }
    }
}

impl RunCodemodOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hooks(mut self, hooks: RunCodemodHooks) -> Self {
        self.hooks = hooks;
        self
    }

    pub fn log(mut self, log: bool) -> Self {
        self.log = log;
        self
    }

    pub fn dry(mut self, dry: bool) -> Self {
        self.dry = dry;
        self
    }

    pub fn root_paths(mut self, roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        self.root_paths = roots.into_iter().map(Into::into).collect();
        self
    }

    pub fn reporter(mut self, reporter: Arc<dyn Reporter>) -> Self {
        self.reporter = reporter;
        self
    }

    pub(crate) fn active_reporter(&self) -> &dyn Reporter {
        if self.log { self.reporter.as_ref() } else { &SilentReporter }
    }
}

impl fmt::Debug for RunCodemodOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunCodemodOptions")
            .field("hooks", &self.hooks)
            .field("log", &self.log)
            .field("dry", &self.dry)
            .field("root_paths", &self.root_paths)
            .finish_non_exhaustive()
    }
}

/// Outcome of one successfully processed file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunCodemodOkResult {
    pub has_changes: bool,
    /// Content after the transformer and the text hook.
    pub content: String,
    /// Content as read from disk.
    pub original: String,
    pub full_path: PathBuf,
    /// Repository directory owning the file.
    pub root: PathBuf,
}
