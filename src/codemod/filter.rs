//! Target selection for codemod runs.

use crate::error::Result;
use crate::lang;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Include/exclude glob filter for codemod targets.
///
/// Paths are given relative to the run root, whose first segment names the
/// repository; globs are matched against the remainder, so `src/**` selects
/// `src/` in every repository.
///
/// # Example
///
/// ```rust
/// use codemod_runner::codemod::TargetFilter;
/// use std::path::Path;
///
/// let filter = TargetFilter::new(&["src/**"], &["**/*.spec.ts"]).unwrap();
///
/// assert!(filter.is_match(Path::new("web/src/app.ts")));
/// assert!(!filter.is_match(Path::new("web/src/app.spec.ts")));
/// assert!(!filter.is_match(Path::new("web/scripts/build.ts")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TargetFilter {
    include: Option<GlobSet>,
    exclude: Option<GlobSet>,
}

impl TargetFilter {
    /// Builds a filter. Empty include globs accept everything.
    pub fn new(include: &[impl AsRef<str>], exclude: &[impl AsRef<str>]) -> Result<Self> {
        Ok(Self {
            include: build_glob_set(include)?,
            exclude: build_glob_set(exclude)?,
        })
    }

    /// Whether `relative` passes the filter.
    pub fn is_match(&self, relative: &Path) -> bool {
        let inner: PathBuf = relative.components().skip(1).collect();
        if self.include.as_ref().is_some_and(|set| !set.is_match(&inner)) {
            return false;
        }
        !self.exclude.as_ref().is_some_and(|set| set.is_match(&inner))
    }
}

fn build_glob_set(patterns: &[impl AsRef<str>]) -> Result<Option<GlobSet>> {
    if patterns.is_empty() {
        return Ok(None);
    }
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        builder.add(Glob::new(pattern.as_ref())?);
    }
    Ok(Some(builder.build()?))
}

/// Files found under a run root, relative to it, plus the entries the walk
/// could not read.
#[derive(Debug, Default)]
pub(crate) struct WalkedFiles {
    pub files: Vec<PathBuf>,
    pub failed: Vec<walkdir::Error>,
}

/// Lists every file under `root`, skipping hidden files and directories.
///
/// Only an unreadable `root` is an error; entries below it that cannot be
/// read are collected in [`WalkedFiles::failed`].
pub(crate) fn collect_files(root: &Path) -> Result<WalkedFiles> {
    let mut walked = WalkedFiles::default();
    let walker = WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_hidden(entry));
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                walked.failed.push(e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if let Ok(relative) = entry.path().strip_prefix(root) {
            walked.files.push(relative.to_path_buf());
        }
    }
    Ok(walked)
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

/// Extension check; an empty set matches everything.
pub(crate) fn matches_extensions(extensions: &BTreeSet<&str>, path: &Path) -> bool {
    extensions.is_empty() || lang::dotted_extension(path).is_some_and(|ext| extensions.contains(ext.as_str()))
}

/// Top-level segment of `relative`, i.e. the owning repository's directory.
pub(crate) fn root_segment(relative: &Path) -> Option<&Path> {
    match relative.components().next()? {
        Component::Normal(segment) => Some(Path::new(segment)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_skips_hidden_entries() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("repo/.git")).unwrap();
        fs::create_dir_all(dir.path().join("repo/src")).unwrap();
        fs::write(dir.path().join("repo/.git/HEAD"), "ref").unwrap();
        fs::write(dir.path().join("repo/.env"), "X=1").unwrap();
        fs::write(dir.path().join("repo/src/a.ts"), "a").unwrap();

        let walked = collect_files(dir.path()).unwrap();

        assert_eq!(walked.files, vec![PathBuf::from("repo/src/a.ts")]);
        assert!(walked.failed.is_empty());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(collect_files(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn test_matches_extensions() {
        let exts = BTreeSet::from([".a", ".b"]);

        assert!(matches_extensions(&exts, Path::new("x/file.a")));
        assert!(matches_extensions(&exts, Path::new("x/file.b")));
        assert!(!matches_extensions(&exts, Path::new("x/file.c")));
        assert!(!matches_extensions(&exts, Path::new("x/Makefile")));
        assert!(matches_extensions(&BTreeSet::new(), Path::new("x/Makefile")));
    }

    #[test]
    fn test_root_segment() {
        assert_eq!(root_segment(Path::new("web/src/a.ts")), Some(Path::new("web")));
        assert_eq!(root_segment(Path::new("a.ts")), Some(Path::new("a.ts")));
        assert_eq!(root_segment(Path::new("")), None);
    }

    #[test]
    fn test_filter_without_globs_accepts_everything() {
        let filter = TargetFilter::new(&[] as &[&str], &[] as &[&str]).unwrap();
        assert!(filter.is_match(Path::new("web/anything/at/all.rs")));
    }

    #[test]
    fn test_invalid_glob_is_an_error() {
        assert!(TargetFilter::new(&["src/[unclosed"], &[] as &[&str]).is_err());
    }
}
