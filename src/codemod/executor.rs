//! Codemod execution over a file tree.

use super::filter::{collect_files, matches_extensions, root_segment};
use super::{Codemod, RunCodemodOkResult, RunCodemodOptions};
use crate::error::{CodemodError, Result};
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// A file that could not be read, transformed or written.
#[derive(Debug, Error)]
#[error("{}: {source}", .full_path.display())]
pub struct RunCodemodError {
    pub full_path: PathBuf,
    pub root: PathBuf,
    #[source]
    pub source: CodemodError,
}

/// Per-file outcome of a codemod run.
pub type RunCodemodResult = std::result::Result<RunCodemodOkResult, RunCodemodError>;

/// Runs `codemod` over every target file under `root_path`.
///
/// Files are processed in parallel and fail independently: a file that
/// cannot be read, transformed or written becomes an `Err` entry without
/// affecting its siblings. So does a directory entry the walk cannot read.
/// The returned order is not meaningful.
///
/// The outer `Err` is reserved for failures of the run itself, such as a
/// failing `pre_codemod_run` hook or an unreadable `root_path`.
pub fn run_codemod(codemod: &Codemod, root_path: &Path, options: &RunCodemodOptions) -> Result<Vec<RunCodemodResult>> {
    options.hooks.before_run(codemod)?;

    let extensions = codemod.extensions();
    let walked = collect_files(root_path)?;
    let reporter = options.active_reporter();
    let mut results: Vec<RunCodemodResult> = walked
        .failed
        .into_iter()
        .map(|error| {
            let full_path = error.path().map_or_else(|| root_path.to_path_buf(), Path::to_path_buf);
            let relative = full_path.strip_prefix(root_path).unwrap_or(Path::new(""));
            let root = root_path.join(root_segment(relative).unwrap_or(Path::new("")));
            let source = CodemodError::from(error);
            reporter.file_failed(codemod.name(), &full_path, &source);
            Err(RunCodemodError {
                full_path,
                root,
                source,
            })
        })
        .collect();

    let targets: Vec<PathBuf> = walked
        .files
        .into_iter()
        .filter(|relative| options.hooks.accepts(relative) && codemod.accepts(relative))
        .filter(|relative| matches_extensions(&extensions, relative))
        .collect();
    if targets.is_empty() {
        return Ok(results);
    }

    reporter.targets_found(codemod.name(), targets.len());
    let started = Instant::now();

    let transformed: Vec<RunCodemodResult> = targets
        .par_iter()
        .map(|relative| {
            let full_path = root_path.join(relative);
            let root = root_path.join(root_segment(relative).unwrap_or(relative.as_path()));
            match transform_file(codemod, &full_path, options) {
                Ok((original, content)) => {
                    let has_changes = content.is_some();
                    if has_changes {
                        reporter.file_transformed(codemod.name(), &full_path, !options.dry);
                    }
                    Ok(RunCodemodOkResult {
                        has_changes,
                        content: content.unwrap_or_else(|| original.clone()),
                        original,
                        full_path,
                        root,
                    })
                }
                Err(source) => {
                    reporter.file_failed(codemod.name(), &full_path, &source);
                    Err(RunCodemodError {
                        full_path,
                        root,
                        source,
                    })
                }
            }
        })
        .collect();
    results.extend(transformed);

    let mut by_root: BTreeMap<&Path, Vec<RunCodemodOkResult>> = BTreeMap::new();
    for result in results.iter().flatten() {
        by_root.entry(result.root.as_path()).or_default().push(result.clone());
    }
    let roots: BTreeSet<&Path> = options
        .root_paths
        .iter()
        .map(PathBuf::as_path)
        .chain(by_root.keys().copied())
        .collect();
    roots.par_iter().for_each(|root| {
        let grouped = by_root.get(root).map(Vec::as_slice).unwrap_or_default();
        codemod.finish_root(root, grouped);
    });

    reporter.codemod_finished(codemod.name(), started.elapsed());
    Ok(results)
}

/// Reads, transforms and (unless dry) writes one file.
///
/// Returns the original content and, when it changed, the content after the
/// text hook.
fn transform_file(codemod: &Codemod, full_path: &Path, options: &RunCodemodOptions) -> Result<(String, Option<String>)> {
    let original = fs::read_to_string(full_path)?;
    let transformed = codemod.transform(&original, full_path)?;
    if transformed == original {
        return Ok((original, None));
    }

    let content = options.hooks.rewrite(transformed)?;
    if !options.dry {
        fs::write(full_path, &content)?;
    }
    Ok((original, Some(content)))
}

/// Runs each codemod to completion before starting the next, so later
/// codemods see the files earlier ones wrote.
pub fn run_codemods(
    codemods: &[Codemod],
    root_path: &Path,
    options: &RunCodemodOptions,
) -> Result<BTreeMap<String, Vec<RunCodemodResult>>> {
    let mut results = BTreeMap::new();
    for codemod in codemods {
        results.insert(codemod.name().to_string(), run_codemod(codemod, root_path, options)?);
    }
    Ok(results)
}

/// Splits results into successes and failures, keeping their order.
pub fn group_results<T, E>(results: impl IntoIterator<Item = std::result::Result<T, E>>) -> (Vec<T>, Vec<E>) {
    let mut success = Vec::new();
    let mut failure = Vec::new();
    for result in results {
        match result {
            Ok(value) => success.push(value),
            Err(error) => failure.push(error),
        }
    }
    (success, failure)
}
