//! Branch snapshots parsed from git's porcelain-ish output.

/// A branch as seen at one moment.
///
/// This is a snapshot: it goes stale as soon as the checkout changes, so
/// callers re-derive it after any operation that switches branches.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Branch {
    pub name: String,
    pub is_selected: bool,
}

impl Branch {
    pub fn new(name: impl Into<String>, is_selected: bool) -> Self {
        Self {
            name: name.into(),
            is_selected,
        }
    }
}

/// Parses `git branch` output; the checked-out branch is marked with `*`.
pub(crate) fn parse_branch_list(stdout: &str) -> Vec<Branch> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| Branch::new(line.replace('*', "").trim(), line.starts_with('*')))
        .collect()
}

/// Parses `git ls-remote --heads` output into unselected branches.
pub(crate) fn parse_remote_heads(stdout: &str) -> Vec<Branch> {
    stdout
        .lines()
        .filter_map(|line| line.trim().split_once("refs/heads/"))
        .filter(|(_, name)| !name.is_empty())
        .map(|(_, name)| Branch::new(name, false))
        .collect()
}
