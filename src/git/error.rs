//! Repository operation failures.

use thiserror::Error;

/// Boxed underlying cause of a [`GitError`].
pub type Cause = Box<dyn std::error::Error + Send + Sync>;

/// A repository operation that did not succeed.
///
/// Every variant names the repository by its address. These are expected
/// operational failures, except [`GitError::Invariant`], which marks a
/// structural violation that stops the repository's pipeline.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("git clone failed for {address}")]
    Clone {
        address: String,
        #[source]
        cause: Option<Cause>,
    },

    #[error("git checkout failed for {address}, couldn't checkout to {branch}")]
    Checkout {
        address: String,
        branch: String,
        #[source]
        cause: Option<Cause>,
    },

    #[error("failed to get main branch for {address}")]
    GetMainBranch {
        address: String,
        #[source]
        cause: Option<Cause>,
    },

    #[error("git push failed for {address}; message: {message}")]
    Push {
        address: String,
        message: String,
        #[source]
        cause: Option<Cause>,
    },

    #[error("git rebase failed for {address}")]
    Rebase {
        address: String,
        #[source]
        cause: Option<Cause>,
    },

    #[error("git commit failed for {address}")]
    Commit {
        address: String,
        #[source]
        cause: Option<Cause>,
    },

    #[error("`{command}` failed in {address}: {message}")]
    Command {
        address: String,
        command: String,
        message: String,
    },

    #[error("invariant violated for {address}: {message}")]
    Invariant { address: String, message: String },
}

impl GitError {
    /// Address of the repository the error belongs to.
    pub fn address(&self) -> &str {
        match self {
            Self::Clone { address, .. }
            | Self::Checkout { address, .. }
            | Self::GetMainBranch { address, .. }
            | Self::Push { address, .. }
            | Self::Rebase { address, .. }
            | Self::Commit { address, .. }
            | Self::Command { address, .. }
            | Self::Invariant { address, .. } => address,
        }
    }

    /// Whether this is a structural violation rather than an operational failure.
    pub fn is_invariant(&self) -> bool {
        matches!(self, Self::Invariant { .. })
    }

    pub(crate) fn boxed(self) -> Option<Cause> {
        Some(Box::new(self))
    }
}
