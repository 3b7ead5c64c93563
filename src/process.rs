//! External process execution.
//!
//! Every `git` and `gh` invocation goes through a [`CommandRunner`], so the
//! repository state machine can be driven by a scripted runner in tests.

use std::io;
use std::path::Path;
use std::process::Command;

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub success: bool,
}

impl CommandOutput {
    /// A successful output with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: String::new(),
            success: true,
        }
    }

    /// A failed output with the given stderr.
    pub fn failed(stderr: impl Into<String>) -> Self {
        Self {
            stdout: String::new(),
            stderr: stderr.into(),
            success: false,
        }
    }

    /// The most useful diagnostic text: stderr, or stdout when stderr is empty.
    pub fn message(&self) -> &str {
        let stderr = self.stderr.trim();
        if stderr.is_empty() { self.stdout.trim() } else { stderr }
    }
}

/// Runs external programs.
pub trait CommandRunner: Send + Sync {
    /// Runs `program` with `args` in `cwd` and waits for it.
    ///
    /// A non-zero exit is reported through [`CommandOutput::success`]; `Err`
    /// means the process could not be started at all.
    fn run(&self, cwd: &Path, program: &str, args: &[&str]) -> io::Result<CommandOutput>;
}

/// Runs programs with [`std::process::Command`].
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn run(&self, cwd: &Path, program: &str, args: &[&str]) -> io::Result<CommandOutput> {
        tracing::debug!(cwd = %cwd.display(), "{program} {}", args.join(" "));
        let output = Command::new(program).current_dir(cwd).args(args).output()?;
        Ok(CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            success: output.status.success(),
        })
    }
}
