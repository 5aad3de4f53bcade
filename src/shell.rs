//! Shell command execution
//!
//! Stage bodies run their external tools (compiler, test runner,
//! documentation generator) through [`ShellRunner`]. Commands run
//! synchronously via `sh -c`, inherit the parent's stdio so tool output
//! lands directly on the user's terminal, and fail the pipeline on a
//! non-zero exit.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};

/// Runs shell commands from a fixed working directory.
#[derive(Debug, Clone)]
pub struct ShellRunner {
    cwd: PathBuf,
    dry_run: bool,
}

impl ShellRunner {
    pub fn new<P: Into<PathBuf>>(cwd: P, dry_run: bool) -> Self {
        Self {
            cwd: cwd.into(),
            dry_run,
        }
    }

    /// Run `command` through `sh -c`, waiting for it to finish.
    ///
    /// Stdout and stderr are inherited. A non-zero exit becomes
    /// [`Error::Command`] carrying the command text and exit code; under
    /// dry-run the command is logged and skipped.
    pub fn run(&self, command: &str) -> Result<()> {
        if self.dry_run {
            log::debug!("dry run: would run `{}`", command);
            return Ok(());
        }

        log::debug!("running `{}` in {}", command, self.cwd.display());
        let status = Command::new("sh")
            .arg("-c")
            .arg(command)
            .current_dir(&self.cwd)
            .status()?;

        if !status.success() {
            return Err(Error::Command {
                command: command.to_string(),
                code: status.code(),
            });
        }
        Ok(())
    }
}
