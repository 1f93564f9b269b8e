//! Diff engine
//!
//! Captures a working tree's state as portable artifacts and replays them:
//! commit ranges become mailbox-format bundles, uncommitted changes become
//! patch files. Every operation is a precisely-parameterized git invocation
//! run through a [`CommandExecutor`].

pub mod bundle;
pub mod errors;
pub mod patch;
pub mod repo;

pub use errors::{AggregateError, GhostError};

use crate::config::GitConfig;
use crate::external::{CommandExecutor, CommandSpec, ProcessCommandExecutor, ProcessOutcome};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

/// Runs the bundle and patch operations against working trees.
#[derive(Clone)]
pub struct DiffEngine {
    executor: Arc<dyn CommandExecutor>,
    program: String,
}

impl DiffEngine {
    pub fn new(executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            executor,
            program: "git".to_string(),
        }
    }

    pub fn from_config(config: &GitConfig) -> Self {
        let executor = ProcessCommandExecutor::with_buffer_size(config.copy_buffer_size);
        Self::new(Arc::new(executor)).with_program(config.program.clone())
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn git<I, S>(&self, dir: &Path, args: I) -> CommandSpec
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        CommandSpec::new(dir, self.program.clone()).args(args)
    }

    /// Run to completion, keeping stdout in memory. Non-zero exit is an error.
    async fn run_captured(&self, spec: &CommandSpec) -> Result<Vec<u8>, GhostError> {
        let mut stdout = Vec::new();
        let outcome = self.executor.run(spec, &mut stdout).await?;
        outcome.check(spec)?;
        tracing::debug!(
            command = %spec,
            output = %String::from_utf8_lossy(&stdout).trim_end(),
            "command finished"
        );
        Ok(stdout)
    }

    /// Stream a command's stdout into a freshly truncated `output` file.
    ///
    /// A partially written file is removed before the error is returned.
    async fn write_artifact(&self, spec: &CommandSpec, output: &Path) -> Result<ProcessOutcome, GhostError> {
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        options.mode(0o600);

        let mut file = options
            .open(output)
            .await
            .map_err(|e| GhostError::io("create", output, e))?;

        let streamed = match self.executor.run(spec, &mut file).await {
            Ok(outcome) => outcome.check(spec).map_err(GhostError::from),
            Err(e) => Err(e.into()),
        };
        let flushed = file
            .flush()
            .await
            .map_err(|e| GhostError::io("write", output, e));
        drop(file);

        let result = streamed.and_then(|outcome| flushed.map(|_| outcome));
        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(output).await {
                tracing::warn!(
                    artifact = %output.display(),
                    error = %e,
                    "failed to remove partially written artifact"
                );
            }
        }
        result
    }
}

/// Revisions reach git as positional arguments, so one that looks like an
/// option is refused before anything runs.
pub(crate) fn check_revision(revision: &str) -> Result<(), GhostError> {
    if revision.is_empty() || revision.starts_with('-') {
        return Err(GhostError::InvalidRevision {
            revision: revision.to_string(),
        });
    }
    Ok(())
}

/// `path` made absolute against the current directory, so it survives the
/// subprocess running inside the target tree.
fn absolute_artifact(path: &Path) -> Result<PathBuf, GhostError> {
    std::path::absolute(path).map_err(|e| GhostError::io("resolve", path, e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_revision() {
        assert!(check_revision("HEAD~2").is_ok());
        assert!(check_revision("a1b2c3").is_ok());
        assert!(check_revision("feature/x-y").is_ok());
        assert!(matches!(check_revision(""), Err(GhostError::InvalidRevision { .. })));
        assert!(matches!(
            check_revision("--output=/tmp/x"),
            Err(GhostError::InvalidRevision { .. })
        ));
        assert!(matches!(check_revision("-p"), Err(GhostError::InvalidRevision { .. })));
    }
}
