//! Working-tree patches: uncommitted changes against a base revision, plus
//! untracked files appended as additions.

use super::{absolute_artifact, check_revision, AggregateError, DiffEngine, GhostError};
use std::path::{Path, PathBuf};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

#[cfg(windows)]
const NULL_DEVICE: &str = "NUL";
#[cfg(not(windows))]
const NULL_DEVICE: &str = "/dev/null";

/// `git diff --no-index` exits 1 when the inputs differ and a section was written.
const NO_INDEX_DIFFERENCES_FOUND: i32 = 1;

impl DiffEngine {
    /// Write the difference between `base` and the current working tree to
    /// `output`. A tree with no changes produces an empty file.
    pub async fn create_diff_patch(
        &self,
        dir: impl AsRef<Path>,
        output: impl AsRef<Path>,
        base: &str,
    ) -> Result<(), GhostError> {
        let (dir, output) = (dir.as_ref(), output.as_ref());
        check_revision(base).map_err(|e| e.context("create diff patch", dir, output))?;
        let spec = self.git(dir, ["diff", "--patience", "--binary", base]);

        let outcome = self
            .write_artifact(&spec, output)
            .await
            .map_err(|e| e.context("create diff patch", dir, output))?;
        tracing::debug!(
            dir = %dir.display(),
            artifact = %output.display(),
            base = base,
            bytes = outcome.bytes_written,
            "diff patch written"
        );
        Ok(())
    }

    /// Append a diff against empty content for each of `paths` to an existing
    /// patch. A failing path does not stop the others; every failure is
    /// returned together.
    pub async fn append_non_indexed_diffs<P: AsRef<Path>>(
        &self,
        dir: impl AsRef<Path>,
        patch: impl AsRef<Path>,
        paths: &[P],
    ) -> Result<(), GhostError> {
        let (dir, patch) = (dir.as_ref(), patch.as_ref());
        if paths.is_empty() {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .append(true)
            .open(patch)
            .await
            .map_err(|e| GhostError::io("open", patch, e).context("append non-indexed diffs", dir, patch))?;

        let mut errs = AggregateError::new();
        for path in paths {
            let path = path.as_ref();
            let spec = self
                .git(dir, ["diff", "--patience", "--binary", "--no-index", "--", NULL_DEVICE])
                .arg(path);

            // git also exits 1 when it cannot read the file, but then writes nothing.
            let result = match self.executor.run(&spec, &mut file).await {
                Ok(outcome)
                    if outcome.status_code == NO_INDEX_DIFFERENCES_FOUND && outcome.bytes_written > 0 =>
                {
                    Ok(())
                }
                Ok(outcome) => outcome.check(&spec).map(|_| ()),
                Err(e) => Err(e),
            };
            match result {
                Ok(()) => {}
                Err(e) => {
                    tracing::warn!(
                        dir = %dir.display(),
                        path = %path.display(),
                        error = %e,
                        "non-indexed diff failed"
                    );
                    errs.push(e);
                }
            }
        }

        if let Err(e) = file.flush().await {
            errs.push(GhostError::io("write", patch, e));
        }
        errs.into_result()
            .map_err(|e| e.context("append non-indexed diffs", dir, patch))
    }

    /// Apply a patch with `git apply`. An empty patch means "no changes" and
    /// succeeds without running anything.
    pub async fn apply_diff_patch(
        &self,
        dir: impl AsRef<Path>,
        patch: impl AsRef<Path>,
    ) -> Result<(), GhostError> {
        let (dir, patch) = (dir.as_ref(), patch.as_ref());

        let metadata = tokio::fs::metadata(patch)
            .await
            .map_err(|e| GhostError::io("stat", patch, e).context("apply diff patch", dir, patch))?;
        if metadata.len() == 0 {
            tracing::info!(
                src_dir = %dir.display(),
                artifact = %patch.display(),
                "empty patch, nothing to apply"
            );
            return Ok(());
        }

        let patch = absolute_artifact(patch)?;
        let spec = self.git(dir, ["apply"]).arg(&patch);
        self.run_captured(&spec)
            .await
            .map(|_| ())
            .map_err(|e| e.context("apply diff patch", dir, patch))
    }

    /// Working-tree patch of `dir` against `base`, optionally followed by every
    /// untracked, non-ignored file as an addition. `output` itself is never
    /// appended, even when it sits untracked inside `dir`.
    pub async fn create_local_snapshot(
        &self,
        dir: impl AsRef<Path>,
        output: impl AsRef<Path>,
        base: &str,
        include_untracked: bool,
    ) -> Result<(), GhostError> {
        let (dir, output) = (dir.as_ref(), output.as_ref());
        self.create_diff_patch(dir, output, base).await?;
        if !include_untracked {
            return Ok(());
        }

        let untracked = without_artifact(dir, self.list_untracked_files(dir).await?, output).await;
        tracing::debug!(count = untracked.len(), "appending untracked files");
        self.append_non_indexed_diffs(dir, output, &untracked).await
    }
}

async fn without_artifact(dir: &Path, paths: Vec<PathBuf>, artifact: &Path) -> Vec<PathBuf> {
    let Ok(artifact) = tokio::fs::canonicalize(artifact).await else {
        return paths;
    };
    let mut kept = Vec::with_capacity(paths.len());
    for path in paths {
        match tokio::fs::canonicalize(dir.join(&path)).await {
            Ok(resolved) if resolved == artifact => {}
            _ => kept.push(path),
        }
    }
    kept
}
