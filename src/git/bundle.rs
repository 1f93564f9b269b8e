//! Commit-range bundles: a mailbox-format patch series, oldest commit first.

use super::{absolute_artifact, check_revision, AggregateError, DiffEngine, GhostError};
use std::path::Path;

impl DiffEngine {
    /// Write the commits in `from..to` (first-parent only) to `output` as a
    /// patch series that `git am` can replay.
    pub async fn create_diff_bundle(
        &self,
        dir: impl AsRef<Path>,
        output: impl AsRef<Path>,
        from: &str,
        to: &str,
    ) -> Result<(), GhostError> {
        let (dir, output) = (dir.as_ref(), output.as_ref());
        check_revision(from)
            .and_then(|_| check_revision(to))
            .map_err(|e| e.context("create diff bundle", dir, output))?;
        let range = format!("{from}..{to}");
        let spec = self.git(
            dir,
            [
                "log",
                "-p",
                "--reverse",
                "--pretty=email",
                "--stat",
                "-m",
                "--first-parent",
                "--binary",
                range.as_str(),
            ],
        );

        let outcome = self
            .write_artifact(&spec, output)
            .await
            .map_err(|e| e.context("create diff bundle", dir, output))?;
        tracing::debug!(
            dir = %dir.display(),
            artifact = %output.display(),
            bytes = outcome.bytes_written,
            range = %range,
            "diff bundle written"
        );
        Ok(())
    }

    /// Replay a bundle with `git am`. Any failing patch aborts the whole
    /// series, returning the tree to where it was before the call.
    ///
    /// The returned error carries the apply failure and, if `git am --abort`
    /// failed too, that failure as a second cause.
    pub async fn apply_diff_bundle(
        &self,
        dir: impl AsRef<Path>,
        bundle: impl AsRef<Path>,
    ) -> Result<(), GhostError> {
        let dir = dir.as_ref();
        let bundle = absolute_artifact(bundle.as_ref())?;

        let apply = self.git(dir, ["am"]).arg(&bundle);
        let err = match self.run_captured(&apply).await {
            Ok(_) => {
                tracing::debug!(dir = %dir.display(), artifact = %bundle.display(), "diff bundle applied");
                return Ok(());
            }
            Err(err) => err,
        };

        tracing::info!(
            src_dir = %dir.display(),
            artifact = %bundle.display(),
            error = %err,
            "apply ('git am') failed, aborting"
        );
        let mut errs = AggregateError::new();
        errs.push(err);

        let abort = self.git(dir, ["am", "--abort"]);
        if let Err(abort_err) = self.run_captured(&abort).await {
            tracing::warn!(
                src_dir = %dir.display(),
                error = %abort_err,
                "abort ('git am --abort') failed, tree may be left mid-apply"
            );
            errs.push(abort_err);
        }

        Err(GhostError::Aggregate(errs).context("apply diff bundle", dir, bundle))
    }
}
