//! Repository queries used alongside the artifact operations.

use super::{check_revision, DiffEngine, GhostError};
use std::path::{Path, PathBuf};

impl DiffEngine {
    /// Full commit id for `committish`, failing if it does not name a commit.
    pub async fn resolve_committish(&self, dir: impl AsRef<Path>, committish: &str) -> Result<String, GhostError> {
        check_revision(committish)?;
        let peeled = format!("{committish}^{{commit}}");
        let spec = self.git(dir.as_ref(), ["rev-parse", "--verify", peeled.as_str()]);
        let stdout = self.run_captured(&spec).await?;
        Ok(String::from_utf8_lossy(&stdout).trim().to_string())
    }

    /// Untracked files that are not ignored, relative to `dir`.
    pub async fn list_untracked_files(&self, dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, GhostError> {
        let spec = self.git(dir.as_ref(), ["ls-files", "--others", "--exclude-standard", "-z"]);
        let stdout = self.run_captured(&spec).await?;
        Ok(split_nul_paths(&stdout))
    }
}

fn split_nul_paths(raw: &[u8]) -> Vec<PathBuf> {
    raw.split(|b| *b == 0)
        .filter(|entry| !entry.is_empty())
        .map(path_from_bytes)
        .collect()
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::external::fake::{FakeCommandExecutor, ScriptedResponse};
    use std::sync::Arc;

    #[test]
    fn test_split_nul_paths() {
        let paths = split_nul_paths(b"a.txt\0dir/b c.bin\0");
        assert_eq!(paths, vec![PathBuf::from("a.txt"), PathBuf::from("dir/b c.bin")]);
        assert!(split_nul_paths(b"").is_empty());
    }

    #[tokio::test]
    async fn test_resolve_committish_trims_output() {
        let fake = FakeCommandExecutor::new().expect_command(
            "git",
            &["rev-parse", "--verify", "HEAD^{commit}"],
            ScriptedResponse::ok("0123456789abcdef0123456789abcdef01234567\n"),
        );
        let engine = DiffEngine::new(Arc::new(fake));

        let id = engine.resolve_committish(".", "HEAD").await.unwrap();

        assert_eq!(id, "0123456789abcdef0123456789abcdef01234567");
    }

    #[tokio::test]
    async fn test_resolve_committish_unknown_revision() {
        let fake = FakeCommandExecutor::new().expect_command(
            "git",
            &["rev-parse", "--verify", "nope^{commit}"],
            ScriptedResponse::exit(128, "", "fatal: Needed a single revision"),
        );
        let engine = DiffEngine::new(Arc::new(fake));

        let err = engine.resolve_committish(".", "nope").await.unwrap_err();

        assert_eq!(err.exit_code(), Some(128));
        assert!(err.to_string().contains("Needed a single revision"));
    }

    #[tokio::test]
    async fn test_resolve_committish_refuses_option_like_input() {
        let fake = Arc::new(FakeCommandExecutor::new());
        let engine = DiffEngine::new(fake.clone());

        let err = engine.resolve_committish(".", "--all").await.unwrap_err();

        assert!(matches!(err, GhostError::InvalidRevision { .. }));
        assert!(fake.calls().is_empty());
    }
}
