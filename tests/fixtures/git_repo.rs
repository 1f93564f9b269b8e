#![allow(dead_code)]
/// Temporary git repositories for exercising the diff engine against real git
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// True when a `git` binary can be started.
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// A repository living in its own temporary directory
pub struct GitRepo {
    temp_dir: TempDir,
}

impl GitRepo {
    /// Create and configure an empty repository
    pub fn init() -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let repo = Self { temp_dir };
        repo.git(&["init", "-q"])?;
        repo.configure()?;
        Ok(repo)
    }

    /// Clone `source` and detach at `rev`
    pub fn clone_at(source: &GitRepo, rev: &str) -> Result<Self> {
        let temp_dir = tempfile::tempdir()?;
        let output = Command::new("git")
            .args(["clone", "-q"])
            .arg(source.path())
            .arg(temp_dir.path())
            .output()?;
        if !output.status.success() {
            anyhow::bail!(
                "Failed to clone repository: {}",
                String::from_utf8_lossy(&output.stderr)
            );
        }

        let repo = Self { temp_dir };
        repo.configure()?;
        repo.git(&["checkout", "-q", "--detach", rev])?;
        Ok(repo)
    }

    fn configure(&self) -> Result<()> {
        self.git(&["config", "user.name", "Test User"])?;
        self.git(&["config", "user.email", "test@example.com"])?;
        self.git(&["config", "commit.gpgsign", "false"])?;
        self.git(&["config", "core.autocrlf", "false"])?;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Run git in the repository, returning trimmed stdout
    pub fn git(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("git")
            .args(args)
            .current_dir(self.path())
            .output()?;
        if !output.status.success() {
            anyhow::bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    pub fn write(&self, relative_path: &str, content: impl AsRef<[u8]>) -> Result<PathBuf> {
        let file_path = self.path().join(relative_path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&file_path, content)?;
        Ok(file_path)
    }

    pub fn read(&self, relative_path: &str) -> Result<Vec<u8>> {
        Ok(std::fs::read(self.path().join(relative_path))?)
    }

    pub fn remove(&self, relative_path: &str) -> Result<()> {
        std::fs::remove_file(self.path().join(relative_path))?;
        Ok(())
    }

    /// Stage everything and commit, returning the new commit id
    pub fn commit_all(&self, message: &str) -> Result<String> {
        self.git(&["add", "-A"])?;
        self.git(&["commit", "-q", "-m", message])?;
        self.head()
    }

    pub fn head(&self) -> Result<String> {
        self.git(&["rev-parse", "HEAD"])
    }

    pub fn tree_of(&self, rev: &str) -> Result<String> {
        self.git(&["rev-parse", &format!("{rev}^{{tree}}")])
    }

    pub fn status(&self) -> Result<String> {
        self.git(&["status", "--porcelain", "--untracked-files=all"])
    }
}

/// Bytes that git must treat as binary
pub fn binary_blob(seed: u8) -> Vec<u8> {
    (0..2048u32)
        .map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed))
        .chain([0u8, 0xff, 0x00, 0xfe])
        .collect()
}
