use super::{Command, CommandContext};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub struct CreatePatchCommand {
    pub ctx: CommandContext,
    pub base: String,
    pub output: PathBuf,
    pub include_untracked: bool,
}

impl Command for CreatePatchCommand {
    async fn execute(&self) -> Result<()> {
        let engine = &self.ctx.engine;
        let base = engine
            .resolve_committish(&self.ctx.dir, &self.base)
            .await
            .with_context(|| format!("cannot resolve '{}'", self.base))?;

        engine
            .create_local_snapshot(&self.ctx.dir, &self.output, &base, self.include_untracked)
            .await?;
        println!("✅ Patch against {} written to {}", self.base, self.output.display());
        Ok(())
    }
}

pub struct AppendPatchCommand {
    pub ctx: CommandContext,
    pub patch: PathBuf,
    pub paths: Vec<PathBuf>,
}

impl Command for AppendPatchCommand {
    async fn execute(&self) -> Result<()> {
        self.ctx
            .engine
            .append_non_indexed_diffs(&self.ctx.dir, &self.patch, &self.paths)
            .await?;
        println!("✅ Appended {} file(s) to {}", self.paths.len(), self.patch.display());
        Ok(())
    }
}

pub struct ApplyPatchCommand {
    pub ctx: CommandContext,
    pub patch: PathBuf,
}

impl Command for ApplyPatchCommand {
    async fn execute(&self) -> Result<()> {
        self.ctx
            .engine
            .apply_diff_patch(&self.ctx.dir, &self.patch)
            .await?;
        println!("✅ Applied patch {}", self.patch.display());
        Ok(())
    }
}
