use super::{Command, CommandContext};
use anyhow::{Context, Result};
use std::path::PathBuf;

pub struct CreateBundleCommand {
    pub ctx: CommandContext,
    pub from: String,
    pub to: String,
    pub output: PathBuf,
}

impl Command for CreateBundleCommand {
    async fn execute(&self) -> Result<()> {
        let engine = &self.ctx.engine;
        let from = engine
            .resolve_committish(&self.ctx.dir, &self.from)
            .await
            .with_context(|| format!("cannot resolve '{}'", self.from))?;
        let to = engine
            .resolve_committish(&self.ctx.dir, &self.to)
            .await
            .with_context(|| format!("cannot resolve '{}'", self.to))?;

        engine
            .create_diff_bundle(&self.ctx.dir, &self.output, &from, &to)
            .await?;
        println!(
            "✅ Bundle {}..{} written to {}",
            short(&from),
            short(&to),
            self.output.display()
        );
        Ok(())
    }
}

pub struct ApplyBundleCommand {
    pub ctx: CommandContext,
    pub bundle: PathBuf,
}

impl Command for ApplyBundleCommand {
    async fn execute(&self) -> Result<()> {
        self.ctx
            .engine
            .apply_diff_bundle(&self.ctx.dir, &self.bundle)
            .await?;
        println!("✅ Applied bundle {}", self.bundle.display());
        Ok(())
    }
}

fn short(id: &str) -> &str {
    id.get(..12).unwrap_or(id)
}
