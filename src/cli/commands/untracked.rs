use super::{Command, CommandContext};
use anyhow::Result;

pub struct UntrackedCommand {
    pub ctx: CommandContext,
}

impl Command for UntrackedCommand {
    async fn execute(&self) -> Result<()> {
        for path in self.ctx.engine.list_untracked_files(&self.ctx.dir).await? {
            println!("{}", path.display());
        }
        Ok(())
    }
}
