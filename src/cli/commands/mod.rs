use crate::git::DiffEngine;
use anyhow::Result;
use std::path::PathBuf;

pub mod bundle;
pub mod patch;
pub mod untracked;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Engine and working tree shared by every subcommand.
#[derive(Clone)]
pub struct CommandContext {
    pub engine: DiffEngine,
    pub dir: PathBuf,
}

impl CommandContext {
    pub fn new(engine: DiffEngine, dir: PathBuf) -> Self {
        Self { engine, dir }
    }
}
