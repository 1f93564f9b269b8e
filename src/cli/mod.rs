use crate::git::GhostError;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

#[derive(Parser)]
#[command(name = "ghost-patch")]
#[command(about = "Capture and replay working tree state as portable patch artifacts")]
#[command(long_about = "ghost-patch serializes committed history into mailbox-format bundles and \
                       uncommitted changes into patch files, then replays them onto another checkout. \
                       Artifacts stay local; moving them between machines is up to you.")]
pub struct Cli {
    /// Working tree to operate on
    #[arg(short = 'C', long = "dir", global = true, default_value = ".")]
    pub dir: PathBuf,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create or apply commit-range bundles
    Bundle {
        #[command(subcommand)]
        action: BundleAction,
    },
    /// Create, extend or apply working-tree patches
    Patch {
        #[command(subcommand)]
        action: PatchAction,
    },
    /// List untracked, non-ignored files
    Untracked,
}

#[derive(Subcommand)]
pub enum BundleAction {
    /// Write the commits in FROM..TO (first-parent) as a patch series
    Create {
        /// Exclusive start of the range
        #[arg(long)]
        from: String,
        /// Inclusive end of the range
        #[arg(long, default_value = "HEAD")]
        to: String,
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Replay a bundle with `git am`, aborting on any failure
    Apply {
        /// Bundle file to apply
        bundle: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum PatchAction {
    /// Write uncommitted changes against BASE
    Create {
        /// Base revision
        #[arg(long, default_value = "HEAD")]
        base: String,
        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
        /// Append untracked files as additions
        #[arg(long, help = "Append every untracked, non-ignored file as a new-file diff")]
        include_untracked: bool,
    },
    /// Append new-file diffs for PATHS to an existing patch
    Append {
        /// Patch file to extend
        patch: PathBuf,
        /// Files, relative to the working tree
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Apply a patch with `git apply`; an empty patch is a no-op
    Apply {
        /// Patch file to apply
        patch: PathBuf,
    },
}

/// One-line failure text: every context message down to the first engine
/// error, whose own message already lists its causes.
pub fn render_error(err: &anyhow::Error) -> String {
    let mut parts = Vec::new();
    for cause in err.chain() {
        parts.push(cause.to_string());
        if cause.is::<GhostError>() {
            break;
        }
    }
    parts.join(": ")
}
