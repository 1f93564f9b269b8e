use anyhow::Result;
use clap::Parser;
use ghost_patch::cli::commands::bundle::{ApplyBundleCommand, CreateBundleCommand};
use ghost_patch::cli::commands::patch::{AppendPatchCommand, ApplyPatchCommand, CreatePatchCommand};
use ghost_patch::cli::commands::untracked::UntrackedCommand;
use ghost_patch::cli::commands::{Command, CommandContext};
use ghost_patch::cli::{render_error, BundleAction, Cli, Commands, PatchAction};
use ghost_patch::telemetry::{create_command_span, generate_correlation_id, init_telemetry};
use ghost_patch::{DiffEngine, GhostPatchConfig};
use std::process::ExitCode;
use tracing::Instrument;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("❌ {}", render_error(&e));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let env_file = GhostPatchConfig::load_env_file();
    let mut config = GhostPatchConfig::load()?;
    if cli.json_logs {
        config.logging.json = true;
    }
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    init_telemetry(&config.logging)?;
    match env_file {
        Ok(Some(path)) => tracing::info!(path = %path.display(), "Loaded environment variables from .env file"),
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "failed to load .env file"),
    }

    let ctx = CommandContext::new(DiffEngine::from_config(&config.git), cli.dir.clone());
    let correlation_id = generate_correlation_id();

    tokio::runtime::Runtime::new()?.block_on(async {
        match cli.command {
            Commands::Bundle { action } => match action {
                BundleAction::Create { from, to, output } => {
                    let span = create_command_span("bundle create", &cli.dir, &correlation_id);
                    CreateBundleCommand { ctx, from, to, output }
                        .execute()
                        .instrument(span)
                        .await
                }
                BundleAction::Apply { bundle } => {
                    let span = create_command_span("bundle apply", &cli.dir, &correlation_id);
                    ApplyBundleCommand { ctx, bundle }.execute().instrument(span).await
                }
            },
            Commands::Patch { action } => match action {
                PatchAction::Create {
                    base,
                    output,
                    include_untracked,
                } => {
                    let span = create_command_span("patch create", &cli.dir, &correlation_id);
                    CreatePatchCommand {
                        ctx,
                        base,
                        output,
                        include_untracked,
                    }
                    .execute()
                    .instrument(span)
                    .await
                }
                PatchAction::Append { patch, paths } => {
                    let span = create_command_span("patch append", &cli.dir, &correlation_id);
                    AppendPatchCommand { ctx, patch, paths }
                        .execute()
                        .instrument(span)
                        .await
                }
                PatchAction::Apply { patch } => {
                    let span = create_command_span("patch apply", &cli.dir, &correlation_id);
                    ApplyPatchCommand { ctx, patch }.execute().instrument(span).await
                }
            },
            Commands::Untracked => {
                let span = create_command_span("untracked", &cli.dir, &correlation_id);
                UntrackedCommand { ctx }.execute().instrument(span).await
            }
        }
    })
}

