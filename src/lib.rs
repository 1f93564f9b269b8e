// ghost-patch library - capture and replay working tree state as patch artifacts
// This exposes the diff engine and its process runner for testing and integration

pub mod cli;
pub mod config;
pub mod external;
pub mod git;
pub mod telemetry;

// Re-export key types for easy access
pub use config::{GhostPatchConfig, GitConfig, LoggingConfig};
pub use external::{CommandError, CommandExecutor, CommandSpec, ProcessCommandExecutor, ProcessOutcome};
pub use git::{AggregateError, DiffEngine, GhostError};
pub use telemetry::{generate_correlation_id, init_telemetry};
