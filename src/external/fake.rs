//! Scripted executor for driving the diff engine without a real git binary.

use super::command::{CommandError, CommandExecutor, CommandSpec, ProcessOutcome};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Canned response for one command line.
#[derive(Debug, Clone, Default)]
pub struct ScriptedResponse {
    pub status_code: i32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub not_found: bool,
}

impl ScriptedResponse {
    pub fn ok(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Self::default()
        }
    }

    pub fn exit(status_code: i32, stdout: impl Into<Vec<u8>>, stderr: impl Into<Vec<u8>>) -> Self {
        Self {
            status_code,
            stdout: stdout.into(),
            stderr: stderr.into(),
            not_found: false,
        }
    }

    pub fn not_found() -> Self {
        Self {
            not_found: true,
            ..Self::default()
        }
    }
}

/// Responds to command lines registered with `expect_command`; anything else
/// behaves like a missing binary. Every invocation is recorded.
#[derive(Debug, Default)]
pub struct FakeCommandExecutor {
    responses: HashMap<String, ScriptedResponse>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl FakeCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_command(mut self, program: &str, args: &[&str], response: ScriptedResponse) -> Self {
        let key = format!("{} {}", program, args.join(" "));
        self.responses.insert(key, response);
        self
    }

    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_lines(&self) -> Vec<String> {
        self.calls().iter().map(CommandSpec::command_line).collect()
    }
}

#[async_trait]
impl CommandExecutor for FakeCommandExecutor {
    async fn run(
        &self,
        spec: &CommandSpec,
        stdout: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<ProcessOutcome, CommandError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(spec.clone());
        }

        let response = match self.responses.get(&spec.command_line()) {
            Some(r) if !r.not_found => r.clone(),
            _ => {
                return Err(CommandError::CommandNotFound {
                    command: spec.program.clone(),
                })
            }
        };

        let output_error = |source| CommandError::Output {
            command: spec.command_line(),
            source,
        };
        stdout.write_all(&response.stdout).await.map_err(output_error)?;
        stdout.flush().await.map_err(output_error)?;

        Ok(ProcessOutcome {
            status_code: response.status_code,
            stderr: response.stderr,
            bytes_written: response.stdout.len() as u64,
        })
    }
}
