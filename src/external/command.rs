//! Base command execution abstraction
//!
//! Provides the foundational trait for running external commands, enabling
//! dependency injection for testing. Standard output is streamed into a
//! caller-supplied sink through a fixed-size buffer, standard error is
//! captured in full.

use async_trait::async_trait;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::process::Command;

/// Size of the intermediate buffer used to drain a child's stdout.
pub const DEFAULT_COPY_BUFFER_SIZE: usize = 8 * 1024;

/// Directory context, program and argv of one external invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub dir: PathBuf,
    pub program: String,
    pub args: Vec<OsString>,
}

impl CommandSpec {
    pub fn new(dir: impl AsRef<Path>, program: impl Into<String>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    /// Space-joined argv, without the directory.
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(&arg.to_string_lossy());
        }
        line
    }
}

impl fmt::Display for CommandSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (in {})", self.command_line(), self.dir.display())
    }
}

/// Exit status and captured stderr of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutcome {
    pub status_code: i32,
    pub stderr: Vec<u8>,
    pub bytes_written: u64,
}

impl ProcessOutcome {
    pub fn success(&self) -> bool {
        self.status_code == 0
    }

    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim_end().to_string()
    }

    /// Turn a non-zero exit into `CommandError::ExecutionFailed`.
    pub fn check(self, spec: &CommandSpec) -> Result<Self, CommandError> {
        if self.success() {
            Ok(self)
        } else {
            Err(CommandError::ExecutionFailed {
                command: spec.command_line(),
                status_code: self.status_code,
                stderr: self.stderr_text(),
            })
        }
    }
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("`{command}` exited with status {status_code}: {stderr}")]
    ExecutionFailed {
        command: String,
        status_code: i32,
        stderr: String,
    },
    #[error("Command not found: {command}")]
    CommandNotFound { command: String },
    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to stream output of `{command}`: {source}")]
    Output {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl CommandError {
    /// Exit status of a command that ran and failed.
    pub fn status_code(&self) -> Option<i32> {
        match self {
            CommandError::ExecutionFailed { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }
}

/// Trait for executing external commands
///
/// This abstraction allows the diff engine to run git without directly
/// depending on `tokio::process::Command`, enabling testing with scripted
/// fakes. A non-zero exit is reported through `ProcessOutcome`, not as an
/// `Err`; callers decide which statuses are acceptable.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    async fn run(
        &self,
        spec: &CommandSpec,
        stdout: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<ProcessOutcome, CommandError>;
}

/// Real implementation using `tokio::process::Command`
#[derive(Debug, Clone)]
pub struct ProcessCommandExecutor {
    buffer_size: usize,
}

impl Default for ProcessCommandExecutor {
    fn default() -> Self {
        Self {
            buffer_size: DEFAULT_COPY_BUFFER_SIZE,
        }
    }
}

impl ProcessCommandExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            buffer_size: buffer_size.max(1),
        }
    }
}

/// Drain `reader` into `writer` through one fixed buffer.
pub(crate) async fn copy_bounded<R, W>(
    reader: &mut R,
    writer: &mut W,
    buffer_size: usize,
) -> std::io::Result<u64>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    let mut buf = vec![0u8; buffer_size.max(1)];
    let mut total = 0u64;
    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n]).await?;
        total += n as u64;
    }
    writer.flush().await?;
    Ok(total)
}

#[async_trait]
impl CommandExecutor for ProcessCommandExecutor {
    async fn run(
        &self,
        spec: &CommandSpec,
        stdout: &mut (dyn AsyncWrite + Unpin + Send),
    ) -> Result<ProcessOutcome, CommandError> {
        let mut child = Command::new(&spec.program)
            .args(&spec.args)
            .current_dir(&spec.dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound && spec.dir.is_dir() {
                    CommandError::CommandNotFound {
                        command: spec.program.clone(),
                    }
                } else {
                    CommandError::Spawn {
                        command: spec.command_line(),
                        source: e,
                    }
                }
            })?;

        let output_error = |source| CommandError::Output {
            command: spec.command_line(),
            source,
        };

        let (mut child_stdout, mut child_stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(out), Some(err)) => (out, err),
            _ => {
                let _ = child.kill().await;
                return Err(output_error(std::io::Error::other("child pipes unavailable")));
            }
        };

        // stderr is drained alongside stdout so neither pipe can fill up and stall the child.
        let mut stderr = Vec::new();
        let (copied, captured) = tokio::join!(
            copy_bounded(&mut child_stdout, stdout, self.buffer_size),
            child_stderr.read_to_end(&mut stderr),
        );

        let bytes_written = match copied.and_then(|n| captured.map(|_| n)) {
            Ok(n) => n,
            Err(e) => {
                let _ = child.kill().await;
                return Err(output_error(e));
            }
        };

        let status = child.wait().await.map_err(output_error)?;

        Ok(ProcessOutcome {
            status_code: status.code().unwrap_or(-1),
            stderr,
            bytes_written,
        })
    }
}
