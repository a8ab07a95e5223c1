// ABOUTME: Typed argv runner for external binaries.
// ABOUTME: Structured arguments only; secrets travel over stdin, never argv.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use super::error::{CommandError, ExitedSnafu, LaunchSnafu};
use snafu::ResultExt;

/// One external invocation: program, argument vector, optional stdin and
/// working directory. No shell is ever involved.
#[derive(Debug, Clone)]
pub(crate) struct CommandSpec {
    program: String,
    args: Vec<String>,
    stdin: Option<Vec<u8>>,
    cwd: Option<PathBuf>,
}

impl CommandSpec {
    pub(crate) fn new(program: &str) -> Self {
        Self {
            program: program.to_string(),
            args: Vec::new(),
            stdin: None,
            cwd: None,
        }
    }

    pub(crate) fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub(crate) fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Bytes piped to the child's stdin (used for registry passwords).
    pub(crate) fn stdin(mut self, bytes: impl Into<Vec<u8>>) -> Self {
        self.stdin = Some(bytes.into());
        self
    }

    pub(crate) fn cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

/// Captured output of a completed invocation. Failure details live in
/// `CommandError`; success only ever needs stdout.
#[derive(Debug)]
pub(crate) struct CommandOutput {
    pub(crate) stdout: String,
}

/// Run the command to completion, enforcing `timeout`.
///
/// A non-zero exit is an error carrying the exit code and stderr; the
/// caller never has to inspect a status itself.
pub(crate) async fn run(
    spec: CommandSpec,
    timeout: Duration,
) -> Result<CommandOutput, CommandError> {
    tracing::debug!(program = %spec.program, args = ?spec.args, "running external command");

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .stdin(if spec.stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(ref dir) = spec.cwd {
        cmd.current_dir(dir);
    }

    let mut child = cmd.spawn().context(LaunchSnafu {
        program: spec.program.clone(),
    })?;

    if let Some(bytes) = spec.stdin {
        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&bytes).await.context(LaunchSnafu {
                program: spec.program.clone(),
            })?;
            // Dropping stdin closes the pipe so the child sees EOF.
        }
    }

    let waited = tokio::time::timeout(timeout, child.wait_with_output()).await;

    let output = match waited {
        Ok(result) => result.context(LaunchSnafu {
            program: spec.program.clone(),
        })?,
        Err(_) => {
            return Err(CommandError::TimedOut {
                program: spec.program,
                timeout,
            });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

    if !output.status.success() {
        let code = output.status.code().unwrap_or(-1);
        return Err(ExitedSnafu {
            program: spec.program,
            code,
            stderr: stderr.trim_end().to_string(),
        }
        .build());
    }

    // Successful calls still chatter on stderr (git warnings, pull progress).
    if !stderr.trim().is_empty() {
        tracing::debug!(program = %spec.program, stderr = %stderr.trim_end(), "command stderr");
    }

    Ok(CommandOutput { stdout })
}
