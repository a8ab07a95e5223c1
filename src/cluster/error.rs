// ABOUTME: Control-plane command error with SNAFU pattern.
// ABOUTME: Unifies launch, timeout, and non-zero-exit failures for programmatic handling.

use snafu::Snafu;
use std::time::Duration;

/// A failed control-plane invocation.
///
/// The stderr text is preserved verbatim: it is the primary debugging aid
/// for whoever operates the cluster.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum CommandError {
    #[snafu(display("failed to launch {program}: {source}"))]
    Launch {
        program: String,
        source: std::io::Error,
    },

    #[snafu(display("{program} timed out after {}s", timeout.as_secs()))]
    TimedOut { program: String, timeout: Duration },

    #[snafu(display("{program} exited with status {code}: {stderr}"))]
    Exited {
        program: String,
        code: i32,
        stderr: String,
    },
}

/// Error kind for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandErrorKind {
    /// The binary could not be spawned at all.
    Launch,
    /// The per-call timeout expired.
    TimedOut,
    /// The call ran and reported failure.
    Exited,
}

impl CommandError {
    pub fn kind(&self) -> CommandErrorKind {
        match self {
            CommandError::Launch { .. } => CommandErrorKind::Launch,
            CommandError::TimedOut { .. } => CommandErrorKind::TimedOut,
            CommandError::Exited { .. } => CommandErrorKind::Exited,
        }
    }

    /// Raw stderr if the call ran to a non-zero exit.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            CommandError::Exited { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}
