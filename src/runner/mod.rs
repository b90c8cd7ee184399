//! Wrapped-tool subprocess execution with live output relay.
//!
//! The tool's stdout and stderr are copied byte-for-byte to ours by two
//! independent tasks, one per stream, so neither stream can block the
//! other. The relay tasks end when their stream closes; no cancellation
//! is needed because their lifetime is bounded by the child's.

use std::process::{ExitStatus, Stdio};

use thiserror::Error;

/// Errors from running the wrapped tool.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("failed to launch {tool}: {source}")]
    Spawn {
        tool: String,
        source: std::io::Error,
    },

    #[error("failed to wait for {tool}: {source}")]
    Wait {
        tool: String,
        source: std::io::Error,
    },

    #[error("output relay task failed: {0}")]
    Relay(#[from] tokio::task::JoinError),

    #[error("{tool} exited with {status}")]
    Failed { tool: String, status: ExitStatus },
}

/// Run the tool with the given arguments, relaying its output.
///
/// Blocks until the child exits and both relay tasks have drained.
/// A non-zero exit is reported as [`RunError::Failed`]; the tool's own
/// diagnostics have already been relayed at that point.
pub async fn run_tool(tool: &str, args: &[String]) -> Result<(), RunError> {
    let mut child = tokio::process::Command::new(tool)
        .args(args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| RunError::Spawn {
            tool: tool.to_string(),
            source: e,
        })?;

    let child_stdout = child.stdout.take();
    let child_stderr = child.stderr.take();

    let stdout_relay = tokio::spawn(async move {
        if let Some(mut stream) = child_stdout {
            let _ = tokio::io::copy(&mut stream, &mut tokio::io::stdout()).await;
        }
    });
    let stderr_relay = tokio::spawn(async move {
        if let Some(mut stream) = child_stderr {
            let _ = tokio::io::copy(&mut stream, &mut tokio::io::stderr()).await;
        }
    });

    let status = child.wait().await.map_err(|e| RunError::Wait {
        tool: tool.to_string(),
        source: e,
    })?;
    stdout_relay.await?;
    stderr_relay.await?;

    if status.success() {
        Ok(())
    } else {
        Err(RunError::Failed {
            tool: tool.to_string(),
            status,
        })
    }
}
