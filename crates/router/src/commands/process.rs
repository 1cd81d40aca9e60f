//! Subprocess plumbing shared by the engine-backed commands.

use std::{process::Stdio, time::Duration};

use {
    tokio::{
        io::AsyncWriteExt,
        process::Command,
        time::timeout,
    },
    tracing::{debug, warn},
};

use crate::{Error, Result};

/// Upper bound on any single engine invocation.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Captured result of a finished process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Run `command`, feeding `input` on stdin when given, and collect its
/// output. The child is killed if it outlives `limit`.
pub async fn run(mut command: Command, input: Option<String>, limit: Duration) -> Result<ProcessOutput> {
    command
        .stdin(if input.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = command.spawn()?;
    if let (Some(input), Some(mut stdin)) = (input, child.stdin.take()) {
        // Written from its own task so a chatty child cannot deadlock us.
        tokio::spawn(async move {
            if let Err(e) = stdin.write_all(input.as_bytes()).await {
                debug!(error = %e, "child closed stdin early");
            }
        });
    }

    let output = match timeout(limit, child.wait_with_output()).await {
        Ok(output) => output?,
        Err(_) => {
            warn!(?limit, "subprocess timed out");
            return Err(Error::message(format!(
                "process timed out after {}s",
                limit.as_secs()
            )));
        },
    };

    Ok(ProcessOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
