//! Subprocess runner - spawns the external tools and waits for them

use crate::tool::{Invocation, ToolError, ToolOutput, ToolRunner};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

/// Runs invocations as child processes
#[derive(Debug, Clone)]
pub struct SubprocessRunner {
    /// Timeout for a single invocation in seconds
    timeout_secs: u64,
}

impl SubprocessRunner {
    /// Create a new subprocess runner
    ///
    /// # Arguments
    /// * `timeout_secs` - Upper bound on one tool run; the child is killed
    ///   when it is exceeded
    pub fn new(timeout_secs: u64) -> Self {
        Self { timeout_secs }
    }

    pub fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

#[async_trait]
impl ToolRunner for SubprocessRunner {
    /// Run the invocation to completion and capture its output
    ///
    /// # Errors
    /// Returns `ToolError` if:
    /// - The program cannot be found (`NotFound`)
    /// - The process cannot be spawned (`Io`)
    /// - The process exits with a non-zero status (`NonZeroExit`)
    /// - The process runs longer than the timeout (`Timeout`)
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError> {
        debug!("Spawning {}", invocation.command_line());

        let timeout_duration = Duration::from_secs(self.timeout_secs);

        let result = timeout(
            timeout_duration,
            Command::new(&invocation.program)
                .args(&invocation.args)
                .stdin(Stdio::null())
                .kill_on_drop(true)
                .output(),
        )
        .await
        .map_err(|_| ToolError::Timeout(self.timeout_secs))?;

        let output = result.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ToolError::NotFound {
                program: invocation.program.clone(),
            },
            _ => ToolError::Io(format!("Failed to spawn {}: {}", invocation.program, e)),
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        for line in stdout.lines() {
            debug!("[{}] {}", invocation.program, line);
        }
        for line in stderr.lines() {
            debug!("[{} stderr] {}", invocation.program, line);
        }

        if !output.status.success() {
            let code = output.status.code();
            warn!(
                "{} exited with code {}: {}",
                invocation.program,
                code.unwrap_or(-1),
                stderr.trim()
            );
            return Err(ToolError::NonZeroExit {
                program: invocation.program.clone(),
                code,
                stderr,
            });
        }

        Ok(ToolOutput { stdout, stderr })
    }
}
