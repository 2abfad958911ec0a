//! Tool invocation errors

use thiserror::Error;

/// Error types for external tool invocations
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{program}: command not found")]
    NotFound { program: String },

    #[error("{program} exited with {}{}", exit_label(.code), stderr_suffix(.stderr))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("I/O error: {0}")]
    Io(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {}", code),
        None => "signal".to_string(),
    }
}

fn stderr_suffix(stderr: &str) -> String {
    let last = stderr.lines().rev().find(|l| !l.trim().is_empty());
    match last {
        Some(line) => format!(": {}", line.trim()),
        None => String::new(),
    }
}
