//! Errors that abort a whole run

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    /// An external tool is missing or not executable
    #[error("Tool '{tool}' not found: {program} is missing or not executable")]
    ToolNotFound { tool: String, program: String },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}
