//! External tool invocation

pub mod error;
pub mod invocation;
pub mod subprocess;

use async_trait::async_trait;
pub use error::ToolError;
pub use invocation::{resolve_program, Invocation, ToolOutput};
pub use subprocess::SubprocessRunner;

/// Trait for running external tools - allows for different implementations
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Run one invocation and wait for it to exit
    async fn run(&self, invocation: &Invocation) -> Result<ToolOutput, ToolError>;

    /// Check that a program can be found before a run starts
    fn is_available(&self, program: &str) -> bool {
        resolve_program(program).is_some()
    }
}
