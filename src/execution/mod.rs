//! Pipeline execution

pub mod engine;
pub mod error;
pub mod plan;

pub use engine::{EventHandler, ExecutionEvent, PipelineDriver};
pub use error::DriverError;
pub use plan::{PlannedInvocation, Planner};
