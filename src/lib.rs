//! fba-pipeline - builds metabolic networks and centrality tables from FBA models
//! by driving external tools over a fixed model table

pub mod cli;
pub mod core;
pub mod execution;
pub mod persistence;
pub mod tool;

// Re-export commonly used types
pub use core::config::PipelineConfig;
pub use core::{ExecutionStatus, ModelEntry, NetworkEntry, Phase, RunReport, SourceFormat, Stage};
pub use execution::{DriverError, ExecutionEvent, PipelineDriver, PlannedInvocation, Planner};
pub use tool::{Invocation, SubprocessRunner, ToolError, ToolOutput, ToolRunner};
