//! Core domain models
//!
//! This module defines the model table, the data layout that turns entries
//! into artifact paths, configuration, and the run report.

pub mod config;
pub mod layout;
pub mod model;
pub mod state;

pub use layout::*;
pub use model::*;
pub use state::*;
