//! CLI command definitions

use crate::core::{ModelEntry, NetworkEntry};
use crate::execution::{PlannedInvocation, Planner};
use clap::Args;
use std::path::PathBuf;

/// Run the pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Which phases to run
    #[arg(long, value_enum, default_value_t = StageArg::All)]
    pub stage: StageArg,

    /// Data root (overrides the config file)
    #[arg(long)]
    pub data_root: Option<PathBuf>,

    /// Models to process: table names, or name:format[:output_name]
    #[arg(long, value_delimiter = ',')]
    pub models: Vec<String>,

    /// Print the commands that would run without running them
    #[arg(long)]
    pub dry_run: bool,

    /// Don't save the run to history
    #[arg(long)]
    pub no_history: bool,
}

impl RunCommand {
    /// Invocations the selected stage would issue for `models`, in run order
    pub fn plan(&self, planner: &Planner, models: &[ModelEntry]) -> Vec<PlannedInvocation> {
        let mut planned = Vec::new();
        if self.stage != StageArg::Centralities {
            planned.extend(planner.plan_networks(models));
        }
        if self.stage != StageArg::Networks {
            let networks: Vec<NetworkEntry> = models.iter().map(|m| m.network_entry()).collect();
            planned.extend(planner.plan_centralities(&networks));
        }
        planned
    }
}

/// Validate the configuration
#[derive(Debug, Args, Clone)]
pub struct ValidateCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// List configured models
#[derive(Debug, Args, Clone)]
pub struct ListCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

/// Show run history
#[derive(Debug, Args, Clone)]
pub struct HistoryCommand {
    /// Number of recent runs to show
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Show a specific run
    #[arg(long)]
    pub run_id: Option<String>,
}

/// Phase selection argument
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum StageArg {
    All,
    Networks,
    Centralities,
}

impl StageArg {
    /// Label stored in run history
    pub fn as_str(&self) -> &'static str {
        match self {
            StageArg::All => "all",
            StageArg::Networks => "networks",
            StageArg::Centralities => "centralities",
        }
    }
}
