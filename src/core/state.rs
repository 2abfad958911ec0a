//! Run state and the end-of-run report

use crate::core::model::{Phase, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Run has not started
    Pending,
    /// Run is in progress
    Running,
    /// Every entry succeeded
    Completed,
    /// At least one entry failed
    Failed,
    /// Interrupted before all entries were attempted
    Cancelled,
}

impl ExecutionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionStatus::Pending => "pending",
            ExecutionStatus::Running => "running",
            ExecutionStatus::Completed => "completed",
            ExecutionStatus::Failed => "failed",
            ExecutionStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ExecutionStatus::Pending),
            "running" => Some(ExecutionStatus::Running),
            "completed" => Some(ExecutionStatus::Completed),
            "failed" => Some(ExecutionStatus::Failed),
            "cancelled" => Some(ExecutionStatus::Cancelled),
            _ => None,
        }
    }
}

/// Classification of a recorded failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureKind {
    /// The tool ran and exited non-zero (or timed out)
    InvocationFailure,
    /// A required input file or output directory could not be resolved
    PathResolutionError,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvocationFailure => f.write_str("InvocationFailure"),
            FailureKind::PathResolutionError => f.write_str("PathResolutionError"),
        }
    }
}

/// A failure for one entry at one stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    pub entry: String,
    pub stage: Stage,
    pub kind: FailureKind,
    pub message: String,
}

/// What happened to one entry in one phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    /// All stages ran successfully
    Succeeded,
    /// A stage failed, later stages were not run
    Failed { stage: Stage },
    /// Not attempted
    Skipped { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryOutcome {
    pub entry: String,
    pub phase: Phase,
    pub status: EntryStatus,
    /// Number of invocations that completed successfully
    pub stages_completed: usize,
}

/// Accumulated result of a batch run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique run ID
    pub run_id: Uuid,

    /// Current status
    pub status: ExecutionStatus,

    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// When the run finished
    pub completed_at: Option<DateTime<Utc>>,

    /// Per-entry outcomes, in run order
    pub outcomes: Vec<EntryOutcome>,

    /// Failure records, in run order
    pub failures: Vec<FailureRecord>,

    /// Number of tool invocations issued
    pub invocations: usize,

    /// Model name to output name, for models whose artifacts are renamed
    #[serde(default)]
    pub output_names: BTreeMap<String, String>,
}

impl RunReport {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            started_at: None,
            completed_at: None,
            outcomes: Vec::new(),
            failures: Vec::new(),
            invocations: 0,
            output_names: BTreeMap::new(),
        }
    }

    /// Mark the run as started (idempotent across phases)
    pub fn start(&mut self) {
        if self.started_at.is_none() {
            self.started_at = Some(Utc::now());
        }
        self.status = ExecutionStatus::Running;
    }

    /// Mark the run finished, deriving the final status
    pub fn finish(&mut self, cancelled: bool) {
        self.status = if cancelled {
            ExecutionStatus::Cancelled
        } else if self.failures.is_empty() {
            ExecutionStatus::Completed
        } else {
            ExecutionStatus::Failed
        };
        self.completed_at = Some(Utc::now());
    }

    pub fn record_success(&mut self, entry: &str, phase: Phase, stages_completed: usize) {
        self.outcomes.push(EntryOutcome {
            entry: entry.to_string(),
            phase,
            status: EntryStatus::Succeeded,
            stages_completed,
        });
    }

    pub fn record_failure(&mut self, failure: FailureRecord, stages_completed: usize) {
        self.outcomes.push(EntryOutcome {
            entry: failure.entry.clone(),
            phase: failure.stage.phase(),
            status: EntryStatus::Failed {
                stage: failure.stage,
            },
            stages_completed,
        });
        self.failures.push(failure);
    }

    pub fn record_skipped(&mut self, entry: &str, phase: Phase, reason: impl Into<String>) {
        self.outcomes.push(EntryOutcome {
            entry: entry.to_string(),
            phase,
            status: EntryStatus::Skipped {
                reason: reason.into(),
            },
            stages_completed: 0,
        });
    }

    /// An entry whose remaining stages were not issued because the run was
    /// interrupted
    pub fn record_interrupted(&mut self, entry: &str, phase: Phase, stages_completed: usize) {
        self.outcomes.push(EntryOutcome {
            entry: entry.to_string(),
            phase,
            status: EntryStatus::Skipped {
                reason: "interrupted".to_string(),
            },
            stages_completed,
        });
    }

    /// Remember that `name` writes its artifacts as `output_name`
    pub fn record_output_name(&mut self, name: &str, output_name: &str) {
        if name != output_name {
            self.output_names
                .insert(name.to_string(), output_name.to_string());
        }
    }

    /// Label for an entry of either phase: `name → output_name` for renamed
    /// models, the entry itself otherwise
    pub fn entry_label(&self, entry: &str) -> String {
        if let Some(output_name) = self.output_names.get(entry) {
            return format!("{} → {}", entry, output_name);
        }
        match self.output_names.iter().find(|(_, out)| out.as_str() == entry) {
            Some((name, _)) => format!("{} → {}", name, entry),
            None => entry.to_string(),
        }
    }

    fn entries_with(&self, phase: Option<Phase>, pred: impl Fn(&EntryStatus) -> bool) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|o| phase.map_or(true, |p| o.phase == p) && pred(&o.status))
            .map(|o| o.entry.as_str())
            .collect()
    }

    pub fn succeeded(&self, phase: Option<Phase>) -> Vec<&str> {
        self.entries_with(phase, |s| matches!(s, EntryStatus::Succeeded))
    }

    pub fn failed(&self, phase: Option<Phase>) -> Vec<&str> {
        self.entries_with(phase, |s| matches!(s, EntryStatus::Failed { .. }))
    }

    pub fn skipped(&self, phase: Option<Phase>) -> Vec<&str> {
        self.entries_with(phase, |s| matches!(s, EntryStatus::Skipped { .. }))
    }

    /// Phases that have at least one outcome, in run order
    pub fn phases(&self) -> Vec<Phase> {
        let mut phases = Vec::new();
        for outcome in &self.outcomes {
            if !phases.contains(&outcome.phase) {
                phases.push(outcome.phase);
            }
        }
        phases
    }

    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }
}

impl Default for RunReport {
    fn default() -> Self {
        Self::new()
    }
}
