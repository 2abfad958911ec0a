//! Persistence layer for run history

#[cfg(feature = "sqlite")]
pub mod store;

#[cfg(feature = "sqlite")]
pub use store::SqliteRunStore;

pub use crate::core::ExecutionStatus;
use crate::core::{FailureRecord, RunReport};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

/// Summary of a batch run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique run ID
    pub run_id: Uuid,

    /// Which phases ran ("networks", "centralities" or "all")
    pub mode: String,

    /// Final status
    pub status: ExecutionStatus,

    /// When the run started
    pub started_at: DateTime<Utc>,

    /// When the run finished
    pub completed_at: Option<DateTime<Utc>>,

    pub entries_succeeded: usize,
    pub entries_failed: usize,
    pub entries_skipped: usize,

    /// Number of tool invocations issued
    pub invocations: usize,

    /// Failure records of the run
    pub failures: Vec<FailureRecord>,
}

/// Trait for history backends
#[async_trait::async_trait]
pub trait HistoryBackend: Send + Sync {
    /// Save a run
    async fn save_run(&self, run: &RunSummary) -> Result<()>;

    /// Load a run by ID
    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>>;

    /// List the most recent runs, newest first
    async fn list_runs(&self, limit: usize) -> Result<Vec<RunSummary>>;
}

/// In-memory history (for testing or ephemeral use)
pub struct InMemoryHistory {
    runs: tokio::sync::RwLock<Vec<RunSummary>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self {
            runs: tokio::sync::RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl HistoryBackend for InMemoryHistory {
    async fn save_run(&self, run: &RunSummary) -> Result<()> {
        let mut runs = self.runs.write().await;
        runs.retain(|r| r.run_id != run.run_id);
        runs.push(run.clone());
        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
        let runs = self.runs.read().await;
        Ok(runs.iter().find(|r| r.run_id == run_id).cloned())
    }

    async fn list_runs(&self, limit: usize) -> Result<Vec<RunSummary>> {
        let runs = self.runs.read().await;
        let mut result: Vec<RunSummary> = runs.clone();
        result.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        result.truncate(limit);
        Ok(result)
    }
}

/// Create a summary from a finished report
pub fn create_summary(report: &RunReport, mode: &str) -> RunSummary {
    RunSummary {
        run_id: report.run_id,
        mode: mode.to_string(),
        status: report.status,
        started_at: report.started_at.unwrap_or_else(Utc::now),
        completed_at: report.completed_at,
        entries_succeeded: report.succeeded(None).len(),
        entries_failed: report.failed(None).len(),
        entries_skipped: report.skipped(None).len(),
        invocations: report.invocations,
        failures: report.failures.clone(),
    }
}

/// Save a finished run. A history failure is logged and never changes the
/// outcome of the run itself.
pub async fn record_run(
    store: &dyn HistoryBackend,
    report: &RunReport,
    mode: &str,
) -> Option<RunSummary> {
    let summary = create_summary(report, mode);
    match store.save_run(&summary).await {
        Ok(()) => Some(summary),
        Err(e) => {
            warn!("Failed to save run {} to history: {:#}", summary.run_id, e);
            None
        }
    }
}
