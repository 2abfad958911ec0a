//! SQLite-based run history

use crate::core::ExecutionStatus;
use crate::persistence::{HistoryBackend, RunSummary};
use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqliteRow};
use sqlx::Row;
use std::path::Path;
use uuid::Uuid;

/// SQLite run store
pub struct SqliteRunStore {
    pool: SqlitePool,
}

impl SqliteRunStore {
    /// Open (or create) a store at `db_path`
    pub async fn new(db_path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .context("Failed to connect to database")?;

        let store = Self { pool };
        store.init().await?;

        Ok(store)
    }

    /// Create store with default path
    pub async fn with_default_path() -> Result<Self> {
        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."));
        let db_dir = data_dir.join("fba-pipeline");
        std::fs::create_dir_all(&db_dir)
            .with_context(|| format!("Failed to create {}", db_dir.display()))?;

        Self::new(&db_dir.join("runs.db")).await
    }

    /// Initialize database schema
    async fn init(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS runs (
                id TEXT PRIMARY KEY,
                mode TEXT NOT NULL,
                status TEXT NOT NULL,
                started_at TEXT NOT NULL,
                completed_at TEXT,
                entries_succeeded INTEGER NOT NULL DEFAULT 0,
                entries_failed INTEGER NOT NULL DEFAULT 0,
                entries_skipped INTEGER NOT NULL DEFAULT 0,
                invocations INTEGER NOT NULL DEFAULT 0,
                failures TEXT NOT NULL DEFAULT '[]'
            );

            CREATE INDEX IF NOT EXISTS idx_runs_started_at ON runs(started_at);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Convert DateTime<Utc> to NaiveDateTime for SQLite
    fn to_naive(dt: DateTime<Utc>) -> NaiveDateTime {
        dt.naive_utc()
    }

    /// Convert NaiveDateTime to DateTime<Utc>
    fn from_naive(dt: NaiveDateTime) -> DateTime<Utc> {
        DateTime::from_naive_utc_and_offset(dt, Utc)
    }

    fn from_row(row: &SqliteRow) -> Result<RunSummary> {
        let status: String = row.get("status");
        let failures: String = row.get("failures");

        Ok(RunSummary {
            run_id: Uuid::parse_str(&row.get::<String, _>("id"))?,
            mode: row.get("mode"),
            status: ExecutionStatus::parse(&status)
                .with_context(|| format!("Unknown run status '{}'", status))?,
            started_at: Self::from_naive(row.get("started_at")),
            completed_at: row
                .get::<Option<NaiveDateTime>, _>("completed_at")
                .map(Self::from_naive),
            entries_succeeded: row.get::<i64, _>("entries_succeeded") as usize,
            entries_failed: row.get::<i64, _>("entries_failed") as usize,
            entries_skipped: row.get::<i64, _>("entries_skipped") as usize,
            invocations: row.get::<i64, _>("invocations") as usize,
            failures: serde_json::from_str(&failures).context("Corrupt failure records")?,
        })
    }
}

#[async_trait::async_trait]
impl HistoryBackend for SqliteRunStore {
    async fn save_run(&self, run: &RunSummary) -> Result<()> {
        sqlx::query(
            r#"
            INSERT OR REPLACE INTO runs
            (id, mode, status, started_at, completed_at, entries_succeeded, entries_failed,
             entries_skipped, invocations, failures)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(run.run_id.to_string())
        .bind(&run.mode)
        .bind(run.status.as_str())
        .bind(Self::to_naive(run.started_at))
        .bind(run.completed_at.map(Self::to_naive))
        .bind(run.entries_succeeded as i64)
        .bind(run.entries_failed as i64)
        .bind(run.entries_skipped as i64)
        .bind(run.invocations as i64)
        .bind(serde_json::to_string(&run.failures)?)
        .execute(&self.pool)
        .await
        .context("Failed to save run")?;

        Ok(())
    }

    async fn load_run(&self, run_id: Uuid) -> Result<Option<RunSummary>> {
        let row = sqlx::query("SELECT * FROM runs WHERE id = ?1")
            .bind(run_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .context("Failed to load run")?;

        row.as_ref().map(Self::from_row).transpose()
    }

    async fn list_runs(&self, limit: usize) -> Result<Vec<RunSummary>> {
        let rows = sqlx::query("SELECT * FROM runs ORDER BY started_at DESC LIMIT ?1")
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await
            .context("Failed to list runs")?;

        rows.iter().map(Self::from_row).collect()
    }
}
