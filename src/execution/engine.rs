//! Pipeline driver - runs the planned invocations phase by phase

use crate::{
    core::{
        config::PipelineConfig, FailureKind, FailureRecord, ModelEntry, NetworkEntry, Phase,
        RunReport, Stage,
    },
    execution::{DriverError, PlannedInvocation, Planner},
    tool::{ToolError, ToolRunner},
};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Events that can occur during a run
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    PhaseStarted {
        run_id: Uuid,
        phase: Phase,
        entries: usize,
    },
    InvocationStarted {
        entry: String,
        stage: Stage,
        command: String,
    },
    InvocationCompleted {
        entry: String,
        stage: Stage,
        elapsed: Duration,
    },
    EntryCompleted {
        entry: String,
        phase: Phase,
    },
    EntryFailed {
        failure: FailureRecord,
    },
    EntrySkipped {
        entry: String,
        phase: Phase,
        reason: String,
    },
    Interrupted {
        phase: Phase,
    },
    RunCompleted {
        run_id: Uuid,
        report: RunReport,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&ExecutionEvent) + Send + Sync>;

/// How a single entry ended
enum EntryRun {
    Completed,
    Failed,
    Interrupted,
}

/// Drives the external tools over the model table, one process at a time
pub struct PipelineDriver<R> {
    runner: R,
    planner: Planner,
    interrupted: Arc<AtomicBool>,
    event_handlers: Vec<EventHandler>,
}

impl<R: ToolRunner> PipelineDriver<R> {
    pub fn new(runner: R, config: &PipelineConfig) -> Result<Self, DriverError> {
        Ok(Self {
            runner,
            planner: Planner::new(config)?,
            interrupted: Arc::new(AtomicBool::new(false)),
            event_handlers: Vec::new(),
        })
    }

    /// Add an event handler
    pub fn with_event_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
        self
    }

    /// Share an interrupt flag; once set, no further invocations are issued
    pub fn with_interrupt_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupted = flag;
        self
    }

    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        self.interrupted.clone()
    }

    pub fn planner(&self) -> &Planner {
        &self.planner
    }

    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    /// Check that every tool needed by `phases` is available
    pub fn preflight(&self, phases: &[Phase]) -> Result<(), DriverError> {
        for phase in phases {
            let programs = match phase {
                Phase::Networks => self.planner.network_programs(),
                Phase::Centralities => self.planner.centrality_programs(),
            };
            for (tool, program) in programs {
                if !self.runner.is_available(program) {
                    error!("Tool '{}' not found: {}", tool, program);
                    return Err(DriverError::ToolNotFound {
                        tool: tool.to_string(),
                        program: program.to_string(),
                    });
                }
                debug!("Tool '{}' resolved: {}", tool, program);
            }
        }
        Ok(())
    }

    /// Build the reaction and metabolite networks for each model, in order
    pub async fn build_networks(&self, models: &[ModelEntry]) -> Result<RunReport, DriverError> {
        self.preflight(&[Phase::Networks])?;

        let mut report = RunReport::new();
        report.start();
        let cancelled = self.networks_phase(models, &mut report).await?;
        Ok(self.finish(report, cancelled))
    }

    /// Build the centrality tables for each network entry, in order
    pub async fn build_centralities(
        &self,
        networks: &[NetworkEntry],
    ) -> Result<RunReport, DriverError> {
        self.preflight(&[Phase::Centralities])?;

        let mut report = RunReport::new();
        report.start();
        let cancelled = self
            .centralities_phase(networks, &HashSet::new(), &mut report)
            .await?;
        Ok(self.finish(report, cancelled))
    }

    /// Run both phases. Models that fail the network phase are skipped in
    /// the centrality phase.
    pub async fn run_all(&self, models: &[ModelEntry]) -> Result<RunReport, DriverError> {
        self.preflight(&[Phase::Networks, Phase::Centralities])?;

        let mut report = RunReport::new();
        report.start();

        let mut cancelled = self.networks_phase(models, &mut report).await?;
        if !cancelled {
            let failed: HashSet<String> = report
                .failed(Some(Phase::Networks))
                .into_iter()
                .filter_map(|name| models.iter().find(|m| m.name == name))
                .map(|m| m.output_name().to_string())
                .collect();
            let networks: Vec<NetworkEntry> = models.iter().map(|m| m.network_entry()).collect();
            cancelled = self
                .centralities_phase(&networks, &failed, &mut report)
                .await?;
        }

        Ok(self.finish(report, cancelled))
    }

    fn finish(&self, mut report: RunReport, cancelled: bool) -> RunReport {
        report.finish(cancelled);
        info!(
            "Run {} finished: {:?} ({} invocations, {} failures)",
            report.run_id,
            report.status,
            report.invocations,
            report.failures.len()
        );
        self.emit_event(ExecutionEvent::RunCompleted {
            run_id: report.run_id,
            report: report.clone(),
        });
        report
    }

    /// Returns whether the phase was interrupted
    async fn networks_phase(
        &self,
        models: &[ModelEntry],
        report: &mut RunReport,
    ) -> Result<bool, DriverError> {
        info!("Building networks for {} models", models.len());
        self.emit_event(ExecutionEvent::PhaseStarted {
            run_id: report.run_id,
            phase: Phase::Networks,
            entries: models.len(),
        });

        for model in models {
            report.record_output_name(&model.name, model.output_name());
        }
        let entries: Vec<(String, Vec<PlannedInvocation>)> = models
            .iter()
            .map(|m| (m.name.clone(), self.planner.network_invocations(m)))
            .collect();
        self.run_phase(Phase::Networks, entries, &HashSet::new(), report)
            .await
    }

    async fn centralities_phase(
        &self,
        networks: &[NetworkEntry],
        skip: &HashSet<String>,
        report: &mut RunReport,
    ) -> Result<bool, DriverError> {
        info!("Building centralities for {} networks", networks.len());
        self.emit_event(ExecutionEvent::PhaseStarted {
            run_id: report.run_id,
            phase: Phase::Centralities,
            entries: networks.len(),
        });

        let entries: Vec<(String, Vec<PlannedInvocation>)> = networks
            .iter()
            .map(|n| (n.name.clone(), self.planner.centrality_invocations(n)))
            .collect();
        self.run_phase(Phase::Centralities, entries, skip, report)
            .await
    }

    async fn run_phase(
        &self,
        phase: Phase,
        entries: Vec<(String, Vec<PlannedInvocation>)>,
        skip: &HashSet<String>,
        report: &mut RunReport,
    ) -> Result<bool, DriverError> {
        let mut interrupted = false;

        for (entry, planned) in entries {
            if interrupted || self.is_interrupted() {
                if !interrupted {
                    warn!("Interrupted, not starting {} or later entries", entry);
                    self.emit_event(ExecutionEvent::Interrupted { phase });
                    interrupted = true;
                }
                report.record_skipped(&entry, phase, "interrupted");
                continue;
            }

            if skip.contains(&entry) {
                let reason = "network phase failed".to_string();
                info!("Skipping {} {}: {}", phase, entry, reason);
                report.record_skipped(&entry, phase, reason.clone());
                self.emit_event(ExecutionEvent::EntrySkipped {
                    entry,
                    phase,
                    reason,
                });
                continue;
            }

            match self.run_entry(&entry, phase, &planned, report).await? {
                EntryRun::Completed => {
                    self.emit_event(ExecutionEvent::EntryCompleted { entry, phase });
                }
                EntryRun::Failed => {}
                EntryRun::Interrupted => {
                    self.emit_event(ExecutionEvent::Interrupted { phase });
                    interrupted = true;
                }
            }
        }

        Ok(interrupted)
    }

    /// Run one entry's invocations until the first failure
    async fn run_entry(
        &self,
        entry: &str,
        phase: Phase,
        planned: &[PlannedInvocation],
        report: &mut RunReport,
    ) -> Result<EntryRun, DriverError> {
        let mut completed = 0;
        let mut checked_input: Option<&Path> = None;

        for step in planned {
            if self.is_interrupted() {
                warn!("Interrupted during {} after {} stages", entry, completed);
                report.record_interrupted(entry, phase, completed);
                return Ok(EntryRun::Interrupted);
            }

            if checked_input != Some(step.input.as_path()) {
                if !step.input.is_file() {
                    let message = format!("Input file not found: {}", step.input.display());
                    self.fail(report, step, FailureKind::PathResolutionError, message, completed);
                    return Ok(EntryRun::Failed);
                }
                checked_input = Some(step.input.as_path());
            }

            if let Err(e) = ensure_parent_dir(&step.output).await {
                let message = format!("Cannot create output directory for {}: {}", step.output.display(), e);
                self.fail(report, step, FailureKind::PathResolutionError, message, completed);
                return Ok(EntryRun::Failed);
            }

            let command = step.command_line();
            info!("[{}] {}: {}", entry, step.stage, command);
            self.emit_event(ExecutionEvent::InvocationStarted {
                entry: entry.to_string(),
                stage: step.stage,
                command,
            });

            report.invocations += 1;
            let started = Instant::now();
            match self.runner.run(&step.invocation).await {
                Ok(_) => {
                    completed += 1;
                    self.emit_event(ExecutionEvent::InvocationCompleted {
                        entry: entry.to_string(),
                        stage: step.stage,
                        elapsed: started.elapsed(),
                    });
                }
                Err(ToolError::NotFound { program }) => {
                    error!("Tool disappeared during the run: {}", program);
                    return Err(DriverError::ToolNotFound {
                        tool: tool_for_stage(step.stage).to_string(),
                        program,
                    });
                }
                // The terminal's SIGINT also reaches the child
                Err(e) if self.is_interrupted() => {
                    warn!("[{}] {} stopped by interrupt: {}", entry, step.stage, e);
                    report.record_interrupted(entry, phase, completed);
                    return Ok(EntryRun::Interrupted);
                }
                Err(e) => {
                    self.fail(report, step, FailureKind::InvocationFailure, e.to_string(), completed);
                    return Ok(EntryRun::Failed);
                }
            }
        }

        report.record_success(entry, phase, completed);
        Ok(EntryRun::Completed)
    }

    fn fail(
        &self,
        report: &mut RunReport,
        step: &PlannedInvocation,
        kind: FailureKind,
        message: String,
        completed: usize,
    ) {
        error!("[{}] {} failed ({}): {}", step.entry, step.stage, kind, message);
        let failure = FailureRecord {
            entry: step.entry.clone(),
            stage: step.stage,
            kind,
            message,
        };
        report.record_failure(failure.clone(), completed);
        self.emit_event(ExecutionEvent::EntryFailed { failure });
    }
}

/// Name of the configured tool that runs `stage`
fn tool_for_stage(stage: Stage) -> &'static str {
    match stage {
        Stage::ReactionNetwork | Stage::DirectedReactionNetwork => "reaction_network",
        Stage::MetaboliteNetwork => "metabolite_network",
        _ => "centrality",
    }
}

async fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent().map(PathBuf::from) {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}
