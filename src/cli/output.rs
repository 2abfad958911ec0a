//! CLI output formatting

use crate::{
    core::{EntryStatus, ExecutionStatus, Phase, RunReport},
    execution::ExecutionEvent,
    persistence::RunSummary,
};
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");

/// Create a progress bar counting invocations
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    let progress_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    progress.set_style(progress_style);
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
        ExecutionStatus::Cancelled => style("CANCELLED").yellow().to_string(),
    }
}

pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{}.{:01}s", secs, duration.subsec_millis() / 100)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

/// Format an execution event for display. Returns `None` for events that
/// produce no console line.
pub fn format_execution_event(event: &ExecutionEvent) -> Option<String> {
    let line = match event {
        ExecutionEvent::PhaseStarted {
            run_id,
            phase,
            entries,
        } => format!(
            "{} Building {} for {} entries ({})",
            ROCKET,
            style(phase).bold(),
            style(entries).cyan(),
            style(&run_id.to_string()[..8]).dim()
        ),
        ExecutionEvent::InvocationStarted {
            entry,
            stage,
            command,
        } => format!(
            "{} {} {}\n    {}",
            SPINNER,
            style(entry).cyan(),
            style(stage).dim(),
            style(command).dim()
        ),
        ExecutionEvent::InvocationCompleted {
            entry,
            stage,
            elapsed,
        } => format!(
            "{} {} {} ({})",
            CHECK,
            style(entry).green(),
            style(stage).dim(),
            format_duration(*elapsed)
        ),
        ExecutionEvent::EntryCompleted { .. } => return None,
        ExecutionEvent::EntryFailed { failure } => format!(
            "{} {} {} [{}]: {}",
            CROSS,
            style(&failure.entry).red(),
            style(failure.stage).dim(),
            failure.kind,
            style(&failure.message).dim()
        ),
        ExecutionEvent::EntrySkipped {
            entry,
            phase,
            reason,
        } => format!(
            "{} {} {} skipped: {}",
            SKIP,
            style(entry).yellow(),
            phase,
            style(reason).dim()
        ),
        ExecutionEvent::Interrupted { phase } => format!(
            "{} Interrupted during {}, no further invocations will be issued",
            WARN, phase
        ),
        ExecutionEvent::RunCompleted { run_id, report } => format!(
            "{} Run ({}) {}",
            INFO,
            style(&run_id.to_string()[..8]).dim(),
            format_status(report.status)
        ),
    };
    Some(line)
}

/// Render the end-of-run summary: succeeded, failed and skipped entries
/// per phase, followed by the failure records
pub fn format_report(report: &RunReport) -> String {
    let mut lines = Vec::new();

    for phase in report.phases() {
        lines.push(format!("{}", style(phase_title(phase)).bold()));
        for outcome in report.outcomes.iter().filter(|o| o.phase == phase) {
            let entry = report.entry_label(&outcome.entry);
            let line = match &outcome.status {
                EntryStatus::Succeeded => format!("  {} {}", CHECK, entry),
                EntryStatus::Failed { stage } => format!(
                    "  {} {} (failed at {}, {} stages completed)",
                    CROSS, entry, stage, outcome.stages_completed
                ),
                EntryStatus::Skipped { reason } => {
                    format!("  {} {} ({})", SKIP, entry, reason)
                }
            };
            lines.push(line);
        }
        lines.push(format!(
            "  {} succeeded, {} failed, {} skipped",
            style(report.succeeded(Some(phase)).len()).green(),
            style(report.failed(Some(phase)).len()).red(),
            style(report.skipped(Some(phase)).len()).yellow()
        ));
    }

    if !report.failures.is_empty() {
        lines.push(format!("{}", style("Failures").bold()));
        for failure in &report.failures {
            lines.push(format!(
                "  {} / {} [{}]: {}",
                failure.entry, failure.stage, failure.kind, failure.message
            ));
        }
    }

    lines.join("\n")
}

fn phase_title(phase: Phase) -> &'static str {
    match phase {
        Phase::Networks => "Networks",
        Phase::Centralities => "Centralities",
    }
}

/// Format a history entry for display
pub fn format_run_summary(summary: &RunSummary) -> String {
    let status_icon = match summary.status {
        ExecutionStatus::Completed => CHECK,
        ExecutionStatus::Failed => CROSS,
        ExecutionStatus::Running => SPINNER,
        _ => INFO,
    };

    format!(
        "{} {} - {} - {} - {} ok, {} failed, {} skipped - {}",
        status_icon,
        style(&summary.run_id.to_string()[..8]).dim(),
        style(&summary.mode).bold(),
        format_status(summary.status),
        summary.entries_succeeded,
        summary.entries_failed,
        summary.entries_skipped,
        style(summary.started_at.format("%Y-%m-%d %H:%M:%S")).dim()
    )
}
