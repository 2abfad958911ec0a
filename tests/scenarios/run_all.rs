//! Test: Run All - both phases, skipping, events and interruption

use crate::helpers::*;
use fba_pipeline::core::{EntryStatus, ExecutionStatus, Phase};
use fba_pipeline::{ExecutionEvent, ModelEntry, PipelineDriver, SourceFormat};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

fn two_models() -> Vec<ModelEntry> {
    vec![
        ModelEntry::new("iEK1008", SourceFormat::Xml),
        ModelEntry::new("iNJ661", SourceFormat::Json),
    ]
}

/// Test that all networks are built before any centrality
#[tokio::test]
async fn test_networks_then_centralities() {
    let models = two_models();
    let root = TestDataRoot::with_models(&models);
    let runner = RecordingRunner::new();

    let driver = PipelineDriver::new(runner.clone(), &root.config()).unwrap();
    let report = driver.run_all(&models).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.invocations, 12);
    assert_eq!(report.phases(), vec![Phase::Networks, Phase::Centralities]);
    assert_eq!(report.succeeded(Some(Phase::Centralities)), vec!["iEK1008", "iNJ661"]);

    let programs = runner.programs();
    assert!(programs[..6]
        .iter()
        .all(|p| p != "create_centrality_dataframe"));
    assert!(programs[6..]
        .iter()
        .all(|p| p == "create_centrality_dataframe"));
}

/// Test that an entry whose networks failed is skipped in the centrality phase
#[tokio::test]
async fn test_failed_network_skips_centralities() {
    let models = two_models();
    let root = TestDataRoot::with_models(&models);
    let runner = RecordingRunner::new().failing_on("iNJ661_network_directed.json");

    let driver = PipelineDriver::new(runner.clone(), &root.config()).unwrap();
    let report = driver.run_all(&models).await.unwrap();

    assert_eq!(report.status, ExecutionStatus::Failed);
    assert_eq!(report.failed(Some(Phase::Networks)), vec!["iNJ661"]);
    assert_eq!(report.skipped(Some(Phase::Centralities)), vec!["iNJ661"]);
    assert_eq!(report.succeeded(Some(Phase::Centralities)), vec!["iEK1008"]);

    // 3 + 2 network invocations, 3 centralities for iEK1008 only
    assert_eq!(runner.calls().len(), 8);
    assert_eq!(report.failures.len(), 1);
}

/// Test that the output name links the two phases
#[tokio::test]
async fn test_output_name_carries_into_centralities() {
    let model = ModelEntry::new("sMtb_BiGG_Identifiers", SourceFormat::Json)
        .with_output_name("sMtb_BiGG");
    let root = TestDataRoot::with_models(&[model.clone()]);
    let runner = RecordingRunner::new();

    let driver = PipelineDriver::new(runner.clone(), &root.config()).unwrap();
    let report = driver.run_all(&[model]).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.succeeded(Some(Phase::Centralities)), vec!["sMtb_BiGG"]);
    assert_eq!(report.entry_label("sMtb_BiGG"), "sMtb_BiGG_Identifiers → sMtb_BiGG");
    assert_eq!(
        runner.calls()[3].args[3],
        root.arg("network_data/sMtb_BiGG/sMtb_BiGG_reaction_network")
    );
}

/// Test the order of emitted events
#[tokio::test]
async fn test_events_follow_run_order() {
    let model = ModelEntry::new("iEK1008", SourceFormat::Xml);
    let root = TestDataRoot::with_models(&[model.clone()]);
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();

    let driver = PipelineDriver::new(RecordingRunner::new(), &root.config())
        .unwrap()
        .with_event_handler(move |event| {
            let label = match event {
                ExecutionEvent::PhaseStarted { phase, .. } => format!("start {}", phase),
                ExecutionEvent::InvocationStarted { stage, .. } => format!("run {}", stage),
                ExecutionEvent::InvocationCompleted { .. } => return,
                ExecutionEvent::EntryCompleted { entry, .. } => format!("done {}", entry),
                ExecutionEvent::EntryFailed { failure } => format!("failed {}", failure.entry),
                ExecutionEvent::EntrySkipped { entry, .. } => format!("skipped {}", entry),
                ExecutionEvent::Interrupted { .. } => "interrupted".to_string(),
                ExecutionEvent::RunCompleted { report, .. } => {
                    format!("finished {}", report.status.as_str())
                }
            };
            sink.lock().unwrap().push(label);
        });

    driver.run_all(&[model]).await.unwrap();

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            "start networks",
            "run reaction_network",
            "run directed_reaction_network",
            "run metabolite_network",
            "done iEK1008",
            "start centralities",
            "run reaction_centrality",
            "run directed_reaction_centrality",
            "run metabolite_centrality",
            "done iEK1008",
            "finished completed",
        ]
    );
}

/// Test that an interrupt stops new invocations and cancels the run
#[tokio::test]
async fn test_interrupt_stops_issuing_invocations() {
    let models = two_models();
    let root = TestDataRoot::with_models(&models);
    let flag = Arc::new(AtomicBool::new(false));
    let runner = RecordingRunner::new().interrupting_after(2, flag.clone());

    let driver = PipelineDriver::new(runner.clone(), &root.config())
        .unwrap()
        .with_interrupt_flag(flag);
    let report = driver.run_all(&models).await.unwrap();

    assert_eq!(report.status, ExecutionStatus::Cancelled);
    assert_eq!(runner.calls().len(), 2);
    assert_eq!(report.invocations, 2);
    assert!(report.failures.is_empty());

    // The in-flight entry keeps its completed stages, the rest never start
    assert_eq!(report.outcomes.len(), 2);
    assert_eq!(report.outcomes[0].stages_completed, 2);
    assert!(matches!(report.outcomes[0].status, EntryStatus::Skipped { .. }));
    assert_eq!(report.skipped(Some(Phase::Networks)), vec!["iEK1008", "iNJ661"]);
    assert!(report.skipped(Some(Phase::Centralities)).is_empty());
}

/// Test that a tool killed along with the driver counts as interrupted,
/// not as a failure
#[tokio::test]
async fn test_tool_failing_after_interrupt_cancels_run() {
    let model = ModelEntry::new("iEK1008", SourceFormat::Xml);
    let root = TestDataRoot::with_models(&[model.clone()]);
    let flag = Arc::new(AtomicBool::new(false));
    let runner = RecordingRunner::new()
        .interrupting_after(2, flag.clone())
        .failing_on("iEK1008_network_directed.json");

    let driver = PipelineDriver::new(runner.clone(), &root.config())
        .unwrap()
        .with_interrupt_flag(flag);
    let report = driver.run_all(&[model]).await.unwrap();

    assert_eq!(report.status, ExecutionStatus::Cancelled);
    assert!(report.failures.is_empty());
    assert_eq!(runner.calls().len(), 2);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].stages_completed, 1);
    assert_eq!(
        report.outcomes[0].status,
        EntryStatus::Skipped {
            reason: "interrupted".to_string()
        }
    );
}
