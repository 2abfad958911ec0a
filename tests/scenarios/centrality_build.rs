//! Test: Centrality Build - fixed variants over existing networks

use crate::helpers::*;
use fba_pipeline::core::config::CentralityFormat;
use fba_pipeline::core::{FailureKind, Phase};
use fba_pipeline::{PipelineDriver, Stage};

/// Test the three centrality invocations and their flags
#[tokio::test]
async fn test_centrality_invocations() {
    let root = TestDataRoot::new();
    let entry = network("iEK1008");
    root.write_networks(&entry);
    let runner = RecordingRunner::new();

    let driver = PipelineDriver::new(runner.clone(), &root.config()).unwrap();
    let report = driver.build_centralities(&[entry]).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.succeeded(Some(Phase::Centralities)), vec!["iEK1008"]);

    let calls = runner.calls();
    assert_eq!(calls.len(), 3);
    assert!(calls.iter().all(|c| c.program == "create_centrality_dataframe"));

    let undirected = root.arg("reaction_networks/iEK1008_network.json");
    let undirected_out = root.arg("network_data/iEK1008/iEK1008_reaction_network");
    assert_eq!(
        args(&calls[0]),
        vec!["-g", undirected.as_str(), "-o", undirected_out.as_str(), "-f", "both", "-v"]
    );

    let directed = root.arg("reaction_networks/iEK1008_network_directed.json");
    let directed_out = root.arg("network_data/iEK1008/iEK1008_reaction_network_directed");
    assert_eq!(
        args(&calls[1]),
        vec![
            "-g",
            directed.as_str(),
            "-o",
            directed_out.as_str(),
            "-f",
            "both",
            "-v",
            "-w",
            "-d"
        ]
    );

    let metabolite = root.arg("metabolite_networks/iEK1008_metabolite_network.json");
    let metabolite_out = root.arg("network_data/iEK1008/iEK1008_metabolite_network");
    assert_eq!(
        args(&calls[2]),
        vec!["-g", metabolite.as_str(), "-o", metabolite_out.as_str(), "-f", "both", "-v", "-d"]
    );

    assert!(root.join("network_data/iEK1008").is_dir());
}

/// Test that a missing network input is a path resolution failure and the
/// next entry still runs
#[tokio::test]
async fn test_missing_network_is_path_resolution_error() {
    let root = TestDataRoot::new();
    root.write_networks(&network("iNJ661"));
    let runner = RecordingRunner::new();

    let driver = PipelineDriver::new(runner.clone(), &root.config()).unwrap();
    let report = driver
        .build_centralities(&[network("sMtb2"), network("iNJ661")])
        .await
        .unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);

    let failure = &report.failures[0];
    assert_eq!(failure.entry, "sMtb2");
    assert_eq!(failure.stage, Stage::ReactionCentrality);
    assert_eq!(failure.kind, FailureKind::PathResolutionError);
    assert!(failure.message.contains("sMtb2_network.json"));

    assert_eq!(report.invocations, 3);
    assert_eq!(report.succeeded(None), vec!["iNJ661"]);
    assert!(runner
        .calls()
        .iter()
        .all(|c| c.args[1].contains("iNJ661")));
}

/// Test that a missing directed network fails only after the undirected
/// centrality ran
#[tokio::test]
async fn test_partial_networks_fail_at_second_stage() {
    let root = TestDataRoot::new();
    let entry = network("sMtb2");
    root.write_networks(&entry);
    std::fs::remove_file(root.join("reaction_networks/sMtb2_network_directed.json")).unwrap();
    let runner = RecordingRunner::new();

    let driver = PipelineDriver::new(runner.clone(), &root.config()).unwrap();
    let report = driver.build_centralities(&[entry]).await.unwrap();

    assert_eq!(runner.calls().len(), 1);
    assert_eq!(report.failures[0].stage, Stage::DirectedReactionCentrality);
    assert_eq!(report.failures[0].kind, FailureKind::PathResolutionError);
    assert_eq!(report.outcomes[0].stages_completed, 1);
}

/// Test that the configured output format reaches the tool
#[tokio::test]
async fn test_centrality_format_from_config() {
    let root = TestDataRoot::new();
    let entry = network("iNJ661");
    root.write_networks(&entry);
    let mut config = root.config();
    config.centrality_format = CentralityFormat::Parquet;

    let runner = RecordingRunner::new();
    let driver = PipelineDriver::new(runner.clone(), &config).unwrap();
    driver.build_centralities(&[entry]).await.unwrap();

    assert!(runner.calls().iter().all(|c| c.args[5] == "parquet"));
}
