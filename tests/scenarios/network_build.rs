//! Test: Network Build - three invocations per model with fixed flags

use crate::helpers::*;
use fba_pipeline::core::Phase;
use fba_pipeline::{ModelEntry, PipelineDriver, SourceFormat};

/// Test that one xml model produces exactly three invocations with the
/// expected arguments
#[tokio::test]
async fn test_single_model_invocations() {
    let model = ModelEntry::new("iEK1008", SourceFormat::Xml);
    let root = TestDataRoot::with_models(&[model.clone()]);
    let runner = RecordingRunner::new();

    let driver = PipelineDriver::new(runner.clone(), &root.config()).unwrap();
    let report = driver.build_networks(&[model]).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.invocations, 3);

    let calls = runner.calls();
    assert_eq!(calls.len(), 3);

    let input = root.arg("fba_models/iEK1008.xml");
    let undirected = root.arg("reaction_networks/iEK1008_network.json");
    let directed = root.arg("reaction_networks/iEK1008_network_directed.json");
    let metabolite = root.arg("metabolite_networks/iEK1008_metabolite_network.json");

    assert_eq!(calls[0].program, "create_metabolic_network");
    assert_eq!(
        args(&calls[0]),
        vec!["-i", input.as_str(), "-o", undirected.as_str(), "-f", "xml", "-v"]
    );

    assert_eq!(calls[1].program, "create_metabolic_network");
    assert_eq!(
        args(&calls[1]),
        vec!["-i", input.as_str(), "-o", directed.as_str(), "-f", "xml", "-v", "-d", "-r"]
    );

    assert_eq!(calls[2].program, "create_metabolite_network");
    assert_eq!(
        args(&calls[2]),
        vec!["-i", input.as_str(), "-o", metabolite.as_str(), "-f", "xml", "-v"]
    );
}

/// Test that models run in table order, one process at a time
#[tokio::test]
async fn test_two_models_run_in_order() {
    let models = vec![
        ModelEntry::new("iEK1008", SourceFormat::Xml),
        ModelEntry::new("iNJ661", SourceFormat::Json),
    ];
    let root = TestDataRoot::with_models(&models);
    let runner = RecordingRunner::new();

    let driver = PipelineDriver::new(runner.clone(), &root.config()).unwrap();
    let report = driver.build_networks(&models).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.succeeded(Some(Phase::Networks)), vec!["iEK1008", "iNJ661"]);

    let calls = runner.calls();
    assert_eq!(calls.len(), 6);
    assert_eq!(
        runner.programs(),
        vec![
            "create_metabolic_network",
            "create_metabolic_network",
            "create_metabolite_network",
            "create_metabolic_network",
            "create_metabolic_network",
            "create_metabolite_network",
        ]
    );

    for call in &calls[..3] {
        assert_eq!(call.args[1], root.arg("fba_models/iEK1008.xml"));
        assert_eq!(call.args[5], "xml");
    }
    for call in &calls[3..] {
        assert_eq!(call.args[1], root.arg("fba_models/iNJ661.json"));
        assert_eq!(call.args[5], "json");
    }
}

/// Test that artifacts are named after the output name while the model
/// file keeps the table name
#[tokio::test]
async fn test_output_name_differs_from_model_name() {
    let model = ModelEntry::new("sMtb_BiGG_Identifiers", SourceFormat::Json)
        .with_output_name("sMtb_BiGG");
    let root = TestDataRoot::with_models(&[model.clone()]);
    let runner = RecordingRunner::new();

    let driver = PipelineDriver::new(runner.clone(), &root.config()).unwrap();
    let report = driver.build_networks(&[model]).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.succeeded(None), vec!["sMtb_BiGG_Identifiers"]);

    let calls = runner.calls();
    assert_eq!(calls[0].args[1], root.arg("fba_models/sMtb_BiGG_Identifiers.json"));
    assert_eq!(calls[0].args[3], root.arg("reaction_networks/sMtb_BiGG_network.json"));
    assert_eq!(
        calls[2].args[3],
        root.arg("metabolite_networks/sMtb_BiGG_metabolite_network.json")
    );
    assert!(root.join("reaction_networks/sMtb_BiGG_network_directed.json").is_file());
}

/// Test that the flux variability options only reach the directed network
#[tokio::test]
async fn test_fva_options_on_directed_network() {
    let model = ModelEntry::new("iNJ661", SourceFormat::Json);
    let root = TestDataRoot::with_models(&[model.clone()]);
    let mut config = root.config();
    config.reaction_network.fva_proportion = Some(0.5);
    config.reaction_network.loopless = true;

    let runner = RecordingRunner::new();
    let driver = PipelineDriver::new(runner.clone(), &config).unwrap();
    driver.build_networks(&[model]).await.unwrap();

    let calls = runner.calls();
    assert_eq!(&args(&calls[1])[7..], &["-d", "-r", "-p", "0.5", "-l"]);
    assert!(!calls[0].args.contains(&"-p".to_string()));
    assert!(!calls[2].args.contains(&"-l".to_string()));
}

/// Test that configured leading arguments come before the fixed flags
#[tokio::test]
async fn test_tool_command_with_leading_args() {
    let model = ModelEntry::new("sMtb2", SourceFormat::Json);
    let root = TestDataRoot::with_models(&[model.clone()]);
    let mut config = root.config();
    config.tools.reaction_network = vec![
        "python".to_string(),
        "scripts/create_metabolic_network.py".to_string(),
    ];

    let runner = RecordingRunner::new();
    let driver = PipelineDriver::new(runner.clone(), &config).unwrap();
    driver.build_networks(&[model]).await.unwrap();

    let calls = runner.calls();
    assert_eq!(calls[0].program, "python");
    assert_eq!(&args(&calls[0])[..2], &["scripts/create_metabolic_network.py", "-i"]);
    assert_eq!(calls[2].program, "create_metabolite_network");
}
