//! Test: Dry Run - planning the whole table without touching the file system

use fba_pipeline::core::config::PipelineConfig;
use fba_pipeline::{NetworkEntry, Planner, Stage};
use std::path::PathBuf;

fn config_at(root: &str) -> PipelineConfig {
    PipelineConfig {
        data_root: PathBuf::from(root),
        ..PipelineConfig::default()
    }
}

/// Test that the default table plans three invocations per entry and phase
#[test]
fn test_plan_default_table() {
    let config = config_at("/nonexistent/fba-data");
    let planner = Planner::new(&config).unwrap();
    let networks: Vec<NetworkEntry> = config.models.iter().map(|m| m.network_entry()).collect();

    let network_plan = planner.plan_networks(&config.models);
    let centrality_plan = planner.plan_centralities(&networks);

    assert_eq!(config.models.len(), 10);
    assert_eq!(network_plan.len(), 30);
    assert_eq!(centrality_plan.len(), 30);
    assert!(!PathBuf::from("/nonexistent/fba-data").exists());

    assert_eq!(
        network_plan[0].command_line(),
        "create_metabolic_network -i /nonexistent/fba-data/fba_models/iEK1008.xml \
         -o /nonexistent/fba-data/reaction_networks/iEK1008_network.json -f xml -v"
    );
    assert_eq!(
        centrality_plan.last().unwrap().command_line(),
        "create_centrality_dataframe \
         -g /nonexistent/fba-data/metabolite_networks/sMtb_BiGG_metabolite_network.json \
         -o /nonexistent/fba-data/network_data/sMtb_BiGG/sMtb_BiGG_metabolite_network \
         -f both -v -d"
    );
}

/// Test that each entry's stages come out in run order
#[test]
fn test_plan_stage_order() {
    let config = config_at("data");
    let planner = Planner::new(&config).unwrap();

    let stages: Vec<Stage> = planner
        .network_invocations(&config.models[1])
        .iter()
        .chain(planner.centrality_invocations(&config.models[1].network_entry()).iter())
        .map(|p| p.stage)
        .collect();

    assert_eq!(
        stages,
        vec![
            Stage::ReactionNetwork,
            Stage::DirectedReactionNetwork,
            Stage::MetaboliteNetwork,
            Stage::ReactionCentrality,
            Stage::DirectedReactionCentrality,
            Stage::MetaboliteCentrality,
        ]
    );
}

/// Test that every planned output path is distinct
#[test]
fn test_planned_outputs_are_unique() {
    let config = config_at("data");
    let planner = Planner::new(&config).unwrap();
    let networks: Vec<NetworkEntry> = config.models.iter().map(|m| m.network_entry()).collect();

    let mut outputs: Vec<PathBuf> = planner
        .plan_networks(&config.models)
        .into_iter()
        .chain(planner.plan_centralities(&networks))
        .map(|p| p.output)
        .collect();
    let total = outputs.len();
    outputs.sort();
    outputs.dedup();

    assert_eq!(outputs.len(), total);
}

/// Test that inline selectors plan like table entries
#[test]
fn test_select_inline_model() {
    let config = config_at("data");
    let selected = config
        .select_models(&["iNJ661".to_string(), "Custom_Model:xml:custom".to_string()])
        .unwrap();
    let planner = Planner::new(&config).unwrap();
    let plan = planner.plan_networks(&selected);

    assert_eq!(plan.len(), 6);
    assert_eq!(plan[3].input, PathBuf::from("data/fba_models/Custom_Model.xml"));
    assert_eq!(
        plan[3].output,
        PathBuf::from("data/reaction_networks/custom_network.json")
    );
}

/// Test that selecting the same model twice is rejected
#[test]
fn test_select_duplicate_model_rejected() {
    let config = config_at("data");
    let result = config.select_models(&["iNJ661".to_string(), "iNJ661".to_string()]);
    assert!(result.is_err());
}
