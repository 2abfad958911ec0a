//! Expands model and network entries into ordered tool invocations
//!
//! Planning is pure: the same configuration and entries always produce the
//! same argument lists, and nothing touches the file system.

use crate::core::config::{CentralityFormat, PipelineConfig, ReactionNetworkOptions};
use crate::core::{CentralityVariant, DataLayout, ModelEntry, NetworkEntry, NetworkKind, Stage};
use crate::execution::DriverError;
use crate::tool::Invocation;
use serde::Serialize;
use std::path::PathBuf;

/// One invocation together with the entry and stage it belongs to
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedInvocation {
    pub entry: String,
    pub stage: Stage,
    /// File the tool reads
    pub input: PathBuf,
    /// File (or prefix) the tool writes
    pub output: PathBuf,
    pub invocation: Invocation,
}

impl PlannedInvocation {
    pub fn command_line(&self) -> String {
        self.invocation.command_line()
    }
}

/// Builds invocations for the configured tools and layout
#[derive(Debug, Clone)]
pub struct Planner {
    layout: DataLayout,
    reaction_tool: Invocation,
    metabolite_tool: Invocation,
    centrality_tool: Invocation,
    centrality_format: CentralityFormat,
    reaction_options: ReactionNetworkOptions,
}

impl Planner {
    pub fn new(config: &PipelineConfig) -> Result<Self, DriverError> {
        let tool = |name: &str, command: &[String]| {
            Invocation::from_command(command)
                .ok_or_else(|| DriverError::InvalidConfig(format!("Tool '{}' has an empty command", name)))
        };

        Ok(Self {
            layout: config.data_layout(),
            reaction_tool: tool("reaction_network", &config.tools.reaction_network)?,
            metabolite_tool: tool("metabolite_network", &config.tools.metabolite_network)?,
            centrality_tool: tool("centrality", &config.tools.centrality)?,
            centrality_format: config.centrality_format,
            reaction_options: config.reaction_network.clone(),
        })
    }

    pub fn layout(&self) -> &DataLayout {
        &self.layout
    }

    /// Programs the given stage family depends on, as `(tool, program)`
    pub fn network_programs(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("reaction_network", self.reaction_tool.program.as_str()),
            ("metabolite_network", self.metabolite_tool.program.as_str()),
        ]
    }

    pub fn centrality_programs(&self) -> Vec<(&'static str, &str)> {
        vec![("centrality", self.centrality_tool.program.as_str())]
    }

    /// The three network invocations for one model, in run order
    pub fn network_invocations(&self, model: &ModelEntry) -> Vec<PlannedInvocation> {
        let input = self.layout.model_path(model);
        let format = model.source_format.as_str();

        NetworkKind::ALL
            .iter()
            .map(|&kind| {
                let output = self.layout.network_path(model.output_name(), kind);
                let base = match kind {
                    NetworkKind::Metabolite => self.metabolite_tool.clone(),
                    _ => self.reaction_tool.clone(),
                };
                let mut invocation = base
                    .path_arg("-i", &input)
                    .path_arg("-o", &output)
                    .arg("-f")
                    .arg(format)
                    .arg("-v");

                if kind == NetworkKind::ReactionDirected {
                    invocation = invocation.arg("-d").arg("-r");
                    if let Some(prop) = self.reaction_options.fva_proportion {
                        invocation = invocation.arg("-p").arg(prop.to_string());
                    }
                    if self.reaction_options.loopless {
                        invocation = invocation.arg("-l");
                    }
                }

                PlannedInvocation {
                    entry: model.name.clone(),
                    stage: Stage::for_network(kind),
                    input: input.clone(),
                    output,
                    invocation,
                }
            })
            .collect()
    }

    /// The three centrality invocations for one network entry, in run order
    pub fn centrality_invocations(&self, network: &NetworkEntry) -> Vec<PlannedInvocation> {
        CentralityVariant::ALL
            .iter()
            .map(|variant| {
                let input = self.layout.network_path(&network.name, variant.source);
                let output = self.layout.centrality_prefix(&network.name, variant);

                let mut invocation = self
                    .centrality_tool
                    .clone()
                    .path_arg("-g", &input)
                    .path_arg("-o", &output)
                    .arg("-f")
                    .arg(self.centrality_format.to_string())
                    .arg("-v");
                if variant.weighted {
                    invocation = invocation.arg("-w");
                }
                if variant.directed {
                    invocation = invocation.arg("-d");
                }

                PlannedInvocation {
                    entry: network.name.clone(),
                    stage: Stage::for_centrality(variant),
                    input,
                    output,
                    invocation,
                }
            })
            .collect()
    }

    pub fn plan_networks(&self, models: &[ModelEntry]) -> Vec<PlannedInvocation> {
        models
            .iter()
            .flat_map(|m| self.network_invocations(m))
            .collect()
    }

    pub fn plan_centralities(&self, networks: &[NetworkEntry]) -> Vec<PlannedInvocation> {
        networks
            .iter()
            .flat_map(|n| self.centrality_invocations(n))
            .collect()
    }
}
