//! Directory layout under the data root and artifact naming

use crate::core::model::{CentralityVariant, ModelEntry, NetworkKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Subdirectory names, relative to the data root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "default_fba_models")]
    pub fba_models: String,

    #[serde(default = "default_reaction_networks")]
    pub reaction_networks: String,

    #[serde(default = "default_metabolite_networks")]
    pub metabolite_networks: String,

    #[serde(default = "default_network_data")]
    pub network_data: String,
}

fn default_fba_models() -> String {
    "fba_models".to_string()
}

fn default_reaction_networks() -> String {
    "reaction_networks".to_string()
}

fn default_metabolite_networks() -> String {
    "metabolite_networks".to_string()
}

fn default_network_data() -> String {
    "network_data".to_string()
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            fba_models: default_fba_models(),
            reaction_networks: default_reaction_networks(),
            metabolite_networks: default_metabolite_networks(),
            network_data: default_network_data(),
        }
    }
}

/// Resolves artifact paths for a data root.
///
/// Every path is a pure function of the root, the layout, the entry and the
/// artifact kind.
#[derive(Debug, Clone)]
pub struct DataLayout {
    root: PathBuf,
    dirs: LayoutConfig,
}

impl DataLayout {
    pub fn new(root: impl Into<PathBuf>, dirs: LayoutConfig) -> Self {
        Self {
            root: root.into(),
            dirs,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn fba_models_dir(&self) -> PathBuf {
        self.root.join(&self.dirs.fba_models)
    }

    pub fn reaction_networks_dir(&self) -> PathBuf {
        self.root.join(&self.dirs.reaction_networks)
    }

    pub fn metabolite_networks_dir(&self) -> PathBuf {
        self.root.join(&self.dirs.metabolite_networks)
    }

    pub fn network_data_dir(&self) -> PathBuf {
        self.root.join(&self.dirs.network_data)
    }

    /// `<fba_models>/<name>.<format>`
    pub fn model_path(&self, model: &ModelEntry) -> PathBuf {
        self.fba_models_dir()
            .join(format!("{}.{}", model.name, model.source_format))
    }

    /// JSON network written by the network phase for `output_name`
    pub fn network_path(&self, output_name: &str, kind: NetworkKind) -> PathBuf {
        match kind {
            NetworkKind::ReactionUndirected => self
                .reaction_networks_dir()
                .join(format!("{}_network.json", output_name)),
            NetworkKind::ReactionDirected => self
                .reaction_networks_dir()
                .join(format!("{}_network_directed.json", output_name)),
            NetworkKind::Metabolite => self
                .metabolite_networks_dir()
                .join(format!("{}_metabolite_network.json", output_name)),
        }
    }

    /// Output prefix for a centrality table; the tool appends the extension
    pub fn centrality_prefix(&self, output_name: &str, variant: &CentralityVariant) -> PathBuf {
        let file_stem = match variant.source {
            NetworkKind::ReactionUndirected => format!("{}_reaction_network", output_name),
            NetworkKind::ReactionDirected => format!("{}_reaction_network_directed", output_name),
            NetworkKind::Metabolite => format!("{}_metabolite_network", output_name),
        };
        self.network_data_dir().join(output_name).join(file_stem)
    }
}
