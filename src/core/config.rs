//! Pipeline configuration from YAML

use crate::core::layout::{DataLayout, LayoutConfig};
use crate::core::model::{ModelEntry, SourceFormat};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Top-level pipeline configuration loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Directory all artifacts live under
    #[serde(default = "default_data_root")]
    pub data_root: PathBuf,

    /// Subdirectory names under the data root
    #[serde(default)]
    pub layout: LayoutConfig,

    /// Commands for the external tools
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Timeout for a single tool invocation (in seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Output format requested from the centrality tool
    #[serde(default)]
    pub centrality_format: CentralityFormat,

    /// Extra options for the directed reaction network
    #[serde(default)]
    pub reaction_network: ReactionNetworkOptions,

    /// Models to process, in run order
    #[serde(default = "default_models")]
    pub models: Vec<ModelEntry>,
}

/// External tool commands. The first element is the program, the rest are
/// leading arguments (e.g. `["python", "scripts/create_metabolic_network.py"]`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_reaction_tool")]
    pub reaction_network: Vec<String>,

    #[serde(default = "default_metabolite_tool")]
    pub metabolite_network: Vec<String>,

    #[serde(default = "default_centrality_tool")]
    pub centrality: Vec<String>,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            reaction_network: default_reaction_tool(),
            metabolite_network: default_metabolite_tool(),
            centrality: default_centrality_tool(),
        }
    }
}

impl ToolsConfig {
    /// Iterate over `(tool name, command)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &[String])> {
        [
            ("reaction_network", self.reaction_network.as_slice()),
            ("metabolite_network", self.metabolite_network.as_slice()),
            ("centrality", self.centrality.as_slice()),
        ]
        .into_iter()
    }
}

/// Value passed to the centrality tool's `-f` flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CentralityFormat {
    Csv,
    Parquet,
    #[default]
    Both,
}

impl fmt::Display for CentralityFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CentralityFormat::Csv => f.write_str("csv"),
            CentralityFormat::Parquet => f.write_str("parquet"),
            CentralityFormat::Both => f.write_str("both"),
        }
    }
}

/// Flux variability options of the reaction network tool, only passed
/// for the directed network when set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReactionNetworkOptions {
    #[serde(default)]
    pub fva_proportion: Option<f64>,

    #[serde(default)]
    pub loopless: bool,
}

fn default_data_root() -> PathBuf {
    PathBuf::from("data")
}

fn default_timeout_secs() -> u64 {
    10800
}

fn default_reaction_tool() -> Vec<String> {
    vec!["create_metabolic_network".to_string()]
}

fn default_metabolite_tool() -> Vec<String> {
    vec!["create_metabolite_network".to_string()]
}

fn default_centrality_tool() -> Vec<String> {
    vec!["create_centrality_dataframe".to_string()]
}

/// The built-in model table
pub fn default_models() -> Vec<ModelEntry> {
    use SourceFormat::{Json, Xml};

    vec![
        ModelEntry::new("iEK1008", Xml),
        ModelEntry::new("iEK1011_deJesusEssen_media", Json),
        ModelEntry::new("iEK1011_drugTesting_media", Json),
        ModelEntry::new("iEK1011_griffinEssen_media", Json),
        ModelEntry::new("iEK1011_inVivo_media", Json),
        ModelEntry::new("iEK1011_m7H10_media", Json),
        ModelEntry::new("iEK1011_v2", Json),
        ModelEntry::new("iNJ661", Json),
        ModelEntry::new("sMtb2", Json),
        ModelEntry::new("sMtb_BiGG_Identifiers", Json).with_output_name("sMtb_BiGG"),
    ]
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            data_root: default_data_root(),
            layout: LayoutConfig::default(),
            tools: ToolsConfig::default(),
            timeout_secs: default_timeout_secs(),
            centrality_format: CentralityFormat::default(),
            reaction_network: ReactionNetworkOptions::default(),
            models: default_models(),
        }
    }
}

impl PipelineConfig {
    /// Load pipeline configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse pipeline configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: PipelineConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if given, otherwise use the built-in defaults
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// Validate the pipeline configuration
    pub fn validate(&self) -> Result<()> {
        for (tool, command) in self.tools.iter() {
            match command.first() {
                None => anyhow::bail!("Tool '{}' has an empty command", tool),
                Some(program) if program.trim().is_empty() => {
                    anyhow::bail!("Tool '{}' has an empty program name", tool)
                }
                _ => {}
            }
        }

        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be greater than zero");
        }

        if let Some(prop) = self.reaction_network.fva_proportion {
            if !(prop > 0.0 && prop <= 1.0) {
                anyhow::bail!("fva_proportion must be in (0, 1], got {}", prop);
            }
        }

        validate_models(&self.models)
    }

    /// Check that the data root exists and is a directory
    pub fn validate_data_root(&self) -> Result<()> {
        if !self.data_root.is_dir() {
            anyhow::bail!(
                "Data root '{}' does not exist or is not a directory",
                self.data_root.display()
            );
        }
        Ok(())
    }

    pub fn data_layout(&self) -> DataLayout {
        DataLayout::new(self.data_root.clone(), self.layout.clone())
    }

    /// Resolve `--models` selectors against the table.
    ///
    /// Each selector is a `name` or `output_name` from the table, or an
    /// inline `name:format[:output_name]` entry. No selectors selects the
    /// whole table.
    pub fn select_models(&self, selectors: &[String]) -> Result<Vec<ModelEntry>> {
        if selectors.is_empty() {
            return Ok(self.models.clone());
        }

        let mut selected = Vec::with_capacity(selectors.len());
        for selector in selectors {
            let selector = selector.trim();
            let entry = if selector.contains(':') {
                ModelEntry::parse_inline(selector).map_err(anyhow::Error::msg)?
            } else {
                self.models
                    .iter()
                    .find(|m| m.name == selector || m.output_name() == selector)
                    .cloned()
                    .with_context(|| {
                        format!(
                            "Unknown model '{}'. Known models: {}",
                            selector,
                            self.models
                                .iter()
                                .map(|m| m.name.as_str())
                                .collect::<Vec<_>>()
                                .join(", ")
                        )
                    })?
            };
            selected.push(entry);
        }

        validate_models(&selected)?;
        Ok(selected)
    }
}

/// Validate a model table: names must be usable as file names and every
/// derived artifact path must be unique, including on case-insensitive
/// file systems.
pub fn validate_models(models: &[ModelEntry]) -> Result<()> {
    let mut names: HashMap<&str, usize> = HashMap::new();
    let mut outputs: HashMap<String, &str> = HashMap::new();

    for (idx, model) in models.iter().enumerate() {
        for (field, value) in [("name", model.name.as_str()), ("output_name", model.output_name())] {
            if value.trim().is_empty() {
                anyhow::bail!("Model #{} has an empty {}", idx + 1, field);
            }
            if value.contains('/') || value.contains('\\') || value == "." || value == ".." {
                anyhow::bail!("Model {} '{}' must be a plain file name", field, value);
            }
        }

        if names.insert(model.name.as_str(), idx).is_some() {
            anyhow::bail!("Duplicate model name: {}", model.name);
        }

        let folded = model.output_name().to_lowercase();
        if let Some(previous) = outputs.insert(folded, model.output_name()) {
            anyhow::bail!(
                "Models produce colliding output names '{}' and '{}'",
                previous,
                model.output_name()
            );
        }
    }

    Ok(())
}
