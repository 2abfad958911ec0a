//! Model table entries and the artifact kinds derived from them

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// On-disk format of an FBA model file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    Xml,
    Json,
}

impl SourceFormat {
    /// File extension and `-f` value understood by the network tools
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Xml => "xml",
            SourceFormat::Json => "json",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "xml" | "sbml" => Ok(SourceFormat::Xml),
            "json" => Ok(SourceFormat::Json),
            other => Err(format!("Unknown model format '{}' (expected xml or json)", other)),
        }
    }
}

/// One metabolic model to process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Identifier of the model file under the FBA models directory
    pub name: String,

    /// Format of the model file
    pub source_format: SourceFormat,

    /// Name used for every derived artifact (defaults to `name`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    output_name: Option<String>,
}

impl ModelEntry {
    pub fn new(name: impl Into<String>, source_format: SourceFormat) -> Self {
        Self {
            name: name.into(),
            source_format,
            output_name: None,
        }
    }

    /// Use a different name for the derived artifacts
    pub fn with_output_name(mut self, output_name: impl Into<String>) -> Self {
        let output_name = output_name.into();
        self.output_name = if output_name == self.name {
            None
        } else {
            Some(output_name)
        };
        self
    }

    pub fn output_name(&self) -> &str {
        self.output_name.as_deref().unwrap_or(&self.name)
    }

    /// The network entry consumed by the centrality phase
    pub fn network_entry(&self) -> NetworkEntry {
        NetworkEntry {
            name: self.output_name().to_string(),
        }
    }

    /// Parse `name:format[:output_name]`
    pub fn parse_inline(s: &str) -> Result<Self, String> {
        let parts: Vec<&str> = s.split(':').collect();
        match parts.as_slice() {
            [name, format] => Ok(Self::new(*name, format.parse()?)),
            [name, format, output] => Ok(Self::new(*name, format.parse()?).with_output_name(*output)),
            _ => Err(format!(
                "Invalid model entry '{}': expected name:format[:output_name]",
                s
            )),
        }
    }
}

/// A set of networks produced for one model, keyed by the model's output name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEntry {
    pub name: String,
}

/// Kinds of network produced by the network phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkKind {
    ReactionUndirected,
    ReactionDirected,
    Metabolite,
}

impl NetworkKind {
    pub const ALL: [NetworkKind; 3] = [
        NetworkKind::ReactionUndirected,
        NetworkKind::ReactionDirected,
        NetworkKind::Metabolite,
    ];
}

/// A centrality computation over one network kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CentralityVariant {
    pub source: NetworkKind,
    pub directed: bool,
    pub weighted: bool,
}

impl CentralityVariant {
    /// The fixed variants computed for every network entry, in run order
    pub const ALL: [CentralityVariant; 3] = [
        CentralityVariant {
            source: NetworkKind::ReactionUndirected,
            directed: false,
            weighted: false,
        },
        CentralityVariant {
            source: NetworkKind::ReactionDirected,
            directed: true,
            weighted: true,
        },
        CentralityVariant {
            source: NetworkKind::Metabolite,
            directed: true,
            weighted: false,
        },
    ];
}

/// Pipeline phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Networks,
    Centralities,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Networks => f.write_str("networks"),
            Phase::Centralities => f.write_str("centralities"),
        }
    }
}

/// One named invocation within a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    ReactionNetwork,
    DirectedReactionNetwork,
    MetaboliteNetwork,
    ReactionCentrality,
    DirectedReactionCentrality,
    MetaboliteCentrality,
}

impl Stage {
    pub fn for_network(kind: NetworkKind) -> Self {
        match kind {
            NetworkKind::ReactionUndirected => Stage::ReactionNetwork,
            NetworkKind::ReactionDirected => Stage::DirectedReactionNetwork,
            NetworkKind::Metabolite => Stage::MetaboliteNetwork,
        }
    }

    pub fn for_centrality(variant: &CentralityVariant) -> Self {
        match variant.source {
            NetworkKind::ReactionUndirected => Stage::ReactionCentrality,
            NetworkKind::ReactionDirected => Stage::DirectedReactionCentrality,
            NetworkKind::Metabolite => Stage::MetaboliteCentrality,
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            Stage::ReactionNetwork | Stage::DirectedReactionNetwork | Stage::MetaboliteNetwork => {
                Phase::Networks
            }
            _ => Phase::Centralities,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::ReactionNetwork => "reaction_network",
            Stage::DirectedReactionNetwork => "directed_reaction_network",
            Stage::MetaboliteNetwork => "metabolite_network",
            Stage::ReactionCentrality => "reaction_centrality",
            Stage::DirectedReactionCentrality => "directed_reaction_centrality",
            Stage::MetaboliteCentrality => "metabolite_centrality",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
