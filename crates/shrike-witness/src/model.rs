use std::fs;
use std::path::Path;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use shrike_doc::{parse_xml, parse_yaml};

use crate::errors::{Diagnostics, WitnessError};
use crate::graph::WitnessAutomaton;
use crate::graph_loader::{load_graph_witness, GraphLoaderOptions};
use crate::property::{classify_specification, error_function, Property};
use crate::sequence::Segment;
use crate::sequence_loader::load_sequence_witness;

/// The dialect-specific witness body.
#[derive(Debug, Clone)]
pub enum WitnessBody {
    Automaton(WitnessAutomaton),
    Sequence(Vec<Segment>),
}

/// A loaded violation witness: the checked properties, the designated error
/// function (when `unreach-call` is among them) and the dialect body.
///
/// The witness owns its nodes, edges, segments and replay tape; matchers
/// borrow read-only views.
#[derive(Debug, Clone)]
pub struct ErrorWitness {
    properties: IndexSet<Property>,
    error_function: Option<String>,
    pub body: WitnessBody,
}

impl ErrorWitness {
    /// Load a witness file, sniffing the dialect from the extension (and,
    /// failing that, from the content). Malformed input is fatal.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WitnessError> {
        Self::load_with_diagnostics(path).map(|(witness, _)| witness)
    }

    /// Like [`ErrorWitness::load`], additionally returning the advisory
    /// diagnostics collected along the way.
    pub fn load_with_diagnostics(
        path: impl AsRef<Path>,
    ) -> Result<(Self, Diagnostics), WitnessError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|e| WitnessError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let graph_dialect = match path.extension().and_then(|e| e.to_str()) {
            Some("graphml") | Some("xml") => true,
            Some("yml") | Some("yaml") => false,
            _ => source.trim_start().starts_with('<'),
        };
        if graph_dialect {
            Self::from_graphml(&source, GraphLoaderOptions::default())
        } else {
            Self::from_yaml(&source)
        }
    }

    /// Load a graph-dialect witness from GraphML text and normalize it.
    pub fn from_graphml(
        source: &str,
        options: GraphLoaderOptions,
    ) -> Result<(Self, Diagnostics), WitnessError> {
        let mut diags = Diagnostics::new();
        let doc = parse_xml(source)?;
        let mut automaton = load_graph_witness(&doc, options, &mut diags)?;

        let specification = automaton.metadata.specification.clone();
        if specification.is_empty() {
            return Err(WitnessError::MissingSpecification);
        }
        let properties = classify_specification(&specification);
        if properties.is_empty() {
            return Err(WitnessError::UnknownSpecification { specification });
        }
        let error_function = if properties.contains(&Property::UnreachCall) {
            error_function(&specification)?
        } else {
            None
        };

        automaton.normalize(&mut diags);

        Ok((
            ErrorWitness {
                properties,
                error_function,
                body: WitnessBody::Automaton(automaton),
            },
            diags,
        ))
    }

    /// Load a sequence-dialect witness from YAML text.
    pub fn from_yaml(source: &str) -> Result<(Self, Diagnostics), WitnessError> {
        let mut diags = Diagnostics::new();
        let doc = parse_yaml(source)?;
        let (segments, specification) = load_sequence_witness(&doc, &mut diags)?;

        let properties = classify_specification(&specification);
        if properties.is_empty() {
            // The sequence dialect drives matching through waypoints alone,
            // so an unclassified specification degrades instead of failing.
            diags.warn(
                "shrike::witness::unknown_specification",
                format!("specification matches no known property: {specification:?}"),
            );
        }
        let error_function = if properties.contains(&Property::UnreachCall) {
            error_function(&specification)?
        } else {
            None
        };

        Ok((
            ErrorWitness {
                properties,
                error_function,
                body: WitnessBody::Sequence(segments),
            },
            diags,
        ))
    }

    pub fn properties(&self) -> &IndexSet<Property> {
        &self.properties
    }

    pub fn checks(&self, property: Property) -> bool {
        self.properties.contains(&property)
    }

    pub fn error_function(&self) -> Option<&str> {
        self.error_function.as_deref()
    }

    pub fn automaton(&self) -> Option<&WitnessAutomaton> {
        match &self.body {
            WitnessBody::Automaton(a) => Some(a),
            WitnessBody::Sequence(_) => None,
        }
    }

    pub fn segments(&self) -> Option<&[Segment]> {
        match &self.body {
            WitnessBody::Automaton(_) => None,
            WitnessBody::Sequence(s) => Some(s),
        }
    }

    /// Stable shape summary for reporting and round-trip checks.
    pub fn summary(&self) -> WitnessSummary {
        let (dialect, node_count, edge_count, segment_count, deterministic, replay_tape_len) =
            match &self.body {
                WitnessBody::Automaton(a) => (
                    "graph",
                    a.node_count(),
                    a.edge_count(),
                    0,
                    a.deterministic(),
                    a.tape().len(),
                ),
                WitnessBody::Sequence(s) => ("sequence", 0, 0, s.len(), false, 0),
            };
        WitnessSummary {
            properties: self.properties.iter().map(|p| p.to_string()).collect(),
            error_function: self.error_function.clone(),
            dialect: dialect.to_string(),
            node_count,
            edge_count,
            segment_count,
            deterministic,
            replay_tape_len,
        }
    }
}

/// Serializable shape summary of a loaded witness.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WitnessSummary {
    pub properties: Vec<String>,
    pub error_function: Option<String>,
    pub dialect: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub segment_count: usize,
    pub deterministic: bool,
    pub replay_tape_len: usize,
}
