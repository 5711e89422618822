use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::Context;
use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::common::errors::{BayesError, Result};

use super::network::{BayesianNetwork, NetworkBuilder};
use super::xmlbif;

fn is_xmlbif(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xml") || ext.eq_ignore_ascii_case("xmlbif"))
}

/// Declared variable: a name and its outcome labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariableDefinition {
    pub name: String,
    pub outcomes: Vec<String>,
}

/// Conditional table of one variable. `table` is row-major over `given`
/// followed by the variable itself, which varies fastest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    #[serde(rename = "for")]
    pub variable: String,
    #[serde(default)]
    pub given: Vec<String>,
    pub table: Vec<f64>,
}

/// On-disk description of a network.
///
/// ```json
/// {
///   "variables": [{"name": "A", "outcomes": ["T", "F"]}],
///   "definitions": [{"for": "A", "table": [0.6, 0.4]}]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkDefinition {
    pub variables: Vec<VariableDefinition>,
    pub definitions: Vec<TableDefinition>,
}

impl NetworkDefinition {
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|err| BayesError::Parse(err.to_string()))
    }

    /// Parse an XMLBIF document (`<BIF><NETWORK>` with `VARIABLE` and
    /// `DEFINITION` elements).
    pub fn from_xmlbif_str(text: &str) -> Result<Self> {
        xmlbif::parse(text)
    }

    /// Load a definition from disk. Files ending in `.xml` or `.xmlbif` are
    /// read as XMLBIF, anything else as JSON.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        trace!("NetworkDefinition::from_file - Start {}", path.display());
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read network file {}", path.display()))?;
        let parsed = if is_xmlbif(path) {
            Self::from_xmlbif_str(&text)
        } else {
            Self::from_json_str(&text)
        };
        let definition =
            parsed.with_context(|| format!("failed to parse network file {}", path.display()))?;
        trace!("NetworkDefinition::from_file - End");
        Ok(definition)
    }

    /// Validate the definition and build the network it describes.
    ///
    /// Every declared variable needs exactly one table, and every table must
    /// belong to a declared variable.
    pub fn build(&self) -> Result<BayesianNetwork> {
        let mut tables: HashMap<&str, &TableDefinition> = HashMap::new();
        for definition in &self.definitions {
            if tables.insert(definition.variable.as_str(), definition).is_some() {
                return Err(BayesError::malformed(format!(
                    "variable '{}' has more than one table",
                    definition.variable
                )));
            }
        }

        let mut builder = NetworkBuilder::default();
        for variable in &self.variables {
            let table = tables.remove(variable.name.as_str()).ok_or_else(|| {
                BayesError::malformed(format!("variable '{}' has no table", variable.name))
            })?;
            builder = builder.variable(&variable.name, &variable.outcomes, &table.given, &table.table);
        }
        if let Some(orphan) = tables.keys().min() {
            return Err(BayesError::malformed(format!(
                "table given for undeclared variable '{}'",
                orphan
            )));
        }

        let network = builder.build()?;
        debug!("Loaded network definition with {} variables", network.len());
        Ok(network)
    }
}

impl From<&BayesianNetwork> for NetworkDefinition {
    fn from(network: &BayesianNetwork) -> Self {
        let mut variables = Vec::with_capacity(network.len());
        let mut definitions = Vec::with_capacity(network.len());
        for variable in network.variables() {
            variables.push(VariableDefinition {
                name: variable.name().to_string(),
                outcomes: variable.outcomes().to_vec(),
            });

            // walk parents in declaration order, the variable last
            let mut columns: Vec<(&str, &[String])> = variable
                .parents()
                .iter()
                .filter_map(|p| network.variable(p))
                .map(|p| (p.name(), p.outcomes()))
                .collect();
            columns.push((variable.name(), variable.outcomes()));
            let size: usize = columns.iter().map(|(_, o)| o.len()).product();
            let mut table = Vec::with_capacity(size);
            for index in 0..size {
                let mut remainder = index;
                let mut assignment = vec![("", ""); columns.len()];
                for (slot, (name, outcomes)) in columns.iter().enumerate().rev() {
                    assignment[slot] = (*name, outcomes[remainder % outcomes.len()].as_str());
                    remainder /= outcomes.len();
                }
                table.push(
                    variable
                        .cpt()
                        .value(&assignment)
                        .expect("validated CPT covers every assignment"),
                );
            }

            definitions.push(TableDefinition {
                variable: variable.name().to_string(),
                given: variable.parents().to_vec(),
                table,
            });
        }
        NetworkDefinition {
            variables,
            definitions,
        }
    }
}
