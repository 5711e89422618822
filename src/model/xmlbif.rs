//! Reader for the XMLBIF interchange format.
//!
//! ```xml
//! <BIF VERSION="0.3">
//!   <NETWORK>
//!     <VARIABLE TYPE="nature"><NAME>A</NAME><OUTCOME>T</OUTCOME><OUTCOME>F</OUTCOME></VARIABLE>
//!     <DEFINITION><FOR>A</FOR><TABLE>0.6 0.4</TABLE></DEFINITION>
//!   </NETWORK>
//! </BIF>
//! ```
//!
//! `TABLE` holds whitespace separated probabilities in the same row-major
//! layout as [`TableDefinition::table`]. Attributes and `PROPERTY` elements
//! are ignored.

use log::trace;
use serde::Deserialize;

use crate::common::errors::{BayesError, Result};

use super::definition::{NetworkDefinition, TableDefinition, VariableDefinition};

#[derive(Debug, Deserialize)]
struct BifDocument {
    #[serde(rename = "NETWORK")]
    network: BifNetwork,
}

#[derive(Debug, Deserialize)]
struct BifNetwork {
    #[serde(rename = "VARIABLE", default)]
    variables: Vec<BifVariable>,
    // version 0.15 files call these PROBABILITY
    #[serde(rename = "DEFINITION", alias = "PROBABILITY", default)]
    definitions: Vec<BifDefinition>,
}

#[derive(Debug, Deserialize)]
struct BifVariable {
    #[serde(rename = "NAME")]
    name: String,
    #[serde(rename = "OUTCOME", default)]
    outcomes: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BifDefinition {
    #[serde(rename = "FOR")]
    variable: String,
    #[serde(rename = "GIVEN", default)]
    given: Vec<String>,
    #[serde(rename = "TABLE")]
    table: String,
}

fn parse_table(variable: &str, text: &str) -> Result<Vec<f64>> {
    text.split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                BayesError::Parse(format!(
                    "table of '{}' holds '{}', which is not a number",
                    variable, token
                ))
            })
        })
        .collect()
}

fn trimmed(names: Vec<String>) -> Vec<String> {
    names.into_iter().map(|n| n.trim().to_string()).collect()
}

pub(crate) fn parse(text: &str) -> Result<NetworkDefinition> {
    let document: BifDocument =
        quick_xml::de::from_str(text).map_err(|err| BayesError::Parse(err.to_string()))?;
    let network = document.network;
    trace!(
        "xmlbif::parse - {} variables, {} definitions",
        network.variables.len(),
        network.definitions.len()
    );

    let variables = network
        .variables
        .into_iter()
        .map(|v| VariableDefinition {
            name: v.name.trim().to_string(),
            outcomes: trimmed(v.outcomes),
        })
        .collect();
    let definitions = network
        .definitions
        .into_iter()
        .map(|d| {
            let variable = d.variable.trim().to_string();
            let table = parse_table(&variable, &d.table)?;
            Ok(TableDefinition {
                variable,
                given: trimmed(d.given),
                table,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(NetworkDefinition {
        variables,
        definitions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RAIN: &str = r#"<?xml version="1.0" encoding="US-ASCII"?>
<BIF VERSION="0.3">
<NETWORK>
<NAME>Rain</NAME>
<!-- interleaved on purpose -->
<VARIABLE TYPE="nature">
    <NAME>Rain</NAME>
    <OUTCOME>yes</OUTCOME>
    <PROPERTY>position = (10, 20)</PROPERTY>
    <OUTCOME>no</OUTCOME>
</VARIABLE>
<DEFINITION>
    <FOR>Rain</FOR>
    <TABLE>0.3 0.7 </TABLE>
</DEFINITION>
<VARIABLE TYPE="nature">
    <NAME>Wet</NAME>
    <OUTCOME>yes</OUTCOME>
    <OUTCOME>no</OUTCOME>
</VARIABLE>
<DEFINITION>
    <FOR>Wet</FOR>
    <GIVEN>Rain</GIVEN>
    <TABLE>
        0.9 0.1
        0.2 0.8
    </TABLE>
</DEFINITION>
</NETWORK>
</BIF>
"#;

    #[test]
    fn test_parse_interleaved_document() {
        let definition = parse(RAIN).unwrap();
        let names: Vec<&str> = definition.variables.iter().map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["Rain", "Wet"]);
        assert_eq!(definition.variables[0].outcomes, ["yes", "no"]);
        let wet = &definition.definitions[1];
        assert_eq!(wet.variable, "Wet");
        assert_eq!(wet.given, ["Rain"]);
        assert_eq!(wet.table, vec![0.9, 0.1, 0.2, 0.8]);
    }

    #[test]
    fn test_parsed_document_builds_a_network() {
        let network = parse(RAIN).unwrap().build().unwrap();
        let wet = network.variable("Wet").unwrap();
        assert_eq!(wet.cpt().value(&[("Rain", "no"), ("Wet", "yes")]), Some(0.2));
    }

    #[test]
    fn test_probability_elements_are_accepted() {
        let text = "<BIF><NETWORK>\
            <VARIABLE><NAME>A</NAME><OUTCOME>T</OUTCOME><OUTCOME>F</OUTCOME></VARIABLE>\
            <PROBABILITY><FOR>A</FOR><TABLE>0.6 0.4</TABLE></PROBABILITY>\
            </NETWORK></BIF>";
        let definition = parse(text).unwrap();
        assert_eq!(definition.definitions[0].table, vec![0.6, 0.4]);
    }

    #[test]
    fn test_bad_number_is_parse_error() {
        let text = "<BIF><NETWORK>\
            <VARIABLE><NAME>A</NAME><OUTCOME>T</OUTCOME><OUTCOME>F</OUTCOME></VARIABLE>\
            <DEFINITION><FOR>A</FOR><TABLE>0.6 zero</TABLE></DEFINITION>\
            </NETWORK></BIF>";
        match parse(text) {
            Err(BayesError::Parse(message)) => assert!(message.contains("zero")),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_network_is_parse_error() {
        assert!(matches!(parse("<BIF></BIF>"), Err(BayesError::Parse(_))));
        assert!(matches!(parse("not xml at all"), Err(BayesError::Parse(_))));
    }
}
