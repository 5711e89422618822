use crate::common::errors::Result;
use crate::model::network::BayesianNetwork;

use super::factory::NetworkScenario;

/// A -> B -> C -> D, all boolean.
pub struct Chain {}

impl NetworkScenario for Chain {
    fn build(&self) -> Result<BayesianNetwork> {
        let tf = ["T", "F"];
        BayesianNetwork::builder()
            .variable("A", &tf, &[], &[0.6, 0.4])
            .variable("B", &tf, &["A"], &[0.8, 0.2, 0.1, 0.9])
            .variable("C", &tf, &["B"], &[0.7, 0.3, 0.2, 0.8])
            .variable("D", &tf, &["C"], &[0.9, 0.1, 0.4, 0.6])
            .build()
    }

    fn sample_queries(&self) -> &'static [&'static str] {
        &[
            "P(D=T)",
            "P(D=T) A-B-C",
            "P(D=T|A=T) B-C",
            "P(A=T|D=T)",
            "A-D|",
            "A-D|B=T",
        ]
    }
}
