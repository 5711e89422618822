use crate::common::errors::Result;
use crate::model::network::BayesianNetwork;

use super::factory::NetworkScenario;

/// Burglary and earthquake both trigger an alarm; John and Mary each call
/// when they hear it.
pub struct Alarm {}

impl NetworkScenario for Alarm {
    fn build(&self) -> Result<BayesianNetwork> {
        let tf = ["T", "F"];
        BayesianNetwork::builder()
            .variable("B", &tf, &[], &[0.001, 0.999])
            .variable("E", &tf, &[], &[0.002, 0.998])
            .variable(
                "A",
                &tf,
                &["B", "E"],
                &[0.95, 0.05, 0.94, 0.06, 0.29, 0.71, 0.001, 0.999],
            )
            .variable("J", &tf, &["A"], &[0.9, 0.1, 0.05, 0.95])
            .variable("M", &tf, &["A"], &[0.7, 0.3, 0.01, 0.99])
            .build()
    }

    fn sample_queries(&self) -> &'static [&'static str] {
        &[
            "P(B=T|J=T,M=T) A-E",
            "P(B=T|J=T,M=T) E-A",
            "P(J=T|B=T) A-E-M",
            "P(J=T|B=T) M-E-A",
            "B-E|",
            "B-E|J=T",
            "J-M|A=T",
        ]
    }
}
