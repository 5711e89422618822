use crate::common::errors::Result;
use crate::model::network::BayesianNetwork;

use super::factory::NetworkScenario;

pub struct Sprinkler {}

impl NetworkScenario for Sprinkler {
    fn build(&self) -> Result<BayesianNetwork> {
        let tf = ["T", "F"];
        BayesianNetwork::builder()
            .variable("Cloudy", &tf, &[], &[0.5, 0.5])
            .variable("Sprinkler", &tf, &["Cloudy"], &[0.1, 0.9, 0.5, 0.5])
            .variable("Rain", &tf, &["Cloudy"], &[0.8, 0.2, 0.2, 0.8])
            // a dry lawn is certain with neither sprinkler nor rain
            .variable(
                "WetGrass",
                &tf,
                &["Sprinkler", "Rain"],
                &[0.99, 0.01, 0.9, 0.1, 0.9, 0.1, 0.0, 1.0],
            )
            .build()
    }

    fn sample_queries(&self) -> &'static [&'static str] {
        &[
            "P(Rain=T|WetGrass=T) Cloudy-Sprinkler",
            "P(Sprinkler=T|WetGrass=T)",
            "P(Sprinkler=T|WetGrass=T,Rain=T)",
            "Sprinkler-Rain|Cloudy=T",
            "Sprinkler-Rain|Cloudy=T,WetGrass=T",
        ]
    }
}
