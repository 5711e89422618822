use std::rc::Rc;

use crate::common::errors::{BayesError, Result};
use crate::model::network::BayesianNetwork;

use super::{alarm::Alarm, chain::Chain, sprinkler::Sprinkler};

/// A named, hard-wired example network.
pub trait NetworkScenario {
    fn build(&self) -> Result<BayesianNetwork>;

    /// Queries worth asking of this network, in query-file syntax.
    fn sample_queries(&self) -> &'static [&'static str];
}

pub struct ScenarioFactory;

impl ScenarioFactory {
    pub fn new_shared(name: &str) -> Result<Rc<dyn NetworkScenario>> {
        match name {
            "chain" => Ok(Rc::new(Chain {})),
            "alarm" => Ok(Rc::new(Alarm {})),
            "sprinkler" => Ok(Rc::new(Sprinkler {})),
            _ => Err(BayesError::invalid_query(format!(
                "unknown scenario '{}', expected one of {}",
                name,
                Self::names().join(", ")
            ))),
        }
    }

    pub fn build(name: &str) -> Result<BayesianNetwork> {
        Self::new_shared(name)?.build()
    }

    pub fn names() -> &'static [&'static str] {
        &["chain", "alarm", "sprinkler"]
    }
}
