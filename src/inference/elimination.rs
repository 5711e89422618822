use std::collections::HashSet;

use log::{debug, trace};
use serde::Serialize;

use crate::common::errors::{BayesError, Result};
use crate::model::factor::{Factor, OperationCounter};
use crate::model::network::BayesianNetwork;

/// A request for `P(variable = value | evidence)`.
///
/// An empty `order` lets the engine combine everything and sum out hidden
/// variables in scope order; a non-empty one must name every hidden variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub variable: String,
    pub value: String,
    pub evidence: Vec<(String, String)>,
    pub order: Vec<String>,
}

impl Query {
    pub fn new(variable: &str, value: &str) -> Self {
        Query {
            variable: variable.to_string(),
            value: value.to_string(),
            evidence: Vec::new(),
            order: Vec::new(),
        }
    }

    pub fn given(mut self, variable: &str, value: &str) -> Self {
        self.evidence.push((variable.to_string(), value.to_string()));
        self
    }

    pub fn with_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.order = order.into_iter().map(|s| s.as_ref().to_string()).collect();
        self
    }
}

/// Posterior probability plus the arithmetic spent computing it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct InferenceResult {
    pub probability: f64,
    pub additions: usize,
    pub multiplications: usize,
}

impl InferenceResult {
    /// A result that needed no arithmetic.
    pub fn exact(probability: f64) -> Self {
        InferenceResult {
            probability,
            additions: 0,
            multiplications: 0,
        }
    }

    /// Evidence with zero probability normalizes to NaN.
    pub fn is_degenerate(&self) -> bool {
        !self.probability.is_finite()
    }

    fn counted(probability: f64, counter: &OperationCounter) -> Self {
        InferenceResult {
            probability,
            additions: counter.additions(),
            multiplications: counter.multiplications(),
        }
    }
}

/// Variable Elimination over a borrowed network. Holds no per-query state, so
/// one engine can answer any number of queries.
pub struct VariableElimination<'a> {
    network: &'a BayesianNetwork,
}

impl<'a> VariableElimination<'a> {
    pub fn new(network: &'a BayesianNetwork) -> Self {
        VariableElimination { network }
    }

    pub fn infer(&self, query: &Query) -> Result<InferenceResult> {
        trace!("VariableElimination::infer - Start {:?}", query);
        self.validate(query)?;

        if let Some((_, observed)) = query.evidence.iter().find(|(name, _)| *name == query.variable) {
            let probability = if *observed == query.value { 1.0 } else { 0.0 };
            return Ok(InferenceResult::exact(probability));
        }
        if self.network.require(&query.variable)?.outcomes().len() == 1 {
            return Ok(InferenceResult::exact(1.0));
        }

        let mut factors: Vec<(String, Factor)> = self
            .network
            .variables()
            .iter()
            .map(|v| (v.name().to_string(), v.cpt().restrict(&query.evidence)))
            .collect();

        if query.evidence.is_empty() {
            let marginal = factors.iter().find_map(|(_, factor)| {
                if factor.scope() == [query.variable.as_str()] {
                    factor.value(&[(query.variable.as_str(), query.value.as_str())])
                } else {
                    None
                }
            });
            if let Some(probability) = marginal {
                debug!("Answered {} from its prior", query.variable);
                return Ok(InferenceResult::exact(probability));
            }
        }

        let mut counter = OperationCounter::new();
        factors.retain(|(_, factor)| !factor.is_constant());

        for hidden in &query.order {
            let (matching, rest): (Vec<_>, Vec<_>) = factors
                .into_iter()
                .partition(|(_, factor)| factor.contains(hidden));
            factors = rest;
            let Some((label, _)) = matching.last() else {
                continue;
            };
            let label = label.clone();
            let Some(joined) = Factor::join_all(matching.into_iter().map(|(_, f)| f).collect(), &mut counter) else {
                continue;
            };
            // a single-outcome `hidden` is dropped while joining; keep what is left
            if !joined.contains(hidden) {
                factors.push((label, joined));
                continue;
            }
            if joined.scope().len() <= 1 {
                continue;
            }
            trace!("VariableElimination::infer - eliminating {} from {:?}", hidden, joined.scope());
            factors.push((label, joined.eliminate(hidden, &mut counter)));
        }

        factors.retain(|(_, factor)| !factor.is_constant());
        let Some(mut combined) = Factor::join_all(factors.into_iter().map(|(_, f)| f).collect(), &mut counter) else {
            return Err(lost_query(&query.variable));
        };
        if combined.scope().len() > 1 {
            let leftover: Vec<String> = combined
                .scope()
                .iter()
                .filter(|name| **name != query.variable)
                .cloned()
                .collect();
            for name in leftover {
                combined = combined.eliminate(&name, &mut counter);
            }
        }

        let posterior = combined.normalize(&mut counter);
        let probability = lookup(&posterior, &query.variable, &query.value)?;
        debug!(
            "P({}={}) = {} with {} additions, {} multiplications",
            query.variable,
            query.value,
            probability,
            counter.additions(),
            counter.multiplications()
        );
        trace!("VariableElimination::infer - End");
        Ok(InferenceResult::counted(probability, &counter))
    }

    /// Names that are neither the query variable nor observed, in declaration order.
    pub fn hidden_variables(&self, query: &Query) -> Vec<String> {
        self.network
            .variables()
            .iter()
            .map(|v| v.name())
            .filter(|name| *name != query.variable && !query.evidence.iter().any(|(e, _)| e == name))
            .map(str::to_string)
            .collect()
    }

    fn validate(&self, query: &Query) -> Result<()> {
        self.check_assignment(&query.variable, &query.value)?;

        let mut observed = HashSet::new();
        for (name, value) in &query.evidence {
            self.check_assignment(name, value)?;
            if !observed.insert(name.as_str()) {
                return Err(BayesError::invalid_query(format!(
                    "variable '{}' is observed more than once",
                    name
                )));
            }
        }

        let mut ordered = HashSet::new();
        for name in &query.order {
            self.network.require(name)?;
            if !ordered.insert(name.as_str()) {
                return Err(BayesError::invalid_query(format!(
                    "variable '{}' appears twice in the elimination order",
                    name
                )));
            }
            if *name == query.variable || observed.contains(name.as_str()) {
                return Err(BayesError::invalid_query(format!(
                    "variable '{}' is queried or observed and cannot be eliminated",
                    name
                )));
            }
        }

        if !query.order.is_empty() {
            let missing: Vec<String> = self
                .hidden_variables(query)
                .into_iter()
                .filter(|name| !ordered.contains(name.as_str()))
                .collect();
            if !missing.is_empty() {
                return Err(BayesError::IncompleteOrder { missing });
            }
        }
        Ok(())
    }

    fn check_assignment(&self, name: &str, value: &str) -> Result<()> {
        if self.network.require(name)?.has_outcome(value) {
            Ok(())
        } else {
            Err(BayesError::UnknownOutcome {
                variable: name.to_string(),
                outcome: value.to_string(),
            })
        }
    }
}

/// The posterior of `value`, 0.0 if no row carries it.
fn lookup(factor: &Factor, variable: &str, value: &str) -> Result<f64> {
    let column = factor.position(variable).ok_or_else(|| lost_query(variable))?;
    Ok(factor
        .iter()
        .find(|(outcomes, _)| outcomes[column] == value)
        .map(|(_, probability)| probability)
        .unwrap_or(0.0))
}

fn lost_query(variable: &str) -> BayesError {
    BayesError::Inference(format!(
        "no factor over '{}' survived elimination",
        variable
    ))
}
