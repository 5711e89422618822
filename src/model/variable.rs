use std::fmt;

use super::factor::Factor;

/// A discrete random variable of a network together with its origin CPT.
///
/// The CPT scope is the variable itself plus its parents.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    outcomes: Vec<String>,
    parents: Vec<String>,
    cpt: Factor,
}

impl Variable {
    pub fn new(name: &str, outcomes: Vec<String>, parents: Vec<String>, cpt: Factor) -> Self {
        Variable {
            name: name.to_string(),
            outcomes,
            parents,
            cpt,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Outcome labels in declaration order.
    pub fn outcomes(&self) -> &[String] {
        &self.outcomes
    }

    /// Parent names in declaration order.
    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn cpt(&self) -> &Factor {
        &self.cpt
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    pub fn has_outcome(&self, outcome: &str) -> bool {
        self.outcomes.iter().any(|o| o == outcome)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
