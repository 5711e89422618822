use std::collections::{BTreeSet, HashMap, VecDeque};

use log::debug;

use crate::common::errors::{BayesError, Result};
use crate::inference::bayes_ball::BayesBall;

use super::factor::Factor;
use super::variable::Variable;

/// Allowed deviation from 1.0 when checking that a CPT row is a distribution.
pub const PROB_TOLERANCE: f64 = 1e-6;

/// A validated, read-only Bayesian network.
///
/// Variables keep their declaration order; parent and child adjacency is
/// derived once at construction and stored by index.
#[derive(Debug, Clone)]
pub struct BayesianNetwork {
    variables: Vec<Variable>,
    index: HashMap<String, usize>,
    parents: Vec<Vec<usize>>,
    children: Vec<Vec<usize>>,
    topological: Vec<usize>,
}

impl BayesianNetwork {
    pub fn builder() -> NetworkBuilder {
        NetworkBuilder::default()
    }

    /// Validate the variables and derive the graph structure.
    ///
    /// # Errors
    /// * `BayesError::MalformedNetwork` for duplicate or empty names, bad
    ///   outcome domains, unknown or repeated parents, CPTs whose scope, size
    ///   or values are wrong, and cycles
    pub fn new(variables: Vec<Variable>) -> Result<Self> {
        let mut index = HashMap::with_capacity(variables.len());
        for (i, variable) in variables.iter().enumerate() {
            if variable.name().is_empty() {
                return Err(BayesError::malformed("variable with an empty name"));
            }
            if index.insert(variable.name().to_string(), i).is_some() {
                return Err(BayesError::malformed(format!(
                    "variable '{}' is declared twice",
                    variable.name()
                )));
            }
        }

        let mut parents = Vec::with_capacity(variables.len());
        let mut children = vec![Vec::new(); variables.len()];
        for (i, variable) in variables.iter().enumerate() {
            check_outcomes(variable)?;
            let mut resolved = Vec::with_capacity(variable.parents().len());
            for parent in variable.parents() {
                let &p = index.get(parent).ok_or_else(|| {
                    BayesError::malformed(format!(
                        "variable '{}' has unknown parent '{}'",
                        variable.name(),
                        parent
                    ))
                })?;
                if p == i || resolved.contains(&p) {
                    return Err(BayesError::malformed(format!(
                        "variable '{}' lists parent '{}' more than once or as itself",
                        variable.name(),
                        parent
                    )));
                }
                resolved.push(p);
                children[p].push(i);
            }
            parents.push(resolved);
        }

        for variable in &variables {
            check_cpt(variable, &variables, &index)?;
        }

        let topological = topological_sort(&variables, &parents, &children)?;
        debug!("Built network with {} variables", variables.len());

        Ok(BayesianNetwork {
            variables,
            index,
            parents,
            children,
            topological,
        })
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Variables in declaration order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.index.get(name).map(|&i| &self.variables[i])
    }

    /// Like [`BayesianNetwork::variable`] but unknown names are an error.
    pub fn require(&self, name: &str) -> Result<&Variable> {
        self.variable(name)
            .ok_or_else(|| BayesError::UnknownVariable(name.to_string()))
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn parents_of(&self, name: &str) -> Result<Vec<&Variable>> {
        let i = self.require_index(name)?;
        Ok(self.parents[i].iter().map(|&p| &self.variables[p]).collect())
    }

    pub fn children_of(&self, name: &str) -> Result<Vec<&Variable>> {
        let i = self.require_index(name)?;
        Ok(self.children[i].iter().map(|&c| &self.variables[c]).collect())
    }

    /// Names in an order where every parent precedes its children. Ties keep
    /// declaration order.
    pub fn topological_order(&self) -> Vec<&str> {
        self.topological
            .iter()
            .map(|&i| self.variables[i].name())
            .collect()
    }

    /// Whether `first` and `second` are d-separated given the observed names.
    pub fn is_independent<S: AsRef<str>>(
        &self,
        first: &str,
        second: &str,
        evidence: &[S],
    ) -> Result<bool> {
        BayesBall::new(self).is_independent(first, second, evidence)
    }

    pub(crate) fn parent_indices(&self, i: usize) -> &[usize] {
        &self.parents[i]
    }

    pub(crate) fn child_indices(&self, i: usize) -> &[usize] {
        &self.children[i]
    }

    pub(crate) fn require_index(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| BayesError::UnknownVariable(name.to_string()))
    }
}

fn check_outcomes(variable: &Variable) -> Result<()> {
    if variable.outcomes().is_empty() {
        return Err(BayesError::malformed(format!(
            "variable '{}' has no outcomes",
            variable.name()
        )));
    }
    let distinct: BTreeSet<&String> = variable.outcomes().iter().collect();
    if distinct.len() != variable.outcomes().len() {
        return Err(BayesError::malformed(format!(
            "variable '{}' repeats an outcome",
            variable.name()
        )));
    }
    Ok(())
}

fn check_cpt(variable: &Variable, variables: &[Variable], index: &HashMap<String, usize>) -> Result<()> {
    let name = variable.name();
    let cpt = variable.cpt();

    let mut expected_scope: Vec<&str> = variable.parents().iter().map(String::as_str).collect();
    expected_scope.push(name);
    expected_scope.sort();
    if cpt.scope().iter().map(String::as_str).ne(expected_scope.iter().copied()) {
        return Err(BayesError::malformed(format!(
            "CPT of '{}' is over {:?} but should be over {:?}",
            name,
            cpt.scope(),
            expected_scope
        )));
    }

    let domains: Vec<&Variable> = cpt.scope().iter().map(|n| &variables[index[n]]).collect();
    let expected_rows: usize = domains.iter().map(|v| v.outcomes().len()).product();
    if cpt.len() != expected_rows {
        return Err(BayesError::malformed(format!(
            "CPT of '{}' has {} rows, expected {}",
            name,
            cpt.len(),
            expected_rows
        )));
    }

    for (outcomes, value) in cpt.iter() {
        if let Some((owner, outcome)) = domains
            .iter()
            .zip(outcomes)
            .find(|(owner, outcome)| !owner.has_outcome(outcome))
        {
            return Err(BayesError::malformed(format!(
                "CPT of '{}' uses outcome '{}' not declared for '{}'",
                name,
                outcome,
                owner.name()
            )));
        }
        if !value.is_finite() || value < 0.0 {
            return Err(BayesError::malformed(format!(
                "CPT of '{}' holds invalid probability {}",
                name, value
            )));
        }
    }

    let column = cpt
        .position(name)
        .expect("CPT scope was checked to contain its variable");
    for (parent_assignment, (total, _)) in cpt.totals_over(column) {
        if (total - 1.0).abs() > PROB_TOLERANCE {
            return Err(BayesError::malformed(format!(
                "CPT of '{}' sums to {} for parent assignment {:?}",
                name, total, parent_assignment
            )));
        }
    }
    Ok(())
}

fn topological_sort(
    variables: &[Variable],
    parents: &[Vec<usize>],
    children: &[Vec<usize>],
) -> Result<Vec<usize>> {
    let mut in_degree: Vec<usize> = parents.iter().map(Vec::len).collect();
    let mut ready: VecDeque<usize> = (0..variables.len()).filter(|&i| in_degree[i] == 0).collect();
    let mut order = Vec::with_capacity(variables.len());

    while let Some(i) = ready.pop_front() {
        order.push(i);
        for &child in &children[i] {
            in_degree[child] -= 1;
            if in_degree[child] == 0 {
                ready.push_back(child);
            }
        }
    }

    if order.len() != variables.len() {
        let cyclic: Vec<&str> = (0..variables.len())
            .filter(|&i| in_degree[i] > 0)
            .map(|i| variables[i].name())
            .collect();
        return Err(BayesError::malformed(format!(
            "the graph has a cycle through {:?}",
            cyclic
        )));
    }
    Ok(order)
}

struct Declaration {
    name: String,
    outcomes: Vec<String>,
    parents: Vec<String>,
    table: Vec<f64>,
}

/// Collects variable declarations and turns them into a validated network.
///
/// Tables are row-major over the parents (in the order given) followed by the
/// variable itself, which varies fastest. Declarations may come in any order.
#[derive(Default)]
pub struct NetworkBuilder {
    declarations: Vec<Declaration>,
}

impl NetworkBuilder {
    pub fn variable<S: AsRef<str>>(
        mut self,
        name: &str,
        outcomes: &[S],
        parents: &[S],
        table: &[f64],
    ) -> Self {
        self.declarations.push(Declaration {
            name: name.to_string(),
            outcomes: outcomes.iter().map(|o| o.as_ref().to_string()).collect(),
            parents: parents.iter().map(|p| p.as_ref().to_string()).collect(),
            table: table.to_vec(),
        });
        self
    }

    pub fn build(self) -> Result<BayesianNetwork> {
        let domains: HashMap<&str, &[String]> = self
            .declarations
            .iter()
            .map(|declaration| (declaration.name.as_str(), declaration.outcomes.as_slice()))
            .collect();

        let mut variables = Vec::with_capacity(self.declarations.len());
        for declaration in &self.declarations {
            let mut columns: Vec<(&str, &[String])> = Vec::with_capacity(declaration.parents.len() + 1);
            for parent in &declaration.parents {
                let &outcomes = domains.get(parent.as_str()).ok_or_else(|| {
                    BayesError::malformed(format!(
                        "variable '{}' has unknown parent '{}'",
                        declaration.name, parent
                    ))
                })?;
                columns.push((parent.as_str(), outcomes));
            }
            columns.push((declaration.name.as_str(), declaration.outcomes.as_slice()));

            let cpt = Factor::from_table(&columns, &declaration.table).map_err(|err| match err {
                BayesError::MalformedNetwork(message) => {
                    BayesError::malformed(format!("CPT of '{}': {}", declaration.name, message))
                }
                other => other,
            })?;
            variables.push(Variable::new(
                &declaration.name,
                declaration.outcomes.clone(),
                declaration.parents.clone(),
                cpt,
            ));
        }
        BayesianNetwork::new(variables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TF: [&str; 2] = ["T", "F"];

    fn chain() -> BayesianNetwork {
        BayesianNetwork::builder()
            .variable("C", &TF, &["B"], &[0.7, 0.3, 0.2, 0.8])
            .variable("A", &TF, &[], &[0.6, 0.4])
            .variable("B", &TF, &["A"], &[0.8, 0.2, 0.1, 0.9])
            .build()
            .unwrap()
    }

    #[test]
    fn test_adjacency_is_derived() {
        let network = chain();
        assert_eq!(network.len(), 3);
        let parents: Vec<&str> = network.parents_of("B").unwrap().iter().map(|v| v.name()).collect();
        let children: Vec<&str> = network.children_of("B").unwrap().iter().map(|v| v.name()).collect();
        assert_eq!(parents, vec!["A"]);
        assert_eq!(children, vec!["C"]);
        assert!(network.parents_of("A").unwrap().is_empty());
        assert!(network.variable("A").unwrap().is_root());
    }

    #[test]
    fn test_topological_order_puts_parents_first() {
        assert_eq!(chain().topological_order(), vec!["A", "B", "C"]);
    }

    #[test]
    fn test_unknown_lookup_is_an_error() {
        let network = chain();
        assert!(network.variable("Z").is_none());
        assert_eq!(
            network.require("Z").unwrap_err(),
            BayesError::UnknownVariable("Z".to_string())
        );
        assert!(network.children_of("Z").is_err());
    }

    #[test]
    fn test_cycle_is_rejected() {
        let result = BayesianNetwork::builder()
            .variable("A", &TF, &["B"], &[0.5, 0.5, 0.5, 0.5])
            .variable("B", &TF, &["A"], &[0.5, 0.5, 0.5, 0.5])
            .build();
        match result {
            Err(BayesError::MalformedNetwork(message)) => assert!(message.contains("cycle")),
            other => panic!("expected a cycle error, got {:?}", other),
        }
    }

    #[test]
    fn test_rows_must_sum_to_one() {
        let result = BayesianNetwork::builder()
            .variable("A", &TF, &[], &[0.6, 0.6])
            .build();
        assert!(matches!(result, Err(BayesError::MalformedNetwork(_))));
    }

    #[test]
    fn test_rows_are_summed_over_the_variable_not_the_first_column() {
        // the parent "A" sorts before "Z"; summing over it would accept this table
        let result = BayesianNetwork::builder()
            .variable("A", &TF, &[], &[0.5, 0.5])
            .variable("Z", &TF, &["A"], &[0.5, 0.6, 0.5, 0.4])
            .build();
        assert!(matches!(result, Err(BayesError::MalformedNetwork(_))));

        let valid = BayesianNetwork::builder()
            .variable("A", &TF, &[], &[0.5, 0.5])
            .variable("Z", &TF, &["A"], &[0.4, 0.6, 0.1, 0.9])
            .build();
        assert!(valid.is_ok());
    }

    #[test]
    fn test_negative_probability_is_rejected() {
        let result = BayesianNetwork::builder()
            .variable("A", &TF, &[], &[1.5, -0.5])
            .build();
        assert!(matches!(result, Err(BayesError::MalformedNetwork(_))));
    }

    #[test]
    fn test_unknown_parent_is_rejected() {
        let result = BayesianNetwork::builder()
            .variable("B", &TF, &["A"], &[0.5, 0.5, 0.5, 0.5])
            .build();
        assert!(matches!(result, Err(BayesError::MalformedNetwork(_))));
    }

    #[test]
    fn test_duplicate_variable_is_rejected() {
        let result = BayesianNetwork::builder()
            .variable("A", &TF, &[], &[0.5, 0.5])
            .variable("A", &TF, &[], &[0.5, 0.5])
            .build();
        assert!(matches!(result, Err(BayesError::MalformedNetwork(_))));
    }

    #[test]
    fn test_wrong_table_size_is_rejected() {
        let result = BayesianNetwork::builder()
            .variable("A", &TF, &[], &[0.5, 0.5])
            .variable("B", &TF, &["A"], &[0.5, 0.5])
            .build();
        assert!(matches!(result, Err(BayesError::MalformedNetwork(_))));
    }
}
