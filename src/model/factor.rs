use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use log::trace;

use crate::common::errors::{BayesError, Result};

/// Counts the additions and multiplications performed while combining factors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperationCounter {
    additions: usize,
    multiplications: usize,
}

impl OperationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_additions(&mut self, count: usize) {
        self.additions += count;
    }

    pub fn add_multiplications(&mut self, count: usize) {
        self.multiplications += count;
    }

    pub fn additions(&self) -> usize {
        self.additions
    }

    pub fn multiplications(&self) -> usize {
        self.multiplications
    }
}

impl fmt::Display for OperationCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.additions, self.multiplications)
    }
}

/// A function from full assignments over a scope of variables to non-negative reals.
///
/// The scope is kept sorted by name and every row key holds one outcome label
/// per scope variable, aligned with the scope. Two factors over the same
/// scope therefore compare row by row without any string matching.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Factor {
    scope: Vec<String>,
    rows: BTreeMap<Vec<String>, f64>,
}

impl Factor {
    /// The factor with no scope and no rows.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create a factor from rows whose outcomes follow the order of `scope`.
    ///
    /// # Errors
    /// * `BayesError::MalformedNetwork` if a name repeats in the scope, a row
    ///   has the wrong arity, or two rows assign the same outcomes
    pub fn new(scope: Vec<String>, rows: Vec<(Vec<String>, f64)>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for name in &scope {
            if !seen.insert(name.as_str()) {
                return Err(BayesError::malformed(format!(
                    "variable '{}' appears twice in a factor scope",
                    name
                )));
            }
        }

        // permutation from the caller's column order to the sorted scope
        let mut columns: Vec<usize> = (0..scope.len()).collect();
        columns.sort_by(|&a, &b| scope[a].cmp(&scope[b]));
        let sorted_scope: Vec<String> = columns.iter().map(|&c| scope[c].clone()).collect();

        let mut table = BTreeMap::new();
        for (outcomes, value) in rows {
            if outcomes.len() != scope.len() {
                return Err(BayesError::malformed(format!(
                    "row {:?} does not assign every variable of scope {:?}",
                    outcomes, scope
                )));
            }
            let key: Vec<String> = columns.iter().map(|&c| outcomes[c].clone()).collect();
            if table.insert(key, value).is_some() {
                return Err(BayesError::malformed(format!(
                    "row {:?} appears twice in a factor over {:?}",
                    outcomes, scope
                )));
            }
        }

        Ok(Factor {
            scope: sorted_scope,
            rows: table,
        })
    }

    /// Build a factor from a row-major table.
    ///
    /// The first variable varies slowest and the last one fastest, so a CPT is
    /// built by listing the parents first and the child last:
    /// `[P(B=T|A=T), P(B=F|A=T), P(B=T|A=F), P(B=F|A=F)]`.
    pub fn from_table(variables: &[(&str, &[String])], table: &[f64]) -> Result<Self> {
        let expected: usize = variables.iter().map(|(_, outcomes)| outcomes.len()).product();
        if expected != table.len() {
            return Err(BayesError::malformed(format!(
                "table over {:?} needs {} entries but has {}",
                variables.iter().map(|(name, _)| *name).collect::<Vec<_>>(),
                expected,
                table.len()
            )));
        }

        let scope: Vec<String> = variables.iter().map(|(name, _)| name.to_string()).collect();
        let mut rows = Vec::with_capacity(table.len());
        for (index, &value) in table.iter().enumerate() {
            let mut remainder = index;
            let mut outcomes = vec![String::new(); variables.len()];
            for (column, (_, domain)) in variables.iter().enumerate().rev() {
                outcomes[column] = domain[remainder % domain.len()].clone();
                remainder /= domain.len();
            }
            rows.push((outcomes, value));
        }
        Factor::new(scope, rows)
    }

    pub fn scope(&self) -> &[String] {
        &self.scope
    }

    pub fn contains(&self, variable: &str) -> bool {
        self.position(variable).is_some()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A factor with at most one row carries no information beyond a constant.
    pub fn is_constant(&self) -> bool {
        self.rows.len() <= 1
    }

    /// Iterate rows in canonical order as `(outcomes aligned with scope, value)`.
    pub fn iter(&self) -> impl Iterator<Item = (&[String], f64)> {
        self.rows.iter().map(|(key, value)| (key.as_slice(), *value))
    }

    /// Look up the value of a full assignment. Extra entries are ignored.
    pub fn value<S: AsRef<str>>(&self, assignment: &[(S, S)]) -> Option<f64> {
        let mut key = Vec::with_capacity(self.scope.len());
        for name in &self.scope {
            let (_, outcome) = assignment.iter().find(|(n, _)| n.as_ref() == name)?;
            key.push(outcome.as_ref().to_string());
        }
        self.rows.get(&key).copied()
    }

    /// Distinct outcomes of `variable` present in the rows.
    pub fn observed_outcomes(&self, variable: &str) -> Vec<&str> {
        match self.position(variable) {
            Some(column) => self
                .rows
                .keys()
                .map(|key| key[column].as_str())
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
            None => Vec::new(),
        }
    }

    /// Drop every row inconsistent with the evidence. Evidence on variables
    /// outside the scope is ignored and the scope itself is unchanged.
    pub fn restrict<S: AsRef<str>>(&self, evidence: &[(S, S)]) -> Factor {
        let relevant: Vec<(usize, &str)> = evidence
            .iter()
            .filter_map(|(name, value)| {
                self.position(name.as_ref()).map(|column| (column, value.as_ref()))
            })
            .collect();
        if relevant.is_empty() {
            return self.clone();
        }

        let rows = self
            .rows
            .iter()
            .filter(|(key, _)| relevant.iter().all(|(column, value)| key[*column] == *value))
            .map(|(key, value)| (key.clone(), *value))
            .collect();
        Factor {
            scope: self.scope.clone(),
            rows,
        }
    }

    /// Pointwise product over the union of both scopes.
    ///
    /// Only row pairs that agree on the shared variables produce a result row;
    /// disagreeing pairs describe impossible worlds and are skipped. The
    /// multiplication counter grows by the number of rows produced.
    pub fn join(&self, other: &Factor, counter: &mut OperationCounter) -> Factor {
        let scope: Vec<String> = self
            .scope
            .iter()
            .chain(other.scope.iter())
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let shared: Vec<(usize, usize)> = self
            .scope
            .iter()
            .enumerate()
            .filter_map(|(i, name)| other.position(name).map(|j| (i, j)))
            .collect();

        // for each result column, where to read the outcome from
        let sources: Vec<Source> = scope
            .iter()
            .map(|name| match self.position(name) {
                Some(i) => Source::Left(i),
                None => Source::Right(
                    other
                        .position(name)
                        .expect("joined scope only holds names of the two factors"),
                ),
            })
            .collect();

        let mut rows = BTreeMap::new();
        for (right_key, right_value) in &other.rows {
            for (left_key, left_value) in &self.rows {
                if shared.iter().any(|&(i, j)| left_key[i] != right_key[j]) {
                    continue;
                }
                let key: Vec<String> = sources
                    .iter()
                    .map(|source| match *source {
                        Source::Left(i) => left_key[i].clone(),
                        Source::Right(j) => right_key[j].clone(),
                    })
                    .collect();
                rows.insert(key, left_value * right_value);
            }
        }

        counter.add_multiplications(rows.len());
        Factor { scope, rows }
    }

    /// Join a list of factors, always combining the two smallest first.
    ///
    /// Factors are ranked by row count and then by the sum of the character
    /// codes of their scope names; full ties keep their list order. After
    /// every pairwise join, variables pinned to one outcome by evidence are
    /// dropped from the result. Returns `None` for an empty list.
    pub fn join_all(factors: Vec<Factor>, counter: &mut OperationCounter) -> Option<Factor> {
        let mut pending = factors;
        while pending.len() > 1 {
            pending.sort_by_key(Factor::weight);
            let first = pending.remove(0);
            let second = pending.remove(0);
            trace!(
                "join_all - joining {:?} ({} rows) with {:?} ({} rows)",
                first.scope,
                first.len(),
                second.scope,
                second.len()
            );
            pending.push(first.join(&second, counter).drop_fixed_variables());
        }
        pending.pop()
    }

    /// Sum `variable` out of the factor.
    ///
    /// Rows that agree on every other variable collapse into one row. A factor
    /// whose scope has one variable or fewer yields the empty factor. Each
    /// produced row costs one addition fewer than the number of terms summed.
    pub fn eliminate(&self, variable: &str, counter: &mut OperationCounter) -> Factor {
        if self.scope.len() <= 1 {
            return Factor::empty();
        }
        let Some(column) = self.position(variable) else {
            return self.clone();
        };

        let mut rows = BTreeMap::new();
        for (key, (total, terms)) in self.totals_over(column) {
            counter.add_additions(terms - 1);
            rows.insert(key, total);
        }

        let mut scope = self.scope.clone();
        scope.remove(column);
        Factor { scope, rows }
    }

    /// Scale the values so they sum to one.
    ///
    /// Variables pinned to a single observed outcome are dropped first. The
    /// addition counter grows by one less than the number of rows. A zero
    /// total yields NaN values rather than an error.
    pub fn normalize(&self, counter: &mut OperationCounter) -> Factor {
        let reduced = self.drop_fixed_variables();
        let mut values = reduced.rows.values();
        let total = match values.next() {
            Some(first) => values.fold(*first, |sum, value| sum + value),
            None => return reduced,
        };
        counter.add_additions(reduced.rows.len() - 1);

        let rows = reduced
            .rows
            .iter()
            .map(|(key, value)| (key.clone(), value / total))
            .collect();
        Factor {
            scope: reduced.scope,
            rows,
        }
    }

    /// Remove every scope variable whose rows all share one outcome.
    ///
    /// A single-variable, single-row factor is returned untouched.
    pub fn drop_fixed_variables(&self) -> Factor {
        if self.rows.is_empty() || (self.rows.len() == 1 && self.scope.len() == 1) {
            return self.clone();
        }

        let kept: Vec<usize> = (0..self.scope.len())
            .filter(|&column| {
                let mut outcomes = self.rows.keys().map(|key| &key[column]);
                let first = outcomes.next();
                outcomes.any(|outcome| Some(outcome) != first)
            })
            .collect();
        if kept.len() == self.scope.len() {
            return self.clone();
        }

        Factor {
            scope: kept.iter().map(|&column| self.scope[column].clone()).collect(),
            rows: self
                .rows
                .iter()
                .map(|(key, value)| (kept.iter().map(|&c| key[c].clone()).collect(), *value))
                .collect(),
        }
    }

    /// Per assignment of the other scope variables: the sum over `variable`
    /// and how many rows contributed.
    pub(crate) fn totals_over(&self, column: usize) -> BTreeMap<Vec<String>, (f64, usize)> {
        let mut totals: BTreeMap<Vec<String>, (f64, usize)> = BTreeMap::new();
        for (key, value) in &self.rows {
            let mut reduced = key.clone();
            reduced.remove(column);
            totals
                .entry(reduced)
                .and_modify(|(total, terms)| {
                    *total += value;
                    *terms += 1;
                })
                .or_insert((*value, 1));
        }
        totals
    }

    pub(crate) fn position(&self, variable: &str) -> Option<usize> {
        self.scope.iter().position(|name| name == variable)
    }

    fn weight(&self) -> (usize, u32) {
        let codes = self
            .scope
            .iter()
            .flat_map(|name| name.chars())
            .map(|c| c as u32)
            .sum();
        (self.rows.len(), codes)
    }
}

#[derive(Clone, Copy)]
enum Source {
    Left(usize),
    Right(usize),
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.rows {
            let assignment: Vec<String> = self
                .scope
                .iter()
                .zip(key)
                .map(|(name, outcome)| format!("{name}={outcome}"))
                .collect();
            writeln!(f, "{} : {}", assignment.join(","), value)?;
        }
        Ok(())
    }
}
