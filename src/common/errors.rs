use thiserror::Error;

pub type Result<T> = std::result::Result<T, BayesError>;

/// Errors surfaced by network construction, inference and query parsing.
///
/// Everything is reported before any elimination work starts; numeric
/// degeneracy (zero-probability evidence) is not an error and shows up as a
/// non-finite probability instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BayesError {
    /// A query, evidence, order or definition names a variable the network does not have.
    #[error("unknown variable '{0}'")]
    UnknownVariable(String),

    /// An outcome label outside the variable's domain.
    #[error("variable '{variable}' has no outcome '{outcome}'")]
    UnknownOutcome { variable: String, outcome: String },

    /// Cycles, bad tables, CPT rows that do not sum to one, duplicate names.
    #[error("malformed network: {0}")]
    MalformedNetwork(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// A non-empty elimination order that leaves hidden variables uncovered.
    #[error("elimination order is missing hidden variables: {}", missing.join(", "))]
    IncompleteOrder { missing: Vec<String> },

    #[error("parse error: {0}")]
    Parse(String),

    /// Elimination lost every factor over the query variable.
    #[error("inference failed: {0}")]
    Inference(String),
}

impl BayesError {
    pub fn malformed(message: impl Into<String>) -> Self {
        BayesError::MalformedNetwork(message.into())
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        BayesError::InvalidQuery(message.into())
    }
}
