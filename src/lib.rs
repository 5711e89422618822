#[macro_use]
pub mod common;
pub mod inference;
pub mod model;
pub mod scenarios;

/// Exports the main types for easy access
pub use common::errors::{BayesError, Result};
pub use inference::{BayesBall, InferenceResult, Query, VariableElimination};
pub use model::{BayesianNetwork, Factor, NetworkDefinition, OperationCounter, Variable};
