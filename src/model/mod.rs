pub mod definition;
pub mod factor;
pub mod network;
pub mod variable;
mod xmlbif;

pub use definition::NetworkDefinition;
pub use factor::{Factor, OperationCounter};
pub use network::{BayesianNetwork, NetworkBuilder};
pub use variable::Variable;
