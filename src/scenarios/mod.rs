pub mod alarm;
pub mod chain;
pub mod factory;
pub mod sprinkler;

pub use factory::{NetworkScenario, ScenarioFactory};
