pub mod bayes_ball;
pub mod elimination;
pub mod query;

pub use bayes_ball::BayesBall;
pub use elimination::{InferenceResult, Query, VariableElimination};
pub use query::{Answer, QueryLine, answer, parse_queries, parse_query_line};
