#[macro_use]
pub mod logging;
pub mod errors;
pub mod setup;
