//! Compute module - selection, tuning and scoring of candidate algorithms.

pub mod algorithms;

mod agent;
mod benchmark;
mod encoder;
mod evaluator;
mod generator;
mod optimizer;
mod recommender;
mod registry;

pub use agent::*;
pub use benchmark::*;
pub use encoder::*;
pub use evaluator::*;
pub use generator::*;
pub use optimizer::*;
pub use recommender::*;
pub use registry::*;
