//! Schema module - Problem, candidate, record and configuration types.

mod candidate;
mod complexity;
mod config;
mod problem;
mod record;

pub use candidate::*;
pub use complexity::*;
pub use config::*;
pub use problem::*;
pub use record::*;
