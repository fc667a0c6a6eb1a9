//! Algorithm discovery - pick and tune an algorithm for a problem description.
//!
//! Given a problem class, an input size and resource constraints, the engine
//! recommends a concrete algorithm with tuned parameters:
//!
//! 1. The problem is discretized into a [`schema::State`].
//! 2. A Q-learning [`compute::SelectionAgent`] picks a candidate from the
//!    [`compute::Registry`].
//! 3. A [`compute::GeneticOptimizer`] tunes the candidate's parameters.
//! 4. The [`compute::Evaluator`] runs it on generated test cases and scores
//!    correctness, speed and space.
//! 5. The score is fed back to the agent as reward.
//!
//! # Architecture
//!
//! - `schema`: Problem specifications, records, configuration
//! - `compute`: Candidates, agent, optimizer, evaluator, benchmarks
//! - `store`: Result cache and discovery history
//! - `engine`: The [`DiscoveryEngine`] orchestrator
//!
//! # Example
//!
//! ```rust,no_run
//! use algo_discovery::{DiscoveryEngine, EngineConfig, ProblemSpec};
//!
//! let engine = DiscoveryEngine::new(EngineConfig::default())?;
//! let spec = ProblemSpec::new("sorting", 10_000, 1.0, None)?;
//! let outcome = engine.discover(&spec)?;
//!
//! println!(
//!     "{} ({}) fitness {:.3}",
//!     outcome.record.algorithm, outcome.record.time_complexity, outcome.record.fitness_score
//! );
//! # Ok::<(), algo_discovery::DiscoveryError>(())
//! ```

pub mod compute;
pub mod engine;
pub mod error;
pub mod schema;
pub mod store;

// Re-export commonly used types
pub use compute::Recommendation;
pub use engine::DiscoveryEngine;
pub use error::DiscoveryError;
pub use store::PerformanceStats;
pub use schema::{
    CandidateRef, DiscoveryOutcome, DiscoveryRecord, EngineConfig, EvaluationResult,
    OptimizationReport, ProblemSpec, ProblemType, TestCase,
};
