//! Evaluation results, discovery records and optimization reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Genome, ProblemType};

/// Outcome of running one candidate/genome over a set of test cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Whether correctness reached the configured floor.
    pub correct: bool,
    /// Fraction of test cases passed, in [0, 1].
    pub correctness: f64,
    pub passed: usize,
    /// Wrong answers.
    pub failed: usize,
    /// Cases that exceeded the time limit.
    pub timed_out: usize,
    /// Cases where the implementation faulted.
    pub faulted: usize,
    /// Mean wall-clock seconds per test case (timeouts count as the limit).
    pub elapsed_time: f64,
    /// Declared space class of the candidate.
    pub estimated_space: String,
    /// Combined score in [0, 1].
    pub fitness_score: f64,
}

impl EvaluationResult {
    /// Result for an evaluation that could not run any case.
    pub fn empty(estimated_space: impl Into<String>) -> Self {
        Self {
            correct: false,
            correctness: 0.0,
            passed: 0,
            failed: 0,
            timed_out: 0,
            faulted: 0,
            elapsed_time: 0.0,
            estimated_space: estimated_space.into(),
            fitness_score: 0.0,
        }
    }

    pub fn total_cases(&self) -> usize {
        self.passed + self.failed + self.timed_out + self.faulted
    }
}

/// Reference to the implementation behind a recommendation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Implementation {
    /// Registry name of the candidate.
    pub candidate: String,
    /// Tuned parameter values by name.
    pub parameters: BTreeMap<String, f64>,
}

/// Final output of a discovery request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryRecord {
    pub algorithm: String,
    pub problem_type: ProblemType,
    pub input_size: u64,
    pub fitness_score: f64,
    pub time_complexity: String,
    pub space_complexity: String,
    /// Measured mean seconds per test case.
    pub estimated_time: f64,
    pub implementation: Implementation,
    pub created_at: DateTime<Utc>,
}

impl DiscoveryRecord {
    /// Reason this record could not have come out of a discovery, if any.
    pub fn invalid_reason(&self) -> Option<String> {
        if !(0.0..=1.0).contains(&self.fitness_score) {
            return Some(format!("fitness_score {} outside [0, 1]", self.fitness_score));
        }
        if !(self.estimated_time.is_finite() && self.estimated_time >= 0.0) {
            return Some(format!("estimated_time {} is not a duration", self.estimated_time));
        }
        if self.algorithm.is_empty() {
            return Some("empty algorithm name".to_string());
        }
        None
    }
}

/// Result of [`crate::DiscoveryEngine::discover`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryOutcome {
    pub record: DiscoveryRecord,
    /// Served from the result cache without engine work.
    pub cache_hit: bool,
    pub fingerprint: String,
    /// Collaborator failures tolerated while serving the request.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<String>,
}

/// Candidate selection for [`crate::DiscoveryEngine::evaluate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRef {
    pub name: String,
    /// Explicit parameter values; schema defaults when absent.
    #[serde(default)]
    pub parameters: Option<Vec<f64>>,
}

impl CandidateRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: None,
        }
    }
}

/// Per-request phase of the discovery pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DiscoveryPhase {
    #[default]
    Idle,
    Encoding,
    Selecting,
    Optimizing,
    Evaluating,
    Updating,
    Done,
    Failed(String),
}

impl DiscoveryPhase {
    /// Position in the forward pipeline; terminal phases sort last.
    pub fn ordinal(&self) -> usize {
        match self {
            DiscoveryPhase::Idle => 0,
            DiscoveryPhase::Encoding => 1,
            DiscoveryPhase::Selecting => 2,
            DiscoveryPhase::Optimizing => 3,
            DiscoveryPhase::Evaluating => 4,
            DiscoveryPhase::Updating => 5,
            DiscoveryPhase::Done | DiscoveryPhase::Failed(_) => 6,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, DiscoveryPhase::Done | DiscoveryPhase::Failed(_))
    }
}

/// Optimization history for plotting.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct OptimizationHistory {
    /// Best fitness seen so far, per generation (non-decreasing).
    pub best_so_far: Vec<f64>,
    /// Best fitness within each generation.
    pub generation_best: Vec<f64>,
    /// Average fitness per generation.
    pub avg_fitness: Vec<f64>,
    /// Standard deviation per generation.
    pub fitness_std: Vec<f64>,
    /// Mean normalized pairwise genome distance per generation.
    pub diversity: Vec<f64>,
}

/// Reason the optimizer stopped.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum StopReason {
    /// Reached maximum generations.
    MaxGenerations,
    /// No improvement for the configured number of generations.
    Stagnation,
    /// Caller cancelled.
    Cancelled,
    /// Candidate has nothing to tune; evaluated once.
    NoParameters,
}

/// Progress update emitted once per generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationProgress {
    pub generation: usize,
    pub total_generations: usize,
    pub best_fitness: f64,
    pub generation_best: f64,
    pub avg_fitness: f64,
    pub stagnation_count: usize,
}

/// Result of a parameter search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub algorithm: String,
    pub best_genome: Genome,
    pub parameters: BTreeMap<String, f64>,
    pub evaluation: EvaluationResult,
    pub history: OptimizationHistory,
    pub generations: usize,
    pub total_evaluations: u64,
    pub elapsed_seconds: f64,
    pub stop_reason: StopReason,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_ordering() {
        assert!(DiscoveryPhase::Idle.ordinal() < DiscoveryPhase::Encoding.ordinal());
        assert!(DiscoveryPhase::Evaluating.ordinal() < DiscoveryPhase::Updating.ordinal());
        assert!(DiscoveryPhase::Failed("x".into()).is_terminal());
        assert!(!DiscoveryPhase::Optimizing.is_terminal());
    }

    #[test]
    fn test_record_serialization() {
        let record = DiscoveryRecord {
            algorithm: "mergesort".into(),
            problem_type: ProblemType::Sorting,
            input_size: 1000,
            fitness_score: 0.9,
            time_complexity: "O(n log n)".into(),
            space_complexity: "O(n)".into(),
            estimated_time: 0.001,
            implementation: Implementation {
                candidate: "mergesort".into(),
                parameters: BTreeMap::from([("insertion_cutoff".to_string(), 16.0)]),
            },
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: DiscoveryRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, record);
    }
}
