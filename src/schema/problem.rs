//! Problem specifications, discretized states and test-case payloads.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::DiscoveryError;

/// Largest accepted `input_size`.
pub const MAX_INPUT_SIZE: i64 = 1_000_000_000;

/// Largest accepted `time_limit` in seconds.
pub const MAX_TIME_LIMIT: f64 = 3600.0;

/// Problem classes the registry knows how to solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProblemType {
    Sorting,
    Searching,
    Optimization,
    Graph,
    Dp,
}

impl ProblemType {
    /// All problem types in a fixed order.
    pub const ALL: [ProblemType; 5] = [
        ProblemType::Sorting,
        ProblemType::Searching,
        ProblemType::Optimization,
        ProblemType::Graph,
        ProblemType::Dp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ProblemType::Sorting => "sorting",
            ProblemType::Searching => "searching",
            ProblemType::Optimization => "optimization",
            ProblemType::Graph => "graph",
            ProblemType::Dp => "dp",
        }
    }
}

impl fmt::Display for ProblemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProblemType {
    type Err = DiscoveryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sorting" => Ok(ProblemType::Sorting),
            "searching" => Ok(ProblemType::Searching),
            "optimization" => Ok(ProblemType::Optimization),
            "graph" => Ok(ProblemType::Graph),
            "dp" => Ok(ProblemType::Dp),
            other => Err(DiscoveryError::InvalidInput(format!(
                "unknown problem_type: {other}"
            ))),
        }
    }
}

/// Resource constraints attached to a problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Wall-clock budget per test case, in seconds.
    pub time_limit: f64,
    /// Optional memory budget, in megabytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory_limit: Option<u64>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            time_limit: 1.0,
            memory_limit: None,
        }
    }
}

/// A validated problem specification.
///
/// Only constructible through [`ProblemSpec::new`] (or deserialization, which
/// goes through the same checks), so every value in circulation is valid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawProblemSpec")]
pub struct ProblemSpec {
    problem_type: ProblemType,
    input_size: u64,
    constraints: Constraints,
}

#[derive(Deserialize)]
struct RawProblemSpec {
    problem_type: String,
    input_size: i64,
    #[serde(default)]
    constraints: Constraints,
}

impl TryFrom<RawProblemSpec> for ProblemSpec {
    type Error = DiscoveryError;

    fn try_from(raw: RawProblemSpec) -> Result<Self, Self::Error> {
        ProblemSpec::new(
            &raw.problem_type,
            raw.input_size,
            raw.constraints.time_limit,
            raw.constraints.memory_limit,
        )
    }
}

impl ProblemSpec {
    /// Validate and build a problem specification.
    pub fn new(
        problem_type: &str,
        input_size: i64,
        time_limit: f64,
        memory_limit: Option<u64>,
    ) -> Result<Self, DiscoveryError> {
        let problem_type = problem_type.parse::<ProblemType>()?;

        if input_size <= 0 || input_size > MAX_INPUT_SIZE {
            return Err(DiscoveryError::InvalidInput(format!(
                "input_size must be in 1..={MAX_INPUT_SIZE}, got {input_size}"
            )));
        }
        if !time_limit.is_finite() || time_limit <= 0.0 || time_limit > MAX_TIME_LIMIT {
            return Err(DiscoveryError::InvalidInput(format!(
                "time_limit must be in (0, {MAX_TIME_LIMIT}] seconds, got {time_limit}"
            )));
        }
        if memory_limit == Some(0) {
            return Err(DiscoveryError::InvalidInput(
                "memory_limit must be positive when given".to_string(),
            ));
        }

        Ok(Self {
            problem_type,
            input_size: input_size as u64,
            constraints: Constraints {
                time_limit,
                memory_limit,
            },
        })
    }

    pub fn problem_type(&self) -> ProblemType {
        self.problem_type
    }

    pub fn input_size(&self) -> u64 {
        self.input_size
    }

    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    pub fn time_limit(&self) -> f64 {
        self.constraints.time_limit
    }

    /// Stable fingerprint of the specification, used as the cache key.
    ///
    /// Hashes the canonical JSON of `(problem_type, input_size, constraints)`.
    pub fn fingerprint(&self) -> String {
        // Field order is fixed by the struct definition, so the JSON is canonical.
        let canonical = serde_json::to_vec(self).unwrap_or_default();
        blake3::hash(&canonical).to_hex().to_string()
    }
}

/// Input size class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeBucket {
    Tiny,
    Small,
    Medium,
    Large,
    Huge,
}

/// Time budget class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeBucket {
    Tight,
    Normal,
    Relaxed,
}

/// Discretized projection of a [`ProblemSpec`]; the Q-learning state key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct State {
    pub problem_type: ProblemType,
    pub size: SizeBucket,
    pub time: TimeBucket,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{:?}/{:?}", self.problem_type, self.size, self.time)
    }
}

/// Weighted directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub from: usize,
    pub to: usize,
    pub weight: u64,
}

/// Input handed to a candidate implementation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProblemInput {
    /// Integer sequence (sorting, max-subarray optimization).
    Sequence(Vec<i64>),
    /// Sorted values and the value to look up.
    Search { values: Vec<i64>, target: i64 },
    /// Single-source shortest paths over a weighted digraph.
    Graph {
        nodes: usize,
        edges: Vec<Edge>,
        source: usize,
    },
    /// Two sequences (longest common subsequence).
    Pair { left: Vec<i64>, right: Vec<i64> },
}

impl ProblemInput {
    /// Size of the input as seen by complexity estimates.
    pub fn len(&self) -> usize {
        match self {
            ProblemInput::Sequence(values) => values.len(),
            ProblemInput::Search { values, .. } => values.len(),
            ProblemInput::Graph { nodes, edges, .. } => nodes + edges.len(),
            ProblemInput::Pair { left, right } => left.len().max(right.len()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the payload shape, for error messages.
    pub fn shape(&self) -> &'static str {
        match self {
            ProblemInput::Sequence(_) => "sequence",
            ProblemInput::Search { .. } => "search",
            ProblemInput::Graph { .. } => "graph",
            ProblemInput::Pair { .. } => "pair",
        }
    }
}

/// Output produced by a candidate implementation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProblemOutput {
    Sequence(Vec<i64>),
    /// Shortest distances; `None` marks an unreachable node.
    Distances(Vec<Option<u64>>),
    /// Search position, max-subarray sum or LCS length.
    Scalar(Option<i64>),
}

impl ProblemOutput {
    /// Shape-independent view used for comparisons.
    ///
    /// An all-reachable distance vector and an integer sequence deserialize to
    /// the same JSON, so equality is decided on this view.
    pub fn canonical(&self) -> Vec<Option<i64>> {
        match self {
            ProblemOutput::Sequence(values) => values.iter().map(|&v| Some(v)).collect(),
            ProblemOutput::Distances(dist) => dist.iter().map(|d| d.map(|d| d as i64)).collect(),
            ProblemOutput::Scalar(value) => vec![*value],
        }
    }

    pub fn same_as(&self, other: &ProblemOutput) -> bool {
        self.canonical() == other.canonical()
    }
}

/// One test case; `expected` is absent for synthetic benchmarking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: Arc<ProblemInput>,
    #[serde(default)]
    pub expected: Option<ProblemOutput>,
}

impl TestCase {
    pub fn new(input: ProblemInput, expected: Option<ProblemOutput>) -> Self {
        Self {
            input: Arc::new(input),
            expected,
        }
    }

    /// Test case without ground truth, checked structurally.
    pub fn unlabeled(input: ProblemInput) -> Self {
        Self::new(input, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_problem_type() {
        assert_eq!("sorting".parse::<ProblemType>().unwrap(), ProblemType::Sorting);
        assert_eq!(" DP ".parse::<ProblemType>().unwrap(), ProblemType::Dp);
        assert!(matches!(
            "telepathy".parse::<ProblemType>(),
            Err(DiscoveryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_spec_validation() {
        assert!(ProblemSpec::new("sorting", 1000, 1.0, None).is_ok());
        assert!(matches!(
            ProblemSpec::new("sorting", -1, 1.0, None),
            Err(DiscoveryError::InvalidInput(_))
        ));
        assert!(ProblemSpec::new("sorting", 0, 1.0, None).is_err());
        assert!(ProblemSpec::new("sorting", 10, 0.0, None).is_err());
        assert!(ProblemSpec::new("sorting", 10, f64::NAN, None).is_err());
        assert!(ProblemSpec::new("sorting", 10, 1.0, Some(0)).is_err());
        assert!(ProblemSpec::new("sorting", MAX_INPUT_SIZE + 1, 1.0, None).is_err());
    }

    #[test]
    fn test_spec_deserialization_validates() {
        let ok: ProblemSpec = serde_json::from_str(
            r#"{"problem_type":"sorting","input_size":1000,"constraints":{"time_limit":1.0}}"#,
        )
        .unwrap();
        assert_eq!(ok.input_size(), 1000);

        let bad = serde_json::from_str::<ProblemSpec>(
            r#"{"problem_type":"sorting","input_size":-1,"constraints":{"time_limit":1.0}}"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_fingerprint_stable() {
        let a = ProblemSpec::new("graph", 500, 0.5, Some(64)).unwrap();
        let b = ProblemSpec::new("graph", 500, 0.5, Some(64)).unwrap();
        let c = ProblemSpec::new("graph", 501, 0.5, Some(64)).unwrap();
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);
    }

    #[test]
    fn test_test_case_deserialization() {
        let case: TestCase =
            serde_json::from_str(r#"{"input":[5,2,3],"expected":[2,3,5]}"#).unwrap();
        assert_eq!(*case.input, ProblemInput::Sequence(vec![5, 2, 3]));
        assert_eq!(case.expected, Some(ProblemOutput::Sequence(vec![2, 3, 5])));

        let search: TestCase =
            serde_json::from_str(r#"{"input":{"values":[1,2,3],"target":2},"expected":1}"#)
                .unwrap();
        assert_eq!(search.expected, Some(ProblemOutput::Scalar(Some(1))));

        let graph: TestCase = serde_json::from_str(
            r#"{"input":{"nodes":2,"edges":[{"from":0,"to":1,"weight":4}],"source":0},
                "expected":[0,null]}"#,
        )
        .unwrap();
        assert!(matches!(*graph.input, ProblemInput::Graph { nodes: 2, .. }));
        assert_eq!(
            graph.expected,
            Some(ProblemOutput::Distances(vec![Some(0), None]))
        );
    }

    #[test]
    fn test_output_canonical_equality() {
        let seq = ProblemOutput::Sequence(vec![0, 4]);
        let dist = ProblemOutput::Distances(vec![Some(0), Some(4)]);
        assert!(seq.same_as(&dist));
        assert!(!seq.same_as(&ProblemOutput::Distances(vec![Some(0), None])));
    }
}
