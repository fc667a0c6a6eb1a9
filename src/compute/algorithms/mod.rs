//! Statically compiled candidate implementations.
//!
//! Every candidate is a variant of [`Algorithm`]; [`Algorithm::run`] is the
//! single dispatch point, so no user-supplied code ever executes.

mod check;
mod dp;
mod graph;
mod optimization;
mod searching;
mod sorting;

pub use check::{matches_expected, verify};

use serde::{Deserialize, Serialize};

use crate::schema::{ProblemInput, ProblemOutput};

/// Candidate implementation failure.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExecutionError {
    #[error("{algorithm} expects {expected} input, got {found}")]
    InputMismatch {
        algorithm: Algorithm,
        expected: &'static str,
        found: &'static str,
    },
    #[error("Malformed input: {0}")]
    Malformed(String),
    #[error("Implementation panicked: {0}")]
    Panicked(String),
}

/// Tag of every registered implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    QuickSort,
    MergeSort,
    HeapSort,
    InsertionSort,
    BubbleSort,
    ShellSort,
    BinarySearch,
    LinearSearch,
    HashSearch,
    InterpolationSearch,
    Kadane,
    DivideAndConquer,
    BruteForce,
    Dijkstra,
    BellmanFord,
    Spfa,
    LcsTable,
    LcsRolling,
    LcsTiled,
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Integral parameter at `index`, falling back to `default`.
fn int_param(params: &[f64], index: usize, default: usize) -> usize {
    params
        .get(index)
        .filter(|v| v.is_finite() && **v >= 0.0)
        .map(|v| v.round() as usize)
        .unwrap_or(default)
}

fn real_param(params: &[f64], index: usize, default: f64) -> f64 {
    params
        .get(index)
        .copied()
        .filter(|v| v.is_finite())
        .unwrap_or(default)
}

impl Algorithm {
    /// Input shape this implementation accepts.
    pub fn input_shape(self) -> &'static str {
        use Algorithm::*;
        match self {
            QuickSort | MergeSort | HeapSort | InsertionSort | BubbleSort | ShellSort => {
                "sequence"
            }
            BinarySearch | LinearSearch | HashSearch | InterpolationSearch => "search",
            Kadane | DivideAndConquer | BruteForce => "sequence",
            Dijkstra | BellmanFord | Spfa => "graph",
            LcsTable | LcsRolling | LcsTiled => "pair",
        }
    }

    fn mismatch(self, input: &ProblemInput) -> ExecutionError {
        ExecutionError::InputMismatch {
            algorithm: self,
            expected: self.input_shape(),
            found: input.shape(),
        }
    }

    /// Execute on `input` with schema-ordered parameter values.
    pub fn run(self, input: &ProblemInput, params: &[f64]) -> Result<ProblemOutput, ExecutionError> {
        use Algorithm::*;

        match (self, input) {
            (QuickSort, ProblemInput::Sequence(v)) => Ok(ProblemOutput::Sequence(
                sorting::quicksort(v.clone(), int_param(params, 0, 16)),
            )),
            (MergeSort, ProblemInput::Sequence(v)) => Ok(ProblemOutput::Sequence(
                sorting::mergesort(v.clone(), int_param(params, 0, 16)),
            )),
            (HeapSort, ProblemInput::Sequence(v)) => {
                Ok(ProblemOutput::Sequence(sorting::heapsort(v.clone())))
            }
            (InsertionSort, ProblemInput::Sequence(v)) => {
                Ok(ProblemOutput::Sequence(sorting::insertion_sort(v.clone())))
            }
            (BubbleSort, ProblemInput::Sequence(v)) => {
                Ok(ProblemOutput::Sequence(sorting::bubble_sort(v.clone())))
            }
            (ShellSort, ProblemInput::Sequence(v)) => Ok(ProblemOutput::Sequence(
                sorting::shell_sort(v.clone(), real_param(params, 0, 2.25)),
            )),

            (BinarySearch, ProblemInput::Search { values, target }) => Ok(position(
                searching::binary_search(values, *target, int_param(params, 0, 8)),
            )),
            (LinearSearch, ProblemInput::Search { values, target }) => {
                Ok(position(searching::linear_search(values, *target)))
            }
            (HashSearch, ProblemInput::Search { values, target }) => {
                Ok(position(searching::hash_search(values, *target)))
            }
            (InterpolationSearch, ProblemInput::Search { values, target }) => {
                Ok(position(searching::interpolation_search(values, *target)))
            }

            (Kadane, ProblemInput::Sequence(v)) => {
                Ok(ProblemOutput::Scalar(optimization::kadane(v)))
            }
            (DivideAndConquer, ProblemInput::Sequence(v)) => Ok(ProblemOutput::Scalar(
                optimization::divide_and_conquer(v, int_param(params, 0, 16)),
            )),
            (BruteForce, ProblemInput::Sequence(v)) => {
                Ok(ProblemOutput::Scalar(optimization::brute_force(v)))
            }

            (
                Dijkstra | BellmanFord | Spfa,
                ProblemInput::Graph {
                    nodes,
                    edges,
                    source,
                },
            ) => {
                check_graph(*nodes, edges, *source)?;
                let dist = match self {
                    Dijkstra => graph::dijkstra(*nodes, edges, *source, int_param(params, 0, 4)),
                    BellmanFord => graph::bellman_ford(*nodes, edges, *source),
                    _ => graph::spfa(*nodes, edges, *source),
                };
                Ok(ProblemOutput::Distances(dist))
            }

            (LcsTable, ProblemInput::Pair { left, right }) => {
                Ok(length(dp::lcs_table(left, right)))
            }
            (LcsRolling, ProblemInput::Pair { left, right }) => {
                Ok(length(dp::lcs_rolling(left, right)))
            }
            (LcsTiled, ProblemInput::Pair { left, right }) => Ok(length(dp::lcs_tiled(
                left,
                right,
                int_param(params, 0, 32),
            ))),

            _ => Err(self.mismatch(input)),
        }
    }
}

fn position(found: Option<usize>) -> ProblemOutput {
    ProblemOutput::Scalar(found.map(|i| i as i64))
}

fn length(len: usize) -> ProblemOutput {
    ProblemOutput::Scalar(Some(len as i64))
}

fn check_graph(nodes: usize, edges: &[crate::schema::Edge], source: usize) -> Result<(), ExecutionError> {
    if source >= nodes {
        return Err(ExecutionError::Malformed(format!(
            "source {source} outside 0..{nodes}"
        )));
    }
    if let Some(e) = edges.iter().find(|e| e.from >= nodes || e.to >= nodes) {
        return Err(ExecutionError::Malformed(format!(
            "edge {}->{} outside 0..{nodes}",
            e.from, e.to
        )));
    }
    Ok(())
}
