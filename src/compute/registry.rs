//! Static catalogue of candidate algorithms per problem class.

use std::collections::HashMap;

use serde::Serialize;

use crate::compute::algorithms::Algorithm;
use crate::error::DiscoveryError;
use crate::schema::{BigO, Genome, ParamSpec, ProblemType};

/// One registered algorithm variant.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    pub name: &'static str,
    pub problem_type: ProblemType,
    #[serde(skip)]
    pub algorithm: Algorithm,
    /// Ordered parameter schema; empty when nothing is tunable.
    pub params: Vec<ParamSpec>,
    pub time_complexity: BigO,
    pub space_complexity: BigO,
}

impl Candidate {
    fn new(
        name: &'static str,
        problem_type: ProblemType,
        algorithm: Algorithm,
        time_complexity: BigO,
        space_complexity: BigO,
    ) -> Self {
        Self {
            name,
            problem_type,
            algorithm,
            params: Vec::new(),
            time_complexity,
            space_complexity,
        }
    }

    fn with_param(mut self, spec: ParamSpec) -> Self {
        self.params.push(spec);
        self
    }

    pub fn is_tunable(&self) -> bool {
        !self.params.is_empty()
    }

    /// Genome holding every schema default.
    pub fn default_genome(&self) -> Genome {
        Genome::new(self.params.iter().map(|p| p.default).collect())
    }

    /// Check a caller-supplied parameter vector against the schema.
    pub fn validate_genome(&self, values: &[f64]) -> Result<Genome, DiscoveryError> {
        if values.len() != self.params.len() {
            return Err(DiscoveryError::InvalidInput(format!(
                "{} takes {} parameters, got {}",
                self.name,
                self.params.len(),
                values.len()
            )));
        }
        if let Some((spec, value)) = self
            .params
            .iter()
            .zip(values)
            .find(|(spec, v)| !spec.admits(**v))
        {
            return Err(DiscoveryError::InvalidInput(format!(
                "{}.{} = {value} outside {:?} ({:?})",
                self.name, spec.name, spec.bounds, spec.kind
            )));
        }
        Ok(Genome::new(values.to_vec()))
    }

    /// Working-set estimate for `n` input elements, in megabytes.
    pub fn estimated_memory_mb(&self, n: u64) -> f64 {
        self.space_complexity.estimated_megabytes(n as f64)
    }
}

/// Immutable candidate catalogue.
#[derive(Debug, Clone)]
pub struct Registry {
    candidates: Vec<Candidate>,
    by_name: HashMap<&'static str, usize>,
}

impl Registry {
    pub fn new(candidates: Vec<Candidate>) -> Self {
        let by_name = candidates
            .iter()
            .enumerate()
            .map(|(i, c)| (c.name, i))
            .collect();
        Self {
            candidates,
            by_name,
        }
    }

    /// The built-in catalogue.
    pub fn standard() -> Self {
        use Algorithm as A;
        use BigO::*;
        use ProblemType as P;

        let cutoff = || ParamSpec::integer("insertion_cutoff", 1, 64, 16);

        Self::new(vec![
            Candidate::new("quicksort", P::Sorting, A::QuickSort, Linearithmic, Logarithmic)
                .with_param(cutoff()),
            Candidate::new("mergesort", P::Sorting, A::MergeSort, Linearithmic, Linear)
                .with_param(cutoff()),
            Candidate::new("heapsort", P::Sorting, A::HeapSort, Linearithmic, Constant),
            Candidate::new("insertion_sort", P::Sorting, A::InsertionSort, Quadratic, Constant),
            Candidate::new("bubble_sort", P::Sorting, A::BubbleSort, Quadratic, Constant),
            Candidate::new("shell_sort", P::Sorting, A::ShellSort, Quadratic, Constant)
                .with_param(ParamSpec::real("gap_ratio", 1.5, 3.5, 2.25)),
            Candidate::new("binary_search", P::Searching, A::BinarySearch, Logarithmic, Constant)
                .with_param(ParamSpec::integer("linear_threshold", 1, 64, 8)),
            Candidate::new("linear_search", P::Searching, A::LinearSearch, Linear, Constant),
            Candidate::new("hash_search", P::Searching, A::HashSearch, Linear, Linear),
            Candidate::new(
                "interpolation_search",
                P::Searching,
                A::InterpolationSearch,
                Logarithmic,
                Constant,
            ),
            Candidate::new("kadane", P::Optimization, A::Kadane, Linear, Constant),
            Candidate::new(
                "divide_and_conquer",
                P::Optimization,
                A::DivideAndConquer,
                Linearithmic,
                Logarithmic,
            )
            .with_param(ParamSpec::integer("base_case", 1, 64, 16)),
            Candidate::new("brute_force", P::Optimization, A::BruteForce, Quadratic, Constant),
            Candidate::new("dijkstra", P::Graph, A::Dijkstra, Linearithmic, Linear)
                .with_param(ParamSpec::integer("heap_arity", 2, 8, 4)),
            Candidate::new("bellman_ford", P::Graph, A::BellmanFord, Quadratic, Linear),
            Candidate::new("spfa", P::Graph, A::Spfa, Quadratic, Linear),
            Candidate::new("lcs_table", P::Dp, A::LcsTable, Quadratic, Quadratic),
            Candidate::new("lcs_rolling", P::Dp, A::LcsRolling, Quadratic, Linear),
            Candidate::new("lcs_tiled", P::Dp, A::LcsTiled, Quadratic, Quadratic)
                .with_param(ParamSpec::integer("tile", 4, 128, 32)),
        ])
    }

    /// Candidates for `problem_type`, in registration order.
    pub fn candidates_for(&self, problem_type: ProblemType) -> Vec<&Candidate> {
        self.candidates
            .iter()
            .filter(|c| c.problem_type == problem_type)
            .collect()
    }

    pub fn get(&self, name: &str) -> Result<&Candidate, DiscoveryError> {
        self.by_name
            .get(name)
            .map(|&i| &self.candidates[i])
            .ok_or_else(|| DiscoveryError::UnknownCandidate(name.to_string()))
    }

    pub fn all(&self) -> &[Candidate] {
        &self.candidates
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::standard()
    }
}
