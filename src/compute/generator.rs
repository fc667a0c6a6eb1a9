//! Seeded synthetic workloads.
//!
//! Generated cases carry no expected output; the evaluator checks them
//! structurally. Sizes are capped by [`GeneratorConfig`] so a single case
//! stays within a sane budget no matter what `input_size` was requested.

use rand::prelude::*;

use crate::schema::{Edge, GeneratorConfig, ProblemInput, ProblemType, TestCase};

/// Random test-case source for every problem type.
pub struct TestCaseGenerator {
    config: GeneratorConfig,
    rng: StdRng,
}

impl TestCaseGenerator {
    /// Create from seed.
    pub fn new(config: GeneratorConfig, seed: u64) -> Self {
        Self {
            config,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Size actually generated for a requested `input_size`.
    pub fn effective_size(&self, problem_type: ProblemType, input_size: u64) -> usize {
        let cap = match problem_type {
            ProblemType::Dp => self.config.max_pair_length,
            _ => self.config.max_generated_size,
        };
        usize::try_from(input_size).unwrap_or(usize::MAX).clamp(1, cap.max(1))
    }

    /// `count` independent cases of (capped) size `input_size`.
    pub fn generate(
        &mut self,
        problem_type: ProblemType,
        input_size: u64,
        count: usize,
    ) -> Vec<TestCase> {
        let size = self.effective_size(problem_type, input_size);
        (0..count)
            .map(|_| TestCase::unlabeled(self.input(problem_type, size)))
            .collect()
    }

    fn input(&mut self, problem_type: ProblemType, size: usize) -> ProblemInput {
        match problem_type {
            ProblemType::Sorting | ProblemType::Optimization => {
                ProblemInput::Sequence(self.values(size))
            }
            ProblemType::Searching => {
                let mut values = self.values(size);
                values.sort_unstable();
                // Half the lookups hit an existing element.
                let target = if self.rng.gen_bool(0.5) {
                    values[self.rng.gen_range(0..values.len())]
                } else {
                    self.value()
                };
                ProblemInput::Search { values, target }
            }
            ProblemType::Graph => self.graph(size),
            ProblemType::Dp => {
                // Narrow alphabet so common subsequences are non-trivial.
                let alphabet = 8i64;
                let seq = |rng: &mut StdRng| -> Vec<i64> {
                    (0..size).map(|_| rng.gen_range(0..alphabet)).collect()
                };
                let left = seq(&mut self.rng);
                let right = seq(&mut self.rng);
                ProblemInput::Pair { left, right }
            }
        }
    }

    fn value(&mut self) -> i64 {
        let range = self.config.value_range.max(1);
        self.rng.gen_range(-range..=range)
    }

    fn values(&mut self, size: usize) -> Vec<i64> {
        (0..size).map(|_| self.value()).collect()
    }

    fn graph(&mut self, nodes: usize) -> ProblemInput {
        let edge_count = nodes * self.config.edges_per_node;
        let max_weight = self.config.max_edge_weight.max(1);
        let mut edges = Vec::with_capacity(edge_count + nodes);

        // A spanning path keeps most nodes reachable from the source.
        for i in 1..nodes {
            edges.push(Edge {
                from: i - 1,
                to: i,
                weight: self.rng.gen_range(1..=max_weight),
            });
        }
        for _ in 0..edge_count {
            edges.push(Edge {
                from: self.rng.gen_range(0..nodes),
                to: self.rng.gen_range(0..nodes),
                weight: self.rng.gen_range(1..=max_weight),
            });
        }
        ProblemInput::Graph {
            nodes,
            edges,
            source: 0,
        }
    }
}
