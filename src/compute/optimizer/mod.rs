//! Evolutionary parameter tuning.
//!
//! - `genome`: random genomes, crossover, mutation, distance
//! - `search`: the generational loop with elitism and stagnation stop

mod genome;
mod search;

pub use genome::{GenomeRng, genome_distance};
pub use search::{GeneticOptimizer, Individual};

use crate::compute::evaluator::Evaluator;
use crate::compute::registry::Candidate;
use crate::schema::{EvaluationResult, Genome, TestCase};

/// Scores a genome. Called concurrently from the rayon pool.
pub trait Fitness: Sync {
    fn evaluate(&self, genome: &Genome) -> EvaluationResult;
}

impl<T> Fitness for T
where
    T: Fn(&Genome) -> EvaluationResult + Sync,
{
    fn evaluate(&self, genome: &Genome) -> EvaluationResult {
        self(genome)
    }
}

/// Fitness of a registered candidate over a fixed set of test cases.
pub struct CandidateFitness<'a> {
    pub evaluator: &'a Evaluator,
    pub candidate: &'a Candidate,
    pub test_cases: &'a [TestCase],
    pub time_limit: f64,
}

impl Fitness for CandidateFitness<'_> {
    fn evaluate(&self, genome: &Genome) -> EvaluationResult {
        self.evaluator
            .evaluate(self.candidate, genome, self.test_cases, self.time_limit)
    }
}
