//! Genetic search over a candidate's parameter schema.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use rayon::prelude::*;

use crate::schema::{
    EvaluationResult, GeneticConfig, Genome, OptimizationHistory, OptimizationProgress,
    OptimizationReport, ParamSpec, StopReason,
};

use super::Fitness;
use super::genome::{GenomeRng, genome_distance};

/// One member of the population.
#[derive(Debug, Clone)]
pub struct Individual {
    pub genome: Genome,
    /// `None` until evaluated.
    pub evaluation: Option<EvaluationResult>,
    /// Generation created.
    pub generation: usize,
}

impl Individual {
    fn new(genome: Genome, generation: usize) -> Self {
        Self {
            genome,
            evaluation: None,
            generation,
        }
    }

    pub fn fitness(&self) -> f64 {
        self.evaluation
            .as_ref()
            .map(|e| e.fitness_score)
            .filter(|f| f.is_finite())
            .unwrap_or(0.0)
    }
}

/// Population search that tunes one candidate's parameters.
pub struct GeneticOptimizer<'a, F: Fitness> {
    config: GeneticConfig,
    algorithm: String,
    schema: &'a [ParamSpec],
    fitness: &'a F,
    rng: GenomeRng,
    population: Vec<Individual>,
    history: OptimizationHistory,
    generation: usize,
    best: Option<Individual>,
    stagnation_count: usize,
    evaluations: u64,
    cancelled: Arc<AtomicBool>,
}

impl<'a, F: Fitness> GeneticOptimizer<'a, F> {
    /// Create an optimizer for `algorithm` with the given schema.
    pub fn new(
        config: GeneticConfig,
        algorithm: impl Into<String>,
        schema: &'a [ParamSpec],
        fitness: &'a F,
        seed: u64,
    ) -> Self {
        Self {
            config,
            algorithm: algorithm.into(),
            schema,
            fitness,
            rng: GenomeRng::new(seed),
            population: Vec::new(),
            history: OptimizationHistory::default(),
            generation: 0,
            best: None,
            stagnation_count: 0,
            evaluations: 0,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Share an external cancellation flag.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancelled = flag;
        self
    }

    /// Get cancellation handle.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }

    /// Initialize the population with uniform random genomes.
    fn initialize(&mut self) {
        self.population = (0..self.config.population_size)
            .map(|_| Individual::new(self.rng.random_genome(self.schema), 0))
            .collect();
        self.generation = 0;
    }

    /// Evaluate every individual that has no result yet.
    fn evaluate_population(&mut self) {
        let fitness = self.fitness;
        let pending = self
            .population
            .iter()
            .filter(|i| i.evaluation.is_none())
            .count();

        self.population
            .par_iter_mut()
            .filter(|i| i.evaluation.is_none())
            .for_each(|individual| {
                individual.evaluation = Some(fitness.evaluate(&individual.genome));
            });

        self.evaluations += pending as u64;
    }

    /// Fold the current population into history and the best-so-far record.
    fn record_generation(&mut self) {
        let n = self.population.len().max(1) as f64;
        let fitnesses: Vec<f64> = self.population.iter().map(Individual::fitness).collect();
        let avg = fitnesses.iter().sum::<f64>() / n;
        let variance = fitnesses.iter().map(|f| (f - avg).powi(2)).sum::<f64>() / n;

        let generation_best = self
            .population
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()));

        if let Some(gen_best) = generation_best {
            let improved = self
                .best
                .as_ref()
                .is_none_or(|best| gen_best.fitness() > best.fitness());
            if improved {
                self.best = Some(gen_best.clone());
                self.stagnation_count = 0;
            } else if self.generation > 0 {
                self.stagnation_count += 1;
            }
        }

        let best_so_far = self.best.as_ref().map_or(0.0, Individual::fitness);
        self.history.best_so_far.push(best_so_far);
        self.history
            .generation_best
            .push(fitnesses.iter().copied().fold(0.0, f64::max));
        self.history.avg_fitness.push(avg);
        self.history.fitness_std.push(variance.sqrt());
        self.history.diversity.push(self.compute_diversity());

        log::debug!(
            "{} generation {}: best {:.4}, avg {:.4}, stagnation {}",
            self.algorithm,
            self.generation,
            best_so_far,
            avg,
            self.stagnation_count
        );
    }

    /// Tournament selection over the current population.
    fn select_index(&mut self) -> usize {
        let len = self.population.len();
        let mut best_idx = self.rng.index(len);
        for _ in 1..self.config.tournament_size {
            let idx = self.rng.index(len);
            if self.population[idx].fitness() > self.population[best_idx].fitness() {
                best_idx = idx;
            }
        }
        best_idx
    }

    /// Build and install the next generation.
    fn step_generation(&mut self) {
        let size = self.config.population_size;
        let next_generation = self.generation + 1;
        let mut next = Vec::with_capacity(size);

        // Elitism: the best individual survives with its evaluation.
        if let Some(elite) = self
            .population
            .iter()
            .max_by(|a, b| a.fitness().total_cmp(&b.fitness()))
        {
            next.push(elite.clone());
        }

        let pool: Vec<usize> = (0..size).map(|_| self.select_index()).collect();

        for pair in pool.chunks(2) {
            let first = &self.population[pair[0]].genome;
            let second = &self.population[pair[pair.len() - 1]].genome;

            let (mut child1, mut child2) = if self.rng.chance(self.config.crossover_rate) {
                (
                    self.rng.crossover(first, second, self.schema),
                    self.rng.crossover(second, first, self.schema),
                )
            } else {
                (first.clone(), second.clone())
            };

            for child in [&mut child1, &mut child2] {
                self.rng.mutate(
                    child,
                    self.config.mutation_rate,
                    self.config.mutation_strength,
                    self.schema,
                );
            }
            for child in [child1, child2] {
                if next.len() < size {
                    next.push(Individual::new(child, next_generation));
                }
            }
        }

        self.population = next;
        self.generation = next_generation;
    }

    /// Mean pairwise normalized genome distance.
    fn compute_diversity(&self) -> f64 {
        let n = self.population.len();
        if n < 2 {
            return 0.0;
        }
        let mut total = 0.0;
        for i in 0..n {
            for j in (i + 1)..n {
                total += genome_distance(
                    &self.population[i].genome,
                    &self.population[j].genome,
                    self.schema,
                );
            }
        }
        total / (n * (n - 1) / 2) as f64
    }

    fn progress(&self) -> OptimizationProgress {
        OptimizationProgress {
            generation: self.generation,
            total_generations: self.config.generations,
            best_fitness: self.best.as_ref().map_or(0.0, Individual::fitness),
            generation_best: self.history.generation_best.last().copied().unwrap_or(0.0),
            avg_fitness: self.history.avg_fitness.last().copied().unwrap_or(0.0),
            stagnation_count: self.stagnation_count,
        }
    }

    /// Check if the search should stop.
    fn should_stop(&self) -> Option<StopReason> {
        if self.cancelled.load(Ordering::Relaxed) {
            return Some(StopReason::Cancelled);
        }

        if self.generation >= self.config.generations {
            return Some(StopReason::MaxGenerations);
        }

        if let Some(limit) = self.config.stagnation_limit
            && self.stagnation_count >= limit
        {
            return Some(StopReason::Stagnation);
        }

        None
    }

    /// Run the search with a per-generation progress callback.
    pub fn run_with_callback<C>(&mut self, callback: C) -> OptimizationReport
    where
        C: Fn(&OptimizationProgress),
    {
        let start_time = Instant::now();

        let stop_reason = if self.schema.is_empty() {
            // Nothing to tune: score the (empty) default once.
            self.population = vec![Individual::new(Genome::default(), 0)];
            self.evaluate_population();
            self.record_generation();
            callback(&self.progress());
            StopReason::NoParameters
        } else {
            self.initialize();
            self.evaluate_population();
            self.record_generation();
            callback(&self.progress());

            loop {
                if let Some(reason) = self.should_stop() {
                    break reason;
                }
                self.step_generation();
                self.evaluate_population();
                self.record_generation();
                callback(&self.progress());
            }
        };

        let best = self
            .best
            .clone()
            .unwrap_or_else(|| Individual::new(Genome::default(), 0));
        let evaluation = best
            .evaluation
            .clone()
            .unwrap_or_else(|| EvaluationResult::empty(""));

        log::info!(
            "{}: {:?} after {} generations, best fitness {:.4}",
            self.algorithm,
            stop_reason,
            self.generation,
            evaluation.fitness_score
        );

        OptimizationReport {
            algorithm: self.algorithm.clone(),
            parameters: best.genome.named(self.schema),
            best_genome: best.genome,
            evaluation,
            history: self.history.clone(),
            generations: self.generation,
            total_evaluations: self.evaluations,
            elapsed_seconds: start_time.elapsed().as_secs_f64(),
            stop_reason,
        }
    }

    /// Run the search (blocking).
    pub fn run(&mut self) -> OptimizationReport {
        self.run_with_callback(|_| {})
    }
}
