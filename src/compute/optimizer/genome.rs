//! Genome manipulation utilities for the parameter search.
//!
//! Provides random generation, crossover, and mutation operations. Every
//! operation returns genomes inside the schema bounds.

use rand::prelude::*;

use crate::schema::{Genome, ParamKind, ParamSpec};

/// Random number generator wrapper for genome operations.
pub struct GenomeRng {
    rng: StdRng,
}

impl GenomeRng {
    /// Create from seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generate a uniform random genome within the schema.
    pub fn random_genome(&mut self, schema: &[ParamSpec]) -> Genome {
        Genome::new(
            schema
                .iter()
                .map(|spec| {
                    let (lo, hi) = spec.bounds;
                    match spec.kind {
                        ParamKind::Integer => {
                            self.rng.gen_range(lo.round() as i64..=hi.round() as i64) as f64
                        }
                        ParamKind::Real => self.uniform((lo, hi)),
                    }
                })
                .collect(),
        )
    }

    /// Uniform random in bounds.
    fn uniform(&mut self, bounds: (f64, f64)) -> f64 {
        if bounds.0 >= bounds.1 {
            return bounds.0;
        }
        self.rng.gen_range(bounds.0..=bounds.1)
    }

    /// Gaussian mutation: add noise scaled to the parameter range.
    pub fn gaussian_mutate(&mut self, value: f64, strength: f64, spec: &ParamSpec) -> f64 {
        let (lo, hi) = spec.bounds;
        let noise: f64 = self.rng.sample(rand_distr::StandardNormal);
        spec.repair(value + noise * strength * (hi - lo))
    }

    /// Perform crossover between two genomes.
    ///
    /// Real genes blend with a shared weight; integer genes take one parent's
    /// value.
    pub fn crossover(&mut self, parent1: &Genome, parent2: &Genome, schema: &[ParamSpec]) -> Genome {
        let t = self.rng.r#gen::<f64>();

        Genome::new(
            schema
                .iter()
                .enumerate()
                .map(|(i, spec)| {
                    let a = parent1.get_or(i, schema);
                    let b = parent2.get_or(i, schema);
                    match spec.kind {
                        ParamKind::Real => spec.repair(blend(a, b, t)),
                        ParamKind::Integer => {
                            if self.rng.gen_bool(0.5) {
                                a
                            } else {
                                b
                            }
                        }
                    }
                })
                .collect(),
        )
    }

    /// Mutate each gene with probability `rate`.
    pub fn mutate(&mut self, genome: &mut Genome, rate: f64, strength: f64, schema: &[ParamSpec]) {
        for (value, spec) in genome.values.iter_mut().zip(schema) {
            if self.chance(rate) {
                *value = self.gaussian_mutate(*value, strength, spec);
            }
        }
    }

    /// Bernoulli trial; out-of-range probabilities are clamped.
    pub fn chance(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform index in `0..len`.
    pub fn index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len.max(1))
    }
}

/// Linear interpolation between two values.
fn blend(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

/// Mean per-gene distance normalized by each parameter's range, in [0, 1].
pub fn genome_distance(g1: &Genome, g2: &Genome, schema: &[ParamSpec]) -> f64 {
    if schema.is_empty() {
        return 0.0;
    }
    let total: f64 = schema
        .iter()
        .enumerate()
        .map(|(i, spec)| {
            let range = spec.bounds.1 - spec.bounds.0;
            if range <= 0.0 {
                0.0
            } else {
                (g1.get_or(i, schema) - g2.get_or(i, schema)).abs() / range
            }
        })
        .sum();
    total / schema.len() as f64
}
