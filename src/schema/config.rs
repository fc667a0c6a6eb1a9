//! Engine configuration: tunable constants for every pipeline stage.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub genetic: GeneticConfig,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    #[serde(default)]
    pub generator: GeneratorConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    /// Random seed for reproducibility. Drives the agent, the optimizer and
    /// the test-case generator.
    #[serde(default)]
    pub random_seed: Option<u64>,
}

/// Bucketing thresholds for state discretization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncoderConfig {
    /// Upper bounds (inclusive) of the tiny, small, medium and large size
    /// buckets; anything above is huge.
    #[serde(default = "default_size_thresholds")]
    pub size_thresholds: [u64; 4],
    /// Time limits below the first value are tight, above the second relaxed.
    #[serde(default = "default_time_thresholds")]
    pub time_thresholds: [f64; 2],
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            size_thresholds: default_size_thresholds(),
            time_thresholds: default_time_thresholds(),
        }
    }
}

fn default_size_thresholds() -> [u64; 4] {
    [100, 1_000, 10_000, 100_000]
}
fn default_time_thresholds() -> [f64; 2] {
    [0.1, 1.0]
}

/// Q-learning hyperparameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Step size alpha (0.0-1.0].
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    /// Discount gamma [0.0-1.0).
    #[serde(default = "default_discount_factor")]
    pub discount_factor: f64,
    /// Exploration rate before any decay.
    #[serde(default = "default_initial_epsilon")]
    pub initial_epsilon: f64,
    /// Multiplicative decay applied per selection.
    #[serde(default = "default_epsilon_decay")]
    pub epsilon_decay: f64,
    /// Lower bound for epsilon; must stay positive.
    #[serde(default = "default_epsilon_floor")]
    pub epsilon_floor: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: default_learning_rate(),
            discount_factor: default_discount_factor(),
            initial_epsilon: default_initial_epsilon(),
            epsilon_decay: default_epsilon_decay(),
            epsilon_floor: default_epsilon_floor(),
        }
    }
}

fn default_learning_rate() -> f64 {
    0.1
}
fn default_discount_factor() -> f64 {
    0.95
}
fn default_initial_epsilon() -> f64 {
    0.3
}
fn default_epsilon_decay() -> f64 {
    0.995
}
fn default_epsilon_floor() -> f64 {
    0.01
}

/// Genetic optimizer settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneticConfig {
    /// Number of genomes per generation.
    #[serde(default = "default_population_size")]
    pub population_size: usize,
    /// Maximum number of generations.
    #[serde(default = "default_generations")]
    pub generations: usize,
    /// Individuals sampled per tournament.
    #[serde(default = "default_tournament_size")]
    pub tournament_size: usize,
    /// Crossover probability per pair (0.0-1.0).
    #[serde(default = "default_crossover_rate")]
    pub crossover_rate: f64,
    /// Mutation probability per gene (0.0-1.0).
    #[serde(default = "default_mutation_rate")]
    pub mutation_rate: f64,
    /// Mutation strength as a fraction of the parameter range.
    #[serde(default = "default_mutation_strength")]
    pub mutation_strength: f64,
    /// Stop if the best fitness does not improve for N generations.
    #[serde(default = "default_stagnation_limit")]
    pub stagnation_limit: Option<usize>,
}

impl Default for GeneticConfig {
    fn default() -> Self {
        Self {
            population_size: default_population_size(),
            generations: default_generations(),
            tournament_size: default_tournament_size(),
            crossover_rate: default_crossover_rate(),
            mutation_rate: default_mutation_rate(),
            mutation_strength: default_mutation_strength(),
            stagnation_limit: default_stagnation_limit(),
        }
    }
}

fn default_population_size() -> usize {
    16
}
fn default_generations() -> usize {
    10
}
fn default_tournament_size() -> usize {
    3
}
fn default_crossover_rate() -> f64 {
    0.8
}
fn default_mutation_rate() -> f64 {
    0.1
}
fn default_mutation_strength() -> f64 {
    0.1
}
fn default_stagnation_limit() -> Option<usize> {
    Some(5)
}

/// Weights of the three fitness factors. Must sum to 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FitnessWeights {
    #[serde(default = "default_correctness_weight")]
    pub correctness: f64,
    #[serde(default = "default_speed_weight")]
    pub speed: f64,
    #[serde(default = "default_space_weight")]
    pub space: f64,
}

impl Default for FitnessWeights {
    fn default() -> Self {
        Self {
            correctness: default_correctness_weight(),
            speed: default_speed_weight(),
            space: default_space_weight(),
        }
    }
}

fn default_correctness_weight() -> f64 {
    0.6
}
fn default_speed_weight() -> f64 {
    0.3
}
fn default_space_weight() -> f64 {
    0.1
}

/// Evaluator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluatorConfig {
    #[serde(default)]
    pub weights: FitnessWeights,
    /// Minimum correctness below which fitness is forced to zero.
    #[serde(default = "default_correctness_floor")]
    pub correctness_floor: f64,
    /// Per-case time limit for `optimize` and `evaluate` requests, in seconds.
    #[serde(default = "default_time_limit")]
    pub default_time_limit: f64,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            weights: FitnessWeights::default(),
            correctness_floor: default_correctness_floor(),
            default_time_limit: default_time_limit(),
        }
    }
}

fn default_correctness_floor() -> f64 {
    1.0
}
fn default_time_limit() -> f64 {
    1.0
}

/// Synthetic test-case generation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Test cases generated per discovery request.
    #[serde(default = "default_test_case_count")]
    pub test_case_count: usize,
    /// Cap on generated sequence length and graph node count.
    #[serde(default = "default_max_generated_size")]
    pub max_generated_size: usize,
    /// Cap on generated LCS sequence length (quadratic work).
    #[serde(default = "default_max_pair_length")]
    pub max_pair_length: usize,
    /// Input size used by `optimize` requests.
    #[serde(default = "default_optimize_input_size")]
    pub optimize_input_size: usize,
    /// Values are drawn from `-value_range..=value_range`.
    #[serde(default = "default_value_range")]
    pub value_range: i64,
    /// Average out-degree of generated graphs.
    #[serde(default = "default_edges_per_node")]
    pub edges_per_node: usize,
    /// Edge weights are drawn from `1..=max_edge_weight`.
    #[serde(default = "default_max_edge_weight")]
    pub max_edge_weight: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            test_case_count: default_test_case_count(),
            max_generated_size: default_max_generated_size(),
            max_pair_length: default_max_pair_length(),
            optimize_input_size: default_optimize_input_size(),
            value_range: default_value_range(),
            edges_per_node: default_edges_per_node(),
            max_edge_weight: default_max_edge_weight(),
        }
    }
}

fn default_test_case_count() -> usize {
    3
}
fn default_max_generated_size() -> usize {
    5_000
}
fn default_max_pair_length() -> usize {
    1_000
}
fn default_optimize_input_size() -> usize {
    1_000
}
fn default_value_range() -> i64 {
    1_000
}
fn default_edges_per_node() -> usize {
    3
}
fn default_max_edge_weight() -> u64 {
    100
}

/// Result cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,
    /// Time to live of cached records, in seconds.
    #[serde(default = "default_cache_ttl")]
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl_secs: default_cache_ttl(),
        }
    }
}

fn default_cache_enabled() -> bool {
    true
}
fn default_cache_ttl() -> u64 {
    3600
}

/// File locations for persistent state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON-lines discovery history; in-memory when absent.
    #[serde(default)]
    pub history_path: Option<PathBuf>,
    /// Q-table snapshot loaded at startup and saved on request.
    #[serde(default)]
    pub q_table_path: Option<PathBuf>,
}

// ============================================================================
// Validation
// ============================================================================

/// Configuration validation errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Size thresholds must be strictly increasing")]
    SizeThresholds,
    #[error("Time thresholds must be positive and increasing")]
    TimeThresholds,
    #[error("Invalid rate {name}: {value} (expected {range})")]
    InvalidRate {
        name: &'static str,
        value: f64,
        range: &'static str,
    },
    #[error("Epsilon floor must be positive so exploration never stops")]
    EpsilonFloor,
    #[error("Population size must be at least 2")]
    PopulationTooSmall,
    #[error("Tournament size must be at least 1")]
    TournamentTooSmall,
    #[error("Fitness weights must be non-negative and sum to 1 (got {0})")]
    Weights(f64),
    #[error("Test case count must be positive")]
    NoTestCases,
    #[error("Generator limits must be positive")]
    GeneratorLimits,
}

impl EngineConfig {
    /// Validate engine configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = &self.encoder.size_thresholds;
        if sizes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::SizeThresholds);
        }
        let [tight, relaxed] = self.encoder.time_thresholds;
        if !(tight > 0.0 && tight <= relaxed) {
            return Err(ConfigError::TimeThresholds);
        }

        let check_rate = |name: &'static str, value: f64, range: &'static str, ok: bool| {
            if ok {
                Ok(())
            } else {
                Err(ConfigError::InvalidRate { name, value, range })
            }
        };

        let agent = &self.agent;
        check_rate(
            "learning_rate",
            agent.learning_rate,
            "(0, 1]",
            agent.learning_rate > 0.0 && agent.learning_rate <= 1.0,
        )?;
        check_rate(
            "discount_factor",
            agent.discount_factor,
            "[0, 1)",
            (0.0..1.0).contains(&agent.discount_factor),
        )?;
        check_rate(
            "initial_epsilon",
            agent.initial_epsilon,
            "[0, 1]",
            (0.0..=1.0).contains(&agent.initial_epsilon),
        )?;
        check_rate(
            "epsilon_decay",
            agent.epsilon_decay,
            "(0, 1]",
            agent.epsilon_decay > 0.0 && agent.epsilon_decay <= 1.0,
        )?;
        if !(agent.epsilon_floor > 0.0 && agent.epsilon_floor <= 1.0) {
            return Err(ConfigError::EpsilonFloor);
        }

        let genetic = &self.genetic;
        if genetic.population_size < 2 {
            return Err(ConfigError::PopulationTooSmall);
        }
        if genetic.tournament_size == 0 {
            return Err(ConfigError::TournamentTooSmall);
        }
        for (name, value) in [
            ("crossover_rate", genetic.crossover_rate),
            ("mutation_rate", genetic.mutation_rate),
            ("mutation_strength", genetic.mutation_strength),
        ] {
            check_rate(name, value, "[0, 1]", (0.0..=1.0).contains(&value))?;
        }

        let w = &self.evaluator.weights;
        let sum = w.correctness + w.speed + w.space;
        if w.correctness < 0.0 || w.speed < 0.0 || w.space < 0.0 || (sum - 1.0).abs() > 1e-6 {
            return Err(ConfigError::Weights(sum));
        }
        check_rate(
            "correctness_floor",
            self.evaluator.correctness_floor,
            "[0, 1]",
            (0.0..=1.0).contains(&self.evaluator.correctness_floor),
        )?;
        check_rate(
            "default_time_limit",
            self.evaluator.default_time_limit,
            "(0, 3600]",
            self.evaluator.default_time_limit > 0.0 && self.evaluator.default_time_limit <= 3600.0,
        )?;

        let generator = &self.generator;
        if generator.test_case_count == 0 {
            return Err(ConfigError::NoTestCases);
        }
        if generator.max_generated_size == 0
            || generator.max_pair_length == 0
            || generator.optimize_input_size == 0
            || generator.value_range <= 0
            || generator.max_edge_weight == 0
        {
            return Err(ConfigError::GeneratorLimits);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_epsilon_floor_rejected() {
        let mut config = EngineConfig::default();
        config.agent.epsilon_floor = 0.0;
        assert!(matches!(config.validate(), Err(ConfigError::EpsilonFloor)));
    }

    #[test]
    fn test_weights_must_sum_to_one() {
        let mut config = EngineConfig::default();
        config.evaluator.weights.speed = 0.5;
        assert!(matches!(config.validate(), Err(ConfigError::Weights(_))));
    }

    #[test]
    fn test_thresholds_must_increase() {
        let mut config = EngineConfig::default();
        config.encoder.size_thresholds = [100, 100, 10_000, 100_000];
        assert!(matches!(config.validate(), Err(ConfigError::SizeThresholds)));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{"genetic":{"population_size":8},"random_seed":7}"#).unwrap();
        assert_eq!(config.genetic.population_size, 8);
        assert_eq!(config.genetic.tournament_size, 3);
        assert_eq!(config.agent.learning_rate, 0.1);
        assert_eq!(config.random_seed, Some(7));
        assert!(config.validate().is_ok());
    }
}
