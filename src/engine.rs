//! Discovery orchestrator.
//!
//! Composes the encoder, registry, agent, optimizer and evaluator into the
//! public operations, and talks to the cache and history collaborators.
//! Collaborator failures during `discover` are logged and reported in
//! [`DiscoveryOutcome::degraded`]; they never fail the request.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use chrono::Utc;

use crate::compute::{
    self, BenchmarkReport, BenchmarkSuite, Candidate, CandidateFitness, Encoder, Evaluator,
    GeneticOptimizer, Recommendation, Registry, SelectionAgent, TestCaseGenerator,
};
use crate::error::DiscoveryError;
use crate::schema::{
    CandidateRef, DiscoveryOutcome, DiscoveryPhase, DiscoveryRecord, EngineConfig,
    EvaluationResult, Genome, Implementation, OptimizationReport, ProblemSpec, ProblemType,
    StopReason, TestCase,
};
use crate::store::{
    HistoryStore, JsonFileHistory, MemoryCache, MemoryHistory, PerformanceStats, ResultCache,
    StoreError,
};

/// Forward-only phase tracker that reports every transition.
struct Phases<C: Fn(&DiscoveryPhase)> {
    current: DiscoveryPhase,
    callback: C,
}

impl<C: Fn(&DiscoveryPhase)> Phases<C> {
    fn new(callback: C) -> Self {
        Self {
            current: DiscoveryPhase::Idle,
            callback,
        }
    }

    fn enter(&mut self, phase: DiscoveryPhase) {
        debug_assert!(
            phase.ordinal() > self.current.ordinal(),
            "{:?} -> {phase:?}",
            self.current
        );
        (self.callback)(&phase);
        self.current = phase;
    }
}

/// The algorithm discovery engine. `Send + Sync`; share it behind an `Arc`.
pub struct DiscoveryEngine {
    config: EngineConfig,
    registry: Registry,
    encoder: Encoder,
    evaluator: Evaluator,
    agent: SelectionAgent,
    cache: Option<Arc<dyn ResultCache>>,
    history: Arc<dyn HistoryStore>,
    seed: u64,
    requests: AtomicU64,
}

impl DiscoveryEngine {
    /// Build an engine from a validated configuration.
    ///
    /// Opens the configured history file and loads the configured Q-table
    /// snapshot if one exists.
    pub fn new(config: EngineConfig) -> Result<Self, DiscoveryError> {
        config.validate()?;
        let seed = config.random_seed.unwrap_or_else(rand::random);

        let history: Arc<dyn HistoryStore> = match &config.storage.history_path {
            Some(path) => Arc::new(JsonFileHistory::open(path).map_err(StoreError::from)?),
            None => Arc::new(MemoryHistory::default()),
        };
        let cache: Option<Arc<dyn ResultCache>> = config
            .cache
            .enabled
            .then(|| Arc::new(MemoryCache::new()) as Arc<dyn ResultCache>);

        let agent = SelectionAgent::new(config.agent.clone(), seed);
        if let Some(path) = &config.storage.q_table_path
            && path.exists()
        {
            match agent.load(path) {
                Ok(count) => log::info!("Loaded {count} Q-values from {}", path.display()),
                Err(e) => log::warn!("Ignoring Q-table {}: {e}", path.display()),
            }
        }

        Ok(Self {
            registry: Registry::standard(),
            encoder: Encoder::new(config.encoder.clone()),
            evaluator: Evaluator::new(config.evaluator.clone()),
            agent,
            cache,
            history,
            seed,
            requests: AtomicU64::new(0),
            config,
        })
    }

    /// Replace the result cache.
    pub fn with_cache(mut self, cache: Arc<dyn ResultCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Replace the history store.
    pub fn with_history(mut self, history: Arc<dyn HistoryStore>) -> Self {
        self.history = history;
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn agent(&self) -> &SelectionAgent {
        &self.agent
    }

    /// Independent, reproducible seed for the next request.
    fn request_seed(&self) -> u64 {
        let n = self.requests.fetch_add(1, Ordering::Relaxed);
        self.seed
            .wrapping_add(n.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15))
    }

    fn generator(&self) -> TestCaseGenerator {
        TestCaseGenerator::new(self.config.generator.clone(), self.request_seed())
    }

    /// Recommend and tune an algorithm for `spec`.
    pub fn discover(&self, spec: &ProblemSpec) -> Result<DiscoveryOutcome, DiscoveryError> {
        self.discover_with_callback(spec, &Arc::new(AtomicBool::new(false)), |_| {})
    }

    /// Parse a JSON problem specification and discover it.
    pub fn discover_json(&self, request: &str) -> Result<DiscoveryOutcome, DiscoveryError> {
        let spec: ProblemSpec = serde_json::from_str(request)
            .map_err(|e| DiscoveryError::InvalidInput(e.to_string()))?;
        self.discover(&spec)
    }

    /// [`DiscoveryEngine::discover`] with a cancellation flag, checked at every
    /// phase boundary and between optimizer generations, and a callback that
    /// sees every phase transition.
    pub fn discover_with_callback<C>(
        &self,
        spec: &ProblemSpec,
        cancel: &Arc<AtomicBool>,
        callback: C,
    ) -> Result<DiscoveryOutcome, DiscoveryError>
    where
        C: Fn(&DiscoveryPhase),
    {
        let mut phases = Phases::new(callback);
        match self.run_discovery(spec, cancel, &mut phases) {
            Ok(outcome) => {
                phases.enter(DiscoveryPhase::Done);
                Ok(outcome)
            }
            Err(e) => {
                log::warn!("discover {} failed: {e}", spec.problem_type());
                phases.enter(DiscoveryPhase::Failed(e.to_string()));
                Err(e)
            }
        }
    }

    fn run_discovery<C: Fn(&DiscoveryPhase)>(
        &self,
        spec: &ProblemSpec,
        cancel: &Arc<AtomicBool>,
        phases: &mut Phases<C>,
    ) -> Result<DiscoveryOutcome, DiscoveryError> {
        let check = || {
            if cancel.load(Ordering::Relaxed) {
                Err(DiscoveryError::Cancelled)
            } else {
                Ok(())
            }
        };
        let mut degraded = Vec::new();
        let fingerprint = spec.fingerprint();

        phases.enter(DiscoveryPhase::Encoding);
        check()?;
        if let Some(cache) = &self.cache {
            match cache.get(&fingerprint) {
                Ok(Some(record)) => {
                    log::info!("cache hit for {} ({})", spec.problem_type(), &fingerprint[..12]);
                    return Ok(DiscoveryOutcome {
                        record,
                        cache_hit: true,
                        fingerprint,
                        degraded,
                    });
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("cache lookup failed: {e}");
                    degraded.push(format!("cache get: {e}"));
                }
            }
        }
        let state = self.encoder.encode(spec);
        log::info!("discover {} size {} as {state}", spec.problem_type(), spec.input_size());

        phases.enter(DiscoveryPhase::Selecting);
        check()?;
        let eligible = self.eligible_candidates(spec);
        let names: Vec<&str> = eligible.iter().map(|c| c.name).collect();
        let action = self.agent.select(state, &names)?;
        let candidate = self.registry.get(action)?;

        phases.enter(DiscoveryPhase::Optimizing);
        check()?;
        let time_limit = spec.time_limit();
        let cases = self.generator().generate(
            spec.problem_type(),
            spec.input_size(),
            self.config.generator.test_case_count,
        );
        let genome = if candidate.is_tunable() {
            let report = self.tune(candidate, &cases, time_limit, self.config.genetic.generations, cancel);
            if report.stop_reason == StopReason::Cancelled {
                return Err(DiscoveryError::Cancelled);
            }
            report.best_genome
        } else {
            candidate.default_genome()
        };

        phases.enter(DiscoveryPhase::Evaluating);
        check()?;
        let evaluation = self.evaluator.evaluate(candidate, &genome, &cases, time_limit);

        phases.enter(DiscoveryPhase::Updating);
        check()?;
        self.agent
            .update(state, candidate.name, evaluation.fitness_score, state, &names);

        let record = DiscoveryRecord {
            algorithm: candidate.name.to_string(),
            problem_type: spec.problem_type(),
            input_size: spec.input_size(),
            fitness_score: evaluation.fitness_score,
            time_complexity: candidate.time_complexity.to_string(),
            space_complexity: candidate.space_complexity.to_string(),
            estimated_time: evaluation.elapsed_time,
            implementation: Implementation {
                candidate: candidate.name.to_string(),
                parameters: genome.named(&candidate.params),
            },
            created_at: Utc::now(),
        };

        if let Some(cache) = &self.cache
            && let Err(e) = cache.set(
                &fingerprint,
                &record,
                Duration::from_secs(self.config.cache.ttl_secs),
            )
        {
            log::warn!("cache write failed: {e}");
            degraded.push(format!("cache set: {e}"));
        }
        if let Err(e) = self.history.append(&record) {
            log::warn!("history append failed: {e}");
            degraded.push(format!("history append: {e}"));
        }
        if let Some(path) = &self.config.storage.q_table_path
            && let Err(e) = self.agent.save(path)
        {
            log::warn!("Q-table save failed: {e}");
            degraded.push(format!("q-table save: {e}"));
        }

        log::info!(
            "discovered {} for {} (fitness {:.4}, {:.6}s)",
            record.algorithm,
            record.problem_type,
            record.fitness_score,
            record.estimated_time
        );
        Ok(DiscoveryOutcome {
            record,
            cache_hit: false,
            fingerprint,
            degraded,
        })
    }

    /// Candidates for the spec's problem type whose estimated footprint fits
    /// `memory_limit`; all of them when none fit or no limit is set.
    pub(crate) fn eligible_candidates(&self, spec: &ProblemSpec) -> Vec<&Candidate> {
        let all = self.registry.candidates_for(spec.problem_type());
        let Some(limit) = spec.constraints().memory_limit else {
            return all;
        };
        let fitting: Vec<&Candidate> = all
            .iter()
            .copied()
            .filter(|c| c.estimated_memory_mb(spec.input_size()) <= limit as f64)
            .collect();
        if fitting.is_empty() {
            log::warn!("no candidate fits {limit} MB; considering all");
            all
        } else {
            fitting
        }
    }

    fn tune(
        &self,
        candidate: &Candidate,
        cases: &[TestCase],
        time_limit: f64,
        generations: usize,
        cancel: &Arc<AtomicBool>,
    ) -> OptimizationReport {
        let fitness = CandidateFitness {
            evaluator: &self.evaluator,
            candidate,
            test_cases: cases,
            time_limit,
        };
        let config = crate::schema::GeneticConfig {
            generations,
            ..self.config.genetic.clone()
        };
        GeneticOptimizer::new(
            config,
            candidate.name,
            &candidate.params,
            &fitness,
            self.request_seed(),
        )
        .with_cancel_flag(Arc::clone(cancel))
        .run()
    }

    /// Tune `algorithm` on `test_case_count` generated cases for up to
    /// `generations` generations.
    pub fn optimize(
        &self,
        algorithm: &str,
        test_case_count: usize,
        generations: usize,
    ) -> Result<OptimizationReport, DiscoveryError> {
        let candidate = self.registry.get(algorithm)?;
        if test_case_count == 0 {
            return Err(DiscoveryError::InvalidInput(
                "test_case_count must be positive".into(),
            ));
        }
        let cases = self.generator().generate(
            candidate.problem_type,
            self.config.generator.optimize_input_size as u64,
            test_case_count,
        );
        let report = self.tune(
            candidate,
            &cases,
            self.config.evaluator.default_time_limit,
            generations,
            &Arc::new(AtomicBool::new(false)),
        );
        Ok(report)
    }

    /// Score one candidate, with explicit parameters or schema defaults.
    pub fn evaluate(
        &self,
        candidate: &CandidateRef,
        test_cases: &[TestCase],
    ) -> Result<EvaluationResult, DiscoveryError> {
        let registered = self.registry.get(&candidate.name)?;
        let genome: Genome = match &candidate.parameters {
            Some(values) => registered.validate_genome(values)?,
            None => registered.default_genome(),
        };
        if test_cases.is_empty() {
            return Err(DiscoveryError::InvalidInput("no test cases".into()));
        }
        Ok(self.evaluator.evaluate(
            registered,
            &genome,
            test_cases,
            self.config.evaluator.default_time_limit,
        ))
    }

    /// Most recent discoveries, newest first.
    pub fn history(&self, limit: usize) -> Result<Vec<DiscoveryRecord>, DiscoveryError> {
        Ok(self.history.query(limit)?)
    }

    /// Rank every candidate for `spec` from declared complexity and learned
    /// values, without running anything or touching the agent.
    pub fn recommend(&self, spec: &ProblemSpec) -> Vec<Recommendation> {
        let state = self.encoder.encode(spec);
        compute::recommend(&self.registry, &self.agent, spec, state)
    }

    /// Performance summary over the whole history, optionally restricted to
    /// one algorithm.
    pub fn stats(&self, algorithm: Option<&str>) -> Result<PerformanceStats, DiscoveryError> {
        let mut records = self.history.query(usize::MAX)?;
        if let Some(name) = algorithm {
            records.retain(|r| r.algorithm == name);
        }
        Ok(PerformanceStats::from_records(&records))
    }

    /// Benchmark every candidate of `problem_type` over `sizes`.
    pub fn benchmark(
        &self,
        problem_type: ProblemType,
        sizes: &[u64],
        iterations: usize,
    ) -> Result<BenchmarkReport, DiscoveryError> {
        if sizes.is_empty() || sizes.contains(&0) {
            return Err(DiscoveryError::InvalidInput(
                "benchmark sizes must be non-empty and positive".into(),
            ));
        }
        if iterations == 0 {
            return Err(DiscoveryError::InvalidInput(
                "iterations must be positive".into(),
            ));
        }
        let suite = BenchmarkSuite::new(
            &self.registry,
            &self.evaluator,
            self.config.evaluator.default_time_limit,
        );
        Ok(suite.run(problem_type, sizes, iterations, &mut self.generator()))
    }

    /// Write the history to `path` as a JSON array.
    pub fn export_history(&self, path: &Path) -> Result<usize, DiscoveryError> {
        Ok(self.history.export(path)?)
    }

    /// Append the records of an exported JSON array to the history.
    pub fn import_history(&self, path: &Path) -> Result<usize, DiscoveryError> {
        Ok(self.history.import(path)?)
    }

    pub fn save_learning(&self, path: &Path) -> Result<(), DiscoveryError> {
        Ok(self.agent.save(path)?)
    }

    pub fn load_learning(&self, path: &Path) -> Result<usize, DiscoveryError> {
        Ok(self.agent.load(path)?)
    }

    /// Operator command: forget the learned selection policy.
    pub fn reset_learning(&self) {
        self.agent.reset_learning();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{GeneticConfig, ProblemInput, ProblemOutput};
    use std::sync::Mutex;

    fn config() -> EngineConfig {
        let mut config = EngineConfig {
            random_seed: Some(42),
            genetic: GeneticConfig {
                population_size: 4,
                generations: 2,
                ..Default::default()
            },
            ..Default::default()
        };
        config.generator.test_case_count = 2;
        config
    }

    fn engine() -> DiscoveryEngine {
        DiscoveryEngine::new(config()).unwrap()
    }

    struct FailingStore;

    impl ResultCache for FailingStore {
        fn get(&self, _: &str) -> Result<Option<DiscoveryRecord>, StoreError> {
            Err(StoreError::Unavailable("cache down".into()))
        }

        fn set(&self, _: &str, _: &DiscoveryRecord, _: Duration) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("cache down".into()))
        }
    }

    impl HistoryStore for FailingStore {
        fn append(&self, _: &DiscoveryRecord) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("db down".into()))
        }

        fn query(&self, _: usize) -> Result<Vec<DiscoveryRecord>, StoreError> {
            Err(StoreError::Unavailable("db down".into()))
        }
    }

    #[test]
    fn test_discover_sorting() {
        let engine = engine();
        let spec = ProblemSpec::new("sorting", 1000, 1.0, None).unwrap();
        let outcome = engine.discover(&spec).unwrap();
        let record = &outcome.record;

        let sorting: Vec<_> = engine
            .registry()
            .candidates_for(ProblemType::Sorting)
            .iter()
            .map(|c| c.name)
            .collect();
        assert!(sorting.contains(&record.algorithm.as_str()));
        assert!((0.0..=1.0).contains(&record.fitness_score));
        assert!(record.time_complexity.starts_with("O("));
        assert!(record.estimated_time >= 0.0 && record.estimated_time <= 1.0);
        assert!(!outcome.cache_hit);
        assert!(outcome.degraded.is_empty());
        assert_eq!(engine.history(10).unwrap().len(), 1);
    }

    #[test]
    fn test_repeated_discover_hits_cache() {
        let engine = engine();
        let spec = ProblemSpec::new("graph", 300, 0.5, None).unwrap();
        let first = engine.discover(&spec).unwrap();
        let selections = engine.agent().snapshot().selections;

        let second = engine.discover(&spec).unwrap();
        assert!(second.cache_hit);
        assert_eq!(second.record, first.record);
        assert_eq!(second.fingerprint, first.fingerprint);
        assert_eq!(engine.agent().snapshot().selections, selections);
        assert_eq!(engine.history(10).unwrap().len(), 1);
    }

    #[test]
    fn test_invalid_request_does_no_work() {
        let engine = engine();
        let err = engine
            .discover_json(
                r#"{"problem_type":"sorting","input_size":-1,"constraints":{"time_limit":1.0}}"#,
            )
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::InvalidInput(_)));
        assert_eq!(engine.agent().snapshot().selections, 0);
        assert!(engine.agent().is_empty());
        assert!(engine.history(10).unwrap().is_empty());
    }

    #[test]
    fn test_degraded_mode() {
        let store = Arc::new(FailingStore);
        let engine = engine()
            .with_cache(store.clone())
            .with_history(store);
        let spec = ProblemSpec::new("searching", 500, 1.0, None).unwrap();

        let outcome = engine.discover(&spec).unwrap();
        assert_eq!(outcome.degraded.len(), 3);
        assert!(!engine.agent().is_empty());
        assert!(matches!(
            engine.history(5),
            Err(DiscoveryError::PersistenceUnavailable(_))
        ));
    }

    #[test]
    fn test_phases_move_forward() {
        let engine = engine();
        let spec = ProblemSpec::new("dp", 50, 1.0, None).unwrap();
        let seen = Mutex::new(Vec::new());
        engine
            .discover_with_callback(&spec, &Arc::new(AtomicBool::new(false)), |p| {
                seen.lock().unwrap().push(p.clone())
            })
            .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.first(), Some(&DiscoveryPhase::Encoding));
        assert_eq!(seen.last(), Some(&DiscoveryPhase::Done));
        assert!(seen.windows(2).all(|w| w[0].ordinal() < w[1].ordinal()));
    }

    #[test]
    fn test_cancelled_request() {
        let engine = engine();
        let spec = ProblemSpec::new("optimization", 100, 1.0, None).unwrap();
        let cancel = Arc::new(AtomicBool::new(true));
        let seen = Mutex::new(Vec::new());
        let err = engine
            .discover_with_callback(&spec, &cancel, |p| seen.lock().unwrap().push(p.clone()))
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::Cancelled));
        assert!(matches!(
            seen.into_inner().unwrap().last(),
            Some(DiscoveryPhase::Failed(_))
        ));
        assert!(engine.agent().is_empty());
    }

    #[test]
    fn test_memory_limit_filters_candidates() {
        let engine = engine();
        let spec = ProblemSpec::new("sorting", 1_000_000_000, 1.0, Some(1)).unwrap();
        let names: Vec<_> = engine
            .eligible_candidates(&spec)
            .iter()
            .map(|c| c.name)
            .collect();
        assert!(!names.contains(&"mergesort"));
        assert!(names.contains(&"heapsort"));

        // Nothing fits a graph this large: fall back to everything.
        let spec = ProblemSpec::new("graph", 1_000_000_000, 1.0, Some(1)).unwrap();
        assert_eq!(engine.eligible_candidates(&spec).len(), 3);
    }

    #[test]
    fn test_evaluate_scenarios() {
        let engine = engine();
        let cases = vec![TestCase::new(
            ProblemInput::Sequence(vec![5, 2, 3]),
            Some(ProblemOutput::Sequence(vec![2, 3, 5])),
        )];
        let result = engine
            .evaluate(&CandidateRef::named("quicksort"), &cases)
            .unwrap();
        assert_eq!(result.correctness, 1.0);
        assert!(result.fitness_score > 0.0);

        let explicit = CandidateRef {
            name: "shell_sort".into(),
            parameters: Some(vec![3.0]),
        };
        assert!(engine.evaluate(&explicit, &cases).unwrap().correct);

        assert!(matches!(
            engine.evaluate(&CandidateRef::named("bogosort"), &cases),
            Err(DiscoveryError::UnknownCandidate(_))
        ));
        let bad = CandidateRef {
            name: "quicksort".into(),
            parameters: Some(vec![500.0]),
        };
        assert!(matches!(
            engine.evaluate(&bad, &cases),
            Err(DiscoveryError::InvalidInput(_))
        ));
        assert!(matches!(
            engine.evaluate(&CandidateRef::named("quicksort"), &[]),
            Err(DiscoveryError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_optimize() {
        let engine = engine();
        let report = engine.optimize("quicksort", 2, 3).unwrap();
        assert_eq!(report.algorithm, "quicksort");
        assert!(report.parameters.contains_key("insertion_cutoff"));
        assert!(report.generations <= 3);
        assert!(report.history.best_so_far.windows(2).all(|w| w[1] >= w[0]));

        let fixed = engine.optimize("heapsort", 2, 3).unwrap();
        assert_eq!(fixed.stop_reason, StopReason::NoParameters);

        assert!(matches!(
            engine.optimize("nope", 2, 3),
            Err(DiscoveryError::UnknownCandidate(_))
        ));
        assert!(engine.optimize("quicksort", 0, 3).is_err());
    }

    #[test]
    fn test_history_export_import_and_learning_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut cfg = config();
        cfg.storage.history_path = Some(dir.path().join("history.jsonl"));
        cfg.storage.q_table_path = Some(dir.path().join("q.json"));
        let engine = DiscoveryEngine::new(cfg.clone()).unwrap();

        engine
            .discover(&ProblemSpec::new("searching", 100, 1.0, None).unwrap())
            .unwrap();
        let export = dir.path().join("export.json");
        assert_eq!(engine.export_history(&export).unwrap(), 1);
        assert_eq!(engine.import_history(&export).unwrap(), 1);
        assert_eq!(engine.history(10).unwrap().len(), 2);

        // A fresh engine picks up both the history file and the Q-table.
        let reopened = DiscoveryEngine::new(cfg).unwrap();
        assert_eq!(reopened.history(10).unwrap().len(), 2);
        assert_eq!(reopened.agent().snapshot(), engine.agent().snapshot());

        reopened.reset_learning();
        assert!(reopened.agent().is_empty());
        assert!(matches!(
            reopened.load_learning(&dir.path().join("missing.json")),
            Err(DiscoveryError::PersistenceUnavailable(_))
        ));
    }

    #[test]
    fn test_recommend_ranks_without_learning() {
        let engine = engine();
        let spec = ProblemSpec::new("graph", 500_000, 1.0, None).unwrap();
        let recs = engine.recommend(&spec);

        assert_eq!(recs.len(), 3);
        assert_eq!(recs[0].algorithm, "dijkstra");
        assert!(recs.iter().all(|r| (0.0..=100.0).contains(&r.score)));
        assert!(engine.agent().is_empty());
        assert_eq!(engine.agent().snapshot().selections, 0);
    }

    #[test]
    fn test_stats_from_history() {
        let engine = engine();
        assert_eq!(engine.stats(None).unwrap().overall.count, 0);

        for problem_type in ["sorting", "searching"] {
            let spec = ProblemSpec::new(problem_type, 100, 1.0, None).unwrap();
            engine.discover(&spec).unwrap();
        }
        let stats = engine.stats(None).unwrap();
        assert_eq!(stats.overall.count, 2);
        assert!((0.0..=1.0).contains(&stats.overall.avg_fitness));

        let first = engine.history(1).unwrap().remove(0).algorithm;
        let only = engine.stats(Some(first.as_str())).unwrap();
        assert!(only.overall.count >= 1);
        assert_eq!(only.by_algorithm.len(), 1);

        let failing = engine.with_history(Arc::new(FailingStore));
        assert!(matches!(
            failing.stats(None),
            Err(DiscoveryError::PersistenceUnavailable(_))
        ));
    }

    #[test]
    fn test_benchmark_validation() {
        let engine = engine();
        assert!(engine.benchmark(ProblemType::Sorting, &[], 1).is_err());
        assert!(engine.benchmark(ProblemType::Sorting, &[10], 0).is_err());
        let report = engine.benchmark(ProblemType::Dp, &[20], 1).unwrap();
        assert_eq!(report.summary.len(), 3);
    }

    #[test]
    fn test_concurrent_discovery() {
        let engine = engine();
        std::thread::scope(|scope| {
            for problem_type in ["sorting", "searching", "optimization", "dp"] {
                let engine = &engine;
                scope.spawn(move || {
                    let spec = ProblemSpec::new(problem_type, 200, 1.0, None).unwrap();
                    engine.discover(&spec).unwrap();
                });
            }
        });
        assert_eq!(engine.history(10).unwrap().len(), 4);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut cfg = config();
        cfg.agent.epsilon_floor = 0.0;
        assert!(matches!(
            DiscoveryEngine::new(cfg),
            Err(DiscoveryError::Config(_))
        ));
    }
}
