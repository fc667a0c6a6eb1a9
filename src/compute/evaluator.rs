//! Candidate evaluation under a per-case wall-clock budget.
//!
//! Each test case runs on its own worker thread. The evaluator waits at most
//! `time_limit` for the answer; a worker that overruns is left to finish on
//! its own and the case is scored as timed out.

use std::sync::Arc;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::compute::algorithms::{self, ExecutionError};
use crate::compute::registry::Candidate;
use crate::schema::{
    BigO, EvaluationResult, EvaluatorConfig, Genome, ProblemInput, ProblemOutput, ProblemType,
    TestCase,
};

/// Outcome of one test case.
#[derive(Debug, Clone, PartialEq)]
pub enum CaseOutcome {
    Passed,
    Failed,
    TimedOut,
    Faulted(ExecutionError),
}

/// Scores candidates against test cases.
#[derive(Debug, Clone, Default)]
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EvaluatorConfig {
        &self.config
    }

    /// Evaluate a registered candidate with the parameter values in `genome`.
    pub fn evaluate(
        &self,
        candidate: &Candidate,
        genome: &Genome,
        test_cases: &[TestCase],
        time_limit: f64,
    ) -> EvaluationResult {
        let algorithm = candidate.algorithm;
        let params: Arc<[f64]> = (0..candidate.params.len())
            .map(|i| genome.get_or(i, &candidate.params))
            .collect();

        self.evaluate_with(
            candidate.problem_type,
            candidate.space_complexity,
            move |input| algorithm.run(input, &params),
            test_cases,
            time_limit,
        )
    }

    /// Evaluate an arbitrary implementation of `problem_type`.
    pub fn evaluate_with<F>(
        &self,
        problem_type: ProblemType,
        space: BigO,
        run: F,
        test_cases: &[TestCase],
        time_limit: f64,
    ) -> EvaluationResult
    where
        F: Fn(&ProblemInput) -> Result<ProblemOutput, ExecutionError> + Send + Sync + 'static,
    {
        if test_cases.is_empty() {
            return EvaluationResult::empty(space.as_str());
        }

        let run = Arc::new(run);
        let mut result = EvaluationResult::empty(space.as_str());
        let mut total_time = 0.0;

        for (index, case) in test_cases.iter().enumerate() {
            let (outcome, elapsed) = run_case(problem_type, Arc::clone(&run), case, time_limit);
            total_time += elapsed;
            match outcome {
                CaseOutcome::Passed => result.passed += 1,
                CaseOutcome::Failed => result.failed += 1,
                CaseOutcome::TimedOut => {
                    log::warn!("{problem_type} case {index} exceeded {time_limit}s");
                    result.timed_out += 1;
                }
                CaseOutcome::Faulted(err) => {
                    log::warn!("{problem_type} case {index} faulted: {err}");
                    result.faulted += 1;
                }
            }
        }

        let total = test_cases.len() as f64;
        result.correctness = result.passed as f64 / total;
        result.elapsed_time = total_time / total;
        result.correct = result.correctness >= self.config.correctness_floor;
        result.fitness_score = self.score(result.correctness, result.elapsed_time, time_limit, space);

        log::debug!(
            "{problem_type}: {}/{} passed, {:.6}s mean, fitness {:.4}",
            result.passed,
            test_cases.len(),
            result.elapsed_time,
            result.fitness_score
        );
        result
    }

    /// Weighted fitness in [0, 1]; zero below the correctness floor.
    pub fn score(&self, correctness: f64, elapsed: f64, time_limit: f64, space: BigO) -> f64 {
        if correctness < self.config.correctness_floor {
            return 0.0;
        }
        let speed = if time_limit > 0.0 {
            (1.0 - elapsed / time_limit).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let w = &self.config.weights;
        let score =
            w.correctness * correctness.clamp(0.0, 1.0) + w.speed * speed + w.space * space.space_score();
        if score.is_finite() {
            score.clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Run one case on a worker thread; returns the outcome and the seconds
/// charged to it (the limit, for timeouts).
fn run_case<F>(
    problem_type: ProblemType,
    run: Arc<F>,
    case: &TestCase,
    time_limit: f64,
) -> (CaseOutcome, f64)
where
    F: Fn(&ProblemInput) -> Result<ProblemOutput, ExecutionError> + Send + Sync + 'static,
{
    let (tx, rx) = mpsc::channel();
    let input = Arc::clone(&case.input);
    let start = Instant::now();

    let spawned = thread::Builder::new()
        .name("candidate-case".into())
        .spawn(move || {
            // Receiver may be gone after a timeout.
            let _ = tx.send((*run)(&input));
        });
    if let Err(err) = spawned {
        return (
            CaseOutcome::Faulted(ExecutionError::Panicked(format!("spawn failed: {err}"))),
            0.0,
        );
    }

    let budget = Duration::try_from_secs_f64(time_limit).unwrap_or(Duration::MAX);
    let received = rx.recv_timeout(budget);
    let elapsed = start.elapsed().as_secs_f64().min(time_limit);

    let outcome = match received {
        Ok(Ok(output)) => {
            let ok = match &case.expected {
                Some(expected) => {
                    algorithms::matches_expected(problem_type, &case.input, &output, expected)
                }
                None => algorithms::verify(problem_type, &case.input, &output),
            };
            if ok {
                CaseOutcome::Passed
            } else {
                CaseOutcome::Failed
            }
        }
        Ok(Err(err)) => CaseOutcome::Faulted(err),
        Err(RecvTimeoutError::Timeout) => return (CaseOutcome::TimedOut, time_limit),
        Err(RecvTimeoutError::Disconnected) => {
            CaseOutcome::Faulted(ExecutionError::Panicked("worker exited without a result".into()))
        }
    };
    (outcome, elapsed)
}
