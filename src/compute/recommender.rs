//! Ranked candidate recommendations without running anything.
//!
//! A constraint score starts at 100 and loses points for complexity that the
//! constraints make risky. It makes up 80% of the final score; the learned
//! Q-value for the request's state fills the remaining 20.

use serde::{Deserialize, Serialize};

use crate::compute::agent::SelectionAgent;
use crate::compute::registry::{Candidate, Registry};
use crate::schema::{BigO, ProblemSpec, State, TimeBucket};

/// Input size above which quadratic time is penalized again.
const LARGE_INPUT: u64 = 100_000;

/// Share of the score earned by a learned Q-value of 1.
const LEARNED_WEIGHT: f64 = 0.2;

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub algorithm: String,
    /// 0 to 100; higher is better.
    pub score: f64,
    pub time_complexity: String,
    pub space_complexity: String,
    /// Learned value for the request's state, when there is one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub q_value: Option<f64>,
    pub fits_memory: bool,
}

fn time_penalty(time: BigO) -> f64 {
    match time {
        BigO::Quadratic => 20.0,
        BigO::Cubic => 30.0,
        BigO::Exponential | BigO::Factorial => 40.0,
        _ => 0.0,
    }
}

fn space_penalty(space: BigO) -> f64 {
    match space {
        BigO::Constant | BigO::Logarithmic => 0.0,
        BigO::Linear | BigO::Linearithmic => 15.0,
        _ => 30.0,
    }
}

fn score(
    candidate: &Candidate,
    spec: &ProblemSpec,
    state: State,
    q_value: Option<f64>,
) -> (f64, bool) {
    let n = spec.input_size();
    let mut score = 100.0 - time_penalty(candidate.time_complexity);
    if state.time == TimeBucket::Tight {
        score -= time_penalty(candidate.time_complexity) / 2.0;
    }
    if n > LARGE_INPUT && candidate.time_complexity.rank() >= BigO::Quadratic.rank() {
        score -= 30.0;
    }

    let mut fits_memory = true;
    if let Some(limit) = spec.constraints().memory_limit {
        score -= space_penalty(candidate.space_complexity);
        if candidate.estimated_memory_mb(n) > limit as f64 {
            fits_memory = false;
            score -= 50.0;
        }
    }

    let learned = q_value.map_or(0.0, |q| q.clamp(0.0, 1.0));
    let total =
        (1.0 - LEARNED_WEIGHT) * score.clamp(0.0, 100.0) + LEARNED_WEIGHT * 100.0 * learned;
    (total, fits_memory)
}

/// Rank every candidate of the spec's problem type, best first. Ties keep
/// registration order.
pub fn recommend(
    registry: &Registry,
    agent: &SelectionAgent,
    spec: &ProblemSpec,
    state: State,
) -> Vec<Recommendation> {
    let mut ranked: Vec<Recommendation> = registry
        .candidates_for(spec.problem_type())
        .into_iter()
        .map(|candidate| {
            let q_value = agent.q_value(state, candidate.name).map(|e| e.value);
            let (score, fits_memory) = score(candidate, spec, state, q_value);
            Recommendation {
                algorithm: candidate.name.to_string(),
                score,
                time_complexity: candidate.time_complexity.to_string(),
                space_complexity: candidate.space_complexity.to_string(),
                q_value,
                fits_memory,
            }
        })
        .collect();
    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Encoder;
    use crate::schema::AgentConfig;

    fn ranked(spec: &ProblemSpec, agent: &SelectionAgent) -> Vec<Recommendation> {
        let state = Encoder::default().encode(spec);
        recommend(&Registry::standard(), agent, spec, state)
    }

    #[test]
    fn test_large_inputs_demote_quadratic_sorts() {
        let agent = SelectionAgent::new(AgentConfig::default(), 1);
        let spec = ProblemSpec::new("sorting", 1_000_000, 1.0, None).unwrap();
        let recs = ranked(&spec, &agent);

        assert_eq!(recs.len(), 6);
        assert_eq!(recs[0].algorithm, "quicksort");
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
        let bubble = recs.iter().find(|r| r.algorithm == "bubble_sort").unwrap();
        assert!((bubble.score - 40.0).abs() < 1e-9);
        assert!((recs[0].score - 80.0).abs() < 1e-9);
        assert!(recs.iter().all(|r| r.q_value.is_none()));
    }

    #[test]
    fn test_memory_limit_demotes_linear_space() {
        let agent = SelectionAgent::new(AgentConfig::default(), 1);
        let spec = ProblemSpec::new("sorting", 10_000_000, 1.0, Some(16)).unwrap();
        let recs = ranked(&spec, &agent);

        let merge = recs.iter().find(|r| r.algorithm == "mergesort").unwrap();
        let heap = recs.iter().find(|r| r.algorithm == "heapsort").unwrap();
        assert!(!merge.fits_memory);
        assert!(heap.fits_memory);
        assert!(heap.score > merge.score);
    }

    #[test]
    fn test_learned_values_add_bonus() {
        let agent = SelectionAgent::new(AgentConfig::default(), 1);
        let spec = ProblemSpec::new("searching", 1000, 1.0, None).unwrap();
        let state = Encoder::default().encode(&spec);
        let before = ranked(&spec, &agent);
        assert_eq!(before[0].algorithm, "binary_search");

        for _ in 0..50 {
            agent.update(state, "hash_search", 1.0, state, &["hash_search"]);
        }
        let after = ranked(&spec, &agent);
        assert_eq!(after[0].algorithm, "hash_search");
        assert!(after[0].q_value.unwrap() > 0.9);
    }
}
