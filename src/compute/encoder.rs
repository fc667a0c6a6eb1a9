//! Problem encoding: projects a specification onto a discrete Q-learning state.

use crate::schema::{EncoderConfig, ProblemSpec, SizeBucket, State, TimeBucket};

/// Pure mapping from [`ProblemSpec`] to [`State`].
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    config: EncoderConfig,
}

impl Encoder {
    pub fn new(config: EncoderConfig) -> Self {
        Self { config }
    }

    pub fn encode(&self, spec: &ProblemSpec) -> State {
        State {
            problem_type: spec.problem_type(),
            size: self.size_bucket(spec.input_size()),
            time: self.time_bucket(spec.time_limit()),
        }
    }

    pub fn size_bucket(&self, input_size: u64) -> SizeBucket {
        let [tiny, small, medium, large] = self.config.size_thresholds;
        match input_size {
            n if n <= tiny => SizeBucket::Tiny,
            n if n <= small => SizeBucket::Small,
            n if n <= medium => SizeBucket::Medium,
            n if n <= large => SizeBucket::Large,
            _ => SizeBucket::Huge,
        }
    }

    pub fn time_bucket(&self, time_limit: f64) -> TimeBucket {
        let [tight, relaxed] = self.config.time_thresholds;
        if time_limit < tight {
            TimeBucket::Tight
        } else if time_limit <= relaxed {
            TimeBucket::Normal
        } else {
            TimeBucket::Relaxed
        }
    }
}
