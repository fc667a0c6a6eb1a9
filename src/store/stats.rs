//! Aggregate statistics over discovery history.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::schema::DiscoveryRecord;

/// Averages over a group of records. A discovery counts as a success when
/// its candidate passed, i.e. its fitness is above zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlgorithmStats {
    pub count: usize,
    pub success_rate: f64,
    pub avg_fitness: f64,
    pub avg_estimated_time: f64,
}

impl AlgorithmStats {
    fn from_group<'a>(records: impl IntoIterator<Item = &'a DiscoveryRecord>) -> Self {
        let (mut count, mut successes, mut fitness, mut time) = (0usize, 0usize, 0.0, 0.0);
        for record in records {
            count += 1;
            successes += usize::from(record.fitness_score > 0.0);
            fitness += record.fitness_score;
            time += record.estimated_time;
        }
        if count == 0 {
            return Self::default();
        }
        let n = count as f64;
        Self {
            count,
            success_rate: successes as f64 / n,
            avg_fitness: fitness / n,
            avg_estimated_time: time / n,
        }
    }
}

/// Overall and per-algorithm performance summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformanceStats {
    pub overall: AlgorithmStats,
    pub by_algorithm: BTreeMap<String, AlgorithmStats>,
}

impl PerformanceStats {
    pub fn from_records(records: &[DiscoveryRecord]) -> Self {
        let mut groups: BTreeMap<&str, Vec<&DiscoveryRecord>> = BTreeMap::new();
        for record in records {
            groups.entry(record.algorithm.as_str()).or_default().push(record);
        }
        Self {
            overall: AlgorithmStats::from_group(records),
            by_algorithm: groups
                .into_iter()
                .map(|(name, group)| (name.to_string(), AlgorithmStats::from_group(group)))
                .collect(),
        }
    }
}
