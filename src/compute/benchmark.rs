//! Comparative benchmarking of every candidate of a problem class.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compute::evaluator::Evaluator;
use crate::compute::generator::TestCaseGenerator;
use crate::compute::registry::Registry;
use crate::schema::{ProblemType, TestCase};
use crate::store::StoreError;

/// One candidate measured at one input size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkRun {
    pub algorithm: String,
    pub input_size: usize,
    /// Mean seconds per iteration.
    pub execution_time: f64,
    /// Estimate from the declared space class.
    pub memory_mb: f64,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Statistics over one candidate's successful runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkSummary {
    pub avg_time: f64,
    pub median_time: f64,
    pub min_time: f64,
    pub max_time: f64,
    pub std_dev_time: f64,
    pub avg_memory_mb: f64,
    pub peak_memory_mb: f64,
    pub success_rate: f64,
}

/// Full result of a benchmark sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub problem_type: ProblemType,
    pub sizes: Vec<usize>,
    pub iterations: usize,
    pub runs: Vec<BenchmarkRun>,
    pub summary: BTreeMap<String, BenchmarkSummary>,
    /// Candidates with no successful run.
    pub failed: Vec<String>,
    pub fastest_algorithm: Option<String>,
    pub most_memory_efficient: Option<String>,
    /// Lowest combined mean time and memory.
    pub overall_best: Option<String>,
}

impl BenchmarkReport {
    /// Write the report as pretty JSON.
    pub fn export_json<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Write one CSV row per run.
    pub fn export_csv<P: AsRef<Path>>(&self, path: P) -> Result<(), StoreError> {
        let mut writer = csv::Writer::from_path(path)?;
        writer.write_record([
            "algorithm",
            "input_size",
            "execution_time",
            "memory_mb",
            "success",
            "error",
            "timestamp",
        ])?;
        for run in &self.runs {
            writer.write_record([
                run.algorithm.clone(),
                run.input_size.to_string(),
                run.execution_time.to_string(),
                run.memory_mb.to_string(),
                run.success.to_string(),
                run.error.clone().unwrap_or_default(),
                run.timestamp.to_rfc3339(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Human-readable table.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "Benchmark: {} (sizes {:?}, {} iterations)",
            self.problem_type, self.sizes, self.iterations
        );
        let _ = writeln!(
            out,
            "{:<22} {:>12} {:>12} {:>12} {:>10} {:>8}",
            "algorithm", "avg (s)", "min (s)", "max (s)", "mem (MB)", "ok"
        );
        for (name, s) in &self.summary {
            let _ = writeln!(
                out,
                "{:<22} {:>12.6} {:>12.6} {:>12.6} {:>10.3} {:>7.0}%",
                name,
                s.avg_time,
                s.min_time,
                s.max_time,
                s.avg_memory_mb,
                s.success_rate * 100.0
            );
        }
        for name in &self.failed {
            let _ = writeln!(out, "{name:<22} all runs failed");
        }
        if let Some(best) = &self.overall_best {
            let _ = writeln!(out, "overall best: {best}");
        }
        out
    }
}

/// Runs every candidate of a problem class over a size sweep.
pub struct BenchmarkSuite<'a> {
    registry: &'a Registry,
    evaluator: &'a Evaluator,
    time_limit: f64,
}

impl<'a> BenchmarkSuite<'a> {
    pub fn new(registry: &'a Registry, evaluator: &'a Evaluator, time_limit: f64) -> Self {
        Self {
            registry,
            evaluator,
            time_limit,
        }
    }

    /// Benchmark all candidates of `problem_type`. Every candidate sees the
    /// same input at each size; each run repeats it `iterations` times.
    pub fn run(
        &self,
        problem_type: ProblemType,
        sizes: &[u64],
        iterations: usize,
        generator: &mut TestCaseGenerator,
    ) -> BenchmarkReport {
        let iterations = iterations.max(1);
        let candidates = self.registry.candidates_for(problem_type);
        let inputs: Vec<(usize, TestCase)> = sizes
            .iter()
            .filter_map(|&size| {
                let effective = generator.effective_size(problem_type, size);
                generator
                    .generate(problem_type, size, 1)
                    .pop()
                    .map(|case| (effective, case))
            })
            .collect();

        let mut runs = Vec::with_capacity(candidates.len() * inputs.len());
        for candidate in &candidates {
            let genome = candidate.default_genome();
            for (size, case) in &inputs {
                let cases = vec![case.clone(); iterations];
                let result = self
                    .evaluator
                    .evaluate(candidate, &genome, &cases, self.time_limit);
                let success = result.passed == iterations;
                let error = (!success).then(|| {
                    format!(
                        "{} failed, {} timed out, {} faulted",
                        result.failed, result.timed_out, result.faulted
                    )
                });
                runs.push(BenchmarkRun {
                    algorithm: candidate.name.to_string(),
                    input_size: *size,
                    execution_time: result.elapsed_time,
                    memory_mb: candidate.estimated_memory_mb(*size as u64),
                    success,
                    error,
                    timestamp: Utc::now(),
                });
            }
            log::info!("benchmarked {} over {} sizes", candidate.name, inputs.len());
        }

        analyze(
            problem_type,
            inputs.iter().map(|(size, _)| *size).collect(),
            iterations,
            runs,
        )
    }
}

fn analyze(
    problem_type: ProblemType,
    sizes: Vec<usize>,
    iterations: usize,
    runs: Vec<BenchmarkRun>,
) -> BenchmarkReport {
    let mut by_algorithm: BTreeMap<&str, Vec<&BenchmarkRun>> = BTreeMap::new();
    for run in &runs {
        by_algorithm.entry(&run.algorithm).or_default().push(run);
    }

    let mut summary = BTreeMap::new();
    let mut failed = Vec::new();
    for (name, all) in &by_algorithm {
        let ok: Vec<&&BenchmarkRun> = all.iter().filter(|r| r.success).collect();
        if ok.is_empty() {
            failed.push(name.to_string());
            continue;
        }
        let mut times: Vec<f64> = ok.iter().map(|r| r.execution_time).collect();
        times.sort_by(f64::total_cmp);
        let memories: Vec<f64> = ok.iter().map(|r| r.memory_mb).collect();
        let n = times.len() as f64;
        let avg_time = times.iter().sum::<f64>() / n;
        let std_dev_time = if times.len() > 1 {
            (times.iter().map(|t| (t - avg_time).powi(2)).sum::<f64>() / (n - 1.0)).sqrt()
        } else {
            0.0
        };

        summary.insert(
            name.to_string(),
            BenchmarkSummary {
                avg_time,
                median_time: median(&times),
                min_time: times[0],
                max_time: times[times.len() - 1],
                std_dev_time,
                avg_memory_mb: memories.iter().sum::<f64>() / n,
                peak_memory_mb: memories.iter().copied().fold(0.0, f64::max),
                success_rate: ok.len() as f64 / all.len() as f64,
            },
        );
    }

    let min_by = |key: fn(&BenchmarkSummary) -> f64| {
        summary
            .iter()
            .min_by(|a, b| key(a.1).total_cmp(&key(b.1)))
            .map(|(name, _)| name.clone())
    };

    BenchmarkReport {
        problem_type,
        sizes,
        iterations,
        fastest_algorithm: min_by(|s| s.avg_time),
        most_memory_efficient: min_by(|s| s.avg_memory_mb),
        overall_best: min_by(|s| s.avg_time + s.avg_memory_mb),
        runs,
        summary,
        failed,
    }
}

/// Median of a sorted, non-empty slice.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::GeneratorConfig;

    fn run(success: bool, algorithm: &str, time: f64, memory: f64) -> BenchmarkRun {
        BenchmarkRun {
            algorithm: algorithm.into(),
            input_size: 10,
            execution_time: time,
            memory_mb: memory,
            success,
            error: None,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_analyze_statistics() {
        let runs = vec![
            run(true, "fast", 1.0, 5.0),
            run(true, "fast", 3.0, 5.0),
            run(true, "lean", 4.0, 0.5),
            run(false, "lean", 0.0, 0.5),
            run(false, "broken", 0.0, 0.0),
        ];
        let report = analyze(ProblemType::Sorting, vec![10], 1, runs);

        let fast = &report.summary["fast"];
        assert_eq!(fast.avg_time, 2.0);
        assert_eq!(fast.median_time, 2.0);
        assert!((fast.std_dev_time - 2f64.sqrt()).abs() < 1e-12);
        assert_eq!(report.summary["lean"].success_rate, 0.5);
        assert_eq!(report.failed, vec!["broken".to_string()]);
        assert_eq!(report.fastest_algorithm.as_deref(), Some("fast"));
        assert_eq!(report.most_memory_efficient.as_deref(), Some("lean"));
        assert_eq!(report.overall_best.as_deref(), Some("lean"));
    }

    #[test]
    fn test_suite_covers_all_candidates() {
        let registry = Registry::standard();
        let evaluator = Evaluator::default();
        let mut generator = TestCaseGenerator::new(GeneratorConfig::default(), 5);
        let report = BenchmarkSuite::new(&registry, &evaluator, 5.0).run(
            ProblemType::Searching,
            &[50, 200],
            2,
            &mut generator,
        );

        assert_eq!(report.runs.len(), 4 * 2);
        assert!(report.failed.is_empty());
        assert_eq!(report.summary.len(), 4);
        assert!(report.fastest_algorithm.is_some());
        assert!(report.to_text().contains("binary_search"));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.json");
        report.export_json(&path).unwrap();
        let parsed: BenchmarkReport =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(parsed.runs.len(), 8);
    }

    #[test]
    fn test_export_csv() {
        let mut failed = run(false, "broken", 0.0, 0.0);
        failed.error = Some("1 failed, 0 timed out, 0 faulted".into());
        let report = analyze(
            ProblemType::Sorting,
            vec![10],
            1,
            vec![run(true, "fast", 0.25, 2.0), failed],
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.csv");
        report.export_csv(&path).unwrap();

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(
            reader.headers().unwrap().iter().collect::<Vec<_>>(),
            ["algorithm", "input_size", "execution_time", "memory_mb", "success", "error", "timestamp"]
        );
        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "fast");
        assert_eq!(&rows[0][2], "0.25");
        assert_eq!(&rows[0][4], "true");
        assert_eq!(&rows[1][5], "1 failed, 0 timed out, 0 faulted");
    }
}
