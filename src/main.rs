//! Algorithm discovery CLI - discover, tune, evaluate and benchmark algorithms.

#[cfg(feature = "dhat-heap")]
#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use algo_discovery::{
    CandidateRef, DiscoveryEngine, DiscoveryError, EngineConfig, ProblemSpec, ProblemType,
    TestCase,
};

fn main() {
    #[cfg(feature = "dhat-heap")]
    let _profiler = dhat::Profiler::new_heap();

    env_logger::init();

    let mut args: Vec<String> = std::env::args().collect();
    let program = args.remove(0);

    if args.first().map(String::as_str) == Some("--example") {
        print_example_config();
        return;
    }

    let config_path = match args.iter().position(|a| a == "--config") {
        Some(i) if i + 1 < args.len() => {
            let path = PathBuf::from(args.remove(i + 1));
            args.remove(i);
            Some(path)
        }
        Some(_) => {
            eprintln!("--config needs a path");
            std::process::exit(1);
        }
        None => None,
    };

    if args.is_empty() {
        print_usage(&program);
        std::process::exit(1);
    }

    let config = match &config_path {
        Some(path) => load_config(path),
        None => EngineConfig::default(),
    };

    let engine = DiscoveryEngine::new(config).unwrap_or_else(|e| {
        eprintln!("Error creating engine: {e}");
        std::process::exit(1);
    });

    if let Err(e) = run(&engine, &args) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn print_usage(program: &str) {
    eprintln!("Usage: {program} [--config engine.json] <command> [args]");
    eprintln!();
    eprintln!("Recommend and tune algorithms for a problem description.");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  discover <type> <size> [time_limit] [memory_mb]  Recommend an algorithm");
    eprintln!("  discover --spec <spec.json>                      Same, from a JSON request");
    eprintln!("  optimize <algorithm> [cases] [generations]       Tune one candidate");
    eprintln!("  evaluate <algorithm> <cases.json> [p1,p2,..]     Score one candidate");
    eprintln!("  recommend <type> <size> [time_limit] [memory_mb] Rank candidates without running");
    eprintln!("  benchmark <type> <s1,s2,..> [iterations] [out]   Compare all candidates (.csv or .json)");
    eprintln!("  candidates                                       List the registry");
    eprintln!("  history [limit]                                  Recent discoveries");
    eprintln!("  stats [algorithm]                                Performance summary of history");
    eprintln!("  export <path> | import <path>                    Move history as JSON");
    eprintln!("  reset-learning                                   Clear the Q-table");
    eprintln!();
    eprintln!("Problem types: sorting, searching, optimization, graph, dp");
    eprintln!("Example configuration is generated with --example flag.");
}

fn load_config(path: &Path) -> EngineConfig {
    let config_str = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading config file: {e}");
        std::process::exit(1);
    });
    serde_json::from_str(&config_str).unwrap_or_else(|e| {
        eprintln!("Error parsing config: {e}");
        std::process::exit(1);
    })
}

fn arg<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str, DiscoveryError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| DiscoveryError::InvalidInput(format!("missing argument <{name}>")))
}

fn parse<T: std::str::FromStr>(value: &str, name: &str) -> Result<T, DiscoveryError> {
    value
        .parse()
        .map_err(|_| DiscoveryError::InvalidInput(format!("invalid {name}: {value}")))
}

fn parse_list<T: std::str::FromStr>(value: &str, name: &str) -> Result<Vec<T>, DiscoveryError> {
    value.split(',').map(|v| parse(v.trim(), name)).collect()
}

fn spec_from_args(rest: &[String]) -> Result<ProblemSpec, DiscoveryError> {
    Ok(ProblemSpec::new(
        arg(rest, 0, "type")?,
        parse(arg(rest, 1, "size")?, "input size")?,
        rest.get(2).map_or(Ok(1.0), |v| parse(v, "time limit"))?,
        rest.get(3).map(|v| parse(v, "memory limit")).transpose()?,
    )?)
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unserializable: {e}>"))
}

fn run(engine: &DiscoveryEngine, args: &[String]) -> Result<(), DiscoveryError> {
    let command = args[0].as_str();
    let rest = &args[1..];

    match command {
        "discover" => {
            let start = Instant::now();
            let outcome = if rest.first().map(String::as_str) == Some("--spec") {
                let path = arg(rest, 1, "spec.json")?;
                let request = fs::read_to_string(path)
                    .map_err(|e| DiscoveryError::InvalidInput(format!("{path}: {e}")))?;
                engine.discover_json(&request)?
            } else {
                engine.discover(&spec_from_args(rest)?)?
            };
            println!("{}", to_json(&outcome));
            println!();
            println!("Time: {:.2}s", start.elapsed().as_secs_f32());
        }
        "optimize" => {
            let algorithm = arg(rest, 0, "algorithm")?;
            let cases = rest.get(1).map_or(Ok(5), |v| parse(v, "test case count"))?;
            let generations = rest
                .get(2)
                .map_or(Ok(engine.config().genetic.generations), |v| parse(v, "generations"))?;

            println!("Optimizing {algorithm}");
            println!("=================");
            println!("Test cases: {cases}");
            println!("Generations: {generations}");
            println!();

            let report = engine.optimize(algorithm, cases, generations)?;
            for (generation, best) in report.history.best_so_far.iter().enumerate() {
                println!("  Generation {generation}: best={best:.4}");
            }
            println!();
            println!("Stopped: {:?} after {} generations", report.stop_reason, report.generations);
            println!("Evaluations: {}", report.total_evaluations);
            println!("Parameters: {}", to_json(&report.parameters));
            println!("Fitness: {:.4}", report.evaluation.fitness_score);
        }
        "evaluate" => {
            let candidate = CandidateRef {
                name: arg(rest, 0, "algorithm")?.to_string(),
                parameters: rest.get(2).map(|v| parse_list(v, "parameter")).transpose()?,
            };
            let path = arg(rest, 1, "cases.json")?;
            let content = fs::read_to_string(path)
                .map_err(|e| DiscoveryError::InvalidInput(format!("{path}: {e}")))?;
            let cases: Vec<TestCase> = serde_json::from_str(&content)
                .map_err(|e| DiscoveryError::InvalidInput(format!("{path}: {e}")))?;
            let result = engine.evaluate(&candidate, &cases)?;
            println!("{}", to_json(&result));
        }
        "benchmark" => {
            let problem_type: ProblemType = arg(rest, 0, "type")?.parse()?;
            let sizes: Vec<u64> = parse_list(arg(rest, 1, "sizes")?, "size")?;
            let iterations = rest.get(2).map_or(Ok(3), |v| parse(v, "iterations"))?;
            let report = engine.benchmark(problem_type, &sizes, iterations)?;
            print!("{}", report.to_text());
            if let Some(out) = rest.get(3) {
                if out.ends_with(".csv") {
                    report.export_csv(out)?;
                } else {
                    report.export_json(out)?;
                }
                println!("Report written to {out}");
            }
        }
        "recommend" => {
            let spec = spec_from_args(rest)?;
            println!(
                "Recommendations for {} (n={})",
                spec.problem_type().as_str(),
                spec.input_size()
            );
            println!();
            println!(
                "{:<4} {:<22} {:>6} {:<12} {:<10} {:>8}",
                "#", "algorithm", "score", "time", "space", "learned"
            );
            for (rank, rec) in engine.recommend(&spec).iter().enumerate() {
                let learned = rec.q_value.map_or_else(|| "-".to_string(), |q| format!("{q:.3}"));
                let memory = if rec.fits_memory { "" } else { "  (exceeds memory limit)" };
                println!(
                    "{:<4} {:<22} {:>6.1} {:<12} {:<10} {:>8}{memory}",
                    rank + 1,
                    rec.algorithm,
                    rec.score,
                    rec.time_complexity,
                    rec.space_complexity,
                    learned
                );
            }
        }
        "candidates" => {
            for candidate in engine.registry().all() {
                let params: Vec<&str> = candidate.params.iter().map(|p| p.name).collect();
                println!(
                    "{:<22} {:<13} time {:<12} space {:<10} params {:?}",
                    candidate.name,
                    candidate.problem_type.as_str(),
                    candidate.time_complexity.as_str(),
                    candidate.space_complexity.as_str(),
                    params
                );
            }
        }
        "history" => {
            let limit = rest.first().map_or(Ok(10), |v| parse(v, "limit"))?;
            println!("{}", to_json(&engine.history(limit)?));
        }
        "stats" => {
            let stats = engine.stats(rest.first().map(String::as_str))?;
            println!("{}", to_json(&stats));
        }
        "export" => {
            let count = engine.export_history(Path::new(arg(rest, 0, "path")?))?;
            println!("Exported {count} records");
        }
        "import" => {
            let count = engine.import_history(Path::new(arg(rest, 0, "path")?))?;
            println!("Imported {count} records");
        }
        "reset-learning" => {
            engine.reset_learning();
            match &engine.config().storage.q_table_path {
                Some(path) => {
                    engine.save_learning(path)?;
                    println!("Q-table cleared: {}", path.display());
                }
                None => println!("Q-table cleared (no storage.q_table_path configured)"),
            }
        }
        other => {
            return Err(DiscoveryError::InvalidInput(format!(
                "unknown command: {other}"
            )));
        }
    }
    Ok(())
}

fn print_example_config() {
    let mut config = EngineConfig::default();
    config.storage.history_path = Some(PathBuf::from("discovery/history.jsonl"));
    config.storage.q_table_path = Some(PathBuf::from("discovery/q_table.json"));
    config.random_seed = Some(42);

    println!("Example configuration (engine.json):");
    println!("{}", to_json(&config));
    println!();
    match ProblemSpec::new("sorting", 10_000, 1.0, Some(64)) {
        Ok(spec) => {
            println!("Example request (spec.json):");
            println!("{}", to_json(&spec));
        }
        Err(e) => eprintln!("{e}"),
    }
}
