//! Monte Carlo round statistics CLI.
//!
//! Resolves one scenario round many times and prints hit statistics per side.
//!
//! Usage:
//!   cargo run --release --bin simulate -- SCENARIO [OPTIONS]
//!
//! Options:
//!   --rounds N    Number of rounds to resolve (default: 1000)
//!   --threads N   Number of parallel threads (default: 4)
//!   --seed N      Random seed, 0 for entropy (default: scenario seed or 0)
//!   --json        Print the summary as JSON
//!   --quiet       Suppress progress output

use std::env;
use std::path::Path;
use std::process;
use std::time::Instant;

use firepower::combat::Side;
use firepower::scenario::Scenario;
use firepower::simulate::{run_simulation, SimulationConfig};

fn main() {
    firepower::init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut config = SimulationConfig::default();
    let mut path: Option<String> = None;
    let mut seed: Option<u64> = None;
    let mut json = false;
    let mut quiet = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--rounds" => {
                i += 1;
                config.rounds = parse_value(&args, i, "--rounds");
            }
            "--threads" => {
                i += 1;
                config.threads = parse_value(&args, i, "--threads");
            }
            "--seed" => {
                i += 1;
                seed = Some(parse_value(&args, i, "--seed"));
            }
            "--json" => {
                json = true;
            }
            "--quiet" => {
                quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other if other.starts_with("--") => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
            other => {
                path = Some(other.to_string());
            }
        }
        i += 1;
    }

    let Some(path) = path else {
        print_usage();
        process::exit(1);
    };
    let setup = match Scenario::load(Path::new(&path)) {
        Ok(scenario) => {
            config.seed = seed.or(scenario.seed).unwrap_or(0);
            match scenario.prepare() {
                Ok(setup) => setup,
                Err(e) => fail(&e.to_string()),
            }
        }
        Err(e) => fail(&e.to_string()),
    };

    if !quiet {
        eprintln!(
            "Simulating {} rounds in {} on {} threads",
            config.rounds, setup.battle.context.territory, config.threads
        );
    }

    let start = Instant::now();
    let summary = match run_simulation(&setup, &config) {
        Ok(s) => s,
        Err(e) => fail(&e.to_string()),
    };
    if !quiet {
        eprintln!("Completed in {:.2}s", start.elapsed().as_secs_f64());
    }

    if json {
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => fail(&e.to_string()),
        }
        return;
    }
    for side in Side::BOTH {
        let s = summary.side(side);
        println!(
            "{}: mean {:.3} hits, expected {:.3}, range {}..={}",
            side, s.mean_hits, s.expected_hits, s.min_hits, s.max_hits
        );
        for (hits, rounds) in &s.distribution {
            println!(
                "  {:>3} hits: {:>6} ({:.1}%)",
                hits,
                rounds,
                *rounds as f64 / summary.rounds as f64 * 100.0
            );
        }
    }
}

fn parse_value<T: std::str::FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|s| s.parse()) {
        Some(Ok(v)) => v,
        _ => fail(&format!("invalid {} value", flag)),
    }
}

fn fail(message: &str) -> ! {
    eprintln!("error: {}", message);
    process::exit(1);
}

fn print_usage() {
    eprintln!("Usage: simulate SCENARIO [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --rounds N    Number of rounds to resolve (default: 1000)");
    eprintln!("  --threads N   Number of parallel threads (default: 4)");
    eprintln!("  --seed N      Random seed, 0 for entropy (default: scenario seed or 0)");
    eprintln!("  --json        Print the summary as JSON");
    eprintln!("  --quiet       Suppress progress output");
    eprintln!("  --help        Show this help");
}
