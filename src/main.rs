//! Firepower -- resolves one battle round described by a JSON scenario.
//!
//! Usage:
//!   firepower [SCENARIO] [OPTIONS]
//!
//! Reads the scenario from SCENARIO, or from stdin when it is `-` or absent,
//! and prints the battle history followed by the hits of each side.
//!
//! Options:
//!   --seed N   Dice seed, overriding the scenario's (0 for entropy)
//!   --json     Print the round report as JSON instead of text

use std::env;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process;

use firepower::combat::{BattleHistory, SeededRandom, Side};
use firepower::scenario::{Scenario, ScenarioError};

fn main() {
    firepower::init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut path: Option<String> = None;
    let mut seed: Option<u64> = None;
    let mut json = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                seed = match args.get(i).map(|s| s.parse()) {
                    Some(Ok(n)) => Some(n),
                    _ => fail("invalid --seed value"),
                };
            }
            "--json" => {
                json = true;
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

    let scenario = match read_scenario(path.as_deref()) {
        Ok(s) => s,
        Err(e) => fail(&e.to_string()),
    };
    let setup = match scenario.prepare() {
        Ok(s) => s,
        Err(e) => fail(&e.to_string()),
    };

    let mut random = match seed.or(scenario.seed) {
        Some(0) | None => SeededRandom::from_entropy(),
        Some(n) => SeededRandom::new(n),
    };
    let mut history = BattleHistory::new();
    let report = match setup.resolve(&mut random, &mut history) {
        Ok(r) => r,
        Err(e) => fail(&e.to_string()),
    };

    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let written = if json {
        serde_json::to_writer_pretty(&mut out, &report)
            .map_err(io::Error::from)
            .and_then(|_| writeln!(out))
    } else {
        history
            .lines()
            .iter()
            .try_for_each(|line| writeln!(out, "{}", line))
            .and_then(|_| {
                for side in Side::BOTH {
                    writeln!(
                        out,
                        "{} hits: {} (expected {:.2})",
                        side,
                        report.hits_by(side),
                        report.expected_hits_by(side)
                    )?;
                }
                Ok(())
            })
    };
    if let Err(e) = written.and_then(|_| out.flush()) {
        fail(&format!("failed to write output: {}", e));
    }
}

fn read_scenario(path: Option<&str>) -> Result<Scenario, ScenarioError> {
    match path {
        Some(p) if p != "-" => Scenario::load(Path::new(p)),
        _ => {
            let mut data = String::new();
            io::stdin()
                .read_to_string(&mut data)
                .map_err(|source| ScenarioError::Io {
                    path: "<stdin>".to_string(),
                    source,
                })?;
            Scenario::from_json_str(&data)
        }
    }
}

fn fail(message: &str) -> ! {
    tracing::error!("{}", message);
    eprintln!("error: {}", message);
    process::exit(1);
}

fn print_usage() {
    eprintln!("Usage: firepower [SCENARIO] [OPTIONS]");
    eprintln!();
    eprintln!("Reads the scenario from SCENARIO, or stdin when it is '-' or absent.");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --seed N   Dice seed, overriding the scenario's (0 for entropy)");
    eprintln!("  --json     Print the round report as JSON");
    eprintln!("  --help     Show this help");
}
