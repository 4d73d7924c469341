//! Monte Carlo round statistics.
//!
//! Resolves many independent copies of one battle round on a rayon pool and
//! summarizes the hits each side scored.

use std::collections::BTreeMap;
use std::time::Instant;

use rayon::prelude::*;
use serde::Serialize;

use crate::combat::{CombatError, NullHistory, RoundReport, SeededRandom, Side};
use crate::scenario::BattleSetup;

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of rounds to resolve.
    pub rounds: usize,
    /// Worker threads; 0 lets rayon decide.
    pub threads: usize,
    /// Base seed, 0 for entropy. Round `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            rounds: 1000,
            threads: 4,
            seed: 0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SimulationError {
    #[error("failed to build thread pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),

    #[error(transparent)]
    Combat(#[from] CombatError),
}

/// Hit statistics of one side.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SideSummary {
    pub mean_hits: f64,
    /// Same for every round; kept to compare against `mean_hits`.
    pub expected_hits: f64,
    pub min_hits: i32,
    pub max_hits: i32,
    /// Rounds by number of hits.
    pub distribution: BTreeMap<i32, usize>,
}

impl SideSummary {
    fn from_reports(reports: &[RoundReport], side: Side) -> Self {
        if reports.is_empty() {
            return SideSummary::default();
        }
        let mut distribution = BTreeMap::new();
        let mut total = 0i64;
        for report in reports {
            let hits = report.hits_by(side);
            total += i64::from(hits);
            *distribution.entry(hits).or_insert(0) += 1;
        }
        SideSummary {
            mean_hits: total as f64 / reports.len() as f64,
            expected_hits: reports[0].expected_hits_by(side),
            min_hits: distribution.keys().next().copied().unwrap_or(0),
            max_hits: distribution.keys().next_back().copied().unwrap_or(0),
            distribution,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationSummary {
    pub rounds: usize,
    pub offense: SideSummary,
    pub defense: SideSummary,
}

impl SimulationSummary {
    pub fn side(&self, side: Side) -> &SideSummary {
        match side {
            Side::Offense => &self.offense,
            Side::Defense => &self.defense,
        }
    }
}

fn random_for(config: &SimulationConfig, round: usize) -> SeededRandom {
    if config.seed != 0 {
        SeededRandom::new(config.seed.wrapping_add(round as u64))
    } else {
        SeededRandom::from_entropy()
    }
}

/// Resolves `config.rounds` copies of the battle, each with its own dice.
pub fn run_simulation(
    setup: &BattleSetup,
    config: &SimulationConfig,
) -> Result<SimulationSummary, SimulationError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.threads)
        .build()?;

    let start = Instant::now();
    let reports: Vec<RoundReport> = pool.install(|| {
        (0..config.rounds)
            .into_par_iter()
            .map(|i| {
                let mut random = random_for(config, i);
                setup.resolve(&mut random, &mut NullHistory)
            })
            .collect::<Result<Vec<_>, CombatError>>()
    })?;

    tracing::info!(
        rounds = reports.len(),
        threads = pool.current_num_threads(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "simulation finished"
    );
    Ok(SimulationSummary {
        rounds: reports.len(),
        offense: SideSummary::from_reports(&reports, Side::Offense),
        defense: SideSummary::from_reports(&reports, Side::Defense),
    })
}
