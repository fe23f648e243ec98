//! Tabular Q-learning engine for the CVRP.
//!
//! An episode walks the fleet over the customers one decision at a time:
//! visit a customer that still fits, or drive back to the depot. The value
//! table is owned by one [`QLearning`] run and keeps learning across all of
//! its episodes.

pub mod episode;
pub mod q_table;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info};

use crate::config::QParams;
use crate::problem::{Instance, Problem};
use crate::solution::{SolveResult, Solution};
use crate::utils::{create_rng, format_duration, Stopwatch};
use crate::warn_on_short_fleet;

use self::episode::run_episode;
use self::q_table::QTable;

/// Check if `candidate` ranks above `best`: feasibility first, then distance.
pub fn is_better(candidate: &Solution, best: Option<&Solution>) -> bool {
    match best {
        None => true,
        Some(best) => match (candidate.is_feasible, best.is_feasible) {
            (true, false) => true,
            (false, true) => false,
            _ => candidate.distance < best.distance,
        },
    }
}

/// Drives the episode loop and tracks the best episode.
pub struct QLearning {
    pub problem: Problem,
    pub params: QParams,
    pub q_table: QTable,
    pub best_solution: Option<Solution>,
    /// Progress log, one line per episode
    pub log: Vec<String>,
    /// Feasibility and distance of the best-so-far after each episode
    pub best_history: Vec<(bool, f64)>,
    pub episodes_run: usize,
    pub cancelled: bool,
    pub run_time: Duration,
}

impl QLearning {
    /// Create a new run for the given instance; the distance matrix is built here.
    pub fn new(instance: Instance, params: QParams) -> Self {
        QLearning {
            problem: Problem::new(instance),
            params,
            q_table: QTable::new(),
            best_solution: None,
            log: Vec::new(),
            best_history: Vec::new(),
            episodes_run: 0,
            cancelled: false,
            run_time: Duration::from_secs(0),
        }
    }

    /// Run all episodes and return the projected best solution.
    pub fn run(&mut self) -> SolveResult {
        self.run_with_cancel(None)
    }

    /// Run the episodes, stopping early once `cancel` is set.
    ///
    /// The flag is checked before each episode.
    pub fn run_with_cancel(&mut self, cancel: Option<Arc<AtomicBool>>) -> SolveResult {
        let stopwatch = Stopwatch::start_new();
        let mut rng = create_rng(&self.params.seed);

        // The value table and the best episode belong to this call only.
        self.q_table = QTable::new();
        self.best_solution = None;
        self.log.clear();
        self.best_history.clear();
        self.episodes_run = 0;
        self.cancelled = false;

        info!(
            "Q-learning on '{}': {} customers, {} vehicles, {} episodes",
            self.problem.instance.id,
            self.problem.get_customer_count(),
            self.problem.vehicle_count(),
            self.params.episodes
        );
        warn_on_short_fleet(&self.problem);

        for ep in 1..=self.params.episodes {
            if cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                self.cancelled = true;
                self.log.push(format!("Cancelled after episode {}", ep - 1));
                break;
            }

            let outcome = run_episode(&self.problem, &mut self.q_table, &self.params, &mut rng);
            self.episodes_run = ep;

            let line = match &outcome {
                Some(solution) => format!(
                    "Episode {}: distance={:.2}, feasible={}",
                    ep, solution.distance, solution.is_feasible
                ),
                None => format!("Episode {}: distance={:.2}, feasible=false", ep, f64::INFINITY),
            };
            debug!("{}", line);
            self.log.push(line);

            if let Some(solution) = outcome {
                if is_better(&solution, self.best_solution.as_ref()) {
                    self.best_solution = Some(solution);
                }
            }

            if let Some(best) = &self.best_solution {
                self.best_history.push((best.is_feasible, best.distance));
            }
        }

        self.run_time = stopwatch.elapsed();

        let best = self.best_solution.clone().unwrap_or_else(Solution::empty);
        info!(
            "Q-learning finished in {}: distance={:.2}, feasible={}, routes={}, states={}",
            format_duration(self.run_time),
            best.distance,
            best.is_feasible,
            best.vehicles_used(),
            self.q_table.state_count()
        );

        best.project(&self.problem, self.log.clone(), stopwatch.elapsed_millis())
    }
}
