//! # CVRP-Meta
//!
//! Two metaheuristic solvers for the Capacitated Vehicle Routing Problem
//! (CVRP) sharing one problem representation:
//!
//! - a genetic algorithm over customer permutations, decoded into routes by
//!   a greedy capacity split ([`GeneticAlgorithm`]);
//! - a tabular Q-learning agent that builds routes one visit at a time
//!   ([`q_learning::QLearning`]).
//!
//! Both are seeded from a string and fully deterministic: the same instance,
//! parameters and seed give the same routes and the same progress log.

pub mod api;
pub mod config;
pub mod genetic;
pub mod individual;
pub mod mock;
pub mod population;
pub mod problem;
pub mod q_learning;
pub mod solution;
pub mod split;
pub mod utils;

use crate::config::{GaParams, QParams};
use crate::individual::Individual;
use crate::population::Population;
use crate::problem::{Instance, Problem};
use crate::q_learning::QLearning;
use crate::solution::{SolveResult, Solution};
use crate::utils::{create_rng, format_duration, Stopwatch};

use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Solve an instance with the genetic algorithm.
pub fn solve_ga(instance: &Instance, params: &GaParams) -> SolveResult {
    GeneticAlgorithm::new(instance.clone(), params.clone()).run()
}

/// Solve an instance with tabular Q-learning.
pub fn solve_rl(instance: &Instance, params: &QParams) -> SolveResult {
    QLearning::new(instance.clone(), params.clone()).run()
}

/// The generational genetic algorithm with single-individual elitism.
pub struct GeneticAlgorithm {
    pub problem: Problem,
    pub params: GaParams,
    pub population: Population,
    pub best_individual: Option<Individual>,
    /// Progress log
    pub log: Vec<String>,
    /// Best fitness after initialization and after each generation
    pub fitness_history: Vec<f64>,
    pub generations_run: usize,
    pub cancelled: bool,
    pub run_time: Duration,
}

impl GeneticAlgorithm {
    /// Create a new GA run for the given instance; the distance matrix is built here.
    pub fn new(instance: Instance, params: GaParams) -> Self {
        GeneticAlgorithm {
            problem: Problem::new(instance),
            population: Population::new(params.population_size),
            params,
            best_individual: None,
            log: Vec::new(),
            fitness_history: Vec::new(),
            generations_run: 0,
            cancelled: false,
            run_time: Duration::from_secs(0),
        }
    }

    /// Run all generations and return the projected best solution.
    pub fn run(&mut self) -> SolveResult {
        self.run_with_cancel(None)
    }

    /// Run the generations, stopping early once `cancel` is set.
    ///
    /// The flag is checked before each generation.
    pub fn run_with_cancel(&mut self, cancel: Option<Arc<AtomicBool>>) -> SolveResult {
        let stopwatch = Stopwatch::start_new();
        let mut rng = create_rng(&self.params.seed);

        // Every call starts from scratch.
        self.population = Population::new(self.params.population_size);
        self.best_individual = None;
        self.log.clear();
        self.fitness_history.clear();
        self.generations_run = 0;
        self.cancelled = false;

        info!(
            "GA on '{}': {} customers, {} vehicles, population {}, {} generations",
            self.problem.instance.id,
            self.problem.get_customer_count(),
            self.problem.vehicle_count(),
            self.population.size,
            self.params.generations
        );
        warn_on_short_fleet(&self.problem);

        if self.problem.vehicle_count() > 0 {
            self.population.initialize(&self.problem, &mut rng);
        }

        // Only an empty fleet leaves the population empty.
        let Some(mut best) = self.population.get_best().cloned() else {
            self.log
                .push("No vehicles available: returning an empty solution".to_string());
            self.run_time = stopwatch.elapsed();
            return Solution::empty().project(
                &self.problem,
                self.log.clone(),
                stopwatch.elapsed_millis(),
            );
        };

        self.log.push(format!(
            "Init: bestDistance={:.2}, feasible={}",
            best.get_distance(),
            best.is_feasible()
        ));
        self.fitness_history.push(best.get_fitness());

        for gen in 1..=self.params.generations {
            if cancel.as_ref().is_some_and(|flag| flag.load(Ordering::Relaxed)) {
                self.cancelled = true;
                self.log
                    .push(format!("Cancelled after generation {}", gen - 1));
                break;
            }

            self.population = self.population.next_generation(
                &best,
                &self.problem,
                self.params.mutation_rate,
                &mut rng,
            );
            self.generations_run = gen;

            if let Some(current) = self.population.get_best() {
                if current.get_fitness() < best.get_fitness() {
                    best = current.clone();
                }
            }
            self.fitness_history.push(best.get_fitness());

            if gen % 10 == 0 || gen == self.params.generations {
                let line = format!(
                    "Generation {}: bestDistance={:.2}, feasible={}",
                    gen,
                    best.get_distance(),
                    best.is_feasible()
                );
                debug!("{}", line);
                self.log.push(line);
            }
        }

        self.run_time = stopwatch.elapsed();
        info!(
            "GA finished in {}: distance={:.2}, feasible={}, routes={}, extra vehicles={}",
            format_duration(self.run_time),
            best.get_distance(),
            best.is_feasible(),
            best.solution.vehicles_used(),
            best.extra_vehicles
        );

        let result = best.solution.project(
            &self.problem,
            self.log.clone(),
            stopwatch.elapsed_millis(),
        );
        self.best_individual = Some(best);
        result
    }
}

/// Warn about instances the fleet cannot possibly serve.
pub(crate) fn warn_on_short_fleet(problem: &Problem) {
    let instance = &problem.instance;
    if problem.vehicle_count() == 0 {
        warn!("instance '{}' has no vehicles", instance.id);
    } else if instance.total_demand() > instance.vehicles.total_capacity() {
        warn!(
            "instance '{}': total demand {} exceeds fleet capacity {}",
            instance.id,
            instance.total_demand(),
            instance.vehicles.total_capacity()
        );
    }
}
