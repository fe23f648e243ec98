//! Solution representation for the CVRP and its projection to the result payload.

use crate::problem::Problem;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A route driven by one vehicle.
///
/// `nodes` holds matrix indices and always starts with the depot (0). A closed
/// route also ends with the depot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// Id of the vehicle driving the route
    pub vehicle: i64,
    /// Node indices, 0 being the depot
    pub nodes: Vec<usize>,
    /// Sum of the demands of visited customers
    pub load: u32,
    /// Sum of consecutive edge costs
    pub distance: f64,
}

impl Route {
    /// Open a new route at the depot for the given vehicle.
    pub fn open(vehicle: i64) -> Self {
        Route {
            vehicle,
            nodes: vec![0],
            load: 0,
            distance: 0.0,
        }
    }

    /// The node the vehicle currently stands at.
    pub fn current_node(&self) -> usize {
        self.nodes.last().copied().unwrap_or(0)
    }

    /// Append a customer reached over an edge of length `edge`.
    pub fn visit(&mut self, node: usize, demand: u32, edge: f64) {
        self.nodes.push(node);
        self.load += demand;
        self.distance += edge;
    }

    /// Append the trip back to the depot.
    pub fn close(&mut self, edge: f64) {
        self.nodes.push(0);
        self.distance += edge;
    }

    /// Check if the route serves no customer.
    pub fn is_empty(&self) -> bool {
        self.customers().next().is_none()
    }

    /// Customer indices in visiting order.
    pub fn customers(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes.iter().copied().filter(|&n| n != 0)
    }

    /// Recompute the distance from scratch over the node sequence.
    pub fn calculate_distance(&self, problem: &Problem) -> f64 {
        self.nodes
            .iter()
            .tuple_windows()
            .map(|(&from, &to)| problem.get_distance(from, to))
            .sum()
    }

    /// Recompute the load from scratch over the visited customers.
    pub fn calculate_load(&self, problem: &Problem) -> u32 {
        self.customers().map(|c| problem.demand(c)).sum()
    }
}

/// A candidate solution produced by either engine.
///
/// Candidates are created whole and superseded, never updated in place.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    /// The list of routes
    pub routes: Vec<Route>,
    /// Total travel distance without penalties
    pub distance: f64,
    /// Whether the fleet limit holds and every customer is served
    pub is_feasible: bool,
    /// The ranking score (lower is better); distance plus penalties for the GA
    pub fitness: f64,
}

impl Solution {
    /// The degenerate result: no routes, zero distance, infeasible.
    pub fn empty() -> Self {
        Solution {
            routes: Vec::new(),
            distance: 0.0,
            is_feasible: false,
            fitness: 0.0,
        }
    }

    /// Number of vehicles used (one per route).
    pub fn vehicles_used(&self) -> usize {
        self.routes.len()
    }

    /// Project node indices to external ids and package the result payload.
    pub fn project(&self, problem: &Problem, log: Vec<String>, runtime_ms: u64) -> SolveResult {
        let routes = self
            .routes
            .iter()
            .map(|route| RoutePlan {
                vehicle: route.vehicle,
                nodes: route.nodes.iter().map(|&n| problem.external_id(n)).collect(),
                load: route.load,
                distance: route.distance,
            })
            .collect::<Vec<_>>();

        SolveResult {
            distance: self.distance,
            feasible: self.is_feasible,
            vehicles_used: routes.len(),
            routes,
            violations: Violations::default(),
            log,
            runtime_ms,
        }
    }
}

impl fmt::Debug for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Solution:")?;
        writeln!(f, "  Fitness: {:.2}", self.fitness)?;
        writeln!(f, "  Distance: {:.2}", self.distance)?;
        writeln!(f, "  Feasible: {}", self.is_feasible)?;
        writeln!(f, "  Routes: {}", self.routes.len())?;

        for (i, route) in self.routes.iter().enumerate() {
            writeln!(
                f,
                "  Route {} (vehicle {}): {:?} (Load: {}, Distance: {:.2})",
                i, route.vehicle, route.nodes, route.load, route.distance
            )?;
        }

        Ok(())
    }
}

/// A route expressed in external ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutePlan {
    pub vehicle: i64,
    pub nodes: Vec<i64>,
    pub load: u32,
    pub distance: f64,
}

/// Constraint violation counters.
///
/// Capacity is enforced while routes are built, so the counter stays zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Violations {
    pub capacity: u32,
}

/// The payload returned by both solve operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResult {
    pub distance: f64,
    pub feasible: bool,
    pub vehicles_used: usize,
    pub routes: Vec<RoutePlan>,
    pub violations: Violations,
    pub log: Vec<String>,
    pub runtime_ms: u64,
}
