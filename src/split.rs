//! Greedy capacity split turning a chromosome into routes.

use crate::problem::Problem;
use crate::solution::{Route, Solution};

/// Fitness added per vehicle used beyond the fleet size.
pub const BIG_PENALTY: f64 = 10_000.0;

/// Implements the capacity-driven decoding of a giant tour.
pub struct Split;

impl Split {
    /// Split a chromosome (a permutation of customer indices `1..=n`) into routes.
    ///
    /// Customers are appended to the active vehicle in chromosome order; a route
    /// is closed as soon as the next customer does not fit. Running past the
    /// fleet reuses the last vehicle and counts the overflow.
    ///
    /// Returns the decoded solution and the number of extra vehicles.
    pub fn split(chromosome: &[usize], problem: &Problem) -> (Solution, usize) {
        let fleet_size = problem.vehicle_count();

        if fleet_size == 0 {
            let extra = chromosome.len();
            let mut solution = Solution::empty();
            solution.fitness = BIG_PENALTY * extra as f64;
            return (solution, extra);
        }

        let last_vehicle = fleet_size - 1;
        let mut routes = Vec::new();
        let mut total_distance = 0.0;
        let mut vehicle_idx = 0;
        let mut extra_vehicles = 0;
        let mut route = Route::open(problem.vehicle(0).id);

        for &customer in chromosome {
            let demand = problem.demand(customer);
            let capacity = problem.vehicle(vehicle_idx.min(last_vehicle)).capacity;
            // A lone oversized customer may already exceed capacity.
            let remaining = capacity as i64 - route.load as i64;

            if demand as i64 > remaining && !route.is_empty() {
                let back = problem.get_distance(route.current_node(), 0);
                route.close(back);
                total_distance += back;
                routes.push(route);

                vehicle_idx += 1;
                if vehicle_idx >= fleet_size {
                    extra_vehicles += 1;
                    vehicle_idx = last_vehicle;
                }

                route = Route::open(problem.vehicle(vehicle_idx).id);
            }

            let edge = problem.get_distance(route.current_node(), customer);
            route.visit(customer, demand, edge);
            total_distance += edge;
        }

        if !route.is_empty() {
            let back = problem.get_distance(route.current_node(), 0);
            route.close(back);
            total_distance += back;
            routes.push(route);
        }

        // Overflow is counted both in the loop and against the route count.
        let extra_total = extra_vehicles + routes.len().saturating_sub(fleet_size);

        let solution = Solution {
            routes,
            distance: total_distance,
            is_feasible: extra_total == 0,
            fitness: total_distance + BIG_PENALTY * extra_total as f64,
        };

        (solution, extra_total)
    }
}
