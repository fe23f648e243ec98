//! A single Q-learning episode: one sequential pass of the fleet over the customers.

use std::collections::BTreeSet;

use rand::Rng;

use crate::config::QParams;
use crate::problem::Problem;
use crate::q_learning::q_table::{Action, QTable, State, StateEncoder};
use crate::solution::{Route, Solution};

/// Route-building state of the running episode.
struct Walker {
    /// Customers not yet served, iterated in ascending index order
    unserved: BTreeSet<usize>,
    /// Closed routes that carry load
    routes: Vec<Route>,
    /// Distance accrued over the whole episode
    total_distance: f64,
    /// Position of the active vehicle in the fleet
    vehicle_idx: usize,
    /// Capacity left on the active vehicle
    remaining_capacity: u32,
    /// The route being built
    route: Route,
}

impl Walker {
    /// Start at the depot with the first vehicle. The fleet must not be empty.
    fn new(problem: &Problem) -> Self {
        let first = problem.vehicle(0);
        Walker {
            unserved: (1..=problem.get_customer_count()).collect(),
            routes: Vec::new(),
            total_distance: 0.0,
            vehicle_idx: 0,
            remaining_capacity: first.capacity,
            route: Route::open(first.id),
        }
    }

    fn current_node(&self) -> usize {
        self.route.current_node()
    }

    fn at_depot(&self) -> bool {
        self.current_node() == 0
    }

    /// Unserved customers that fit, then the way home when away from the depot.
    fn legal_actions(&self, problem: &Problem) -> Vec<Action> {
        let mut actions: Vec<Action> = self
            .unserved
            .iter()
            .copied()
            .filter(|&c| problem.demand(c) <= self.remaining_capacity)
            .map(Action::Visit)
            .collect();

        if !self.at_depot() {
            actions.push(Action::ReturnToDepot);
        }

        actions
    }

    fn state(&self, encoder: &StateEncoder) -> State {
        encoder.encode(
            self.current_node(),
            self.remaining_capacity,
            self.unserved.len(),
            self.vehicle_idx,
        )
    }

    /// Drive home without learning and keep the route if it carries load.
    fn force_return(&mut self, problem: &Problem) {
        if !self.at_depot() {
            let back = problem.get_distance(self.current_node(), 0);
            self.route.close(back);
            self.total_distance += back;
        }

        if self.route.load > 0 {
            let vehicle = self.route.vehicle;
            let closed = std::mem::replace(&mut self.route, Route::open(vehicle));
            self.routes.push(closed);
        }
    }

    /// Switch to the next vehicle; false when the fleet is exhausted.
    fn next_vehicle(&mut self, problem: &Problem) -> bool {
        self.vehicle_idx += 1;
        if self.vehicle_idx >= problem.vehicle_count() {
            return false;
        }

        let vehicle = problem.vehicle(self.vehicle_idx);
        self.remaining_capacity = vehicle.capacity;
        self.route = Route::open(vehicle.id);
        true
    }

    /// Apply an action, returning the reward and whether the episode ended.
    fn apply(&mut self, action: Action, problem: &Problem) -> (f64, bool) {
        match action {
            Action::Visit(customer) => {
                let edge = problem.get_distance(self.current_node(), customer);
                let demand = problem.demand(customer);
                self.route.visit(customer, demand, edge);
                self.total_distance += edge;
                self.remaining_capacity -= demand;
                self.unserved.remove(&customer);
                (-edge, false)
            }
            Action::ReturnToDepot => {
                let back = problem.get_distance(self.current_node(), 0);
                self.route.close(back);
                self.total_distance += back;

                let vehicle = self.route.vehicle;
                let closed = std::mem::replace(&mut self.route, Route::open(vehicle));
                self.routes.push(closed);

                let terminal = self.unserved.is_empty() || !self.next_vehicle(problem);
                (-back, terminal)
            }
        }
    }

    fn finish(self) -> Solution {
        Solution {
            routes: self.routes,
            distance: self.total_distance,
            is_feasible: self.unserved.is_empty(),
            fitness: self.total_distance,
        }
    }
}

/// Epsilon-greedy choice among the legal actions, ties broken uniformly.
///
/// `actions` must not be empty.
pub fn select_action<R: Rng>(
    q_table: &QTable,
    state: State,
    actions: &[Action],
    epsilon: f64,
    rng: &mut R,
) -> Action {
    if rng.gen::<f64>() < epsilon {
        return actions[rng.gen_range(0..actions.len())];
    }

    let best = q_table.best_actions(state, actions);
    best[rng.gen_range(0..best.len())]
}

/// Run one episode, learning into `q_table` as it goes.
///
/// Returns `None` when the fleet is empty and nothing can be simulated.
pub fn run_episode<R: Rng>(
    problem: &Problem,
    q_table: &mut QTable,
    params: &QParams,
    rng: &mut R,
) -> Option<Solution> {
    if problem.vehicle_count() == 0 {
        return None;
    }

    let encoder = StateEncoder::new(params.bucket_size);
    let mut walker = Walker::new(problem);
    let mut steps = 0;

    while steps < params.max_steps {
        steps += 1;

        let actions = walker.legal_actions(problem);

        if actions.is_empty() {
            walker.force_return(problem);
            if !walker.next_vehicle(problem) {
                break;
            }
            continue;
        }

        let state = walker.state(&encoder);
        q_table.ensure(state, &actions);

        let mut action = select_action(q_table, state, &actions, params.epsilon, rng);

        // Unreachable while the depot action is only offered away from the depot.
        if action == Action::ReturnToDepot && walker.at_depot() {
            let visits: Vec<Action> = actions
                .iter()
                .copied()
                .filter(|a| matches!(a, Action::Visit(_)))
                .collect();
            if !visits.is_empty() {
                action = visits[rng.gen_range(0..visits.len())];
            }
        }

        let (reward, terminal) = walker.apply(action, problem);

        let target = if terminal {
            reward
        } else {
            let next_actions = walker.legal_actions(problem);
            if next_actions.is_empty() {
                reward
            } else {
                let next_state = walker.state(&encoder);
                q_table.ensure(next_state, &next_actions);
                reward + params.gamma * q_table.best_value(next_state, &next_actions)
            }
        };

        q_table.update(state, action, target, params.alpha);

        if terminal {
            break;
        }
    }

    Some(walker.finish())
}
