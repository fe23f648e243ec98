//! Integration tests for the full GA and Q-learning solve calls.

use cvrp_meta::api::{self, GaSolveRequest, RlSolveRequest};
use cvrp_meta::config::{GaParams, QParams};
use cvrp_meta::mock;
use cvrp_meta::problem::{Customer, Depot, Instance, Vehicle};
use cvrp_meta::q_learning::QLearning;
use cvrp_meta::solution::SolveResult;
use cvrp_meta::{solve_ga, solve_rl, GeneticAlgorithm};
use std::collections::HashSet;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

fn quick_ga() -> GaParams {
    GaParams::new().with_population_size(20).with_generations(30)
}

fn quick_rl() -> QParams {
    QParams::new().with_episodes(150)
}

/// Creates a roomy instance: 8 customers, three vehicles far above total demand.
fn create_roomy_instance() -> Instance {
    let customers = (0..8)
        .map(|i| {
            let angle = i as f64 * std::f64::consts::PI / 4.0;
            Customer::new(
                200 + i as i64,
                50.0 + 20.0 * angle.cos(),
                50.0 + 20.0 * angle.sin(),
                1 + (i % 3) as u32,
            )
        })
        .collect();

    Instance::new(
        "Roomy",
        Depot::new(99, 50.0, 50.0),
        customers,
        vec![Vehicle::new(1, 20), Vehicle::new(2, 20), Vehicle::new(3, 20)],
    )
}

fn single_customer_instance() -> Instance {
    Instance::new(
        "Single",
        Depot::new(0, 0.0, 0.0),
        vec![Customer::new(1, 10.0, 0.0, 5)],
        vec![Vehicle::new(0, 10)],
    )
}

fn two_customer_instance(capacities: &[u32]) -> Instance {
    Instance::new(
        "Pair",
        Depot::new(0, 0.0, 0.0),
        vec![
            Customer::new(1, 10.0, 0.0, 6),
            Customer::new(2, 0.0, 10.0, 6),
        ],
        capacities
            .iter()
            .enumerate()
            .map(|(i, &c)| Vehicle::new(i as i64, c))
            .collect(),
    )
}

/// Checks route shape, capacity and (when feasible) coverage.
fn assert_valid_result(result: &SolveResult, instance: &Instance) {
    let depot = instance.depot.id;
    let mut served = Vec::new();

    for route in &result.routes {
        assert_eq!(route.nodes.first(), Some(&depot));
        assert_eq!(route.nodes.last(), Some(&depot));

        let vehicle = instance
            .vehicles
            .vehicles
            .iter()
            .find(|v| v.id == route.vehicle)
            .expect("route uses a fleet vehicle");

        let customers: Vec<i64> = route.nodes[1..route.nodes.len() - 1].to_vec();
        let demand: u32 = customers
            .iter()
            .map(|id| instance.customers.iter().find(|c| c.id == *id).unwrap().demand)
            .sum();
        assert_eq!(demand, route.load);
        assert!(route.load <= vehicle.capacity);

        served.extend(customers);
    }

    assert_eq!(result.vehicles_used, result.routes.len());
    assert_eq!(result.violations.capacity, 0);

    let total: f64 = result.routes.iter().map(|r| r.distance).sum();
    if result.feasible {
        assert!((total - result.distance).abs() < 1e-6);

        let unique: HashSet<i64> = served.iter().copied().collect();
        assert_eq!(unique.len(), served.len(), "customer served twice");
        let expected: HashSet<i64> = instance.customers.iter().map(|c| c.id).collect();
        assert_eq!(unique, expected, "not every customer is served");
    }
}

fn without_runtime(mut result: SolveResult) -> SolveResult {
    result.runtime_ms = 0;
    result
}

#[test]
fn test_single_customer_both_engines() {
    let instance = single_customer_instance();

    for result in [solve_ga(&instance, &quick_ga()), solve_rl(&instance, &quick_rl())] {
        assert!(result.feasible);
        assert_eq!(result.routes.len(), 1);
        assert_eq!(result.routes[0].nodes, vec![0, 1, 0]);
        assert_eq!(result.routes[0].load, 5);
        assert!((result.routes[0].distance - 20.0).abs() < 1e-9);
        assert!((result.distance - 20.0).abs() < 1e-9);
    }
}

#[test]
fn test_two_customers_one_small_vehicle_is_infeasible() {
    let instance = two_customer_instance(&[10]);

    assert!(!solve_ga(&instance, &quick_ga()).feasible);
    assert!(!solve_rl(&instance, &quick_rl()).feasible);
}

#[test]
fn test_two_customers_two_vehicles_use_two_routes() {
    let instance = two_customer_instance(&[10, 10]);

    for result in [solve_ga(&instance, &quick_ga()), solve_rl(&instance, &quick_rl())] {
        assert!(result.feasible);
        assert_eq!(result.routes.len(), 2);
        assert_eq!(result.vehicles_used, 2);
        assert!((result.distance - 40.0).abs() < 1e-9);
        assert_valid_result(&result, &instance);
    }
}

#[test]
fn test_zero_vehicles_degenerate_result() {
    let mut instance = create_roomy_instance();
    instance.vehicles.vehicles.clear();

    for result in [solve_ga(&instance, &quick_ga()), solve_rl(&instance, &quick_rl())] {
        assert!(!result.feasible);
        assert_eq!(result.vehicles_used, 0);
        assert!(result.routes.is_empty());
        assert_eq!(result.distance, 0.0);
    }

    let rl = solve_rl(&instance, &quick_rl().with_episodes(2));
    assert_eq!(rl.log[0], "Episode 1: distance=inf, feasible=false");
}

#[test]
fn test_roomy_instance_is_solved_feasibly() {
    let instance = create_roomy_instance();

    let ga = solve_ga(&instance, &quick_ga());
    assert!(ga.feasible);
    assert_valid_result(&ga, &instance);

    // Pure exploration: some episode serves everyone, and feasible episodes rank first
    let rl = solve_rl(&instance, &QParams::default().with_epsilon(1.0));
    assert!(rl.feasible);
    assert_valid_result(&rl, &instance);
}

#[test]
fn test_mock_instances_keep_invariants() {
    for name in mock::MOCK_NAMES {
        let instance = mock::by_name(name, "unittest").unwrap();

        assert_valid_result(&solve_ga(&instance, &quick_ga()), &instance);
        assert_valid_result(
            &solve_rl(&instance, &quick_rl().with_epsilon(0.05)),
            &instance,
        );
    }
}

#[test]
fn test_ga_is_deterministic() {
    let instance = mock::tiny15("unittest");
    let params = quick_ga().with_seed("unittest");

    let first = without_runtime(solve_ga(&instance, &params));
    let second = without_runtime(solve_ga(&instance, &params));

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_rl_is_deterministic() {
    let instance = mock::tiny15("unittest");
    let params = quick_rl().with_seed("unittest").with_epsilon(0.05);

    let first = without_runtime(solve_rl(&instance, &params));
    let second = without_runtime(solve_rl(&instance, &params));

    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_ga_log_format() {
    let instance = create_roomy_instance();
    let result = solve_ga(&instance, &quick_ga().with_generations(25));

    // Init, generations 10 and 20, and the final generation
    assert_eq!(result.log.len(), 4);
    assert!(result.log[0].starts_with("Init: bestDistance="));
    assert!(result.log[1].starts_with("Generation 10: bestDistance="));
    assert!(result.log[2].starts_with("Generation 20: "));
    assert!(result.log[3].starts_with("Generation 25: "));
    assert!(result.log[3].ends_with("feasible=true"));
}

#[test]
fn test_rl_log_has_one_line_per_episode() {
    let instance = create_roomy_instance();
    let result = solve_rl(&instance, &quick_rl().with_episodes(12));

    assert_eq!(result.log.len(), 12);
    for (i, line) in result.log.iter().enumerate() {
        assert!(line.starts_with(&format!("Episode {}: distance=", i + 1)));
    }
}

#[test]
fn test_ga_best_fitness_never_increases() {
    let instance = mock::grid20("12345");
    let mut algorithm = GeneticAlgorithm::new(instance, quick_ga());
    algorithm.run();

    assert_eq!(algorithm.fitness_history.len(), 31);
    for pair in algorithm.fitness_history.windows(2) {
        assert!(pair[1] <= pair[0]);
    }

    let best = algorithm.best_individual.as_ref().unwrap();
    assert_eq!(Some(&best.get_fitness()), algorithm.fitness_history.last());
}

#[test]
fn test_rl_best_never_gets_worse() {
    let instance = mock::grid20("12345");
    let mut learner = QLearning::new(instance, quick_rl());
    learner.run();

    assert_eq!(learner.best_history.len(), 150);
    for pair in learner.best_history.windows(2) {
        let (prev_feasible, prev_distance) = pair[0];
        let (feasible, distance) = pair[1];
        assert!(feasible || !prev_feasible, "feasibility was lost");
        if feasible == prev_feasible {
            assert!(distance <= prev_distance);
        }
    }
    assert!(!learner.q_table.is_empty());
}

#[test]
fn test_cancelled_runs_stop_early() {
    let instance = create_roomy_instance();
    let cancel = Arc::new(AtomicBool::new(true));

    let mut ga = GeneticAlgorithm::new(instance.clone(), quick_ga());
    let result = ga.run_with_cancel(Some(cancel.clone()));
    assert!(ga.cancelled);
    assert_eq!(ga.generations_run, 0);
    assert_eq!(result.log.len(), 2);
    assert_eq!(result.log[1], "Cancelled after generation 0");
    assert_valid_result(&result, &instance);

    let mut rl = QLearning::new(instance, quick_rl());
    let result = rl.run_with_cancel(Some(cancel));
    assert!(rl.cancelled);
    assert_eq!(rl.episodes_run, 0);
    assert!(result.routes.is_empty());
    assert!(!result.feasible);
}

#[test]
fn test_unset_cancel_flag_changes_nothing() {
    let instance = create_roomy_instance();
    let cancel = Arc::new(AtomicBool::new(false));

    let plain = without_runtime(solve_ga(&instance, &quick_ga()));
    let mut ga = GeneticAlgorithm::new(instance, quick_ga());
    let flagged = without_runtime(ga.run_with_cancel(Some(cancel)));

    assert_eq!(plain, flagged);
}

#[test]
fn test_requests_fill_in_default_params() {
    let json = r#"{
        "instance": {
            "id": "req",
            "depot": {"id": 0, "x": 0.0, "y": 0.0},
            "customers": [{"id": 1, "x": 10.0, "y": 0.0, "demand": 5}],
            "vehicles": {"vehicles": [{"id": 0, "capacity": 10}]}
        },
        "params": {"episodes": 20, "epsilon": 0.2}
    }"#;

    let request: RlSolveRequest = api::from_json(json).unwrap();
    let params = request.params();
    assert_eq!(params.episodes, 20);
    assert_eq!(params.epsilon, 0.2);
    assert_eq!(params.alpha, 0.3);
    assert_eq!(params.bucket_size, 5);
    assert_eq!(params.seed, "12345");
    assert!(request.validate().is_ok());

    let result = request.solve();
    assert_eq!(result.log.len(), 20);
    assert!(result.feasible);

    let request: GaSolveRequest = api::from_json(&json.replace(
        r#""params": {"episodes": 20, "epsilon": 0.2}"#,
        r#""params": null"#,
    ))
    .unwrap();
    assert_eq!(request.params(), GaParams::default());
    assert!(request.solve().feasible);
}

#[test]
fn test_request_validation_rejects_bad_params() {
    let request = RlSolveRequest::new(
        single_customer_instance(),
        Some(QParams::default().with_alpha(0.0)),
    );
    assert!(request.validate().is_err());

    let request = GaSolveRequest::new(
        single_customer_instance(),
        Some(GaParams::default().with_mutation_rate(1.5)),
    );
    assert!(request.validate().is_err());
}

#[test]
fn test_ga_runs_twice_from_scratch() {
    let params = quick_ga().with_generations(12);
    let mut algorithm = GeneticAlgorithm::new(mock::tiny15("rerun"), params);

    let first = without_runtime(algorithm.run());
    let history = algorithm.fitness_history.clone();
    let second = without_runtime(algorithm.run());

    assert_eq!(first, second);
    assert_eq!(algorithm.fitness_history, history);
    assert_eq!(algorithm.generations_run, 12);
}

#[test]
fn test_rl_runs_twice_from_scratch() {
    let params = QParams::new().with_episodes(5);
    let mut learner = QLearning::new(mock::tiny15("rerun"), params);

    let first = without_runtime(learner.run());
    let states = learner.q_table.state_count();
    let second = without_runtime(learner.run());

    assert_eq!(second.log.len(), 5);
    assert_eq!(first, second);
    assert_eq!(learner.q_table.state_count(), states);
    assert_eq!(learner.best_history.len(), 5);
}

#[test]
fn test_cancelled_run_does_not_leak_into_next_run() {
    let instance = create_roomy_instance();
    let mut ga = GeneticAlgorithm::new(instance, quick_ga());

    ga.run_with_cancel(Some(Arc::new(AtomicBool::new(true))));
    assert!(ga.cancelled);

    let result = without_runtime(ga.run());
    assert!(!ga.cancelled);
    assert_eq!(result, without_runtime(solve_ga(&create_roomy_instance(), &quick_ga())));
}

#[test]
fn test_ga_without_vehicles_logs_empty_solution() {
    let mut instance = create_roomy_instance();
    instance.vehicles.vehicles.clear();

    let mut algorithm = GeneticAlgorithm::new(instance, quick_ga());
    let result = algorithm.run();

    assert_eq!(
        result.log,
        vec!["No vehicles available: returning an empty solution".to_string()]
    );
    assert!(algorithm.best_individual.is_none());
    assert!(algorithm.population.individuals.is_empty());
    assert!(algorithm.fitness_history.is_empty());
}
