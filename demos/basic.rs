//! Basic example of using the CVRP-Meta library.

use cvrp_meta::config::{GaParams, QParams};
use cvrp_meta::mock;
use cvrp_meta::problem::Instance;
use cvrp_meta::utils::{format_route, save_result};
use cvrp_meta::{solve_ga, solve_rl};
use std::env;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Get instance path from command line or use a mock instance
    let args: Vec<String> = env::args().collect();
    let instance = if args.len() > 1 {
        println!("Loading instance from: {}", args[1]);
        Instance::from_file(&args[1])?
    } else {
        mock::grid20("12345")
    };
    instance.validate()?;
    println!(
        "Loaded instance: {} with {} customers and {} vehicles",
        instance.id,
        instance.customers.len(),
        instance.vehicles.count()
    );

    let ga_params = GaParams::new()
        .with_population_size(60)
        .with_generations(200)
        .with_mutation_rate(0.1)
        .with_seed("12345");
    let ga = solve_ga(&instance, &ga_params);

    let rl_params = QParams::new()
        .with_episodes(300)
        .with_epsilon(0.1)
        .with_seed("12345");
    let rl = solve_rl(&instance, &rl_params);

    for (name, result) in [("GA", &ga), ("Q-learning", &rl)] {
        println!(
            "{}: distance {:.2}, feasible {}, {} vehicles, {} ms",
            name, result.distance, result.feasible, result.vehicles_used, result.runtime_ms
        );
        for route in &result.routes {
            println!("  {}", format_route(route));
        }
    }

    let output_path = format!("{}.sol", instance.id);
    println!("Saving GA solution to: {}", output_path);
    save_result(&ga, &instance.id, &output_path)?;

    Ok(())
}
