//! Reproducible demo instances.

use std::f64::consts::PI;

use anyhow::{bail, Result};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::problem::{Customer, Depot, Instance, Vehicle};
use crate::utils::create_rng;

/// Names accepted by [`by_name`].
pub const MOCK_NAMES: [&str; 2] = ["tiny15", "grid20"];

/// Build a mock instance by name.
pub fn by_name(name: &str, seed: &str) -> Result<Instance> {
    match name {
        "tiny15" => Ok(tiny15(seed)),
        "grid20" => Ok(grid20(seed)),
        other => bail!(
            "unknown mock instance '{}', expected one of: {}",
            other,
            MOCK_NAMES.join(", ")
        ),
    }
}

fn gaussian<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    mean + std_dev * z
}

/// Fifteen customers on a jittered ring around a central depot, four vehicles.
pub fn tiny15(seed: &str) -> Instance {
    let mut rng = create_rng(&format!("tiny15-{}", seed));
    let depot = Depot::new(0, 50.0, 50.0);
    let count = 15;

    let customers = (0..count)
        .map(|i| {
            let angle = 2.0 * PI * i as f64 / count as f64;
            let radius = 18.0 + rng.gen_range(0.0..8.0);
            let x = depot.x + angle.cos() * radius + gaussian(&mut rng, 0.0, 0.8);
            let y = depot.y + angle.sin() * radius + gaussian(&mut rng, 0.0, 0.8);
            let demand = 5 + rng.gen_range(0..6);
            Customer::new(i as i64 + 1, x, y, demand)
        })
        .collect();

    let vehicles = vec![
        Vehicle::new(0, 42),
        Vehicle::new(1, 38),
        Vehicle::new(2, 40),
        Vehicle::new(3, 36),
    ];

    Instance::new("tiny15", depot, customers, vehicles)
}

/// Twenty customers on a jittered 5x4 grid, five vehicles.
pub fn grid20(seed: &str) -> Instance {
    let mut rng = create_rng(&format!("grid20-{}", seed));
    let depot = Depot::new(0, 25.0, 25.0);
    let (columns, rows, spacing) = (5, 4, 10.0);

    let mut customers = Vec::with_capacity(columns * rows);
    for r in 0..rows {
        for c in 0..columns {
            let id = (r * columns + c + 1) as i64;
            let x = 10.0 + c as f64 * spacing + gaussian(&mut rng, 0.0, 0.5);
            let y = 10.0 + r as f64 * spacing + gaussian(&mut rng, 0.0, 0.5);
            let demand = 4 + rng.gen_range(0..6);
            customers.push(Customer::new(id, x, y, demand));
        }
    }

    let vehicles = vec![
        Vehicle::new(0, 36),
        Vehicle::new(1, 40),
        Vehicle::new(2, 34),
        Vehicle::new(3, 38),
        Vehicle::new(4, 42),
    ];

    Instance::new("grid20", depot, customers, vehicles)
}
