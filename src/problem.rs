//! Problem definition and data structures for CVRP.

use anyhow::{bail, ensure, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// The depot all routes start from and return to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Depot {
    pub id: i64,
    pub x: f64,
    pub y: f64,
}

impl Depot {
    pub fn new(id: i64, x: f64, y: f64) -> Self {
        Depot { id, x, y }
    }
}

/// A customer with a positive integer demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub x: f64,
    pub y: f64,
    pub demand: u32,
}

impl Customer {
    pub fn new(id: i64, x: f64, y: f64, demand: u32) -> Self {
        Customer { id, x, y, demand }
    }
}

/// A vehicle of the fleet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub capacity: u32,
}

impl Vehicle {
    pub fn new(id: i64, capacity: u32) -> Self {
        Vehicle { id, capacity }
    }
}

/// The ordered fleet. Vehicles are used in this order by both engines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VehiclesConfig {
    pub vehicles: Vec<Vehicle>,
}

impl VehiclesConfig {
    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        VehiclesConfig { vehicles }
    }

    /// Number of vehicles in the fleet.
    pub fn count(&self) -> usize {
        self.vehicles.len()
    }

    /// Sum of all capacities.
    pub fn total_capacity(&self) -> u64 {
        self.vehicles.iter().map(|v| v.capacity as u64).sum()
    }
}

/// A CVRP instance as exchanged over the JSON payload contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    pub id: String,
    pub depot: Depot,
    pub customers: Vec<Customer>,
    pub vehicles: VehiclesConfig,
}

impl Instance {
    /// Create a new instance.
    pub fn new(
        id: impl Into<String>,
        depot: Depot,
        customers: Vec<Customer>,
        vehicles: Vec<Vehicle>,
    ) -> Self {
        Instance {
            id: id.into(),
            depot,
            customers,
            vehicles: VehiclesConfig::new(vehicles),
        }
    }

    /// Load an instance from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("cannot open instance file '{}'", path.display()))?;
        serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("cannot parse instance file '{}'", path.display()))
    }

    /// Check the structural assumptions the solvers rely on.
    ///
    /// The solvers themselves accept any instance and report degenerate
    /// input through the feasibility flag; this is for callers at the boundary.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.customers.is_empty(),
            "instance '{}' has no customers",
            self.id
        );
        ensure!(
            !self.vehicles.vehicles.is_empty(),
            "instance '{}' has no vehicles",
            self.id
        );
        ensure!(
            self.depot.x.is_finite() && self.depot.y.is_finite(),
            "depot {} has non-finite coordinates",
            self.depot.id
        );

        let mut seen = HashSet::with_capacity(self.customers.len());
        for customer in &self.customers {
            ensure!(
                customer.x.is_finite() && customer.y.is_finite(),
                "customer {} has non-finite coordinates",
                customer.id
            );
            ensure!(customer.demand > 0, "customer {} has zero demand", customer.id);
            if !seen.insert(customer.id) {
                bail!("customer id {} is used more than once", customer.id);
            }
        }

        for vehicle in &self.vehicles.vehicles {
            ensure!(vehicle.capacity > 0, "vehicle {} has zero capacity", vehicle.id);
        }

        Ok(())
    }

    /// Sum of all customer demands.
    pub fn total_demand(&self) -> u64 {
        self.customers.iter().map(|c| c.demand as u64).sum()
    }

    /// Coordinates in matrix order: depot first, then customers.
    pub fn coordinates(&self) -> Vec<(f64, f64)> {
        std::iter::once((self.depot.x, self.depot.y))
            .chain(self.customers.iter().map(|c| (c.x, c.y)))
            .collect()
    }
}

/// Build the symmetric Euclidean distance matrix over the given coordinates.
///
/// Index 0 is the depot; index `k` is `customers[k - 1]`.
pub fn build_distance_matrix(coords: &[(f64, f64)]) -> Vec<Vec<f64>> {
    let n = coords.len();
    let mut matrix = vec![vec![0.0; n]; n];

    for i in 0..n {
        for j in (i + 1)..n {
            let (x1, y1) = coords[i];
            let (x2, y2) = coords[j];
            let d = (x1 - x2).hypot(y1 - y2);
            matrix[i][j] = d;
            matrix[j][i] = d;
        }
    }

    matrix
}

/// An instance together with its precomputed distance matrix.
///
/// Built once per solve call and shared read-only by the engine.
#[derive(Debug, Clone)]
pub struct Problem {
    pub instance: Instance,
    pub distance_matrix: Vec<Vec<f64>>,
}

impl Problem {
    /// Create a new problem, computing the distance matrix.
    pub fn new(instance: Instance) -> Self {
        let distance_matrix = build_distance_matrix(&instance.coordinates());
        Problem {
            instance,
            distance_matrix,
        }
    }

    /// Distance between two node indices.
    pub fn get_distance(&self, from: usize, to: usize) -> f64 {
        self.distance_matrix[from][to]
    }

    /// Number of customers (excluding the depot).
    pub fn get_customer_count(&self) -> usize {
        self.instance.customers.len()
    }

    /// Demand of the customer at node index `node` (must be >= 1).
    pub fn demand(&self, node: usize) -> u32 {
        self.instance.customers[node - 1].demand
    }

    /// Number of vehicles in the fleet.
    pub fn vehicle_count(&self) -> usize {
        self.instance.vehicles.count()
    }

    /// Vehicle at fleet position `index`.
    pub fn vehicle(&self, index: usize) -> &Vehicle {
        &self.instance.vehicles.vehicles[index]
    }

    /// External id of the node at matrix index `node`.
    pub fn external_id(&self, node: usize) -> i64 {
        if node == 0 {
            self.instance.depot.id
        } else {
            self.instance.customers[node - 1].id
        }
    }
}
