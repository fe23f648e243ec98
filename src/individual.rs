//! Individual representation for the genetic algorithm population.

use crate::problem::Problem;
use crate::solution::Solution;
use crate::split::Split;
use std::cmp::Ordering;

/// An individual in the genetic algorithm population.
#[derive(Debug, Clone)]
pub struct Individual {
    /// Permutation of customer indices `1..=n`
    pub chromosome: Vec<usize>,
    /// The routes the chromosome decodes to
    pub solution: Solution,
    /// Vehicles needed beyond the fleet size
    pub extra_vehicles: usize,
}

impl Individual {
    /// Decode a chromosome into a new individual.
    pub fn new(chromosome: Vec<usize>, problem: &Problem) -> Self {
        let (solution, extra_vehicles) = Split::split(&chromosome, problem);
        Individual {
            chromosome,
            solution,
            extra_vehicles,
        }
    }

    /// Get the fitness (distance plus fleet overflow penalty).
    pub fn get_fitness(&self) -> f64 {
        self.solution.fitness
    }

    /// Get the raw travel distance.
    pub fn get_distance(&self) -> f64 {
        self.solution.distance
    }

    /// Check if the individual fits the fleet.
    pub fn is_feasible(&self) -> bool {
        self.solution.is_feasible
    }
}

impl PartialEq for Individual {
    fn eq(&self, other: &Self) -> bool {
        self.get_fitness() == other.get_fitness()
    }
}

impl PartialOrd for Individual {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.get_fitness().partial_cmp(&other.get_fitness())
    }
}
