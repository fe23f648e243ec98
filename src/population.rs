//! Population management for the genetic algorithm.

use crate::genetic::{Genetic, TOURNAMENT_SIZE};
use crate::individual::Individual;
use crate::problem::Problem;
use rand::seq::SliceRandom;
use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use std::cmp::Ordering;

/// One generation of individuals.
#[derive(Debug, Clone)]
pub struct Population {
    /// Individuals in insertion order; the elite comes first after a generation step
    pub individuals: Vec<Individual>,
    /// Target number of individuals
    pub size: usize,
}

impl Population {
    /// Create an empty population with the given target size (at least one).
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Population {
            individuals: Vec::with_capacity(size),
            size,
        }
    }

    /// Fill the population with random permutations of the customers.
    pub fn initialize<R: Rng>(&mut self, problem: &Problem, rng: &mut R) {
        let base_genes: Vec<usize> = (1..=problem.get_customer_count()).collect();

        let chromosomes = (0..self.size)
            .map(|_| {
                let mut chromosome = base_genes.clone();
                chromosome.shuffle(rng);
                chromosome
            })
            .collect();

        self.individuals = decode_all(chromosomes, problem);
    }

    /// Breed the next generation.
    ///
    /// The elite is carried over unchanged; every other slot gets a child of
    /// two tournament winners, crossed over and possibly mutated. All random
    /// draws happen before decoding, in selection, crossover, mutation order.
    pub fn next_generation<R: Rng>(
        &self,
        elite: &Individual,
        problem: &Problem,
        mutation_rate: f64,
        rng: &mut R,
    ) -> Population {
        let genetic = Genetic;
        let offspring_count = self.size.saturating_sub(1);
        let mut chromosomes = Vec::with_capacity(offspring_count);

        for _ in 0..offspring_count {
            let parent1 = genetic.tournament_select(&self.individuals, TOURNAMENT_SIZE, rng);
            let parent2 = genetic.tournament_select(&self.individuals, TOURNAMENT_SIZE, rng);

            let mut child = genetic.crossover(&parent1.chromosome, &parent2.chromosome, rng);
            genetic.maybe_mutate(&mut child, mutation_rate, rng);

            chromosomes.push(child);
        }

        let mut individuals = Vec::with_capacity(self.size);
        individuals.push(elite.clone());
        individuals.extend(decode_all(chromosomes, problem));

        Population {
            individuals,
            size: self.size,
        }
    }

    /// Get the individual with the lowest fitness (the first one on ties).
    pub fn get_best(&self) -> Option<&Individual> {
        self.individuals.iter().min_by(|a, b| {
            a.get_fitness()
                .partial_cmp(&b.get_fitness())
                .unwrap_or(Ordering::Equal)
        })
    }

    /// Get the current number of individuals.
    pub fn get_pop_size(&self) -> usize {
        self.individuals.len()
    }
}

#[cfg(not(feature = "parallel"))]
fn decode_all(chromosomes: Vec<Vec<usize>>, problem: &Problem) -> Vec<Individual> {
    chromosomes
        .into_iter()
        .map(|chromosome| Individual::new(chromosome, problem))
        .collect()
}

// Decoding is pure, so the result order and content match the sequential path.
#[cfg(feature = "parallel")]
fn decode_all(chromosomes: Vec<Vec<usize>>, problem: &Problem) -> Vec<Individual> {
    chromosomes
        .into_par_iter()
        .map(|chromosome| Individual::new(chromosome, problem))
        .collect()
}
