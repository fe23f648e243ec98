//! Genetic operators for the permutation-encoded CVRP.

use crate::individual::Individual;
use rand::seq::index;
use rand::Rng;
use std::collections::HashSet;

/// Number of contestants in a tournament.
pub const TOURNAMENT_SIZE: usize = 3;

/// Implements the genetic operators (selection, crossover, mutation).
///
/// Every operator draws from the caller's generator so that the order of
/// random draws is fixed by the search loop.
pub struct Genetic;

impl Genetic {
    /// Tournament selection: sample `k` individuals with replacement and keep
    /// the one with the lowest fitness (the first one on ties).
    ///
    /// # Panics
    /// Panics if the population is empty.
    pub fn tournament_select<'a, R: Rng>(
        &self,
        population: &'a [Individual],
        k: usize,
        rng: &mut R,
    ) -> &'a Individual {
        let mut best = &population[rng.gen_range(0..population.len())];

        for _ in 1..k {
            let candidate = &population[rng.gen_range(0..population.len())];
            if candidate.get_fitness() < best.get_fitness() {
                best = candidate;
            }
        }

        best
    }

    /// Perform ordered crossover (OX) between two parent chromosomes.
    ///
    /// The slice `[a, b)` of the first parent is kept in place; the remaining
    /// positions are filled from `b` onwards, wrapping around, with the genes
    /// of the second parent in their order of appearance.
    pub fn crossover<R: Rng>(&self, parent1: &[usize], parent2: &[usize], rng: &mut R) -> Vec<usize> {
        let n = parent1.len();
        if n < 2 {
            return parent1.to_vec();
        }

        let (a, b) = Self::cut_points(n, rng);

        let mut offspring: Vec<Option<usize>> = vec![None; n];
        let mut used = HashSet::with_capacity(n);

        for i in a..b {
            offspring[i] = Some(parent1[i]);
            used.insert(parent1[i]);
        }

        let mut pos = b;
        for &gene in parent2 {
            if used.contains(&gene) {
                continue;
            }
            if pos >= n {
                pos = 0;
            }
            offspring[pos] = Some(gene);
            used.insert(gene);
            pos += 1;
        }

        offspring.into_iter().flatten().collect()
    }

    /// Swap mutation: exchange the genes at two distinct random positions.
    pub fn mutate<R: Rng>(&self, chromosome: &mut [usize], rng: &mut R) {
        if chromosome.len() < 2 {
            return;
        }

        let (i, j) = Self::cut_points(chromosome.len(), rng);
        chromosome.swap(i, j);
    }

    /// Apply [`Genetic::mutate`] with probability `mutation_rate`.
    ///
    /// The probability draw happens even when the chromosome is too short to mutate.
    pub fn maybe_mutate<R: Rng>(&self, chromosome: &mut [usize], mutation_rate: f64, rng: &mut R) -> bool {
        if rng.gen::<f64>() < mutation_rate {
            self.mutate(chromosome, rng);
            true
        } else {
            false
        }
    }

    /// Two distinct positions in `0..n`, sorted ascending.
    fn cut_points<R: Rng>(n: usize, rng: &mut R) -> (usize, usize) {
        let picked = index::sample(rng, n, 2);
        let (x, y) = (picked.index(0), picked.index(1));
        if x < y {
            (x, y)
        } else {
            (y, x)
        }
    }
}
