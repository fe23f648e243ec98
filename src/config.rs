//! Configuration parameters for the two solving engines.

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Configuration settings for the genetic algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GaParams {
    /// Number of individuals per generation
    pub population_size: usize,
    /// Number of generations to run
    pub generations: usize,
    /// Probability of applying swap mutation to a child
    pub mutation_rate: f64,
    /// Seed string all randomness is derived from
    pub seed: String,
}

impl Default for GaParams {
    fn default() -> Self {
        GaParams {
            population_size: 60,
            generations: 200,
            mutation_rate: 0.1,
            seed: "12345".to_string(),
        }
    }
}

impl GaParams {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        GaParams::default()
    }

    /// Set the population size.
    pub fn with_population_size(mut self, size: usize) -> Self {
        self.population_size = size;
        self
    }

    /// Set the number of generations.
    pub fn with_generations(mut self, generations: usize) -> Self {
        self.generations = generations;
        self
    }

    /// Set the mutation probability.
    pub fn with_mutation_rate(mut self, rate: f64) -> Self {
        self.mutation_rate = rate;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Reject parameter combinations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.population_size >= 1, "populationSize must be at least 1");
        ensure!(
            (0.0..=1.0).contains(&self.mutation_rate),
            "mutationRate must be in [0, 1]"
        );
        ensure!(!self.seed.trim().is_empty(), "seed must not be blank");
        Ok(())
    }
}

/// Configuration settings for the Q-learning engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QParams {
    /// Number of episodes to simulate
    pub episodes: usize,
    /// Learning rate (α)
    pub alpha: f64,
    /// Discount factor (γ)
    pub gamma: f64,
    /// Exploration rate (ε)
    pub epsilon: f64,
    /// Width of the capacity and remaining-customer buckets
    pub bucket_size: u32,
    /// Step limit of a single episode
    pub max_steps: usize,
    /// Seed string all randomness is derived from
    pub seed: String,
}

impl Default for QParams {
    fn default() -> Self {
        QParams {
            episodes: 200,
            alpha: 0.3,
            gamma: 0.9,
            epsilon: 0.1,
            bucket_size: 5,
            max_steps: 5000,
            seed: "12345".to_string(),
        }
    }
}

impl QParams {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        QParams::default()
    }

    /// Set the number of episodes.
    pub fn with_episodes(mut self, episodes: usize) -> Self {
        self.episodes = episodes;
        self
    }

    /// Set the learning rate.
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set the discount factor.
    pub fn with_gamma(mut self, gamma: f64) -> Self {
        self.gamma = gamma;
        self
    }

    /// Set the exploration rate.
    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Set the bucket size.
    pub fn with_bucket_size(mut self, size: u32) -> Self {
        self.bucket_size = size;
        self
    }

    /// Set the step limit per episode.
    pub fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    /// Set the seed.
    pub fn with_seed(mut self, seed: impl Into<String>) -> Self {
        self.seed = seed.into();
        self
    }

    /// Reject parameter combinations the engine cannot run with.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.episodes >= 1, "episodes must be at least 1");
        ensure!(
            self.alpha > 0.0 && self.alpha <= 1.0,
            "alpha must be in (0, 1]"
        );
        ensure!((0.0..=1.0).contains(&self.gamma), "gamma must be in [0, 1]");
        ensure!(
            (0.0..=1.0).contains(&self.epsilon),
            "epsilon must be in [0, 1]"
        );
        ensure!(self.bucket_size >= 1, "bucketSize must be at least 1");
        ensure!(self.max_steps >= 1, "maxSteps must be at least 1");
        ensure!(!self.seed.trim().is_empty(), "seed must not be blank");
        Ok(())
    }
}
