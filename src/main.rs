//! Command line runner for the CVRP solvers.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use cvrp_meta::api::{self, GaSolveRequest, RlSolveRequest};
use cvrp_meta::config::{GaParams, QParams};
use cvrp_meta::mock;
use cvrp_meta::problem::Instance;
use cvrp_meta::solution::SolveResult;
use cvrp_meta::utils::{format_route, save_result};

#[derive(Parser)]
#[command(name = "cvrp-meta", version, about = "Solve CVRP instances with a GA or Q-learning")]
struct Cli {
    #[command(subcommand)]
    engine: Engine,
}

#[derive(Subcommand)]
enum Engine {
    /// Genetic algorithm
    Ga(GaArgs),
    /// Tabular Q-learning
    Rl(RlArgs),
}

#[derive(Args)]
struct InputArgs {
    /// Instance JSON file
    #[arg(long, conflicts_with = "request")]
    instance: Option<PathBuf>,
    /// Built-in mock instance used when no file is given (tiny15, grid20)
    #[arg(long, default_value = "tiny15")]
    mock: String,
    /// Full request JSON file ({instance, params?})
    #[arg(long)]
    request: Option<PathBuf>,
    /// Random seed
    #[arg(long)]
    seed: Option<String>,
    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
    /// Also write a text report to this file
    #[arg(long)]
    output: Option<PathBuf>,
}

impl InputArgs {
    fn load_instance(&self) -> Result<Instance> {
        match &self.instance {
            Some(path) => Instance::from_file(path),
            None => mock::by_name(&self.mock, self.seed.as_deref().unwrap_or("12345")),
        }
    }
}

#[derive(Args)]
struct GaArgs {
    #[command(flatten)]
    input: InputArgs,
    #[arg(long)]
    population_size: Option<usize>,
    #[arg(long)]
    generations: Option<usize>,
    #[arg(long)]
    mutation_rate: Option<f64>,
}

impl GaArgs {
    fn into_request(self) -> Result<(GaSolveRequest, InputArgs)> {
        let mut request = match &self.input.request {
            Some(path) => api::from_file::<GaSolveRequest, _>(path)?,
            None => GaSolveRequest::new(self.input.load_instance()?, None),
        };

        let mut params: GaParams = request.params();
        if let Some(size) = self.population_size {
            params = params.with_population_size(size);
        }
        if let Some(generations) = self.generations {
            params = params.with_generations(generations);
        }
        if let Some(rate) = self.mutation_rate {
            params = params.with_mutation_rate(rate);
        }
        if let Some(seed) = &self.input.seed {
            params = params.with_seed(seed.clone());
        }
        request.params = Some(params);

        Ok((request, self.input))
    }
}

#[derive(Args)]
struct RlArgs {
    #[command(flatten)]
    input: InputArgs,
    #[arg(long)]
    episodes: Option<usize>,
    #[arg(long)]
    alpha: Option<f64>,
    #[arg(long)]
    gamma: Option<f64>,
    #[arg(long)]
    epsilon: Option<f64>,
    #[arg(long)]
    bucket_size: Option<u32>,
    #[arg(long)]
    max_steps: Option<usize>,
}

impl RlArgs {
    fn into_request(self) -> Result<(RlSolveRequest, InputArgs)> {
        let mut request = match &self.input.request {
            Some(path) => api::from_file::<RlSolveRequest, _>(path)?,
            None => RlSolveRequest::new(self.input.load_instance()?, None),
        };

        let mut params: QParams = request.params();
        if let Some(episodes) = self.episodes {
            params = params.with_episodes(episodes);
        }
        if let Some(alpha) = self.alpha {
            params = params.with_alpha(alpha);
        }
        if let Some(gamma) = self.gamma {
            params = params.with_gamma(gamma);
        }
        if let Some(epsilon) = self.epsilon {
            params = params.with_epsilon(epsilon);
        }
        if let Some(size) = self.bucket_size {
            params = params.with_bucket_size(size);
        }
        if let Some(steps) = self.max_steps {
            params = params.with_max_steps(steps);
        }
        if let Some(seed) = &self.input.seed {
            params = params.with_seed(seed.clone());
        }
        request.params = Some(params);

        Ok((request, self.input))
    }
}

fn report(result: &SolveResult, instance_id: &str, input: &InputArgs) -> Result<()> {
    if input.json {
        println!("{}", serde_json::to_string_pretty(result)?);
    } else {
        println!("Runtime: {} ms", result.runtime_ms);
        println!("Distance: {:.2}", result.distance);
        println!("Feasible: {}", result.feasible);
        println!("Vehicles used: {}", result.vehicles_used);
        for route in &result.routes {
            println!("{}", format_route(route));
        }
        for line in result.log.iter().take(5) {
            println!("log: {}", line);
        }
    }

    if let Some(path) = &input.output {
        save_result(result, instance_id, path)
            .with_context(|| format!("cannot write report to '{}'", path.display()))?;
        info!("Report written to {}", path.display());
    }

    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().engine {
        Engine::Ga(args) => {
            let (request, input) = args.into_request()?;
            request.validate()?;
            info!("Running GA on instance {}", request.instance.id);
            let result = request.solve();
            report(&result, &request.instance.id, &input)
        }
        Engine::Rl(args) => {
            let (request, input) = args.into_request()?;
            request.validate()?;
            info!("Running Q-learning on instance {}", request.instance.id);
            let result = request.solve();
            report(&result, &request.instance.id, &input)
        }
    }
}
