//! Request payloads of the two solve operations.
//!
//! These mirror the JSON contract: an instance plus optional engine
//! parameters, where missing parameters take their defaults.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::{GaParams, QParams};
use crate::problem::Instance;
use crate::solution::SolveResult;
use crate::{solve_ga, solve_rl};

/// `{instance, params?}` for the genetic algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaSolveRequest {
    pub instance: Instance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<GaParams>,
}

impl GaSolveRequest {
    pub fn new(instance: Instance, params: Option<GaParams>) -> Self {
        GaSolveRequest { instance, params }
    }

    /// The effective parameters.
    pub fn params(&self) -> GaParams {
        self.params.clone().unwrap_or_default()
    }

    /// Validate the instance and the effective parameters.
    pub fn validate(&self) -> Result<()> {
        self.instance.validate().context("invalid instance")?;
        self.params().validate().context("invalid GA parameters")
    }

    pub fn solve(&self) -> SolveResult {
        solve_ga(&self.instance, &self.params())
    }
}

/// `{instance, params?}` for Q-learning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RlSolveRequest {
    pub instance: Instance,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<QParams>,
}

impl RlSolveRequest {
    pub fn new(instance: Instance, params: Option<QParams>) -> Self {
        RlSolveRequest { instance, params }
    }

    /// The effective parameters.
    pub fn params(&self) -> QParams {
        self.params.clone().unwrap_or_default()
    }

    /// Validate the instance and the effective parameters.
    pub fn validate(&self) -> Result<()> {
        self.instance.validate().context("invalid instance")?;
        self.params().validate().context("invalid Q-learning parameters")
    }

    pub fn solve(&self) -> SolveResult {
        solve_rl(&self.instance, &self.params())
    }
}

/// Parse a request from a JSON string.
pub fn from_json<T: DeserializeOwned>(json: &str) -> Result<T> {
    serde_json::from_str(json).context("cannot parse request")
}

/// Read a request from a JSON file.
pub fn from_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T> {
    let path = path.as_ref();
    let file = File::open(path)
        .with_context(|| format!("cannot open request file '{}'", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("cannot parse request file '{}'", path.display()))
}
