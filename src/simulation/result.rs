//! Simulation Result Module
//!
//! [`SimulationResult`] stores the sampled trajectories of a simulation run and can
//! evaluate derived quantities (observables) along them.

use std::collections::{BTreeMap, HashMap};

use meval::{Context, Expr};
use serde::{Deserialize, Serialize};

use crate::equation::TIME_SYMBOL;

use super::error::SimulationError;

/// Time series indexed by species name
pub type TimeSeriesMapping = HashMap<String, Vec<f64>>;

/// Represents the result of a simulation.
///
/// # Fields
///
/// * `time` - Time points at which the trajectories were sampled
/// * `species` - Species names mapped to their values at each time point
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationResult {
    pub time: Vec<f64>,
    pub species: TimeSeriesMapping,
}

impl SimulationResult {
    /// Creates an empty result for the given time points.
    pub fn new(time: Vec<f64>) -> Self {
        Self {
            time,
            species: HashMap::new(),
        }
    }

    /// Adds the trajectory of a species.
    pub fn add_species(&mut self, species: String, values: Vec<f64>) {
        self.species.insert(species, values);
    }

    /// Returns the trajectory of a species.
    pub fn get_species(&self, species: &str) -> Result<&[f64], SimulationError> {
        self.species
            .get(species)
            .map(Vec::as_slice)
            .ok_or_else(|| SimulationError::UnknownSpecies(species.to_string()))
    }

    /// Evaluates an expression at every time point.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the evaluated quantity, used in error messages
    /// * `expr` - Compiled expression over species, parameters and `time`
    /// * `parameters` - Parameter values
    ///
    /// # Returns
    ///
    /// One value per time point, or a [`SimulationError::EvaluationError`] if the
    /// expression references an unknown symbol.
    pub fn evaluate(
        &self,
        name: &str,
        expr: &Expr,
        parameters: &BTreeMap<String, f64>,
    ) -> Result<Vec<f64>, SimulationError> {
        let mut context = Context::new();
        for (parameter, value) in parameters {
            context.var(parameter.as_str(), *value);
        }

        (0..self.time.len())
            .map(|i| {
                context.var(TIME_SYMBOL, self.time[i]);
                for (species, values) in self.species.iter() {
                    context.var(species.as_str(), values[i]);
                }

                expr.eval_with_context(&context)
                    .map_err(|err| SimulationError::EvaluationError {
                        target: name.to_string(),
                        message: err.to_string(),
                    })
            })
            .collect()
    }
}
