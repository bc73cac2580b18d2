//! Setup module for configuring ODE simulations.
//!
//! This module provides the [`SimulationSetup`] struct and its builder for configuring
//! the fixed-step integration used to generate synthetic data:
//!
//! - Time range specification (start and end times)
//! - Number of output time points
//! - Number of integrator steps between two output points

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use super::error::SimulationError;

/// Configuration for numerical integration of ODE systems
///
/// # Fields
///
/// * `t0` - Start time of the simulation (default: 0.0)
/// * `t1` - End time of the simulation (default: 10.0)
/// * `n_timepoints` - Number of equally spaced output points, including both ends (default: 100)
/// * `substeps` - Integrator steps per output interval (default: 10)
///
/// # Examples
///
/// ```
/// use petab_results::simulation::SimulationSetupBuilder;
///
/// let setup = SimulationSetupBuilder::default()
///     .t0(0.0)
///     .t1(5.0)
///     .n_timepoints(11)
///     .build()
///     .unwrap();
///
/// assert_eq!(setup.time_points().len(), 11);
/// ```
#[derive(Debug, Clone, Builder, Serialize, Deserialize, PartialEq)]
pub struct SimulationSetup {
    #[builder(default = "0.0")]
    pub t0: f64,
    #[builder(default = "10.0")]
    pub t1: f64,
    #[builder(default = "100")]
    pub n_timepoints: usize,
    #[builder(default = "10")]
    pub substeps: usize,
}

impl SimulationSetup {
    /// Checks that the setup describes a non-empty, forward time range.
    pub fn validate(&self) -> Result<(), SimulationError> {
        if !(self.t0.is_finite() && self.t1.is_finite()) || self.t0 >= self.t1 {
            return Err(SimulationError::InvalidSetup(format!(
                "time span [{}, {}] must be finite and increasing",
                self.t0, self.t1
            )));
        }

        if self.n_timepoints < 2 {
            return Err(SimulationError::InvalidSetup(format!(
                "at least two time points are required, got {}",
                self.n_timepoints
            )));
        }

        if self.substeps == 0 {
            return Err(SimulationError::InvalidSetup(
                "substeps must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Output time points, equally spaced from `t0` to `t1`.
    pub fn time_points(&self) -> Vec<f64> {
        let n = self.n_timepoints;
        if n < 2 {
            return vec![self.t0; n];
        }

        let step = (self.t1 - self.t0) / (n - 1) as f64;
        (0..n)
            .map(|i| if i == n - 1 { self.t1 } else { self.t0 + step * i as f64 })
            .collect()
    }

    /// Fixed step size handed to the integrator.
    pub fn step_size(&self) -> f64 {
        let intervals = self.n_timepoints.saturating_sub(1).max(1) * self.substeps.max(1);
        (self.t1 - self.t0) / intervals as f64
    }
}
