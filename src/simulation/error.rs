//! Simulation Error Module
//!
//! The [`SimulationError`] enum covers the failure points of a simulation run:
//! invalid setups, formulas that cannot be compiled or evaluated, and integrator
//! failures reported by `peroxide`.

use thiserror::Error;

use crate::equation::EquationError;

#[derive(Error, Debug)]
pub enum SimulationError {
    #[error("Error compiling equation: {0}")]
    EquationError(#[from] EquationError),
    #[error("Error evaluating '{target}': {message}")]
    EvaluationError { target: String, message: String },
    #[error("Invalid simulation setup: {0}")]
    InvalidSetup(String),
    #[error("Expected {expected} initial values, got {actual}")]
    InitialStateMismatch { expected: usize, actual: usize },
    #[error("ODE integration failed: {0}")]
    IntegrationError(String),
    #[error("Unknown species '{0}'")]
    UnknownSpecies(String),
}
