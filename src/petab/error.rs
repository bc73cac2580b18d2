use thiserror::Error;

use crate::equation::EquationError;
use crate::io::IOError;
use crate::simulation::error::SimulationError;
use crate::validation::consistency::Report;

/// Errors raised while generating or writing a PEtab problem
#[derive(Error, Debug)]
pub enum PetabError {
    #[error(transparent)]
    Io(#[from] IOError),

    #[error("Failed to parse model configuration: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Invalid model configuration:\n{0}")]
    InvalidConfig(Report),

    #[error("Invalid model configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Equation(#[from] EquationError),

    #[error("Simulation failed: {0}")]
    Simulation(#[from] SimulationError),

    #[error("Cannot sample noise for observable '{observable}': {message}")]
    Noise { observable: String, message: String },

    #[error("Failed to write table: {0}")]
    Table(#[from] csv::Error),

    #[error("Failed to write problem file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to write true values: {0}")]
    Json(#[from] serde_json::Error),
}
