//! PEtab Results Library
//!
//! This library provides functionality for working with parameter estimation benchmark
//! results, including:
//! - Loading estimation results from CSV
//! - Selecting the best solution per model, noise level, estimator and interpolator
//! - Rendering the selections as LaTeX tables or console reports
//! - Generating synthetic PEtab problems from TOML model descriptions
//! - Validating model descriptions

#![warn(unused_imports)]

/// Commonly used types and functionality re-exported for convenience
pub mod prelude {
    pub use crate::io::*;
    pub use crate::report::*;
    pub use crate::results::*;
    pub use crate::selection::{select_best, Selection, SelectionError};

    #[cfg(feature = "simulation")]
    pub use crate::petab::{
        generate_from_toml, load_model_config, DataGenerationSpec, ModelSpec, PetabError,
        PetabProblem,
    };
    #[cfg(feature = "simulation")]
    pub use crate::simulation::result::*;
    #[cfg(feature = "simulation")]
    pub use crate::simulation::setup::*;
    #[cfg(feature = "simulation")]
    pub use crate::simulation::system::*;
}

/// Result rows and group keys
pub mod results;

/// Best-solution selection within a group of result rows
pub mod selection {
    pub use crate::selection::error::SelectionError;
    pub use crate::selection::selector::{select_best, Selection};

    /// Data integrity errors
    pub mod error;
    /// Cluster and solution selection
    pub mod selector;
}

/// Rendering of selections as reports
pub mod report {
    pub use crate::report::console::{render_console, ConsoleRenderer};
    pub use crate::report::driver::{render_report, RenderedReport};
    pub use crate::report::latex::{render_latex, LatexRenderer};
    pub use crate::report::renderer::{GroupContext, Renderer, Section};

    /// Plain text report for the terminal
    pub mod console;
    /// Grouping of rows and rendering of every group
    pub mod driver;
    /// LaTeX tables
    pub mod latex;
    /// Renderer interface shared by all output formats
    pub mod renderer;
}

/// Formula parsing and symbol extraction
pub mod equation;

/// Simulation of ODE models
#[cfg(feature = "simulation")]
pub mod simulation {
    pub use crate::simulation::setup::{SimulationSetup, SimulationSetupBuilder};
    pub use crate::simulation::system::ODESystem;

    /// Error types for simulation failures
    pub mod error;
    /// Interpolation functionality
    pub mod interpolation;
    /// Simulation result data structures
    pub mod result;
    /// Simulation setup and configuration
    pub mod setup;
    /// Core ODE system implementation
    pub mod system;
}

/// Synthetic PEtab problem generation
#[cfg(feature = "simulation")]
pub mod petab {
    pub use crate::petab::config::{load_model_config, DataGenerationSpec, ModelSpec};
    pub use crate::petab::error::PetabError;
    pub use crate::petab::problem::{generate_from_toml, PetabProblem};

    /// Antimony rendering
    pub mod antimony;
    /// TOML model configuration
    pub mod config;
    /// Error types for problem generation
    pub mod error;
    /// Problem generation and export
    pub mod problem;
    /// PEtab tables
    pub mod tables;
}

/// Validation of model configurations
#[cfg(feature = "simulation")]
pub mod validation {
    /// Main consistency interface
    pub mod consistency;
    /// Validation of rate equations
    mod equations;
    /// Validation of observables
    mod observables;
    /// Validation of parameters and states
    mod parameters;
    /// Validation of simulation settings
    mod settings;
}

/// SBML export
#[cfg(feature = "sbml")]
pub mod sbml {
    pub mod writer;
}

/// Display of generated problems
#[cfg(feature = "simulation")]
mod info;

/// IO functionality
pub mod io;
