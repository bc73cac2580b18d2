//! TOML model configuration.
//!
//! The configuration is read into the raw `*Config` structs exactly as written,
//! checked with [`check_consistency`], and only then turned into the validated
//! [`ModelSpec`] and [`DataGenerationSpec`] used by the generator.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::equation::{parse_rate_equation, RateEquation};
use crate::io::read_text;
use crate::validation::consistency::check_consistency;

use super::error::PetabError;

/// Condition identifier used for the single simulated experiment
pub const CONDITION_ID: &str = "condition1";
/// Dataset identifier attached to every measurement
pub const DATASET_ID: &str = "dataset1";
/// Noise parameter referenced by every observable's noise formula
pub const NOISE_PARAMETER: &str = "noiseParameter1";
/// Bounds used for parameters without explicit bounds
pub const DEFAULT_BOUNDS: [f64; 2] = [1e-3, 1e3];

/// Top level of the TOML file
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ModelConfig {
    pub model: ModelSection,
    #[serde(default)]
    pub simulation: SimulationSection,
}

/// The `[model]` table
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ModelSection {
    pub equations: Vec<String>,
    pub states: Vec<StateConfig>,
    #[serde(default)]
    pub parameters: Vec<ParameterConfig>,
    #[serde(default)]
    pub observables: Option<Vec<ObservableConfig>>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct StateConfig {
    pub name: String,
    pub initial_value: f64,
    #[serde(default)]
    pub estimate: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ParameterConfig {
    pub name: String,
    pub value: f64,
    #[serde(default)]
    pub bounds: Option<[f64; 2]>,
    #[serde(default)]
    pub scale: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ObservableConfig {
    pub name: String,
    pub formula: String,
    #[serde(default = "default_transformation")]
    pub transformation: String,
    #[serde(default = "default_noise_distribution")]
    pub noise_distribution: String,
}

/// The `[simulation]` table. Every key is optional.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SimulationSection {
    pub timespan: [f64; 2],
    pub n_timepoints: usize,
    pub noise_level: f64,
    pub random_seed: u64,
    pub output_dir: PathBuf,
    pub blind: bool,
}

impl Default for SimulationSection {
    fn default() -> Self {
        Self {
            timespan: [0.0, 10.0],
            n_timepoints: 100,
            noise_level: 0.05,
            random_seed: 42,
            output_dir: PathBuf::from("petab_problem"),
            blind: false,
        }
    }
}

fn default_transformation() -> String {
    Scale::Lin.to_string()
}

fn default_noise_distribution() -> String {
    NoiseDistribution::Normal.to_string()
}

/// Parameter scale or observable transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    Lin,
    Log,
    Log10,
}

impl Scale {
    /// True for scales that require strictly positive values
    pub fn is_logarithmic(&self) -> bool {
        matches!(self, Scale::Log | Scale::Log10)
    }
}

impl fmt::Display for Scale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scale::Lin => write!(f, "lin"),
            Scale::Log => write!(f, "log"),
            Scale::Log10 => write!(f, "log10"),
        }
    }
}

impl FromStr for Scale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lin" => Ok(Scale::Lin),
            "log" => Ok(Scale::Log),
            "log10" => Ok(Scale::Log10),
            other => Err(format!(
                "Unknown scale '{other}', expected one of lin, log, log10"
            )),
        }
    }
}

/// Noise distribution declared for an observable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseDistribution {
    Normal,
    Laplace,
}

impl fmt::Display for NoiseDistribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoiseDistribution::Normal => write!(f, "normal"),
            NoiseDistribution::Laplace => write!(f, "laplace"),
        }
    }
}

impl FromStr for NoiseDistribution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(NoiseDistribution::Normal),
            "laplace" => Ok(NoiseDistribution::Laplace),
            other => Err(format!(
                "Unknown noise distribution '{other}', expected normal or laplace"
            )),
        }
    }
}

/// Bounds and scaling of an estimated parameter
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    pub lower: f64,
    pub upper: f64,
    pub scale: Scale,
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            lower: DEFAULT_BOUNDS[0],
            upper: DEFAULT_BOUNDS[1],
            scale: Scale::Log10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSpec {
    pub name: String,
    pub initial_value: f64,
    pub estimate: bool,
}

impl StateSpec {
    /// Parameter that carries the initial value when it is estimated
    pub fn init_parameter(&self) -> String {
        format!("init_{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterSpec {
    pub name: String,
    pub value: f64,
    pub bounds: ParameterBounds,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ObservableSpec {
    pub name: String,
    pub formula: String,
    pub transformation: Scale,
    pub noise_distribution: NoiseDistribution,
}

/// A validated ODE model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelSpec {
    pub states: Vec<StateSpec>,
    pub parameters: Vec<ParameterSpec>,
    /// One rate equation per state, in state order
    pub equations: Vec<RateEquation>,
    pub observables: Vec<ObservableSpec>,
}

impl ModelSpec {
    /// True parameter values by name
    pub fn parameter_values(&self) -> BTreeMap<String, f64> {
        self.parameters
            .iter()
            .map(|p| (p.name.clone(), p.value))
            .collect()
    }

    /// Initial values in state order
    pub fn initial_values(&self) -> Vec<f64> {
        self.states.iter().map(|s| s.initial_value).collect()
    }

    /// States whose initial value is estimated
    pub fn estimated_states(&self) -> impl Iterator<Item = &StateSpec> {
        self.states.iter().filter(|s| s.estimate)
    }
}

/// Settings for synthetic data generation and the PEtab export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataGenerationSpec {
    pub timespan: (f64, f64),
    pub n_timepoints: usize,
    pub noise_level: f64,
    pub random_seed: u64,
    pub output_dir: PathBuf,
    pub blind: bool,
    pub condition_id: String,
    pub dataset_id: String,
    pub noise_parameter: String,
}

impl ModelConfig {
    /// Parses a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, PetabError> {
        Ok(toml::from_str(content)?)
    }

    /// Validates the configuration and converts it into the generator's specs.
    ///
    /// # Errors
    ///
    /// Returns [`PetabError::InvalidConfig`] holding every issue found if the
    /// configuration has at least one error.
    pub fn into_spec(self) -> Result<(ModelSpec, DataGenerationSpec), PetabError> {
        let report = check_consistency(&self);
        for result in report.errors.iter() {
            log::debug!("{result}");
        }
        if !report.is_valid {
            return Err(PetabError::InvalidConfig(report));
        }

        let ModelConfig { model, simulation } = self;

        let states: Vec<StateSpec> = model
            .states
            .into_iter()
            .map(|s| StateSpec {
                name: s.name,
                initial_value: s.initial_value,
                estimate: s.estimate,
            })
            .collect();

        let parameters = model
            .parameters
            .into_iter()
            .map(|p| {
                let scale = match p.scale.as_deref() {
                    Some(raw) => raw.parse().map_err(PetabError::Config)?,
                    None => Scale::Log10,
                };
                let [lower, upper] = p.bounds.unwrap_or(DEFAULT_BOUNDS);

                Ok(ParameterSpec {
                    name: p.name,
                    value: p.value,
                    bounds: ParameterBounds {
                        lower,
                        upper,
                        scale,
                    },
                })
            })
            .collect::<Result<Vec<_>, PetabError>>()?;

        let mut by_state: BTreeMap<String, RateEquation> = model
            .equations
            .iter()
            .map(|raw| parse_rate_equation(raw).map(|eq| (eq.state.clone(), eq)))
            .collect::<Result<_, _>>()?;

        let equations = states
            .iter()
            .map(|s| {
                by_state
                    .remove(&s.name)
                    .ok_or_else(|| PetabError::Config(format!("No rate equation for '{}'", s.name)))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let observables = match model.observables {
            Some(observables) => observables
                .into_iter()
                .map(|o| {
                    Ok(ObservableSpec {
                        name: o.name,
                        formula: o.formula,
                        transformation: o.transformation.parse().map_err(PetabError::Config)?,
                        noise_distribution: o
                            .noise_distribution
                            .parse()
                            .map_err(PetabError::Config)?,
                    })
                })
                .collect::<Result<Vec<_>, PetabError>>()?,
            None => identity_observables(&states),
        };

        let data = DataGenerationSpec {
            timespan: (simulation.timespan[0], simulation.timespan[1]),
            n_timepoints: simulation.n_timepoints,
            noise_level: simulation.noise_level,
            random_seed: simulation.random_seed,
            output_dir: simulation.output_dir,
            blind: simulation.blind,
            condition_id: CONDITION_ID.to_string(),
            dataset_id: DATASET_ID.to_string(),
            noise_parameter: NOISE_PARAMETER.to_string(),
        };

        Ok((
            ModelSpec {
                states,
                parameters,
                equations,
                observables,
            },
            data,
        ))
    }
}

/// One `obs_<state>` observable per state with the state itself as formula.
pub fn identity_observables(states: &[StateSpec]) -> Vec<ObservableSpec> {
    states
        .iter()
        .map(|s| ObservableSpec {
            name: format!("obs_{}", s.name),
            formula: s.name.clone(),
            transformation: Scale::Lin,
            noise_distribution: NoiseDistribution::Normal,
        })
        .collect()
}

/// Reads, validates and converts a TOML model file.
///
/// # Arguments
///
/// * `path` - Path to the TOML file
///
/// # Returns
///
/// The validated model and data generation settings.
pub fn load_model_config(
    path: impl AsRef<Path>,
) -> Result<(ModelSpec, DataGenerationSpec), PetabError> {
    let content = read_text(path)?;
    ModelConfig::from_toml_str(&content)?.into_spec()
}
