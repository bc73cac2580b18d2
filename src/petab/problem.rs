//! Generation and export of complete PEtab problems.
//!
//! [`PetabProblem::generate`] simulates the model with its true values and builds
//! every table in memory. [`PetabProblem::write`] exports them into a directory:
//!
//! ```text
//! <output_dir>/
//! ├── measurements.tsv
//! ├── parameters.tsv
//! ├── observables.tsv
//! ├── conditions.tsv
//! ├── problem.yaml
//! ├── model.ant
//! ├── model.xml          (feature `sbml`)
//! └── true_values.json   (blind problems only)
//! ```
//!
//! `problem.yaml` only lists `model.xml` when it is actually written.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::io::{write_document, IOError};
use crate::simulation::result::SimulationResult;
use crate::simulation::setup::SimulationSetupBuilder;
use crate::simulation::system::ODESystem;

use super::antimony::to_antimony;
use super::config::{load_model_config, DataGenerationSpec, ModelSpec};
use super::error::PetabError;
use super::tables::{
    condition_table, measurement_table, observable_table, parameter_table, write_tsv,
    ConditionTable, MeasurementRow, ObservableRow, ParameterRow,
};

pub const MEASUREMENT_FILE: &str = "measurements.tsv";
pub const PARAMETER_FILE: &str = "parameters.tsv";
pub const OBSERVABLE_FILE: &str = "observables.tsv";
pub const CONDITION_FILE: &str = "conditions.tsv";
pub const PROBLEM_FILE: &str = "problem.yaml";
pub const ANTIMONY_FILE: &str = "model.ant";
pub const SBML_FILE: &str = "model.xml";
/// Whether [`PetabProblem::write`] exports the SBML model
pub const WRITES_SBML: bool = cfg!(feature = "sbml");
pub const TRUE_VALUES_FILE: &str = "true_values.json";

/// PEtab format version written to `problem.yaml`
pub const FORMAT_VERSION: u32 = 1;

/// A generated PEtab problem held in memory
#[derive(Debug, Clone)]
pub struct PetabProblem {
    pub model: ModelSpec,
    pub data: DataGenerationSpec,
    /// Noise free trajectories the measurements were drawn from
    pub simulation: SimulationResult,
    pub measurements: Vec<MeasurementRow>,
    pub parameters: Vec<ParameterRow>,
    pub observables: Vec<ObservableRow>,
    pub conditions: ConditionTable,
    /// Antimony text as exported; hides true values in blind mode
    pub antimony: String,
    /// Present only for blind problems
    pub true_values: Option<TrueValues>,
}

/// Values hidden from a blind problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrueValues {
    pub parameters: BTreeMap<String, f64>,
    pub initial_conditions: BTreeMap<String, f64>,
}

/// Contents of `problem.yaml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemFile {
    pub format_version: u32,
    pub parameter_file: String,
    pub problems: Vec<ProblemFiles>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemFiles {
    pub condition_files: Vec<String>,
    pub measurement_files: Vec<String>,
    pub observable_files: Vec<String>,
    pub sbml_files: Vec<String>,
}

impl ProblemFile {
    /// Index of the exported files. `sbml_files` stays empty unless `with_sbml` is set.
    pub fn new(with_sbml: bool) -> Self {
        let sbml_files = if with_sbml {
            vec![SBML_FILE.to_string()]
        } else {
            vec![]
        };

        Self {
            format_version: FORMAT_VERSION,
            parameter_file: PARAMETER_FILE.to_string(),
            problems: vec![ProblemFiles {
                condition_files: vec![CONDITION_FILE.to_string()],
                measurement_files: vec![MEASUREMENT_FILE.to_string()],
                observable_files: vec![OBSERVABLE_FILE.to_string()],
                sbml_files,
            }],
        }
    }
}

impl PetabProblem {
    /// Simulates the model and builds all PEtab tables.
    ///
    /// # Arguments
    ///
    /// * `model` - The validated model
    /// * `data` - Time span, noise and export settings
    ///
    /// # Errors
    ///
    /// Returns a [`PetabError`] if the simulation setup is invalid, the integration
    /// fails or an observable cannot be evaluated.
    pub fn generate(model: ModelSpec, data: DataGenerationSpec) -> Result<Self, PetabError> {
        let setup = SimulationSetupBuilder::default()
            .t0(data.timespan.0)
            .t1(data.timespan.1)
            .n_timepoints(data.n_timepoints)
            .build()
            .map_err(|err| PetabError::Config(err.to_string()))?;

        let system = ODESystem::new(&model.equations, &model.parameter_values())?;
        let simulation = system.integrate(&setup, &model.initial_values())?;

        let measurements = measurement_table(&model, &data, &simulation)?;
        let parameters = parameter_table(&model, &data);
        let observables = observable_table(&model, &data);
        let conditions = condition_table(&model, &data);
        let antimony = to_antimony(&model, &data, false);

        let true_values = data.blind.then(|| TrueValues {
            parameters: model.parameter_values(),
            initial_conditions: model
                .estimated_states()
                .map(|s| (s.name.clone(), s.initial_value))
                .collect(),
        });

        Ok(Self {
            model,
            data,
            simulation,
            measurements,
            parameters,
            observables,
            conditions,
            antimony,
            true_values,
        })
    }

    /// Writes all files of the problem into `dir`, creating it if necessary.
    pub fn write(&self, dir: impl AsRef<Path>) -> Result<(), PetabError> {
        let dir = dir.as_ref();
        std::fs::create_dir_all(dir).map_err(|source| IOError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        write_tsv(dir.join(MEASUREMENT_FILE), &self.measurements)?;
        write_tsv(dir.join(PARAMETER_FILE), &self.parameters)?;
        write_tsv(dir.join(OBSERVABLE_FILE), &self.observables)?;
        self.conditions.write(dir.join(CONDITION_FILE))?;

        let problem = serde_yaml::to_string(&ProblemFile::new(WRITES_SBML))?;
        write_document(dir.join(PROBLEM_FILE), &problem)?;
        write_document(dir.join(ANTIMONY_FILE), &self.antimony)?;

        if let Some(true_values) = &self.true_values {
            write_document(dir.join(TRUE_VALUES_FILE), &to_pretty_json(true_values)?)?;
        }

        #[cfg(feature = "sbml")]
        {
            let xml = crate::sbml::writer::to_sbml(&self.model, &self.data);
            write_document(dir.join(SBML_FILE), &xml)?;
        }

        #[cfg(not(feature = "sbml"))]
        log::warn!(
            "Built without the `sbml` feature, {} is not written and {} lists no SBML model",
            dir.join(SBML_FILE).display(),
            PROBLEM_FILE
        );

        log::info!("PEtab problem written to {}", dir.display());
        Ok(())
    }
}

/// Reads a TOML model, generates the problem and writes it to the configured
/// output directory.
pub fn generate_from_toml(path: impl AsRef<Path>) -> Result<PetabProblem, PetabError> {
    let (model, data) = load_model_config(path)?;
    let problem = PetabProblem::generate(model, data)?;
    problem.write(&problem.data.output_dir)?;
    Ok(problem)
}

fn to_pretty_json<T: Serialize>(value: &T) -> Result<String, PetabError> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}
