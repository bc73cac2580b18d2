//! PEtab tables.
//!
//! Every table is kept in memory as a vector of typed rows and written as a tab
//! separated file with the PEtab column names.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use crate::equation::compile;
use crate::simulation::result::SimulationResult;

use super::config::{
    DataGenerationSpec, ModelSpec, NoiseDistribution, Scale, DEFAULT_BOUNDS,
};
use super::error::PetabError;

/// Nominal value written for estimated quantities in blind mode
pub const BLIND_NOMINAL: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementRow {
    pub simulation_condition_id: String,
    pub measurement: f64,
    pub time: f64,
    pub observable_id: String,
    pub observable_parameters: String,
    pub noise_parameters: String,
    pub dataset_id: String,
    pub replicate_id: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterRow {
    pub parameter_id: String,
    pub parameter_scale: Scale,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub nominal_value: f64,
    /// `1` if the parameter is estimated, `0` if it is fixed
    pub estimate: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObservableRow {
    pub observable_id: String,
    pub observable_name: String,
    pub observable_formula: String,
    pub observable_transformation: Scale,
    pub noise_formula: String,
    pub noise_distribution: NoiseDistribution,
}

/// The condition table.
///
/// Besides the id and name, there is one column per estimated state whose value is
/// the `init_<state>` parameter, so the columns depend on the model.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConditionTable {
    pub condition_id: String,
    pub condition_name: String,
    /// `(state, parameter)` pairs in state order
    pub initial_values: Vec<(String, String)>,
}

impl ConditionTable {
    /// Column names in file order
    pub fn columns(&self) -> Vec<String> {
        let mut columns = vec!["conditionId".to_string(), "conditionName".to_string()];
        columns.extend(self.initial_values.iter().map(|(state, _)| state.clone()));
        columns
    }

    /// The single condition row in file order
    pub fn record(&self) -> Vec<String> {
        let mut record = vec![self.condition_id.clone(), self.condition_name.clone()];
        record.extend(
            self.initial_values
                .iter()
                .map(|(_, parameter)| parameter.clone()),
        );
        record
    }

    /// Writes the table as TSV.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<(), PetabError> {
        let mut writer = tsv_writer(path)?;
        writer.write_record(self.columns())?;
        writer.write_record(self.record())?;
        writer.flush().map_err(csv::Error::from)?;
        Ok(())
    }
}

/// Builds the noisy measurement table from a simulation.
///
/// Observables are evaluated along the simulated trajectories with the true
/// parameter values. Noise is drawn from a generator seeded with `random_seed`, one
/// observable after the other, so the same inputs always yield the same table.
///
/// # Errors
///
/// * [`PetabError::Equation`] if an observable formula does not parse
/// * [`PetabError::Simulation`] if an observable cannot be evaluated
/// * [`PetabError::Noise`] if noise cannot be applied, e.g. non-positive values of a
///   `log10` observable
pub fn measurement_table(
    model: &ModelSpec,
    data: &DataGenerationSpec,
    result: &SimulationResult,
) -> Result<Vec<MeasurementRow>, PetabError> {
    let parameters = model.parameter_values();
    let mut rng = StdRng::seed_from_u64(data.random_seed);
    let mut rows = Vec::with_capacity(model.observables.len() * result.time.len());

    for observable in model.observables.iter() {
        let expr = compile(&observable.formula)?;
        let values = result.evaluate(&observable.name, &expr, &parameters)?;
        let noisy = add_noise(
            &values,
            observable.transformation,
            data.noise_level,
            &mut rng,
        )
        .map_err(|message| PetabError::Noise {
            observable: observable.name.clone(),
            message,
        })?;

        rows.extend(
            result
                .time
                .iter()
                .zip(noisy)
                .map(|(time, measurement)| MeasurementRow {
                    simulation_condition_id: data.condition_id.clone(),
                    measurement,
                    time: *time,
                    observable_id: observable.name.clone(),
                    observable_parameters: String::new(),
                    noise_parameters: data.noise_parameter.clone(),
                    dataset_id: data.dataset_id.clone(),
                    replicate_id: 0,
                }),
        );
    }

    log::info!(
        "Generated {} measurements for {} observables",
        rows.len(),
        model.observables.len()
    );

    Ok(rows)
}

/// Adds Gaussian noise to a series.
///
/// `log10` series get N(0, `noise_level`) added to their decadic logarithm. All
/// other series get additive N(0, mean(|y|) * `noise_level`).
pub fn add_noise<R: Rng + ?Sized>(
    values: &[f64],
    transformation: Scale,
    noise_level: f64,
    rng: &mut R,
) -> Result<Vec<f64>, String> {
    match transformation {
        Scale::Log10 => {
            if let Some(value) = values.iter().find(|v| **v <= 0.0 || !v.is_finite()) {
                return Err(format!(
                    "log10 transformation requires positive values, got {value}"
                ));
            }
            let normal = Normal::new(0.0, noise_level).map_err(|err| err.to_string())?;
            Ok(values
                .iter()
                .map(|v| 10f64.powf(v.log10() + normal.sample(rng)))
                .collect())
        }
        _ => {
            let scale = if values.is_empty() {
                0.0
            } else {
                values.iter().map(|v| v.abs()).sum::<f64>() / values.len() as f64 * noise_level
            };
            let normal = Normal::new(0.0, scale).map_err(|err| err.to_string())?;
            Ok(values.iter().map(|v| v + normal.sample(rng)).collect())
        }
    }
}

/// Builds the parameter table.
///
/// Model parameters come first, then one `init_<state>` row per estimated state and
/// finally the fixed noise parameter.
pub fn parameter_table(model: &ModelSpec, data: &DataGenerationSpec) -> Vec<ParameterRow> {
    let nominal = |value: f64| if data.blind { BLIND_NOMINAL } else { value };

    let parameters = model.parameters.iter().map(|p| ParameterRow {
        parameter_id: p.name.clone(),
        parameter_scale: p.bounds.scale,
        lower_bound: p.bounds.lower,
        upper_bound: p.bounds.upper,
        nominal_value: nominal(p.value),
        estimate: 1,
    });

    let initials = model.estimated_states().map(|s| ParameterRow {
        parameter_id: s.init_parameter(),
        parameter_scale: Scale::Lin,
        lower_bound: DEFAULT_BOUNDS[0],
        upper_bound: DEFAULT_BOUNDS[1],
        nominal_value: nominal(s.initial_value),
        estimate: 1,
    });

    let noise = ParameterRow {
        parameter_id: data.noise_parameter.clone(),
        parameter_scale: Scale::Lin,
        lower_bound: data.noise_level,
        upper_bound: data.noise_level,
        nominal_value: data.noise_level,
        estimate: 0,
    };

    parameters
        .chain(initials)
        .chain(std::iter::once(noise))
        .collect()
}

pub fn observable_table(model: &ModelSpec, data: &DataGenerationSpec) -> Vec<ObservableRow> {
    model
        .observables
        .iter()
        .map(|o| ObservableRow {
            observable_id: o.name.clone(),
            observable_name: format!("Observable {}", o.name),
            observable_formula: o.formula.clone(),
            observable_transformation: o.transformation,
            noise_formula: format!("{} * {}", data.noise_parameter, o.name),
            noise_distribution: o.noise_distribution,
        })
        .collect()
}

pub fn condition_table(model: &ModelSpec, data: &DataGenerationSpec) -> ConditionTable {
    ConditionTable {
        condition_id: data.condition_id.clone(),
        condition_name: String::new(),
        initial_values: model
            .estimated_states()
            .map(|s| (s.name.clone(), s.init_parameter()))
            .collect(),
    }
}

/// Writes serializable rows as a TSV file with a header line.
pub fn write_tsv<T: Serialize>(path: impl AsRef<Path>, rows: &[T]) -> Result<(), PetabError> {
    let mut writer = tsv_writer(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn tsv_writer(path: impl AsRef<Path>) -> Result<csv::Writer<std::fs::File>, PetabError> {
    Ok(csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path)?)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::petab::config::ModelConfig;

    const MODEL: &str = r#"
[model]
equations = ["x1' = -k1 * x1", "x2' = k1 * x1"]
states = [{ name = "x1", initial_value = 2.0, estimate = true }, { name = "x2", initial_value = 0.5 }]
parameters = [{ name = "k1", value = 0.5, bounds = [0.01, 10.0], scale = "lin" }]
observables = [
    { name = "y1", formula = "x1 + x2" },
    { name = "y2", formula = "k1 * x2", transformation = "log10" },
]

[simulation]
n_timepoints = 3
timespan = [0.0, 2.0]
noise_level = 0.1
random_seed = 7
"#;

    fn specs(blind: bool) -> (ModelSpec, DataGenerationSpec) {
        let toml = MODEL.replace("random_seed = 7", &format!("random_seed = 7\nblind = {blind}"));
        ModelConfig::from_toml_str(&toml)
            .unwrap()
            .into_spec()
            .unwrap()
    }

    fn result() -> SimulationResult {
        let mut result = SimulationResult::new(vec![0.0, 1.0, 2.0]);
        result.add_species("x1".to_string(), vec![2.0, 1.2, 0.7]);
        result.add_species("x2".to_string(), vec![0.5, 1.3, 1.8]);
        result
    }

    #[test]
    fn test_measurement_table() {
        let (model, data) = specs(false);
        let rows = measurement_table(&model, &data, &result()).unwrap();

        assert_eq!(rows.len(), 6);
        assert_eq!(rows[0].observable_id, "y1");
        assert_eq!(rows[3].observable_id, "y2");
        assert_eq!(rows[4].time, 1.0);
        assert_eq!(rows[0].simulation_condition_id, "condition1");
        assert_eq!(rows[0].noise_parameters, "noiseParameter1");
        assert_eq!(rows[0].dataset_id, "dataset1");
        assert_eq!(rows[0].observable_parameters, "");
        assert!(rows.iter().all(|r| r.replicate_id == 0));
        assert!(rows[3..].iter().all(|r| r.measurement > 0.0));

        let again = measurement_table(&model, &data, &result()).unwrap();
        assert_eq!(rows, again);
    }

    #[test]
    fn test_zero_noise_keeps_values() {
        let mut rng = StdRng::seed_from_u64(1);
        let linear = add_noise(&[1.0, -2.0], Scale::Lin, 0.0, &mut rng).unwrap();
        assert_eq!(linear, vec![1.0, -2.0]);

        let log = add_noise(&[10.0, 100.0], Scale::Log10, 0.0, &mut rng).unwrap();
        assert_relative_eq!(log[0], 10.0, epsilon = 1e-12);
        assert_relative_eq!(log[1], 100.0, epsilon = 1e-10);
    }

    #[test]
    fn test_log10_noise_rejects_non_positive() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(add_noise(&[1.0, 0.0], Scale::Log10, 0.1, &mut rng).is_err());
        assert!(add_noise(&[1.0, 0.0], Scale::Lin, 0.1, &mut rng).is_ok());
    }

    #[test]
    fn test_parameter_table() {
        let (model, data) = specs(false);
        let rows = parameter_table(&model, &data);

        let ids: Vec<&str> = rows.iter().map(|r| r.parameter_id.as_str()).collect();
        assert_eq!(ids, vec!["k1", "init_x1", "noiseParameter1"]);

        assert_eq!(rows[0].parameter_scale, Scale::Lin);
        assert_eq!(rows[0].nominal_value, 0.5);
        assert_eq!(rows[1].nominal_value, 2.0);
        assert_eq!(rows[1].lower_bound, 1e-3);
        assert_eq!(rows[2].estimate, 0);
        assert_eq!(rows[2].lower_bound, 0.1);
        assert_eq!(rows[2].upper_bound, 0.1);
    }

    #[test]
    fn test_parameter_table_blind() {
        let (model, data) = specs(true);
        let rows = parameter_table(&model, &data);

        assert_eq!(rows[0].nominal_value, 1.0);
        assert_eq!(rows[1].nominal_value, 1.0);
        assert_eq!(rows[2].nominal_value, 0.1);
    }

    #[test]
    fn test_observable_and_condition_tables() {
        let (model, data) = specs(false);

        let observables = observable_table(&model, &data);
        assert_eq!(observables[1].observable_name, "Observable y2");
        assert_eq!(observables[1].noise_formula, "noiseParameter1 * y2");
        assert_eq!(observables[1].observable_transformation, Scale::Log10);

        let conditions = condition_table(&model, &data);
        assert_eq!(
            conditions.columns(),
            vec!["conditionId", "conditionName", "x1"]
        );
        assert_eq!(conditions.record(), vec!["condition1", "", "init_x1"]);
    }

    #[test]
    fn test_write_tsv() {
        let (model, data) = specs(false);
        let dir = tempfile::tempdir().unwrap();

        let path = dir.path().join("observables.tsv");
        write_tsv(&path, &observable_table(&model, &data)).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();

        assert_eq!(
            lines.next().unwrap(),
            "observableId\tobservableName\tobservableFormula\tobservableTransformation\tnoiseFormula\tnoiseDistribution"
        );
        assert_eq!(
            lines.next().unwrap(),
            "y1\tObservable y1\tx1 + x2\tlin\tnoiseParameter1 * y1\tnormal"
        );

        let path = dir.path().join("conditions.tsv");
        condition_table(&model, &data).write(&path).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "conditionId\tconditionName\tx1\ncondition1\t\tinit_x1\n");
    }
}
