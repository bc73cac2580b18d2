//! Information display for generated PEtab problems
//!
//! Implements `Display` for [`PetabProblem`], printing an overview of the problem
//! and its parameter table in a human-readable form.

use std::fmt::{self, Display};

use tabled::{builder::Builder, settings::Style};

use crate::petab::problem::PetabProblem;
use crate::petab::tables::{ObservableRow, ParameterRow};

/// Trait for converting table rows to displayable records
///
/// Implementors provide column headers and a way to convert their data to string
/// values for each column.
trait TableRecord {
    /// Get the column headers for the table
    fn columns() -> Vec<String>;

    /// Convert the instance to a record for display in a table
    fn to_record(&self) -> Vec<String>;
}

impl Display for PetabProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut builder = Builder::default();
        builder.push_record(vec!["PEtab Problem"]);
        builder.push_record(vec![format!(
            "{} states, {} measurements, t = [{}, {}], noise level {}{}",
            self.model.states.len(),
            self.measurements.len(),
            self.data.timespan.0,
            self.data.timespan.1,
            self.data.noise_level,
            if self.data.blind { ", blind" } else { "" }
        )]);

        builder.push_record(vec!["Parameters"]);
        builder.push_record(vec![to_table(&self.parameters)]);

        if !self.observables.is_empty() {
            builder.push_record(vec!["Observables"]);
            builder.push_record(vec![to_table(&self.observables)]);
        }

        let mut table = builder.build();
        table.with(Style::sharp());
        write!(f, "{table}")
    }
}

/// Converts a collection of TableRecord implementors to a formatted table string
fn to_table<T: TableRecord>(records: &[T]) -> String {
    let mut builder = Builder::default();
    builder.push_record(T::columns());

    for record in records {
        builder.push_record(record.to_record());
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    table.to_string()
}

impl TableRecord for ParameterRow {
    fn columns() -> Vec<String> {
        vec![
            "ID".to_string(),
            "Scale".to_string(),
            "Lower Bound".to_string(),
            "Upper Bound".to_string(),
            "Nominal".to_string(),
            "Estimate".to_string(),
        ]
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            self.parameter_id.clone(),
            self.parameter_scale.to_string(),
            self.lower_bound.to_string(),
            self.upper_bound.to_string(),
            self.nominal_value.to_string(),
            (self.estimate == 1).to_string(),
        ]
    }
}

impl TableRecord for ObservableRow {
    fn columns() -> Vec<String> {
        vec![
            "ID".to_string(),
            "Formula".to_string(),
            "Transformation".to_string(),
            "Noise".to_string(),
        ]
    }

    fn to_record(&self) -> Vec<String> {
        vec![
            self.observable_id.clone(),
            self.observable_formula.clone(),
            self.observable_transformation.to_string(),
            self.noise_distribution.to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::petab::config::ModelConfig;

    #[test]
    fn test_display_problem() {
        let (model, data) = ModelConfig::from_toml_str(
            r#"
[model]
equations = ["x' = -k * x"]
states = [{ name = "x", initial_value = 1.0 }]
parameters = [{ name = "k", value = 0.3 }]

[simulation]
n_timepoints = 5
"#,
        )
        .unwrap()
        .into_spec()
        .unwrap();

        let problem = PetabProblem::generate(model, data).unwrap();
        let overview = problem.to_string();

        assert!(overview.contains("PEtab Problem"));
        assert!(overview.contains("1 states, 5 measurements"));
        assert!(overview.contains("Lower Bound"));
        assert!(overview.contains("noiseParameter1"));
        assert!(overview.contains("obs_x"));
    }
}
