//! Antimony rendering of a model.
//!
//! The text is written next to the PEtab tables as a human readable description of
//! the model. In blind mode the exported text hides the true values.

use itertools::Itertools;

use super::config::{DataGenerationSpec, ModelSpec};

/// Name of the Antimony model
pub const MODEL_NAME: &str = "feedback";

/// Value used in place of true values when a problem is generated blind
pub const BLIND_VALUE: f64 = 1.0;

/// Renders the model as Antimony text.
///
/// # Arguments
///
/// * `model` - The validated model.
/// * `data` - Data generation settings; only `blind` is used.
/// * `use_true_values` - If false and the problem is blind, every numeric value is
///   replaced by [`BLIND_VALUE`].
pub fn to_antimony(model: &ModelSpec, data: &DataGenerationSpec, use_true_values: bool) -> String {
    let value = |v: f64| {
        if use_true_values || !data.blind {
            format_value(v)
        } else {
            format_value(BLIND_VALUE)
        }
    };

    let mut lines = vec![format!("model {MODEL_NAME}")];

    lines.extend(
        model
            .estimated_states()
            .map(|s| format!("{} = {}", s.init_parameter(), value(s.initial_value))),
    );
    lines.push(String::new());

    lines.extend(model.states.iter().map(|s| {
        if s.estimate {
            format!("species {} = {}", s.name, s.init_parameter())
        } else {
            format!("species {} = {}", s.name, value(s.initial_value))
        }
    }));
    lines.push(String::new());

    lines.extend(
        model
            .parameters
            .iter()
            .map(|p| format!("{} = {}", p.name, value(p.value))),
    );
    lines.push(String::new());

    lines.extend(
        model
            .equations
            .iter()
            .map(|eq| format!("  {}", eq.to_antimony())),
    );
    lines.push(String::new());

    lines.extend(
        model
            .observables
            .iter()
            .map(|o| format!("{} := {}", o.name, o.formula)),
    );
    lines.push(String::new());

    lines.push("end".to_string());
    lines.into_iter().join("\n")
}

/// Formats a number so that integral values keep a decimal point.
pub fn format_value(value: f64) -> String {
    format!("{value:?}")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::petab::config::ModelConfig;

    fn specs(blind: bool) -> (ModelSpec, DataGenerationSpec) {
        let toml = format!(
            r#"
[model]
equations = ["x1' = -k1 * x1", "x2' = k1 * x1 - k2 * x2"]
states = [{{ name = "x1", initial_value = 2.0, estimate = true }}, {{ name = "x2", initial_value = 0.0 }}]
parameters = [{{ name = "k1", value = 0.5 }}, {{ name = "k2", value = 0.25 }}]
observables = [{{ name = "y", formula = "x1 + x2" }}]

[simulation]
blind = {blind}
"#
        );
        ModelConfig::from_toml_str(&toml)
            .unwrap()
            .into_spec()
            .unwrap()
    }

    #[test]
    fn test_antimony_true_values() {
        let (model, data) = specs(false);

        let expected = "model feedback
init_x1 = 2.0

species x1 = init_x1
species x2 = 0.0

k1 = 0.5
k2 = 0.25

  x1' = -k1 * x1
  x2' = k1 * x1 - k2 * x2

y := x1 + x2

end";
        assert_eq!(to_antimony(&model, &data, false), expected);
        assert_eq!(to_antimony(&model, &data, true), expected);
    }

    #[test]
    fn test_antimony_blind() {
        let (model, data) = specs(true);

        let blinded = to_antimony(&model, &data, false);
        assert!(blinded.contains("init_x1 = 1.0\n"));
        assert!(blinded.contains("species x2 = 1.0\n"));
        assert!(blinded.contains("k1 = 1.0\nk2 = 1.0\n"));

        let simulated = to_antimony(&model, &data, true);
        assert!(simulated.contains("k1 = 0.5\n"));
    }
}
