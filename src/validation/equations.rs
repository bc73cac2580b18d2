use std::collections::BTreeMap;

use crate::equation::{compile, parse_rate_equation, unknown_symbols};
use crate::petab::config::ModelConfig;
use crate::validation::consistency::{get_symbols, Report, Severity, ValidationResult};

/// Validates the rate equations of a model configuration.
///
/// Every equation must have the form `<state>' = <expression>`, name a declared
/// state, parse, and only reference declared states and parameters. Every state
/// needs exactly one equation.
pub fn check_equations(config: &ModelConfig, report: &mut Report) {
    let symbols = get_symbols(config);
    let mut defined: BTreeMap<String, usize> = BTreeMap::new();

    for (eq_idx, raw) in config.model.equations.iter().enumerate() {
        let location = format!("/model/equations/{eq_idx}");

        let equation = match parse_rate_equation(raw) {
            Ok(equation) => equation,
            Err(err) => {
                report.add_result(ValidationResult::new(
                    location,
                    err.to_string(),
                    Severity::Error,
                    None,
                ));
                continue;
            }
        };

        if !config.model.states.iter().any(|s| s.name == equation.state) {
            report.add_result(ValidationResult::new(
                location.clone(),
                format!(
                    "Equation defines the rate of '{}', which is not a declared state.",
                    equation.state
                ),
                Severity::Error,
                Some(equation.state.clone()),
            ));
        }

        if let Some(first) = defined.insert(equation.state.clone(), eq_idx) {
            report.add_result(ValidationResult::new(
                location.clone(),
                format!(
                    "State '{}' already has a rate equation at /model/equations/{first}.",
                    equation.state
                ),
                Severity::Error,
                Some(equation.state.clone()),
            ));
        }

        match compile(&equation.expression) {
            Ok(expr) => {
                for symbol in unknown_symbols(&expr, &symbols) {
                    report.add_result(ValidationResult::new(
                        location.clone(),
                        format!(
                            "Symbol '{symbol}' in the rate of '{}' is neither a state nor a parameter.",
                            equation.state
                        ),
                        Severity::Error,
                        Some(symbol),
                    ));
                }
            }
            Err(err) => report.add_result(ValidationResult::new(
                location,
                err.to_string(),
                Severity::Error,
                Some(equation.state.clone()),
            )),
        }
    }

    for (state_idx, state) in config.model.states.iter().enumerate() {
        if !defined.contains_key(&state.name) {
            report.add_result(ValidationResult::new(
                format!("/model/states/{state_idx}"),
                format!("State '{}' has no rate equation.", state.name),
                Severity::Error,
                Some(state.name.clone()),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(equations: &str) -> Report {
        let toml = format!(
            r#"
[model]
equations = {equations}
states = [{{ name = "x", initial_value = 1.0 }}, {{ name = "y", initial_value = 0.0 }}]
parameters = [{{ name = "k", value = 0.5 }}]
"#
        );
        let config = ModelConfig::from_toml_str(&toml).unwrap();
        let mut report = Report::new();
        check_equations(&config, &mut report);
        report
    }

    #[test]
    fn test_valid_equations() {
        let report = check(r#"["x' = -k * x", "y' = k * x * time"]"#);
        assert!(report.is_valid);
    }

    #[test]
    fn test_missing_equation() {
        let report = check(r#"["x' = -k * x"]"#);
        assert!(!report.is_valid);
        assert_eq!(report.filter_results("y").len(), 1);
        assert_eq!(report.errors[0].location(), "/model/states/1");
    }

    #[test]
    fn test_duplicate_equation() {
        let report = check(r#"["x' = -k * x", "x' = k", "y' = 0"]"#);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].location(), "/model/equations/1");
    }

    #[test]
    fn test_malformed_equation() {
        let report = check(r#"["x = -k * x", "y' = k * (x", "x' = 0"]"#);
        assert_eq!(report.errors.len(), 2);
        assert!(!report.is_valid);
    }

    #[test]
    fn test_unknown_symbol() {
        let report = check(r#"["x' = -k2 * x", "y' = k * x"]"#);
        assert_eq!(report.filter_results("k2").len(), 1);
    }
}
