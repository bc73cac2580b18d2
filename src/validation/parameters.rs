use std::collections::{BTreeMap, BTreeSet};

use crate::equation::{compile, extract_symbols, parse_rate_equation};
use crate::petab::config::{ModelConfig, ParameterConfig, Scale, DEFAULT_BOUNDS};
use crate::validation::consistency::{is_valid_identifier, Report, Severity, ValidationResult};

/// Validates the state and parameter declarations of a model configuration
///
/// # Arguments
/// * `config` - The model configuration to validate
/// * `report` - Validation report to add any issues to
///
/// # Details
/// Names must be unique valid identifiers and values finite. Parameter bounds must be
/// ordered and positive on logarithmic scales. Values outside their bounds and
/// parameters no formula refers to are reported as warnings.
pub fn check_parameters(config: &ModelConfig, report: &mut Report) {
    if config.model.states.is_empty() {
        report.add_result(ValidationResult::new(
            "/model/states".to_string(),
            "The model has to declare at least one state.".to_string(),
            Severity::Error,
            None,
        ));
    }

    let mut seen: BTreeMap<&str, String> = BTreeMap::new();

    for (state_idx, state) in config.model.states.iter().enumerate() {
        let location = format!("/model/states/{state_idx}");
        check_name(report, &state.name, &location, &mut seen);

        if !state.initial_value.is_finite() {
            report.add_result(ValidationResult::new(
                location.clone(),
                format!("State '{}' has a non-finite initial value.", state.name),
                Severity::Error,
                Some(state.name.clone()),
            ));
        }

        if state.estimate
            && !(DEFAULT_BOUNDS[0]..=DEFAULT_BOUNDS[1]).contains(&state.initial_value)
        {
            report.add_result(ValidationResult::new(
                location,
                format!(
                    "Initial value {} of estimated state '{}' lies outside the estimation bounds [{}, {}].",
                    state.initial_value, state.name, DEFAULT_BOUNDS[0], DEFAULT_BOUNDS[1]
                ),
                Severity::Warning,
                Some(state.name.clone()),
            ));
        }
    }

    let referenced = referenced_symbols(config);

    for (param_idx, parameter) in config.model.parameters.iter().enumerate() {
        let location = format!("/model/parameters/{param_idx}");
        check_name(report, &parameter.name, &location, &mut seen);
        check_parameter_bounds(report, parameter, &location);

        if !referenced.contains(parameter.name.as_str()) {
            report.add_result(ValidationResult::new(
                location,
                format!(
                    "Parameter '{}' is not used by any equation or observable.",
                    parameter.name
                ),
                Severity::Warning,
                Some(parameter.name.clone()),
            ));
        }
    }
}

/// Checks that a name is a valid, unused identifier
fn check_name<'a>(
    report: &mut Report,
    name: &'a str,
    location: &str,
    seen: &mut BTreeMap<&'a str, String>,
) {
    if !is_valid_identifier(name) {
        report.add_result(ValidationResult::new(
            location.to_string(),
            format!("'{name}' is not a valid identifier or is reserved."),
            Severity::Error,
            Some(name.to_string()),
        ));
    }

    if let Some(first) = seen.insert(name, location.to_string()) {
        report.add_result(ValidationResult::new(
            location.to_string(),
            format!("'{name}' is already declared at {first}."),
            Severity::Error,
            Some(name.to_string()),
        ));
    }
}

/// Validates value, bounds and scale of a parameter
fn check_parameter_bounds(report: &mut Report, parameter: &ParameterConfig, location: &str) {
    let mut error = |message: String| {
        report.add_result(ValidationResult::new(
            location.to_string(),
            message,
            Severity::Error,
            Some(parameter.name.clone()),
        ))
    };

    if !parameter.value.is_finite() {
        error(format!("Parameter '{}' has a non-finite value.", parameter.name));
    }

    let scale = match parameter.scale.as_deref().map(str::parse::<Scale>) {
        Some(Err(message)) => {
            error(message);
            return;
        }
        Some(Ok(scale)) => scale,
        None => Scale::Log10,
    };

    let [lower, upper] = parameter.bounds.unwrap_or(DEFAULT_BOUNDS);

    if !(lower.is_finite() && upper.is_finite()) || lower >= upper {
        error(format!(
            "Bounds [{lower}, {upper}] of parameter '{}' must be finite with lower < upper.",
            parameter.name
        ));
        return;
    }

    if scale.is_logarithmic() && lower <= 0.0 {
        error(format!(
            "Parameter '{}' uses the {scale} scale, so its lower bound must be positive.",
            parameter.name
        ));
        return;
    }

    if parameter.value < lower || parameter.value > upper {
        report.add_result(ValidationResult::new(
            location.to_string(),
            format!(
                "Value {} of parameter '{}' lies outside its bounds [{lower}, {upper}].",
                parameter.value, parameter.name
            ),
            Severity::Warning,
            Some(parameter.name.clone()),
        ));
    }
}

/// Symbols used by any rate equation or observable that can be parsed
fn referenced_symbols(config: &ModelConfig) -> BTreeSet<String> {
    let rates = config
        .model
        .equations
        .iter()
        .filter_map(|raw| parse_rate_equation(raw).ok())
        .map(|eq| eq.expression);

    let observables = config
        .model
        .observables
        .iter()
        .flatten()
        .map(|obs| obs.formula.clone());

    rates
        .chain(observables)
        .filter_map(|formula| compile(&formula).ok())
        .flat_map(|expr| extract_symbols(&expr))
        .collect()
}
