use std::collections::BTreeSet;

use crate::equation::{compile, unknown_symbols};
use crate::petab::config::{ModelConfig, NoiseDistribution, Scale};
use crate::validation::consistency::{
    get_symbols, is_valid_identifier, Report, Severity, ValidationResult,
};

/// Validates the observables of a model configuration.
///
/// Without an `observables` list, one identity observable per state is generated,
/// which is reported as an informational result.
pub fn check_observables(config: &ModelConfig, report: &mut Report) {
    let Some(observables) = &config.model.observables else {
        report.add_result(ValidationResult::new(
            "/model/observables".to_string(),
            "No observables defined. Every state will be observed directly.".to_string(),
            Severity::Info,
            None,
        ));
        return;
    };

    if observables.is_empty() {
        report.add_result(ValidationResult::new(
            "/model/observables".to_string(),
            "The observable list is empty, so no measurements can be generated.".to_string(),
            Severity::Error,
            None,
        ));
    }

    let symbols = get_symbols(config);
    let mut names: BTreeSet<&str> = BTreeSet::new();

    for (obs_idx, observable) in observables.iter().enumerate() {
        let location = format!("/model/observables/{obs_idx}");
        let mut error = |message: String, identifier: Option<String>| {
            report.add_result(ValidationResult::new(
                location.clone(),
                message,
                Severity::Error,
                identifier,
            ))
        };

        if !is_valid_identifier(&observable.name) {
            error(
                format!("'{}' is not a valid observable name.", observable.name),
                Some(observable.name.clone()),
            );
        }

        if !names.insert(observable.name.as_str()) || symbols.contains(observable.name.as_str())
        {
            error(
                format!("Observable name '{}' is already in use.", observable.name),
                Some(observable.name.clone()),
            );
        }

        match compile(&observable.formula) {
            Ok(expr) => {
                for symbol in unknown_symbols(&expr, &symbols) {
                    error(
                        format!(
                            "Symbol '{symbol}' in observable '{}' is neither a state nor a parameter.",
                            observable.name
                        ),
                        Some(symbol),
                    );
                }
            }
            Err(err) => error(err.to_string(), Some(observable.name.clone())),
        }

        if let Err(message) = observable.transformation.parse::<Scale>() {
            error(message, Some(observable.name.clone()));
        }

        if let Err(message) = observable.noise_distribution.parse::<NoiseDistribution>() {
            error(message, Some(observable.name.clone()));
        }
    }
}
