//! Consistency module for checking model configurations.
//!
//! This module validates a [`ModelConfig`] before any simulation is attempted by
//! checking:
//! - State and parameter declarations
//! - Rate equations and the symbols they reference
//! - Observable definitions
//! - Simulation settings
//!
//! The main entry point is the `check_consistency` function which runs all validation
//! checks and returns a `Report` with the results.

use std::collections::BTreeSet;
use std::fmt;

use colored::Colorize;
use regex::Regex;

use crate::equation::{BUILTIN_CONSTANTS, TIME_SYMBOL};
use crate::petab::config::ModelConfig;
use crate::validation::equations::check_equations;
use crate::validation::observables::check_observables;
use crate::validation::parameters::check_parameters;
use crate::validation::settings::check_settings;

lazy_static::lazy_static! {
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid");
}

/// The `check_consistency` function is used to check the consistency of a `ModelConfig`.
/// It returns a `Report` containing the results of the checks.
///
/// # Arguments
///
/// * `config` - A reference to the `ModelConfig` to be checked.
///
/// # Returns
///
/// Returns a `Report` containing the results of the consistency checks.
pub fn check_consistency(config: &ModelConfig) -> Report {
    let mut report = Report::new();

    check_parameters(config, &mut report);
    check_equations(config, &mut report);
    check_observables(config, &mut report);
    check_settings(config, &mut report);

    report
}

/// The `Report` struct is used to store the results of the validation checks.
///
/// Contains a boolean indicating overall validity and a vector of individual validation results.
/// The configuration is considered invalid if any validation results have Error severity.
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq)]
pub struct Report {
    /// Whether the configuration is valid overall. False if any errors were found.
    pub is_valid: bool,
    /// Vector of individual validation results found during checks.
    pub errors: Vec<ValidationResult>,
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

impl Report {
    /// Creates a new, valid `Report` without results.
    pub fn new() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Adds a validation result to the report.
    ///
    /// # Arguments
    ///
    /// * `result` - The `ValidationResult` to be added.
    ///
    /// If the result has Error severity, marks the overall report as invalid.
    pub fn add_result(&mut self, result: ValidationResult) {
        if result.severity == Severity::Error {
            self.is_valid = false;
        }
        self.errors.push(result);
    }

    /// Filters the results by the identifier.
    ///
    /// # Arguments
    ///
    /// * `identifier` - The name of the state, parameter or observable.
    ///
    /// # Returns
    ///
    /// Returns a vector of `ValidationResult`s with the given identifier.
    pub fn filter_results(&self, identifier: &str) -> Vec<ValidationResult> {
        self.errors
            .iter()
            .filter(|result| result.identifier.as_deref() == Some(identifier))
            .cloned()
            .collect()
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, result) in self.errors.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{result}")?;
        }
        Ok(())
    }
}

/// The `ValidationResult` struct represents a single validation issue found during checking.
///
/// Contains the location where the issue was found, a descriptive message, and the severity level.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq)]
pub struct ValidationResult {
    /// Path to the offending entry, e.g. `/model/parameters/0`
    location: String,
    /// Human readable description of the validation issue
    message: String,
    /// Severity level of the validation issue
    severity: Severity,
    /// The name of the offending state, parameter or observable, if any
    identifier: Option<String>,
}

impl ValidationResult {
    /// Creates a new `ValidationResult`.
    ///
    /// # Arguments
    ///
    /// * `location` - The location of the validation issue as a path into the configuration.
    /// * `message` - A message describing the validation issue.
    /// * `severity` - The severity of the validation issue.
    /// * `identifier` - The name of the offending object, if any.
    pub fn new(
        location: String,
        message: String,
        severity: Severity,
        identifier: Option<String>,
    ) -> Self {
        Self {
            location,
            message,
            severity,
            identifier,
        }
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn severity(&self) -> &Severity {
        &self.severity
    }

    pub fn identifier(&self) -> &Option<String> {
        &self.identifier
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let message = match self.severity {
            Severity::Error => self.message.bold().red(),
            Severity::Warning => self.message.bold().yellow(),
            Severity::Info => self.message.bold().green(),
        };

        let severity = match self.severity {
            Severity::Error => "Error".bold().red(),
            Severity::Warning => "Warning".bold().yellow(),
            Severity::Info => "Info".bold().green(),
        };

        write!(
            f,
            "[{}] {}:\n\t└── {}",
            self.location.bold(),
            severity,
            message
        )
    }
}

/// Severity levels for validation issues.
///
/// - Error: The configuration cannot be used
/// - Warning: The configuration may have issues but can be used
/// - Info: Informational message, e.g. about applied defaults
#[derive(Debug, Clone, PartialEq, Copy, serde::Serialize, serde::Deserialize)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "Error"),
            Severity::Warning => write!(f, "Warning"),
            Severity::Info => write!(f, "Info"),
        }
    }
}

/// Returns true if `name` can be used as a symbol inside formulas.
pub fn is_valid_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name) && !is_reserved(name)
}

/// Names with a predefined meaning inside formulas
pub fn is_reserved(name: &str) -> bool {
    name == TIME_SYMBOL || BUILTIN_CONSTANTS.contains(&name)
}

/// Names of all declared states and parameters.
pub fn get_symbols(config: &ModelConfig) -> BTreeSet<&str> {
    config
        .model
        .states
        .iter()
        .map(|s| s.name.as_str())
        .chain(config.model.parameters.iter().map(|p| p.name.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(toml: &str) -> ModelConfig {
        ModelConfig::from_toml_str(toml).expect("Failed to parse config")
    }

    #[test]
    fn test_valid_config() {
        let report = check_consistency(&config(
            r#"
[model]
equations = ["S' = -Vmax * S / (Km + S)"]
states = [{ name = "S", initial_value = 100.0 }]
parameters = [{ name = "Vmax", value = 10.0 }, { name = "Km", value = 100.0 }]
observables = [{ name = "y", formula = "S" }]
"#,
        ));

        assert!(report.is_valid, "{report}");
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_inconsistent_config() {
        let report = check_consistency(&config(
            r#"
[model]
equations = ["S' = -Vmax * S / (Km + S)", "P' = Vmax"]
states = [{ name = "S", initial_value = 100.0 }]
parameters = [{ name = "Vmax", value = 10.0 }]

[simulation]
noise_level = -0.1
"#,
        ));

        assert!(!report.is_valid);
        // Km unknown, P undeclared, negative noise
        assert_eq!(
            report
                .errors
                .iter()
                .filter(|r| *r.severity() == Severity::Error)
                .count(),
            3
        );
    }

    #[test]
    fn test_identifiers() {
        assert!(is_valid_identifier("k_1"));
        assert!(!is_valid_identifier("1k"));
        assert!(!is_valid_identifier("time"));
        assert!(!is_valid_identifier("pi"));
    }

    #[test]
    fn test_filter_results() {
        let mut report = Report::new();
        report.add_result(ValidationResult::new(
            "/model/states/0".to_string(),
            "message".to_string(),
            Severity::Warning,
            Some("S".to_string()),
        ));

        assert!(report.is_valid);
        assert_eq!(report.filter_results("S").len(), 1);
        assert!(report.filter_results("P").is_empty());
    }
}
