use crate::petab::config::ModelConfig;
use crate::validation::consistency::{Report, Severity, ValidationResult};

/// Validates the `[simulation]` settings of a model configuration.
pub fn check_settings(config: &ModelConfig, report: &mut Report) {
    let settings = &config.simulation;
    let mut error = |location: &str, message: String| {
        report.add_result(ValidationResult::new(
            format!("/simulation/{location}"),
            message,
            Severity::Error,
            None,
        ))
    };

    let [t0, t1] = settings.timespan;
    if !(t0.is_finite() && t1.is_finite()) || t0 >= t1 {
        error(
            "timespan",
            format!("Timespan [{t0}, {t1}] must be finite and increasing."),
        );
    }

    if settings.n_timepoints < 2 {
        error(
            "n_timepoints",
            format!(
                "At least two time points are required, got {}.",
                settings.n_timepoints
            ),
        );
    }

    if !settings.noise_level.is_finite() || settings.noise_level < 0.0 {
        error(
            "noise_level",
            format!(
                "Noise level {} must be a non-negative number.",
                settings.noise_level
            ),
        );
    }
}
