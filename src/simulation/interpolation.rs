//! Interpolation Module for Simulation Results
//!
//! The integrator works on a fine fixed-step grid. This module resamples its output
//! onto the requested output time points using cubic (Catmull-Rom) splines, falling
//! back to linear interpolation where the cubic spline is undefined.

use splines::{Interpolation, Key, Spline};

/// Interpolates every state at the given query times.
///
/// # Arguments
///
/// * `data` - Integrator output, one state vector per entry of `times`
/// * `times` - Time points of the integrator output, ascending
/// * `query_times` - Time points at which to sample
///
/// # Returns
///
/// One vector per state holding the sampled values at `query_times`. Query times
/// outside the integrated range are clamped to the nearest end.
pub fn interpolate(data: &[Vec<f64>], times: &[f64], query_times: &[f64]) -> Vec<Vec<f64>> {
    let n_states = data.first().map(Vec::len).unwrap_or_default();

    let cubic_splines = setup_splines(data, times, n_states, Interpolation::CatmullRom);
    let linear_splines = setup_splines(data, times, n_states, Interpolation::Linear);

    linear_splines
        .iter()
        .zip(cubic_splines.iter())
        .map(|(linear, cubic)| {
            query_times
                .iter()
                .map(|&t| {
                    cubic
                        .sample(t)
                        .or_else(|| linear.clamped_sample(t))
                        .unwrap_or(f64::NAN)
                })
                .collect()
        })
        .collect()
}

/// Creates one spline per state.
fn setup_splines(
    data: &[Vec<f64>],
    times: &[f64],
    n_states: usize,
    interpol: Interpolation<f64, f64>,
) -> Vec<Spline<f64, f64>> {
    (0..n_states)
        .map(|state| {
            let keys = times
                .iter()
                .zip(data.iter())
                .map(|(&t, row)| Key::new(t, row[state], interpol))
                .collect();
            Spline::from_vec(keys)
        })
        .collect()
}
