use std::collections::BTreeMap;

use meval::{Context, Expr};
use peroxide::fuga::{BasicODESolver, ODEProblem, ODESolver, RK5};

use crate::equation::{compile, RateEquation, TIME_SYMBOL};

use super::error::SimulationError;
use super::interpolation::interpolate;
use super::result::SimulationResult;
use super::setup::SimulationSetup;

/// Output of the integrator: one state vector per integration step
pub type StepperOutput = Vec<Vec<f64>>;

/// A system of ordinary differential equations built from rate equations.
///
/// States keep the order in which their rate equations were given; the state
/// vector handed to the integrator follows that order.
#[derive(Clone)]
pub struct ODESystem {
    /// State names in state vector order
    states: Vec<String>,
    /// Compiled right-hand sides, aligned with `states`
    rates: Vec<Expr>,
    /// Evaluation context holding the parameter values
    context: Context<'static>,
}

impl ODESystem {
    /// Creates a new ODESystem instance.
    ///
    /// # Arguments
    ///
    /// * `equations` - One rate equation per state.
    /// * `parameters` - Parameter values referenced by the equations.
    ///
    /// # Returns
    ///
    /// Returns the system or a [`SimulationError::EquationError`] if a right-hand side
    /// cannot be parsed.
    pub fn new(
        equations: &[RateEquation],
        parameters: &BTreeMap<String, f64>,
    ) -> Result<Self, SimulationError> {
        let rates = equations
            .iter()
            .map(|eq| compile(&eq.expression))
            .collect::<Result<Vec<_>, _>>()?;

        let mut context = Context::new();
        for (name, value) in parameters {
            context.var(name.as_str(), *value);
        }

        Ok(Self {
            states: equations.iter().map(|eq| eq.state.clone()).collect(),
            rates,
            context,
        })
    }

    /// Names of the states in state vector order.
    pub fn states(&self) -> &[String] {
        &self.states
    }

    /// Integrates the system and samples it at the setup's output time points.
    ///
    /// The system is integrated with a fixed-step RK5 scheme using
    /// [`SimulationSetup::step_size`], then resampled onto
    /// [`SimulationSetup::time_points`].
    ///
    /// # Arguments
    ///
    /// * `setup` - Time range and resolution.
    /// * `y0` - Initial values in state vector order.
    pub fn integrate(
        &self,
        setup: &SimulationSetup,
        y0: &[f64],
    ) -> Result<SimulationResult, SimulationError> {
        setup.validate()?;

        if y0.len() != self.states.len() {
            return Err(SimulationError::InitialStateMismatch {
                expected: self.states.len(),
                actual: y0.len(),
            });
        }

        let solver = BasicODESolver::new(RK5::default());
        let (times, trajectory): (Vec<f64>, StepperOutput) = solver
            .solve(self, (setup.t0, setup.t1), setup.step_size(), y0)
            .map_err(|err| SimulationError::IntegrationError(err.to_string()))?;

        if let Some((state, _)) = trajectory
            .last()
            .and_then(|last| self.states.iter().zip(last).find(|(_, v)| !v.is_finite()))
        {
            return Err(SimulationError::IntegrationError(format!(
                "state '{state}' diverged"
            )));
        }

        log::debug!(
            "Integrated {} states over {} steps",
            self.states.len(),
            times.len()
        );

        let time_points = setup.time_points();
        let sampled = interpolate(&trajectory, &times, &time_points);

        let mut result = SimulationResult::new(time_points);
        for (state, values) in self.states.iter().zip(sampled) {
            result.add_species(state.clone(), values);
        }

        Ok(result)
    }

    fn context_at(&self, t: f64, y: &[f64]) -> Context<'static> {
        let mut context = self.context.clone();
        context.var(TIME_SYMBOL, t);
        for (state, value) in self.states.iter().zip(y) {
            context.var(state.as_str(), *value);
        }
        context
    }
}

impl ODEProblem for ODESystem {
    /// Evaluates the rate equations at the current state and time.
    fn rhs(&self, t: f64, y: &[f64], dy: &mut [f64]) -> anyhow::Result<()> {
        let context = self.context_at(t, y);

        for ((rate, state), dy_i) in self.rates.iter().zip(&self.states).zip(dy.iter_mut()) {
            *dy_i = rate
                .eval_with_context(&context)
                .map_err(|err| anyhow::anyhow!("Could not evaluate rate of '{state}': {err}"))?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::equation::parse_rate_equation;
    use crate::simulation::setup::SimulationSetupBuilder;

    fn decay_system(k: f64) -> ODESystem {
        let equations = vec![
            parse_rate_equation("x1' = -k1 * x1").unwrap(),
            parse_rate_equation("x2' = k1 * x1").unwrap(),
        ];
        let parameters = BTreeMap::from([("k1".to_string(), k)]);
        ODESystem::new(&equations, &parameters).unwrap()
    }

    #[test]
    fn test_exponential_decay() {
        let system = decay_system(0.5);
        let setup = SimulationSetupBuilder::default()
            .t0(0.0)
            .t1(4.0)
            .n_timepoints(9)
            .build()
            .unwrap();

        let result = system.integrate(&setup, &[2.0, 0.0]).unwrap();
        let x1 = result.get_species("x1").unwrap();
        let x2 = result.get_species("x2").unwrap();

        assert_eq!(result.time.len(), 9);
        for ((t, a), b) in result.time.iter().zip(x1).zip(x2) {
            let expected = 2.0 * (-0.5 * t).exp();
            assert_relative_eq!(*a, expected, epsilon = 1e-5);
            assert_relative_eq!(a + b, 2.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_time_dependent_rate() {
        let equations = vec![parse_rate_equation("x' = 2 * time").unwrap()];
        let system = ODESystem::new(&equations, &BTreeMap::new()).unwrap();
        let setup = SimulationSetupBuilder::default()
            .t1(3.0)
            .n_timepoints(4)
            .build()
            .unwrap();

        let result = system.integrate(&setup, &[1.0]).unwrap();
        let x = result.get_species("x").unwrap();
        assert_relative_eq!(x[3], 10.0, epsilon = 1e-6);
    }

    #[test]
    fn test_initial_state_mismatch() {
        let system = decay_system(0.5);
        let setup = SimulationSetupBuilder::default().build().unwrap();

        let err = system.integrate(&setup, &[1.0]).unwrap_err();
        assert!(matches!(
            err,
            SimulationError::InitialStateMismatch {
                expected: 2,
                actual: 1
            }
        ));
    }

    #[test]
    fn test_unknown_symbol_fails_integration() {
        let equations = vec![parse_rate_equation("x' = -k * x").unwrap()];
        let system = ODESystem::new(&equations, &BTreeMap::new()).unwrap();
        let setup = SimulationSetupBuilder::default().build().unwrap();

        assert!(matches!(
            system.integrate(&setup, &[1.0]),
            Err(SimulationError::IntegrationError(_))
        ));
    }
}
