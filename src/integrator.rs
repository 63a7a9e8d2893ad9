//! The three integration schemes for the leaky integrate-and-fire dynamics.
//!
//! All schemes advance the membrane equation `dv/dt = (-(v - v_rest) + R * i) / tau_m` by
//! one time step and share the same threshold/reset rule: whenever the candidate potential
//! reaches the firing threshold, a spike is reported and the potential is replaced by the
//! reset potential within the same step. Spike detection is a post-step filter, not part
//! of the integration itself.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::error::LifError;
use super::neuron::NeuronParameters;

// Apply the threshold/reset rule to the candidate potential produced by a scheme.
fn threshold_reset(v_next: f64, params: &NeuronParameters) -> (f64, bool) {
    if v_next >= params.v_th() {
        (params.v_reset(), true)
    } else {
        (v_next, false)
    }
}

/// Advance the membrane potential by one explicit (forward) Euler step.
/// Large `dt / tau_m` ratios make this scheme oscillate or diverge; this is a reproducible
/// property of the scheme, not of the model.
pub fn step_forward_euler(v: f64, input: f64, params: &NeuronParameters, dt: f64) -> (f64, bool) {
    let dv = (-(v - params.v_rest()) + params.resistance() * input) * (dt / params.tau_m());
    threshold_reset(v + dv, params)
}

/// Advance the membrane potential by one implicit (backward) Euler step.
/// The implicit equation is linear in the next potential and is solved in closed form,
/// which makes the scheme stable for any positive time step.
pub fn step_backward_euler(v: f64, input: f64, params: &NeuronParameters, dt: f64) -> (f64, bool) {
    let alpha = dt / params.tau_m();
    let v_next = (v + alpha * (params.v_rest() + params.resistance() * input)) / (1.0 + alpha);
    threshold_reset(v_next, params)
}

/// Advance the membrane potential by one exact exponential step.
/// The update is the closed-form solution of the membrane equation and is exact for
/// piecewise-constant input, regardless of the time step.
pub fn step_exponential(v: f64, input: f64, params: &NeuronParameters, dt: f64) -> (f64, bool) {
    let v_inf = params.steady_state(input);
    let decay = (-dt / params.tau_m()).exp();
    threshold_reset(v_inf + (v - v_inf) * decay, params)
}

/// The integration scheme used to advance a simulation.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
pub enum Integrator {
    /// Explicit Euler update.
    ForwardEuler,
    /// Implicit Euler update, solved in closed form.
    BackwardEuler,
    /// Exact exponential update, assuming piecewise-constant input.
    Exponential,
}

impl Integrator {
    /// All schemes, in the order used by sweep reports.
    pub const ALL: [Integrator; 3] = [
        Integrator::ForwardEuler,
        Integrator::BackwardEuler,
        Integrator::Exponential,
    ];

    /// Advance the membrane potential by one step of the scheme.
    /// Returns the next potential and whether a spike was emitted during the step.
    pub fn step(&self, v: f64, input: f64, params: &NeuronParameters, dt: f64) -> (f64, bool) {
        match self {
            Integrator::ForwardEuler => step_forward_euler(v, input, params, dt),
            Integrator::BackwardEuler => step_backward_euler(v, input, params, dt),
            Integrator::Exponential => step_exponential(v, input, params, dt),
        }
    }

    /// Returns the integration scheme from a string.
    pub fn from_str(s: &str) -> Result<Self, LifError> {
        match s {
            "forward" => Ok(Integrator::ForwardEuler),
            "backward" => Ok(Integrator::BackwardEuler),
            "exponential" | "exact" => Ok(Integrator::Exponential),
            _ => Err(LifError::InvalidParameters(format!(
                "Unknown integration scheme: {}",
                s
            ))),
        }
    }

    /// Returns the scheme name used in reports and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Integrator::ForwardEuler => "forward",
            Integrator::BackwardEuler => "backward",
            Integrator::Exponential => "exponential",
        }
    }
}

impl fmt::Display for Integrator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
