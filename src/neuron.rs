//! This module provides the `NeuronParameters` structure shared by all integration schemes.

use serde::{Deserialize, Serialize};

use super::error::LifError;

/// The parameters of a leaky integrate-and-fire neuron.
///
/// Between spikes, the membrane potential obeys `dv/dt = (-(v - v_rest) + R * i) / tau_m`.
/// A single parameter set is shared by all integration schemes; comparing schemes is only
/// meaningful when they integrate the very same membrane.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct NeuronParameters {
    // The membrane time constant, in seconds.
    tau_m: f64,
    // The resting potential.
    v_rest: f64,
    // The post-spike reset potential.
    v_reset: f64,
    // The firing threshold.
    v_th: f64,
    // The membrane resistance.
    resistance: f64,
}

impl NeuronParameters {
    /// Create a new parameter set.
    /// The function returns an error for a non-positive membrane time constant or for
    /// non-finite values. The ordering of the three potentials is not enforced.
    pub fn build(
        tau_m: f64,
        v_rest: f64,
        v_reset: f64,
        v_th: f64,
        resistance: f64,
    ) -> Result<Self, LifError> {
        if !tau_m.is_finite() || tau_m <= 0.0 {
            return Err(LifError::InvalidParameters(
                "The membrane time constant must be a positive number".to_string(),
            ));
        }
        if !(v_rest.is_finite() && v_reset.is_finite() && v_th.is_finite()) {
            return Err(LifError::InvalidParameters(
                "The resting, reset, and threshold potentials must be finite".to_string(),
            ));
        }
        if !resistance.is_finite() {
            return Err(LifError::InvalidParameters(
                "The membrane resistance must be finite".to_string(),
            ));
        }

        Ok(NeuronParameters {
            tau_m,
            v_rest,
            v_reset,
            v_th,
            resistance,
        })
    }

    /// Returns the membrane time constant.
    pub fn tau_m(&self) -> f64 {
        self.tau_m
    }

    /// Returns the resting potential.
    pub fn v_rest(&self) -> f64 {
        self.v_rest
    }

    /// Returns the post-spike reset potential.
    pub fn v_reset(&self) -> f64 {
        self.v_reset
    }

    /// Returns the firing threshold.
    pub fn v_th(&self) -> f64 {
        self.v_th
    }

    /// Returns the membrane resistance.
    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    /// Returns the steady-state potential `v_rest + R * i` under the given constant input.
    pub fn steady_state(&self, input: f64) -> f64 {
        self.v_rest + self.resistance * input
    }

    /// Returns the time for the continuous membrane solution to reach the firing threshold,
    /// starting from the given potential, under the given constant input.
    /// Returns `None` if the trajectory never reaches the threshold.
    pub fn time_to_threshold(&self, from: f64, input: f64) -> Option<f64> {
        let v_inf = self.steady_state(input);
        if v_inf <= self.v_th {
            return None;
        }
        if from >= self.v_th {
            return Some(0.0);
        }
        Some(self.tau_m * ((v_inf - from) / (v_inf - self.v_th)).ln())
    }

    /// Returns the steady-state firing period under the given constant input, i.e., the time
    /// from a reset to the next threshold crossing of the continuous solution.
    /// Returns `None` if the neuron never fires.
    pub fn interspike_interval(&self, input: f64) -> Option<f64> {
        self.time_to_threshold(self.v_reset, input)
    }
}
