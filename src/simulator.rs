//! Simulation driver for a single leaky integrate-and-fire neuron.
//!
//! The driver advances the membrane potential with the chosen integration scheme over a
//! fixed step grid and collects the full voltage trace together with the spike times.
//! A run is a pure function of its inputs: identical parameters, configuration, and
//! scheme always produce identical traces.
//!
//! # Examples
//!
//! ```rust
//! use rusty_lif::integrator::Integrator;
//! use rusty_lif::neuron::NeuronParameters;
//! use rusty_lif::simulator::{simulate, InputCurrent, SimulationConfig};
//!
//! // A membrane with a 20 ms time constant, in millivolt/megaohm/nanoamp units
//! let params = NeuronParameters::build(20e-3, -65.0, -70.0, -50.0, 10.0).unwrap();
//! let config = SimulationConfig::build(1e-3, 0.5, InputCurrent::Constant(2.0)).unwrap();
//!
//! let trace = simulate(&params, &config, Integrator::Exponential).unwrap();
//!
//! assert_eq!(trace.times().len(), config.num_steps() + 1);
//! assert!(trace.num_spikes() > 0);
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::LifError;
use super::integrator::Integrator;
use super::neuron::NeuronParameters;

/// The input current driving a simulation.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub enum InputCurrent {
    /// A constant current over the whole duration.
    Constant(f64),
    /// A current sampled on the step grid; sample n drives the step from n*dt to (n+1)*dt.
    Sampled(Vec<f64>),
}

impl InputCurrent {
    // The current driving the step of the given index.
    fn value_at(&self, step: usize) -> f64 {
        match self {
            InputCurrent::Constant(value) => *value,
            InputCurrent::Sampled(values) => values[step],
        }
    }
}

/// The configuration of a single simulation run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    // The time step.
    dt: f64,
    // The total duration.
    duration: f64,
    // The input current.
    input: InputCurrent,
    // The initial membrane potential; the resting potential when absent.
    initial_voltage: Option<f64>,
    // The guard interval for the membrane potential; unguarded when absent.
    lim_voltage: Option<(f64, f64)>,
}

impl SimulationConfig {
    /// Create a new configuration.
    /// The function returns an error for a non-positive time step or duration, or for a
    /// sampled input that does not cover the step grid or contains non-finite values.
    pub fn build(dt: f64, duration: f64, input: InputCurrent) -> Result<Self, LifError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(LifError::InvalidParameters(
                "The time step must be a positive number".to_string(),
            ));
        }
        if !duration.is_finite() || duration <= 0.0 {
            return Err(LifError::InvalidParameters(
                "The duration must be a positive number".to_string(),
            ));
        }

        if let InputCurrent::Sampled(values) = &input {
            let num_steps = (duration / dt).ceil() as usize;
            if values.len() < num_steps {
                return Err(LifError::InvalidParameters(format!(
                    "The sampled input has {} values but the step grid requires {}",
                    values.len(),
                    num_steps
                )));
            }
            if values.iter().any(|value| !value.is_finite()) {
                return Err(LifError::InvalidParameters(
                    "The sampled input values must be finite".to_string(),
                ));
            }
        }

        Ok(SimulationConfig {
            dt,
            duration,
            input,
            initial_voltage: None,
            lim_voltage: None,
        })
    }

    /// Start the run from the given potential instead of the resting potential.
    pub fn with_initial_voltage(mut self, voltage: f64) -> Result<Self, LifError> {
        if !voltage.is_finite() {
            return Err(LifError::InvalidParameters(
                "The initial voltage must be finite".to_string(),
            ));
        }
        self.initial_voltage = Some(voltage);
        Ok(self)
    }

    /// Abort the run as soon as the membrane potential leaves the given interval or
    /// becomes non-finite. Unguarded runs never fail, whatever the scheme does.
    pub fn with_voltage_limits(mut self, v_min: f64, v_max: f64) -> Result<Self, LifError> {
        if !(v_min.is_finite() && v_max.is_finite()) || v_min >= v_max {
            return Err(LifError::InvalidParameters(
                "The voltage limits must be finite and properly ordered".to_string(),
            ));
        }
        self.lim_voltage = Some((v_min, v_max));
        Ok(self)
    }

    /// Returns the time step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    /// Returns the total duration.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Returns the input current.
    pub fn input(&self) -> &InputCurrent {
        &self.input
    }

    /// Returns the initial membrane potential, if one was set.
    pub fn initial_voltage(&self) -> Option<f64> {
        self.initial_voltage
    }

    /// Returns the number of steps on the grid, i.e., the smallest number of whole steps
    /// covering the duration.
    pub fn num_steps(&self) -> usize {
        (self.duration / self.dt).ceil() as usize
    }
}

/// The result of a single simulation run.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SimulationTrace {
    // The sample times, starting at zero.
    times: Vec<f64>,
    // The membrane potential at each sample time.
    voltages: Vec<f64>,
    // The (sorted) spike times.
    spike_times: Vec<f64>,
}

impl SimulationTrace {
    /// Returns a slice of sample times.
    pub fn times(&self) -> &[f64] {
        &self.times[..]
    }

    /// Returns a slice of membrane potentials, one per sample time.
    pub fn voltages(&self) -> &[f64] {
        &self.voltages[..]
    }

    /// Returns a slice of spike times.
    pub fn spike_times(&self) -> &[f64] {
        &self.spike_times[..]
    }

    /// Returns the number of spikes of the run.
    pub fn num_spikes(&self) -> usize {
        self.spike_times.len()
    }

    /// Returns the first spike time of the run, if any.
    pub fn first_spike_time(&self) -> Option<f64> {
        self.spike_times.first().copied()
    }

    /// Returns the membrane potential after the given number of steps, if on the grid.
    pub fn voltage_at(&self, step: usize) -> Option<f64> {
        self.voltages.get(step).copied()
    }

    /// Save the trace to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), LifError> {
        let file = File::create(path).map_err(|e| LifError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| LifError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| LifError::IOError(e.to_string()))
    }

    /// Load a trace from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, LifError> {
        let file = File::open(path).map_err(|e| LifError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| LifError::IOError(e.to_string()))
    }
}

/// Simulate the neuron over the configured step grid with the given integration scheme.
///
/// The run starts from the configured initial potential (the resting potential by default)
/// and calls the stepping function once per step. The trace holds one sample per grid
/// point, including the initial state, and a spike emitted during step n is recorded at
/// time (n+1)*dt, the time of the sample it resets.
pub fn simulate(
    params: &NeuronParameters,
    config: &SimulationConfig,
    method: Integrator,
) -> Result<SimulationTrace, LifError> {
    let num_steps = config.num_steps();
    let dt = config.dt();

    let mut v = config.initial_voltage().unwrap_or(params.v_rest());
    let mut times = Vec::with_capacity(num_steps + 1);
    let mut voltages = Vec::with_capacity(num_steps + 1);
    let mut spike_times: Vec<f64> = vec![];

    times.push(0.0);
    voltages.push(v);

    for n in 0..num_steps {
        let (v_next, spiked) = method.step(v, config.input.value_at(n), params, dt);

        if let Some((v_min, v_max)) = config.lim_voltage {
            if !v_next.is_finite() || v_next < v_min || v_next > v_max {
                return Err(LifError::VoltageOutOfBounds {
                    step: n + 1,
                    voltage: v_next,
                });
            }
        }

        let time = (n + 1) as f64 * dt;
        if spiked {
            spike_times.push(time);
        }
        times.push(time);
        voltages.push(v_next);
        v = v_next;
    }

    log::debug!(
        "Simulation done! {} steps with the {} scheme, {} spikes",
        num_steps,
        method,
        spike_times.len()
    );

    Ok(SimulationTrace {
        times,
        voltages,
        spike_times,
    })
}
