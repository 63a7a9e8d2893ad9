//! This crate provides tools for simulating a leaky integrate-and-fire (LIF) neuron in
//! Rust under three numerical integration schemes (forward Euler, backward Euler, exact
//! exponential update) and for comparing their membrane traces and spike timings against
//! a high-resolution reference as the time step varies.
//!
//! # Simulating a Neuron
//!
//! ```rust
//! use rusty_lif::integrator::Integrator;
//! use rusty_lif::neuron::NeuronParameters;
//! use rusty_lif::simulator::{simulate, InputCurrent, SimulationConfig};
//!
//! // A membrane with a 20 ms time constant, in millivolt/megaohm/nanoamp units:
//! // a constant 2 nA input drives the membrane 20 mV above rest
//! let params = NeuronParameters::build(20e-3, -65.0, -70.0, -50.0, 10.0).unwrap();
//! let config = SimulationConfig::build(1e-4, 0.5, InputCurrent::Constant(2.0)).unwrap();
//!
//! let trace = simulate(&params, &config, Integrator::Exponential).unwrap();
//!
//! assert_eq!(trace.times().len(), config.num_steps() + 1);
//! assert!(trace.num_spikes() > 0);
//! ```
//!
//! # Comparing Integration Schemes
//!
//! ```rust
//! use rusty_lif::comparator::{compare, ReferenceResolution};
//! use rusty_lif::neuron::NeuronParameters;
//!
//! let params = NeuronParameters::build(20e-3, -65.0, -70.0, -50.0, 10.0).unwrap();
//! let report = compare(&params, &[1e-3, 5e-3], 0.5, 2.0, ReferenceResolution::default()).unwrap();
//!
//! // One record per time step and scheme, sorted by time step
//! assert_eq!(report.records().len(), 6);
//! ```

pub mod comparator;
pub mod error;
pub mod integrator;
pub mod neuron;
pub mod simulator;

/// The default refinement factor between the finest swept time step and the reference time step.
pub const REFERENCE_REFINEMENT: f64 = 10.0;
/// The tolerance for two simulation times to be considered equal.
pub const TIME_TOLERANCE: f64 = 1e-9;
