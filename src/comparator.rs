//! This module compares the integration schemes across a sweep of time steps.
//!
//! For every swept time step, all three schemes simulate the same neuron under the same
//! constant input, and their spike count and first spike time are measured against a
//! reference run: the exponential scheme at a much finer time step. Spike presence can
//! genuinely differ between a scheme and the reference (a coarse explicit step can
//! fabricate or suppress spikes), so the timing error is an explicit optional value
//! rather than a number.
//!
//! # Examples
//!
//! ```rust
//! use rusty_lif::comparator::{compare, ReferenceResolution};
//! use rusty_lif::neuron::NeuronParameters;
//!
//! let params = NeuronParameters::build(20e-3, -65.0, -70.0, -50.0, 10.0).unwrap();
//! let report = compare(&params, &[1e-3, 2e-3], 0.1, 2.0, ReferenceResolution::default()).unwrap();
//!
//! // One record per time step and scheme, sorted by time step
//! assert_eq!(report.records().len(), 6);
//! assert!(report.records().iter().all(|record| record.spike_count_error <= 1));
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::LifError;
use super::integrator::Integrator;
use super::neuron::NeuronParameters;
use super::simulator::{simulate, InputCurrent, SimulationConfig};
use super::REFERENCE_REFINEMENT;

/// The rule resolving the time step of the reference run.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub enum ReferenceResolution {
    /// Use the given time step for the reference run.
    Fixed(f64),
    /// Divide the finest swept time step by the given factor (greater than one).
    RelativeToFinest(f64),
}

impl Default for ReferenceResolution {
    fn default() -> Self {
        ReferenceResolution::RelativeToFinest(REFERENCE_REFINEMENT)
    }
}

impl ReferenceResolution {
    // Resolve the reference time step for the given finest swept time step.
    fn resolve(&self, finest_dt: f64) -> Result<f64, LifError> {
        match self {
            ReferenceResolution::Fixed(dt_ref) => {
                if !dt_ref.is_finite() || *dt_ref <= 0.0 {
                    return Err(LifError::InvalidParameters(
                        "The reference time step must be a positive number".to_string(),
                    ));
                }
                Ok(*dt_ref)
            }
            ReferenceResolution::RelativeToFinest(factor) => {
                if !factor.is_finite() || *factor <= 1.0 {
                    return Err(LifError::InvalidParameters(
                        "The reference refinement factor must be greater than one".to_string(),
                    ));
                }
                Ok(finest_dt / factor)
            }
        }
    }
}

/// The metrics of one scheme at one swept time step.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MethodRecord {
    /// The swept time step.
    pub dt: f64,
    /// The integration scheme.
    pub method: Integrator,
    /// The number of spikes of the run.
    pub spike_count: usize,
    /// The absolute spike count difference with the reference run.
    pub spike_count_error: usize,
    /// The first spike time of the run, if any.
    pub first_spike_time: Option<f64>,
    /// The absolute first spike time difference with the reference run.
    /// Absent whenever the run and the reference disagree on spike presence.
    pub first_spike_error: Option<f64>,
}

/// The reference run summary of a sweep.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ReferenceSummary {
    /// The resolved reference time step.
    pub dt: f64,
    /// The number of spikes of the reference run.
    pub spike_count: usize,
    /// The first spike time of the reference run, if any.
    pub first_spike_time: Option<f64>,
}

/// The outcome of a sweep: the reference summary and one record per time step and scheme.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    // The reference run summary.
    reference: ReferenceSummary,
    // The records, sorted by time step and scheme.
    records: Vec<MethodRecord>,
}

impl ComparisonReport {
    /// Returns the reference run summary.
    pub fn reference(&self) -> &ReferenceSummary {
        &self.reference
    }

    /// Returns a slice of records, sorted by time step and scheme.
    pub fn records(&self) -> &[MethodRecord] {
        &self.records[..]
    }

    /// Save the report to a file.
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> Result<(), LifError> {
        let file = File::create(path).map_err(|e| LifError::IOError(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)
            .map_err(|e| LifError::IOError(e.to_string()))?;
        writer.flush().map_err(|e| LifError::IOError(e.to_string()))
    }

    /// Load a report from a file.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, LifError> {
        let file = File::open(path).map_err(|e| LifError::IOError(e.to_string()))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader).map_err(|e| LifError::IOError(e.to_string()))
    }
}

/// Run all three schemes over a sweep of time steps and measure them against a reference.
///
/// The reference run uses the exponential scheme at the time step resolved by the given
/// rule, which must be finer than every swept time step. The sweep runs under a constant
/// input current: a sampled sequence is tied to one specific grid and cannot drive runs
/// at different time steps. Runs are independent and execute in parallel; records are
/// reported sorted by time step, with the schemes in their nominal order within each
/// time step.
pub fn compare(
    params: &NeuronParameters,
    dt_values: &[f64],
    duration: f64,
    input: f64,
    reference: ReferenceResolution,
) -> Result<ComparisonReport, LifError> {
    if dt_values.is_empty() {
        return Err(LifError::InvalidParameters(
            "The time step sweep must not be empty".to_string(),
        ));
    }
    if dt_values.iter().any(|dt| !dt.is_finite() || *dt <= 0.0) {
        return Err(LifError::InvalidParameters(
            "The swept time steps must be positive numbers".to_string(),
        ));
    }

    let mut dts = dt_values.to_vec();
    dts.sort_by(|dt1, dt2| dt1.partial_cmp(dt2).unwrap());

    let dt_ref = reference.resolve(dts[0])?;
    if dt_ref >= dts[0] {
        return Err(LifError::InvalidParameters(format!(
            "The reference time step ({}) must be finer than every swept time step ({})",
            dt_ref, dts[0]
        )));
    }

    let ref_config = SimulationConfig::build(dt_ref, duration, InputCurrent::Constant(input))?;
    let ref_trace = simulate(params, &ref_config, Integrator::Exponential)?;
    let reference = ReferenceSummary {
        dt: dt_ref,
        spike_count: ref_trace.num_spikes(),
        first_spike_time: ref_trace.first_spike_time(),
    };
    log::info!(
        "Reference run done! {} spikes with the {} scheme at dt = {}",
        reference.spike_count,
        Integrator::Exponential,
        dt_ref
    );

    let runs: Vec<(f64, Integrator)> = dts
        .iter()
        .copied()
        .cartesian_product(Integrator::ALL)
        .collect();

    let records = runs
        .par_iter()
        .map(|&(dt, method)| {
            let config = SimulationConfig::build(dt, duration, InputCurrent::Constant(input))?;
            let trace = simulate(params, &config, method)?;

            let first_spike_time = trace.first_spike_time();
            let first_spike_error = match (first_spike_time, reference.first_spike_time) {
                (Some(time), Some(ref_time)) => Some((time - ref_time).abs()),
                _ => None,
            };

            Ok(MethodRecord {
                dt,
                method,
                spike_count: trace.num_spikes(),
                spike_count_error: trace.num_spikes().abs_diff(reference.spike_count),
                first_spike_time,
                first_spike_error,
            })
        })
        .collect::<Result<Vec<MethodRecord>, LifError>>()?;

    log::info!(
        "Sweep done! {} records over {} time steps",
        records.len(),
        dts.len()
    );

    Ok(ComparisonReport { reference, records })
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn regular_firing_params() -> NeuronParameters {
        NeuronParameters::build(20e-3, -65.0, -70.0, -50.0, 10.0).unwrap()
    }

    #[test]
    fn test_reference_resolution_default() {
        assert_eq!(
            ReferenceResolution::default(),
            ReferenceResolution::RelativeToFinest(REFERENCE_REFINEMENT)
        );
    }

    #[test]
    fn test_reference_resolution_resolve() {
        assert_relative_eq!(
            ReferenceResolution::Fixed(1e-5).resolve(1e-3).unwrap(),
            1e-5,
            epsilon = 1e-18
        );
        assert_relative_eq!(
            ReferenceResolution::RelativeToFinest(10.0)
                .resolve(1e-3)
                .unwrap(),
            1e-4,
            epsilon = 1e-12
        );

        assert!(matches!(
            ReferenceResolution::Fixed(0.0).resolve(1e-3),
            Err(LifError::InvalidParameters(_))
        ));
        assert!(matches!(
            ReferenceResolution::RelativeToFinest(0.5).resolve(1e-3),
            Err(LifError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_compare_rejects_invalid_sweeps() {
        let params = regular_firing_params();

        assert!(matches!(
            compare(&params, &[], 0.1, 2.0, ReferenceResolution::default()),
            Err(LifError::InvalidParameters(_))
        ));
        assert!(matches!(
            compare(&params, &[1e-3, 0.0], 0.1, 2.0, ReferenceResolution::default()),
            Err(LifError::InvalidParameters(_))
        ));

        // The reference must be strictly finer than the whole sweep
        assert!(matches!(
            compare(
                &params,
                &[1e-3, 5e-3],
                0.1,
                2.0,
                ReferenceResolution::Fixed(1e-3)
            ),
            Err(LifError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_compare_records_are_sorted() {
        let params = regular_firing_params();
        let report = compare(
            &params,
            &[5e-3, 1e-3],
            0.1,
            2.0,
            ReferenceResolution::default(),
        )
        .unwrap();

        assert_relative_eq!(report.reference().dt, 1e-4, epsilon = 1e-12);
        assert_eq!(report.records().len(), 6);
        for (i, record) in report.records().iter().enumerate() {
            let expected_dt = if i < 3 { 1e-3 } else { 5e-3 };
            assert_relative_eq!(record.dt, expected_dt, epsilon = 1e-15);
            assert_eq!(record.method, Integrator::ALL[i % 3]);
        }
    }

    #[test]
    fn test_compare_exponential_matches_reference_at_fine_steps() {
        let params = regular_firing_params();
        let report = compare(
            &params,
            &[1e-4],
            0.2,
            2.0,
            ReferenceResolution::Fixed(1e-5),
        )
        .unwrap();

        assert!(report.reference().spike_count > 0);

        let record = report
            .records()
            .iter()
            .find(|record| record.method == Integrator::Exponential)
            .unwrap();
        assert!(record.spike_count_error <= 1);
        assert!(record.first_spike_error.unwrap() <= 2e-4);
    }

    #[test]
    fn test_compare_reports_incomparable_spike_presence() {
        // The steady state sits 2 mV below the threshold: the membrane never fires, but a
        // coarse explicit step overshoots it and fabricates spikes
        let params = regular_firing_params();
        let report = compare(
            &params,
            &[0.03],
            0.32,
            1.3,
            ReferenceResolution::default(),
        )
        .unwrap();

        assert_eq!(report.reference().spike_count, 0);
        assert_eq!(report.reference().first_spike_time, None);

        let forward = &report.records()[0];
        assert_eq!(forward.method, Integrator::ForwardEuler);
        assert!(forward.spike_count > 0);
        assert_eq!(forward.spike_count_error, forward.spike_count);
        assert_relative_eq!(forward.first_spike_time.unwrap(), 0.03, epsilon = 1e-9);
        assert_eq!(forward.first_spike_error, None);

        for record in &report.records()[1..] {
            assert_eq!(record.spike_count, 0);
            assert_eq!(record.spike_count_error, 0);
            assert_eq!(record.first_spike_time, None);
            assert_eq!(record.first_spike_error, None);
        }
    }

    #[test]
    fn test_report_save_load() {
        let params = regular_firing_params();
        let report = compare(
            &params,
            &[2e-3],
            0.1,
            2.0,
            ReferenceResolution::default(),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        report.save_to(&path).unwrap();
        assert_eq!(ComparisonReport::load_from(&path).unwrap(), report);
    }
}
