use approx::assert_relative_eq;
use itertools::Itertools;

use rusty_lif::comparator::{compare, ReferenceResolution};
use rusty_lif::integrator::Integrator;
use rusty_lif::neuron::NeuronParameters;
use rusty_lif::simulator::{simulate, InputCurrent, SimulationConfig};

// A membrane with a 20 ms time constant, in millivolt/megaohm/nanoamp units:
// a constant 2 nA input drives the membrane to a steady state 5 mV above threshold.
fn regular_firing_params() -> NeuronParameters {
    NeuronParameters::build(20e-3, -65.0, -70.0, -50.0, 10.0).unwrap()
}

#[test]
fn test_exponential_scheme_fires_regularly_at_fine_resolution() {
    let params = regular_firing_params();
    let dt = 1e-4;
    let config = SimulationConfig::build(dt, 0.5, InputCurrent::Constant(2.0)).unwrap();
    let trace = simulate(&params, &config, Integrator::Exponential).unwrap();

    let isi = params.interspike_interval(2.0).unwrap();
    assert_relative_eq!(isi, 20e-3 * 5.0_f64.ln(), epsilon = 1e-12);

    // The first crossing happens from rest, all later ones from reset
    let first_crossing = params.time_to_threshold(params.v_rest(), 2.0).unwrap();
    assert!((trace.first_spike_time().unwrap() - first_crossing).abs() <= 2.0 * dt);

    let expected_count = 1 + ((0.5 - first_crossing) / isi).floor() as usize;
    assert!(trace.num_spikes().abs_diff(expected_count) <= 1);

    // The steady spike train is regular up to the grid quantization
    for (t1, t2) in trace.spike_times().iter().tuple_windows() {
        assert!(((t2 - t1) - isi).abs() <= 2.0 * dt);
    }
}

#[test]
fn test_coarse_forward_euler_fabricates_spikes_while_backward_stays_bounded() {
    // At dt = tau_m, a forward Euler step lands exactly on the suprathreshold steady
    // state, so the scheme fires on every single step
    let params = regular_firing_params();
    let report = compare(&params, &[0.02], 0.5, 2.0, ReferenceResolution::default()).unwrap();

    let reference_count = report.reference().spike_count;
    assert!(reference_count > 0);

    let forward = &report.records()[0];
    let backward = &report.records()[1];
    assert_eq!(forward.method, Integrator::ForwardEuler);
    assert_eq!(backward.method, Integrator::BackwardEuler);

    assert_eq!(forward.spike_count, 25);
    assert!(forward.spike_count > reference_count);
    assert!(backward.spike_count <= reference_count);
    assert!(backward.spike_count_error < forward.spike_count_error);
}

#[test]
fn test_sweep_reports_every_scheme_and_time_step_sorted() {
    let params = regular_firing_params();
    let dts = [0.02, 1e-3, 5e-3];
    let report = compare(&params, &dts, 0.5, 2.0, ReferenceResolution::default()).unwrap();

    assert_eq!(report.records().len(), 9);
    assert_relative_eq!(report.reference().dt, 1e-4, epsilon = 1e-12);

    let mut sorted_dts = dts.to_vec();
    sorted_dts.sort_by(|dt1, dt2| dt1.partial_cmp(dt2).unwrap());
    for (i, record) in report.records().iter().enumerate() {
        assert_relative_eq!(record.dt, sorted_dts[i / 3], epsilon = 1e-15);
        assert_eq!(record.method, Integrator::ALL[i % 3]);

        // Every scheme fires under this strongly suprathreshold input, so all records
        // carry a comparable first spike time
        assert!(record.spike_count > 0);
        assert!(record.first_spike_time.is_some());
        assert!(record.first_spike_error.is_some());
    }

    // At the finest time step, all three schemes agree with the reference
    for record in &report.records()[..3] {
        assert!(record.spike_count_error <= 1);
        assert!(record.first_spike_error.unwrap() <= 2e-3);
    }
}
