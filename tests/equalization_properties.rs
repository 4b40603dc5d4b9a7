//! Property and scenario tests for ring equalization
//!
//! - Bound convergence whenever the ring has room for the total
//! - No mass is created or lost by propagation
//! - Whole-ring Spin saturation raises a Spin jam
//! - A push into a fully saturated ring spreads to both neighbours and jams

use proptest::prelude::*;
use wellspring::core::config::EqualizeConfig;
use wellspring::core::types::{Bounds, WellArray, WELL_COUNT};
use wellspring::core::SimulationConfig;
use wellspring::simulation::equalize::{equalize_wells, propagate, split_weights};
use wellspring::simulation::{Collaborator, JamCause, SimulationState};

const DT: f64 = 0.05;
const AMOUNT: Bounds = Bounds::new(25.0, 100.0);
const SPIN: Bounds = Bounds::new(-100.0, 100.0);

fn ring(range: std::ops::Range<f64>) -> impl Strategy<Value = WellArray> {
    prop::array::uniform6(range)
}

proptest! {
    #[test]
    fn prop_propagation_conserves_mass(mut values in ring(-50.0..200.0), rate in 10.0..800.0f64) {
        let before: f64 = values.iter().sum();
        propagate(&mut values, AMOUNT, rate, DT, &EqualizeConfig::default());
        let after: f64 = values.iter().sum();
        prop_assert!((before - after).abs() < 1e-6);
    }

    #[test]
    fn prop_feasible_ring_converges_into_bounds(mut values in ring(15.0..110.0)) {
        let total: f64 = values.iter().sum();
        // Keep clear of the exactly-full and exactly-empty rings
        prop_assume!(total >= 6.0 * AMOUNT.min + 20.0 && total <= 6.0 * AMOUNT.max - 20.0);

        let report = propagate(&mut values, AMOUNT, 400.0, DT, &EqualizeConfig::default());
        for v in values {
            prop_assert!(v >= AMOUNT.min - 1e-3 && v <= AMOUNT.max + 1e-3, "value {} escaped", v);
        }
        prop_assert!(report.pos_sum < 1e-3);
        prop_assert!(report.neg_sum < 1e-3);
    }

    #[test]
    fn prop_in_bounds_values_are_untouched(mut values in ring(-100.0..100.0)) {
        let before = values;
        let report = propagate(&mut values, SPIN, 400.0, DT, &EqualizeConfig::default());
        prop_assert_eq!(values, before);
        prop_assert_eq!(report.moved, 0.0);
    }

    #[test]
    fn prop_split_weights_sum_to_one(left in 0.0..100.0f64, right in 0.0..100.0f64) {
        let w = split_weights(left, right, 1e-6);
        prop_assert!((w.left + w.right - 1.0).abs() < 1e-12);
        prop_assert!(w.left >= 0.0 && w.right >= 0.0);
    }
}

#[test]
fn test_overfull_ring_reports_residual() {
    let mut values = [100.0; WELL_COUNT];
    values[2] = 160.0;
    let report = propagate(&mut values, AMOUNT, 400.0, DT, &EqualizeConfig::default());
    assert!((report.pos_sum - 60.0).abs() < 1e-6);
    assert!(report.all_max);
}

#[test]
fn test_spin_all_max_raises_spin_jam() {
    let config = SimulationConfig::default();
    let mut state = SimulationState::with_wells([100.0; 6], [100.0; 6], [100.0; 6], &config);
    state.spin[3] += 25.0;

    let mut hooks = Collaborator::none();
    let outcome = equalize_wells(&mut state, &config, DT, &mut hooks);
    assert!(outcome.spin.all_max);
    assert!(outcome.spin.pos_sum > 0.0);
    assert_eq!(outcome.jams.len(), 1);
    assert_eq!(outcome.jams[0].cause, JamCause::SpinMax);
    assert!((outcome.jams[0].info.magnitude - 25.0).abs() < 1e-6);
}

#[test]
fn test_single_hot_spin_well_is_not_a_jam() {
    let config = SimulationConfig::default();
    let mut state = SimulationState::with_wells([100.0; 6], [0.0; 6], [100.0; 6], &config);
    state.spin[0] = 140.0;

    let mut hooks = Collaborator::none();
    let outcome = equalize_wells(&mut state, &config, DT, &mut hooks);
    assert!(outcome.jams.is_empty());
    assert!(state.spin.iter().all(|s| *s <= 100.0 + 1e-6));
}

#[test]
fn test_saturated_push_spreads_to_both_neighbors_and_jams() {
    let config = SimulationConfig::default();
    let mut state = SimulationState::with_wells([100.0; 6], [100.0; 6], [100.0; 6], &config);
    state.amount[0] += 30.0;

    let mut hooks = Collaborator::none();
    let outcome = equalize_wells(&mut state, &config, DT, &mut hooks);

    // Both neighbours are blocked, so the push is forced through half and half
    let split = split_weights(AMOUNT.capacity(100.0, 1.0), AMOUNT.capacity(100.0, 1.0), 1e-6);
    assert_eq!((split.left, split.right), (0.5, 0.5));
    assert!(state.amount[0] < 130.0);
    assert!(state.amount.iter().all(|a| *a >= 100.0 - 1e-9));
    assert!(outcome.amount.pos_sum > 0.0);
    assert!((outcome.amount.pos_sum - 30.0).abs() < 1e-6);
    assert_eq!(outcome.jams[0].cause, JamCause::AmountMax);
    assert_eq!(state.jam_count, 1);
}

#[test]
fn test_push_with_one_open_neighbor_goes_there() {
    let config = SimulationConfig::default();
    let mut amount = [100.0; 6];
    amount[5] = 80.0;
    let mut state = SimulationState::with_wells(amount, [0.0; 6], [100.0; 6], &config);
    state.amount[0] = 120.0;

    let mut hooks = Collaborator::none();
    let outcome = equalize_wells(&mut state, &config, DT, &mut hooks);
    assert!(outcome.jams.is_empty());
    assert_eq!(state.amount[1], 100.0);
    assert!((state.amount[5] - 100.0).abs() < 1e-9);
    assert!((state.amount[0] - 100.0).abs() < 1e-9);
}
