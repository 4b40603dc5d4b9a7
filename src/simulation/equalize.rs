//! Ring equalization - resolves out-of-bound well values by pushing the excess
//! into ring neighbors
//!
//! The same solver runs once for Amount and once for Spin:
//! 1. Each pass walks the six wells. A well outside its bounds moves up to
//!    `rate * dt` of its excess into its two neighbors.
//! 2. Open neighbors (room left in the transfer direction) are preferred.
//!    Two open neighbors split by remaining capacity; one open neighbor takes
//!    everything; two blocked neighbors split 50/50 anyway, so the excess keeps
//!    travelling outward through saturated wells.
//! 3. Passes stop once a pass moves no more than epsilon, or at `max_iters`.
//! 4. The residual overflow and underflow summed over the whole ring is the
//!    jam signal.

use serde::{Deserialize, Serialize};

use crate::core::config::{EqualizeConfig, SimulationConfig};
use crate::core::types::{neighbors, Bounds, WellArray, WELL_COUNT};
use crate::simulation::hooks::{BreakResponse, Collaborator, JamCause, JamInfo};
use crate::simulation::state::SimulationState;

/// Result of one propagation call over a ring
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingReport {
    /// Total remaining excess above max across all wells
    pub pos_sum: f64,
    /// Total remaining shortfall below min across all wells (as a magnitude)
    pub neg_sum: f64,
    /// Well with the largest single excess above max
    pub worst_pos_index: usize,
    /// Well with the largest single shortfall below min
    pub worst_neg_index: usize,
    /// Every well is at or above max
    pub all_max: bool,
    /// Every well is at or below min
    pub all_min: bool,
    /// Passes actually run
    pub iterations: usize,
    pub converged: bool,
    /// Total magnitude moved over all passes
    pub moved: f64,
}

/// Split of a transfer between the left and right neighbor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitWeights {
    pub left: f64,
    pub right: f64,
}

/// Decide how a transfer is shared between two neighbors given their
/// remaining capacity in the transfer direction
pub fn split_weights(cap_left: f64, cap_right: f64, epsilon: f64) -> SplitWeights {
    let left_open = cap_left > epsilon;
    let right_open = cap_right > epsilon;
    match (left_open, right_open) {
        (true, true) => {
            let total = cap_left + cap_right;
            SplitWeights {
                left: cap_left / total,
                right: cap_right / total,
            }
        }
        (true, false) => SplitWeights { left: 1.0, right: 0.0 },
        (false, true) => SplitWeights { left: 0.0, right: 1.0 },
        // Forced through: creates secondary overflow on purpose
        (false, false) => SplitWeights { left: 0.5, right: 0.5 },
    }
}

/// Move one well's excess into its neighbors. Returns the magnitude moved.
fn transfer_from(values: &mut WellArray, index: usize, bounds: Bounds, step_cap: f64, epsilon: f64) -> f64 {
    let over = bounds.excess(values[index]);
    if over.abs() <= epsilon {
        return 0.0;
    }
    let sign = over.signum();
    let mag = over.abs().min(step_cap);
    if mag <= 0.0 {
        return 0.0;
    }

    let (left, right) = neighbors(index);
    let weights = split_weights(
        bounds.capacity(values[left], sign),
        bounds.capacity(values[right], sign),
        epsilon,
    );

    let delta = sign * mag;
    values[index] -= delta;
    values[left] += delta * weights.left;
    values[right] += delta * weights.right;
    mag
}

/// Run up to `max_iters` propagation passes over `values`
pub fn propagate(
    values: &mut WellArray,
    bounds: Bounds,
    rate: f64,
    dt: f64,
    config: &EqualizeConfig,
) -> RingReport {
    let step_cap = (rate * dt).max(0.0);
    let mut iterations = 0;
    let mut converged = false;
    let mut moved_total = 0.0;

    for _ in 0..config.max_iters {
        let mut moved_this_iter = 0.0;
        for i in 0..WELL_COUNT {
            moved_this_iter += transfer_from(values, i, bounds, step_cap, config.epsilon);
        }
        iterations += 1;
        moved_total += moved_this_iter;
        if moved_this_iter <= config.epsilon {
            converged = true;
            break;
        }
    }

    let mut report = summarize(values, bounds, config.epsilon);
    report.iterations = iterations;
    report.converged = converged;
    report.moved = moved_total;
    report
}

/// Measure residual overflow over the whole ring without moving anything
pub fn summarize(values: &WellArray, bounds: Bounds, epsilon: f64) -> RingReport {
    let mut pos_sum = 0.0;
    let mut neg_sum = 0.0;
    let mut worst_pos = (0, 0.0);
    let mut worst_neg = (0, 0.0);

    for (i, v) in values.iter().enumerate() {
        let over = bounds.excess(*v);
        if over > 0.0 {
            pos_sum += over;
            if over > worst_pos.1 {
                worst_pos = (i, over);
            }
        } else if over < 0.0 {
            neg_sum -= over;
            if -over > worst_neg.1 {
                worst_neg = (i, -over);
            }
        }
    }

    RingReport {
        pos_sum,
        neg_sum,
        worst_pos_index: worst_pos.0,
        worst_neg_index: worst_neg.0,
        all_max: values.iter().all(|v| *v >= bounds.max - epsilon),
        all_min: values.iter().all(|v| *v <= bounds.min + epsilon),
        iterations: 0,
        converged: true,
        moved: 0.0,
    }
}

/// A jam picked from the ring reports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Jam {
    pub cause: JamCause,
    pub info: JamInfo,
    /// Raised by the Spin relief cascade check rather than the first pass
    pub cascade: bool,
}

fn amount_candidates(amount: &RingReport, threshold: f64) -> impl Iterator<Item = Jam> {
    let max = (amount.pos_sum > threshold).then_some(Jam {
        cause: JamCause::AmountMax,
        info: JamInfo { index: amount.worst_pos_index, magnitude: amount.pos_sum },
        cascade: false,
    });
    let min = (amount.neg_sum > threshold).then_some(Jam {
        cause: JamCause::AmountMin,
        info: JamInfo { index: amount.worst_neg_index, magnitude: amount.neg_sum },
        cascade: false,
    });
    max.into_iter().chain(min)
}

fn spin_candidates(spin: &RingReport, threshold: f64) -> impl Iterator<Item = Jam> {
    // Spin only jams when the whole ring is pinned at the extreme
    let max = (spin.pos_sum > threshold && spin.all_max).then_some(Jam {
        cause: JamCause::SpinMax,
        info: JamInfo { index: spin.worst_pos_index, magnitude: spin.pos_sum },
        cascade: false,
    });
    let min = (spin.neg_sum > threshold && spin.all_min).then_some(Jam {
        cause: JamCause::SpinMin,
        info: JamInfo { index: spin.worst_neg_index, magnitude: spin.neg_sum },
        cascade: false,
    });
    max.into_iter().chain(min)
}

fn largest(candidates: impl Iterator<Item = Jam>) -> Option<Jam> {
    candidates.fold(None, |best: Option<Jam>, jam| match best {
        Some(b) if b.info.magnitude >= jam.info.magnitude => Some(b),
        _ => Some(jam),
    })
}

/// Pick the largest Amount jam, if any
pub fn select_amount_jam(amount: &RingReport, threshold: f64) -> Option<Jam> {
    largest(amount_candidates(amount, threshold))
}

/// Pick the largest Spin jam, if any
pub fn select_spin_jam(spin: &RingReport, threshold: f64) -> Option<Jam> {
    largest(spin_candidates(spin, threshold))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ring {
    Amount,
    Spin,
}

/// Rings that jammed after the first pass, largest magnitude first
fn jammed_rings(amount: &RingReport, spin: &RingReport, threshold: f64) -> Vec<Ring> {
    let mut rings: Vec<(Ring, f64)> = [
        select_amount_jam(amount, threshold).map(|j| (Ring::Amount, j.info.magnitude)),
        select_spin_jam(spin, threshold).map(|j| (Ring::Spin, j.info.magnitude)),
    ]
    .into_iter()
    .flatten()
    .collect();
    rings.sort_by(|a, b| b.1.total_cmp(&a.1));
    rings.into_iter().map(|(ring, _)| ring).collect()
}

/// Everything the equalization stage did in one tick
#[derive(Debug, Clone, PartialEq)]
pub struct EqualizeOutcome {
    /// Final Amount report, after any relief re-run
    pub amount: RingReport,
    /// Final Spin report, after any relief re-run
    pub spin: RingReport,
    /// Jams raised this tick, primary first
    pub jams: Vec<Jam>,
    /// Merged collaborator responses
    pub response: BreakResponse,
}

fn propagate_amount(state: &mut SimulationState, config: &SimulationConfig, dt: f64) -> RingReport {
    propagate(
        &mut state.amount,
        config.bounds.amount(),
        config.equalize.amount_rate,
        dt,
        &config.equalize,
    )
}

fn propagate_spin(state: &mut SimulationState, config: &SimulationConfig, dt: f64) -> RingReport {
    propagate(
        &mut state.spin,
        config.bounds.spin(),
        config.equalize.spin_rate,
        dt,
        &config.equalize,
    )
}

fn raise(
    state: &mut SimulationState,
    hooks: &mut Collaborator,
    outcome: &mut EqualizeOutcome,
    jam: Jam,
) {
    tracing::info!(
        "{} at well {} (magnitude {:.3}{})",
        jam.cause.label(),
        jam.info.index,
        jam.info.magnitude,
        if jam.cascade { ", cascade" } else { "" }
    );
    state.jam_count += 1;
    let response = hooks.trigger_jam(state, jam.cause, jam.info);
    outcome.response.merge(response);
    outcome.jams.push(jam);
}

fn repropagate(state: &mut SimulationState, config: &SimulationConfig, dt: f64, outcome: &mut EqualizeOutcome) {
    outcome.amount = propagate_amount(state, config, dt);
    outcome.spin = propagate_spin(state, config, dt);
}

/// Equalize Amount and Spin, then handle each ring's jam
///
/// Each ring raises at most one jam of its own, largest ring first. After
/// every jam both rings are propagated again so relief the collaborator
/// applied can spread in the same tick, and a ring whose jam that relief
/// cleared is not raised. Amount overflow created or grown by relieving a
/// Spin jam is raised as a cascade before returning.
pub fn equalize_wells(
    state: &mut SimulationState,
    config: &SimulationConfig,
    dt: f64,
    hooks: &mut Collaborator,
) -> EqualizeOutcome {
    let threshold = config.equalize.jam_threshold;
    let amount = propagate_amount(state, config, dt);
    let spin = propagate_spin(state, config, dt);

    let mut outcome = EqualizeOutcome {
        amount,
        spin,
        jams: Vec::new(),
        response: BreakResponse::default(),
    };
    let mut amount_raised = false;

    for ring in jammed_rings(&amount, &spin, threshold) {
        let jam = match ring {
            Ring::Amount if amount_raised => None,
            Ring::Amount => select_amount_jam(&outcome.amount, threshold),
            Ring::Spin => select_spin_jam(&outcome.spin, threshold),
        };
        let Some(jam) = jam else {
            continue;
        };

        let amount_before = select_amount_jam(&outcome.amount, threshold).map_or(0.0, |j| j.info.magnitude);
        raise(state, hooks, &mut outcome, jam);
        repropagate(state, config, dt, &mut outcome);

        match ring {
            Ring::Amount => amount_raised = true,
            Ring::Spin => {
                let created = select_amount_jam(&outcome.amount, threshold)
                    .filter(|j| j.info.magnitude > amount_before + threshold);
                if let Some(mut cascade) = created {
                    cascade.cascade = true;
                    raise(state, hooks, &mut outcome, cascade);
                    repropagate(state, config, dt, &mut outcome);
                    amount_raised = true;
                }
            }
        }
    }

    outcome
}
