//! Tick system - orchestrates one simulation step
//!
//! Stage order is fixed and every stage reads what the previous one left:
//! freeze check -> break check -> Psyche display clamp -> warning crossings
//! -> objective -> energy -> dispositions -> equalization -> final clamp
//! -> Psyche drive.

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{Hue, LevelState, WellArray, WELL_COUNT};
use crate::disposition::{DispositionEngine, DispositionEvent, DispositionType, InstanceId};
use crate::objective::ObjectiveEvaluator;
use crate::simulation::drive::drive_psyche;
use crate::simulation::equalize::equalize_wells;
use crate::simulation::hooks::{BreakResponse, Collaborator, JamCause};
use crate::simulation::state::SimulationState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningLevel {
    High,
    Low,
}

/// Events generated during a simulation tick
///
/// Returned by `run_tick` and buffered by the session for the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimulationEvent {
    JamTriggered {
        cause: JamCause,
        index: usize,
        magnitude: f64,
        cascade: bool,
    },
    /// Display Psyche crossed a warning threshold
    PsycheWarning {
        hue: usize,
        level: WarningLevel,
        value: f64,
    },
    StepCompleted {
        step: usize,
        total: usize,
    },
    LevelWon,
    LevelLost,
    DispositionTelegraphed {
        id: InstanceId,
        hue: usize,
        kind: DispositionType,
        fire_at: f64,
    },
    DispositionStarted {
        id: InstanceId,
        hue: usize,
        kind: DispositionType,
        duration: f64,
    },
    DispositionEnded {
        id: InstanceId,
        hue: usize,
    },
    DispositionsCancelled {
        count: usize,
    },
}

impl SimulationEvent {
    fn from_disposition(event: DispositionEvent) -> Option<Self> {
        match event {
            DispositionEvent::Telegraphed {
                id,
                hue,
                kind,
                fire_at,
            } => Some(SimulationEvent::DispositionTelegraphed {
                id,
                hue,
                kind,
                fire_at,
            }),
            DispositionEvent::Started {
                id,
                hue,
                kind,
                duration,
                ..
            } => Some(SimulationEvent::DispositionStarted {
                id,
                hue,
                kind,
                duration,
            }),
            DispositionEvent::Ended { id, hue, .. } => {
                Some(SimulationEvent::DispositionEnded { id, hue })
            }
            DispositionEvent::Cancelled { count } => {
                Some(SimulationEvent::DispositionsCancelled { count })
            }
            DispositionEvent::Armed { .. } | DispositionEvent::NoFreeWell { .. } => None,
        }
    }
}

/// Detect display Psyche crossing the warning thresholds since last tick
pub fn warning_crossings(
    previous: &WellArray,
    current: &WellArray,
    config: &SimulationConfig,
) -> Vec<(usize, WarningLevel)> {
    let high = config.drive.warn_high;
    let low = config.drive.warn_low;
    (0..WELL_COUNT)
        .filter_map(|i| {
            if previous[i] < high && current[i] >= high {
                Some((i, WarningLevel::High))
            } else if previous[i] > low && current[i] <= low {
                Some((i, WarningLevel::Low))
            } else {
                None
            }
        })
        .collect()
}

fn warn_collaborator(hooks: &mut Collaborator, hue: usize, level: WarningLevel, value: f64) {
    let name = Hue::from_index(hue).map(Hue::name).unwrap_or("?");
    let (key, title, line) = match level {
        WarningLevel::High => (
            format!("psyche_high_{}", hue),
            format!("{} is running hot", name),
            format!("{} Psyche reached {:.0}. Ease its spin before it breaks.", name, value),
        ),
        WarningLevel::Low => (
            format!("psyche_low_{}", hue),
            format!("{} is fading", name),
            format!("{} Psyche fell to {:.0}. Give it some positive spin.", name, value),
        ),
    };
    hooks.show_info_once(&key, &title, &[line]);
}

fn apply_response(
    response: BreakResponse,
    state: &mut SimulationState,
    engine: &mut DispositionEngine,
    events: &mut Vec<SimulationEvent>,
) {
    if response.cancel_dispositions {
        if let Some(event) = SimulationEvent::from_disposition(engine.cancel_all()) {
            events.push(event);
        }
    }
    if response.lose && state.level_state == LevelState::Playing {
        tracing::info!("Level lost at {:.2}s", state.now);
        state.level_state = LevelState::Lose;
        events.push(SimulationEvent::LevelLost);
    }
}

/// Run one tick of `dt` seconds
///
/// Does nothing while the state is frozen (lobby, paused or a terminal level).
pub fn run_tick(
    state: &mut SimulationState,
    config: &SimulationConfig,
    engine: &mut DispositionEngine,
    objective: &mut ObjectiveEvaluator,
    hooks: &mut Collaborator,
    dt: f64,
) -> Vec<SimulationEvent> {
    debug_assert!((0.0..=config.tick.max_dt + 1e-12).contains(&dt));
    let mut events = Vec::new();
    if !state.is_live() {
        return events;
    }

    state.now += dt;
    state.tick_count += 1;

    let response = hooks.check_breaks(state, dt);
    apply_response(response, state, engine, &mut events);
    if state.level_state.is_terminal() {
        return events;
    }

    let previous = state.psyche_display;
    state.refresh_psyche_display(config);

    for (hue, level) in warning_crossings(&previous, &state.psyche_display, config) {
        let value = state.psyche_display[hue];
        tracing::debug!("Psyche warning on well {}: {:?} at {:.1}", hue, level, value);
        warn_collaborator(hooks, hue, level, value);
        events.push(SimulationEvent::PsycheWarning { hue, level, value });
    }

    if let Some(advance) =
        objective.evaluate(&state.psyche_display, &state.spin, &config.objective, dt)
    {
        events.push(SimulationEvent::StepCompleted {
            step: advance.completed,
            total: advance.total,
        });
        if advance.plan_complete {
            tracing::info!("Level won at {:.2}s", state.now);
            state.level_state = LevelState::Win;
            events.push(SimulationEvent::LevelWon);
            return events;
        }
    }

    state.regenerate_energy(config, dt);

    events.extend(
        engine
            .update(state, config, dt)
            .into_iter()
            .filter_map(SimulationEvent::from_disposition),
    );

    let outcome = equalize_wells(state, config, dt, hooks);
    events.extend(outcome.jams.iter().map(|jam| SimulationEvent::JamTriggered {
        cause: jam.cause,
        index: jam.info.index,
        magnitude: jam.info.magnitude,
        cascade: jam.cascade,
    }));
    apply_response(outcome.response, state, engine, &mut events);

    state.clamp_wells(config);
    drive_psyche(state, config, dt);

    events
}
