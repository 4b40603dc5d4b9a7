//! Session - owns one match and drives it frame by frame

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::error::{Result, WellError};
use crate::core::types::{SessionMode, WELL_COUNT};
use crate::disposition::feed::{self, HudState, RenderState};
use crate::disposition::DispositionEngine;
use crate::level::LevelDefinition;
use crate::objective::{ObjectiveEvaluator, ObjectiveStatus};
use crate::simulation::hooks::{BreakHooks, Collaborator};
use crate::simulation::state::SimulationState;
use crate::simulation::tick::{run_tick, SimulationEvent};

/// Direct player manipulation of one well
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    /// Add to a well's Amount
    Pump { well: usize, delta: f64 },
    /// Add to a well's Spin
    Twist { well: usize, delta: f64 },
}

impl PlayerAction {
    pub fn well(&self) -> usize {
        match *self {
            PlayerAction::Pump { well, .. } | PlayerAction::Twist { well, .. } => well,
        }
    }

    pub fn delta(&self) -> f64 {
        match *self {
            PlayerAction::Pump { delta, .. } | PlayerAction::Twist { delta, .. } => delta,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    config: SimulationConfig,
    state: SimulationState,
    engine: DispositionEngine,
    objective: ObjectiveEvaluator,
    hooks: Collaborator,
    events: Vec<SimulationEvent>,
    level_name: String,
}

impl Session {
    /// Free-play session with no dispositions
    pub fn new(config: SimulationConfig, seed: u64) -> Self {
        Self::from_level(config, &LevelDefinition::sandbox("Sandbox"), seed)
    }

    /// Session for a level; the level's own seed wins over `seed`
    pub fn from_level(config: SimulationConfig, level: &LevelDefinition, seed: u64) -> Self {
        let state = SimulationState::with_wells(
            level.initial.amount,
            level.initial.spin,
            level.initial.psyche,
            &config,
        );
        Self {
            engine: DispositionEngine::new(level.dispositions.clone(), level.seed.unwrap_or(seed)),
            objective: ObjectiveEvaluator::new(&level.plan),
            hooks: Collaborator::none(),
            events: Vec::new(),
            level_name: level.name.clone(),
            config,
            state,
        }
    }

    pub fn with_hooks(mut self, hooks: Box<dyn BreakHooks>) -> Self {
        self.set_hooks(hooks);
        self
    }

    pub fn set_hooks(&mut self, hooks: Box<dyn BreakHooks>) {
        self.hooks = Collaborator::new(hooks);
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Direct state access for scripted setups and tests
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn engine(&self) -> &DispositionEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut DispositionEngine {
        &mut self.engine
    }

    pub fn objective(&self) -> &ObjectiveEvaluator {
        &self.objective
    }

    pub fn level_name(&self) -> &str {
        &self.level_name
    }

    /// Leave the lobby and begin playing
    pub fn start(&mut self) {
        if self.state.mode == SessionMode::Lobby {
            tracing::info!("Starting level '{}'", self.level_name);
        }
        self.state.mode = SessionMode::Playing;
        self.state.paused = false;
    }

    pub fn pause(&mut self) {
        self.state.paused = true;
    }

    pub fn resume(&mut self) {
        self.state.paused = false;
    }

    /// Advance by `delta_frames` display frames
    ///
    /// Returns the clamped dt in seconds, or `None` while frozen. A zero or
    /// negative delta is a no-op that still reports `Some(0.0)`.
    pub fn advance(&mut self, delta_frames: f64) -> Option<f64> {
        if !self.state.is_live() {
            return None;
        }
        if delta_frames.is_nan() || delta_frames <= 0.0 {
            return Some(0.0);
        }
        let fps = self.config.tick.frames_per_second;
        let dt = (delta_frames / fps).clamp(0.0, self.config.tick.max_dt);
        self.step(dt);
        Some(dt)
    }

    /// Run one tick of exactly `dt` seconds, clamped to the configured max
    pub fn step(&mut self, dt: f64) -> Vec<SimulationEvent> {
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.tick.max_dt)
        } else {
            0.0
        };
        let events = run_tick(
            &mut self.state,
            &self.config,
            &mut self.engine,
            &mut self.objective,
            &mut self.hooks,
            dt,
        );
        self.events.extend(events.iter().cloned());
        events
    }

    /// Apply a player action, paying its energy cost
    ///
    /// Stored values are not clamped; the next tick's equalization resolves them.
    pub fn apply_action(&mut self, action: PlayerAction) -> Result<()> {
        if !self.state.is_live() {
            return Err(WellError::NotPlaying);
        }
        let well = action.well();
        if well >= WELL_COUNT {
            return Err(WellError::InvalidWell(well));
        }

        let needed = action.delta().abs() * self.config.energy.cost_per_unit;
        if needed > self.state.energy {
            return Err(WellError::InsufficientEnergy {
                needed,
                available: self.state.energy,
            });
        }
        self.state.energy -= needed;

        match action {
            PlayerAction::Pump { delta, .. } => self.state.amount[well] += delta,
            PlayerAction::Twist { delta, .. } => self.state.spin[well] += delta,
        }
        tracing::debug!("Applied {:?} for {:.1} energy", action, needed);
        Ok(())
    }

    /// Take every event buffered since the last drain
    pub fn drain_events(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn render_states(&self) -> Vec<RenderState> {
        feed::render_states(self.engine.instances(), self.state.now)
    }

    pub fn hud_state(&self) -> HudState {
        feed::hud_state(self.engine.instances(), self.state.now)
    }

    pub fn objective_status(&self) -> ObjectiveStatus {
        self.objective.status(&self.config.objective)
    }
}
