//! SimulationState - the single authoritative mutable state of a match

use serde::{Deserialize, Serialize};

use crate::core::config::SimulationConfig;
use crate::core::types::{LevelState, SessionMode, SimTime, WellArray, WELL_COUNT};

/// Default starting Amount: midway through the default bounds
pub const DEFAULT_AMOUNT: f64 = 62.5;
pub const DEFAULT_PSYCHE: f64 = 100.0;

/// Well arrays and scalar counters for one match
///
/// Every tick stage reads and writes these fields in place; there is no
/// snapshotting between stages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationState {
    /// Amount per well. May sit outside bounds between stages.
    pub amount: WellArray,
    /// Spin per well. Sign is direction, magnitude is strength.
    pub spin: WellArray,
    /// Psyche accumulators. Never clamped by the core.
    pub psyche: WellArray,
    /// Psyche clamped to `[0, psyche_cap]` for display and objectives
    pub psyche_display: WellArray,
    pub energy: f64,
    /// Simulated seconds since the match started
    pub now: SimTime,
    pub tick_count: u64,
    pub jam_count: u32,
    pub mode: SessionMode,
    pub paused: bool,
    pub level_state: LevelState,
}

impl SimulationState {
    pub fn new(config: &SimulationConfig) -> Self {
        Self::with_wells(
            [DEFAULT_AMOUNT; WELL_COUNT],
            [0.0; WELL_COUNT],
            [DEFAULT_PSYCHE; WELL_COUNT],
            config,
        )
    }

    pub fn with_wells(
        amount: WellArray,
        spin: WellArray,
        psyche: WellArray,
        config: &SimulationConfig,
    ) -> Self {
        let cap = config.drive.psyche_cap;
        Self {
            amount,
            spin,
            psyche,
            psyche_display: psyche.map(|p| p.clamp(0.0, cap)),
            energy: config.energy.max,
            now: 0.0,
            tick_count: 0,
            jam_count: 0,
            mode: SessionMode::Lobby,
            paused: false,
            level_state: LevelState::Playing,
        }
    }

    /// True when a tick would run its simulation stages
    pub fn is_live(&self) -> bool {
        self.mode == SessionMode::Playing && !self.paused && !self.level_state.is_terminal()
    }

    /// Authoritative clamp of stored Amount and Spin into their bounds
    pub fn clamp_wells(&mut self, config: &SimulationConfig) {
        let amount = config.bounds.amount();
        let spin = config.bounds.spin();
        for i in 0..WELL_COUNT {
            self.amount[i] = amount.clamp(self.amount[i]);
            self.spin[i] = spin.clamp(self.spin[i]);
        }
    }

    /// Refresh the cosmetic Psyche copy. The accumulators are left untouched.
    pub fn refresh_psyche_display(&mut self, config: &SimulationConfig) {
        let cap = config.drive.psyche_cap;
        self.psyche_display = self.psyche.map(|p| p.clamp(0.0, cap));
    }

    pub fn regenerate_energy(&mut self, config: &SimulationConfig, dt: f64) {
        self.energy = (self.energy + config.energy.regen_per_sec * dt).min(config.energy.max);
    }

    pub fn total_amount(&self) -> f64 {
        self.amount.iter().sum()
    }

    pub fn total_spin(&self) -> f64 {
        self.spin.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_starts_in_lobby() {
        let config = SimulationConfig::default();
        let state = SimulationState::new(&config);
        assert_eq!(state.mode, SessionMode::Lobby);
        assert!(!state.is_live());
        assert_eq!(state.energy, config.energy.max);
        assert_eq!(state.amount, [DEFAULT_AMOUNT; WELL_COUNT]);
    }

    #[test]
    fn test_clamp_wells_only_touches_amount_and_spin() {
        let config = SimulationConfig::default();
        let mut state = SimulationState::with_wells(
            [130.0, 10.0, 50.0, 50.0, 50.0, 50.0],
            [150.0, -180.0, 0.0, 0.0, 0.0, 0.0],
            [900.0, -20.0, 0.0, 0.0, 0.0, 0.0],
            &config,
        );
        state.clamp_wells(&config);

        assert_eq!(state.amount[0], 100.0);
        assert_eq!(state.amount[1], 25.0);
        assert_eq!(state.spin[0], 100.0);
        assert_eq!(state.spin[1], -100.0);
        assert_eq!(state.psyche[0], 900.0);
        assert_eq!(state.psyche[1], -20.0);
    }

    #[test]
    fn test_psyche_display_is_a_copy() {
        let config = SimulationConfig::default();
        let mut state = SimulationState::new(&config);
        state.psyche[2] = 720.0;
        state.psyche[3] = -5.0;
        state.refresh_psyche_display(&config);

        assert_eq!(state.psyche_display[2], config.drive.psyche_cap);
        assert_eq!(state.psyche_display[3], 0.0);
        assert_eq!(state.psyche[2], 720.0);
        assert_eq!(state.psyche[3], -5.0);
    }

    #[test]
    fn test_energy_regen_caps_at_max() {
        let config = SimulationConfig::default();
        let mut state = SimulationState::new(&config);
        state.energy = 99.9;
        state.regenerate_energy(&config, 0.05);
        assert_eq!(state.energy, config.energy.max);
    }
}
