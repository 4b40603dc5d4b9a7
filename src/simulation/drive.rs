//! Well to Psyche drive

use crate::core::config::SimulationConfig;
use crate::core::types::WELL_COUNT;
use crate::simulation::state::SimulationState;

/// Flux a single well would feed into its Psyche accumulator per second
pub fn well_flux(amount: f64, spin: f64, config: &SimulationConfig) -> f64 {
    let a = config.bounds.amount().clamp(amount);
    let s = config.bounds.spin().clamp(spin);
    a * s / config.drive.psyche_norm
}

/// Integrate Amount x Spin flux into Psyche
///
/// The clamp only applies to the local read; stored wells and the Psyche
/// result are left unclamped.
pub fn drive_psyche(state: &mut SimulationState, config: &SimulationConfig, dt: f64) {
    for i in 0..WELL_COUNT {
        state.psyche[i] += well_flux(state.amount[i], state.spin[i], config) * dt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flux_sign_follows_spin() {
        let config = SimulationConfig::default();
        assert_eq!(well_flux(100.0, 100.0, &config), 10.0);
        assert_eq!(well_flux(50.0, -40.0, &config), -2.0);
        assert_eq!(well_flux(80.0, 0.0, &config), 0.0);
    }

    #[test]
    fn test_drive_reads_clamped_values_but_does_not_write_them() {
        let config = SimulationConfig::default();
        let mut state = SimulationState::with_wells(
            [150.0, 10.0, 50.0, 50.0, 50.0, 50.0],
            [300.0, 100.0, 0.0, 0.0, 0.0, 0.0],
            [0.0; WELL_COUNT],
            &config,
        );
        drive_psyche(&mut state, &config, 1.0);

        // 100 * 100 / 1000 and 25 * 100 / 1000
        assert_eq!(state.psyche[0], 10.0);
        assert_eq!(state.psyche[1], 2.5);
        assert_eq!(state.amount[0], 150.0);
        assert_eq!(state.spin[0], 300.0);
    }

    #[test]
    fn test_psyche_may_leave_display_range() {
        let config = SimulationConfig::default();
        let mut state = SimulationState::with_wells(
            [100.0; WELL_COUNT],
            [-100.0; WELL_COUNT],
            [1.0; WELL_COUNT],
            &config,
        );
        drive_psyche(&mut state, &config, 0.5);
        assert!(state.psyche.iter().all(|p| *p < 0.0));
    }
}
