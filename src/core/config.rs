//! Simulation configuration with documented constants
//!
//! Every tunable number lives here with its default resolved. A config is
//! built once per session and passed down by reference to each stage.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::core::error::{Result, WellError};
use crate::core::types::Bounds;

/// Bounds of the two well scalars
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    pub amount_min: f64,
    pub amount_max: f64,
    pub spin_min: f64,
    pub spin_max: f64,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            amount_min: 25.0,
            amount_max: 100.0,
            spin_min: -100.0,
            spin_max: 100.0,
        }
    }
}

impl BoundsConfig {
    pub fn amount(&self) -> Bounds {
        Bounds::new(self.amount_min, self.amount_max)
    }

    pub fn spin(&self) -> Bounds {
        Bounds::new(self.spin_min, self.spin_max)
    }
}

/// Ring equalization tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EqualizeConfig {
    /// Amount moved out of an overflowing well per second, per pass
    pub amount_rate: f64,
    /// Spin moved out of an overflowing well per second, per pass
    pub spin_rate: f64,
    /// Upper bound on propagation passes per call
    pub max_iters: usize,
    /// Saturation and convergence tolerance
    pub epsilon: f64,
    /// Residual overflow (summed over the ring) above which a jam is raised
    pub jam_threshold: f64,
}

impl Default for EqualizeConfig {
    fn default() -> Self {
        Self {
            amount_rate: 400.0,
            spin_rate: 400.0,
            max_iters: 96,
            epsilon: 1e-6,
            jam_threshold: 1e-3,
        }
    }
}

/// Well to Psyche drive
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveConfig {
    /// Divisor applied to Amount x Spin flux
    pub psyche_norm: f64,
    /// Upper end of the displayed Psyche range
    pub psyche_cap: f64,
    /// Display value that raises a high warning when crossed upward
    pub warn_high: f64,
    /// Display value that raises a low warning when crossed downward
    pub warn_low: f64,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            psyche_norm: 1000.0,
            psyche_cap: 500.0,
            warn_high: 450.0,
            warn_low: 25.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TickConfig {
    /// Largest dt a single tick may integrate, in seconds
    pub max_dt: f64,
    /// Frame rate used to turn `advance` frame deltas into seconds
    pub frames_per_second: f64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            max_dt: 0.05,
            frames_per_second: 60.0,
        }
    }
}

/// Player energy pool
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnergyConfig {
    pub max: f64,
    pub regen_per_sec: f64,
    /// Energy spent per unit of Amount or Spin moved by a player action
    pub cost_per_unit: f64,
}

impl Default for EnergyConfig {
    fn default() -> Self {
        Self {
            max: 100.0,
            regen_per_sec: 4.0,
            cost_per_unit: 0.5,
        }
    }
}

/// Disposition scheduling, envelope and history tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispositionConfig {
    /// Warning lead time before an arrival fires
    pub telegraph_seconds: f64,
    /// Minimum spacing between any two fire times
    pub min_fire_gap: f64,
    /// Backoff when an arrival finds every well reserved
    pub no_well_retry_delay: f64,
    /// Probability an instance uses stepped levels
    pub discrete_chance: f64,
    pub duration_min: f64,
    pub duration_max: f64,
    /// Half-width of the uniform jitter applied to a template's base duration
    pub duration_jitter: f64,
    /// Per-second ramp increment of arming probability, by tier
    pub tier_steps: [f64; 3],
    /// Total change delivered over an instance's life, by tier
    pub tier_targets: [f64; 3],
    /// Jitter on the total change as a fraction of the tier target
    pub target_jitter_frac: f64,
    /// Samples in the warped-progress lookup table
    pub lut_samples: usize,
    /// Segments painted around the progress ring
    pub history_segments: usize,
    /// Time slice used when painting history
    pub paint_slice_sec: f64,
    /// Paint slices allowed per tick
    pub max_paint_slices: usize,
    /// Lower bound of a single envelope phase weight
    pub weight_min: f64,
    /// Upper bound of a single envelope phase weight
    pub weight_max: f64,
}

impl Default for DispositionConfig {
    fn default() -> Self {
        Self {
            telegraph_seconds: 3.0,
            min_fire_gap: 4.0,
            no_well_retry_delay: 1.5,
            discrete_chance: 0.25,
            duration_min: 8.0,
            duration_max: 40.0,
            duration_jitter: 5.0,
            tier_steps: [0.00025, 0.0005, 0.001],
            tier_targets: [40.0, 60.0, 80.0],
            target_jitter_frac: 0.1,
            lut_samples: 256,
            history_segments: 240,
            paint_slice_sec: 0.01,
            max_paint_slices: 32,
            weight_min: 0.10,
            weight_max: 0.30,
        }
    }
}

/// Objective hold timing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectiveConfig {
    pub default_hold_sec: f64,
    pub spin_zero_hold_sec: f64,
    /// How close to zero every Spin must be for a spin-zero step
    pub spin_zero_epsilon: f64,
    /// Completion window during which a lost condition is ignored
    pub flash_sec: f64,
}

impl Default for ObjectiveConfig {
    fn default() -> Self {
        Self {
            default_hold_sec: 10.0,
            spin_zero_hold_sec: 3.0,
            spin_zero_epsilon: 5.0,
            flash_sec: 0.75,
        }
    }
}

/// Configuration for the simulation systems
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub bounds: BoundsConfig,
    pub equalize: EqualizeConfig,
    pub drive: DriveConfig,
    pub tick: TickConfig,
    pub energy: EnergyConfig,
    pub disposition: DispositionConfig,
    pub objective: ObjectiveConfig,
}

impl SimulationConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from TOML text; missing fields keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let b = &self.bounds;
        if b.amount_min >= b.amount_max {
            return Err(WellError::InvalidConfig(format!(
                "amount_min ({}) must be < amount_max ({})",
                b.amount_min, b.amount_max
            )));
        }
        if b.spin_min >= b.spin_max {
            return Err(WellError::InvalidConfig(format!(
                "spin_min ({}) must be < spin_max ({})",
                b.spin_min, b.spin_max
            )));
        }

        let eq = &self.equalize;
        if eq.amount_rate <= 0.0 || eq.spin_rate <= 0.0 {
            return Err(WellError::InvalidConfig(
                "transfer rates must be positive".into(),
            ));
        }
        if eq.max_iters == 0 {
            return Err(WellError::InvalidConfig("max_iters must be at least 1".into()));
        }

        if self.drive.psyche_norm <= 0.0 {
            return Err(WellError::InvalidConfig("psyche_norm must be positive".into()));
        }
        if self.drive.warn_low >= self.drive.warn_high {
            return Err(WellError::InvalidConfig(format!(
                "warn_low ({}) must be < warn_high ({})",
                self.drive.warn_low, self.drive.warn_high
            )));
        }

        if self.tick.max_dt <= 0.0 || self.tick.frames_per_second <= 0.0 {
            return Err(WellError::InvalidConfig(
                "max_dt and frames_per_second must be positive".into(),
            ));
        }

        let d = &self.disposition;
        if d.duration_min > d.duration_max {
            return Err(WellError::InvalidConfig(format!(
                "duration_min ({}) must be <= duration_max ({})",
                d.duration_min, d.duration_max
            )));
        }
        if d.tier_steps.iter().any(|s| *s < 0.0) || d.tier_targets.iter().any(|t| *t <= 0.0) {
            return Err(WellError::InvalidConfig(
                "tier steps must be non-negative and tier targets positive".into(),
            ));
        }
        if d.weight_min * 5.0 > 1.0 || d.weight_max * 5.0 < 1.0 || d.weight_min <= 0.0 {
            return Err(WellError::InvalidConfig(format!(
                "envelope weights [{}, {}] cannot sum to 1 over five phases",
                d.weight_min, d.weight_max
            )));
        }
        if d.lut_samples < 2 || d.history_segments == 0 || d.paint_slice_sec <= 0.0 {
            return Err(WellError::InvalidConfig(
                "lut_samples >= 2, history_segments >= 1 and paint_slice_sec > 0 required".into(),
            ));
        }
        if !(0.0..=1.0).contains(&d.discrete_chance) {
            return Err(WellError::InvalidConfig("discrete_chance must be in [0, 1]".into()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn test_default_bounds() {
        let config = SimulationConfig::default();
        assert_eq!(config.bounds.amount(), Bounds::new(25.0, 100.0));
        assert_eq!(config.bounds.spin(), Bounds::new(-100.0, 100.0));
        assert_eq!(config.equalize.max_iters, 96);
        assert_eq!(config.tick.max_dt, 0.05);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimulationConfig::from_toml_str(
            r#"
            [equalize]
            amount_rate = 250.0

            [disposition]
            discrete_chance = 1.0
            "#,
        )
        .expect("partial config should parse");

        assert_eq!(config.equalize.amount_rate, 250.0);
        assert_eq!(config.equalize.spin_rate, 400.0);
        assert_eq!(config.disposition.discrete_chance, 1.0);
        assert_eq!(config.disposition.telegraph_seconds, 3.0);
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let mut config = SimulationConfig::default();
        config.bounds.amount_min = 120.0;
        assert!(matches!(config.validate(), Err(WellError::InvalidConfig(_))));
    }

    #[test]
    fn test_impossible_weights_rejected() {
        let mut config = SimulationConfig::default();
        config.disposition.weight_min = 0.25;
        assert!(config.validate().is_err());
    }
}
