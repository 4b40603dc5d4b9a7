//! Disposition kinds, tiers and pool templates

use serde::{Deserialize, Serialize};

use crate::core::error::WellError;
use crate::core::types::WELL_COUNT;

/// What a disposition does to its well
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispositionType {
    /// Amount increases
    LocksIn,
    /// Amount decreases
    Crashes,
    /// Spin driven toward the positive extreme
    Amped,
    /// Spin driven toward the negative extreme
    Spirals,
}

impl DispositionType {
    pub fn label(self) -> &'static str {
        match self {
            DispositionType::LocksIn => "Locks In",
            DispositionType::Crashes => "Crashes",
            DispositionType::Amped => "Amped",
            DispositionType::Spirals => "Spirals",
        }
    }

    pub fn direction_sign(self) -> f64 {
        match self {
            DispositionType::LocksIn | DispositionType::Amped => 1.0,
            DispositionType::Crashes | DispositionType::Spirals => -1.0,
        }
    }

    pub fn targets_spin(self) -> bool {
        matches!(self, DispositionType::Amped | DispositionType::Spirals)
    }
}

/// Intensity tier; higher tiers ramp faster and hit harder
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Tier {
    #[default]
    Low,
    Mid,
    High,
}

impl Tier {
    pub fn index(self) -> usize {
        match self {
            Tier::Low => 0,
            Tier::Mid => 1,
            Tier::High => 2,
        }
    }
}

impl TryFrom<u8> for Tier {
    type Error = WellError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Tier::Low),
            1 => Ok(Tier::Mid),
            2 => Ok(Tier::High),
            other => Err(WellError::InvalidLevel(format!(
                "disposition tier must be 0, 1 or 2 (got {})",
                other
            ))),
        }
    }
}

impl From<Tier> for u8 {
    fn from(tier: Tier) -> u8 {
        tier.index() as u8
    }
}

fn default_duration() -> f64 {
    20.0
}

fn default_strength() -> f64 {
    1.0
}

/// One entry of a level's disposition pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispositionTemplate {
    #[serde(rename = "type")]
    pub kind: DispositionType,
    /// Pin to one well; `None` takes the first free well
    #[serde(default)]
    pub hue: Option<usize>,
    #[serde(default)]
    pub tier: Tier,
    /// Base duration in seconds before jitter
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Multiplier on the tier's total change; also the weight in arming ties
    #[serde(default = "default_strength")]
    pub strength: f64,
}

impl DispositionTemplate {
    pub fn new(kind: DispositionType, tier: Tier) -> Self {
        Self {
            kind,
            hue: None,
            tier,
            duration: default_duration(),
            strength: default_strength(),
        }
    }

    pub fn on_hue(mut self, hue: usize) -> Self {
        self.hue = Some(hue);
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = duration;
        self
    }

    pub fn with_strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn validate(&self) -> Result<(), WellError> {
        if let Some(hue) = self.hue {
            if hue >= WELL_COUNT {
                return Err(WellError::InvalidLevel(format!(
                    "disposition hue {} is out of range",
                    hue
                )));
            }
        }
        if self.duration <= 0.0 || self.strength <= 0.0 {
            return Err(WellError::InvalidLevel(format!(
                "{} needs positive duration and strength",
                self.kind.label()
            )));
        }
        Ok(())
    }
}

/// Identifier of a telegraphed or active disposition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstanceId(pub u64);

/// Scheduling state of a pool template
///
/// `Idle -> Armed -> Telegraphed -> Active -> Idle`. Only `Idle` ramps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemplateState {
    Idle { ramp_elapsed_sec: u32 },
    /// Waiting for its telegraph window or a free well
    Armed,
    Telegraphed { instance: InstanceId },
    Active { instance: InstanceId },
}

impl Default for TemplateState {
    fn default() -> Self {
        TemplateState::Idle { ramp_elapsed_sec: 0 }
    }
}

impl TemplateState {
    pub fn is_locked(&self) -> bool {
        !matches!(self, TemplateState::Idle { .. })
    }
}

/// A template plus its scheduling state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateSlot {
    pub template: DispositionTemplate,
    pub state: TemplateState,
}

impl TemplateSlot {
    pub fn new(template: DispositionTemplate) -> Self {
        Self {
            template,
            state: TemplateState::default(),
        }
    }

    /// Arming probability for the current second
    pub fn arm_probability(&self, tier_steps: &[f64; 3]) -> f64 {
        match self.state {
            TemplateState::Idle { ramp_elapsed_sec } => {
                (ramp_elapsed_sec as f64 * tier_steps[self.template.tier.index()]).min(1.0)
            }
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_signs() {
        assert_eq!(DispositionType::LocksIn.direction_sign(), 1.0);
        assert_eq!(DispositionType::Crashes.direction_sign(), -1.0);
        assert_eq!(DispositionType::Amped.direction_sign(), 1.0);
        assert_eq!(DispositionType::Spirals.direction_sign(), -1.0);
        assert!(DispositionType::Spirals.targets_spin());
        assert!(!DispositionType::Crashes.targets_spin());
    }

    #[test]
    fn test_tier_from_u8() {
        assert_eq!(Tier::try_from(2).ok(), Some(Tier::High));
        assert!(Tier::try_from(3).is_err());
        assert_eq!(u8::from(Tier::Mid), 1);
    }

    #[test]
    fn test_arm_probability_ramps_and_caps() {
        let steps = [0.00025, 0.0005, 0.001];
        let mut slot = TemplateSlot::new(DispositionTemplate::new(DispositionType::Amped, Tier::High));
        assert_eq!(slot.arm_probability(&steps), 0.0);

        slot.state = TemplateState::Idle { ramp_elapsed_sec: 100 };
        assert!((slot.arm_probability(&steps) - 0.1).abs() < 1e-12);

        slot.state = TemplateState::Idle { ramp_elapsed_sec: 5000 };
        assert_eq!(slot.arm_probability(&steps), 1.0);

        slot.state = TemplateState::Armed;
        assert_eq!(slot.arm_probability(&steps), 0.0);
    }

    #[test]
    fn test_template_validation() {
        let ok = DispositionTemplate::new(DispositionType::LocksIn, Tier::Low).on_hue(5);
        assert!(ok.validate().is_ok());

        let bad_hue = DispositionTemplate::new(DispositionType::LocksIn, Tier::Low).on_hue(6);
        assert!(bad_hue.validate().is_err());

        let bad_strength =
            DispositionTemplate::new(DispositionType::Crashes, Tier::Mid).with_strength(0.0);
        assert!(bad_strength.validate().is_err());
    }
}
