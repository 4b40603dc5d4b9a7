//! Plan definitions and their step conditions
//!
//! Whole-plan variants compile down to a flat list of held steps, so the
//! evaluator only ever walks one shape.

use serde::{Deserialize, Serialize};

use crate::core::config::ObjectiveConfig;
use crate::core::error::{Result, WellError};
use crate::core::types::{Hue, WellArray, WELL_COUNT};

/// Limit applied to one hue's Psyche
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BoundConstraint {
    Over { value: f64 },
    Under { value: f64 },
    Band { low: f64, high: f64 },
}

impl BoundConstraint {
    pub fn holds(&self, value: f64) -> bool {
        match *self {
            BoundConstraint::Over { value: x } => value >= x,
            BoundConstraint::Under { value: x } => value <= x,
            BoundConstraint::Band { low, high } => value >= low && value <= high,
        }
    }

    fn describe(&self) -> String {
        match *self {
            BoundConstraint::Over { value } => format!(">= {}", value),
            BoundConstraint::Under { value } => format!("<= {}", value),
            BoundConstraint::Band { low, high } => format!("{}-{}", low, high),
        }
    }

    fn validate(&self) -> Result<()> {
        if let BoundConstraint::Band { low, high } = *self {
            if low > high {
                return Err(WellError::InvalidLevel(format!(
                    "band low ({}) must be <= high ({})",
                    low, high
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HueConstraint {
    pub hue: usize,
    pub constraint: BoundConstraint,
}

/// Condition a step must hold
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepCondition {
    /// Every hue's Psyche at or above the threshold
    AllOver { threshold: f64 },
    /// One constraint shared by a set of hues
    SetBounds {
        hues: Vec<usize>,
        constraint: BoundConstraint,
    },
    PerHueBounds { constraints: Vec<HueConstraint> },
    AllBand { low: f64, high: f64 },
    /// Every Spin within epsilon of zero; epsilon falls back to config
    SpinZero {
        #[serde(default)]
        epsilon: Option<f64>,
    },
    /// At least `count` hues at or above the threshold
    SomeOver { count: usize, threshold: f64 },
}

impl StepCondition {
    pub fn is_met(&self, psyche: &WellArray, spin: &WellArray, config: &ObjectiveConfig) -> bool {
        match self {
            StepCondition::AllOver { threshold } => psyche.iter().all(|p| p >= threshold),
            StepCondition::SetBounds { hues, constraint } => hues
                .iter()
                .all(|h| psyche.get(*h).is_some_and(|p| constraint.holds(*p))),
            StepCondition::PerHueBounds { constraints } => constraints
                .iter()
                .all(|c| psyche.get(c.hue).is_some_and(|p| c.constraint.holds(*p))),
            StepCondition::AllBand { low, high } => psyche.iter().all(|p| p >= low && p <= high),
            StepCondition::SpinZero { epsilon } => {
                let eps = epsilon.unwrap_or(config.spin_zero_epsilon);
                spin.iter().all(|s| s.abs() <= eps)
            }
            StepCondition::SomeOver { count, threshold } => {
                psyche.iter().filter(|p| *p >= threshold).count() >= *count
            }
        }
    }

    pub fn default_hold(&self, config: &ObjectiveConfig) -> f64 {
        match self {
            StepCondition::SpinZero { .. } => config.spin_zero_hold_sec,
            _ => config.default_hold_sec,
        }
    }

    pub fn label(&self) -> String {
        match self {
            StepCondition::AllOver { threshold } => format!("All hues >= {}", threshold),
            StepCondition::SetBounds { hues, constraint } => {
                let names: Vec<&str> = hues
                    .iter()
                    .filter_map(|h| Hue::from_index(*h))
                    .map(Hue::name)
                    .collect();
                format!("{} {}", names.join("/"), constraint.describe())
            }
            StepCondition::PerHueBounds { constraints } => constraints
                .iter()
                .map(|c| {
                    let name = Hue::from_index(c.hue).map(Hue::name).unwrap_or("?");
                    format!("{} {}", name, c.constraint.describe())
                })
                .collect::<Vec<_>>()
                .join(", "),
            StepCondition::AllBand { low, high } => format!("All hues {}-{}", low, high),
            StepCondition::SpinZero { .. } => "Still every spin".to_string(),
            StepCondition::SomeOver { count, threshold } => {
                format!("{} hues >= {}", count, threshold)
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        let check_hue = |hue: usize| {
            if hue >= WELL_COUNT {
                Err(WellError::InvalidLevel(format!("hue index {} out of range", hue)))
            } else {
                Ok(())
            }
        };
        match self {
            StepCondition::SetBounds { hues, constraint } => {
                for h in hues {
                    check_hue(*h)?;
                }
                constraint.validate()
            }
            StepCondition::PerHueBounds { constraints } => {
                for c in constraints {
                    check_hue(c.hue)?;
                    c.constraint.validate()?;
                }
                Ok(())
            }
            StepCondition::AllBand { low, high } if low > high => Err(WellError::InvalidLevel(
                format!("band low ({}) must be <= high ({})", low, high),
            )),
            StepCondition::SomeOver { count, .. } if *count > WELL_COUNT => Err(
                WellError::InvalidLevel(format!("some_over count {} exceeds well count", count)),
            ),
            _ => Ok(()),
        }
    }
}

/// A condition with its hold requirement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub condition: StepCondition,
    #[serde(default)]
    pub hold_sec: Option<f64>,
}

impl Step {
    pub fn new(condition: StepCondition) -> Self {
        Self {
            condition,
            hold_sec: None,
        }
    }

    pub fn held_for(mut self, hold_sec: f64) -> Self {
        self.hold_sec = Some(hold_sec);
        self
    }

    pub fn required_hold(&self, config: &ObjectiveConfig) -> f64 {
        self.hold_sec
            .unwrap_or_else(|| self.condition.default_hold(config))
    }
}

fn default_rounds() -> usize {
    1
}

fn default_days() -> usize {
    7
}

/// Declarative level objective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanDefinition {
    PlanChain {
        #[serde(default)]
        steps: Vec<Step>,
    },
    /// Alternate an all-band hold with a spin-zero hold
    ZenChain {
        low: f64,
        high: f64,
        #[serde(default = "default_rounds")]
        rounds: usize,
    },
    /// One day per step, focusing a different hue each day
    WeeklyHold {
        floor: f64,
        focus: f64,
        #[serde(default = "default_days")]
        days: usize,
        #[serde(default)]
        hold_sec: Option<f64>,
    },
    AllBandHold { low: f64, high: f64, hold_sec: f64 },
    SomeOver {
        count: usize,
        threshold: f64,
        #[serde(default)]
        hold_sec: Option<f64>,
    },
}

impl Default for PlanDefinition {
    fn default() -> Self {
        PlanDefinition::PlanChain { steps: Vec::new() }
    }
}

impl PlanDefinition {
    /// Flatten the plan into the steps the evaluator walks
    pub fn compile(&self) -> Vec<Step> {
        match self {
            PlanDefinition::PlanChain { steps } => steps.clone(),
            PlanDefinition::ZenChain { low, high, rounds } => (0..*rounds)
                .flat_map(|_| {
                    [
                        Step::new(StepCondition::AllBand {
                            low: *low,
                            high: *high,
                        }),
                        Step::new(StepCondition::SpinZero { epsilon: None }),
                    ]
                })
                .collect(),
            PlanDefinition::WeeklyHold {
                floor,
                focus,
                days,
                hold_sec,
            } => (0..*days)
                .map(|day| {
                    let focus_hue = day % WELL_COUNT;
                    let constraints = (0..WELL_COUNT)
                        .map(|hue| HueConstraint {
                            hue,
                            constraint: BoundConstraint::Over {
                                value: if hue == focus_hue { *focus } else { *floor },
                            },
                        })
                        .collect();
                    Step {
                        condition: StepCondition::PerHueBounds { constraints },
                        hold_sec: *hold_sec,
                    }
                })
                .collect(),
            PlanDefinition::AllBandHold {
                low,
                high,
                hold_sec,
            } => vec![Step::new(StepCondition::AllBand {
                low: *low,
                high: *high,
            })
            .held_for(*hold_sec)],
            PlanDefinition::SomeOver {
                count,
                threshold,
                hold_sec,
            } => vec![Step {
                condition: StepCondition::SomeOver {
                    count: *count,
                    threshold: *threshold,
                },
                hold_sec: *hold_sec,
            }],
        }
    }

    pub fn validate(&self) -> Result<()> {
        for step in self.compile() {
            step.condition.validate()?;
            if step.hold_sec.is_some_and(|h| h < 0.0) {
                return Err(WellError::InvalidLevel(format!(
                    "negative hold for step '{}'",
                    step.condition.label()
                )));
            }
        }
        Ok(())
    }
}
