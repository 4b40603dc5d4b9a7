//! Hold-based step evaluation
//!
//! The active step's condition must hold continuously for its required time.
//! Losing the condition resets the hold to zero. Once the hold is met a short
//! completion flash runs; the step completes when the flash ends, whatever
//! the condition does meanwhile.

use serde::{Deserialize, Serialize};

use crate::core::config::ObjectiveConfig;
use crate::core::types::WellArray;
use crate::objective::plan::{PlanDefinition, Step};

const HOLD_EPSILON: f64 = 1e-9;

/// A step finished this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepAdvance {
    /// Index of the completed step
    pub completed: usize,
    pub total: usize,
    pub plan_complete: bool,
}

/// Snapshot for the HUD
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveStatus {
    pub step: usize,
    pub total: usize,
    pub hold_elapsed: f64,
    pub hold_required: f64,
    pub flashing: bool,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectiveEvaluator {
    steps: Vec<Step>,
    step: usize,
    hold_elapsed: f64,
    flash_remaining: Option<f64>,
}

impl ObjectiveEvaluator {
    pub fn new(plan: &PlanDefinition) -> Self {
        Self::from_steps(plan.compile())
    }

    pub fn from_steps(steps: Vec<Step>) -> Self {
        Self {
            steps,
            step: 0,
            hold_elapsed: 0.0,
            flash_remaining: None,
        }
    }

    /// No steps; never completes
    pub fn is_sandbox(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn is_complete(&self) -> bool {
        !self.steps.is_empty() && self.step >= self.steps.len()
    }

    pub fn current_step(&self) -> usize {
        self.step
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn hold_elapsed(&self) -> f64 {
        self.hold_elapsed
    }

    pub fn is_flashing(&self) -> bool {
        self.flash_remaining.is_some()
    }

    /// Advance the active step by `dt` against the given Psyche and Spin
    pub fn evaluate(
        &mut self,
        psyche: &WellArray,
        spin: &WellArray,
        config: &ObjectiveConfig,
        dt: f64,
    ) -> Option<StepAdvance> {
        let step = self.steps.get(self.step)?;

        if let Some(remaining) = self.flash_remaining {
            let remaining = remaining - dt;
            if remaining > HOLD_EPSILON {
                self.flash_remaining = Some(remaining);
                return None;
            }
            return Some(self.complete_step());
        }

        let required = step.required_hold(config);
        if step.condition.is_met(psyche, spin, config) {
            self.hold_elapsed += dt;
            if self.hold_elapsed + HOLD_EPSILON >= required {
                self.hold_elapsed = required;
                if config.flash_sec > 0.0 {
                    self.flash_remaining = Some(config.flash_sec);
                    return None;
                }
                return Some(self.complete_step());
            }
        } else if self.hold_elapsed > 0.0 {
            tracing::debug!(
                "Hold reset on step {} after {:.2}s",
                self.step + 1,
                self.hold_elapsed
            );
            self.hold_elapsed = 0.0;
        }
        None
    }

    fn complete_step(&mut self) -> StepAdvance {
        let completed = self.step;
        self.step += 1;
        self.hold_elapsed = 0.0;
        self.flash_remaining = None;
        let plan_complete = self.step >= self.steps.len();
        tracing::info!("Step {}/{} complete", completed + 1, self.steps.len());
        StepAdvance {
            completed,
            total: self.steps.len(),
            plan_complete,
        }
    }

    pub fn status(&self, config: &ObjectiveConfig) -> ObjectiveStatus {
        let (hold_required, label) = match self.steps.get(self.step) {
            Some(step) => (step.required_hold(config), step.condition.label()),
            None if self.is_sandbox() => (0.0, "Free play".to_string()),
            None => (0.0, "Complete".to_string()),
        };
        ObjectiveStatus {
            step: self.step,
            total: self.steps.len(),
            hold_elapsed: self.hold_elapsed,
            hold_required,
            flashing: self.is_flashing(),
            label,
        }
    }
}
