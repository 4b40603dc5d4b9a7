//! Level definitions: starting wells, objective plan and disposition pool

use serde::{Deserialize, Serialize};

use crate::core::error::{Result, WellError};
use crate::core::types::{WellArray, WELL_COUNT};
use crate::disposition::DispositionTemplate;
use crate::objective::PlanDefinition;
use crate::simulation::state::{DEFAULT_AMOUNT, DEFAULT_PSYCHE};

fn default_amount() -> WellArray {
    [DEFAULT_AMOUNT; WELL_COUNT]
}

fn default_psyche() -> WellArray {
    [DEFAULT_PSYCHE; WELL_COUNT]
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitialWells {
    #[serde(default = "default_amount")]
    pub amount: WellArray,
    #[serde(default)]
    pub spin: WellArray,
    #[serde(default = "default_psyche")]
    pub psyche: WellArray,
}

impl Default for InitialWells {
    fn default() -> Self {
        Self {
            amount: default_amount(),
            spin: [0.0; WELL_COUNT],
            psyche: default_psyche(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub name: String,
    /// Disposition RNG seed; the runner's seed is used when absent
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub initial: InitialWells,
    /// Empty plan means free play
    #[serde(default)]
    pub plan: PlanDefinition,
    #[serde(default)]
    pub dispositions: Vec<DispositionTemplate>,
}

impl LevelDefinition {
    /// Free-play level with default wells and no dispositions
    pub fn sandbox(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seed: None,
            initial: InitialWells::default(),
            plan: PlanDefinition::default(),
            dispositions: Vec::new(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(WellError::InvalidLevel("level name is empty".to_string()));
        }
        let wells = [&self.initial.amount, &self.initial.spin, &self.initial.psyche];
        if wells.iter().any(|w| w.iter().any(|v| !v.is_finite())) {
            return Err(WellError::InvalidLevel(format!(
                "level '{}' has non-finite initial values",
                self.name
            )));
        }
        self.plan.validate()?;
        for template in &self.dispositions {
            template.validate()?;
        }
        Ok(())
    }
}
