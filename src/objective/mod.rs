//! Level objectives - plans of held conditions over Psyche and Spin

pub mod evaluator;
pub mod plan;

pub use evaluator::{ObjectiveEvaluator, ObjectiveStatus, StepAdvance};
pub use plan::{BoundConstraint, HueConstraint, PlanDefinition, Step, StepCondition};
