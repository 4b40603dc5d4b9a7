//! Dispositions - scheduled, telegraphed perturbations of single wells

pub mod engine;
pub mod envelope;
pub mod feed;
pub mod history;
pub mod instance;
pub mod types;
pub mod warp;

pub use engine::{DispositionEngine, DispositionEvent};
pub use feed::{HudState, RenderPhase, RenderState};
pub use instance::DispositionInstance;
pub use types::{DispositionTemplate, DispositionType, InstanceId, Tier, TemplateState};
