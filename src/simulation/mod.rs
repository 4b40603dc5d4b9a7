//! Simulation core - well state, equalization, Psyche drive and the tick

pub mod drive;
pub mod equalize;
pub mod hooks;
pub mod session;
pub mod state;
pub mod tick;

pub use equalize::{equalize_wells, EqualizeOutcome, Jam, RingReport};
pub use hooks::{BreakHooks, BreakResponse, Collaborator, HookError, JamCause, JamInfo};
pub use session::{PlayerAction, Session};
pub use state::SimulationState;
pub use tick::{run_tick, SimulationEvent, WarningLevel};
