//! Break collaborator hooks
//!
//! The "mental break" layer lives outside the core. The core calls into it at
//! three points and treats a missing or failing collaborator as a no-op.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::simulation::state::SimulationState;

/// Which bound a jam is stuck against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JamCause {
    AmountMax,
    AmountMin,
    SpinMax,
    SpinMin,
}

impl JamCause {
    pub fn is_spin(self) -> bool {
        matches!(self, JamCause::SpinMax | JamCause::SpinMin)
    }

    pub fn label(self) -> &'static str {
        match self {
            JamCause::AmountMax => "AMOUNT_MAX_JAM",
            JamCause::AmountMin => "AMOUNT_MIN_JAM",
            JamCause::SpinMax => "SPIN_MAX_JAM",
            JamCause::SpinMin => "SPIN_MIN_JAM",
        }
    }
}

/// Where a jam sits and how much overflow is stuck
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JamInfo {
    /// Well with the largest single residual in the jam's direction
    pub index: usize,
    /// Residual summed over all six wells
    pub magnitude: f64,
}

/// What the collaborator asks the core to do after a hook call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakResponse {
    /// Cancel every pending, telegraphed and active disposition
    pub cancel_dispositions: bool,
    /// Move the level to its terminal lose state
    pub lose: bool,
}

impl BreakResponse {
    pub fn merge(&mut self, other: BreakResponse) {
        self.cancel_dispositions |= other.cancel_dispositions;
        self.lose |= other.lose;
    }
}

#[derive(Error, Debug)]
pub enum HookError {
    #[error("collaborator rejected {hook}: {reason}")]
    Rejected { hook: &'static str, reason: String },

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
}

/// External break collaborator
///
/// All methods default to no-ops so an implementor only overrides what it needs.
pub trait BreakHooks {
    /// An unresolvable overflow was found. Relief applied to `state` here is
    /// propagated again within the same tick.
    fn trigger_jam(
        &mut self,
        _state: &mut SimulationState,
        _cause: JamCause,
        _info: JamInfo,
    ) -> Result<BreakResponse, HookError> {
        Ok(BreakResponse::default())
    }

    fn show_info_once(&mut self, _key: &str, _title: &str, _lines: &[String]) -> Result<(), HookError> {
        Ok(())
    }

    /// Runs at the top of every live tick
    fn check_breaks(
        &mut self,
        _state: &mut SimulationState,
        _dt: f64,
    ) -> Result<BreakResponse, HookError> {
        Ok(BreakResponse::default())
    }
}

/// Shared handle, so the owner can still inspect a collaborator the session holds
impl<T: BreakHooks> BreakHooks for Rc<RefCell<T>> {
    fn trigger_jam(
        &mut self,
        state: &mut SimulationState,
        cause: JamCause,
        info: JamInfo,
    ) -> Result<BreakResponse, HookError> {
        self.borrow_mut().trigger_jam(state, cause, info)
    }

    fn show_info_once(&mut self, key: &str, title: &str, lines: &[String]) -> Result<(), HookError> {
        self.borrow_mut().show_info_once(key, title, lines)
    }

    fn check_breaks(
        &mut self,
        state: &mut SimulationState,
        dt: f64,
    ) -> Result<BreakResponse, HookError> {
        self.borrow_mut().check_breaks(state, dt)
    }
}

/// Optional collaborator slot
///
/// Failures are logged and replaced with a default response so a bad hook
/// can never halt or corrupt the tick.
#[derive(Default)]
pub struct Collaborator {
    hooks: Option<Box<dyn BreakHooks>>,
}

impl Collaborator {
    pub fn none() -> Self {
        Self { hooks: None }
    }

    pub fn new(hooks: Box<dyn BreakHooks>) -> Self {
        Self { hooks: Some(hooks) }
    }

    pub fn is_attached(&self) -> bool {
        self.hooks.is_some()
    }

    pub fn trigger_jam(
        &mut self,
        state: &mut SimulationState,
        cause: JamCause,
        info: JamInfo,
    ) -> BreakResponse {
        let Some(hooks) = self.hooks.as_mut() else {
            return BreakResponse::default();
        };
        match hooks.trigger_jam(state, cause, info) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("trigger_jam({}) failed: {}", cause.label(), e);
                BreakResponse::default()
            }
        }
    }

    pub fn show_info_once(&mut self, key: &str, title: &str, lines: &[String]) {
        let Some(hooks) = self.hooks.as_mut() else {
            return;
        };
        if let Err(e) = hooks.show_info_once(key, title, lines) {
            tracing::warn!("show_info_once({}) failed: {}", key, e);
        }
    }

    pub fn check_breaks(&mut self, state: &mut SimulationState, dt: f64) -> BreakResponse {
        let Some(hooks) = self.hooks.as_mut() else {
            return BreakResponse::default();
        };
        match hooks.check_breaks(state, dt) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("check_breaks failed: {}", e);
                BreakResponse::default()
            }
        }
    }
}

impl std::fmt::Debug for Collaborator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborator")
            .field("attached", &self.is_attached())
            .finish()
    }
}
