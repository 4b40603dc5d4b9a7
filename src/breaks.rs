//! Default break collaborator used by the headless runner
//!
//! Jams vent their stuck overflow out of the reported well and clear the
//! disposition queue. Psyche leaving `[0, cap]` is a mental break: the meter
//! is pulled back to the bound it crossed. Too many breaks lose the level.

use ahash::AHashSet;

use crate::core::types::WELL_COUNT;
use crate::simulation::hooks::{BreakHooks, BreakResponse, HookError, JamCause, JamInfo};
use crate::simulation::state::SimulationState;

pub const DEFAULT_MAX_BREAKS: u32 = 3;

#[derive(Debug, Clone)]
pub struct VentingBreaks {
    psyche_cap: f64,
    max_breaks: u32,
    breaks: u32,
    jams: u32,
    shown: AHashSet<String>,
}

impl VentingBreaks {
    pub fn new(psyche_cap: f64, max_breaks: u32) -> Self {
        Self {
            psyche_cap,
            max_breaks,
            breaks: 0,
            jams: 0,
            shown: AHashSet::new(),
        }
    }

    pub fn breaks(&self) -> u32 {
        self.breaks
    }

    pub fn jams(&self) -> u32 {
        self.jams
    }

    pub fn has_shown(&self, key: &str) -> bool {
        self.shown.contains(key)
    }

    fn record_break(&mut self) -> BreakResponse {
        self.breaks += 1;
        BreakResponse {
            cancel_dispositions: true,
            lose: self.breaks > self.max_breaks,
        }
    }
}

impl BreakHooks for VentingBreaks {
    fn trigger_jam(
        &mut self,
        state: &mut SimulationState,
        cause: JamCause,
        info: JamInfo,
    ) -> Result<BreakResponse, HookError> {
        if info.index >= WELL_COUNT {
            return Err(HookError::Rejected {
                hook: "trigger_jam",
                reason: format!("well {} out of range", info.index),
            });
        }
        self.jams += 1;
        let i = info.index;
        match cause {
            JamCause::AmountMax => state.amount[i] -= info.magnitude,
            JamCause::AmountMin => state.amount[i] += info.magnitude,
            JamCause::SpinMax => state.spin[i] -= info.magnitude,
            JamCause::SpinMin => state.spin[i] += info.magnitude,
        }
        tracing::info!(
            "Vented {:.2} from well {} after {}",
            info.magnitude,
            i,
            cause.label()
        );
        Ok(BreakResponse {
            cancel_dispositions: true,
            lose: false,
        })
    }

    fn show_info_once(&mut self, key: &str, title: &str, lines: &[String]) -> Result<(), HookError> {
        if self.shown.insert(key.to_string()) {
            tracing::info!("{}: {}", title, lines.join(" "));
        }
        Ok(())
    }

    fn check_breaks(
        &mut self,
        state: &mut SimulationState,
        _dt: f64,
    ) -> Result<BreakResponse, HookError> {
        let mut response = BreakResponse::default();
        for i in 0..WELL_COUNT {
            let p = state.psyche[i];
            if (0.0..=self.psyche_cap).contains(&p) {
                continue;
            }
            state.psyche[i] = p.clamp(0.0, self.psyche_cap);
            response.merge(self.record_break());
            tracing::info!(
                "Mental break on well {} (Psyche {:.1}), {} of {} allowed",
                i,
                p,
                self.breaks,
                self.max_breaks
            );
        }
        Ok(response)
    }
}
