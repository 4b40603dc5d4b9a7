//! Read-only render and HUD snapshots of live dispositions

use serde::{Deserialize, Serialize};

use crate::core::types::{well_angle, Hue, SimTime};
use crate::disposition::history::PaintedSegment;
use crate::disposition::instance::DispositionInstance;
use crate::disposition::types::DispositionType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderPhase {
    Telegraph,
    Active,
}

/// One disposition as drawn around its well
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderState {
    pub phase: RenderPhase,
    pub target_index: usize,
    pub kind: DispositionType,
    pub intensity01: f64,
    pub progress01: f64,
    pub segment_history: Vec<PaintedSegment>,
    /// Radians; the progress ring starts at the well's position
    pub start_angle: f64,
    pub direction_sign: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HudState {
    pub telegraph_text: String,
    pub active_text: String,
}

pub fn render_states(instances: &[DispositionInstance], now: SimTime) -> Vec<RenderState> {
    instances
        .iter()
        .map(|inst| RenderState {
            phase: if inst.is_active() {
                RenderPhase::Active
            } else {
                RenderPhase::Telegraph
            },
            target_index: inst.hue,
            kind: inst.kind,
            intensity01: inst.intensity_at(now).clamp(0.0, 1.0),
            progress01: inst.progress_at(now),
            segment_history: inst.history.segments().to_vec(),
            start_angle: well_angle(inst.hue),
            direction_sign: inst.kind.direction_sign(),
        })
        .collect()
}

fn hue_name(index: usize) -> &'static str {
    Hue::from_index(index).map(Hue::name).unwrap_or("?")
}

pub fn hud_state(instances: &[DispositionInstance], now: SimTime) -> HudState {
    let mut telegraphs = Vec::new();
    let mut actives = Vec::new();
    for inst in instances {
        match inst.profile() {
            None => telegraphs.push(format!(
                "{} on {} in {:.1}s",
                inst.kind.label(),
                hue_name(inst.hue),
                (inst.fire_at - now).max(0.0)
            )),
            Some(profile) => actives.push(format!(
                "{} on {} ({:.0}s left)",
                inst.kind.label(),
                hue_name(inst.hue),
                (profile.end_t - now).max(0.0)
            )),
        }
    }
    HudState {
        telegraph_text: telegraphs.join(" | "),
        active_text: actives.join(" | "),
    }
}
