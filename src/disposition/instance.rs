//! Telegraphed and active disposition instances

use serde::{Deserialize, Serialize};

use crate::core::types::SimTime;
use crate::disposition::envelope::EnvelopePlan;
use crate::disposition::history::SegmentHistory;
use crate::disposition::types::{DispositionType, InstanceId, Tier};
use crate::disposition::warp::WarpLut;

/// Everything rolled when an instance fires
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveProfile {
    pub start_t: SimTime,
    pub end_t: SimTime,
    pub duration_sec: f64,
    pub envelope: EnvelopePlan,
    pub warp: WarpLut,
    /// Scale on intensity so the lifetime integral equals `target_total`
    pub effective_strength: f64,
    pub target_total: f64,
}

impl ActiveProfile {
    pub fn elapsed(&self, now: SimTime) -> f64 {
        (now - self.start_t).clamp(0.0, self.duration_sec)
    }

    /// Change delivered between two elapsed times
    pub fn delivered_between(&self, from: f64, to: f64) -> f64 {
        if to <= from {
            return 0.0;
        }
        self.effective_strength * (self.warp.integral(to) - self.warp.integral(from))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstancePhase {
    Telegraph,
    Active(Box<ActiveProfile>),
}

/// A disposition holding a well reservation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispositionInstance {
    pub id: InstanceId,
    /// Index of the pool template it came from
    pub template: usize,
    pub kind: DispositionType,
    pub hue: usize,
    pub tier: Tier,
    pub tele_start_t: SimTime,
    pub fire_at: SimTime,
    pub phase: InstancePhase,
    pub history: SegmentHistory,
}

impl DispositionInstance {
    pub fn is_active(&self) -> bool {
        matches!(self.phase, InstancePhase::Active(_))
    }

    pub fn profile(&self) -> Option<&ActiveProfile> {
        match &self.phase {
            InstancePhase::Active(profile) => Some(&**profile),
            InstancePhase::Telegraph => None,
        }
    }

    /// Current intensity; zero while telegraphing
    pub fn intensity_at(&self, now: SimTime) -> f64 {
        self.profile()
            .map(|p| p.envelope.intensity_at(p.elapsed(now)))
            .unwrap_or(0.0)
    }

    /// Warped progress while active, linear telegraph progress before that
    pub fn progress_at(&self, now: SimTime) -> f64 {
        match &self.phase {
            InstancePhase::Active(p) => p.warp.progress(p.elapsed(now)),
            InstancePhase::Telegraph => {
                let span = self.fire_at - self.tele_start_t;
                if span > 0.0 {
                    ((now - self.tele_start_t) / span).clamp(0.0, 1.0)
                } else {
                    1.0
                }
            }
        }
    }

    /// Ended once time has passed its end
    pub fn is_expired(&self, now: SimTime) -> bool {
        self.profile().map(|p| now > p.end_t).unwrap_or(false)
    }
}
