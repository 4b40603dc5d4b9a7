//! Warped progress mapping
//!
//! A lookup table of the running integral of intensity. Progress before the
//! peak is the pre-peak integral normalized to `[0, 0.5]`; progress after it is
//! the post-peak integral normalized to `[0.5, 1]`. The peak therefore always
//! lands at exactly 0.5 whatever the envelope's asymmetry.

use serde::{Deserialize, Serialize};

use crate::disposition::envelope::EnvelopePlan;

const SUBSTEPS: usize = 4;
const FLAT_EPSILON: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WarpLut {
    duration: f64,
    step: f64,
    /// Running integral at `i * step`
    cumulative: Vec<f64>,
    peak: f64,
    peak_integral: f64,
}

impl WarpLut {
    /// Sample the envelope's intensity integral at `samples` evenly spaced points
    pub fn build(envelope: &EnvelopePlan, samples: usize) -> Self {
        let samples = samples.max(2);
        let duration = envelope.duration;
        let step = duration / (samples - 1) as f64;
        let h = step / SUBSTEPS as f64;

        let mut cumulative = Vec::with_capacity(samples);
        cumulative.push(0.0);
        let mut acc = 0.0;
        for i in 1..samples {
            let t0 = (i - 1) as f64 * step;
            for s in 0..SUBSTEPS {
                acc += envelope.intensity_at(t0 + (s as f64 + 0.5) * h) * h;
            }
            cumulative.push(acc);
        }

        let mut lut = Self {
            duration,
            step,
            cumulative,
            peak: envelope.peak_elapsed(),
            peak_integral: 0.0,
        };
        lut.peak_integral = lut.integral(lut.peak);
        lut
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn peak(&self) -> f64 {
        self.peak
    }

    /// Integral of intensity over the whole lifetime
    pub fn total(&self) -> f64 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    /// Integral of intensity from 0 to `elapsed`, linearly interpolated
    pub fn integral(&self, elapsed: f64) -> f64 {
        if self.step <= 0.0 {
            return 0.0;
        }
        if elapsed >= self.duration {
            return self.total();
        }
        let e = elapsed.max(0.0);
        let last = self.cumulative.len() - 1;
        let pos = e / self.step;
        let i = (pos.floor() as usize).min(last - 1);
        let frac = (pos - i as f64).clamp(0.0, 1.0);
        self.cumulative[i] + (self.cumulative[i + 1] - self.cumulative[i]) * frac
    }

    /// Map elapsed time to `[0, 1]` with the peak pinned at 0.5
    pub fn progress(&self, elapsed: f64) -> f64 {
        let e = elapsed.clamp(0.0, self.duration);
        let p = if e <= self.peak {
            if self.peak_integral > FLAT_EPSILON {
                0.5 * self.integral(e) / self.peak_integral
            } else if self.peak > 0.0 {
                0.5 * e / self.peak
            } else {
                0.5
            }
        } else {
            let post = self.total() - self.peak_integral;
            let span = self.duration - self.peak;
            if post > FLAT_EPSILON {
                0.5 + 0.5 * (self.integral(e) - self.peak_integral) / post
            } else if span > 0.0 {
                0.5 + 0.5 * (e - self.peak) / span
            } else {
                1.0
            }
        };
        p.clamp(0.0, 1.0)
    }
}
