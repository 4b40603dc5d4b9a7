//! Five-phase intensity envelopes
//!
//! An instance's duration is cut into five phases by random weights. Continuous
//! envelopes pass through each phase's level at the phase midpoint and
//! smoothstep between neighbouring midpoints, so the apex sits at the middle of
//! phase 2. Discrete envelopes hold each phase's level flat.

use rand::Rng;
use serde::{Deserialize, Serialize};

pub const PHASE_COUNT: usize = 5;
/// Phase holding the highest level
pub const PEAK_PHASE: usize = 2;

pub const CONTINUOUS_LEVELS: [f64; PHASE_COUNT] = [0.0, 0.5, 1.0, 0.5, 0.0];
pub const DISCRETE_LEVELS: [f64; PHASE_COUNT] = [0.15, 0.55, 0.95, 0.55, 0.15];

const MAX_WEIGHT_ATTEMPTS: usize = 64;

fn smoothstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Draw five phase weights that sum to 1 with each inside `[min, max]`
///
/// Resamples until a draw lands inside the limits; falls back to equal
/// weights if none does within a fixed number of attempts.
pub fn sample_weights<R: Rng>(rng: &mut R, min: f64, max: f64) -> [f64; PHASE_COUNT] {
    for _ in 0..MAX_WEIGHT_ATTEMPTS {
        let mut raw = [0.0; PHASE_COUNT];
        for w in raw.iter_mut() {
            *w = rng.gen_range(0.5..1.5);
        }
        let sum: f64 = raw.iter().sum();
        let weights = raw.map(|w| w / sum);
        if weights.iter().all(|w| *w >= min && *w <= max) {
            return weights;
        }
    }
    [1.0 / PHASE_COUNT as f64; PHASE_COUNT]
}

/// Phase layout of one disposition over its lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvelopePlan {
    pub duration: f64,
    pub weights: [f64; PHASE_COUNT],
    /// Phase edges in elapsed seconds; `[0]` is 0 and `[5]` is `duration`
    pub boundaries: [f64; PHASE_COUNT + 1],
    pub discrete: bool,
}

impl EnvelopePlan {
    pub fn new(duration: f64, weights: [f64; PHASE_COUNT], discrete: bool) -> Self {
        let mut boundaries = [0.0; PHASE_COUNT + 1];
        let mut acc = 0.0;
        for (k, w) in weights.iter().enumerate() {
            acc += w;
            boundaries[k + 1] = acc * duration;
        }
        boundaries[PHASE_COUNT] = duration;
        Self {
            duration,
            weights,
            boundaries,
            discrete,
        }
    }

    /// Roll weights and build a plan
    pub fn roll<R: Rng>(
        rng: &mut R,
        duration: f64,
        discrete: bool,
        weight_min: f64,
        weight_max: f64,
    ) -> Self {
        let weights = sample_weights(rng, weight_min, weight_max);
        Self::new(duration, weights, discrete)
    }

    pub fn levels(&self) -> &'static [f64; PHASE_COUNT] {
        if self.discrete {
            &DISCRETE_LEVELS
        } else {
            &CONTINUOUS_LEVELS
        }
    }

    /// Phase containing `elapsed`, clamped into the envelope
    pub fn phase_at(&self, elapsed: f64) -> usize {
        (1..PHASE_COUNT)
            .find(|k| elapsed < self.boundaries[*k])
            .map(|k| k - 1)
            .unwrap_or(PHASE_COUNT - 1)
    }

    pub fn midpoint(&self, phase: usize) -> f64 {
        0.5 * (self.boundaries[phase] + self.boundaries[phase + 1])
    }

    /// Elapsed time of peak intensity: the middle of the top plateau
    /// (discrete) or the single apex (continuous). Both are the midpoint of
    /// the peak phase.
    pub fn peak_elapsed(&self) -> f64 {
        self.midpoint(PEAK_PHASE)
    }

    /// Intensity in `[0, 1]` at `elapsed` seconds into the instance
    pub fn intensity_at(&self, elapsed: f64) -> f64 {
        if elapsed < 0.0 || elapsed > self.duration {
            return 0.0;
        }
        let levels = self.levels();
        if self.discrete {
            return levels[self.phase_at(elapsed)];
        }

        let first = self.midpoint(0);
        let last = self.midpoint(PHASE_COUNT - 1);
        if elapsed <= first {
            return levels[0];
        }
        if elapsed >= last {
            return levels[PHASE_COUNT - 1];
        }
        for k in 0..PHASE_COUNT - 1 {
            let a = self.midpoint(k);
            let b = self.midpoint(k + 1);
            if elapsed <= b {
                let t = if b > a { (elapsed - a) / (b - a) } else { 1.0 };
                return levels[k] + (levels[k + 1] - levels[k]) * smoothstep(t);
            }
        }
        levels[PHASE_COUNT - 1]
    }

    /// Level code recorded in history for discrete envelopes
    pub fn level_code_at(&self, elapsed: f64) -> Option<u8> {
        self.discrete.then(|| self.phase_at(elapsed) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn even(discrete: bool) -> EnvelopePlan {
        EnvelopePlan::new(20.0, [0.2; PHASE_COUNT], discrete)
    }

    #[test]
    fn test_sampled_weights_are_valid() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..200 {
            let w = sample_weights(&mut rng, 0.10, 0.30);
            let sum: f64 = w.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
            assert!(w.iter().all(|x| (0.10..=0.30).contains(x)));
        }
    }

    #[test]
    fn test_boundaries_cover_duration() {
        let plan = EnvelopePlan::new(30.0, [0.1, 0.3, 0.2, 0.25, 0.15], false);
        assert_eq!(plan.boundaries[0], 0.0);
        assert_eq!(plan.boundaries[5], 30.0);
        assert!((plan.boundaries[1] - 3.0).abs() < 1e-9);
        assert!((plan.boundaries[2] - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_phase_lookup() {
        let plan = even(true);
        assert_eq!(plan.phase_at(0.0), 0);
        assert_eq!(plan.phase_at(3.9), 0);
        assert_eq!(plan.phase_at(4.0), 1);
        assert_eq!(plan.phase_at(10.0), 2);
        assert_eq!(plan.phase_at(19.99), 4);
        assert_eq!(plan.phase_at(25.0), 4);
    }

    #[test]
    fn test_continuous_apex_is_one_at_peak() {
        let plan = even(false);
        assert!((plan.peak_elapsed() - 10.0).abs() < 1e-9);
        assert!((plan.intensity_at(plan.peak_elapsed()) - 1.0).abs() < 1e-12);
        assert!(plan.intensity_at(9.0) < 1.0);
        assert!(plan.intensity_at(11.0) < 1.0);
        assert_eq!(plan.intensity_at(1.0), 0.0);
        assert!((plan.intensity_at(6.0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_discrete_levels_are_stepped() {
        let plan = even(true);
        assert_eq!(plan.intensity_at(1.0), 0.15);
        assert_eq!(plan.intensity_at(5.0), 0.55);
        assert_eq!(plan.intensity_at(10.0), 0.95);
        assert_eq!(plan.intensity_at(19.0), 0.15);
        assert_eq!(plan.level_code_at(10.0), Some(2));
        assert_eq!(even(false).level_code_at(10.0), None);
    }

    #[test]
    fn test_outside_lifetime_is_zero() {
        let plan = even(true);
        assert_eq!(plan.intensity_at(-0.1), 0.0);
        assert_eq!(plan.intensity_at(20.1), 0.0);
    }
}
