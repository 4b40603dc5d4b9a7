//! Painted progress-ring history
//!
//! Segments are appended as warped progress sweeps past them and are never
//! rewritten. Painting walks forward in small time slices so fast intensity
//! changes still show up, with a per-tick slice budget.

use serde::{Deserialize, Serialize};

use crate::disposition::envelope::EnvelopePlan;
use crate::disposition::warp::WarpLut;

/// Value captured when a segment was painted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SegmentValue {
    Intensity(f64),
    /// Discrete phase index
    Level(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PaintedSegment {
    pub index: usize,
    pub value: SegmentValue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentHistory {
    segment_count: usize,
    segments: Vec<PaintedSegment>,
    /// Elapsed time up to which history has been painted
    painted_elapsed: f64,
}

impl SegmentHistory {
    pub fn new(segment_count: usize) -> Self {
        Self {
            segment_count: segment_count.max(1),
            segments: Vec::new(),
            painted_elapsed: 0.0,
        }
    }

    pub fn segments(&self) -> &[PaintedSegment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segment_count
    }

    pub fn painted_elapsed(&self) -> f64 {
        self.painted_elapsed
    }

    pub fn is_complete(&self) -> bool {
        self.segments.len() >= self.segment_count
    }

    /// Paint forward toward `target_elapsed`, at most `max_slices` slices of
    /// `slice` seconds. Returns the number of slices used.
    pub fn paint(
        &mut self,
        target_elapsed: f64,
        envelope: &EnvelopePlan,
        warp: &WarpLut,
        slice: f64,
        max_slices: usize,
    ) -> usize {
        let target = target_elapsed.min(envelope.duration);
        let mut used = 0;
        while self.painted_elapsed < target && used < max_slices {
            let e = (self.painted_elapsed + slice).min(target);
            let reach = if e >= envelope.duration {
                self.segment_count
            } else {
                ((warp.progress(e) * self.segment_count as f64).floor() as usize)
                    .min(self.segment_count)
            };
            let value = match envelope.level_code_at(e) {
                Some(code) => SegmentValue::Level(code),
                None => SegmentValue::Intensity(envelope.intensity_at(e)),
            };
            while self.segments.len() < reach {
                self.segments.push(PaintedSegment {
                    index: self.segments.len(),
                    value,
                });
            }
            self.painted_elapsed = e;
            used += 1;
        }
        used
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disposition::envelope::PHASE_COUNT;

    fn setup(discrete: bool) -> (EnvelopePlan, WarpLut) {
        let plan = EnvelopePlan::new(10.0, [0.2; PHASE_COUNT], discrete);
        let lut = WarpLut::build(&plan, 256);
        (plan, lut)
    }

    #[test]
    fn test_painted_segments_never_change() {
        let (plan, lut) = setup(false);
        let mut history = SegmentHistory::new(240);
        history.paint(3.0, &plan, &lut, 0.01, 1000);
        let snapshot: Vec<PaintedSegment> = history.segments().to_vec();
        assert!(!snapshot.is_empty());

        history.paint(8.0, &plan, &lut, 0.01, 1000);
        assert!(history.segments().len() > snapshot.len());
        assert_eq!(&history.segments()[..snapshot.len()], snapshot.as_slice());
    }

    #[test]
    fn test_full_lifetime_paints_every_segment_in_order() {
        let (plan, lut) = setup(true);
        let mut history = SegmentHistory::new(240);
        history.paint(10.0, &plan, &lut, 0.01, 10_000);
        assert!(history.is_complete());
        for (i, seg) in history.segments().iter().enumerate() {
            assert_eq!(seg.index, i);
            assert!(matches!(seg.value, SegmentValue::Level(_)));
        }
    }

    #[test]
    fn test_slice_budget_limits_work() {
        let (plan, lut) = setup(false);
        let mut history = SegmentHistory::new(240);
        let used = history.paint(10.0, &plan, &lut, 0.01, 32);
        assert_eq!(used, 32);
        assert!((history.painted_elapsed() - 0.32).abs() < 1e-9);

        // Picks up where it stopped on the next call
        let used = history.paint(10.0, &plan, &lut, 0.01, 32);
        assert_eq!(used, 32);
        assert!((history.painted_elapsed() - 0.64).abs() < 1e-9);
    }

    #[test]
    fn test_first_half_ends_at_peak() {
        let (plan, lut) = setup(true);
        let mut history = SegmentHistory::new(240);
        history.paint(plan.peak_elapsed(), &plan, &lut, 0.01, 10_000);
        let painted = history.segments().len();
        assert!((119..=120).contains(&painted), "painted {}", painted);
    }
}
