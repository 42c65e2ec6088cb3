//! Delta-based motion detection against the previous sample
//!
//! The detector keeps exactly one stored position and compares each incoming
//! sample against it per axis. The stored position is overwritten every
//! cycle whether or not motion fired, so thresholds always apply to the
//! immediately preceding sample rather than a settled baseline.

use crate::message::Sample;

/// Per-cycle motion result: changed flags and signed deltas per axis
///
/// A delta is `previous − current` and stays `0.0` on axes that did not
/// cross the sensitivity threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Motion {
    pub x: bool,
    pub y: bool,
    pub z: bool,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Motion {
    /// True when at least one axis crossed the threshold
    pub fn any(&self) -> bool {
        self.x || self.y || self.z
    }
}

/// Threshold-based detector holding the last seen sample
#[derive(Debug)]
pub struct MotionDetector {
    sensitivity: f64,
    last: Option<Sample>,
}

impl MotionDetector {
    pub fn new(sensitivity: f64) -> Self {
        Self {
            sensitivity,
            last: None,
        }
    }

    /// Compare `sample` against the stored position and remember it
    ///
    /// Cold start (no stored position yet) reports no motion. The threshold
    /// boundary is inclusive: an axis fires when the values differ and
    /// `|delta| >= sensitivity`.
    pub fn observe(&mut self, sample: Sample) -> Motion {
        let motion = match self.last {
            None => Motion::default(),
            Some(prev) => {
                let (x, dx) = self.axis(prev.x, sample.x);
                let (y, dy) = self.axis(prev.y, sample.y);
                let (z, dz) = self.axis(prev.z, sample.z);
                Motion {
                    x,
                    y,
                    z,
                    dx,
                    dy,
                    dz,
                }
            }
        };

        self.last = Some(sample);
        motion
    }

    fn axis(&self, prev: f64, cur: f64) -> (bool, f64) {
        let delta = prev - cur;
        if prev != cur && delta.abs() >= self.sensitivity {
            (true, delta)
        } else {
            (false, 0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f64, y: f64, z: f64) -> Sample {
        Sample { x, y, z }
    }

    #[test]
    fn test_cold_start_reports_no_motion() {
        let mut detector = MotionDetector::new(0.5);
        let motion = detector.observe(sample(10.0, -4.0, 99.0));
        assert_eq!(motion, Motion::default());
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let mut detector = MotionDetector::new(0.5);
        detector.observe(sample(1.0, 1.0, 1.0));

        // x moves by exactly the threshold, y and z stay put
        let motion = detector.observe(sample(1.5, 1.0, 1.0));
        assert!(motion.x);
        assert!(!motion.y);
        assert!(!motion.z);
        assert_eq!(motion.dx, -0.5);
    }

    #[test]
    fn test_below_threshold_is_quiet() {
        let mut detector = MotionDetector::new(0.5);
        detector.observe(sample(1.0, 1.0, 1.0));

        let motion = detector.observe(sample(1.2, 0.9, 1.49));
        assert!(!motion.any());
        assert_eq!(motion.dx, 0.0);
        assert_eq!(motion.dy, 0.0);
        assert_eq!(motion.dz, 0.0);
    }

    #[test]
    fn test_delta_sign_is_previous_minus_current() {
        let mut detector = MotionDetector::new(0.5);
        detector.observe(sample(2.0, 2.0, 2.0));

        let motion = detector.observe(sample(1.0, 3.0, 2.0));
        assert_eq!(motion.dx, 1.0);
        assert_eq!(motion.dy, -1.0);
        assert_eq!(motion.dz, 0.0);
    }

    #[test]
    fn test_stored_position_overwritten_without_motion() {
        let mut detector = MotionDetector::new(1.0);
        detector.observe(sample(0.0, 0.0, 1.0));

        // Creeps by 0.6 per cycle: never crosses against the immediately
        // preceding sample even though the total drift exceeds the threshold
        assert!(!detector.observe(sample(0.6, 0.0, 1.0)).any());
        assert!(!detector.observe(sample(1.2, 0.0, 1.0)).any());
        assert!(!detector.observe(sample(1.8, 0.0, 1.0)).any());
    }
}
