//! Composite code encoding and gesture classification
//!
//! The three axis deltas fold into a single base-3 code (0 = no motion,
//! 1 = negative delta, 2 = positive delta; X weighs units, Y tens,
//! Z hundreds). Codes are looked up in a fixed table of pitch/roll
//! gestures. Each gesture declares a return code: the swing back toward
//! neutral produces that code, and classifying it right after the gesture
//! would double-count, so one pending return code is tracked and absorbed
//! silently.

use std::collections::HashMap;

use crate::motion::Motion;

/// One entry of the gesture table
#[derive(Debug, Clone)]
pub struct Gesture {
    pub code: u16,
    pub fragment: String,
    /// Code produced by the return-to-neutral swing of this gesture
    pub reset: u16,
}

/// Default code → (fragment, return code) mapping for the SensorTag
/// pitch/roll vocabulary
const DEFAULT_GESTURES: &[(u16, &str, u16)] = &[
    (1, "Pitch -45", 2),
    (2, "Pitch +45", 1),
    (10, "Roll -45", 20),
    (20, "Roll +45", 10),
    (200, "Roll/Pitch 180", 100),
    (201, "Pitch -90", 102),
    (202, "Pitch +90", 101),
    (211, "Pitch -45 & Roll -45", 122),
    (212, "Pitch +45 & Roll -45", 121),
    (221, "Pitch -45 & Roll +45", 112),
    (222, "Pitch +45 & Roll +45", 111),
    (210, "Roll -90", 120),
    (220, "Roll +90", 110),
];

/// Encode per-axis deltas into the composite classification code
pub fn composite_code(motion: &Motion) -> u16 {
    digit(motion.dx) + 10 * digit(motion.dy) + 100 * digit(motion.dz)
}

fn digit(delta: f64) -> u16 {
    if delta == 0.0 {
        0
    } else if delta < 0.0 {
        1
    } else {
        2
    }
}

/// The gesture lookup table, with optional per-code fragment overrides
#[derive(Debug, Clone)]
pub struct GestureTable {
    entries: Vec<Gesture>,
}

impl GestureTable {
    pub fn new(overrides: &HashMap<u16, String>) -> Self {
        let entries = DEFAULT_GESTURES
            .iter()
            .map(|&(code, fragment, reset)| Gesture {
                code,
                fragment: overrides
                    .get(&code)
                    .cloned()
                    .unwrap_or_else(|| fragment.to_string()),
                reset,
            })
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, code: u16) -> Option<&Gesture> {
        self.entries.iter().find(|g| g.code == code)
    }
}

impl Default for GestureTable {
    fn default() -> Self {
        Self::new(&HashMap::new())
    }
}

/// Outcome of classifying one composite code
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Classification {
    /// Code is not in the table
    None,
    /// Code matched the pending return code and was consumed silently
    Absorbed,
    /// Code matched a gesture
    Matched { code: u16, fragment: String },
}

/// Stateful classifier tracking at most one pending return code
#[derive(Debug)]
pub struct Classifier {
    table: GestureTable,
    pending_reset: Option<u16>,
}

impl Classifier {
    pub fn new(table: GestureTable) -> Self {
        Self {
            table,
            pending_reset: None,
        }
    }

    /// Classify a composite code
    ///
    /// A pending return code takes precedence over the table; matching it
    /// clears it without emitting. A table match records its own return
    /// code, replacing any pending one.
    pub fn classify(&mut self, code: u16) -> Classification {
        if self.pending_reset == Some(code) {
            self.pending_reset = None;
            return Classification::Absorbed;
        }

        match self.table.lookup(code) {
            Some(gesture) => {
                self.pending_reset = Some(gesture.reset);
                Classification::Matched {
                    code: gesture.code,
                    fragment: gesture.fragment.clone(),
                }
            }
            None => Classification::None,
        }
    }

    /// Record the return code of `code` without classifying it
    ///
    /// Used when the code was consumed as the listening toggle: the toggle
    /// gesture still swings back physically, and its return code must be
    /// absorbed like any other.
    pub fn prime_reset(&mut self, code: u16) {
        if let Some(gesture) = self.table.lookup(code) {
            self.pending_reset = Some(gesture.reset);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::Motion;

    fn motion(dx: f64, dy: f64, dz: f64) -> Motion {
        Motion {
            x: dx != 0.0,
            y: dy != 0.0,
            z: dz != 0.0,
            dx,
            dy,
            dz,
        }
    }

    #[test]
    fn test_code_weighting() {
        assert_eq!(composite_code(&motion(-1.0, 0.0, 0.0)), 1);
        assert_eq!(composite_code(&motion(0.0, 1.0, 0.0)), 20);
        assert_eq!(composite_code(&motion(1.0, 1.0, 1.0)), 222);
        assert_eq!(composite_code(&motion(0.0, 0.0, 0.0)), 0);
    }

    #[test]
    fn test_unmapped_code_is_no_event() {
        let mut classifier = Classifier::new(GestureTable::default());
        // 100 is only ever a return code, never a gesture
        assert_eq!(classifier.classify(100), Classification::None);
        assert_eq!(classifier.classify(0), Classification::None);
    }

    #[test]
    fn test_return_swing_absorbed_once() {
        let mut classifier = Classifier::new(GestureTable::default());

        assert_eq!(
            classifier.classify(1),
            Classification::Matched {
                code: 1,
                fragment: "Pitch -45".into()
            }
        );
        // Return swing of code 1 is code 2: consumed silently
        assert_eq!(classifier.classify(2), Classification::Absorbed);
        // A third occurrence classifies normally again
        assert_eq!(
            classifier.classify(2),
            Classification::Matched {
                code: 2,
                fragment: "Pitch +45".into()
            }
        );
    }

    #[test]
    fn test_second_gesture_replaces_pending_reset() {
        let mut classifier = Classifier::new(GestureTable::default());

        classifier.classify(1); // pending reset = 2
        classifier.classify(10); // pending reset = 20
        assert_eq!(
            classifier.classify(2),
            Classification::Matched {
                code: 2,
                fragment: "Pitch +45".into()
            }
        );
    }

    #[test]
    fn test_prime_reset_absorbs_toggle_return() {
        let mut classifier = Classifier::new(GestureTable::default());

        classifier.prime_reset(1);
        assert_eq!(classifier.classify(2), Classification::Absorbed);
    }

    #[test]
    fn test_fragment_override() {
        let mut overrides = HashMap::new();
        overrides.insert(10, "port".to_string());
        let table = GestureTable::new(&overrides);

        assert_eq!(table.lookup(10).unwrap().fragment, "port");
        assert_eq!(table.lookup(20).unwrap().fragment, "Roll +45");
    }
}
