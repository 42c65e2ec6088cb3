//! Per-message classification pipeline
//!
//! One instance owns the whole per-device state: the stored position, the
//! pending return code, and the phrase machine. Each message runs
//! validate → normalize → detect → classify → toggle/phrase to completion
//! before the next is accepted; a validation failure short-circuits before
//! any state mutation.

use tracing::debug;

use crate::classify::{composite_code, Classification, Classifier, GestureTable};
use crate::config::Settings;
use crate::error::PipelineError;
use crate::events::StatusEvent;
use crate::message::DeviceMessage;
use crate::motion::{Motion, MotionDetector};
use crate::state::{ListenState, PhraseMachine, PhraseOutcome};

/// Message emitted by a successful cycle
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    /// Per-axis signed deltas of a detected motion
    Rotation { dx: f64, dy: f64, dz: f64 },
    /// Accumulated phrase flushed by a toggle-off
    Phrase(String),
}

/// Result of one successful cycle: optional output plus the status badge
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    pub output: Option<Output>,
    pub status: StatusEvent,
}

impl Cycle {
    fn quiet(status: StatusEvent) -> Self {
        Self {
            output: None,
            status,
        }
    }
}

/// The stateful classification pipeline for one device instance
#[derive(Debug)]
pub struct Pipeline {
    toggle: u16,
    detector: MotionDetector,
    classifier: Classifier,
    machine: PhraseMachine,
}

impl Pipeline {
    pub fn new(settings: &Settings) -> Self {
        let table = GestureTable::new(&settings.fragment_overrides);
        Self {
            toggle: settings.start_toggle,
            detector: MotionDetector::new(settings.sensitivity),
            classifier: Classifier::new(table),
            machine: PhraseMachine::new(),
        }
    }

    /// Current listening state, for status reporting
    pub fn state(&self) -> ListenState {
        self.machine.state()
    }

    /// Evaluate one message
    ///
    /// Errors are terminal for this cycle only and leave all instance
    /// state as of the last successful cycle.
    pub fn process(&mut self, msg: &DeviceMessage) -> Result<Cycle, PipelineError> {
        let event = msg.device_event()?;
        let sample = event.sample()?;

        let motion = self.detector.observe(sample);
        if !motion.any() {
            return Ok(Cycle::quiet(self.idle_status()));
        }

        let code = composite_code(&motion);
        debug!(code, ?motion, "motion detected");

        // Toggle matching wins over reset-pairing
        if code == self.toggle {
            self.classifier.prime_reset(code);
            return Ok(match self.machine.on_toggle() {
                PhraseOutcome::ToggledOn => Cycle::quiet(StatusEvent::Listening),
                PhraseOutcome::Flushed(phrase) => Cycle {
                    output: Some(Output::Phrase(phrase)),
                    status: StatusEvent::Sent,
                },
                PhraseOutcome::Appended | PhraseOutcome::Ignored => {
                    Cycle::quiet(self.idle_status())
                }
            });
        }

        match self.classifier.classify(code) {
            Classification::Absorbed => Ok(Cycle::quiet(self.idle_status())),
            Classification::Matched { fragment, .. } => {
                match self.machine.on_fragment(&fragment) {
                    PhraseOutcome::Appended => Ok(Cycle::quiet(StatusEvent::Listening)),
                    _ => Ok(self.rotation_cycle(&motion)),
                }
            }
            Classification::None => Ok(self.rotation_cycle(&motion)),
        }
    }

    fn rotation_cycle(&self, motion: &Motion) -> Cycle {
        Cycle {
            output: Some(Output::Rotation {
                dx: motion.dx,
                dy: motion.dy,
                dz: motion.dz,
            }),
            status: self.idle_status(),
        }
    }

    fn idle_status(&self) -> StatusEvent {
        if self.machine.state() == ListenState::Listening {
            StatusEvent::Listening
        } else {
            StatusEvent::Cleared
        }
    }
}
