//! Core phrase/toggle state machine implementation
//!
//! Handles transitions between Idle, Listening, and Paused driven by the
//! toggle gesture, and accumulates phrase fragments while listening.

use tracing::{debug, info};

/// The three externally visible states of the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenState {
    /// Never toggled, nothing accumulates
    Idle,
    /// Fragments accumulate into the phrase
    Listening,
    /// Toggled off after at least one session
    Paused,
}

impl Default for ListenState {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for ListenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListenState::Idle => write!(f, "Idle"),
            ListenState::Listening => write!(f, "Listening"),
            ListenState::Paused => write!(f, "Paused"),
        }
    }
}

/// Result of feeding one cycle's classification into the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhraseOutcome {
    /// Toggled into Listening; accumulation starts next cycle
    ToggledOn,
    /// Toggled out of Listening; carries the flushed phrase
    Flushed(String),
    /// Fragment appended to the phrase buffer
    Appended,
    /// Nothing to do this cycle
    Ignored,
}

/// Accumulates a spoken phrase between toggle gestures
///
/// No terminal state: the machine cycles Listening ↔ Paused for the
/// lifetime of the owning instance.
#[derive(Debug, Default)]
pub struct PhraseMachine {
    /// True after the first toggle ever
    started: bool,
    /// True while fragments accumulate
    listening: bool,
    /// Space-joined fragments, each with its trailing space
    phrase: String,
}

impl PhraseMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current externally visible state
    pub fn state(&self) -> ListenState {
        match (self.started, self.listening) {
            (false, _) => ListenState::Idle,
            (true, true) => ListenState::Listening,
            (true, false) => ListenState::Paused,
        }
    }

    /// Handle a cycle whose code matched the configured toggle
    ///
    /// Flips `listening` and marks the machine started. Toggling off
    /// flushes the accumulated phrase, clearing the buffer.
    pub fn on_toggle(&mut self) -> PhraseOutcome {
        let was_started = self.started;
        self.started = true;
        self.listening = !self.listening;

        info!(state = %self.state(), "toggle gesture");

        if self.listening {
            PhraseOutcome::ToggledOn
        } else if was_started {
            let phrase = std::mem::take(&mut self.phrase);
            PhraseOutcome::Flushed(phrase)
        } else {
            PhraseOutcome::Ignored
        }
    }

    /// Handle a cycle that classified to a gesture fragment
    pub fn on_fragment(&mut self, fragment: &str) -> PhraseOutcome {
        if !self.started {
            // Nothing may accumulate before the first toggle
            self.phrase.clear();
            return PhraseOutcome::Ignored;
        }

        if !self.listening {
            return PhraseOutcome::Ignored;
        }

        self.phrase.push_str(fragment);
        self.phrase.push(' ');
        debug!(fragment, phrase = %self.phrase, "fragment appended");
        PhraseOutcome::Appended
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let machine = PhraseMachine::new();
        assert_eq!(machine.state(), ListenState::Idle);
    }

    #[test]
    fn test_toggle_enters_listening() {
        let mut machine = PhraseMachine::new();
        assert_eq!(machine.on_toggle(), PhraseOutcome::ToggledOn);
        assert_eq!(machine.state(), ListenState::Listening);
    }

    #[test]
    fn test_toggle_round_trip_flushes() {
        let mut machine = PhraseMachine::new();

        machine.on_toggle();
        assert_eq!(machine.on_fragment("Roll -45"), PhraseOutcome::Appended);
        assert_eq!(machine.on_fragment("Pitch +90"), PhraseOutcome::Appended);

        let outcome = machine.on_toggle();
        assert_eq!(
            outcome,
            PhraseOutcome::Flushed("Roll -45 Pitch +90 ".to_string())
        );
        assert_eq!(machine.state(), ListenState::Paused);

        // Buffer cleared by the flush
        machine.on_toggle();
        assert_eq!(machine.on_toggle(), PhraseOutcome::Flushed(String::new()));
    }

    #[test]
    fn test_no_accumulation_before_first_toggle() {
        let mut machine = PhraseMachine::new();
        assert_eq!(machine.on_fragment("Roll -45"), PhraseOutcome::Ignored);
        assert_eq!(machine.state(), ListenState::Idle);

        machine.on_toggle();
        assert_eq!(machine.on_toggle(), PhraseOutcome::Flushed(String::new()));
    }

    #[test]
    fn test_paused_ignores_fragments() {
        let mut machine = PhraseMachine::new();
        machine.on_toggle();
        machine.on_fragment("Roll -45");
        machine.on_toggle();

        assert_eq!(machine.on_fragment("Pitch +45"), PhraseOutcome::Ignored);

        machine.on_toggle();
        machine.on_fragment("Roll +90");
        assert_eq!(
            machine.on_toggle(),
            PhraseOutcome::Flushed("Roll +90 ".to_string())
        );
    }
}
