//! Phrase accumulation state machine
//!
//! Provides an explicit state machine with three states:
//! - Idle: never toggled, no accumulation
//! - Listening: accumulating phrase fragments
//! - Paused: toggled off, waiting for the next toggle
//!
//! Driven solely by the configured toggle code.

mod machine;

pub use machine::{ListenState, PhraseMachine, PhraseOutcome};
