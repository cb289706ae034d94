//! staffrun: decision core of a MIDI note-reading trainer
//!
//! The [`engine`] module evaluates live note-on input against lanes of
//! melody and chord targets: strict matching, timed chord collection,
//! lives, and spawn cadence. The [`midi`] module is the thin adapter that
//! feeds it from a real device.

pub mod engine;
pub mod midi;

pub use engine::{EventSink, FailReason, LaneId, Session, SessionConfig, Target};
