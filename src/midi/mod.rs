//! Live MIDI input adapter: device connection and the note event queue

pub mod input;
pub mod queue;

pub use input::{MidiDeviceInfo, TrainerInput};
pub use queue::{parse_message, NoteEvent, NoteQueue};
