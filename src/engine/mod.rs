//! Lane evaluation engine for the note-reading trainer
//!
//! The decision core: routes incoming MIDI pitches to lanes, applies the
//! strict melody rule and the timed chord collection rule, keeps life and
//! enablement bookkeeping, and schedules target spawns. Rendering, sound
//! and device transport live outside, behind the [`events::EventSink`]
//! notification boundary and the [`Session`] entry points.

pub mod config;
pub mod events;
pub mod generator;
pub mod lane;
pub mod router;
pub mod session;
pub mod target;
pub mod timer;

pub use config::{
    CadenceConfig, ConfigError, LaneConfig, LaneMode, PitchRange, SessionConfig, SpawnPolicy,
};
pub use events::{EngineEvent, EventSink, FailReason, NullSink, RecordingSink, Scoreboard};
pub use router::{route, LaneId, SPLIT_POINT};
pub use session::{Session, TIMEOUT_SLACK_MS, WINDOW_MS};
pub use target::{Target, TargetId};
