//! Outbound notification contract
//!
//! The engine's only side channel: a small set of fire-and-forget
//! callbacks. The host (renderer, scoreboard, sound) implements `EventSink`;
//! the engine never reads anything back through it.

use super::router::LaneId;
use super::target::Target;

/// Why a target failed. User-input outcomes, never faults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    /// A melody target received any non-matching pitch
    MelodyWrongNote,
    /// A pitch outside the active chord's set arrived
    ChordStray,
    /// The collection window closed before all chord tones arrived
    ChordTimeout,
}

impl FailReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MelodyWrongNote => "melody-wrong-note",
            Self::ChordStray => "chord-stray",
            Self::ChordTimeout => "chord-timeout",
        }
    }
}

impl std::fmt::Display for FailReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-side receiver for engine notifications. All methods default to
/// no-ops so a host only implements what it cares about.
pub trait EventSink {
    fn on_success(&mut self, _lane: LaneId, _target: &Target) {}
    fn on_fail(&mut self, _lane: LaneId, _target: &Target, _reason: FailReason) {}
    fn on_lives_changed(&mut self, _lane: LaneId, _lives: u32) {}
    fn on_lane_disabled(&mut self, _lane: LaneId) {}
    fn on_game_over(&mut self, _reason: &str) {}
}

/// Sink that drops every notification
#[derive(Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {}

/// A notification captured by [`RecordingSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Success { lane: LaneId, target: Target },
    Fail { lane: LaneId, target: Target, reason: FailReason },
    LivesChanged { lane: LaneId, lives: u32 },
    LaneDisabled { lane: LaneId },
    GameOver { reason: String },
}

/// Sink that records every notification in order, for tests and replays
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub events: Vec<EngineEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn fail_reasons(&self) -> Vec<FailReason> {
        self.events
            .iter()
            .filter_map(|event| match event {
                EngineEvent::Fail { reason, .. } => Some(*reason),
                _ => None,
            })
            .collect()
    }

    pub fn success_count(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, EngineEvent::Success { .. }))
            .count()
    }

    pub fn game_over(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, EngineEvent::GameOver { .. }))
    }
}

impl EventSink for RecordingSink {
    fn on_success(&mut self, lane: LaneId, target: &Target) {
        self.events.push(EngineEvent::Success {
            lane,
            target: target.clone(),
        });
    }

    fn on_fail(&mut self, lane: LaneId, target: &Target, reason: FailReason) {
        self.events.push(EngineEvent::Fail {
            lane,
            target: target.clone(),
            reason,
        });
    }

    fn on_lives_changed(&mut self, lane: LaneId, lives: u32) {
        self.events.push(EngineEvent::LivesChanged { lane, lives });
    }

    fn on_lane_disabled(&mut self, lane: LaneId) {
        self.events.push(EngineEvent::LaneDisabled { lane });
    }

    fn on_game_over(&mut self, reason: &str) {
        self.events.push(EngineEvent::GameOver {
            reason: reason.to_string(),
        });
    }
}

/// Running hit/miss tally for a console scoreboard. The engine never owns
/// score; this lives entirely on the host side of the sink boundary.
#[derive(Debug, Default)]
pub struct Scoreboard {
    pub hits: u32,
    pub misses: u32,
    pub game_over: Option<String>,
}

impl Scoreboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventSink for Scoreboard {
    fn on_success(&mut self, lane: LaneId, target: &Target) {
        self.hits += 1;
        log::info!("hit on {} ({} tones), score {}", lane, target.pitch_count(), self.hits);
    }

    fn on_fail(&mut self, lane: LaneId, _target: &Target, reason: FailReason) {
        self.misses += 1;
        log::info!("miss on {}: {}", lane, reason);
    }

    fn on_lives_changed(&mut self, lane: LaneId, lives: u32) {
        log::info!("{} lives: {}", lane, lives);
    }

    fn on_lane_disabled(&mut self, lane: LaneId) {
        log::info!("{} disabled", lane);
    }

    fn on_game_over(&mut self, reason: &str) {
        log::info!("game over: {}", reason);
        self.game_over = Some(reason.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_sink_captures_in_order() {
        let mut sink = RecordingSink::new();
        let target = Target::melody(60);
        sink.on_fail(LaneId::Solo, &target, FailReason::MelodyWrongNote);
        sink.on_lives_changed(LaneId::Solo, 2);

        assert_eq!(sink.events.len(), 2);
        assert_eq!(sink.fail_reasons(), vec![FailReason::MelodyWrongNote]);
        assert!(matches!(
            sink.events[1],
            EngineEvent::LivesChanged { lives: 2, .. }
        ));
    }

    #[test]
    fn test_fail_reason_strings() {
        assert_eq!(FailReason::MelodyWrongNote.as_str(), "melody-wrong-note");
        assert_eq!(FailReason::ChordStray.as_str(), "chord-stray");
        assert_eq!(FailReason::ChordTimeout.as_str(), "chord-timeout");
    }
}
