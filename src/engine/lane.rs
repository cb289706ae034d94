//! Per-lane mutable state: lives, target queue, chord collection window

use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use super::config::{LaneConfig, LaneMode, PitchRange, SpawnPolicy};
use super::router::LaneId;
use super::target::{Target, TargetId};

/// In-progress chord collection. At most one window is open per lane and it
/// always references the lane's current head target.
#[derive(Debug, Clone)]
pub struct ChordWindow {
    pub target_id: TargetId,
    pub started: Instant,
    pub collected: HashSet<u8>,
}

/// One evaluation lane and everything it exclusively owns
#[derive(Debug)]
pub struct Lane {
    id: LaneId,
    config: LaneConfig,
    lives: u32,
    queue: VecDeque<Target>,
    window: Option<ChordWindow>,
    /// Seed for the next melodic step; last pitch generated for this lane
    last_melody_pitch: Option<u8>,
    /// Queued policy: when the next cadence spawn is due
    next_spawn_due: Option<Instant>,
}

impl Lane {
    pub fn new(id: LaneId, config: LaneConfig) -> Self {
        Self {
            id,
            config,
            lives: config.lives,
            queue: VecDeque::new(),
            window: None,
            last_melody_pitch: None,
            next_spawn_due: None,
        }
    }

    pub fn id(&self) -> LaneId {
        self.id
    }

    pub fn mode(&self) -> LaneMode {
        self.config.mode
    }

    pub fn policy(&self) -> SpawnPolicy {
        self.config.policy
    }

    pub fn range(&self) -> PitchRange {
        self.config.range
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// A lane is enabled while it has lives left; dropping to zero is
    /// terminal until the session is rebuilt
    pub fn is_enabled(&self) -> bool {
        self.lives > 0
    }

    /// Lose a life, saturating at zero. Returns the new count.
    pub fn lose_life(&mut self) -> u32 {
        self.lives = self.lives.saturating_sub(1);
        self.lives
    }

    /// Only the head of the queue is ever eligible for note matching
    pub fn head(&self) -> Option<&Target> {
        self.queue.front()
    }

    pub fn pop_head(&mut self) -> Option<Target> {
        self.queue.pop_front()
    }

    pub fn push_target(&mut self, target: Target) {
        if let Target::Melody { pitch, .. } = target {
            self.last_melody_pitch = Some(pitch);
        }
        self.queue.push_back(target);
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn last_melody_pitch(&self) -> Option<u8> {
        self.last_melody_pitch
    }

    pub fn window(&self) -> Option<&ChordWindow> {
        self.window.as_ref()
    }

    pub fn window_mut(&mut self) -> Option<&mut ChordWindow> {
        self.window.as_mut()
    }

    /// Open a fresh collection window for the given head target
    pub fn open_window(&mut self, target_id: TargetId, now: Instant) {
        self.window = Some(ChordWindow {
            target_id,
            started: now,
            collected: HashSet::new(),
        });
    }

    pub fn clear_window(&mut self) {
        self.window = None;
    }

    pub fn next_spawn_due(&self) -> Option<Instant> {
        self.next_spawn_due
    }

    pub fn set_next_spawn_due(&mut self, due: Option<Instant>) {
        self.next_spawn_due = due;
    }

    /// Replace the queue with a scripted sequence of targets (practice
    /// drills). Clears any open window, which could only reference a
    /// discarded head.
    pub fn load_drill(&mut self, targets: impl IntoIterator<Item = Target>) {
        self.queue = targets.into_iter().collect();
        self.window = None;
    }

    /// Reset lives, queue and window from the lane's config
    pub fn reset(&mut self) {
        self.lives = self.config.lives;
        self.queue.clear();
        self.window = None;
        self.last_melody_pitch = None;
        self.next_spawn_due = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lane() -> Lane {
        Lane::new(LaneId::Solo, LaneConfig::treble())
    }

    #[test]
    fn test_lives_saturate_at_zero() {
        let mut lane = lane();
        for _ in 0..10 {
            lane.lose_life();
        }
        assert_eq!(lane.lives(), 0);
        assert!(!lane.is_enabled());
    }

    #[test]
    fn test_only_head_is_active() {
        let mut lane = lane();
        lane.push_target(Target::melody(64));
        lane.push_target(Target::melody(65));
        assert_eq!(lane.queue_len(), 2);

        let head = lane.pop_head().unwrap();
        assert!(matches!(head, Target::Melody { pitch: 64, .. }));
        assert!(matches!(lane.head(), Some(Target::Melody { pitch: 65, .. })));
    }

    #[test]
    fn test_push_tracks_melody_seed() {
        let mut lane = lane();
        assert_eq!(lane.last_melody_pitch(), None);
        lane.push_target(Target::melody(71));
        assert_eq!(lane.last_melody_pitch(), Some(71));
        lane.push_target(Target::chord([60, 64, 67]));
        assert_eq!(lane.last_melody_pitch(), Some(71));
    }

    #[test]
    fn test_reset_restores_config_lives() {
        let mut lane = lane();
        lane.lose_life();
        lane.push_target(Target::melody(60));
        lane.reset();
        assert_eq!(lane.lives(), 3);
        assert_eq!(lane.queue_len(), 0);
        assert!(lane.window().is_none());
    }
}
