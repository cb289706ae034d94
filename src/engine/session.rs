//! The evaluation session: routing, strict matching, chord windows,
//! life bookkeeping, and spawn scheduling
//!
//! Single-threaded and non-blocking. `note_on` and `tick` each run to
//! completion; both take the current instant explicitly so the host's loop
//! (or a test) owns the clock. Chord-window expiries are never cancelled;
//! they fire through `tick` and self-invalidate via the target-id and
//! window-start guard.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::config::{ConfigError, LaneMode, SessionConfig, SpawnPolicy};
use super::events::{EventSink, FailReason};
use super::generator;
use super::lane::Lane;
use super::router::{self, LaneId};
use super::target::{Target, TargetId};
use super::timer::{ChordDeadline, TimeoutQueue};

/// Chord collection window length: all remaining tones must arrive within
/// this long after the first correct tone.
pub const WINDOW_MS: u64 = 100;

/// Extra delay before the expiry check fires, absorbing tick jitter so a
/// press landing right at the window edge is not failed early. The
/// staleness guard, not this slack, carries correctness.
pub const TIMEOUT_SLACK_MS: u64 = 5;

/// Reason string reported when the last enabled lane goes dark
const GAME_OVER_ALL_LANES: &str = "all-lanes-disabled";

/// What a routed note-on should do to its lane, decided before any mutation
enum Outcome {
    Ignore,
    Success,
    Fail(FailReason),
    ChordTone { target_id: TargetId, needed: usize },
}

/// One game session: owns the lanes, the pending timeout list, and the RNG.
/// Rebuilt on restart or mode toggle.
pub struct Session<S: EventSink> {
    config: SessionConfig,
    lanes: Vec<Lane>,
    timeouts: TimeoutQueue,
    rng: StdRng,
    sink: S,
    game_over: bool,
}

impl<S: EventSink> Session<S> {
    /// Create a session with an entropy-seeded RNG, starting its clock now
    pub fn new(config: SessionConfig, sink: S) -> Result<Self, ConfigError> {
        Self::with_rng(config, sink, StdRng::from_entropy(), Instant::now())
    }

    /// Create a session with full control over RNG and start instant
    pub fn with_rng(
        config: SessionConfig,
        sink: S,
        rng: StdRng,
        now: Instant,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let lanes = config
            .active_lanes()
            .into_iter()
            .map(|(id, lane_config)| Lane::new(id, lane_config))
            .collect();
        let mut session = Self {
            config,
            lanes,
            timeouts: TimeoutQueue::new(),
            rng,
            sink,
            game_over: false,
        };
        session.arm_lanes(now);
        log::info!(
            "session started: {} lane(s), level {}",
            session.lanes.len(),
            session.config.level
        );
        Ok(session)
    }

    /// Sole evaluation entry point. A note for a disabled lane, or a lane
    /// with no active target, is a silent no-op.
    pub fn note_on(&mut self, pitch: u8, velocity: u8, now: Instant) {
        if velocity == 0 {
            // Running-status note-off; nothing to evaluate
            log::trace!("note-on pitch {} with zero velocity ignored", pitch);
            return;
        }

        let lane_id = router::route(pitch, self.config.dual_lane);
        let Some(idx) = self.lane_index(lane_id) else {
            return;
        };

        let outcome = {
            let lane = &self.lanes[idx];
            if !lane.is_enabled() {
                log::trace!("note {} for disabled lane {} ignored", pitch, lane_id);
                Outcome::Ignore
            } else {
                match lane.head() {
                    None => {
                        log::trace!("note {} for empty lane {} ignored", pitch, lane_id);
                        Outcome::Ignore
                    }
                    Some(Target::Melody { pitch: expected, .. }) => {
                        if pitch == *expected {
                            Outcome::Success
                        } else {
                            Outcome::Fail(FailReason::MelodyWrongNote)
                        }
                    }
                    Some(Target::Chord { pitches, id }) => {
                        if pitches.contains(&pitch) {
                            Outcome::ChordTone {
                                target_id: *id,
                                needed: pitches.len(),
                            }
                        } else {
                            // Covers the degenerate empty set too: it never
                            // matches, so it can never succeed
                            Outcome::Fail(FailReason::ChordStray)
                        }
                    }
                }
            }
        };

        match outcome {
            Outcome::Ignore => {}
            Outcome::Success => self.resolve_success(idx),
            Outcome::Fail(reason) => self.resolve_fail(idx, reason),
            Outcome::ChordTone { target_id, needed } => {
                self.collect_chord_tone(idx, pitch, target_id, needed, now)
            }
        }
    }

    /// Clock pump: fires due cadence spawns, then due chord-window expiries.
    /// Synchronous input always wins a tie: a note evaluated before `tick`
    /// at the same instant sees its window still open.
    pub fn tick(&mut self, now: Instant) {
        for idx in 0..self.lanes.len() {
            self.run_cadence(idx, now);
        }
        for deadline in self.timeouts.drain_due(now) {
            self.fire_deadline(deadline);
        }
    }

    /// Rebuild every lane from config: fresh lives, fresh queues, re-armed
    /// spawn deadlines. Pending timeouts are discarded wholesale.
    pub fn reset(&mut self, now: Instant) {
        log::info!("session reset");
        for lane in &mut self.lanes {
            lane.reset();
        }
        self.timeouts.clear();
        self.game_over = false;
        self.arm_lanes(now);
    }

    /// Replace a lane's queue with a scripted practice sequence
    pub fn load_drill(&mut self, lane_id: LaneId, targets: impl IntoIterator<Item = Target>) {
        if let Some(idx) = self.lane_index(lane_id) {
            self.lanes[idx].load_drill(targets);
        }
    }

    /// Change difficulty; affects future spawn cadence only, never movement
    pub fn set_level(&mut self, level: u32) {
        self.config.level = level;
    }

    pub fn lane(&self, lane_id: LaneId) -> Option<&Lane> {
        self.lanes.iter().find(|lane| lane.id() == lane_id)
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn lane_index(&self, lane_id: LaneId) -> Option<usize> {
        self.lanes.iter().position(|lane| lane.id() == lane_id)
    }

    /// Give every lane its first target or spawn deadline
    fn arm_lanes(&mut self, now: Instant) {
        for idx in 0..self.lanes.len() {
            match self.lanes[idx].policy() {
                SpawnPolicy::OnResolve => self.spawn_one(idx),
                SpawnPolicy::Queued => {
                    let cadence = self.cadence_for(self.lanes[idx].mode());
                    self.lanes[idx].set_next_spawn_due(Some(now + cadence));
                }
            }
        }
    }

    fn cadence_for(&self, mode: LaneMode) -> Duration {
        let ms = match mode {
            LaneMode::Melody => self.config.cadence.melody_ms(self.config.level),
            LaneMode::Chord => self.config.cadence.chord_ms(self.config.level),
        };
        Duration::from_millis(ms)
    }

    /// Generate and append the lane's next target
    fn spawn_one(&mut self, idx: usize) {
        let lane = &mut self.lanes[idx];
        let target = match lane.mode() {
            LaneMode::Melody => {
                generator::next_melody(&mut self.rng, lane.range(), lane.last_melody_pitch())
            }
            LaneMode::Chord => generator::next_chord(&mut self.rng, lane.range()),
        };
        log::debug!("lane {} spawns {:?}", lane.id(), target);
        lane.push_target(target);
    }

    /// Queued policy: append targets for every cadence deadline now passed
    fn run_cadence(&mut self, idx: usize, now: Instant) {
        if self.lanes[idx].policy() != SpawnPolicy::Queued || !self.lanes[idx].is_enabled() {
            return;
        }
        while let Some(due) = self.lanes[idx].next_spawn_due() {
            if due > now {
                break;
            }
            self.spawn_one(idx);
            let cadence = self.cadence_for(self.lanes[idx].mode());
            self.lanes[idx].set_next_spawn_due(Some(due + cadence));
        }
    }

    fn collect_chord_tone(
        &mut self,
        idx: usize,
        pitch: u8,
        target_id: TargetId,
        needed: usize,
        now: Instant,
    ) {
        let lane_id = self.lanes[idx].id();
        let mut completed = false;
        {
            let lane = &mut self.lanes[idx];
            let window_is_current =
                matches!(lane.window(), Some(window) if window.target_id == target_id);
            if !window_is_current {
                // First correct tone for this target (any leftover window
                // belongs to an earlier one): open fresh and schedule the
                // expiry check
                lane.open_window(target_id, now);
                self.timeouts.schedule(ChordDeadline {
                    lane: lane_id,
                    target_id,
                    window_started: now,
                    due: now + Duration::from_millis(WINDOW_MS + TIMEOUT_SLACK_MS),
                });
                log::debug!("lane {} chord window opened for {}", lane_id, target_id);
            }
            if let Some(window) = lane.window_mut() {
                // Duplicate presses of a collected tone are a no-op
                window.collected.insert(pitch);
                completed = window.collected.len() >= needed;
            }
        }
        if completed {
            self.resolve_success(idx);
        }
    }

    fn resolve_success(&mut self, idx: usize) {
        let lane = &mut self.lanes[idx];
        let lane_id = lane.id();
        let Some(target) = lane.pop_head() else {
            return;
        };
        lane.clear_window();
        log::debug!("lane {} success on {}", lane_id, target.id());
        self.sink.on_success(lane_id, &target);
        self.respawn_if_on_resolve(idx);
    }

    fn resolve_fail(&mut self, idx: usize, reason: FailReason) {
        let (lane_id, lives, target) = {
            let lane = &mut self.lanes[idx];
            let lane_id = lane.id();
            // Lives drop before the head is dequeued, so notifications see
            // the post-decrement count alongside the resolved target
            let lives = lane.lose_life();
            let Some(target) = lane.pop_head() else {
                return;
            };
            lane.clear_window();
            (lane_id, lives, target)
        };
        log::debug!("lane {} fail ({}) on {}", lane_id, reason, target.id());
        self.sink.on_fail(lane_id, &target, reason);
        self.sink.on_lives_changed(lane_id, lives);
        if lives == 0 {
            log::info!("lane {} disabled", lane_id);
            self.sink.on_lane_disabled(lane_id);
            if !self.game_over && self.lanes.iter().all(|lane| !lane.is_enabled()) {
                self.game_over = true;
                log::info!("game over: {}", GAME_OVER_ALL_LANES);
                self.sink.on_game_over(GAME_OVER_ALL_LANES);
            }
        } else {
            self.respawn_if_on_resolve(idx);
        }
    }

    fn respawn_if_on_resolve(&mut self, idx: usize) {
        if self.lanes[idx].policy() == SpawnPolicy::OnResolve
            && self.lanes[idx].is_enabled()
            && self.lanes[idx].queue_len() == 0
        {
            self.spawn_one(idx);
        }
    }

    /// Deferred expiry check. Acts only when both the head target id and
    /// the window start still match what the deadline was tagged with;
    /// anything else means the target already resolved or was replaced.
    fn fire_deadline(&mut self, deadline: ChordDeadline) {
        let Some(idx) = self.lane_index(deadline.lane) else {
            return;
        };
        let live = {
            let lane = &self.lanes[idx];
            lane.is_enabled()
                && matches!(lane.head(), Some(target) if target.id() == deadline.target_id)
                && matches!(
                    lane.window(),
                    Some(window) if window.target_id == deadline.target_id
                        && window.started == deadline.window_started
                )
        };
        if live {
            // Window still open at expiry means the set was never completed
            log::debug!(
                "lane {} chord window for {} expired",
                deadline.lane,
                deadline.target_id
            );
            self.resolve_fail(idx, FailReason::ChordTimeout);
        } else {
            log::trace!(
                "stale chord timeout for {} on lane {} ignored",
                deadline.target_id,
                deadline.lane
            );
        }
    }
}
