//! Deferred chord-timeout scheduling
//!
//! Replaces an event loop's one-shot timers with an explicit deadline list
//! pumped by the session clock. Deadlines are never cancelled; a fired
//! deadline is checked against the lane's current window and silently
//! discarded when the (target id, window start) tag no longer matches.

use std::time::Instant;

use super::router::LaneId;
use super::target::TargetId;

/// A scheduled chord-window expiry check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChordDeadline {
    pub lane: LaneId,
    /// Target the window belonged to when the check was scheduled
    pub target_id: TargetId,
    /// Window open time, second half of the staleness guard
    pub window_started: Instant,
    /// When the check fires
    pub due: Instant,
}

/// Pending deadline list, drained by `Session::tick`
#[derive(Debug, Default)]
pub struct TimeoutQueue {
    pending: Vec<ChordDeadline>,
}

impl TimeoutQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, deadline: ChordDeadline) {
        self.pending.push(deadline);
    }

    /// Remove and return every deadline due at or before `now`, in due order
    pub fn drain_due(&mut self, now: Instant) -> Vec<ChordDeadline> {
        let mut due: Vec<ChordDeadline> = Vec::new();
        self.pending.retain(|deadline| {
            if deadline.due <= now {
                due.push(*deadline);
                false
            } else {
                true
            }
        });
        due.sort_by_key(|deadline| deadline.due);
        due
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn deadline(lane: LaneId, base: Instant, due_ms: u64) -> ChordDeadline {
        ChordDeadline {
            lane,
            target_id: TargetId::new(),
            window_started: base,
            due: base + Duration::from_millis(due_ms),
        }
    }

    #[test]
    fn test_drain_due_returns_only_elapsed() {
        let base = Instant::now();
        let mut queue = TimeoutQueue::new();
        queue.schedule(deadline(LaneId::Solo, base, 100));
        queue.schedule(deadline(LaneId::Solo, base, 300));

        let fired = queue.drain_due(base + Duration::from_millis(150));
        assert_eq!(fired.len(), 1);
        assert_eq!(queue.len(), 1);

        let fired = queue.drain_due(base + Duration::from_millis(400));
        assert_eq!(fired.len(), 1);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_drain_due_is_ordered() {
        let base = Instant::now();
        let mut queue = TimeoutQueue::new();
        queue.schedule(deadline(LaneId::Primary, base, 200));
        queue.schedule(deadline(LaneId::Secondary, base, 100));

        let fired = queue.drain_due(base + Duration::from_millis(500));
        assert_eq!(fired[0].lane, LaneId::Secondary);
        assert_eq!(fired[1].lane, LaneId::Primary);
    }
}
