//! Note event queue between the MIDI callback thread and the trainer loop
//!
//! Lock-free ring buffer under the hood. The producer side sits behind a
//! Mutex for multi-producer access (device callback, tests); the consumer
//! side uses try_lock so the trainer loop never blocks on a push in flight.

use parking_lot::Mutex;
use ringbuf::{traits::*, HeapRb};

/// A key event the trainer cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    /// Key pressed
    NoteOn { pitch: u8, velocity: u8 },
    /// Key released; the evaluator ignores these but the queue carries them
    /// so a future sustain-aware mode has them available
    NoteOff { pitch: u8 },
}

/// Parse a raw MIDI message into a note event, if it is one.
///
/// Note-on with velocity 0 is folded into note-off, as most keyboards emit
/// running-status releases that way. Everything else (CC, pitch bend,
/// aftertouch) is ignored here.
pub fn parse_message(message: &[u8]) -> Option<NoteEvent> {
    if message.len() < 3 {
        return None;
    }
    let status = message[0] & 0xF0;
    let pitch = message[1] & 0x7F;
    let velocity = message[2] & 0x7F;
    match status {
        0x80 => Some(NoteEvent::NoteOff { pitch }),
        0x90 if velocity == 0 => Some(NoteEvent::NoteOff { pitch }),
        0x90 => Some(NoteEvent::NoteOn { pitch, velocity }),
        _ => None,
    }
}

/// Thread-safe note event queue
pub struct NoteQueue {
    producer: Mutex<ringbuf::HeapProd<NoteEvent>>,
    consumer: Mutex<ringbuf::HeapCons<NoteEvent>>,
    capacity: usize,
}

impl NoteQueue {
    pub fn new(capacity: usize) -> Self {
        let rb = HeapRb::new(capacity);
        let (producer, consumer) = rb.split();
        Self {
            producer: Mutex::new(producer),
            consumer: Mutex::new(consumer),
            capacity,
        }
    }

    /// Push an event from the device callback. Returns false when the queue
    /// is full or briefly contended; dropping beats blocking the callback.
    pub fn push(&self, event: NoteEvent) -> bool {
        if let Some(mut producer) = self.producer.try_lock() {
            if producer.try_push(event).is_ok() {
                return true;
            }
            log::debug!(
                "note queue full (capacity: {}), event dropped",
                self.capacity
            );
        }
        false
    }

    /// Drain pending events into a pre-allocated buffer from the trainer
    /// loop. Never blocks; a contended lock just defers to the next tick.
    pub fn drain_into(&self, buffer: &mut Vec<NoteEvent>) -> usize {
        buffer.clear();
        if let Some(mut consumer) = self.consumer.try_lock() {
            while let Some(event) = consumer.try_pop() {
                buffer.push(event);
            }
        }
        buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumer
            .try_lock()
            .map(|consumer| consumer.is_empty())
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_queue_push_and_drain() {
        let queue = NoteQueue::new(16);
        assert!(queue.push(NoteEvent::NoteOn { pitch: 60, velocity: 100 }));
        assert!(queue.push(NoteEvent::NoteOff { pitch: 60 }));

        let mut buffer = Vec::with_capacity(16);
        assert_eq!(queue.drain_into(&mut buffer), 2);
        assert_eq!(buffer[0], NoteEvent::NoteOn { pitch: 60, velocity: 100 });
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_overflow_drops() {
        let queue = NoteQueue::new(2);
        assert!(queue.push(NoteEvent::NoteOff { pitch: 1 }));
        assert!(queue.push(NoteEvent::NoteOff { pitch: 2 }));
        assert!(!queue.push(NoteEvent::NoteOff { pitch: 3 }));
    }

    #[test]
    fn test_parse_note_on() {
        assert_eq!(
            parse_message(&[0x90, 60, 100]),
            Some(NoteEvent::NoteOn { pitch: 60, velocity: 100 })
        );
        // Channel nibble is irrelevant
        assert_eq!(
            parse_message(&[0x93, 60, 100]),
            Some(NoteEvent::NoteOn { pitch: 60, velocity: 100 })
        );
    }

    #[test]
    fn test_parse_zero_velocity_is_note_off() {
        assert_eq!(
            parse_message(&[0x90, 60, 0]),
            Some(NoteEvent::NoteOff { pitch: 60 })
        );
        assert_eq!(
            parse_message(&[0x80, 60, 64]),
            Some(NoteEvent::NoteOff { pitch: 60 })
        );
    }

    #[test]
    fn test_parse_ignores_non_note_messages() {
        assert_eq!(parse_message(&[0xB0, 123, 0]), None);
        assert_eq!(parse_message(&[0xE0, 0, 64]), None);
        assert_eq!(parse_message(&[0x90, 60]), None);
        assert_eq!(parse_message(&[]), None);
    }
}
