//! Target types: the notes and chords a player must match

use std::collections::BTreeSet;
use std::fmt;

use uuid::Uuid;

/// Opaque identity token for a target.
///
/// Collision-resistant so that a deferred chord-timeout check can confirm it
/// still refers to the target it was scheduled for, even after the lane has
/// resolved and respawned in the meantime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TargetId(Uuid);

impl TargetId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A single target assigned to a lane. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    /// A single note matched strictly by pitch
    Melody { pitch: u8, id: TargetId },
    /// A set of notes that must all arrive within the collection window
    Chord { pitches: BTreeSet<u8>, id: TargetId },
}

impl Target {
    /// Create a melody target with a fresh id
    pub fn melody(pitch: u8) -> Self {
        Self::Melody {
            pitch,
            id: TargetId::new(),
        }
    }

    /// Create a chord target with a fresh id; duplicate pitches collapse
    pub fn chord(pitches: impl IntoIterator<Item = u8>) -> Self {
        Self::Chord {
            pitches: pitches.into_iter().collect(),
            id: TargetId::new(),
        }
    }

    pub fn id(&self) -> TargetId {
        match self {
            Self::Melody { id, .. } | Self::Chord { id, .. } => *id,
        }
    }

    pub fn is_chord(&self) -> bool {
        matches!(self, Self::Chord { .. })
    }

    /// Number of distinct pitches this target requires
    pub fn pitch_count(&self) -> usize {
        match self {
            Self::Melody { .. } => 1,
            Self::Chord { pitches, .. } => pitches.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let a = Target::melody(60);
        let b = Target::melody(60);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_chord_deduplicates() {
        let chord = Target::chord([60, 64, 67, 64, 60]);
        assert_eq!(chord.pitch_count(), 3);
    }
}
