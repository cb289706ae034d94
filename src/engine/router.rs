//! Note routing: which lane an incoming pitch belongs to

use serde::{Deserialize, Serialize};

/// Highest pitch routed to the bass-like lane in dual-lane mode.
/// One semitone below middle C (60); the boundary is inclusive on the low side.
pub const SPLIT_POINT: u8 = 59;

/// Identity of an evaluation lane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneId {
    /// The single default lane when dual-lane mode is off
    Solo,
    /// Bass-like lane (pitches at or below the split point)
    Primary,
    /// Treble-like lane (pitches above the split point)
    Secondary,
}

impl LaneId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Solo => "solo",
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl std::fmt::Display for LaneId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map an incoming MIDI pitch to a lane. Pure function of its inputs.
pub fn route(pitch: u8, dual_lane: bool) -> LaneId {
    if !dual_lane {
        LaneId::Solo
    } else if pitch <= SPLIT_POINT {
        LaneId::Primary
    } else {
        LaneId::Secondary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_lane_routes_everything_to_solo() {
        for pitch in 0..=127u8 {
            assert_eq!(route(pitch, false), LaneId::Solo);
        }
    }

    #[test]
    fn test_dual_lane_split_boundary() {
        for pitch in 0..=SPLIT_POINT {
            assert_eq!(route(pitch, true), LaneId::Primary, "pitch {}", pitch);
        }
        for pitch in (SPLIT_POINT + 1)..=127 {
            assert_eq!(route(pitch, true), LaneId::Secondary, "pitch {}", pitch);
        }
    }

    #[test]
    fn test_middle_c_is_treble() {
        assert_eq!(route(60, true), LaneId::Secondary);
        assert_eq!(route(59, true), LaneId::Primary);
    }
}
