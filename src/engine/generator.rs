//! Target generation: melodic steps and triads inside a lane's pitch range

use std::collections::BTreeSet;

use rand::Rng;

use super::config::PitchRange;
use super::target::Target;

/// Semitone intervals of the two triad qualities targets are drawn from
const MAJOR_TRIAD: [u8; 3] = [0, 4, 7];
const MINOR_TRIAD: [u8; 3] = [0, 3, 7];

/// Next melody target: a small signed step from the previous pitch.
///
/// Steps are biased toward one and two semitones with an occasional three,
/// so consecutive targets read like a phrase rather than a random walk
/// across the whole range. With no previous pitch the seed is uniform in
/// the range. The result is clamped into the range.
pub fn next_melody(rng: &mut impl Rng, range: PitchRange, prev: Option<u8>) -> Target {
    let seed = match prev {
        Some(pitch) => pitch,
        None => rng.gen_range(range.min..=range.max),
    };

    let magnitude: i16 = match rng.gen_range(0..10) {
        0..=3 => 1,
        4..=7 => 2,
        _ => 3,
    };
    let step = if rng.gen_bool(0.5) { magnitude } else { -magnitude };

    let pitch = (seed as i16 + step).clamp(range.min as i16, range.max as i16) as u8;
    Target::melody(pitch)
}

/// Next chord target: a major or minor triad rooted within one octave of
/// the range floor, each tone folded by octaves until it fits the range.
///
/// Tones that cannot be placed even by folding are dropped; a narrow range
/// can therefore yield a degenerate one- or two-tone chord, which still
/// resolves through the chord rule.
pub fn next_chord(rng: &mut impl Rng, range: PitchRange) -> Target {
    let root_span = (range.max - range.min).min(12);
    let root = range.min + rng.gen_range(0..=root_span);

    let intervals = if rng.gen_bool(0.5) {
        MAJOR_TRIAD
    } else {
        MINOR_TRIAD
    };

    let mut pitches = BTreeSet::new();
    for interval in intervals {
        if let Some(pitch) = fold_into_range(root as i16 + interval as i16, range) {
            pitches.insert(pitch);
        } else {
            log::warn!(
                "chord tone {} cannot be placed in range {}..={}, dropped",
                root as i16 + interval as i16,
                range.min,
                range.max
            );
        }
    }

    Target::chord(pitches)
}

/// Transpose a tone by octaves until it lands inside the range, or None if
/// the range is narrower than an octave and never straddles the tone's class
fn fold_into_range(mut tone: i16, range: PitchRange) -> Option<u8> {
    let min = range.min as i16;
    let max = range.max as i16;
    while tone > max {
        tone -= 12;
    }
    while tone < min {
        tone += 12;
    }
    if tone <= max {
        Some(tone as u8)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0x5eed)
    }

    #[test]
    fn test_melody_stays_in_range() {
        let mut rng = rng();
        let range = PitchRange::new(60, 72);
        let mut prev = None;
        for _ in 0..500 {
            let target = next_melody(&mut rng, range, prev);
            let Target::Melody { pitch, .. } = target else {
                panic!("melody generator produced a chord");
            };
            assert!(range.contains(pitch), "pitch {} out of range", pitch);
            prev = Some(pitch);
        }
    }

    #[test]
    fn test_melody_steps_are_small() {
        let mut rng = rng();
        let range = PitchRange::new(40, 90);
        let target = next_melody(&mut rng, range, Some(60));
        let Target::Melody { pitch, .. } = target else {
            panic!("expected melody");
        };
        assert!((pitch as i16 - 60).abs() <= 3);
    }

    #[test]
    fn test_melody_clamps_at_range_edge() {
        let mut rng = rng();
        let range = PitchRange::new(60, 72);
        for _ in 0..100 {
            let target = next_melody(&mut rng, range, Some(60));
            let Target::Melody { pitch, .. } = target else {
                panic!("expected melody");
            };
            assert!(pitch >= 60);
        }
    }

    #[test]
    fn test_chord_tones_fold_into_range() {
        let mut rng = rng();
        let range = PitchRange::new(36, 59);
        for _ in 0..500 {
            let target = next_chord(&mut rng, range);
            let Target::Chord { pitches, .. } = target else {
                panic!("chord generator produced a melody");
            };
            assert!(!pitches.is_empty());
            for &pitch in &pitches {
                assert!(range.contains(pitch), "tone {} out of range", pitch);
            }
        }
    }

    #[test]
    fn test_narrow_range_yields_degenerate_chord() {
        let mut rng = rng();
        // Three semitones: at most the root and one folded tone can fit
        let range = PitchRange::new(60, 62);
        for _ in 0..100 {
            let target = next_chord(&mut rng, range);
            let Target::Chord { pitches, .. } = target else {
                panic!("expected chord");
            };
            assert!(!pitches.is_empty());
            assert!(pitches.len() <= 3);
            for &pitch in &pitches {
                assert!(range.contains(pitch));
            }
        }
    }

    #[test]
    fn test_fold_into_range() {
        let range = PitchRange::new(36, 59);
        assert_eq!(fold_into_range(67, range), Some(55));
        assert_eq!(fold_into_range(24, range), Some(36));
        assert_eq!(fold_into_range(40, range), Some(40));
        // Single-pitch range only admits its own pitch class
        let narrow = PitchRange::new(60, 60);
        assert_eq!(fold_into_range(72, narrow), Some(60));
        assert_eq!(fold_into_range(61, narrow), None);
    }
}
