//! Session configuration
//!
//! Everything a game session needs at start: dual-lane mode, per-lane lives,
//! mode and spawn policy, cadence curve, and movement speed. Serializable so
//! the front end can persist and reload a setup as JSON.

use serde::{Deserialize, Serialize};

use super::router::LaneId;

/// Inclusive pitch range a lane draws its targets from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchRange {
    pub min: u8,
    pub max: u8,
}

impl PitchRange {
    pub fn new(min: u8, max: u8) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, pitch: u8) -> bool {
        pitch >= self.min && pitch <= self.max
    }

    /// Width in semitones, inclusive of both ends
    pub fn span(&self) -> u8 {
        self.max - self.min + 1
    }
}

/// What kind of targets a lane produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LaneMode {
    Melody,
    Chord,
}

/// How a lane introduces new targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpawnPolicy {
    /// Cadence timer appends targets on a fixed schedule, independent of
    /// whether the previous target resolved
    Queued,
    /// A single target at a time, replaced the instant the lane empties
    OnResolve,
}

/// Spawn cadence curve: base interval shrinking with level down to a floor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CadenceConfig {
    /// Interval between melody spawns at level 0, in milliseconds
    pub base_ms: u64,
    /// How much the interval shrinks per level
    pub per_level_ms: u64,
    /// Minimum interval the curve bottoms out at
    pub floor_ms: u64,
}

impl CadenceConfig {
    /// Melody spawn interval for a level
    pub fn melody_ms(&self, level: u32) -> u64 {
        let shrink = self.per_level_ms.saturating_mul(level as u64);
        self.base_ms.saturating_sub(shrink).max(self.floor_ms)
    }

    /// Chord spawn interval: melody cadence scaled by 1.25
    pub fn chord_ms(&self, level: u32) -> u64 {
        self.melody_ms(level) * 5 / 4
    }
}

impl Default for CadenceConfig {
    fn default() -> Self {
        Self {
            base_ms: 4000,
            per_level_ms: 300,
            floor_ms: 1200,
        }
    }
}

/// Per-lane setup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LaneConfig {
    pub lives: u32,
    pub mode: LaneMode,
    pub policy: SpawnPolicy,
    pub range: PitchRange,
}

impl LaneConfig {
    /// Bass-clef default: two octaves below middle C, melody targets
    pub fn bass() -> Self {
        Self {
            lives: 3,
            mode: LaneMode::Melody,
            policy: SpawnPolicy::Queued,
            range: PitchRange::new(36, 59),
        }
    }

    /// Treble-clef default: middle C and up, melody targets
    pub fn treble() -> Self {
        Self {
            lives: 3,
            mode: LaneMode::Melody,
            policy: SpawnPolicy::Queued,
            range: PitchRange::new(60, 84),
        }
    }
}

/// Full session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Dual-lane ("piano") mode: split input across bass and treble lanes
    pub dual_lane: bool,
    /// Difficulty level; affects spawn cadence only, never movement speed
    pub level: u32,
    /// Visual movement speed, carried for the renderer. The engine never
    /// reads it; level and target kind must not influence it.
    pub movement_speed: f32,
    pub cadence: CadenceConfig,
    /// Lane used when dual-lane mode is off
    pub solo: LaneConfig,
    /// Bass-like lane in dual-lane mode
    pub primary: LaneConfig,
    /// Treble-like lane in dual-lane mode
    pub secondary: LaneConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            dual_lane: false,
            level: 0,
            movement_speed: 60.0,
            cadence: CadenceConfig::default(),
            solo: LaneConfig::treble(),
            primary: LaneConfig::bass(),
            secondary: LaneConfig::treble(),
        }
    }
}

impl SessionConfig {
    /// The lane configs active under this configuration, with their ids
    pub fn active_lanes(&self) -> Vec<(LaneId, LaneConfig)> {
        if self.dual_lane {
            vec![
                (LaneId::Primary, self.primary),
                (LaneId::Secondary, self.secondary),
            ]
        } else {
            vec![(LaneId::Solo, self.solo)]
        }
    }

    /// Check the configuration is playable
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (id, lane) in self.active_lanes() {
            if lane.lives == 0 {
                return Err(ConfigError::ZeroLives(id));
            }
            if lane.range.min > lane.range.max {
                return Err(ConfigError::InvalidRange {
                    lane: id,
                    min: lane.range.min,
                    max: lane.range.max,
                });
            }
        }
        if self.cadence.floor_ms == 0 || self.cadence.base_ms == 0 {
            return Err(ConfigError::ZeroCadence);
        }
        Ok(())
    }
}

/// Rejected session configuration. The only error type in the engine;
/// gameplay outcomes are notifications, never errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    ZeroLives(LaneId),
    InvalidRange { lane: LaneId, min: u8, max: u8 },
    ZeroCadence,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroLives(lane) => {
                write!(f, "lane '{}' configured with zero starting lives", lane)
            }
            Self::InvalidRange { lane, min, max } => {
                write!(f, "lane '{}' has inverted pitch range {}..={}", lane, min, max)
            }
            Self::ZeroCadence => write!(f, "spawn cadence must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_cadence_shrinks_to_floor() {
        let cadence = CadenceConfig {
            base_ms: 4000,
            per_level_ms: 300,
            floor_ms: 1200,
        };
        assert_eq!(cadence.melody_ms(0), 4000);
        assert_eq!(cadence.melody_ms(5), 2500);
        // Level 20 would go negative; floor holds
        assert_eq!(cadence.melody_ms(20), 1200);
    }

    #[test]
    fn test_chord_cadence_is_a_quarter_longer() {
        let cadence = CadenceConfig::default();
        assert_eq!(cadence.chord_ms(0), cadence.melody_ms(0) * 5 / 4);
    }

    #[test]
    fn test_zero_lives_rejected() {
        let mut config = SessionConfig::default();
        config.solo.lives = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroLives(LaneId::Solo)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let mut config = SessionConfig {
            dual_lane: true,
            ..SessionConfig::default()
        };
        config.primary.range = PitchRange::new(60, 36);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRange { lane: LaneId::Primary, .. })
        ));
    }

    #[test]
    fn test_config_json_round_trip() {
        let config = SessionConfig {
            dual_lane: true,
            level: 3,
            ..SessionConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: SessionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_active_lanes_follow_mode() {
        let solo = SessionConfig::default();
        assert_eq!(solo.active_lanes().len(), 1);
        let dual = SessionConfig {
            dual_lane: true,
            ..SessionConfig::default()
        };
        let ids: Vec<LaneId> = dual.active_lanes().iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![LaneId::Primary, LaneId::Secondary]);
    }
}
