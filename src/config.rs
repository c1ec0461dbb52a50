//! Gameplay tuning and frontend pacing.
//!
//! Defaults reproduce the arcade feel of level 1. A JSON file can override
//! any subset of the fields; the rest keep their defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Inclusive millisecond range a timer is re-rolled from.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimerRange {
    pub min: f64,
    pub max: f64,
}

impl TimerRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Tank speed in pixels per millisecond.
    pub tank_speed: f64,
    /// Bullet speed in pixels per millisecond.
    pub bullet_speed: f64,
    /// Upper bound on the elapsed time fed into a single tick.
    pub max_frame_ms: f64,
    /// Enemy population cap.
    pub max_enemies: usize,
    pub enemy_spawn_interval_ms: f64,
    pub enemy_move_timer_ms: TimerRange,
    pub enemy_shoot_timer_ms: TimerRange,
    /// Chance an enemy picks a new heading when its move timer runs out.
    pub enemy_turn_chance: f64,

    // Frontend
    /// Target frame duration of the render loop (≈30 FPS).
    pub frame_ms: u64,
    /// Frames a key stays held after its last press/repeat event.
    pub hold_window_frames: u64,
    /// Hold window for Fire. Must outlast the OS auto-repeat delay or a
    /// held Fire re-triggers on its first repeat.
    pub fire_hold_window_frames: u64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tank_speed: 0.15,
            bullet_speed: 0.4,
            max_frame_ms: 50.0,
            max_enemies: 4,
            enemy_spawn_interval_ms: 3000.0,
            enemy_move_timer_ms: TimerRange::new(1000.0, 3000.0),
            enemy_shoot_timer_ms: TimerRange::new(2000.0, 5000.0),
            enemy_turn_chance: 0.2,
            frame_ms: 33,
            hold_window_frames: 4,
            fire_hold_window_frames: 20,
        }
    }
}

impl GameConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("tank_speed", self.tank_speed),
            ("bullet_speed", self.bullet_speed),
            ("max_frame_ms", self.max_frame_ms),
            ("enemy_spawn_interval_ms", self.enemy_spawn_interval_ms),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }

        for (name, range) in [
            ("enemy_move_timer_ms", self.enemy_move_timer_ms),
            ("enemy_shoot_timer_ms", self.enemy_shoot_timer_ms),
        ] {
            if !(range.min.is_finite() && range.max.is_finite())
                || range.min <= 0.0
                || range.min > range.max
            {
                return Err(ConfigError::Invalid(format!(
                    "{name} must satisfy 0 < min <= max, got {}..{}",
                    range.min, range.max
                )));
            }
        }

        if !(0.0..=1.0).contains(&self.enemy_turn_chance) {
            return Err(ConfigError::Invalid(format!(
                "enemy_turn_chance must be within 0..=1, got {}",
                self.enemy_turn_chance
            )));
        }

        if self.frame_ms == 0 {
            return Err(ConfigError::Invalid("frame_ms must be non-zero".into()));
        }

        if self.fire_hold_window_frames < self.hold_window_frames {
            return Err(ConfigError::Invalid(format!(
                "fire_hold_window_frames must be at least hold_window_frames, got {} < {}",
                self.fire_hold_window_frames, self.hold_window_frames
            )));
        }

        Ok(())
    }
}
