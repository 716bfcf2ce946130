use crate::store::{StoreError, write_atomic};
use crate::world::DEFAULT_PIPE_SPEED;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::warn;

pub const MIN_PIPE_SPEED: f64 = 1.0;
pub const MAX_PIPE_SPEED: f64 = 15.0;
pub const PIPE_SPEED_STEP: f64 = 0.5;

/// Player-tunable settings, stored as JSON in the data directory.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pipe_speed: f64,
    /// 0 to 100.
    pub volume: u8,
    /// Fixed simulation seed. Entropy when unset.
    pub seed: Option<u64>,
    /// Account email that owns the high score. The plain score file is used
    /// when unset.
    pub player: Option<String>,
    pub tick_ms: u64,
    pub sprite_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            pipe_speed: DEFAULT_PIPE_SPEED,
            volume: 50,
            seed: None,
            player: None,
            tick_ms: 20,
            sprite_ms: 110,
        }
    }
}

impl Settings {
    /// Reads `path`, falling back to defaults on any problem.
    pub fn load(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str::<Settings>(&text) {
            Ok(settings) => settings.clamped(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "settings file is corrupt, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        let data = serde_json::to_vec_pretty(self).map_err(|source| StoreError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        write_atomic(path, &data)
    }

    pub fn clamped(mut self) -> Self {
        self.pipe_speed = if self.pipe_speed.is_finite() {
            self.pipe_speed.clamp(MIN_PIPE_SPEED, MAX_PIPE_SPEED)
        } else {
            DEFAULT_PIPE_SPEED
        };
        self.volume = self.volume.min(100);
        self.tick_ms = self.tick_ms.clamp(5, 100);
        self.sprite_ms = self.sprite_ms.clamp(20, 1000);
        self.player = self.player.filter(|p| !p.trim().is_empty());
        self
    }

    pub fn volume_gain(&self) -> f32 {
        self.volume as f32 / 100.0
    }

    pub fn nudge_pipe_speed(&mut self, steps: f64) -> f64 {
        self.pipe_speed =
            (self.pipe_speed + steps * PIPE_SPEED_STEP).clamp(MIN_PIPE_SPEED, MAX_PIPE_SPEED);
        self.pipe_speed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_fills_defaults() {
        let s: Settings = serde_json::from_str(r#"{"volume": 80}"#).expect("valid json");
        assert_eq!(s.volume, 80);
        assert_eq!(s.pipe_speed, 5.0);
        assert_eq!(s.tick_ms, 20);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let s = Settings {
            pipe_speed: 99.0,
            volume: 250,
            tick_ms: 0,
            player: Some("  ".into()),
            ..Settings::default()
        }
        .clamped();
        assert_eq!(s.pipe_speed, MAX_PIPE_SPEED);
        assert_eq!(s.volume, 100);
        assert_eq!(s.tick_ms, 5);
        assert_eq!(s.player, None);
    }

    #[test]
    fn speed_nudges_stay_in_range() {
        let mut s = Settings::default();
        assert_eq!(s.nudge_pipe_speed(1.0), 5.5);
        for _ in 0..100 {
            s.nudge_pipe_speed(-1.0);
        }
        assert_eq!(s.pipe_speed, MIN_PIPE_SPEED);
    }
}
