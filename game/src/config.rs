use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

pub const DEFAULT_BLOCK_COUNT: usize = 5;
pub const DEFAULT_BASE_SPEED: f64 = 1.5;
pub const DEFAULT_SPEED_PER_LEVEL: f64 = 0.2;
pub const DEFAULT_DISPLAY_DEBOUNCE: Duration = Duration::from_secs(1);
pub const HIGHSCORE_KEY: &str = "highscore";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub block_count: usize,
    /// Blocks per second at level 0.
    pub base_speed: f64,
    pub speed_per_level: f64,
    /// Quiet period before the displayed score catches up with the real one.
    #[serde(with = "crate::serde_secs")]
    pub display_debounce: Duration,
    pub highscore_key: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            block_count: DEFAULT_BLOCK_COUNT,
            base_speed: DEFAULT_BASE_SPEED,
            speed_per_level: DEFAULT_SPEED_PER_LEVEL,
            display_debounce: DEFAULT_DISPLAY_DEBOUNCE,
            highscore_key: HIGHSCORE_KEY.to_string(),
        }
    }
}

impl GameConfig {
    pub fn with_block_count(mut self, block_count: usize) -> Self {
        self.block_count = block_count;
        self
    }

    pub fn speed_for_level(&self, level: u32) -> f64 {
        self.base_speed + f64::from(level) * self.speed_per_level
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        // Target reroll takes `(draw + 1) % block_count`, which needs a second block.
        if self.block_count < 2 {
            return Err(ConfigError::TooFewBlocks(self.block_count));
        }
        if !self.base_speed.is_finite() || self.base_speed <= 0.0 {
            return Err(ConfigError::InvalidSpeed(self.base_speed));
        }
        // Speed must stay positive at every level.
        if !self.speed_per_level.is_finite() || self.speed_per_level < 0.0 {
            return Err(ConfigError::InvalidSpeedStep(self.speed_per_level));
        }
        Ok(())
    }

    pub fn validated(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }

    pub fn load_json_file(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: GameConfig =
            serde_json::from_slice(&bytes).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validated()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_grows_with_level() {
        let config = GameConfig::default();
        assert!((config.speed_for_level(0) - 1.5).abs() < 1e-9);
        assert!((config.speed_for_level(1) - 1.7).abs() < 1e-9);
        assert!((config.speed_for_level(10) - 3.5).abs() < 1e-9);
    }

    #[test]
    fn single_block_is_rejected() {
        let err = GameConfig::default().with_block_count(1).validate().unwrap_err();
        assert!(matches!(err, ConfigError::TooFewBlocks(1)));
        assert!(GameConfig::default().with_block_count(2).validate().is_ok());
    }

    #[test]
    fn non_positive_speed_is_rejected() {
        let config = GameConfig {
            base_speed: 0.0,
            ..GameConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSpeed(_))));
    }

    #[test]
    fn negative_or_non_finite_speed_step_is_rejected() {
        for step in [-2.0, -0.001, f64::NAN, f64::INFINITY] {
            let config = GameConfig {
                speed_per_level: step,
                ..GameConfig::default()
            };
            assert!(
                matches!(config.validate(), Err(ConfigError::InvalidSpeedStep(_))),
                "step {step} should be rejected"
            );
        }
        let flat = GameConfig {
            speed_per_level: 0.0,
            ..GameConfig::default()
        };
        assert!(flat.validate().is_ok());
    }

    #[test]
    fn serde_defaults_fill_missing_fields() {
        let parsed: GameConfig = serde_json::from_str(r#"{"block_count":7,"display_debounce":0.5}"#)
            .expect("config JSON should parse");
        assert_eq!(parsed.block_count, 7);
        assert_eq!(parsed.display_debounce, Duration::from_millis(500));
        assert_eq!(parsed.highscore_key, HIGHSCORE_KEY);
        assert!((parsed.base_speed - DEFAULT_BASE_SPEED).abs() < 1e-9);
    }

    #[test]
    fn negative_debounce_fails_to_parse() {
        let parsed = serde_json::from_str::<GameConfig>(r#"{"display_debounce":-1.0}"#);
        assert!(parsed.is_err());
    }
}
