use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_GRID_SIZE: usize = 2;
pub const MAX_GRID_SIZE: usize = 16;
pub const DEFAULT_NOTICE_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScoreRule {
    /// Points added for clicking the target.
    pub hit: i64,
    /// Points removed for clicking anything else.
    pub miss: i64,
}

impl Default for ScoreRule {
    fn default() -> Self {
        Self { hit: 1, miss: 1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GameConfig {
    pub grid_size: usize,
    pub seed: Option<u64>,
    pub scoring: ScoreRule,
    pub notice_ms: u64,
    pub restart_on_game_over: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: DEFAULT_GRID_SIZE,
            seed: None,
            scoring: ScoreRule::default(),
            notice_ms: DEFAULT_NOTICE_MS,
            restart_on_game_over: false,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("grid size {size} outside 1..={max}")]
    GridSize { size: usize, max: usize },
    #[error("scoring value for {0} must not be negative")]
    NegativeScore(&'static str),
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid_size == 0 || self.grid_size > MAX_GRID_SIZE {
            return Err(ConfigError::GridSize {
                size: self.grid_size,
                max: MAX_GRID_SIZE,
            });
        }
        if self.scoring.hit < 0 {
            return Err(ConfigError::NegativeScore("hit"));
        }
        if self.scoring.miss < 0 {
            return Err(ConfigError::NegativeScore("miss"));
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        self.grid_size * self.grid_size
    }

    pub fn notice_timeout(&self) -> Duration {
        Duration::from_millis(self.notice_ms)
    }
}
