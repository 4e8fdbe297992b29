//! Run-wide game state
//!
//! One instance lives in the top-level `Game`; levels and the scene manager
//! receive it as explicit context.

use serde::{Deserialize, Serialize};

use crate::consts::PLAYER_LIVES;

/// Score, lives and progression for the current run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub score: u64,
    /// Best score this process has seen; survives `reset()`
    pub high_score: u64,
    /// 1-based level number
    pub current_level: u32,
    pub lives: u32,
    /// Outcome of the pending transition (meaningful only while one runs)
    pub won: bool,
    /// Lives granted by `reset()`
    #[serde(default = "default_lives")]
    pub starting_lives: u32,
}

fn default_lives() -> u32 {
    PLAYER_LIVES
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(PLAYER_LIVES)
    }
}

impl GameState {
    pub fn new(starting_lives: u32) -> Self {
        Self {
            score: 0,
            high_score: 0,
            current_level: 1,
            lives: starting_lives,
            won: false,
            starting_lives,
        }
    }

    /// Start a fresh run. `high_score` is kept.
    pub fn reset(&mut self) {
        self.lives = self.starting_lives;
        self.score = 0;
        self.won = false;
        self.current_level = 1;
    }

    /// Add points, raising the high score when beaten
    pub fn add_score(&mut self, points: u64) {
        self.score = self.score.saturating_add(points);
        if self.score > self.high_score {
            self.high_score = self.score;
        }
    }
}
