//! Game tuning and preferences
//!
//! Every gameplay constant lives here with a serde default, so a partial JSON
//! file only needs to name the values it overrides.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Player ship tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    /// Sprite size (pixels)
    pub size: f32,
    /// Horizontal speed (pixels/s)
    pub speed: f32,
    /// Lives at the start of a run
    pub lives: u32,
    /// Cooldown between shots (ms)
    pub fire_delay_ms: f64,
    /// Projectile speed (negative = upward)
    pub projectile_speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            size: PLAYER_SIZE,
            speed: PLAYER_SPEED,
            lives: PLAYER_LIVES,
            fire_delay_ms: PLAYER_FIRE_DELAY_MS,
            projectile_speed: PLAYER_PROJECTILE_SPEED,
        }
    }
}

/// Narrow-phase collision radii
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollisionTuning {
    pub player_radius: f32,
    pub projectile_radius: f32,
    pub enemy_projectile_radius: f32,
}

impl Default for CollisionTuning {
    fn default() -> Self {
        Self {
            player_radius: PLAYER_RADIUS,
            projectile_radius: PROJECTILE_RADIUS,
            enemy_projectile_radius: ENEMY_PROJECTILE_RADIUS,
        }
    }
}

/// Durations of the fire-and-forget visual effects (ms)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FadeTuning {
    pub enemy_fade_ms: f64,
    pub level_fade_ms: f64,
    pub scene_fade_ms: f64,
    pub fade_in_ms: f64,
    pub defeat_check_delay_ms: f64,
}

impl Default for FadeTuning {
    fn default() -> Self {
        Self {
            enemy_fade_ms: ENEMY_FADE_MS,
            level_fade_ms: LEVEL_FADE_MS,
            scene_fade_ms: SCENE_FADE_MS,
            fade_in_ms: FADE_IN_MS,
            defeat_check_delay_ms: DEFEAT_CHECK_DELAY_MS,
        }
    }
}

/// Complete game configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Playfield width (pixels)
    pub width: f32,
    /// Playfield height (pixels)
    pub height: f32,
    /// Run seed for reproducibility
    pub seed: u64,

    pub player: PlayerTuning,
    pub collision: CollisionTuning,
    pub fades: FadeTuning,

    // === Explosions ===
    pub explosion_small: f32,
    pub explosion_big: f32,

    // === Background ===
    /// Pixels per frame
    pub scroll_speed: f32,
    pub background_tile_height: f32,

    // === Formations ===
    /// Edge margin for groups that don't set one
    pub formation_padding: f32,

    // === Scoring ===
    pub score_standard: u64,
    pub score_boss: u64,

    /// Level started by the menu
    pub first_level: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: GAME_WIDTH,
            height: GAME_HEIGHT,
            seed: 0x5EED,

            player: PlayerTuning::default(),
            collision: CollisionTuning::default(),
            fades: FadeTuning::default(),

            explosion_small: EXPLOSION_SMALL,
            explosion_big: EXPLOSION_BIG,

            scroll_speed: SCROLL_SPEED,
            background_tile_height: BACKGROUND_TILE_HEIGHT,

            formation_padding: FORMATION_PADDING,

            score_standard: SCORE_STANDARD,
            score_boss: SCORE_BOSS,

            first_level: "level1".to_string(),
        }
    }
}

impl GameConfig {
    /// Parse a (possibly partial) JSON config
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Config with a specific run seed
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Load config from a JSON file, falling back to defaults
    pub fn load(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    config
                }
                Err(err) => {
                    log::warn!("Invalid config {}: {err}; using defaults", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                log::info!("No config at {} ({err}); using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = GameConfig::from_json(r#"{ "width": 1024, "player": { "lives": 5 } }"#)
            .expect("valid config");
        assert_eq!(config.width, 1024.0);
        assert_eq!(config.player.lives, 5);
        assert_eq!(config.player.fire_delay_ms, PLAYER_FIRE_DELAY_MS);
        assert_eq!(config.height, GAME_HEIGHT);
    }

    #[test]
    fn test_roundtrip_json() {
        let config = GameConfig::with_seed(42);
        let json = config.to_json().expect("serializable");
        let back = GameConfig::from_json(&json).expect("parseable");
        assert_eq!(back.seed, 42);
        assert_eq!(back.first_level, "level1");
    }

    #[test]
    fn test_missing_file_falls_back() {
        let config = GameConfig::load(Path::new("/definitely/not/here.json"));
        assert_eq!(config.width, GAME_WIDTH);
    }
}
