//! Star Raid - runtime logic for a 2D arcade shoot-em-up
//!
//! Core modules:
//! - `sim`: Simulation (weapons, actors, formations, collisions, level flow)
//! - `levels`: Declarative level catalog and formula evaluation
//! - `config`: Data-driven game tuning
//! - `highscores`: In-memory leaderboard

pub mod config;
pub mod error;
pub mod highscores;
pub mod levels;
pub mod sim;

pub use config::GameConfig;
pub use error::{FormulaError, LevelError};
pub use highscores::HighScores;
pub use levels::{LevelCatalog, LevelConfig};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default playfield dimensions
    pub const GAME_WIDTH: f32 = 800.0;
    pub const GAME_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_SIZE: f32 = 64.0;
    pub const PLAYER_SPEED: f32 = 160.0;
    pub const PLAYER_LIVES: u32 = 3;
    pub const PLAYER_FIRE_DELAY_MS: f64 = 200.0;
    /// Negative = upward
    pub const PLAYER_PROJECTILE_SPEED: f32 = -400.0;

    /// Collision radii
    pub const PLAYER_RADIUS: f32 = 32.0;
    pub const PROJECTILE_RADIUS: f32 = 10.0;
    pub const ENEMY_PROJECTILE_RADIUS: f32 = 5.0;

    /// Hitbox radius as a fraction of an enemy's display size
    pub const BOSS_HITBOX_RATIO: f32 = 0.8;
    pub const STANDARD_HITBOX_RATIO: f32 = 0.6;

    /// Explosion sprite sizes
    pub const EXPLOSION_SMALL: f32 = 64.0;
    pub const EXPLOSION_BIG: f32 = 192.0;

    /// Fade durations (ms)
    pub const ENEMY_FADE_MS: f64 = 250.0;
    pub const LEVEL_FADE_MS: f64 = 500.0;
    pub const SCENE_FADE_MS: f64 = 1000.0;
    pub const FADE_IN_MS: f64 = 500.0;

    /// Delay before re-checking "all enemies defeated" (ms)
    pub const DEFEAT_CHECK_DELAY_MS: f64 = 100.0;

    /// Enemy defaults
    pub const ENEMY_SIZE: f32 = 48.0;
    pub const ENEMY_MIN_FIRE_DELAY_MS: f64 = 2000.0;
    pub const ENEMY_MAX_FIRE_DELAY_MS: f64 = 4000.0;
    pub const ENEMY_PROJECTILE_SPEED: f32 = 300.0;

    /// Formation edge margin when a group config omits it
    pub const FORMATION_PADDING: f32 = 50.0;

    /// Background scroll (pixels per frame) and tile height
    pub const SCROLL_SPEED: f32 = 1.0;
    pub const BACKGROUND_TILE_HEIGHT: f32 = 512.0;

    /// Points per kill
    pub const SCORE_STANDARD: u64 = 10;
    pub const SCORE_BOSS: u64 = 100;
}

/// Angular and lateral offsets for each shot of a symmetric fan.
///
/// Shot `i` of `count` is offset by `(i - center)` steps, where the center is
/// `(count - 1) / 2` for odd counts and `count / 2 - 0.5` for even counts.
pub fn fan_offsets(count: u32, shot_angle: f32, shot_x_offset: f32) -> Vec<(f32, f32)> {
    let center = if count % 2 == 1 {
        (count as f32 - 1.0) / 2.0
    } else {
        count as f32 / 2.0 - 0.5
    };
    (0..count)
        .map(|i| {
            let step = i as f32 - center;
            (step * shot_angle, step * shot_x_offset)
        })
        .collect()
}

/// Screen-space velocity for a shot fired at `angle_deg` off the vertical
#[inline]
pub fn shot_velocity(speed: f32, angle_deg: f32) -> Vec2 {
    let angle = angle_deg.to_radians();
    Vec2::new(speed * angle.sin(), speed * angle.cos())
}

/// Circle-circle overlap test
#[inline]
pub fn circles_overlap(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
    a.distance(b) < radius_a + radius_b
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fan_single_shot_has_no_offset() {
        assert_eq!(fan_offsets(1, 30.0, 20.0), vec![(0.0, 0.0)]);
    }

    #[test]
    fn test_fan_even_count_is_symmetric() {
        let offsets = fan_offsets(2, 10.0, 4.0);
        assert_eq!(offsets, vec![(-5.0, -2.0), (5.0, 2.0)]);
    }

    #[test]
    fn test_shot_velocity_straight() {
        let v = shot_velocity(-400.0, 0.0);
        assert!(v.x.abs() < 1e-4);
        assert!((v.y + 400.0).abs() < 1e-4);
    }

    #[test]
    fn test_circles_overlap_is_strict() {
        assert!(circles_overlap(Vec2::ZERO, 5.0, Vec2::new(9.0, 0.0), 5.0));
        assert!(!circles_overlap(Vec2::ZERO, 5.0, Vec2::new(10.0, 0.0), 5.0));
    }

    proptest! {
        #[test]
        fn prop_fan_is_symmetric(
            count in 1u32..12,
            angle in -45.0f32..45.0,
            x_offset in -40.0f32..40.0,
        ) {
            let offsets = fan_offsets(count, angle, x_offset);
            prop_assert_eq!(offsets.len(), count as usize);
            let n = offsets.len();
            for i in 0..n {
                let (a, dx) = offsets[i];
                let (b, dy) = offsets[n - 1 - i];
                prop_assert!((a + b).abs() < 1e-3);
                prop_assert!((dx + dy).abs() < 1e-3);
            }
        }
    }
}
