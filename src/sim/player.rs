//! The player's ship

use glam::Vec2;

use super::effects::{Effects, VisualEffect};
use super::projectile::Playfield;
use super::tick::TickInput;
use super::timer::{LevelTask, TimerQueue};
use super::weapon::{Shooter, Weapon, WeaponConfig};
use crate::config::PlayerTuning;

/// The player ship
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: Vec2,
    /// Display size (pixels)
    pub size: f32,
    /// Horizontal speed (pixels/s)
    pub speed: f32,
    /// Horizontal velocity this frame
    pub vel_x: f32,
    pub lives: u32,
    pub active: bool,
    pub weapon: Weapon,
    field: Playfield,
}

impl Player {
    /// Ship centered at the bottom of the playfield
    pub fn new(tuning: &PlayerTuning, lives: u32, field: Playfield) -> Self {
        Self {
            pos: Vec2::new(field.width / 2.0, field.height - tuning.size),
            size: tuning.size,
            speed: tuning.speed,
            vel_x: 0.0,
            lives,
            active: lives > 0,
            weapon: Weapon::new(WeaponConfig::player(tuning), Shooter::Player),
            field,
        }
    }

    /// Take one hit. Returns true when this hit ends the game.
    pub fn damage(&mut self, effects: &mut Effects, explosion_size: f32) -> bool {
        if !self.active {
            return false;
        }
        self.lives = self.lives.saturating_sub(1);
        effects.push(VisualEffect::LifeLost {
            remaining: self.lives,
        });

        if self.lives > 0 {
            return false;
        }

        effects.explosion(self.pos, explosion_size);
        effects.push(VisualEffect::PlayerDestroyed { pos: self.pos });
        self.active = false;
        self.vel_x = 0.0;
        self.weapon.teardown();
        log::info!("Player destroyed");
        true
    }

    /// Move from input, fire while held, recycle stray shots
    pub fn update(&mut self, input: &TickInput, dt: f32, timers: &mut TimerQueue<LevelTask>) {
        if !self.active {
            return;
        }

        // Left wins when both are held
        self.vel_x = if input.left {
            -self.speed
        } else if input.right {
            self.speed
        } else {
            0.0
        };
        let half = self.size / 2.0;
        let max_x = (self.field.width - half).max(half);
        self.pos.x = (self.pos.x + self.vel_x * dt).clamp(half, max_x);

        if input.fire {
            self.weapon.fire(self.pos, timers);
        }

        self.weapon.advance(dt);
        self.weapon.cleanup(self.field);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(lives: u32) -> Player {
        Player::new(&PlayerTuning::default(), lives, Playfield::new(800.0, 600.0))
    }

    #[test]
    fn test_three_hits_end_the_game() {
        let mut effects = Effects::new();
        let mut p = player(3);
        assert!(!p.damage(&mut effects, 192.0));
        assert!(!p.damage(&mut effects, 192.0));
        assert!(p.damage(&mut effects, 192.0));
        assert_eq!(p.lives, 0);
        assert!(!p.active);
        assert!(
            effects
                .iter()
                .any(|e| matches!(e, VisualEffect::Explosion { size, .. } if *size == 192.0))
        );
        // Further hits on a destroyed ship are no-ops
        assert!(!p.damage(&mut effects, 192.0));
        assert_eq!(p.lives, 0);
    }

    #[test]
    fn test_each_hit_removes_a_life_icon() {
        let mut effects = Effects::new();
        let mut p = player(3);
        p.damage(&mut effects, 192.0);
        assert_eq!(
            effects.drain(),
            vec![VisualEffect::LifeLost { remaining: 2 }]
        );
    }

    #[test]
    fn test_moves_and_clamps() {
        let mut timers = TimerQueue::new();
        let mut p = player(3);
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        p.update(&right, 0.5, &mut timers);
        assert_eq!(p.pos.x, 480.0);
        for _ in 0..20 {
            p.update(&right, 0.5, &mut timers);
        }
        assert_eq!(p.pos.x, 800.0 - 32.0);

        let left = TickInput {
            left: true,
            ..Default::default()
        };
        for _ in 0..20 {
            p.update(&left, 0.5, &mut timers);
        }
        assert_eq!(p.pos.x, 32.0);
        // No vertical movement
        assert_eq!(p.pos.y, 600.0 - 64.0);
    }

    #[test]
    fn test_left_wins_when_both_held() {
        let mut timers = TimerQueue::new();
        let mut p = player(3);
        let both = TickInput {
            left: true,
            right: true,
            ..Default::default()
        };
        p.update(&both, 0.5, &mut timers);
        assert_eq!(p.vel_x, -160.0);
        assert_eq!(p.pos.x, 320.0);
    }

    #[test]
    fn test_fire_held_respects_cooldown() {
        let mut timers = TimerQueue::new();
        let mut p = player(3);
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        p.update(&fire, 0.016, &mut timers);
        p.update(&fire, 0.016, &mut timers);
        assert_eq!(p.weapon.shots_fired, 1);
    }

    #[test]
    fn test_inactive_player_ignores_input() {
        let mut timers = TimerQueue::new();
        let mut p = player(0);
        assert!(!p.active);
        let input = TickInput {
            left: true,
            fire: true,
            ..Default::default()
        };
        p.update(&input, 1.0, &mut timers);
        assert_eq!(p.pos.x, 400.0);
        assert_eq!(p.weapon.shots_fired, 0);
    }

    #[test]
    fn test_shots_leave_and_recycle() {
        let mut timers = TimerQueue::new();
        let mut p = player(3);
        let fire = TickInput {
            fire: true,
            ..Default::default()
        };
        p.update(&fire, 0.016, &mut timers);
        assert_eq!(p.weapon.projectiles().active_count(), 1);
        // 536px at 400px/s leaves the top within 1.5s
        for _ in 0..100 {
            p.update(&TickInput::default(), 0.016, &mut timers);
        }
        assert_eq!(p.weapon.projectiles().active_count(), 0);
        assert_eq!(p.weapon.projectiles().capacity(), 1);
    }
}
