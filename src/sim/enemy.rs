//! Enemy ships
//!
//! Enemies have no per-frame logic: firing is entirely driven by their
//! weapon's self-scheduling autofire tasks, and movement by their formation.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::projectile::ProjectilePool;
use super::timer::{LevelTask, TimerQueue};
use super::weapon::{Shooter, Weapon, WeaponConfig};
use crate::consts::{BOSS_HITBOX_RATIO, STANDARD_HITBOX_RATIO};
use crate::levels::EnemySpec;

/// Stable identity of an enemy within a level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(pub u32);

/// Enemy class, derived from the sprite key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyClass {
    Boss,
    Standard,
}

impl EnemyClass {
    pub fn from_image_key(key: &str) -> Self {
        if key.eq_ignore_ascii_case("boss") {
            EnemyClass::Boss
        } else {
            EnemyClass::Standard
        }
    }

    /// Fraction of the half-size used as hitbox radius
    pub fn hitbox_ratio(&self) -> f32 {
        match self {
            EnemyClass::Boss => BOSS_HITBOX_RATIO,
            EnemyClass::Standard => STANDARD_HITBOX_RATIO,
        }
    }
}

/// Outcome of one projectile hit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Enemy was already dead or torn down
    Ignored,
    Damaged { remaining: u32 },
    Killed,
}

/// An enemy ship
#[derive(Debug, Clone)]
pub struct Enemy {
    pub id: EnemyId,
    pub image_key: String,
    pub class: EnemyClass,
    pub pos: Vec2,
    /// Display size (pixels)
    pub size: f32,
    pub hit_points: u32,
    pub min_fire_delay_ms: f64,
    pub max_fire_delay_ms: f64,
    pub weapon: Weapon,
    /// Takes part in gameplay (false from the killing blow onwards)
    pub active: bool,
    /// Narrow-phase collider enabled
    pub collider_enabled: bool,
}

impl Enemy {
    /// Build an enemy and start its autofire loop
    pub fn spawn(
        id: EnemyId,
        formation: usize,
        spec: &EnemySpec,
        pos: Vec2,
        rng: &mut impl Rng,
        timers: &mut TimerQueue<LevelTask>,
    ) -> Self {
        let (min_fire_delay_ms, max_fire_delay_ms) = spec.fire_window();
        let weapon = Weapon::new(
            WeaponConfig::enemy(spec),
            Shooter::Enemy {
                formation,
                enemy: id,
            },
        );
        let enemy = Self {
            id,
            image_key: spec.image_key.clone(),
            class: EnemyClass::from_image_key(&spec.image_key),
            pos,
            size: spec.size,
            hit_points: spec.hit_points.max(1),
            min_fire_delay_ms,
            max_fire_delay_ms,
            weapon,
            active: true,
            collider_enabled: true,
        };
        // First shot after a random delay, never on spawn
        enemy.weapon.schedule_autofire(rng, timers);
        enemy
    }

    /// Collision radius: a class-dependent fraction of the display size
    pub fn hitbox_radius(&self) -> f32 {
        self.size * self.class.hitbox_ratio()
    }

    /// Whether projectiles can hit this enemy
    pub fn is_hittable(&self) -> bool {
        self.active && self.collider_enabled
    }

    /// Per-frame hook. Timing is event-scheduled, so nothing to do.
    pub fn update(&mut self) {}

    /// Apply one point of damage. The killing blow deactivates the enemy and
    /// disables its collider immediately.
    pub fn take_hit(&mut self) -> HitOutcome {
        if !self.is_hittable() {
            return HitOutcome::Ignored;
        }
        self.hit_points = self.hit_points.saturating_sub(1);
        if self.hit_points == 0 {
            self.active = false;
            self.collider_enabled = false;
            HitOutcome::Killed
        } else {
            HitOutcome::Damaged {
                remaining: self.hit_points,
            }
        }
    }

    /// Handle an autofire task: shoot (into `shared` if given) and schedule
    /// the next shot. Dead enemies stop the loop.
    pub fn autofire(
        &mut self,
        shared: Option<&mut ProjectilePool>,
        rng: &mut impl Rng,
        timers: &mut TimerQueue<LevelTask>,
    ) -> bool {
        if !self.active {
            return false;
        }
        let fired = match shared {
            Some(pool) => self.weapon.fire_into(self.pos, pool, timers),
            None => self.weapon.fire(self.pos, timers),
        };
        self.weapon.schedule_autofire(rng, timers);
        fired
    }

    /// Release weapon and sprite
    pub fn teardown(&mut self) {
        self.weapon.teardown();
        self.active = false;
        self.collider_enabled = false;
    }
}
