//! Weapons: fan patterns, fire gating and projectile pools
//!
//! Two firing policies share one type:
//! - `Cooldown` (player): firing closes the gate, a scheduled task reopens it
//!   exactly `fire_delay_ms` later.
//! - `Autofire` (enemies): the gate never closes; instead each shot schedules
//!   the next one after a uniformly random delay.

use glam::Vec2;
use rand::Rng;

use super::enemy::EnemyId;
use super::projectile::{Playfield, ProjectilePool};
use super::timer::{LevelTask, TimerQueue};
use crate::config::PlayerTuning;
use crate::levels::EnemySpec;
use crate::{fan_offsets, shot_velocity};

/// Who owns a weapon (used to route scheduled tasks back to it)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shooter {
    Player,
    Enemy { formation: usize, enemy: EnemyId },
}

/// When a weapon may fire
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FirePolicy {
    Cooldown { fire_delay_ms: f64 },
    Autofire { min_delay_ms: f64, max_delay_ms: f64 },
}

impl FirePolicy {
    /// Autofire window with the bounds in order
    pub fn autofire(min_delay_ms: f64, max_delay_ms: f64) -> Self {
        let (min_delay_ms, max_delay_ms) = if min_delay_ms <= max_delay_ms {
            (min_delay_ms.max(0.0), max_delay_ms.max(0.0))
        } else {
            (max_delay_ms.max(0.0), min_delay_ms.max(0.0))
        };
        FirePolicy::Autofire {
            min_delay_ms,
            max_delay_ms,
        }
    }
}

/// Static weapon parameters
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponConfig {
    pub policy: FirePolicy,
    /// Signed speed along the shot axis (negative = upward)
    pub projectile_speed: f32,
    pub multi_shot_count: u32,
    /// Degrees between adjacent shots
    pub shot_angle: f32,
    /// Pixels between adjacent shots
    pub shot_x_offset: f32,
}

impl WeaponConfig {
    /// Single straight shot on a cooldown
    pub fn player(tuning: &PlayerTuning) -> Self {
        Self {
            policy: FirePolicy::Cooldown {
                fire_delay_ms: tuning.fire_delay_ms,
            },
            projectile_speed: tuning.projectile_speed,
            multi_shot_count: 1,
            shot_angle: 0.0,
            shot_x_offset: 0.0,
        }
    }

    /// Autofire weapon described by a level file
    pub fn enemy(spec: &EnemySpec) -> Self {
        let (min, max) = spec.fire_window();
        let weapon = &spec.weapon_config;
        Self {
            policy: FirePolicy::autofire(min, max),
            projectile_speed: weapon.projectile_speed,
            multi_shot_count: weapon.multi_shot_count.max(1),
            shot_angle: weapon.shot_angle,
            shot_x_offset: weapon.shot_x_offset,
        }
    }
}

/// A weapon with its own projectile pool
#[derive(Debug, Clone)]
pub struct Weapon {
    pub config: WeaponConfig,
    pub shooter: Shooter,
    can_fire: bool,
    torn_down: bool,
    projectiles: ProjectilePool,
    /// Simulated time of the last successful shot (ms)
    pub last_fired_ms: Option<f64>,
    pub shots_fired: u64,
}

impl Weapon {
    pub fn new(config: WeaponConfig, shooter: Shooter) -> Self {
        Self {
            config,
            shooter,
            can_fire: true,
            torn_down: false,
            projectiles: ProjectilePool::new(),
            last_fired_ms: None,
            shots_fired: 0,
        }
    }

    pub fn can_fire(&self) -> bool {
        self.can_fire && !self.torn_down
    }

    pub fn is_autofire(&self) -> bool {
        matches!(self.config.policy, FirePolicy::Autofire { .. })
    }

    /// Fire into this weapon's own pool
    pub fn fire(&mut self, origin: Vec2, timers: &mut TimerQueue<LevelTask>) -> bool {
        self.fire_with(origin, None, timers)
    }

    /// Fire into a pool shared with other weapons
    pub fn fire_into(
        &mut self,
        origin: Vec2,
        shared: &mut ProjectilePool,
        timers: &mut TimerQueue<LevelTask>,
    ) -> bool {
        self.fire_with(origin, Some(shared), timers)
    }

    fn fire_with(
        &mut self,
        origin: Vec2,
        shared: Option<&mut ProjectilePool>,
        timers: &mut TimerQueue<LevelTask>,
    ) -> bool {
        if !self.can_fire() {
            return false;
        }

        let pool: &mut ProjectilePool = match shared {
            Some(pool) => pool,
            None => &mut self.projectiles,
        };
        let offsets = fan_offsets(
            self.config.multi_shot_count,
            self.config.shot_angle,
            self.config.shot_x_offset,
        );
        for (angle, dx) in offsets {
            let vel = shot_velocity(self.config.projectile_speed, angle);
            pool.spawn(origin + Vec2::new(dx, 0.0), vel, angle, dx);
        }

        self.shots_fired += 1;
        self.last_fired_ms = Some(timers.now_ms());

        if let FirePolicy::Cooldown { fire_delay_ms } = self.config.policy {
            self.can_fire = false;
            timers.after(fire_delay_ms, LevelTask::ReopenGate(self.shooter));
        }
        true
    }

    /// Cooldown elapsed
    pub fn reopen(&mut self) {
        if !self.torn_down {
            self.can_fire = true;
        }
    }

    /// Queue the next autofire shot after a random delay in the fire window.
    /// Returns the chosen delay, or `None` for cooldown weapons.
    pub fn schedule_autofire(
        &self,
        rng: &mut impl Rng,
        timers: &mut TimerQueue<LevelTask>,
    ) -> Option<f64> {
        if self.torn_down {
            return None;
        }
        let FirePolicy::Autofire {
            min_delay_ms,
            max_delay_ms,
        } = self.config.policy
        else {
            return None;
        };
        let delay = rng.random_range(min_delay_ms..=max_delay_ms);
        timers.after(delay, LevelTask::Autofire(self.shooter));
        Some(delay)
    }

    /// Move this weapon's own projectiles
    pub fn advance(&mut self, dt: f32) {
        self.projectiles.advance(dt);
    }

    /// Recycle own projectiles that left the playfield
    pub fn cleanup(&mut self, field: Playfield) -> usize {
        self.projectiles.recycle_out_of_bounds(field)
    }

    /// Deactivate and park one of this weapon's projectiles
    pub fn destroy_projectile(&mut self, index: usize) -> bool {
        self.projectiles.destroy(index)
    }

    pub fn projectiles(&self) -> &ProjectilePool {
        &self.projectiles
    }

    pub fn projectiles_mut(&mut self) -> &mut ProjectilePool {
        &mut self.projectiles
    }

    /// Release everything; later fires and reopen tasks are no-ops
    pub fn teardown(&mut self) {
        self.torn_down = true;
        self.can_fire = false;
        self.projectiles.clear();
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}
