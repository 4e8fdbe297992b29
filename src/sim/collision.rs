//! Narrow-phase collision resolution
//!
//! Circle-vs-circle tests between projectiles and ships. Enemy deaths are
//! two-phase: the killing blow makes the enemy inert immediately, but it is
//! only removed from its formation when the death fade completes (a scheduled
//! `RemoveEnemy` task).

use glam::Vec2;

use super::effects::{Effects, VisualEffect};
use super::enemy::{EnemyClass, EnemyId, HitOutcome};
use super::formation::Formation;
use super::player::Player;
use super::projectile::ProjectilePool;
use super::state::GameState;
use super::timer::{LevelTask, TimerQueue};
use crate::circles_overlap;
use crate::config::GameConfig;

/// An enemy killed during a collision pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kill {
    pub formation: usize,
    pub enemy: EnemyId,
    pub class: EnemyClass,
}

/// Radii and effect parameters for collision resolution
#[derive(Debug, Clone)]
pub struct CollisionManager {
    pub player_radius: f32,
    pub projectile_radius: f32,
    pub enemy_projectile_radius: f32,
    pub explosion_small: f32,
    pub explosion_big: f32,
    pub enemy_fade_ms: f64,
}

impl CollisionManager {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            player_radius: config.collision.player_radius,
            projectile_radius: config.collision.projectile_radius,
            enemy_projectile_radius: config.collision.enemy_projectile_radius,
            explosion_small: config.explosion_small,
            explosion_big: config.explosion_big,
            enemy_fade_ms: config.fades.enemy_fade_ms,
        }
    }

    /// Whether two circles overlap
    #[inline]
    pub fn check_collision(a: Vec2, radius_a: f32, b: Vec2, radius_b: f32) -> bool {
        circles_overlap(a, radius_a, b, radius_b)
    }

    /// Player shots against every hittable enemy.
    ///
    /// Each projectile hits at most one enemy. Killed enemies are returned in
    /// kill order; their removal is scheduled after the fade.
    pub fn handle_player_projectile_collisions(
        &self,
        player: &mut Player,
        formations: &mut [Formation],
        timers: &mut TimerQueue<LevelTask>,
        effects: &mut Effects,
    ) -> Vec<Kill> {
        let mut kills = Vec::new();
        let shots: Vec<(usize, Vec2)> = player
            .weapon
            .projectiles()
            .iter_active()
            .map(|(i, p)| (i, p.pos))
            .collect();

        for (slot, shot_pos) in shots {
            'targets: for formation in formations.iter_mut() {
                let formation_index = formation.index;
                for enemy in formation.enemies.iter_mut() {
                    if !enemy.is_hittable() {
                        continue;
                    }
                    if !Self::check_collision(
                        shot_pos,
                        self.projectile_radius,
                        enemy.pos,
                        enemy.hitbox_radius(),
                    ) {
                        continue;
                    }

                    effects.explosion(shot_pos, self.explosion_small);
                    player.weapon.destroy_projectile(slot);

                    if enemy.take_hit() == HitOutcome::Killed {
                        let size = match enemy.class {
                            EnemyClass::Boss => self.explosion_big,
                            EnemyClass::Standard => self.explosion_small,
                        };
                        effects.explosion(enemy.pos, size);
                        effects.push(VisualEffect::FadeEnemy {
                            enemy: enemy.id,
                            duration_ms: self.enemy_fade_ms,
                        });
                        timers.after(
                            self.enemy_fade_ms,
                            LevelTask::RemoveEnemy {
                                formation: formation_index,
                                enemy: enemy.id,
                            },
                        );
                        log::debug!("Enemy {:?} killed", enemy.id);
                        kills.push(Kill {
                            formation: formation_index,
                            enemy: enemy.id,
                            class: enemy.class,
                        });
                    }
                    break 'targets;
                }
            }
        }
        kills
    }

    /// Enemy shots against the player: the shared pool (if any) and every
    /// enemy's own pool. Returns true when a hit ends the game; `won` is then
    /// cleared for the transition.
    pub fn handle_enemy_projectile_collisions(
        &self,
        player: &mut Player,
        formations: &mut [Formation],
        shared: Option<&mut ProjectilePool>,
        state: &mut GameState,
        effects: &mut Effects,
    ) -> bool {
        let mut game_over = false;

        if let Some(pool) = shared {
            game_over |= self.resolve_pool_against_player(player, pool, effects);
        }
        for formation in formations.iter_mut() {
            for enemy in formation.enemies.iter_mut() {
                game_over |=
                    self.resolve_pool_against_player(player, enemy.weapon.projectiles_mut(), effects);
            }
        }

        state.lives = player.lives;
        if game_over {
            state.won = false;
        }
        game_over
    }

    fn resolve_pool_against_player(
        &self,
        player: &mut Player,
        pool: &mut ProjectilePool,
        effects: &mut Effects,
    ) -> bool {
        let shots: Vec<(usize, Vec2)> = pool.iter_active().map(|(i, p)| (i, p.pos)).collect();
        let mut game_over = false;
        for (slot, shot_pos) in shots {
            if !player.active {
                break;
            }
            if !Self::check_collision(
                shot_pos,
                self.enemy_projectile_radius,
                player.pos,
                self.player_radius,
            ) {
                continue;
            }
            effects.explosion(shot_pos, self.explosion_small);
            pool.destroy(slot);
            if player.damage(effects, self.explosion_big) {
                game_over = true;
            }
        }
        game_over
    }
}
