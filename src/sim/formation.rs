//! Enemy formations
//!
//! A formation moves its members horizontally as one block and bounces off
//! the playfield edges (inset by `padding`). The direction flips *before* the
//! step that would cross an edge, so the block never overshoots.

use glam::Vec2;
use rand::Rng;

use super::enemy::{Enemy, EnemyId};
use super::timer::{LevelTask, TimerQueue};
use crate::levels::{EnemySpec, GroupSettings};

/// A group of enemies moving as one unit
#[derive(Debug, Clone)]
pub struct Formation {
    /// Position in the level's formation list
    pub index: usize,
    /// Members in row order
    pub enemies: Vec<Enemy>,
    /// +1 = right, -1 = left
    pub direction: f32,
    /// Pixels per second
    pub move_speed: f32,
    pub y_offset: f32,
    /// Margin kept from each screen edge
    pub padding: f32,
    width: f32,
}

impl Formation {
    pub fn new(index: usize, settings: &GroupSettings, default_padding: f32, width: f32) -> Self {
        Self {
            index,
            enemies: Vec::new(),
            direction: 1.0,
            move_speed: settings.move_speed,
            y_offset: settings.y_offset,
            padding: settings.padding.unwrap_or(default_padding),
            width,
        }
    }

    /// Spawn `count` enemies at `start_x + i * spacing`, all at `y + y_offset`
    #[allow(clippy::too_many_arguments)]
    pub fn create_enemy_row(
        &mut self,
        count: u32,
        spacing: f32,
        start_x: f32,
        y: f32,
        spec: &EnemySpec,
        next_id: &mut u32,
        rng: &mut impl Rng,
        timers: &mut TimerQueue<LevelTask>,
    ) {
        for i in 0..count {
            let id = EnemyId(*next_id);
            *next_id += 1;
            let pos = Vec2::new(start_x + i as f32 * spacing, y + self.y_offset);
            self.enemies
                .push(Enemy::spawn(id, self.index, spec, pos, rng, timers));
        }
        log::debug!(
            "Formation {} row: {count} x '{}' from x={start_x} step {spacing}",
            self.index,
            spec.image_key
        );
    }

    /// Leftmost and rightmost member x
    pub fn extent(&self) -> Option<(f32, f32)> {
        let mut xs = self.enemies.iter().map(|e| e.pos.x);
        let first = xs.next()?;
        Some(xs.fold((first, first), |(lo, hi), x| (lo.min(x), hi.max(x))))
    }

    /// Update members, then move the block with edge bounce
    pub fn update(&mut self, dt: f32) {
        for enemy in &mut self.enemies {
            enemy.update();
        }

        let Some((min_x, max_x)) = self.extent() else {
            return;
        };
        let left = self.padding;
        let right = self.width - self.padding;

        let mut step = self.move_speed * self.direction * dt;
        let crosses = if self.direction > 0.0 {
            max_x + step > right
        } else {
            min_x + step < left
        };
        if crosses {
            self.direction = -self.direction;
            step = -step;
        }

        // Never leave the band, even when one step is wider than the gap
        let lo = left - min_x;
        let hi = right - max_x;
        let step = if lo <= hi { step.clamp(lo, hi) } else { 0.0 };

        for enemy in &mut self.enemies {
            enemy.pos.x += step;
        }
    }

    /// Sole removal path: tear down the enemy and drop it from the group
    pub fn remove_enemy(&mut self, id: EnemyId) -> bool {
        let Some(index) = self.enemies.iter().position(|e| e.id == id) else {
            log::trace!("Formation {}: enemy {id:?} already removed", self.index);
            return false;
        };
        let mut enemy = self.enemies.remove(index);
        enemy.teardown();
        log::debug!(
            "Formation {}: removed enemy {id:?}, {} left",
            self.index,
            self.enemies.len()
        );
        true
    }

    pub fn get(&self, id: EnemyId) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    pub fn get_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|e| e.id == id)
    }

    pub fn len(&self) -> usize {
        self.enemies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.enemies.is_empty()
    }

    /// Members still in play (not mid death-fade)
    pub fn active_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.active).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    const EPS: f32 = 1e-3;

    fn formation(count: u32, spacing: f32, start_x: f32, speed: f32, padding: f32) -> Formation {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut timers = TimerQueue::new();
        let mut next_id = 1;
        let settings = GroupSettings {
            move_speed: speed,
            y_offset: 0.0,
            padding: Some(padding),
        };
        let mut f = Formation::new(0, &settings, 50.0, 800.0);
        f.create_enemy_row(
            count,
            spacing,
            start_x,
            100.0,
            &EnemySpec::default(),
            &mut next_id,
            &mut rng,
            &mut timers,
        );
        f
    }

    #[test]
    fn test_row_layout() {
        let f = formation(4, 100.0, 250.0, 0.0, 50.0);
        let xs: Vec<f32> = f.enemies.iter().map(|e| e.pos.x).collect();
        assert_eq!(xs, vec![250.0, 350.0, 450.0, 550.0]);
        assert!(f.enemies.iter().all(|e| e.pos.y == 100.0));
        let ids: Vec<u32> = f.enemies.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_y_offset_applied() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut timers = TimerQueue::new();
        let mut next_id = 1;
        let settings = GroupSettings {
            move_speed: 100.0,
            y_offset: 328.0,
            padding: None,
        };
        let mut f = Formation::new(1, &settings, 20.0, 800.0);
        assert_eq!(f.padding, 20.0);
        f.create_enemy_row(1, 0.0, 400.0, 10.0, &EnemySpec::default(), &mut next_id, &mut rng, &mut timers);
        assert_eq!(f.enemies[0].pos.y, 338.0);
    }

    #[test]
    fn test_bounce_keeps_left_edge() {
        // Two enemies 100px apart from x=100, 100px/s, padding 50, width 800
        let mut f = formation(2, 100.0, 100.0, 100.0, 50.0);
        let dt = 1.0 / 60.0;
        let mut reversed_at_right = false;
        for _ in 0..(60 * 30) {
            let before = f.direction;
            f.update(dt);
            if before > 0.0 && f.direction < 0.0 {
                reversed_at_right = true;
            }
            let (lo, hi) = f.extent().expect("non-empty");
            assert!(lo >= 50.0 - EPS, "left edge {lo}");
            assert!(hi <= 750.0 + EPS, "right edge {hi}");
        }
        assert!(reversed_at_right);
    }

    #[test]
    fn test_flips_before_overshoot() {
        let mut f = formation(1, 0.0, 745.0, 600.0, 50.0);
        f.update(0.1);
        assert_eq!(f.direction, -1.0);
        assert!((f.enemies[0].pos.x - 685.0).abs() < EPS);
    }

    #[test]
    fn test_empty_formation_does_not_move() {
        let mut f = formation(0, 10.0, 100.0, 100.0, 50.0);
        f.update(1.0);
        assert!(f.extent().is_none());
        assert_eq!(f.direction, 1.0);
    }

    #[test]
    fn test_remove_enemy_by_identity() {
        let mut f = formation(3, 100.0, 200.0, 0.0, 50.0);
        assert!(f.remove_enemy(EnemyId(2)));
        assert!(!f.remove_enemy(EnemyId(2)));
        let ids: Vec<u32> = f.enemies.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    proptest! {
        #[test]
        fn prop_members_stay_inside_padding(
            count in 1u32..8,
            spacing in 0.0f32..80.0,
            speed in 0.0f32..2000.0,
            padding in 0.0f32..100.0,
            start_frac in 0.0f32..1.0,
            dts in proptest::collection::vec(0.0f32..0.25, 1..200),
        ) {
            let span = spacing * (count - 1) as f32;
            let room = (800.0 - 2.0 * padding - span).max(0.0);
            let start_x = padding + room * start_frac;
            let mut f = formation(count, spacing, start_x, speed, padding);
            for dt in dts {
                f.update(dt);
                let (lo, hi) = f.extent().expect("non-empty");
                prop_assert!(lo >= padding - EPS, "left {} < {}", lo, padding);
                prop_assert!(hi <= 800.0 - padding + EPS, "right {} > {}", hi, 800.0 - padding);
            }
        }
    }
}
