//! Projectile records and their recycling pool

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Where recycled projectiles are parked, well outside any playfield
pub const PARKED_POS: Vec2 = Vec2::new(-10_000.0, -10_000.0);

/// Axis-aligned playfield bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Playfield {
    pub width: f32,
    pub height: f32,
}

impl Playfield {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Inclusive containment on all four edges
    pub fn contains(&self, pos: Vec2) -> bool {
        pos.x >= 0.0 && pos.x <= self.width && pos.y >= 0.0 && pos.y <= self.height
    }
}

/// A projectile in flight (or parked in the pool)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Fan angle this shot was fired at (degrees)
    pub angle: f32,
    /// Lateral fan offset applied at spawn (pixels)
    pub x_offset: f32,
    pub active: bool,
}

impl Projectile {
    fn parked() -> Self {
        Self {
            pos: PARKED_POS,
            vel: Vec2::ZERO,
            angle: 0.0,
            x_offset: 0.0,
            active: false,
        }
    }

    fn park(&mut self) {
        self.active = false;
        self.pos = PARKED_POS;
        self.vel = Vec2::ZERO;
    }
}

/// Fixed-slot pool; slots are reused, never freed
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
}

impl ProjectilePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate a projectile, reusing a parked slot when one exists.
    /// Returns the slot index.
    pub fn spawn(&mut self, pos: Vec2, vel: Vec2, angle: f32, x_offset: f32) -> usize {
        let index = match self.slots.iter().position(|p| !p.active) {
            Some(i) => i,
            None => {
                self.slots.push(Projectile::parked());
                self.slots.len() - 1
            }
        };
        let slot = &mut self.slots[index];
        slot.pos = pos;
        slot.vel = vel;
        slot.angle = angle;
        slot.x_offset = x_offset;
        slot.active = true;
        index
    }

    /// Move every live projectile by its velocity
    pub fn advance(&mut self, dt: f32) {
        for p in self.slots.iter_mut().filter(|p| p.active) {
            p.pos += p.vel * dt;
        }
    }

    /// Recycle live projectiles that left the playfield. Returns how many.
    pub fn recycle_out_of_bounds(&mut self, field: Playfield) -> usize {
        let mut recycled = 0;
        for p in self.slots.iter_mut().filter(|p| p.active) {
            if !field.contains(p.pos) {
                p.park();
                recycled += 1;
            }
        }
        recycled
    }

    /// Deactivate and park one projectile. Stale or parked slots are ignored.
    pub fn destroy(&mut self, index: usize) -> bool {
        match self.slots.get_mut(index) {
            Some(p) if p.active => {
                p.park();
                true
            }
            _ => false,
        }
    }

    /// Park everything
    pub fn clear(&mut self) {
        for p in &mut self.slots {
            p.park();
        }
    }

    pub fn get(&self, index: usize) -> Option<&Projectile> {
        self.slots.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Projectile> {
        self.slots.get_mut(index)
    }

    /// Live projectiles with their slot index
    pub fn iter_active(&self) -> impl Iterator<Item = (usize, &Projectile)> {
        self.slots.iter().enumerate().filter(|(_, p)| p.active)
    }

    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|p| p.active).count()
    }

    /// Total slots ever allocated
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
