//! Visual effects emitted by the simulation
//!
//! The renderer drains these each frame. They are fire-and-forget: any
//! gameplay continuation (e.g. removing a faded enemy) is scheduled on the
//! level's timer queue, never driven by the renderer.

use glam::Vec2;

use super::enemy::EnemyId;

/// A one-shot visual request for the renderer
#[derive(Debug, Clone, PartialEq)]
pub enum VisualEffect {
    /// Explosion sprite of the given display size
    Explosion { pos: Vec2, size: f32 },
    /// Fade an enemy sprite to transparent
    FadeEnemy { enemy: EnemyId, duration_ms: f64 },
    /// A life icon was removed from the HUD
    LifeLost { remaining: u32 },
    /// The player ship sprite is gone
    PlayerDestroyed { pos: Vec2 },
    CameraFadeIn { duration_ms: f64 },
    CameraFadeOut { duration_ms: f64 },
}

/// Per-frame effect buffer
#[derive(Debug, Default)]
pub struct Effects {
    queue: Vec<VisualEffect>,
}

impl Effects {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, effect: VisualEffect) {
        self.queue.push(effect);
    }

    pub fn explosion(&mut self, pos: Vec2, size: f32) {
        self.push(VisualEffect::Explosion { pos, size });
    }

    /// Hand everything queued so far to the renderer
    pub fn drain(&mut self) -> Vec<VisualEffect> {
        std::mem::take(&mut self.queue)
    }

    pub fn iter(&self) -> impl Iterator<Item = &VisualEffect> {
        self.queue.iter()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
