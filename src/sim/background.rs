//! Scrolling starfield offset
//!
//! The renderer tiles the background texture; the simulation only tracks the
//! vertical scroll offset so every tile wraps at the same moment.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Background {
    /// Current offset in `[0, tile_height)`
    pub offset: f32,
    /// Pixels per frame (positive = downward)
    pub scroll_speed: f32,
    pub tile_height: f32,
}

impl Background {
    pub fn new(scroll_speed: f32, tile_height: f32) -> Self {
        Self {
            offset: 0.0,
            scroll_speed,
            tile_height: tile_height.max(1.0),
        }
    }

    /// Scroll one frame, wrapping at the tile height
    pub fn update(&mut self) {
        self.offset = (self.offset + self.scroll_speed).rem_euclid(self.tile_height);
    }
}
