//! Self-expiring visual effects: explosions, flashes, ion sparks.

use glam::DVec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visual {
    pub sprite: String,
    pub position: DVec2,
    pub velocity: DVec2,
    pub frame: u32,
    pub frames: u32,
}

impl Visual {
    pub fn new(sprite: impl Into<String>, position: DVec2, velocity: DVec2, frames: u32) -> Self {
        Self {
            sprite: sprite.into(),
            position,
            velocity,
            frame: 0,
            frames,
        }
    }

    /// Short stationary flash, e.g. an anti-missile burst.
    pub fn flash(sprite: &str, position: DVec2) -> Self {
        Self::new(format!("{sprite}/flash"), position, DVec2::ZERO, 12)
    }

    pub fn should_be_removed(&self) -> bool {
        self.frame >= self.frames
    }

    pub fn advance(&mut self) {
        self.frame += 1;
        self.position += self.velocity;
    }
}
