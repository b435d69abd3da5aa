//! Drifting cargo and outfit pickups spawned by combat and mining.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::types::{OutfitId, ShipId};

/// What a piece of flotsam (or a slot of ship cargo) holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload {
    Commodity { name: String, tons: u32 },
    Outfit { outfit: OutfitId, count: u32 },
}

impl Payload {
    /// Cargo space the payload occupies, in tons.
    pub fn tons(&self) -> u32 {
        match self {
            Payload::Commodity { tons, .. } => *tons,
            Payload::Outfit { count, .. } => *count,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flotsam {
    pub position: DVec2,
    pub velocity: DVec2,
    pub payload: Payload,
    /// Back-reference to the ship that shed this flotsam, used only to stop
    /// it from scooping up its own jetsam. Never dereferenced after the
    /// source dies; a dangling id simply never matches.
    pub source: Option<ShipId>,
    pub lifetime: u32,
    pub removed: bool,
}

impl Flotsam {
    pub fn new(position: DVec2, velocity: DVec2, payload: Payload, source: Option<ShipId>, lifetime: u32) -> Self {
        Self {
            position,
            velocity,
            payload,
            source,
            lifetime,
            removed: false,
        }
    }

    pub fn should_be_removed(&self) -> bool {
        self.removed
    }

    pub fn advance(&mut self) {
        if self.lifetime == 0 {
            self.removed = true;
            return;
        }
        self.lifetime -= 1;
        self.position += self.velocity;
        // Slight drag so ejecta settles instead of sailing off forever.
        self.velocity *= 0.999;
    }
}
