//! The entity store: live collections plus the staged-creation buffers.
//!
//! Everything created during a step lands in a staging buffer and is spliced
//! onto its live collection at a single merge point. New entities are drawn
//! the frame they appear but are neither moved nor collided until the next
//! step, which keeps the pipeline free of order-dependent double-processing.

use serde::{Deserialize, Serialize};

use crate::flotsam::Flotsam;
use crate::projectile::Projectile;
use crate::ship::Ship;
use crate::types::ShipId;
use crate::visual::Visual;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Staged {
    pub ships: Vec<Ship>,
    pub projectiles: Vec<Projectile>,
    pub flotsam: Vec<Flotsam>,
    pub visuals: Vec<Visual>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EntityStore {
    pub ships: Vec<Ship>,
    pub projectiles: Vec<Projectile>,
    pub flotsam: Vec<Flotsam>,
    pub visuals: Vec<Visual>,
    pub staged: Staged,
}

impl EntityStore {
    /// Drop everything flagged during the previous step's action pass. Ship
    /// order is preserved: iteration order feeds tie-breaks elsewhere.
    pub fn prune(&mut self) {
        self.ships.retain(|ship| !ship.should_be_removed());
        self.projectiles.retain(|p| !p.should_be_removed());
        self.flotsam.retain(|f| !f.should_be_removed());
        self.visuals.retain(|v| !v.should_be_removed());
    }

    /// The single merge point: splice every staging buffer onto the end of
    /// its live collection.
    pub fn merge_staged(&mut self) {
        self.ships.append(&mut self.staged.ships);
        self.projectiles.append(&mut self.staged.projectiles);
        self.flotsam.append(&mut self.staged.flotsam);
        self.visuals.append(&mut self.staged.visuals);
    }

    pub fn ship(&self, id: ShipId) -> Option<&Ship> {
        self.ships.iter().find(|ship| ship.id == id)
    }

    pub fn ship_mut(&mut self, id: ShipId) -> Option<&mut Ship> {
        self.ships.iter_mut().find(|ship| ship.id == id)
    }
}
