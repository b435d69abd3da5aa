//! `engine_core` — deterministic combat-simulation step.
//!
//! No IO, no clocks. All randomness via the owned, caller-seeded Rng; all
//! side effects through the collaborator traits in [`hooks`].

mod asteroid;
mod collision;
mod combat;
mod comms;
mod content;
mod flotsam;
mod frame;
mod hooks;
mod player;
mod projectile;
mod ship;
mod sim;
mod spawn;
mod store;
mod types;
mod visual;

pub use asteroid::{AsteroidField, Minable, Rock};
pub use collision::{CollisionEntry, CollisionIndex};
pub use comms::GrudgeBook;
pub use content::{
    BeltDef, Constants, FleetChance, FleetDef, GovernmentDef, PersonDef, ShipDesign,
    StellarObjectDef, SystemDef, WeaponDef, WorldContent,
};
pub use flotsam::{Flotsam, Payload};
pub use frame::{
    DrawItem, FrameSnapshot, HudInfo, RadarEntry, RadarPointer, StatusRing, TargetHud,
    TargetReticle,
};
pub use hooks::{
    AudioLog, AudioSink, ControlContext, MessageLog, MessageSink, NullAudio, NullMessages,
    ShipController,
};
pub use player::{GameDate, PlayerState};
pub use projectile::Projectile;
pub use ship::{Hardpoint, Helm, Ship, ShipObs};
pub use sim::Simulation;
pub use store::{EntityStore, Staged};
pub use types::*;
pub use visual::Visual;

#[cfg(any(test, feature = "test-support"))]
pub mod test_fixtures;
