//! Shared type definitions: ID newtypes, events, and per-frame input capture.

use glam::DVec2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ID newtypes
// ---------------------------------------------------------------------------

macro_rules! string_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub String);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_id!(GovernmentId);
string_id!(SystemId);
string_id!(FleetId);
string_id!(PersonId);
string_id!(WeaponId);
string_id!(DesignId);
string_id!(OutfitId);

/// Ordinal ship identity. Store order is load-bearing (first-eligible
/// tie-breaks), so identity is a counter rather than a random id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShipId(pub u64);

impl std::fmt::Display for ShipId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ship#{}", self.0)
    }
}

/// Monotonic id allocation for entities created at runtime.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Counters {
    pub next_ship: u64,
}

impl Counters {
    pub fn next_ship_id(&mut self) -> ShipId {
        let id = ShipId(self.next_ship);
        self.next_ship += 1;
        id
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Jump,
    Damage,
    Disable,
    Destroy,
    Board,
    Assist,
    ScanOutfits,
    ScanCargo,
}

/// Who caused an event. Projectile damage is attributed to a government;
/// boarding and scanning to a specific ship; self-destruction to no one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSource {
    None,
    Government(GovernmentId),
    Ship(ShipId),
}

/// A discrete occurrence produced during a step and consumed exactly once
/// by the foreground thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipEvent {
    pub source: EventSource,
    pub target: ShipId,
    pub kind: EventKind,
}

// ---------------------------------------------------------------------------
// Radar / audio
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RadarKind {
    Player,
    Friendly,
    Unfriendly,
    Hostile,
    Inactive,
    Special,
    Blink,
}

/// Keys for fire-and-forget sound requests. Playback is a collaborator's
/// concern; the engine only names what should be heard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundKey {
    Hyperdrive,
    JumpDrive,
    HyperdriveOut,
    HyperdriveIn,
    JumpOut,
    JumpIn,
    Alarm,
}

// ---------------------------------------------------------------------------
// Personality
// ---------------------------------------------------------------------------

/// Behavioral flags influencing diplomacy text and radar display. AI also
/// reads these, but AI lives outside the engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Personality {
    #[serde(default)]
    pub heroic: bool,
    #[serde(default)]
    pub mute: bool,
    #[serde(default)]
    pub uninterested: bool,
    #[serde(default)]
    pub target: bool,
    #[serde(default)]
    pub escort: bool,
    #[serde(default)]
    pub staying: bool,
}

// ---------------------------------------------------------------------------
// Foreground input capture
// ---------------------------------------------------------------------------

/// A click in screen coordinates, resolved by the worker on its next step
/// to avoid races with entity movement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickCapture {
    pub point: DVec2,
    pub right: bool,
    pub shift: bool,
}

/// Everything the foreground owns that the worker reads, captured once per
/// frame strictly between `wait` and `go`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InputCapture {
    pub active: bool,
    pub zoom: f64,
    pub click: Option<ClickCapture>,
}

impl Default for InputCapture {
    fn default() -> Self {
        Self {
            active: true,
            zoom: 1.0,
            click: None,
        }
    }
}
