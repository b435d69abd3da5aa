//! Static world-data catalog: definitions consumed read-only by the step.
//!
//! Loading and validation live in `engine_world`; the types live here so the
//! step code can be checked against them without an IO dependency.

use std::collections::HashMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::types::{DesignId, FleetId, GovernmentId, Personality, SystemId, WeaponId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldContent {
    pub content_version: String,
    pub governments: HashMap<GovernmentId, GovernmentDef>,
    pub systems: HashMap<SystemId, SystemDef>,
    pub fleets: HashMap<FleetId, FleetDef>,
    /// Kept as a list: rare-encounter selection iterates in authoring order.
    pub persons: Vec<PersonDef>,
    pub weapons: HashMap<WeaponId, WeaponDef>,
    pub designs: HashMap<DesignId, ShipDesign>,
    pub constants: Constants,
}

impl WorldContent {
    pub fn government(&self, id: &GovernmentId) -> Option<&GovernmentDef> {
        self.governments.get(id)
    }

    pub fn system(&self, id: &SystemId) -> Option<&SystemDef> {
        self.systems.get(id)
    }

    pub fn fleet(&self, id: &FleetId) -> Option<&FleetDef> {
        self.fleets.get(id)
    }

    pub fn weapon(&self, id: &WeaponId) -> Option<&WeaponDef> {
        self.weapons.get(id)
    }

    pub fn design(&self, id: &DesignId) -> Option<&ShipDesign> {
        self.designs.get(id)
    }

    /// Enmity is declared on either side; the relation is symmetric.
    pub fn hostile(&self, a: &GovernmentId, b: &GovernmentId) -> bool {
        if a == b {
            return false;
        }
        let declared = |x: &GovernmentId, y: &GovernmentId| {
            self.governments
                .get(x)
                .is_some_and(|def| def.enemies.contains(y))
        };
        declared(a, b) || declared(b, a)
    }

    pub fn is_player(&self, id: &GovernmentId) -> bool {
        self.governments.get(id).is_some_and(|def| def.player)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernmentDef {
    pub id: GovernmentId,
    pub name: String,
    #[serde(default)]
    pub player: bool,
    /// Language gate for assistance requests; `None` means universally
    /// understood.
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub enemies: Vec<GovernmentId>,
    /// Ambient hail phrases. A spawned ship picks one at random.
    #[serde(default)]
    pub hails: Vec<String>,
    #[serde(default)]
    pub raid_fleet: Option<FleetId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemDef {
    pub id: SystemId,
    pub name: String,
    /// Map position, used for neighboring-system radar pointers.
    pub position: DVec2,
    pub government: GovernmentId,
    #[serde(default)]
    pub links: Vec<SystemId>,
    /// Systems reachable with a jump drive; a superset of `links`.
    #[serde(default)]
    pub neighbors: Vec<SystemId>,
    #[serde(default)]
    pub objects: Vec<StellarObjectDef>,
    #[serde(default)]
    pub fleets: Vec<FleetChance>,
    #[serde(default)]
    pub asteroids: Vec<BeltDef>,
    #[serde(default)]
    pub inhabited: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StellarObjectDef {
    pub name: String,
    pub sprite: String,
    pub position: DVec2,
    pub radius: f64,
    #[serde(default)]
    pub landable: bool,
}

/// One stochastic fleet source: an expected arrival every `period` steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetChance {
    pub fleet: FleetId,
    pub period: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeltDef {
    pub count: u32,
    /// Drift speed scale for the belt.
    pub energy: f64,
    #[serde(default)]
    pub minable: bool,
    /// Commodity released when a minable shatters.
    #[serde(default)]
    pub commodity: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetDef {
    pub id: FleetId,
    pub government: GovernmentId,
    pub ships: Vec<DesignId>,
}

/// A unique named ship that may rarely wander into the active system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonDef {
    pub id: crate::types::PersonId,
    pub name: String,
    pub government: GovernmentId,
    pub design: DesignId,
    #[serde(default)]
    pub personality: Personality,
    #[serde(default)]
    pub hail: Option<String>,
    /// Relative eligibility weight; scaled against the selection baseline so
    /// adding persons does not change the overall encounter rate.
    pub frequency: u32,
    /// Restrict to these systems; `None` means anywhere with hyperspace links.
    #[serde(default)]
    pub systems: Option<Vec<SystemId>>,
}

impl PersonDef {
    pub fn frequency_in(&self, system: &SystemId) -> u32 {
        match &self.systems {
            Some(list) if !list.contains(system) => 0,
            _ => self.frequency,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeaponDef {
    pub id: WeaponId,
    pub sprite: String,
    /// Muzzle velocity added to the firing ship's velocity, units per step.
    pub velocity: f64,
    pub lifetime: u32,
    pub reload: u32,
    pub shield_damage: f64,
    pub hull_damage: f64,
    #[serde(default)]
    pub heat_damage: f64,
    #[serde(default)]
    pub blast_radius: f64,
    #[serde(default)]
    pub trigger_radius: f64,
    /// A "safe" blast skips bodies that are neither the locked target nor an
    /// enemy of the firer.
    #[serde(default)]
    pub safe: bool,
    /// Phasing projectiles ignore every body except their locked target.
    #[serde(default)]
    pub phasing: bool,
    /// Nonzero marks a missile: interceptable, shown on radar, and homing if
    /// `homing_turn` is nonzero.
    #[serde(default)]
    pub missile_strength: u32,
    /// Steering limit in radians per step for homing projectiles.
    #[serde(default)]
    pub homing_turn: f64,
    /// Nonzero marks an anti-missile turret instead of a projectile weapon.
    #[serde(default)]
    pub anti_missile: u32,
}

impl WeaponDef {
    /// Total travel distance over the projectile's life, used as the
    /// engagement range for anti-missile turrets.
    pub fn range(&self) -> f64 {
        self.velocity * f64::from(self.lifetime)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipDesign {
    pub id: DesignId,
    pub model_name: String,
    pub sprite: String,
    /// Hit-circle radius.
    pub radius: f64,
    pub cost: i64,
    pub mass: f64,
    pub max_hull: f64,
    pub max_shields: f64,
    #[serde(default)]
    pub shield_regen: f64,
    pub max_fuel: f64,
    pub max_energy: f64,
    #[serde(default)]
    pub energy_regen: f64,
    pub max_heat: f64,
    #[serde(default)]
    pub heat_dissipation: f64,
    pub thrust: f64,
    /// Turn rate, radians per step.
    pub turn: f64,
    pub max_velocity: f64,
    pub crew: u32,
    pub required_crew: u32,
    pub cargo_space: u32,
    #[serde(default)]
    pub weapons: Vec<WeaponId>,
    /// Carried-craft slots and what fills them at spawn.
    #[serde(default)]
    pub bays: u32,
    #[serde(default)]
    pub bay_design: Option<DesignId>,
    #[serde(default)]
    pub outfit_scan: f64,
    #[serde(default)]
    pub cargo_scan: f64,
    /// Cloak ramp per step; zero means no cloaking device.
    #[serde(default)]
    pub cloak_rate: f64,
    #[serde(default)]
    pub has_jump_drive: bool,
    /// Explosion applied to everything nearby when the ship dies.
    #[serde(default)]
    pub death_blast: Option<WeaponId>,
}

/// Tunable engine constants, loaded with the content so scenarios can vary
/// them without rebuilding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Constants {
    /// One ambient hail attempt every this many steps, on average.
    pub hail_period: u32,
    /// Rare-encounter gate period.
    pub person_period: u32,
    /// Baseline added to the person-frequency sum so the encounter rate does
    /// not grow with the catalog.
    pub person_baseline: u32,
    /// Steady-state raid check period.
    pub raid_period: u32,
    pub raid_draws: u32,
    pub raid_attraction_scale: f64,
    /// Steps during which no new assistance request may fire.
    pub grudge_cooldown: u32,
    /// Steps before the hostile-contact alarm can sound again.
    pub alarm_cooldown: u32,
    pub flotsam_pickup_radius: f64,
    pub boarding_range: f64,
    /// Steps a hyperspace transit takes.
    pub hyperspace_steps: u32,
    /// Initial population: draws per fleet on system entry, at this window of
    /// the fleet's period.
    pub entry_fleet_draws: u32,
    pub entry_fleet_window: u32,
    pub collision_cell_size: f64,
    /// Half-width of the square the asteroid field wraps around.
    pub asteroid_wrap_extent: f64,
    /// A ship is disabled below this fraction of max hull.
    pub disabled_hull_fraction: f64,
    /// Steps a piece of flotsam drifts before despawning.
    pub flotsam_lifetime: u32,
    /// Steps between repeat boardings by the same ship.
    pub boarding_cooldown: u32,
}
