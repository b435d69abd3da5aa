//! Ship state and the actions the engine performs on a ship's behalf:
//! damage application, weapon fire, anti-missile defense, scanning, and
//! carried-craft launch. What a ship *wants* to do is the controller's
//! business (`hooks::ShipController`).

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::content::{Constants, ShipDesign, WeaponDef, WorldContent};
use crate::flotsam::Payload;
use crate::projectile::Projectile;
use crate::types::{EventKind, GovernmentId, Personality, ShipId, SystemId};
use crate::visual::Visual;

/// One mounted weapon and its reload countdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hardpoint {
    pub weapon: WeaponDef,
    pub reload: u32,
}

/// Steering and action inputs for one step, written by the controller and
/// consumed by the engine.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Helm {
    /// Forward thrust in [-1, 1].
    pub thrust: f64,
    /// Turn input in [-1, 1].
    pub turn: f64,
    pub fire: bool,
    pub board: bool,
    pub launch: bool,
    pub jump: bool,
    pub cloak: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ship {
    pub id: ShipId,
    pub name: String,
    pub design: ShipDesign,
    pub government: GovernmentId,
    pub personality: Personality,
    pub system: Option<SystemId>,

    pub position: DVec2,
    pub velocity: DVec2,
    /// Heading in radians.
    pub facing: f64,
    /// Landing/takeoff scale in [0, 1]; 1 means in open flight.
    pub zoom: f64,
    pub cloak: f64,
    /// Remaining hyperspace transit steps; zero when in normal space.
    pub hyperspace: u32,

    pub hull: f64,
    pub shields: f64,
    pub fuel: f64,
    pub energy: f64,
    pub heat: f64,
    pub crew: u32,
    /// Hull level below which the ship is disabled. Derived from the design
    /// at spawn so damage checks need no content lookup.
    pub min_hull: f64,

    pub target: Option<ShipId>,
    pub target_system: Option<SystemId>,
    /// Index into the current system's stellar objects.
    pub target_object: Option<usize>,
    pub parent: Option<ShipId>,
    pub carried: Vec<Ship>,
    pub hardpoints: SmallVec<[Hardpoint; 4]>,

    pub helm: Helm,
    pub hail: Option<String>,
    pub cargo: Vec<Payload>,
    pub cargo_used: u32,

    pub scan_target: Option<ShipId>,
    pub outfit_scan: f64,
    pub cargo_scan: f64,

    pub board_cooldown: u32,
    pub destroyed: bool,
    pub removed: bool,
    /// A DESTROY event has been queued for this ship.
    pub destroy_reported: bool,
}

/// Read-only view of another ship, snapshotted before the mover pass so the
/// controller and boarding checks never alias the ship being moved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipObs {
    pub id: ShipId,
    pub position: DVec2,
    pub velocity: DVec2,
    pub government: GovernmentId,
    pub system: Option<SystemId>,
    pub radius: f64,
    pub disabled: bool,
    pub cloak: f64,
    pub targetable: bool,
}

impl Ship {
    pub fn build(
        id: ShipId,
        name: String,
        design: &ShipDesign,
        government: GovernmentId,
        personality: Personality,
        system: Option<SystemId>,
        content: &WorldContent,
        constants: &Constants,
    ) -> Self {
        let hardpoints = design
            .weapons
            .iter()
            .filter_map(|weapon_id| content.weapon(weapon_id))
            .map(|weapon| Hardpoint {
                weapon: weapon.clone(),
                reload: 0,
            })
            .collect();
        Self {
            id,
            name,
            design: design.clone(),
            government,
            personality,
            system,
            position: DVec2::ZERO,
            velocity: DVec2::ZERO,
            facing: 0.0,
            zoom: 1.0,
            cloak: 0.0,
            hyperspace: 0,
            hull: design.max_hull,
            shields: design.max_shields,
            fuel: design.max_fuel,
            energy: design.max_energy,
            heat: 0.0,
            crew: design.crew,
            min_hull: design.max_hull * constants.disabled_hull_fraction,
            target: None,
            target_system: None,
            target_object: None,
            parent: None,
            carried: Vec::new(),
            hardpoints,
            helm: Helm::default(),
            hail: None,
            cargo: Vec::new(),
            cargo_used: 0,
            scan_target: None,
            outfit_scan: 0.0,
            cargo_scan: 0.0,
            board_cooldown: 0,
            destroyed: false,
            removed: false,
            destroy_reported: false,
        }
    }

    pub fn place(&mut self, position: DVec2, velocity: DVec2, facing: f64) {
        self.position = position;
        self.velocity = velocity;
        self.facing = facing;
    }

    pub fn facing_unit(&self) -> DVec2 {
        DVec2::new(self.facing.cos(), self.facing.sin())
    }

    pub fn should_be_removed(&self) -> bool {
        self.removed
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Disabled by hull damage or by losing too much crew.
    pub fn is_disabled(&self) -> bool {
        self.hull < self.min_hull || self.crew < self.design.required_crew
    }

    pub fn is_hyperspacing(&self) -> bool {
        self.hyperspace > 0
    }

    /// In open flight: not landed, not mid-takeoff.
    pub fn in_flight(&self) -> bool {
        self.zoom >= 1.0
    }

    pub fn is_cloaked(&self) -> bool {
        self.cloak >= 1.0
    }

    /// Can be locked onto, clicked, or scanned.
    pub fn is_targetable(&self) -> bool {
        !self.destroyed && self.in_flight() && !self.is_cloaked() && !self.is_hyperspacing()
    }

    /// Can take deliberate action (pick up cargo, intercept missiles).
    pub fn can_act(&self) -> bool {
        !self.destroyed && !self.is_disabled() && self.in_flight() && !self.is_cloaked()
    }

    pub fn cargo_free(&self) -> u32 {
        self.design.cargo_space.saturating_sub(self.cargo_used)
    }

    /// Combined shield+hull strength weighted by cost; the currency of the
    /// grudge heuristic's lopsidedness check.
    pub fn strength(&self) -> f64 {
        (self.shields + self.hull) * self.design.cost as f64
    }

    pub fn radar_size(&self) -> f64 {
        self.design.radius.sqrt() * 0.25 + 0.5
    }

    pub fn observe(&self) -> ShipObs {
        ShipObs {
            id: self.id,
            position: self.position,
            velocity: self.velocity,
            government: self.government.clone(),
            system: self.system.clone(),
            radius: self.design.radius,
            disabled: self.is_disabled(),
            cloak: self.cloak,
            targetable: self.is_targetable(),
        }
    }

    /// Apply one weapon's damage. Returns at most one event: `Destroy` on a
    /// lethal hit, `Disable` on crossing the disabled threshold, `Damage`
    /// otherwise. Damage to an already-destroyed ship is a no-op.
    pub fn take_damage(&mut self, weapon: &WeaponDef) -> Option<EventKind> {
        if self.destroyed {
            return None;
        }
        if weapon.shield_damage <= 0.0 && weapon.hull_damage <= 0.0 && weapon.heat_damage <= 0.0 {
            return None;
        }
        let was_disabled = self.is_disabled();

        // Shields soak shield damage; hull damage leaks through in proportion
        // to how far the shields fell short.
        let leak = if weapon.shield_damage > 0.0 {
            let absorbed = self.shields.min(weapon.shield_damage);
            self.shields -= absorbed;
            1.0 - absorbed / weapon.shield_damage
        } else if self.shields > 0.0 {
            0.0
        } else {
            1.0
        };
        self.hull -= weapon.hull_damage * leak;
        self.heat += weapon.heat_damage;

        if self.hull <= 0.0 {
            self.destroyed = true;
            self.removed = true;
            if !self.destroy_reported {
                self.destroy_reported = true;
                return Some(EventKind::Destroy);
            }
            return None;
        }
        if !was_disabled && self.is_disabled() {
            return Some(EventKind::Disable);
        }
        Some(EventKind::Damage)
    }

    /// Advance reloads and fire per the helm. New projectiles are staged;
    /// returns whether an anti-missile mount is loaded and able to act, which
    /// feeds this frame's interception pass.
    pub fn fire(&mut self, staged: &mut Vec<Projectile>) -> bool {
        for hardpoint in &mut self.hardpoints {
            hardpoint.reload = hardpoint.reload.saturating_sub(1);
        }
        if !self.can_act() || self.is_hyperspacing() {
            return false;
        }

        let mut anti_missile_ready = false;
        let muzzle = self.position + self.facing_unit() * self.design.radius;
        for hardpoint in &mut self.hardpoints {
            if hardpoint.weapon.anti_missile > 0 {
                anti_missile_ready |= hardpoint.reload == 0;
                continue;
            }
            if !self.helm.fire || hardpoint.reload > 0 {
                continue;
            }
            hardpoint.reload = hardpoint.weapon.reload;
            staged.push(Projectile::fired(
                &hardpoint.weapon,
                self.government.clone(),
                muzzle,
                self.velocity,
                self.facing,
                self.target,
            ));
        }
        anti_missile_ready
    }

    /// One interception attempt against a missile. The first loaded turret in
    /// range takes the shot; a miss still spends the reload.
    pub fn fire_anti_missile(
        &mut self,
        projectile: &Projectile,
        visuals: &mut Vec<Visual>,
        rng: &mut (impl Rng + ?Sized),
    ) -> bool {
        let distance = self.position.distance(projectile.position);
        for hardpoint in &mut self.hardpoints {
            let weapon = &hardpoint.weapon;
            if weapon.anti_missile == 0 || hardpoint.reload > 0 || distance > weapon.range() {
                continue;
            }
            hardpoint.reload = weapon.reload;
            let strength = weapon.anti_missile + projectile.weapon.missile_strength;
            let hit = rng.gen_range(0..strength) < weapon.anti_missile;
            if hit {
                visuals.push(Visual::flash(&weapon.sprite, projectile.position));
            }
            return hit;
        }
        false
    }

    /// Accumulate scan progress against the current target. Returns
    /// (outfits just finished, cargo just finished); each fires once per
    /// target.
    pub fn step_scan(&mut self, target: &ShipObs) -> (bool, bool) {
        if self.scan_target != Some(target.id) {
            self.scan_target = Some(target.id);
            self.outfit_scan = 0.0;
            self.cargo_scan = 0.0;
        }
        let falloff = 1.0 + self.position.distance_squared(target.position) / 250_000.0;
        let mut outfits_done = false;
        let mut cargo_done = false;
        if self.design.outfit_scan > 0.0 && self.outfit_scan < 1.0 {
            self.outfit_scan += self.design.outfit_scan / falloff;
            outfits_done = self.outfit_scan >= 1.0;
        }
        if self.design.cargo_scan > 0.0 && self.cargo_scan < 1.0 {
            self.cargo_scan += self.design.cargo_scan / falloff;
            cargo_done = self.cargo_scan >= 1.0;
        }
        (outfits_done, cargo_done)
    }

    /// Deploy carried craft in a ring around the carrier.
    pub fn launch(&mut self, staged: &mut Vec<Ship>) {
        if self.carried.is_empty() {
            return;
        }
        let count = self.carried.len();
        for (i, mut craft) in self.carried.drain(..).enumerate() {
            let angle = self.facing + std::f64::consts::TAU * i as f64 / count as f64;
            let offset = DVec2::new(angle.cos(), angle.sin()) * (self.design.radius + craft.design.radius);
            craft.place(self.position + offset, self.velocity, angle);
            craft.system = self.system.clone();
            craft.parent = Some(self.id);
            staged.push(craft);
        }
    }
}
