//! A reference `ShipController`: flight physics plus the minimum of intent
//! needed to drive the engine headless. Real AI (path planning, target
//! selection doctrine) lives outside the engine; this stand-in keeps the
//! pipeline honest in tests and the CLI.

use engine_core::{ControlContext, Ship, ShipController, ShipObs, Visual};
use glam::DVec2;
use serde::{Deserialize, Serialize};

const TAU: f64 = std::f64::consts::TAU;
const PI: f64 = std::f64::consts::PI;

/// Tunables for the stand-in pilot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PilotConfig {
    pub hyperspace_steps: u32,
    /// Engage hostiles inside this range.
    pub aggression_range: f64,
    /// Fire when the target bearing is within this many radians.
    pub firing_cone: f64,
}

impl Default for PilotConfig {
    fn default() -> Self {
        Self {
            hyperspace_steps: 60,
            aggression_range: 900.0,
            firing_cone: 0.2,
        }
    }
}

#[derive(Debug, Default)]
pub struct BasicPilot {
    pub config: PilotConfig,
    /// Governments hostile to each other, copied from content at
    /// construction so the controller needs no catalog access per step.
    hostile_pairs: Vec<(engine_core::GovernmentId, engine_core::GovernmentId)>,
}

impl BasicPilot {
    pub fn new(content: &engine_core::WorldContent) -> Self {
        let ids: Vec<_> = content.governments.keys().cloned().collect();
        let mut hostile_pairs = Vec::new();
        for a in &ids {
            for b in &ids {
                if content.hostile(a, b) {
                    hostile_pairs.push((a.clone(), b.clone()));
                }
            }
        }
        Self {
            config: PilotConfig {
                hyperspace_steps: content.constants.hyperspace_steps,
                ..PilotConfig::default()
            },
            hostile_pairs,
        }
    }

    fn hostile(&self, a: &engine_core::GovernmentId, b: &engine_core::GovernmentId) -> bool {
        self.hostile_pairs
            .iter()
            .any(|(x, y)| x == a && y == b)
    }

    /// Nearest live hostile in the same system, if any.
    fn pick_target(&self, ship: &Ship, others: &[ShipObs]) -> Option<engine_core::ShipId> {
        others
            .iter()
            .filter(|obs| {
                obs.id != ship.id
                    && obs.system == ship.system
                    && obs.targetable
                    && !obs.disabled
                    && self.hostile(&ship.government, &obs.government)
            })
            .filter(|obs| ship.position.distance(obs.position) <= self.config.aggression_range)
            .min_by(|a, b| {
                let da = ship.position.distance_squared(a.position);
                let db = ship.position.distance_squared(b.position);
                da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|obs| obs.id)
    }

    /// Write steering intent into the helm, then integrate it.
    fn steer_and_thrust(ship: &mut Ship, desired: DVec2) {
        let bearing = desired.to_angle();
        let mut delta = bearing - ship.facing;
        while delta > PI {
            delta -= TAU;
        }
        while delta < -PI {
            delta += TAU;
        }
        ship.helm.turn = (delta / ship.design.turn.max(1e-6)).clamp(-1.0, 1.0);
        // Thrust once roughly lined up.
        ship.helm.thrust = if delta.abs() < 0.5 { 1.0 } else { 0.0 };

        ship.facing += ship.helm.turn * ship.design.turn;
        if ship.helm.thrust > 0.0 {
            let accel = ship.design.thrust / ship.design.mass.max(1.0) * 60.0;
            ship.velocity += ship.facing_unit() * accel * ship.helm.thrust;
        }
        let speed = ship.velocity.length();
        if speed > ship.design.max_velocity {
            ship.velocity *= ship.design.max_velocity / speed;
        }
    }

    fn run_hyperspace(&self, ship: &mut Ship, ctx: &mut ControlContext<'_>) -> bool {
        if ship.hyperspace > 0 {
            ship.hyperspace -= 1;
            ship.velocity = ship.facing_unit() * (ship.design.max_velocity * 3.0);
            if ship.hyperspace == 0 {
                if let Some(destination) = ship.target_system.take() {
                    ship.system = Some(destination);
                    ship.position = -ship.facing_unit() * 2200.0;
                    ship.velocity = ship.facing_unit() * ship.design.max_velocity;
                    ctx.visuals.push(Visual::new(
                        "effect/hyperspace-flash",
                        ship.position,
                        ship.velocity,
                        18,
                    ));
                }
            }
            ship.position += ship.velocity;
            return true;
        }
        if ship.helm.jump && ship.target_system.is_some() && ship.fuel >= 100.0 {
            ship.fuel -= 100.0;
            ship.hyperspace = self.config.hyperspace_steps;
            return true;
        }
        false
    }

    fn regenerate(ship: &mut Ship) {
        let design = &ship.design;
        ship.shields = (ship.shields + design.shield_regen).min(design.max_shields);
        ship.energy = (ship.energy + design.energy_regen).min(design.max_energy);
        ship.heat = (ship.heat - design.heat_dissipation).max(0.0);
        if ship.helm.cloak && design.cloak_rate > 0.0 {
            ship.cloak = (ship.cloak + design.cloak_rate).min(1.0);
        } else {
            ship.cloak = (ship.cloak - design.cloak_rate).max(0.0);
        }
    }
}

impl ShipController for BasicPilot {
    fn update(&mut self, ship: &mut Ship, ctx: &mut ControlContext<'_>) {
        if ship.is_destroyed() {
            return;
        }
        if ship.is_disabled() {
            // Disabled hulls drift; no regeneration, no intent.
            ship.position += ship.velocity;
            return;
        }
        Self::regenerate(ship);
        if self.run_hyperspace(ship, ctx) {
            return;
        }

        // Keep or acquire an engagement target.
        let target_alive = ship.target.is_some_and(|id| {
            ctx.others
                .iter()
                .any(|obs| obs.id == id && obs.targetable && obs.system == ship.system)
        });
        if !target_alive && !ship.personality.uninterested {
            ship.target = self.pick_target(ship, ctx.others);
        }

        let engaged = ship
            .target
            .and_then(|id| ctx.others.iter().find(|obs| obs.id == id))
            .filter(|obs| self.hostile(&ship.government, &obs.government))
            .map(|obs| obs.position);
        if let Some(target_position) = engaged {
            let offset = target_position - ship.position;
            Self::steer_and_thrust(ship, offset);
            let mut delta = offset.to_angle() - ship.facing;
            while delta > PI {
                delta -= TAU;
            }
            while delta < -PI {
                delta += TAU;
            }
            let in_range = offset.length()
                <= ship
                    .hardpoints
                    .iter()
                    .map(|hp| hp.weapon.range())
                    .fold(0.0, f64::max);
            ship.helm.fire = in_range && delta.abs() <= self.config.firing_cone;
            ship.position += ship.velocity;
            return;
        }

        // No engagement: cruise ahead, slowing gently.
        ship.helm.fire = false;
        ship.velocity *= 0.995;
        ship.position += ship.velocity;
    }
}
