//! Collision and damage resolution: projectile hits, blasts, anti-missile
//! defense, flotsam collection, and scanning. Runs after the merge point,
//! against the indexes built from this step's final positions.

use glam::DVec2;
use rand::{Rng, RngCore};

use crate::asteroid::AsteroidField;
use crate::collision::{segment_circle, CollisionIndex};
use crate::comms::GrudgeBook;
use crate::content::{WeaponDef, WorldContent};
use crate::flotsam::{Flotsam, Payload};
use crate::hooks::MessageSink;
use crate::player::PlayerState;
use crate::projectile::Projectile;
use crate::ship::Ship;
use crate::store::Staged;
use crate::types::{EventKind, EventSource, GovernmentId, ShipEvent, ShipId};
use crate::visual::Visual;

/// Read-only inputs for one resolution pass.
pub(crate) struct ResolveCtx<'a> {
    pub content: &'a WorldContent,
    pub ship_index: &'a CollisionIndex,
    pub cloaked_index: &'a CollisionIndex,
    /// Ships that reported a loaded anti-missile mount this step, in store
    /// order. First successful interceptor wins.
    pub has_anti_missile: &'a [ShipId],
}

/// Everything a resolution pass may mutate.
pub(crate) struct ResolveOut<'a> {
    pub ships: &'a mut [Ship],
    pub staged: &'a mut Staged,
    pub visuals: &'a mut Vec<Visual>,
    pub asteroids: &'a mut AsteroidField,
    pub events: &'a mut Vec<ShipEvent>,
    pub grudges: &'a mut GrudgeBook,
    pub player: &'a PlayerState,
    pub messages: &'a mut dyn MessageSink,
    pub rng: &'a mut dyn RngCore,
}

/// Apply one weapon's damage to a ship by store index, queueing the event
/// and any death effects.
fn damage_ship(
    index: usize,
    weapon: &WeaponDef,
    source: &EventSource,
    content: &WorldContent,
    out: &mut ResolveOut<'_>,
) {
    let Some(kind) = out.ships[index].take_damage(weapon) else {
        return;
    };
    out.events.push(ShipEvent {
        source: source.clone(),
        target: out.ships[index].id,
        kind,
    });
    if kind == EventKind::Destroy {
        death_effects(index, content, out);
    }
}

/// A ship just died: big explosion visual, the design's death blast staged
/// as an ownerless projectile, and the cargo hold scattered as flotsam.
pub(crate) fn death_effects(index: usize, content: &WorldContent, out: &mut ResolveOut<'_>) {
    let constants = &content.constants;
    let (position, velocity, id, blast, cargo) = {
        let ship = &mut out.ships[index];
        let blast = ship
            .design
            .death_blast
            .as_ref()
            .and_then(|weapon_id| content.weapon(weapon_id))
            .cloned();
        (
            ship.position,
            ship.velocity,
            ship.id,
            blast,
            std::mem::take(&mut ship.cargo),
        )
    };
    out.visuals
        .push(Visual::new("effect/explosion-large", position, velocity, 60));
    if let Some(weapon) = blast {
        out.staged
            .projectiles
            .push(Projectile::explosion(&weapon, position));
    }
    for payload in cargo {
        let angle = out.rng.gen_range(0.0..std::f64::consts::TAU);
        let speed = out.rng.gen_range(0.2..1.5);
        let scatter = DVec2::new(angle.cos(), angle.sin()) * speed;
        out.staged.flotsam.push(Flotsam::new(
            position,
            velocity + scatter,
            payload,
            Some(id),
            constants.flotsam_lifetime,
        ));
    }
}

fn hostile_to(content: &WorldContent, government: Option<&GovernmentId>, other: &GovernmentId) -> bool {
    government.is_some_and(|gov| content.hostile(gov, other))
}

/// Resolve one projectile against the world, in the order the rules demand:
/// ownerless explosions detonate in place; phasing rounds test only their
/// locked target; everything else runs trigger-radius, segment, and
/// asteroid checks, then applies blast or single-body damage; misses give
/// anti-missile systems their chance.
#[allow(clippy::too_many_lines, clippy::cognitive_complexity)]
pub(crate) fn resolve_projectile(
    projectile: &mut Projectile,
    ctx: &ResolveCtx<'_>,
    out: &mut ResolveOut<'_>,
) {
    if projectile.should_be_removed() {
        return;
    }
    let content = ctx.content;
    let weapon = projectile.weapon.clone();
    let government = projectile.government.clone();
    let position = projectile.position;
    let velocity = projectile.velocity;
    let target = projectile.target;

    let mut closest_hit = 1.0;
    let mut hit: Option<usize> = None;
    let mut hit_velocity = DVec2::ZERO;

    if government.is_none() {
        // A ship explosion is already where it detonates.
        closest_hit = 0.0;
    } else if weapon.phasing && target.is_some() {
        // Phasing with a lock: test the target's hit circle directly and
        // ignore every other body, asteroids included.
        let found = out
            .ships
            .iter()
            .position(|ship| Some(ship.id) == target)
            .filter(|&i| {
                let ship = &out.ships[i];
                ship.system == out.player.system
                    && ship.in_flight()
                    && !ship.is_cloaked()
                    && !ship.is_destroyed()
            });
        if let Some(i) = found {
            let ship = &out.ships[i];
            if let Some(range) = segment_circle(position, velocity, ship.position, ship.design.radius)
            {
                closest_hit = range;
                hit = Some(i);
                hit_velocity = ship.velocity;
            }
        }
    } else {
        if weapon.trigger_radius > 0.0 {
            for entry in ctx.ship_index.circle(position, weapon.trigger_radius) {
                if Some(entry.ship) == target
                    || hostile_to(content, government.as_ref(), &entry.government)
                {
                    closest_hit = 0.0;
                    break;
                }
            }
        }
        if closest_hit > 0.0 {
            if let Some((entry, range)) = ctx.ship_index.line(position, velocity) {
                if range < closest_hit {
                    closest_hit = range;
                    hit = Some(entry.index);
                    hit_velocity = entry.velocity;
                }
            }
        }
        // Asteroids can shield a ship from anything that is not phasing.
        if !weapon.phasing {
            if let Some(asteroid_hit) = out.asteroids.collide(projectile, closest_hit) {
                closest_hit = asteroid_hit.fraction;
                hit = None;
                hit_velocity = asteroid_hit.velocity;
                if let Some(minable) = asteroid_hit.minable {
                    out.asteroids.damage_minable(minable, weapon.hull_damage);
                }
            }
        }
    }

    if closest_hit < 1.0 {
        let impact = position + velocity * closest_hit;
        out.visuals.push(Visual::new(
            format!("{}/hit", weapon.sprite),
            impact,
            hit_velocity,
            20,
        ));
        projectile.kill();

        let source = government
            .clone()
            .map_or(EventSource::None, EventSource::Government);
        if weapon.blast_radius > 0.0 {
            // Even friendly ships are caught in the blast unless the weapon
            // is "safe". Cloaked ships are not spared either.
            let mut caught: Vec<usize> = Vec::new();
            for index in [ctx.ship_index, ctx.cloaked_index] {
                for entry in index.circle(impact, weapon.blast_radius) {
                    let spared = weapon.safe
                        && Some(entry.ship) != target
                        && !hostile_to(content, government.as_ref(), &entry.government);
                    if !spared {
                        caught.push(entry.index);
                    }
                }
            }
            for index in caught {
                damage_ship(index, &weapon, &source, content, out);
            }
        } else if let Some(index) = hit {
            damage_ship(index, &weapon, &source, content, out);
        }

        if let (Some(index), Some(gov)) = (hit, government.as_ref()) {
            crate::comms::update_grudge(
                out.grudges,
                index,
                gov,
                out.ships,
                out.player,
                content,
                &content.constants,
                &mut *out.messages,
                &mut *out.rng,
            );
        }
    } else if weapon.missile_strength > 0 {
        // The projectile missed everything; anti-missile systems get one
        // first-success-wins chance each, in store order.
        for &defender in ctx.has_anti_missile {
            let Some(index) = out.ships.iter().position(|ship| ship.id == defender) else {
                continue;
            };
            if out.ships[index].should_be_removed() || !out.ships[index].can_act() {
                continue;
            }
            let eligible = Some(defender) == target
                || hostile_to(content, government.as_ref(), &out.ships[index].government);
            if !eligible {
                continue;
            }
            if out.ships[index].fire_anti_missile(projectile, out.visuals, &mut out.rng) {
                projectile.kill();
                break;
            }
        }
    }
}

/// Check whether any ship scoops up the given flotsam. The first able
/// collector in index order wins; player pickups are narrated. Returns the
/// collector and payload so the caller can record harvests.
pub(crate) fn collect_flotsam(
    flotsam: &mut Flotsam,
    ctx: &ResolveCtx<'_>,
    out: &mut ResolveOut<'_>,
) -> Option<(ShipId, Payload)> {
    if flotsam.should_be_removed() {
        return None;
    }
    let constants = &ctx.content.constants;
    let mut collector: Option<usize> = None;
    for entry in ctx
        .ship_index
        .circle(flotsam.position, constants.flotsam_pickup_radius)
    {
        let ship = &out.ships[entry.index];
        if !ship.can_act() || Some(ship.id) == flotsam.source {
            continue;
        }
        if ship.cargo_free() < flotsam.payload.tons() {
            continue;
        }
        collector = Some(entry.index);
        break;
    }
    let index = collector?;

    let tons = flotsam.payload.tons();
    let payload = flotsam.payload.clone();
    flotsam.removed = true;
    {
        let ship = &mut out.ships[index];
        ship.cargo.push(payload.clone());
        ship.cargo_used += tons;
    }

    let collector_ship = &out.ships[index];
    let collected = Some((collector_ship.id, payload.clone()));
    if collector_ship.government != out.player.government {
        return collected;
    }
    let name = if Some(collector_ship.id) == out.player.flagship {
        "You picked up ".to_string()
    } else {
        format!("Your ship \"{}\" picked up ", collector_ship.name)
    };
    let free = collector_ship.cargo_free();
    match &payload {
        Payload::Commodity { name: commodity, .. } => {
            let amount = if tons == 1 {
                "a ton".to_string()
            } else {
                format!("{tons} tons")
            };
            out.messages.notify(format!(
                "{name}{amount} of {commodity}. ({free} tons of free space remaining.)"
            ));
        }
        Payload::Outfit { outfit, count } => {
            out.messages
                .notify(format!("{name}{count} \u{00d7} {}.", outfit.0));
        }
    }
    collected
}

/// Player pickups of outfit flotsam also record a harvest entry; kept apart
/// from `collect_flotsam` because it mutates the player.
pub(crate) fn record_harvest(
    player: &mut PlayerState,
    collected: &[(ShipId, Payload)],
    ships: &[Ship],
) {
    let Some(system) = player.system.clone() else {
        return;
    };
    for (collector, payload) in collected {
        let Payload::Outfit { outfit, .. } = payload else {
            continue;
        };
        let is_players = ships
            .iter()
            .any(|ship| ship.id == *collector && ship.government == player.government);
        if is_players {
            player.harvest(system.clone(), outfit.clone());
        }
    }
}

/// Scanning relies on every ship being in its final position for the step,
/// so it runs after movement and collisions.
pub(crate) fn do_scanning(
    ships: &mut [Ship],
    player: &PlayerState,
    events: &mut Vec<ShipEvent>,
) {
    for i in 0..ships.len() {
        let scanner = &ships[i];
        if scanner.should_be_removed()
            || (scanner.design.outfit_scan <= 0.0 && scanner.design.cargo_scan <= 0.0)
        {
            continue;
        }
        let Some(target_id) = scanner.target else {
            continue;
        };
        let Some(obs) = ships
            .iter()
            .find(|ship| ship.id == target_id)
            .filter(|ship| ship.is_targetable() && ship.system == player.system)
            .map(Ship::observe)
        else {
            continue;
        };
        let (outfits_done, cargo_done) = ships[i].step_scan(&obs);
        let source = EventSource::Ship(ships[i].id);
        if outfits_done {
            events.push(ShipEvent {
                source: source.clone(),
                target: target_id,
                kind: EventKind::ScanOutfits,
            });
        }
        if cargo_done {
            events.push(ShipEvent {
                source,
                target: target_id,
                kind: EventKind::ScanCargo,
            });
        }
    }
}
