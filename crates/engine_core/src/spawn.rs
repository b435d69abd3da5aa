//! Stochastic world population: reinforcement fleets, rare named
//! encounters, and raids. All three only ever append to the staging
//! buffers; nothing here mutates or destroys an existing entity.

use ahash::AHashMap;
use glam::DVec2;
use rand::Rng;

use crate::content::{FleetDef, SystemDef, WorldContent};
use crate::hooks::MessageSink;
use crate::player::PlayerState;
use crate::ship::Ship;
use crate::store::EntityStore;
use crate::types::{Counters, GovernmentId, Personality, SystemId};

const NAME_SYLLABLES: [&str; 12] = [
    "al", "ber", "cor", "dan", "eri", "fal", "gol", "har", "ith", "jun", "kel", "mor",
];

/// Deterministic pseudo-name for a spawned NPC hull.
fn ship_name(rng: &mut (impl Rng + ?Sized)) -> String {
    let a = NAME_SYLLABLES[rng.gen_range(0..NAME_SYLLABLES.len())];
    let b = NAME_SYLLABLES[rng.gen_range(0..NAME_SYLLABLES.len())];
    let number = rng.gen_range(1..100u32);
    let mut name = format!("{a}{b} {number}");
    if let Some(first) = name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    name
}

/// Cost-weighted combat strength of every government present and alive in
/// the given system.
pub(crate) fn strength_by_government(
    ships: &[Ship],
    system: Option<&SystemId>,
) -> AHashMap<GovernmentId, f64> {
    let mut strengths = AHashMap::new();
    for ship in ships {
        if ship.is_destroyed() || ship.system.as_ref() != system {
            continue;
        }
        *strengths.entry(ship.government.clone()).or_insert(0.0) += ship.design.cost as f64;
    }
    strengths
}

pub(crate) fn enemy_strength(
    strengths: &AHashMap<GovernmentId, f64>,
    government: &GovernmentId,
    content: &WorldContent,
) -> f64 {
    strengths
        .iter()
        .filter(|(other, _)| content.hostile(government, other))
        .map(|(_, strength)| strength)
        .sum()
}

pub(crate) fn ally_strength(
    strengths: &AHashMap<GovernmentId, f64>,
    government: &GovernmentId,
    content: &WorldContent,
) -> f64 {
    strengths
        .iter()
        .filter(|(other, _)| !content.hostile(government, other))
        .map(|(_, strength)| strength)
        .sum()
}

/// Build one ship of a design, crewed bays included, ready to be placed.
pub(crate) fn materialize_ship(
    content: &WorldContent,
    counters: &mut Counters,
    design_id: &crate::types::DesignId,
    government: &GovernmentId,
    name: String,
    personality: Personality,
    system: &SystemId,
    rng: &mut (impl Rng + ?Sized),
) -> Option<Ship> {
    let design = content.design(design_id)?;
    let mut ship = Ship::build(
        counters.next_ship_id(),
        name,
        design,
        government.clone(),
        personality,
        Some(system.clone()),
        content,
        &content.constants,
    );
    if let Some(def) = content.government(government) {
        if !def.hails.is_empty() {
            ship.hail = Some(def.hails[rng.gen_range(0..def.hails.len())].clone());
        }
    }
    if let Some(bay_design_id) = &design.bay_design {
        if let Some(bay_design) = content.design(bay_design_id) {
            for _ in 0..design.bays {
                let craft = Ship::build(
                    counters.next_ship_id(),
                    ship_name(rng),
                    bay_design,
                    government.clone(),
                    personality,
                    Some(system.clone()),
                    content,
                    &content.constants,
                );
                ship.carried.push(craft);
            }
        }
    }
    Some(ship)
}

/// Stage a fleet arriving at the edge of the system, headed inward.
pub(crate) fn enter_fleet(
    fleet: &FleetDef,
    content: &WorldContent,
    system: &SystemId,
    staged: &mut Vec<Ship>,
    counters: &mut Counters,
    rng: &mut (impl Rng + ?Sized),
) {
    for design_id in &fleet.ships {
        let Some(mut ship) = materialize_ship(
            content,
            counters,
            design_id,
            &fleet.government,
            ship_name(rng),
            Personality::default(),
            system,
            rng,
        ) else {
            continue;
        };
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let unit = DVec2::new(angle.cos(), angle.sin());
        let position = unit * rng.gen_range(1500.0..2500.0);
        let inward = -unit;
        let speed = rng.gen_range(0.5..1.0) * ship.design.max_velocity;
        ship.place(position, inward * speed, angle + std::f64::consts::PI);
        staged.push(ship);
    }
}

/// Stage a fleet already in place, used for initial population on entry.
pub(crate) fn place_fleet(
    fleet: &FleetDef,
    content: &WorldContent,
    system: &SystemId,
    staged: &mut Vec<Ship>,
    counters: &mut Counters,
    rng: &mut (impl Rng + ?Sized),
) {
    for design_id in &fleet.ships {
        let Some(mut ship) = materialize_ship(
            content,
            counters,
            design_id,
            &fleet.government,
            ship_name(rng),
            Personality::default(),
            system,
            rng,
        ) else {
            continue;
        };
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let position = DVec2::new(angle.cos(), angle.sin()) * rng.gen_range(0.0..2000.0);
        let facing = rng.gen_range(0.0..std::f64::consts::TAU);
        let velocity = DVec2::new(facing.cos(), facing.sin())
            * rng.gen_range(0.0..ship.design.max_velocity * 0.5);
        ship.place(position, velocity, facing);
        staged.push(ship);
    }
}

/// Reinforcements: one expected arrival per fleet per period, throttled so a
/// faction whose allies already dominate a live battle stops piling on.
pub(crate) fn spawn_fleets(
    store: &mut EntityStore,
    content: &WorldContent,
    system: &SystemDef,
    player_system: Option<&SystemId>,
    counters: &mut Counters,
    rng: &mut (impl Rng + ?Sized),
) {
    let strengths = strength_by_government(&store.ships, player_system);
    for chance in &system.fleets {
        if chance.period == 0 || rng.gen_range(0..chance.period) != 0 {
            continue;
        }
        let Some(fleet) = content.fleet(&chance.fleet) else {
            continue;
        };
        if content.government(&fleet.government).is_none() {
            continue;
        }
        let enemies = enemy_strength(&strengths, &fleet.government, content);
        if enemies > 0.0 && ally_strength(&strengths, &fleet.government, content) > 2.0 * enemies {
            continue;
        }
        enter_fleet(fleet, content, &system.id, &mut store.staged.ships, counters, rng);
    }
}

/// Rare encounters: a long-period gate, then a weighted choice over the
/// eligible named definitions. The fixed baseline keeps the overall rate
/// stable as the catalog grows.
pub(crate) fn spawn_persons(
    store: &mut EntityStore,
    content: &WorldContent,
    system: &SystemDef,
    counters: &mut Counters,
    rng: &mut (impl Rng + ?Sized),
) {
    let constants = &content.constants;
    if system.links.is_empty() || rng.gen_range(0..constants.person_period) != 0 {
        return;
    }
    let sum: u32 = content
        .persons
        .iter()
        .map(|person| person.frequency_in(&system.id))
        .sum();
    if sum == 0 {
        return;
    }
    let mut roll = i64::from(rng.gen_range(0..sum + constants.person_baseline));
    for person in &content.persons {
        roll -= i64::from(person.frequency_in(&system.id));
        if roll < 0 {
            let Some(mut ship) = materialize_ship(
                content,
                counters,
                &person.design,
                &person.government,
                person.name.clone(),
                person.personality,
                &system.id,
                rng,
            ) else {
                return;
            };
            ship.hail = person.hail.clone().or(ship.hail);
            let angle = rng.gen_range(0.0..std::f64::consts::TAU);
            let unit = DVec2::new(angle.cos(), angle.sin());
            ship.place(
                unit * 2000.0,
                -unit * ship.design.max_velocity * 0.5,
                angle + std::f64::consts::PI,
            );
            store.staged.ships.push(ship);
            return;
        }
    }
}

/// Raids: up to `raid_draws` independent chances, scaled by how tempting the
/// player's fleet looks relative to its escort strength. Runs on system
/// entry and, behind a period gate, in the steady state.
#[allow(clippy::too_many_arguments)]
pub(crate) fn spawn_raids(
    store: &mut EntityStore,
    content: &WorldContent,
    system: &SystemDef,
    player: &PlayerState,
    counters: &mut Counters,
    messages: &mut dyn MessageSink,
    rng: &mut (impl Rng + ?Sized),
    on_entry: bool,
) {
    let constants = &content.constants;
    if !on_entry && rng.gen_range(0..constants.raid_period) != 0 {
        return;
    }
    let Some(system_government) = content.government(&system.government) else {
        return;
    };
    let Some(raid_fleet_id) = &system_government.raid_fleet else {
        return;
    };
    let Some(raid_fleet) = content.fleet(raid_fleet_id) else {
        return;
    };
    let Some(raid_government) = content.government(&raid_fleet.government) else {
        return;
    };
    if !content.hostile(&raid_fleet.government, &player.government) {
        return;
    }

    let (attraction, deterrence) = player.raid_factors(&store.ships);
    let chance = constants.raid_attraction_scale * (attraction - deterrence - 2.0);
    if chance <= 0.0 {
        return;
    }
    for _ in 0..constants.raid_draws {
        if rng.gen::<f64>() < chance {
            enter_fleet(raid_fleet, content, &system.id, &mut store.staged.ships, counters, rng);
            messages.notify(format!(
                "Your fleet has attracted the interest of a {} raiding party.",
                raid_government.name
            ));
        }
    }
}
