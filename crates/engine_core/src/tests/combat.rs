use glam::DVec2;

use crate::test_fixtures::{base_sim, build_ship};
use crate::types::{EventKind, GovernmentId, ShipId, WeaponId};
use crate::{Projectile, Simulation};

fn place_ship(sim: &mut Simulation, design: &str, government: &str, position: DVec2) -> ShipId {
    let id = sim.counters.next_ship_id();
    let mut ship = build_ship(&sim.content, id.0, design, government);
    ship.place(position, DVec2::ZERO, 0.0);
    sim.store.ships.push(ship);
    id
}

fn weapon(sim: &Simulation, id: &str) -> crate::WeaponDef {
    sim.content
        .weapon(&WeaponId(id.to_string()))
        .expect("fixture weapon")
        .clone()
}

fn pirate_projectile(sim: &Simulation, weapon_id: &str, velocity: DVec2) -> Projectile {
    let mut projectile = Projectile::fired(
        &weapon(sim, weapon_id),
        GovernmentId("pirate".to_string()),
        DVec2::ZERO,
        DVec2::ZERO,
        0.0,
        None,
    );
    projectile.velocity = velocity;
    projectile
}

/// The worked example: a stationary target 300 units away, a projectile
/// traveling 400 units this step, no blast radius. One event, for the
/// target alone.
#[test]
fn direct_hit_example_produces_exactly_one_event() {
    let mut sim = base_sim(11);
    let target = place_ship(&mut sim, "test_fighter", "republic", DVec2::new(300.0, 0.0));
    // A bystander well away from the line of fire.
    place_ship(&mut sim, "test_freighter", "merchant", DVec2::new(0.0, 800.0));

    let mut lethal = weapon(&sim, "blaster");
    lethal.shield_damage = 10_000.0;
    lethal.hull_damage = 10_000.0;
    let mut projectile = Projectile::fired(
        &lethal,
        GovernmentId("pirate".to_string()),
        DVec2::ZERO,
        DVec2::ZERO,
        0.0,
        None,
    );
    projectile.velocity = DVec2::new(400.0, 0.0);
    sim.store.projectiles.push(projectile);

    sim.fill_collision_sets();
    sim.resolve_combat();

    let events = sim.drain_events();
    assert_eq!(events.len(), 1, "exactly one event: {events:?}");
    assert_eq!(events[0].target, target);
    assert_eq!(events[0].kind, EventKind::Destroy);
    assert!(sim.store.projectiles[0].should_be_removed());
}

#[test]
fn blast_damages_every_body_in_radius_regardless_of_faction() {
    let mut sim = base_sim(12);
    let enemy = place_ship(&mut sim, "test_fighter", "republic", DVec2::new(300.0, 0.0));
    // A pirate — same government as the firer — inside the blast radius.
    let friend = place_ship(&mut sim, "test_fighter", "pirate", DVec2::new(320.0, 40.0));

    let torpedo = weapon(&sim, "torpedo");
    assert!(torpedo.blast_radius > 0.0 && !torpedo.safe);
    let mut projectile = Projectile::fired(
        &torpedo,
        GovernmentId("pirate".to_string()),
        DVec2::ZERO,
        DVec2::ZERO,
        0.0,
        Some(enemy),
    );
    projectile.velocity = DVec2::new(400.0, 0.0);
    sim.store.projectiles.push(projectile);

    sim.fill_collision_sets();
    sim.resolve_combat();

    let events = sim.drain_events();
    let targets: Vec<ShipId> = events.iter().map(|e| e.target).collect();
    assert!(targets.contains(&enemy), "enemy caught in blast: {events:?}");
    assert!(targets.contains(&friend), "friendly caught in blast: {events:?}");
}

#[test]
fn safe_blast_spares_non_target_non_enemy_bodies() {
    let mut sim = base_sim(13);
    let target = place_ship(&mut sim, "test_fighter", "republic", DVec2::new(300.0, 0.0));
    // Another pirate in the radius: not the target, not an enemy of the
    // firer, and the weapon is "safe".
    let bystander = place_ship(&mut sim, "test_fighter", "pirate", DVec2::new(320.0, 40.0));

    let mut projectile = Projectile::fired(
        &weapon(&sim, "safe-torpedo"),
        GovernmentId("pirate".to_string()),
        DVec2::ZERO,
        DVec2::ZERO,
        0.0,
        Some(target),
    );
    projectile.velocity = DVec2::new(400.0, 0.0);
    sim.store.projectiles.push(projectile);

    sim.fill_collision_sets();
    sim.resolve_combat();

    let events = sim.drain_events();
    assert!(events.iter().any(|e| e.target == target));
    assert!(
        events.iter().all(|e| e.target != bystander),
        "safe blast must spare the bystander: {events:?}"
    );
}

#[test]
fn trigger_radius_detonates_next_to_an_enemy() {
    let mut sim = base_sim(14);
    // The enemy sits just off the travel line, inside the 25-unit trigger
    // radius at closest approach but outside the 8-unit hit circle.
    let enemy = place_ship(&mut sim, "test_fighter", "republic", DVec2::new(0.0, 20.0));

    let torpedo = weapon(&sim, "torpedo");
    let mut projectile = Projectile::fired(
        &torpedo,
        GovernmentId("pirate".to_string()),
        DVec2::ZERO,
        DVec2::ZERO,
        0.0,
        None,
    );
    projectile.velocity = DVec2::new(400.0, 0.0);
    sim.store.projectiles.push(projectile);

    sim.fill_collision_sets();
    sim.resolve_combat();

    // Detonation at fraction 0 puts the blast at the projectile's position,
    // well within blast radius of the enemy.
    let events = sim.drain_events();
    assert!(
        events.iter().any(|e| e.target == enemy),
        "trigger radius should detonate the torpedo: {events:?}"
    );
}

#[test]
fn phasing_projectile_ignores_everything_but_its_target() {
    let mut sim = base_sim(15);
    // A shield ship sits directly in the flight path, the locked target
    // behind it.
    let shield = place_ship(&mut sim, "test_frigate", "republic", DVec2::new(150.0, 0.0));
    let locked = place_ship(&mut sim, "test_fighter", "republic", DVec2::new(400.0, 0.0));

    let mut projectile = Projectile::fired(
        &weapon(&sim, "phase-lance"),
        GovernmentId("pirate".to_string()),
        DVec2::ZERO,
        DVec2::ZERO,
        0.0,
        Some(locked),
    );
    projectile.velocity = DVec2::new(500.0, 0.0);
    sim.store.projectiles.push(projectile);

    sim.fill_collision_sets();
    sim.resolve_combat();

    let events = sim.drain_events();
    assert!(events.iter().any(|e| e.target == locked));
    assert!(
        events.iter().all(|e| e.target != shield),
        "phasing rounds pass through interposed ships: {events:?}"
    );
}

#[test]
fn ownerless_explosion_detonates_in_place() {
    let mut sim = base_sim(16);
    let victim = place_ship(&mut sim, "test_fighter", "republic", DVec2::new(30.0, 0.0));

    let blast = weapon(&sim, "shipwreck");
    sim.store
        .projectiles
        .push(Projectile::explosion(&blast, DVec2::ZERO));

    sim.fill_collision_sets();
    sim.resolve_combat();

    let events = sim.drain_events();
    assert!(events.iter().any(|e| e.target == victim));
    assert!(sim.store.projectiles[0].should_be_removed());
}

#[test]
fn anti_missile_destroys_a_missile_that_misses() {
    let mut sim = base_sim(17);
    // A frigate (carries an anti-missile turret) near the missile's path.
    let defender = place_ship(&mut sim, "test_frigate", "republic", DVec2::ZERO);
    // Make interception a near-certainty; the draw is still seeded.
    for hardpoint in &mut sim.store.ships[0].hardpoints {
        if hardpoint.weapon.anti_missile > 0 {
            hardpoint.weapon.anti_missile = 100_000;
        }
    }

    let mut missile = pirate_projectile(&sim, "missile", DVec2::new(8.0, 0.0));
    // Aimed to miss: offset track, locked on the defender.
    missile.position = DVec2::new(100.0, 100.0);
    missile.target = Some(defender);
    sim.store.projectiles.push(missile);

    // Run the full step so the defender's fire pass registers its ready
    // anti-missile mount.
    let mut frame = crate::FrameSnapshot::default();
    sim.calculate_step(&mut frame, &crate::InputCapture::default(), 1);

    assert!(
        sim.store
            .projectiles
            .iter()
            .all(crate::Projectile::should_be_removed),
        "the missile must not survive into a later step"
    );
    let events = sim.drain_events();
    assert!(
        events.iter().all(|e| e.target != defender),
        "an intercepted missile deals no damage: {events:?}"
    );
}

#[test]
fn asteroid_shields_the_ship_behind_it() {
    let mut sim = base_sim(18);
    let shielded = place_ship(&mut sim, "test_fighter", "republic", DVec2::new(300.0, 0.0));
    sim.asteroids.rocks.push(crate::Rock {
        position: DVec2::new(150.0, 0.0),
        velocity: DVec2::ZERO,
        radius: 20.0,
    });

    let mut projectile = pirate_projectile(&sim, "blaster", DVec2::new(400.0, 0.0));
    projectile.position = DVec2::ZERO;
    sim.store.projectiles.push(projectile);

    sim.fill_collision_sets();
    sim.resolve_combat();

    let events = sim.drain_events();
    assert!(
        events.iter().all(|e| e.target != shielded),
        "the rock should absorb the shot: {events:?}"
    );
    assert!(sim.store.projectiles[0].should_be_removed());
}

#[test]
fn cloaked_ship_is_hit_by_blast_but_not_by_direct_fire() {
    let mut sim = base_sim(19);
    let cloaked = place_ship(&mut sim, "test_fighter", "republic", DVec2::new(300.0, 0.0));
    sim.store.ships[0].cloak = 1.0;

    // Direct fire passes through.
    let direct = pirate_projectile(&sim, "blaster", DVec2::new(400.0, 0.0));
    sim.store.projectiles.push(direct);
    sim.fill_collision_sets();
    sim.resolve_combat();
    assert!(sim.drain_events().is_empty());
    assert!(!sim.store.projectiles[0].should_be_removed());

    // A blast centered nearby still catches it.
    sim.store.projectiles.clear();
    let blast = weapon(&sim, "shipwreck");
    sim.store
        .projectiles
        .push(Projectile::explosion(&blast, DVec2::new(280.0, 0.0)));
    sim.fill_collision_sets();
    sim.resolve_combat();
    let events = sim.drain_events();
    assert!(
        events.iter().any(|e| e.target == cloaked),
        "blast radius reaches cloaked ships: {events:?}"
    );
}
