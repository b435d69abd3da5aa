use glam::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::content::{FleetChance, SystemDef};
use crate::hooks::MessageLog;
use crate::spawn;
use crate::store::EntityStore;
use crate::test_fixtures::{base_content, base_sim, build_ship};
use crate::types::{Counters, FleetId, SystemId};

fn always_fleet_system(content: &crate::WorldContent) -> SystemDef {
    let mut system = content.system(&SystemId("sol".to_string())).unwrap().clone();
    system.fleets = vec![FleetChance {
        fleet: FleetId("pirate_raiders".to_string()),
        period: 1,
    }];
    system
}

#[test]
fn reinforcements_throttled_when_allies_dominate() {
    let content = base_content();
    let system = always_fleet_system(&content);
    let mut store = EntityStore::default();
    // Three pirate frigates (3M) against one republic frigate (1M):
    // allied strength exceeds twice the enemy strength.
    for i in 0..3 {
        store
            .ships
            .push(build_ship(&content, i, "test_frigate", "pirate"));
    }
    store
        .ships
        .push(build_ship(&content, 3, "test_frigate", "republic"));

    let sol = SystemId("sol".to_string());
    let mut counters = Counters { next_ship: 10 };
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    for _ in 0..50 {
        spawn::spawn_fleets(&mut store, &content, &system, Some(&sol), &mut counters, &mut rng);
        assert!(
            store.staged.ships.is_empty(),
            "no reinforcements while allies outnumber enemies 2:1"
        );
    }
}

#[test]
fn reinforcements_arrive_when_outgunned() {
    let content = base_content();
    let system = always_fleet_system(&content);
    let mut store = EntityStore::default();
    store
        .ships
        .push(build_ship(&content, 0, "test_frigate", "pirate"));
    store
        .ships
        .push(build_ship(&content, 1, "test_frigate", "republic"));
    store
        .ships
        .push(build_ship(&content, 2, "test_frigate", "republic"));

    let sol = SystemId("sol".to_string());
    let mut counters = Counters { next_ship: 10 };
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    spawn::spawn_fleets(&mut store, &content, &system, Some(&sol), &mut counters, &mut rng);
    // The period-1 fleet fires every step when not throttled.
    assert_eq!(store.staged.ships.len(), 2, "the raider pair should arrive");
    for ship in &store.staged.ships {
        assert_eq!(ship.government.0, "pirate");
        assert!(ship.position.length() > 1000.0, "arrivals start at the edge");
    }
}

#[test]
fn reinforcements_unthrottled_when_no_enemies_present() {
    let content = base_content();
    let system = always_fleet_system(&content);
    // Only pirates in the system: enemy strength is zero, so the throttle
    // does not apply.
    let mut store = EntityStore::default();
    for i in 0..5 {
        store
            .ships
            .push(build_ship(&content, i, "test_frigate", "pirate"));
    }
    let sol = SystemId("sol".to_string());
    let mut counters = Counters { next_ship: 10 };
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    spawn::spawn_fleets(&mut store, &content, &system, Some(&sol), &mut counters, &mut rng);
    assert!(!store.staged.ships.is_empty());
}

#[test]
fn rare_encounter_rate_follows_the_baseline() {
    let mut content = base_content();
    // Open the long-period gate every step; selection odds stay weighted
    // by frequency against the baseline.
    content.constants.person_period = 1;
    let system = content.system(&SystemId("sol".to_string())).unwrap().clone();

    let mut store = EntityStore::default();
    let mut counters = Counters::default();
    let mut rng = ChaCha8Rng::seed_from_u64(9);
    let mut spawned = 0u32;
    let trials = 2000;
    for _ in 0..trials {
        spawn::spawn_persons(&mut store, &content, &system, &mut counters, &mut rng);
        spawned += u32::try_from(store.staged.ships.len()).unwrap();
        store.staged.ships.clear();
    }
    // Expected rate: frequency / (frequency + baseline) = 100 / 1100.
    let expected = trials * 100 / 1100;
    assert!(
        spawned > expected / 2 && spawned < expected * 2,
        "spawned {spawned}, expected around {expected}"
    );
}

#[test]
fn person_carries_its_name_and_hail() {
    let mut content = base_content();
    content.constants.person_period = 1;
    // Make selection certain as well.
    content.constants.person_baseline = 0;
    let system = content.system(&SystemId("sol".to_string())).unwrap().clone();

    let mut store = EntityStore::default();
    let mut counters = Counters::default();
    let mut rng = ChaCha8Rng::seed_from_u64(3);
    spawn::spawn_persons(&mut store, &content, &system, &mut counters, &mut rng);
    assert_eq!(store.staged.ships.len(), 1);
    let person = &store.staged.ships[0];
    assert_eq!(person.name, "Marginal Profit");
    assert!(person.hail.as_deref().unwrap().contains("buy low"));
    assert!(person.personality.uninterested);
}

#[test]
fn raids_fire_with_notification_when_fleet_is_tempting() {
    let mut sim = base_sim(21);
    // Guarantee every draw succeeds so the test is seed-independent.
    sim.content.constants.raid_attraction_scale = 1.0;
    // A fat, unarmed convoy.
    for _ in 0..4 {
        let id = sim.counters.next_ship_id();
        let mut ship = build_ship(&sim.content, id.0, "test_freighter", "player");
        ship.place(DVec2::new(100.0, 0.0), DVec2::ZERO, 0.0);
        sim.store.ships.push(ship);
    }
    let system = sim.content.system(&SystemId("sol".to_string())).unwrap().clone();

    let log = MessageLog::new();
    let mut sink = log.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(21);
    spawn::spawn_raids(
        &mut sim.store,
        &sim.content,
        &system,
        &sim.player,
        &mut sim.counters,
        &mut sink,
        &mut rng,
        true,
    );
    let raids = sim.content.constants.raid_draws;
    assert_eq!(
        u32::try_from(sim.store.staged.ships.len()).unwrap(),
        raids,
        "every draw should place the one-frigate raid fleet"
    );
    let messages = log.drain();
    assert_eq!(messages.len() as u32, raids);
    assert!(messages[0].contains("Pirate raiding party"));
}

#[test]
fn raids_skip_a_defended_fleet() {
    let mut sim = base_sim(22);
    sim.content.constants.raid_attraction_scale = 1.0;
    // One armed frigate: its deterrence plus the flat offset outweighs the
    // small hold's attraction.
    let id = sim.counters.next_ship_id();
    let ship = build_ship(&sim.content, id.0, "test_frigate", "player");
    sim.store.ships.push(ship);
    let system = sim.content.system(&SystemId("sol".to_string())).unwrap().clone();
    let log = MessageLog::new();
    let mut sink = log.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(22);
    spawn::spawn_raids(
        &mut sim.store,
        &sim.content,
        &system,
        &sim.player,
        &mut sim.counters,
        &mut sink,
        &mut rng,
        true,
    );
    assert!(sim.store.staged.ships.is_empty());
    assert!(log.drain().is_empty());
}
