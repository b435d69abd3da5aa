use glam::DVec2;

use crate::test_fixtures::{base_sim, build_ship, sim_with_logs};
use crate::types::{EventKind, GovernmentId, InputCapture, Personality, ShipId, SystemId};
use crate::{FrameSnapshot, Payload, Simulation};

fn step(sim: &mut Simulation, n: u64) -> Vec<crate::ShipEvent> {
    let mut frame = FrameSnapshot::default();
    let input = InputCapture::default();
    let mut events = Vec::new();
    for i in 0..n {
        sim.calculate_step(&mut frame, &input, i);
        events.extend(sim.drain_events());
    }
    events
}

fn add_ship_at(sim: &mut Simulation, design: &str, government: &str, position: DVec2) -> ShipId {
    let id = sim.counters.next_ship_id();
    let mut ship = build_ship(&sim.content, id.0, design, government);
    ship.place(position, DVec2::ZERO, 0.0);
    sim.store.ships.push(ship);
    id
}

#[test]
fn destroyed_ship_is_pruned_the_following_step() {
    let mut sim = base_sim(31);
    let victim = add_ship_at(&mut sim, "test_fighter", "republic", DVec2::new(300.0, 0.0));
    {
        let ship = sim.store.ship_mut(victim).unwrap();
        ship.shields = 0.0;
        ship.hull = 1.0;
    }
    let mut projectile = crate::Projectile::fired(
        sim.content
            .weapon(&crate::types::WeaponId("blaster".to_string()))
            .unwrap(),
        GovernmentId("pirate".to_string()),
        DVec2::ZERO,
        DVec2::ZERO,
        0.0,
        None,
    );
    projectile.velocity = DVec2::new(400.0, 0.0);
    // Staged, like real weapon fire: merged at the single merge point and
    // resolved on its first travel leg this same step.
    sim.store.staged.projectiles.push(projectile);

    let mut frame = FrameSnapshot::default();
    sim.calculate_step(&mut frame, &InputCapture::default(), 0);
    let events = sim.drain_events();
    assert!(events
        .iter()
        .any(|e| e.target == victim && e.kind == EventKind::Destroy));
    // Marked this step, still present in the store until the next prune,
    // and never moved after being marked.
    let wreck = sim.store.ship(victim).unwrap();
    assert!(wreck.position.abs_diff_eq(DVec2::new(300.0, 0.0), 1e-9));

    sim.calculate_step(&mut frame, &InputCapture::default(), 1);
    assert!(sim.store.ship(victim).is_none(), "pruned on the next step");
}

#[test]
fn destroy_event_fires_exactly_once() {
    let mut sim = base_sim(32);
    let victim = add_ship_at(&mut sim, "test_fighter", "republic", DVec2::new(300.0, 0.0));
    {
        let ship = sim.store.ship_mut(victim).unwrap();
        ship.shields = 0.0;
        ship.hull = 1.0;
    }
    let mut projectile = crate::Projectile::fired(
        sim.content
            .weapon(&crate::types::WeaponId("blaster".to_string()))
            .unwrap(),
        GovernmentId("pirate".to_string()),
        DVec2::ZERO,
        DVec2::ZERO,
        0.0,
        None,
    );
    projectile.velocity = DVec2::new(400.0, 0.0);
    sim.store.staged.projectiles.push(projectile);

    let events = step(&mut sim, 5);
    let destroys = events
        .iter()
        .filter(|e| e.target == victim && e.kind == EventKind::Destroy)
        .count();
    assert_eq!(destroys, 1);
}

#[test]
fn launched_craft_are_staged_and_appear_next_to_the_carrier() {
    let mut sim = base_sim(33);
    // Through the spawn path so the carrier's bays are filled.
    let carrier = sim
        .add_ship(
            &crate::types::DesignId("test_carrier".to_string()),
            &GovernmentId("republic".to_string()),
            "Roost".to_string(),
            Personality::default(),
        )
        .unwrap();
    {
        let ship = sim.store.ship_mut(carrier).unwrap();
        ship.place(DVec2::new(50.0, 50.0), DVec2::ZERO, 0.0);
        assert_eq!(ship.carried.len(), 2);
        ship.helm.launch = true;
    }

    let before = sim.store.ships.len();
    let mut frame = FrameSnapshot::default();
    sim.calculate_step(&mut frame, &InputCapture::default(), 0);

    assert_eq!(sim.store.ships.len(), before + 2, "both fighters launched");
    assert!(sim.store.ship(carrier).unwrap().carried.is_empty());
    for ship in &sim.store.ships {
        if ship.parent == Some(carrier) {
            assert!(ship.position.distance(DVec2::new(50.0, 50.0)) < 200.0);
            assert_eq!(ship.system, Some(SystemId("sol".to_string())));
        }
    }
}

#[test]
fn boarding_a_disabled_enemy_emits_board() {
    let mut sim = base_sim(34);
    let boarder = add_ship_at(&mut sim, "test_frigate", "pirate", DVec2::ZERO);
    let victim = add_ship_at(&mut sim, "test_freighter", "merchant", DVec2::new(30.0, 0.0));
    {
        let ship = sim.store.ship_mut(victim).unwrap();
        ship.hull = ship.min_hull - 1.0;
    }
    {
        let ship = sim.store.ship_mut(boarder).unwrap();
        ship.target = Some(victim);
        ship.helm.board = true;
    }

    let events = step(&mut sim, 1);
    assert!(events
        .iter()
        .any(|e| e.target == victim && e.kind == EventKind::Board));
}

#[test]
fn assisting_a_disabled_friend_emits_assist() {
    let mut sim = base_sim(35);
    let helper = add_ship_at(&mut sim, "test_frigate", "republic", DVec2::ZERO);
    let friend = add_ship_at(&mut sim, "test_freighter", "merchant", DVec2::new(30.0, 0.0));
    {
        let ship = sim.store.ship_mut(friend).unwrap();
        ship.hull = ship.min_hull - 1.0;
    }
    {
        let ship = sim.store.ship_mut(helper).unwrap();
        ship.target = Some(friend);
        ship.helm.board = true;
    }

    let events = step(&mut sim, 1);
    assert!(events
        .iter()
        .any(|e| e.target == friend && e.kind == EventKind::Assist));
}

#[test]
fn flagship_jump_enters_the_new_system() {
    let (mut sim, messages, audio) = sim_with_logs(36);
    let flagship = add_ship_at(&mut sim, "test_frigate", "player", DVec2::ZERO);
    sim.player.flagship = Some(flagship);
    {
        let ship = sim.store.ship_mut(flagship).unwrap();
        ship.target_system = Some(SystemId("alpha".to_string()));
        ship.helm.jump = true;
    }

    let events = step(&mut sim, 70);

    assert_eq!(sim.player.system, Some(SystemId("alpha".to_string())));
    assert!(sim.player.has_visited(&SystemId("alpha".to_string())));
    assert_eq!(sim.player.date.0, 1);
    assert!(events
        .iter()
        .any(|e| e.target == flagship && e.kind == EventKind::Jump));
    assert!(messages
        .drain()
        .iter()
        .any(|m| m.contains("Entering the Alpha system")));
    // Alpha has asteroid belts; the field was rebuilt on entry.
    assert!(!sim.asteroids.rocks.is_empty());
    assert!(!audio.drain().is_empty(), "departure sound requested");
}

#[test]
fn flotsam_pickup_is_narrated_for_the_flagship() {
    let (mut sim, messages, _audio) = sim_with_logs(37);
    let flagship = add_ship_at(&mut sim, "test_freighter", "player", DVec2::new(10.0, 0.0));
    sim.player.flagship = Some(flagship);
    sim.store.flotsam.push(crate::Flotsam::new(
        DVec2::ZERO,
        DVec2::ZERO,
        Payload::Commodity {
            name: "iron".to_string(),
            tons: 3,
        },
        None,
        600,
    ));

    step(&mut sim, 1);

    let ship = sim.store.ship(flagship).unwrap();
    assert_eq!(ship.cargo_used, 3);
    assert!(sim.store.flotsam.iter().all(crate::Flotsam::should_be_removed));
    let log = messages.drain();
    assert!(
        log.iter().any(|m| m.starts_with("You picked up") && m.contains("iron")),
        "{log:?}"
    );
}

#[test]
fn outfit_pickup_records_a_harvest() {
    let mut sim = base_sim(38);
    let collector = add_ship_at(&mut sim, "test_freighter", "player", DVec2::new(10.0, 0.0));
    sim.player.flagship = Some(collector);
    sim.store.flotsam.push(crate::Flotsam::new(
        DVec2::ZERO,
        DVec2::ZERO,
        Payload::Outfit {
            outfit: crate::types::OutfitId("salvaged-core".to_string()),
            count: 1,
        },
        None,
        600,
    ));

    step(&mut sim, 1);

    assert!(sim.player.harvested.contains(&(
        SystemId("sol".to_string()),
        crate::types::OutfitId("salvaged-core".to_string())
    )));
}

#[test]
fn flotsam_source_never_collects_its_own_jetsam() {
    let mut sim = base_sim(39);
    let source = add_ship_at(&mut sim, "test_freighter", "player", DVec2::new(10.0, 0.0));
    sim.store.flotsam.push(crate::Flotsam::new(
        DVec2::ZERO,
        DVec2::ZERO,
        Payload::Commodity {
            name: "iron".to_string(),
            tons: 3,
        },
        Some(source),
        600,
    ));

    step(&mut sim, 1);
    assert_eq!(sim.store.ship(source).unwrap().cargo_used, 0);
    assert!(!sim.store.flotsam.is_empty());
}

#[test]
fn scanning_emits_scan_events_once() {
    let mut sim = base_sim(40);
    let scout = add_ship_at(&mut sim, "test_scout", "republic", DVec2::ZERO);
    let subject = add_ship_at(&mut sim, "test_freighter", "merchant", DVec2::new(40.0, 0.0));
    sim.store.ship_mut(scout).unwrap().target = Some(subject);

    let events = step(&mut sim, 30);
    let outfit_scans = events
        .iter()
        .filter(|e| e.kind == EventKind::ScanOutfits && e.target == subject)
        .count();
    let cargo_scans = events
        .iter()
        .filter(|e| e.kind == EventKind::ScanCargo && e.target == subject)
        .count();
    assert_eq!(outfit_scans, 1, "outfit scan completes exactly once");
    assert_eq!(cargo_scans, 1, "cargo scan completes exactly once");
}

#[test]
fn identical_seeds_produce_identical_runs() {
    let run = |seed: u64| {
        let mut sim = base_sim(seed);
        let flagship = add_ship_at(&mut sim, "test_frigate", "player", DVec2::ZERO);
        sim.player.flagship = Some(flagship);
        add_ship_at(&mut sim, "test_fighter", "pirate", DVec2::new(400.0, 0.0));
        {
            let pirate_id = sim.store.ships[1].id;
            let flag = sim.store.ship_mut(flagship).unwrap();
            flag.target = Some(pirate_id);
            flag.helm.fire = true;
        }
        let events = step(&mut sim, 120);
        let positions: Vec<(u64, f64, f64)> = sim
            .store
            .ships
            .iter()
            .map(|s| (s.id.0, s.position.x, s.position.y))
            .collect();
        (serde_json::to_string(&events).unwrap(), format!("{positions:?}"))
    };
    assert_eq!(run(77), run(77));
}

#[test]
fn click_selects_the_nearest_targetable_ship() {
    let mut sim = base_sim(41);
    let flagship = add_ship_at(&mut sim, "test_frigate", "player", DVec2::ZERO);
    sim.player.flagship = Some(flagship);
    let near = add_ship_at(&mut sim, "test_fighter", "pirate", DVec2::new(200.0, 0.0));
    add_ship_at(&mut sim, "test_fighter", "pirate", DVec2::new(230.0, 0.0));

    let input = InputCapture {
        active: true,
        zoom: 1.0,
        click: Some(crate::types::ClickCapture {
            point: DVec2::new(200.0, 0.0),
            right: false,
            shift: false,
        }),
    };
    let mut frame = FrameSnapshot::default();
    sim.calculate_step(&mut frame, &input, 0);
    assert_eq!(sim.store.ship(flagship).unwrap().target, Some(near));
}

#[test]
fn mission_target_blinks_on_radar() {
    let mut sim = base_sim(42);
    let flagship = add_ship_at(&mut sim, "test_frigate", "player", DVec2::ZERO);
    sim.player.flagship = Some(flagship);
    let marked = add_ship_at(&mut sim, "test_fighter", "pirate", DVec2::new(300.0, 0.0));
    sim.store.ship_mut(marked).unwrap().personality = Personality {
        target: true,
        ..Personality::default()
    };

    // Step 0: (0 / 6) % 7 == 0, which is a blink frame.
    let mut frame = FrameSnapshot::default();
    sim.calculate_step(&mut frame, &InputCapture::default(), 0);
    assert!(frame
        .radar
        .iter()
        .any(|entry| entry.kind == crate::types::RadarKind::Blink));
}
