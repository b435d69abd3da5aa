//! World-data loading, validation, and starting-state construction shared
//! between the runtime and the CLI.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use glam::DVec2;
use serde::Deserialize;

use engine_core::{
    BeltDef, Constants, DesignId, FleetChance, FleetDef, FleetId, GovernmentDef, GovernmentId,
    PersonDef, Personality, ShipDesign, Simulation, StellarObjectDef, SystemDef, SystemId,
    WeaponDef, WeaponId, WorldContent,
};

#[derive(Deserialize)]
struct GovernmentsFile {
    content_version: String,
    governments: Vec<GovernmentDef>,
}

#[derive(Deserialize)]
struct SystemsFile {
    systems: Vec<SystemDef>,
}

#[derive(Deserialize)]
struct FleetsFile {
    fleets: Vec<FleetDef>,
    #[serde(default)]
    persons: Vec<PersonDef>,
}

#[derive(Deserialize)]
struct ShipyardFile {
    weapons: Vec<WeaponDef>,
    designs: Vec<ShipDesign>,
}

/// Load the content catalog from a directory of JSON files.
pub fn load_content(content_dir: &str) -> Result<WorldContent> {
    let dir = Path::new(content_dir);
    let read = |name: &str| -> Result<String> {
        std::fs::read_to_string(dir.join(name)).with_context(|| format!("reading {name}"))
    };
    let constants: Constants =
        serde_json::from_str(&read("constants.json")?).context("parsing constants.json")?;
    let governments_file: GovernmentsFile =
        serde_json::from_str(&read("governments.json")?).context("parsing governments.json")?;
    let systems_file: SystemsFile =
        serde_json::from_str(&read("systems.json")?).context("parsing systems.json")?;
    let fleets_file: FleetsFile =
        serde_json::from_str(&read("fleets.json")?).context("parsing fleets.json")?;
    let shipyard_file: ShipyardFile =
        serde_json::from_str(&read("shipyard.json")?).context("parsing shipyard.json")?;

    Ok(WorldContent {
        content_version: governments_file.content_version,
        governments: governments_file
            .governments
            .into_iter()
            .map(|def| (def.id.clone(), def))
            .collect(),
        systems: systems_file
            .systems
            .into_iter()
            .map(|def| (def.id.clone(), def))
            .collect(),
        fleets: fleets_file
            .fleets
            .into_iter()
            .map(|def| (def.id.clone(), def))
            .collect(),
        persons: fleets_file.persons,
        weapons: shipyard_file
            .weapons
            .into_iter()
            .map(|def| (def.id.clone(), def))
            .collect(),
        designs: shipyard_file
            .designs
            .into_iter()
            .map(|def| (def.id.clone(), def))
            .collect(),
        constants,
    })
}

/// Validates cross-references in loaded content, panicking on any authoring
/// error. Catches mistakes like a fleet naming an unknown design or a system
/// link pointing at an unknown system.
#[allow(clippy::cognitive_complexity)]
pub fn validate_content(content: &WorldContent) {
    let player_governments = content
        .governments
        .values()
        .filter(|def| def.player)
        .count();
    assert!(
        player_governments == 1,
        "content must define exactly one player government, found {player_governments}",
    );

    for government in content.governments.values() {
        for enemy in &government.enemies {
            assert!(
                content.governments.contains_key(enemy),
                "government '{}' enemy '{}' is not a known government",
                government.id,
                enemy,
            );
        }
        if let Some(raid_fleet) = &government.raid_fleet {
            assert!(
                content.fleets.contains_key(raid_fleet),
                "government '{}' raid fleet '{}' is not a known fleet",
                government.id,
                raid_fleet,
            );
        }
    }

    for system in content.systems.values() {
        assert!(
            content.governments.contains_key(&system.government),
            "system '{}' government '{}' is not a known government",
            system.id,
            system.government,
        );
        for link in system.links.iter().chain(&system.neighbors) {
            assert!(
                content.systems.contains_key(link),
                "system '{}' links to unknown system '{}'",
                system.id,
                link,
            );
        }
        for chance in &system.fleets {
            assert!(
                content.fleets.contains_key(&chance.fleet),
                "system '{}' references unknown fleet '{}'",
                system.id,
                chance.fleet,
            );
            assert!(
                chance.period > 0,
                "system '{}' fleet '{}' must have a nonzero period",
                system.id,
                chance.fleet,
            );
        }
    }

    for fleet in content.fleets.values() {
        assert!(
            content.governments.contains_key(&fleet.government),
            "fleet '{}' government '{}' is not a known government",
            fleet.id,
            fleet.government,
        );
        for design in &fleet.ships {
            assert!(
                content.designs.contains_key(design),
                "fleet '{}' references unknown design '{}'",
                fleet.id,
                design,
            );
        }
    }

    for person in &content.persons {
        assert!(
            content.governments.contains_key(&person.government),
            "person '{}' government '{}' is not a known government",
            person.id,
            person.government,
        );
        assert!(
            content.designs.contains_key(&person.design),
            "person '{}' references unknown design '{}'",
            person.id,
            person.design,
        );
        if let Some(systems) = &person.systems {
            for system in systems {
                assert!(
                    content.systems.contains_key(system),
                    "person '{}' references unknown system '{}'",
                    person.id,
                    system,
                );
            }
        }
    }

    for design in content.designs.values() {
        for weapon in &design.weapons {
            assert!(
                content.weapons.contains_key(weapon),
                "design '{}' references unknown weapon '{}'",
                design.id,
                weapon,
            );
        }
        if let Some(bay_design) = &design.bay_design {
            assert!(
                content.designs.contains_key(bay_design),
                "design '{}' bay design '{}' is unknown",
                design.id,
                bay_design,
            );
        }
        if let Some(death_blast) = &design.death_blast {
            assert!(
                content.weapons.contains_key(death_blast),
                "design '{}' death blast '{}' is unknown",
                design.id,
                death_blast,
            );
        }
    }
}

fn demo_constants() -> Constants {
    Constants {
        hail_period: 600,
        person_period: 36_000,
        person_baseline: 1000,
        raid_period: 600,
        raid_draws: 10,
        raid_attraction_scale: 0.005,
        grudge_cooldown: 120,
        alarm_cooldown: 180,
        flotsam_pickup_radius: 5.0,
        boarding_range: 15.0,
        hyperspace_steps: 60,
        entry_fleet_draws: 5,
        entry_fleet_window: 60,
        collision_cell_size: 256.0,
        asteroid_wrap_extent: 4096.0,
        disabled_hull_fraction: 0.15,
        flotsam_lifetime: 600,
        boarding_cooldown: 120,
    }
}

fn demo_weapons() -> HashMap<WeaponId, WeaponDef> {
    let base = |id: &str| WeaponDef {
        id: WeaponId(id.to_string()),
        sprite: format!("projectile/{id}"),
        velocity: 12.0,
        lifetime: 40,
        reload: 15,
        shield_damage: 12.0,
        hull_damage: 9.0,
        heat_damage: 0.0,
        blast_radius: 0.0,
        trigger_radius: 0.0,
        safe: false,
        phasing: false,
        missile_strength: 0,
        homing_turn: 0.0,
        anti_missile: 0,
    };
    let mut weapons = HashMap::new();
    weapons.insert(WeaponId("pulse-cannon".to_string()), base("pulse-cannon"));
    weapons.insert(
        WeaponId("javelin-missile".to_string()),
        WeaponDef {
            velocity: 9.0,
            lifetime: 240,
            reload: 75,
            shield_damage: 30.0,
            hull_damage: 24.0,
            blast_radius: 50.0,
            trigger_radius: 15.0,
            missile_strength: 12,
            homing_turn: 0.05,
            ..base("javelin-missile")
        },
    );
    weapons.insert(
        WeaponId("point-defense".to_string()),
        WeaponDef {
            velocity: 10.0,
            lifetime: 30,
            reload: 12,
            shield_damage: 0.0,
            hull_damage: 0.0,
            anti_missile: 10,
            ..base("point-defense")
        },
    );
    weapons.insert(
        WeaponId("hull-breach".to_string()),
        WeaponDef {
            velocity: 0.0,
            lifetime: 1,
            reload: 1,
            shield_damage: 40.0,
            hull_damage: 40.0,
            blast_radius: 80.0,
            ..base("hull-breach")
        },
    );
    weapons
}

#[allow(clippy::too_many_lines)]
fn demo_designs() -> HashMap<DesignId, ShipDesign> {
    let base = |id: &str, model: &str| ShipDesign {
        id: DesignId(id.to_string()),
        model_name: model.to_string(),
        sprite: format!("ship/{id}"),
        radius: 20.0,
        cost: 900_000,
        mass: 180.0,
        max_hull: 900.0,
        max_shields: 700.0,
        shield_regen: 0.4,
        max_fuel: 600.0,
        max_energy: 400.0,
        energy_regen: 2.0,
        max_heat: 500.0,
        heat_dissipation: 1.2,
        thrust: 0.35,
        turn: 0.05,
        max_velocity: 4.5,
        crew: 12,
        required_crew: 4,
        cargo_space: 30,
        weapons: vec![WeaponId("pulse-cannon".to_string())],
        bays: 0,
        bay_design: None,
        outfit_scan: 0.0,
        cargo_scan: 0.0,
        cloak_rate: 0.0,
        has_jump_drive: false,
        death_blast: Some(WeaponId("hull-breach".to_string())),
    };
    let mut designs = HashMap::new();
    designs.insert(
        DesignId("dart".to_string()),
        ShipDesign {
            radius: 8.0,
            cost: 120_000,
            mass: 40.0,
            max_hull: 220.0,
            max_shields: 120.0,
            max_velocity: 7.5,
            turn: 0.09,
            crew: 1,
            required_crew: 1,
            cargo_space: 5,
            ..base("dart", "Dart")
        },
    );
    designs.insert(
        DesignId("lance".to_string()),
        ShipDesign {
            weapons: vec![
                WeaponId("pulse-cannon".to_string()),
                WeaponId("javelin-missile".to_string()),
                WeaponId("point-defense".to_string()),
            ],
            ..base("lance", "Lance")
        },
    );
    designs.insert(
        DesignId("hauler".to_string()),
        ShipDesign {
            radius: 26.0,
            cost: 450_000,
            max_hull: 650.0,
            max_shields: 250.0,
            max_velocity: 3.2,
            cargo_space: 180,
            weapons: vec![],
            ..base("hauler", "Hauler")
        },
    );
    designs.insert(
        DesignId("warden".to_string()),
        ShipDesign {
            radius: 34.0,
            cost: 2_400_000,
            max_hull: 2000.0,
            max_shields: 1500.0,
            max_velocity: 3.0,
            bays: 2,
            bay_design: Some(DesignId("dart".to_string())),
            outfit_scan: 0.2,
            cargo_scan: 0.2,
            ..base("warden", "Warden")
        },
    );
    designs
}

/// A compact hand-authored starting world: three systems, four
/// governments, and enough traffic to make a battle happen.
#[allow(clippy::too_many_lines)]
pub fn demo_content() -> WorldContent {
    let mut governments = HashMap::new();
    governments.insert(
        GovernmentId("player".to_string()),
        GovernmentDef {
            id: GovernmentId("player".to_string()),
            name: "Player".to_string(),
            player: true,
            language: None,
            enemies: vec![GovernmentId("marauder".to_string())],
            hails: vec![],
            raid_fleet: None,
        },
    );
    governments.insert(
        GovernmentId("concord".to_string()),
        GovernmentDef {
            id: GovernmentId("concord".to_string()),
            name: "Concord".to_string(),
            player: false,
            language: None,
            enemies: vec![GovernmentId("marauder".to_string())],
            hails: vec![
                "Patrol route clear. Safe travels, captain.".to_string(),
                "Keep your weapons cold in Concord space.".to_string(),
            ],
            raid_fleet: Some(FleetId("marauder-raid".to_string())),
        },
    );
    governments.insert(
        GovernmentId("marauder".to_string()),
        GovernmentDef {
            id: GovernmentId("marauder".to_string()),
            name: "Marauder".to_string(),
            player: false,
            language: None,
            enemies: vec![
                GovernmentId("player".to_string()),
                GovernmentId("concord".to_string()),
                GovernmentId("guild".to_string()),
            ],
            hails: vec!["Nice hull. Shame if something happened to it.".to_string()],
            raid_fleet: None,
        },
    );
    governments.insert(
        GovernmentId("guild".to_string()),
        GovernmentDef {
            id: GovernmentId("guild".to_string()),
            name: "Trade Guild".to_string(),
            player: false,
            language: None,
            enemies: vec![],
            hails: vec!["Guild convoy on schedule, please keep clear.".to_string()],
            raid_fleet: None,
        },
    );

    let mut fleets = HashMap::new();
    fleets.insert(
        FleetId("guild-convoy".to_string()),
        FleetDef {
            id: FleetId("guild-convoy".to_string()),
            government: GovernmentId("guild".to_string()),
            ships: vec![
                DesignId("hauler".to_string()),
                DesignId("hauler".to_string()),
                DesignId("lance".to_string()),
            ],
        },
    );
    fleets.insert(
        FleetId("concord-patrol".to_string()),
        FleetDef {
            id: FleetId("concord-patrol".to_string()),
            government: GovernmentId("concord".to_string()),
            ships: vec![DesignId("lance".to_string()), DesignId("dart".to_string())],
        },
    );
    fleets.insert(
        FleetId("marauder-pack".to_string()),
        FleetDef {
            id: FleetId("marauder-pack".to_string()),
            government: GovernmentId("marauder".to_string()),
            ships: vec![
                DesignId("dart".to_string()),
                DesignId("dart".to_string()),
                DesignId("dart".to_string()),
            ],
        },
    );
    fleets.insert(
        FleetId("marauder-raid".to_string()),
        FleetDef {
            id: FleetId("marauder-raid".to_string()),
            government: GovernmentId("marauder".to_string()),
            ships: vec![DesignId("lance".to_string()), DesignId("dart".to_string())],
        },
    );

    let mut systems = HashMap::new();
    systems.insert(
        SystemId("harbor".to_string()),
        SystemDef {
            id: SystemId("harbor".to_string()),
            name: "Harbor".to_string(),
            position: DVec2::new(0.0, 0.0),
            government: GovernmentId("concord".to_string()),
            links: vec![SystemId("reach".to_string()), SystemId("drift".to_string())],
            neighbors: vec![SystemId("reach".to_string()), SystemId("drift".to_string())],
            objects: vec![StellarObjectDef {
                name: "Anchorage".to_string(),
                sprite: "planet/anchorage".to_string(),
                position: DVec2::new(550.0, 300.0),
                radius: 110.0,
                landable: true,
            }],
            fleets: vec![
                FleetChance {
                    fleet: FleetId("guild-convoy".to_string()),
                    period: 1200,
                },
                FleetChance {
                    fleet: FleetId("concord-patrol".to_string()),
                    period: 900,
                },
                FleetChance {
                    fleet: FleetId("marauder-pack".to_string()),
                    period: 2400,
                },
            ],
            asteroids: vec![BeltDef {
                count: 12,
                energy: 0.8,
                minable: false,
                commodity: None,
            }],
            inhabited: true,
        },
    );
    systems.insert(
        SystemId("reach".to_string()),
        SystemDef {
            id: SystemId("reach".to_string()),
            name: "Reach".to_string(),
            position: DVec2::new(120.0, -40.0),
            government: GovernmentId("marauder".to_string()),
            links: vec![SystemId("harbor".to_string())],
            neighbors: vec![SystemId("harbor".to_string()), SystemId("drift".to_string())],
            objects: vec![],
            fleets: vec![FleetChance {
                fleet: FleetId("marauder-pack".to_string()),
                period: 600,
            }],
            asteroids: vec![
                BeltDef {
                    count: 20,
                    energy: 1.2,
                    minable: false,
                    commodity: None,
                },
                BeltDef {
                    count: 4,
                    energy: 0.6,
                    minable: true,
                    commodity: Some("silicon".to_string()),
                },
            ],
            inhabited: false,
        },
    );
    systems.insert(
        SystemId("drift".to_string()),
        SystemDef {
            id: SystemId("drift".to_string()),
            name: "Drift".to_string(),
            position: DVec2::new(-90.0, 80.0),
            government: GovernmentId("guild".to_string()),
            links: vec![SystemId("harbor".to_string())],
            neighbors: vec![SystemId("harbor".to_string()), SystemId("reach".to_string())],
            objects: vec![StellarObjectDef {
                name: "Ledger Station".to_string(),
                sprite: "planet/ledger".to_string(),
                position: DVec2::new(-400.0, 150.0),
                radius: 60.0,
                landable: true,
            }],
            fleets: vec![FleetChance {
                fleet: FleetId("guild-convoy".to_string()),
                period: 800,
            }],
            asteroids: vec![],
            inhabited: true,
        },
    );

    let persons = vec![PersonDef {
        id: engine_core::PersonId("old-lighthouse".to_string()),
        name: "Old Lighthouse".to_string(),
        government: GovernmentId("guild".to_string()),
        design: DesignId("warden".to_string()),
        personality: Personality {
            uninterested: true,
            ..Personality::default()
        },
        hail: Some("Forty years on this route and the stars still surprise me.".to_string()),
        frequency: 120,
        systems: None,
    }];

    WorldContent {
        content_version: "demo-1".to_string(),
        governments,
        systems,
        fleets,
        persons,
        weapons: demo_weapons(),
        designs: demo_designs(),
        constants: demo_constants(),
    }
}

/// Place the player's starting fleet in the Harbor system and run the
/// system-entry lifecycle so the world is populated on frame one.
pub fn deploy_start(sim: &mut Simulation) {
    let player = GovernmentId("player".to_string());
    let flagship = sim.add_ship(
        &DesignId("lance".to_string()),
        &player,
        "Long Odds".to_string(),
        Personality::default(),
    );
    sim.player.flagship = flagship;
    sim.add_ship(
        &DesignId("hauler".to_string()),
        &player,
        "Margin Call".to_string(),
        Personality {
            escort: true,
            ..Personality::default()
        },
    );
    if let Some(flagship) = flagship {
        if let Some(ship) = sim.store.ship_mut(flagship) {
            ship.place(DVec2::new(520.0, 280.0), DVec2::ZERO, 0.0);
        }
    }
    sim.enter_system();
    // Entry spawns are staged; fold them in before the first frame.
    sim.store.merge_staged();
}
