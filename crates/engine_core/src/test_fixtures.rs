//! Shared content and simulation fixtures for tests (and, behind the
//! `test-support` feature, for downstream crates' tests).

use std::collections::HashMap;

use glam::DVec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::content::{
    BeltDef, Constants, FleetChance, FleetDef, GovernmentDef, PersonDef, ShipDesign,
    StellarObjectDef, SystemDef, WeaponDef, WorldContent,
};
use crate::hooks::{AudioLog, ControlContext, MessageLog, ShipController};
use crate::player::PlayerState;
use crate::ship::Ship;
use crate::sim::Simulation;
use crate::types::{
    DesignId, FleetId, GovernmentId, PersonId, Personality, ShipId, SystemId, WeaponId,
};

pub fn base_constants() -> Constants {
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

fn weapon(id: &str) -> WeaponDef {
    WeaponDef {
        id: WeaponId(id.to_string()),
        sprite: format!("projectile/{id}"),
        velocity: 12.0,
        lifetime: 40,
        reload: 15,
        shield_damage: 10.0,
        hull_damage: 8.0,
        heat_damage: 0.0,
        blast_radius: 0.0,
        trigger_radius: 0.0,
        safe: false,
        phasing: false,
        missile_strength: 0,
        homing_turn: 0.0,
        anti_missile: 0,
    }
}

fn design(id: &str, model: &str) -> ShipDesign {
    ShipDesign {
        id: DesignId(id.to_string()),
        model_name: model.to_string(),
        sprite: format!("ship/{id}"),
        radius: 20.0,
        cost: 1_000_000,
        mass: 200.0,
        max_hull: 1000.0,
        max_shields: 800.0,
        shield_regen: 0.5,
        max_fuel: 600.0,
        max_energy: 400.0,
        energy_regen: 2.0,
        max_heat: 500.0,
        heat_dissipation: 1.0,
        thrust: 0.4,
        turn: 0.06,
        max_velocity: 5.0,
        crew: 20,
        required_crew: 5,
        cargo_space: 40,
        weapons: vec![WeaponId("blaster".to_string())],
        bays: 0,
        bay_design: None,
        outfit_scan: 0.0,
        cargo_scan: 0.0,
        cloak_rate: 0.0,
        has_jump_drive: false,
        death_blast: Some(WeaponId("shipwreck".to_string())),
    }
}

#[allow(clippy::too_many_lines)]
pub fn base_content() -> WorldContent {
    let mut weapons = HashMap::new();
    weapons.insert(WeaponId("blaster".to_string()), weapon("blaster"));
    weapons.insert(
        WeaponId("missile".to_string()),
        WeaponDef {
            velocity: 8.0,
            lifetime: 200,
            reload: 60,
            shield_damage: 25.0,
            hull_damage: 20.0,
            missile_strength: 10,
            homing_turn: 0.05,
            ..weapon("missile")
        },
    );
    weapons.insert(
        WeaponId("torpedo".to_string()),
        WeaponDef {
            velocity: 6.0,
            lifetime: 300,
            reload: 90,
            shield_damage: 60.0,
            hull_damage: 50.0,
            blast_radius: 100.0,
            trigger_radius: 25.0,
            missile_strength: 20,
            homing_turn: 0.03,
            ..weapon("torpedo")
        },
    );
    weapons.insert(
        WeaponId("safe-torpedo".to_string()),
        WeaponDef {
            blast_radius: 100.0,
            shield_damage: 60.0,
            hull_damage: 50.0,
            safe: true,
            ..weapon("safe-torpedo")
        },
    );
    weapons.insert(
        WeaponId("phase-lance".to_string()),
        WeaponDef {
            velocity: 20.0,
            lifetime: 30,
            phasing: true,
            shield_damage: 30.0,
            hull_damage: 25.0,
            ..weapon("phase-lance")
        },
    );
    weapons.insert(
        WeaponId("antimissile".to_string()),
        WeaponDef {
            velocity: 10.0,
            lifetime: 30,
            reload: 10,
            shield_damage: 0.0,
            hull_damage: 0.0,
            anti_missile: 12,
            ..weapon("antimissile")
        },
    );
    weapons.insert(
        WeaponId("shipwreck".to_string()),
        WeaponDef {
            velocity: 0.0,
            lifetime: 1,
            reload: 1,
            shield_damage: 30.0,
            hull_damage: 30.0,
            blast_radius: 60.0,
            ..weapon("shipwreck")
        },
    );

    let mut designs = HashMap::new();
    designs.insert(
        DesignId("test_fighter".to_string()),
        ShipDesign {
            radius: 8.0,
            cost: 100_000,
            mass: 40.0,
            max_hull: 200.0,
            max_shields: 100.0,
            max_velocity: 7.0,
            crew: 1,
            required_crew: 1,
            cargo_space: 10,
            ..design("test_fighter", "Sparrow")
        },
    );
    designs.insert(
        DesignId("test_frigate".to_string()),
        ShipDesign {
            weapons: vec![
                WeaponId("blaster".to_string()),
                WeaponId("missile".to_string()),
                WeaponId("antimissile".to_string()),
            ],
            ..design("test_frigate", "Firebrand")
        },
    );
    designs.insert(
        DesignId("test_freighter".to_string()),
        ShipDesign {
            radius: 24.0,
            cost: 500_000,
            max_hull: 600.0,
            max_shields: 300.0,
            max_velocity: 3.5,
            cargo_space: 200,
            weapons: vec![],
            ..design("test_freighter", "Mule")
        },
    );
    designs.insert(
        DesignId("test_carrier".to_string()),
        ShipDesign {
            radius: 36.0,
            cost: 2_500_000,
            max_hull: 2200.0,
            max_shields: 1600.0,
            max_velocity: 3.0,
            bays: 2,
            bay_design: Some(DesignId("test_fighter".to_string())),
            ..design("test_carrier", "Aerie")
        },
    );
    designs.insert(
        DesignId("test_scout".to_string()),
        ShipDesign {
            radius: 10.0,
            cost: 300_000,
            max_velocity: 8.0,
            outfit_scan: 0.4,
            cargo_scan: 0.4,
            weapons: vec![],
            ..design("test_scout", "Kestrel")
        },
    );

    let mut governments = HashMap::new();
    governments.insert(
        GovernmentId("player".to_string()),
        GovernmentDef {
            id: GovernmentId("player".to_string()),
            name: "Player".to_string(),
            player: true,
            language: None,
            enemies: vec![GovernmentId("pirate".to_string())],
            hails: vec![],
            raid_fleet: None,
        },
    );
    governments.insert(
        GovernmentId("republic".to_string()),
        GovernmentDef {
            id: GovernmentId("republic".to_string()),
            name: "Republic".to_string(),
            player: false,
            language: None,
            enemies: vec![GovernmentId("pirate".to_string())],
            hails: vec!["Keep your distance from the shipping lanes.".to_string()],
            raid_fleet: Some(FleetId("pirate_raid".to_string())),
        },
    );
    governments.insert(
        GovernmentId("pirate".to_string()),
        GovernmentDef {
            id: GovernmentId("pirate".to_string()),
            name: "Pirate".to_string(),
            player: false,
            language: None,
            enemies: vec![
                GovernmentId("player".to_string()),
                GovernmentId("republic".to_string()),
                GovernmentId("merchant".to_string()),
            ],
            hails: vec!["Hand over your cargo and nobody gets hurt.".to_string()],
            raid_fleet: None,
        },
    );
    governments.insert(
        GovernmentId("merchant".to_string()),
        GovernmentDef {
            id: GovernmentId("merchant".to_string()),
            name: "Merchant".to_string(),
            player: false,
            language: None,
            enemies: vec![],
            hails: vec!["Fine goods at fair prices, captain.".to_string()],
            raid_fleet: None,
        },
    );

    let mut fleets = HashMap::new();
    fleets.insert(
        FleetId("pirate_raiders".to_string()),
        FleetDef {
            id: FleetId("pirate_raiders".to_string()),
            government: GovernmentId("pirate".to_string()),
            ships: vec![
                DesignId("test_fighter".to_string()),
                DesignId("test_fighter".to_string()),
            ],
        },
    );
    fleets.insert(
        FleetId("merchant_convoy".to_string()),
        FleetDef {
            id: FleetId("merchant_convoy".to_string()),
            government: GovernmentId("merchant".to_string()),
            ships: vec![DesignId("test_freighter".to_string())],
        },
    );
    fleets.insert(
        FleetId("pirate_raid".to_string()),
        FleetDef {
            id: FleetId("pirate_raid".to_string()),
            government: GovernmentId("pirate".to_string()),
            ships: vec![DesignId("test_frigate".to_string())],
        },
    );

    let mut systems = HashMap::new();
    systems.insert(
        SystemId("sol".to_string()),
        SystemDef {
            id: SystemId("sol".to_string()),
            name: "Sol".to_string(),
            position: DVec2::new(0.0, 0.0),
            government: GovernmentId("republic".to_string()),
            links: vec![SystemId("alpha".to_string())],
            neighbors: vec![SystemId("alpha".to_string())],
            objects: vec![StellarObjectDef {
                name: "Earth".to_string(),
                sprite: "planet/earth".to_string(),
                position: DVec2::new(600.0, 350.0),
                radius: 120.0,
                landable: true,
            }],
            fleets: vec![
                FleetChance {
                    fleet: FleetId("merchant_convoy".to_string()),
                    period: 2000,
                },
                FleetChance {
                    fleet: FleetId("pirate_raiders".to_string()),
                    period: 3000,
                },
            ],
            asteroids: vec![],
            inhabited: true,
        },
    );
    systems.insert(
        SystemId("alpha".to_string()),
        SystemDef {
            id: SystemId("alpha".to_string()),
            name: "Alpha".to_string(),
            position: DVec2::new(100.0, 50.0),
            government: GovernmentId("pirate".to_string()),
            links: vec![SystemId("sol".to_string())],
            neighbors: vec![SystemId("sol".to_string())],
            objects: vec![],
            fleets: vec![],
            asteroids: vec![
                BeltDef {
                    count: 8,
                    energy: 1.0,
                    minable: false,
                    commodity: None,
                },
                BeltDef {
                    count: 2,
                    energy: 0.5,
                    minable: true,
                    commodity: Some("silicon".to_string()),
                },
            ],
            inhabited: false,
        },
    );

    let persons = vec![PersonDef {
        id: PersonId("wandering_trader".to_string()),
        name: "Marginal Profit".to_string(),
        government: GovernmentId("merchant".to_string()),
        design: DesignId("test_freighter".to_string()),
        personality: Personality {
            uninterested: true,
            ..Personality::default()
        },
        hail: Some("We buy low and sell high, mostly low.".to_string()),
        frequency: 100,
        systems: None,
    }];

    WorldContent {
        content_version: "test-1".to_string(),
        governments,
        systems,
        fleets,
        persons,
        weapons,
        designs,
        constants: base_constants(),
    }
}

/// Build a plain ship of the given design and government, id'd explicitly.
pub fn build_ship(content: &WorldContent, id: u64, design_id: &str, government: &str) -> Ship {
    let design = content
        .design(&DesignId(design_id.to_string()))
        .unwrap_or_else(|| panic!("fixture design '{design_id}' missing"));
    Ship::build(
        ShipId(id),
        format!("Test {id}"),
        design,
        GovernmentId(government.to_string()),
        Personality::default(),
        Some(SystemId("sol".to_string())),
        content,
        &content.constants,
    )
}

/// Minimal drift controller: integrates velocity, regenerates shields, and
/// sequences hyperspace transits. Enough physics to exercise the pipeline
/// without any AI.
pub struct DriftController;

impl ShipController for DriftController {
    fn update(&mut self, ship: &mut Ship, _ctx: &mut ControlContext<'_>) {
        if ship.is_destroyed() {
            return;
        }
        if ship.hyperspace > 0 {
            ship.hyperspace -= 1;
            if ship.hyperspace == 0 {
                if let Some(destination) = ship.target_system.take() {
                    ship.system = Some(destination);
                    ship.position = -ship.facing_unit() * 2000.0;
                    ship.velocity = ship.facing_unit() * ship.design.max_velocity;
                }
            }
        } else if ship.helm.jump && ship.target_system.is_some() {
            ship.hyperspace = 60;
        }
        ship.position += ship.velocity;
        ship.shields = (ship.shields + ship.design.shield_regen).min(ship.design.max_shields);
        ship.heat = (ship.heat - ship.design.heat_dissipation).max(0.0);
    }
}

/// A fully wired simulation over the fixture content, seeded for
/// reproducibility.
pub fn base_sim(seed: u64) -> Simulation {
    let content = base_content();
    let player = PlayerState::new(
        GovernmentId("player".to_string()),
        SystemId("sol".to_string()),
    );
    Simulation::new(
        content,
        player,
        Box::new(DriftController),
        Box::new(crate::hooks::NullAudio),
        Box::new(crate::hooks::NullMessages),
        Box::new(ChaCha8Rng::seed_from_u64(seed)),
    )
}

/// Like [`base_sim`], with shared message/audio logs for assertions.
pub fn sim_with_logs(seed: u64) -> (Simulation, MessageLog, AudioLog) {
    let content = base_content();
    let player = PlayerState::new(
        GovernmentId("player".to_string()),
        SystemId("sol".to_string()),
    );
    let messages = MessageLog::new();
    let audio = AudioLog::new();
    let sim = Simulation::new(
        content,
        player,
        Box::new(DriftController),
        Box::new(audio.clone()),
        Box::new(messages.clone()),
        Box::new(ChaCha8Rng::seed_from_u64(seed)),
    );
    (sim, messages, audio)
}
