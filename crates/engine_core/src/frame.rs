//! Frame assembly: the render-ready snapshot built from post-step state.
//!
//! Everything the render thread needs is copied out here; it never touches
//! the entity collections.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::ship::Ship;
use crate::sim::Simulation;
use crate::types::{RadarKind, SoundKey};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DrawItem {
    pub sprite: String,
    pub position: DVec2,
    /// Facing unit vector; renderers rotate the sprite to match.
    pub unit: DVec2,
    /// Scale, also used for landing/takeoff shrink.
    pub scale: f64,
    /// Cloak alpha in [0, 1]; 1 is fully transparent.
    pub cloak: f64,
    pub frame: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RadarEntry {
    pub kind: RadarKind,
    pub position: DVec2,
    pub size: f64,
}

/// Direction arrow toward a neighboring system.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RadarPointer {
    pub kind: RadarKind,
    pub direction: DVec2,
}

/// Shield/hull ring overlay for one ship.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StatusRing {
    pub position: DVec2,
    pub shields: f64,
    pub hull: f64,
    pub radius: f64,
    pub hostile: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TargetReticle {
    pub position: DVec2,
    pub facing: f64,
    pub radius: f64,
    pub kind: RadarKind,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetHud {
    pub name: String,
    pub model: String,
    pub government: String,
    pub shields: f64,
    pub hull: f64,
    pub kind: RadarKind,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HudInfo {
    pub location: String,
    pub date: String,
    pub credits: i64,
    pub fuel: f64,
    pub energy: f64,
    pub heat: f64,
    pub shields: f64,
    pub hull: f64,
    pub navigation_mode: String,
    pub destination: String,
    pub target: Option<TargetHud>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub step: u64,
    pub zoom: f64,
    pub center: DVec2,
    pub center_velocity: DVec2,
    pub draw: Vec<DrawItem>,
    pub radar: Vec<RadarEntry>,
    pub radar_pointers: Vec<RadarPointer>,
    pub statuses: Vec<StatusRing>,
    pub targets: Vec<TargetReticle>,
    pub hud: HudInfo,
    pub jump_flash: bool,
    /// Flagship sprite to outline, when highlighting is on.
    pub highlight: Option<String>,
    /// Worker calculation load, averaged over the last 60 frames.
    pub load: f64,
}

impl FrameSnapshot {
    pub fn clear(&mut self, step: u64, zoom: f64) {
        self.step = step;
        self.zoom = zoom;
        self.draw.clear();
        self.radar.clear();
        self.radar_pointers.clear();
        self.statuses.clear();
        self.targets.clear();
        self.hud = HudInfo::default();
        self.jump_flash = false;
        self.highlight = None;
    }
}

/// Radar classification for one ship. Mission targets double-blink a few
/// times a second; overheated ships flicker inactive.
pub(crate) fn radar_kind(sim: &Simulation, ship: &Ship, step: u64) -> RadarKind {
    if ship.personality.target && !ship.is_destroyed() {
        let count = (step / 6) % 7;
        if count == 0 || count == 2 {
            return RadarKind::Blink;
        }
    }
    let overheated = ship.heat > ship.design.max_heat;
    if ship.is_disabled() || (overheated && (step / 20) % 2 == 1) {
        return RadarKind::Inactive;
    }
    let player_government = &sim.player.government;
    let hostile = sim.content.hostile(&ship.government, player_government);
    if ship.government == *player_government || (ship.personality.escort && !hostile) {
        return RadarKind::Player;
    }
    if !hostile {
        return RadarKind::Friendly;
    }
    let targeting_player = ship
        .target
        .and_then(|id| sim.store.ship(id))
        .is_some_and(|target| target.government == *player_government);
    if targeting_player {
        RadarKind::Hostile
    } else {
        RadarKind::Unfriendly
    }
}

fn add_ship_sprites(frame: &mut FrameSnapshot, ship: &Ship) {
    frame.draw.push(DrawItem {
        sprite: ship.design.sprite.clone(),
        position: ship.position,
        unit: ship.facing_unit(),
        scale: ship.zoom,
        cloak: ship.cloak,
        frame: 0,
    });
}

#[allow(clippy::cognitive_complexity)]
fn fill_radar(sim: &mut Simulation, frame: &mut FrameSnapshot, step: u64) {
    let Some(system_id) = sim.player.system.clone() else {
        return;
    };
    let Some(system) = sim.content.system(&system_id) else {
        return;
    };

    for object in &system.objects {
        let radius = (object.radius * 0.03 + 0.5).max(2.0);
        let kind = if object.landable {
            RadarKind::Friendly
        } else {
            RadarKind::Inactive
        };
        frame.radar.push(RadarEntry {
            kind,
            position: object.position,
            size: radius,
        });
    }

    let flagship = sim.player.flagship.and_then(|id| sim.store.ship(id));
    if let Some(flagship) = flagship {
        let links = if flagship.design.has_jump_drive {
            &system.neighbors
        } else {
            &system.links
        };
        let target_system = flagship.target_system.clone();
        for link in links {
            let Some(neighbor) = sim.content.system(link) else {
                continue;
            };
            let kind = if Some(link) == target_system.as_ref() {
                RadarKind::Special
            } else {
                RadarKind::Inactive
            };
            frame.radar_pointers.push(RadarPointer {
                kind,
                direction: neighbor.position - system.position,
            });
        }
    }

    let flagship_target = flagship.and_then(|f| f.target);
    let mut has_hostiles = false;
    for ship in &sim.store.ships {
        if ship.system.as_ref() != Some(&system_id) || ship.should_be_removed() {
            continue;
        }
        let is_player = ship.government == sim.player.government;
        if ship.cloak >= 1.0 && !is_player {
            continue;
        }
        let kind = if Some(ship.id) == flagship_target {
            RadarKind::Special
        } else {
            radar_kind(sim, ship, step)
        };
        frame.radar.push(RadarEntry {
            kind,
            position: ship.position,
            size: ship.radar_size(),
        });

        has_hostiles |= !ship.is_disabled()
            && sim.content.hostile(&ship.government, &sim.player.government)
            && ship
                .target
                .and_then(|id| sim.store.ship(id))
                .is_some_and(|t| t.government == sim.player.government);
    }

    // New hostile contact sounds the siren, then re-arms after a cooldown.
    if sim.alarm_time > 0 {
        sim.alarm_time -= 1;
    } else if has_hostiles && !sim.had_hostiles {
        sim.audio.play(SoundKey::Alarm, None);
        sim.alarm_time = sim.content.constants.alarm_cooldown;
        sim.had_hostiles = true;
    } else if !has_hostiles {
        sim.had_hostiles = false;
    }

    for projectile in &sim.store.projectiles {
        if projectile.missile_strength() > 0 {
            let hostile = projectile
                .government
                .as_ref()
                .is_some_and(|gov| sim.content.hostile(gov, &sim.player.government));
            frame.radar.push(RadarEntry {
                kind: if hostile {
                    RadarKind::Special
                } else {
                    RadarKind::Inactive
                },
                position: projectile.position,
                size: 1.0,
            });
        } else if projectile.weapon.blast_radius > 0.0 {
            frame.radar.push(RadarEntry {
                kind: RadarKind::Special,
                position: projectile.position,
                size: 1.8,
            });
        }
    }
}

fn fill_hud(sim: &Simulation, frame: &mut FrameSnapshot, step: u64) {
    let hud = &mut frame.hud;
    hud.date = sim.player.date.to_string();
    hud.credits = sim.player.credits;
    if let Some(system) = sim
        .player
        .system
        .as_ref()
        .and_then(|id| sim.content.system(id))
    {
        hud.location = system.name.clone();
    }

    let Some(flagship) = sim.player.flagship.and_then(|id| sim.store.ship(id)) else {
        return;
    };
    let design = &flagship.design;
    hud.fuel = flagship.fuel / design.max_fuel.max(1.0);
    hud.energy = flagship.energy / design.max_energy.max(1.0);
    hud.heat = (flagship.heat / design.max_heat.max(1.0)).min(1.0);
    hud.shields = flagship.shields / design.max_shields.max(1.0);
    hud.hull = flagship.hull / design.max_hull.max(1.0);

    let jumping = flagship.helm.jump || flagship.is_hyperspacing();
    if let (Some(object_index), false) = (flagship.target_object, jumping) {
        let object = sim
            .player
            .system
            .as_ref()
            .and_then(|id| sim.content.system(id))
            .and_then(|system| system.objects.get(object_index));
        if let Some(object) = object {
            hud.navigation_mode = if object.landable {
                "Can land on:".to_string()
            } else {
                "Cannot land on:".to_string()
            };
            hud.destination = object.name.clone();
            frame.targets.push(TargetReticle {
                position: object.position - frame.center,
                facing: 0.0,
                radius: object.radius,
                kind: if object.landable {
                    RadarKind::Friendly
                } else {
                    RadarKind::Hostile
                },
            });
        }
    } else if let Some(target_system) = &flagship.target_system {
        hud.navigation_mode = "Hyperspace:".to_string();
        hud.destination = if sim.player.has_visited(target_system) {
            sim.content
                .system(target_system)
                .map_or_else(|| "unexplored system".to_string(), |s| s.name.clone())
        } else {
            "unexplored system".to_string()
        };
    } else {
        hud.navigation_mode = "Navigation:".to_string();
        hud.destination = "no destination".to_string();
    }

    if let Some(target) = flagship.target.and_then(|id| sim.store.ship(id)) {
        let kind = radar_kind(sim, target, step);
        let government = sim
            .content
            .government(&target.government)
            .map_or_else(|| "No Government".to_string(), |def| def.name.clone());
        hud.target = Some(TargetHud {
            name: target.name.clone(),
            model: target.design.model_name.clone(),
            government,
            shields: target.shields / target.design.max_shields.max(1.0),
            hull: target.hull / target.design.max_hull.max(1.0),
            kind,
        });
        if target.system == sim.player.system && target.is_targetable() {
            frame.targets.push(TargetReticle {
                position: target.position - frame.center,
                facing: target.facing,
                radius: target.design.radius,
                kind,
            });
        }
        // Scan progress ring around the target being scanned.
        if flagship.scan_target == Some(target.id)
            && (flagship.outfit_scan > 0.0 || flagship.cargo_scan > 0.0)
            && (flagship.outfit_scan < 1.0 || flagship.cargo_scan < 1.0)
        {
            frame.statuses.push(StatusRing {
                position: target.position - frame.center,
                shields: flagship.outfit_scan.min(1.0),
                hull: flagship.cargo_scan.min(1.0),
                radius: target.design.radius + 10.0,
                hostile: false,
            });
        }
    }
}

/// Build the renderable snapshot from the post-step world.
#[allow(clippy::too_many_lines)]
pub(crate) fn assemble(sim: &mut Simulation, frame: &mut FrameSnapshot, step: u64) {
    let Some(system_id) = sim.player.system.clone() else {
        return;
    };

    let flagship = sim.player.flagship.and_then(|id| sim.store.ship(id));
    if let Some(flagship) = flagship {
        frame.center = flagship.position;
        frame.center_velocity = flagship.velocity;
        if !flagship.is_destroyed() {
            frame.highlight = Some(flagship.design.sprite.clone());
        }
    }

    fill_radar(sim, frame, step);

    if let Some(system) = sim.content.system(&system_id) {
        for object in &system.objects {
            frame.draw.push(DrawItem {
                sprite: object.sprite.clone(),
                position: object.position,
                unit: DVec2::X,
                scale: 1.0,
                cloak: 0.0,
                frame: 0,
            });
        }
    }
    for rock in &sim.asteroids.rocks {
        frame.draw.push(DrawItem {
            sprite: "asteroid/rock".to_string(),
            position: rock.position,
            unit: DVec2::X,
            scale: rock.radius / 16.0,
            cloak: 0.0,
            frame: 0,
        });
    }
    for minable in &sim.asteroids.minables {
        frame.draw.push(DrawItem {
            sprite: "asteroid/minable".to_string(),
            position: minable.position,
            unit: DVec2::X,
            scale: minable.radius / 16.0,
            cloak: 0.0,
            frame: 0,
        });
    }
    for flotsam in &sim.store.flotsam {
        if flotsam.should_be_removed() {
            continue;
        }
        frame.draw.push(DrawItem {
            sprite: "effect/flotsam".to_string(),
            position: flotsam.position,
            unit: DVec2::X,
            scale: 1.0,
            cloak: 0.0,
            frame: 0,
        });
    }

    // Ships, flagship drawn last so it sits on top.
    let flagship_id = sim.player.flagship;
    for ship in &sim.store.ships {
        if ship.system.as_ref() != Some(&system_id)
            || ship.should_be_removed()
            || Some(ship.id) == flagship_id
        {
            continue;
        }
        add_ship_sprites(frame, ship);
        let is_player = ship.government == sim.player.government;
        let hostile = sim.content.hostile(&ship.government, &sim.player.government);
        if ship.cloak < 1.0 && (hostile || is_player || ship.personality.escort) {
            frame.statuses.push(StatusRing {
                position: ship.position - frame.center,
                shields: ship.shields / ship.design.max_shields.max(1.0),
                hull: ship.hull / ship.design.max_hull.max(1.0),
                radius: ship.design.radius.max(20.0),
                hostile,
            });
        }
    }
    if let Some(flagship) = flagship_id.and_then(|id| sim.store.ship(id)) {
        if !flagship.should_be_removed() {
            add_ship_sprites(frame, flagship);
        }
    }

    for projectile in &sim.store.projectiles {
        if projectile.should_be_removed() {
            continue;
        }
        frame.draw.push(DrawItem {
            sprite: projectile.weapon.sprite.clone(),
            position: projectile.position,
            unit: DVec2::new(projectile.facing.cos(), projectile.facing.sin()),
            scale: 1.0,
            cloak: 0.0,
            frame: 0,
        });
    }
    for visual in &sim.store.visuals {
        if visual.should_be_removed() {
            continue;
        }
        frame.draw.push(DrawItem {
            sprite: visual.sprite.clone(),
            position: visual.position,
            unit: DVec2::X,
            scale: 1.0,
            cloak: 0.0,
            frame: visual.frame,
        });
    }

    fill_hud(sim, frame, step);
}
