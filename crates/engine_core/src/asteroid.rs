//! The asteroid field: drifting belt rocks that occlude projectiles, and
//! minable asteroids that shatter into flotsam.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::collision::segment_circle;
use crate::content::{BeltDef, Constants};
use crate::flotsam::{Flotsam, Payload};
use crate::projectile::Projectile;
use crate::visual::Visual;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rock {
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Minable {
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
    pub hull: f64,
    pub commodity: String,
    pub shattered: bool,
}

/// First thing a projectile's travel segment meets in the field.
#[derive(Debug, Clone, Copy)]
pub struct AsteroidHit {
    pub fraction: f64,
    pub velocity: DVec2,
    /// Index of the minable that was struck, if it was one.
    pub minable: Option<usize>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AsteroidField {
    pub rocks: Vec<Rock>,
    pub minables: Vec<Minable>,
    extent: f64,
}

impl AsteroidField {
    /// Rebuild the field from a system's belt definitions. Called on system
    /// entry; the old field is discarded.
    pub fn reset(&mut self, belts: &[BeltDef], constants: &Constants, rng: &mut (impl Rng + ?Sized)) {
        self.rocks.clear();
        self.minables.clear();
        self.extent = constants.asteroid_wrap_extent;
        for belt in belts {
            for _ in 0..belt.count {
                let position = DVec2::new(
                    rng.gen_range(-self.extent..self.extent),
                    rng.gen_range(-self.extent..self.extent),
                );
                let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                let speed = rng.gen_range(0.2..1.0) * belt.energy;
                let velocity = DVec2::new(angle.cos(), angle.sin()) * speed;
                if belt.minable {
                    let radius = rng.gen_range(12.0..28.0);
                    self.minables.push(Minable {
                        position,
                        velocity,
                        radius,
                        hull: radius * 40.0,
                        commodity: belt.commodity.clone().unwrap_or_else(|| "ore".to_string()),
                        shattered: false,
                    });
                } else {
                    self.rocks.push(Rock {
                        position,
                        velocity,
                        radius: rng.gen_range(8.0..20.0),
                    });
                }
            }
        }
    }

    fn wrap(extent: f64, position: &mut DVec2) {
        if extent <= 0.0 {
            return;
        }
        let span = 2.0 * extent;
        for axis in [&mut position.x, &mut position.y] {
            if *axis < -extent {
                *axis += span;
            } else if *axis > extent {
                *axis -= span;
            }
        }
    }

    /// Move everything one step. Minables shattered during the last collision
    /// pass burst here, emitting a visual and staging their payload.
    pub fn step(&mut self, visuals: &mut Vec<Visual>, flotsam: &mut Vec<Flotsam>, constants: &Constants) {
        let extent = self.extent;
        for rock in &mut self.rocks {
            rock.position += rock.velocity;
            Self::wrap(extent, &mut rock.position);
        }
        for minable in &mut self.minables {
            if minable.shattered {
                visuals.push(Visual::new("effect/shatter", minable.position, minable.velocity, 24));
                flotsam.push(Flotsam::new(
                    minable.position,
                    minable.velocity,
                    Payload::Commodity {
                        name: minable.commodity.clone(),
                        tons: (minable.radius / 4.0).max(1.0) as u32,
                    },
                    None,
                    constants.flotsam_lifetime,
                ));
                continue;
            }
            minable.position += minable.velocity;
            Self::wrap(extent, &mut minable.position);
        }
        self.minables.retain(|minable| !minable.shattered);
    }

    /// Closest intersection along the projectile's travel this step, if any
    /// beats `closest`.
    pub fn collide(&self, projectile: &Projectile, closest: f64) -> Option<AsteroidHit> {
        let mut best: Option<AsteroidHit> = None;
        let mut best_fraction = closest;
        for rock in &self.rocks {
            if let Some(fraction) =
                segment_circle(projectile.position, projectile.velocity, rock.position, rock.radius)
            {
                if fraction < best_fraction {
                    best_fraction = fraction;
                    best = Some(AsteroidHit {
                        fraction,
                        velocity: rock.velocity,
                        minable: None,
                    });
                }
            }
        }
        for (index, minable) in self.minables.iter().enumerate() {
            if minable.shattered {
                continue;
            }
            if let Some(fraction) = segment_circle(
                projectile.position,
                projectile.velocity,
                minable.position,
                minable.radius,
            ) {
                if fraction < best_fraction {
                    best_fraction = fraction;
                    best = Some(AsteroidHit {
                        fraction,
                        velocity: minable.velocity,
                        minable: Some(index),
                    });
                }
            }
        }
        best
    }

    /// Apply weapon damage to a minable; marks it shattered at zero hull.
    pub fn damage_minable(&mut self, index: usize, hull_damage: f64) {
        if let Some(minable) = self.minables.get_mut(index) {
            minable.hull -= hull_damage;
            if minable.hull <= 0.0 {
                minable.shattered = true;
            }
        }
    }
}
