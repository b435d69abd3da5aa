//! Spatial collision index, rebuilt every step from ship positions.
//!
//! A uniform grid keyed by cell coordinates. Each entry is registered in the
//! single cell containing its center; queries widen their cell range by the
//! largest registered radius so nothing straddling a boundary is missed.
//! Cells are visited in coordinate order and results are returned in store
//! order, so query results are deterministic for a given state.

use ahash::AHashMap;
use glam::DVec2;

use crate::ship::Ship;
use crate::types::{GovernmentId, ShipId};

/// Typed registry entry returned by queries. Never a raw pointer: damage is
/// applied back through the store index.
#[derive(Debug, Clone)]
pub struct CollisionEntry {
    pub ship: ShipId,
    /// Index into the live ship vector at build time.
    pub index: usize,
    pub position: DVec2,
    pub velocity: DVec2,
    pub radius: f64,
    pub government: GovernmentId,
}

#[derive(Debug, Default)]
pub struct CollisionIndex {
    cell_size: f64,
    cells: AHashMap<(i32, i32), Vec<usize>>,
    entries: Vec<CollisionEntry>,
    max_radius: f64,
}

impl CollisionIndex {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cell_size,
            cells: AHashMap::new(),
            entries: Vec::new(),
            max_radius: 0.0,
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.entries.clear();
        self.max_radius = 0.0;
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cell_of(&self, position: DVec2) -> (i32, i32) {
        (
            (position.x / self.cell_size).floor() as i32,
            (position.y / self.cell_size).floor() as i32,
        )
    }

    pub fn add(&mut self, index: usize, ship: &Ship) {
        let entry = CollisionEntry {
            ship: ship.id,
            index,
            position: ship.position,
            velocity: ship.velocity,
            radius: ship.design.radius,
            government: ship.government.clone(),
        };
        self.max_radius = self.max_radius.max(entry.radius);
        let cell = self.cell_of(entry.position);
        let slot = self.entries.len();
        self.entries.push(entry);
        self.cells.entry(cell).or_default().push(slot);
    }

    fn cell_range(&self, min: DVec2, max: DVec2) -> (i32, i32, i32, i32) {
        let pad = self.max_radius;
        let lo = self.cell_of(min - DVec2::splat(pad));
        let hi = self.cell_of(max + DVec2::splat(pad));
        (lo.0, lo.1, hi.0, hi.1)
    }

    /// All entries whose hit circle intersects the given circle, in store
    /// order.
    pub fn circle(&self, center: DVec2, radius: f64) -> Vec<&CollisionEntry> {
        let (x0, y0, x1, y1) = self.cell_range(center - DVec2::splat(radius), center + DVec2::splat(radius));
        let mut hits: Vec<usize> = Vec::new();
        for x in x0..=x1 {
            for y in y0..=y1 {
                let Some(slots) = self.cells.get(&(x, y)) else {
                    continue;
                };
                for &slot in slots {
                    let entry = &self.entries[slot];
                    let reach = radius + entry.radius;
                    if entry.position.distance_squared(center) <= reach * reach {
                        hits.push(slot);
                    }
                }
            }
        }
        hits.sort_unstable_by_key(|&slot| self.entries[slot].index);
        hits.into_iter().map(|slot| &self.entries[slot]).collect()
    }

    /// First entry intersecting the travel segment `start → start + velocity`.
    /// Returns the entry and the hit fraction in [0, 1); an origin already
    /// inside a hit circle reports fraction 0. Ties at the same fraction go to
    /// the earlier store index.
    pub fn line(&self, start: DVec2, velocity: DVec2) -> Option<(&CollisionEntry, f64)> {
        let end = start + velocity;
        let (x0, y0, x1, y1) = self.cell_range(start.min(end), start.max(end));
        let mut best: Option<(usize, f64)> = None;
        for x in x0..=x1 {
            for y in y0..=y1 {
                let Some(slots) = self.cells.get(&(x, y)) else {
                    continue;
                };
                for &slot in slots {
                    let entry = &self.entries[slot];
                    let Some(fraction) = segment_circle(start, velocity, entry.position, entry.radius)
                    else {
                        continue;
                    };
                    let better = match best {
                        None => true,
                        Some((best_slot, best_fraction)) => {
                            fraction < best_fraction
                                || (fraction <= best_fraction
                                    && self.entries[slot].index < self.entries[best_slot].index)
                        }
                    };
                    if better {
                        best = Some((slot, fraction));
                    }
                }
            }
        }
        best.map(|(slot, fraction)| (&self.entries[slot], fraction))
    }
}

/// Earliest `t` in [0, 1) where `start + t * velocity` touches the circle, or
/// `None` if the segment misses entirely. A start point already inside the
/// circle yields 0.
pub(crate) fn segment_circle(start: DVec2, velocity: DVec2, center: DVec2, radius: f64) -> Option<f64> {
    let offset = start - center;
    if offset.length_squared() <= radius * radius {
        return Some(0.0);
    }
    let a = velocity.length_squared();
    if a <= f64::EPSILON {
        return None;
    }
    let b = offset.dot(velocity);
    let c = offset.length_squared() - radius * radius;
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let t = (-b - discriminant.sqrt()) / a;
    (0.0..1.0).contains(&t).then_some(t)
}
