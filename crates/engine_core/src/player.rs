//! Persistent player/world state the engine reads and incrementally
//! mutates: date, visited systems, travel plan, harvest bookkeeping.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ship::Ship;
use crate::types::{GovernmentId, OutfitId, ShipId, SystemId};

/// In-game calendar: one day per system entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDate(pub u64);

impl GameDate {
    pub fn advance(&mut self) {
        self.0 += 1;
    }
}

impl std::fmt::Display for GameDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "day {}", self.0)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerState {
    pub government: GovernmentId,
    pub flagship: Option<ShipId>,
    pub system: Option<SystemId>,
    pub credits: i64,
    pub date: GameDate,
    pub last_name: String,
    pub visited: HashSet<SystemId>,
    pub travel_plan: Vec<SystemId>,
    /// Mission-state flags, e.g. `language: drak` gates who will hail you.
    pub conditions: HashSet<String>,
    /// Outfits harvested from flotsam, per system.
    pub harvested: HashSet<(SystemId, OutfitId)>,
    pub dead: bool,
}

impl PlayerState {
    pub fn new(government: GovernmentId, system: SystemId) -> Self {
        Self {
            government,
            flagship: None,
            system: Some(system),
            credits: 0,
            date: GameDate::default(),
            last_name: "Captain".to_string(),
            visited: HashSet::new(),
            travel_plan: Vec::new(),
            conditions: HashSet::new(),
            harvested: HashSet::new(),
            dead: false,
        }
    }

    pub fn knows_language(&self, language: Option<&str>) -> bool {
        match language {
            None => true,
            Some(lang) => self.conditions.contains(&format!("language: {lang}")),
        }
    }

    pub fn visit(&mut self, system: SystemId) {
        self.visited.insert(system);
    }

    pub fn has_visited(&self, system: &SystemId) -> bool {
        self.visited.contains(system)
    }

    pub fn harvest(&mut self, system: SystemId, outfit: OutfitId) {
        self.harvested.insert((system, outfit));
    }

    /// Pop the travel plan when the planned system is reached.
    pub fn update_travel_plan(&mut self) {
        if let (Some(current), Some(next)) = (&self.system, self.travel_plan.last()) {
            if current == next {
                self.travel_plan.pop();
            }
        }
    }

    /// How tempting and how defended the player's fleet looks to raiders:
    /// (attraction from cargo capacity, deterrence from armed hulls).
    pub fn raid_factors(&self, ships: &[Ship]) -> (f64, f64) {
        let mut attraction = 0.0;
        let mut deterrence = 0.0;
        for ship in ships {
            if ship.government != self.government || ship.is_destroyed() {
                continue;
            }
            attraction += f64::from(ship.design.cargo_space).sqrt() * 0.2;
            deterrence += ship
                .hardpoints
                .iter()
                .map(|hp| (hp.weapon.shield_damage + hp.weapon.hull_damage) / 100.0)
                .sum::<f64>();
        }
        (attraction, deterrence)
    }
}
