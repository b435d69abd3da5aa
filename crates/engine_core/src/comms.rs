//! Diplomacy and notification heuristics: ambient hails, and the per-faction
//! "grudge" bookkeeping behind assistance requests.

use std::collections::HashMap;

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::content::{Constants, WorldContent};
use crate::hooks::MessageSink;
use crate::player::PlayerState;
use crate::ship::Ship;
use crate::types::{GovernmentId, ShipId};

/// Per-government memory of the last ship that asked the player for help
/// against that government, plus a global request cooldown. The ship
/// reference is weak: it is revalidated against the live store on every use
/// and silently dropped once the requester is gone, disabled, or absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GrudgeBook {
    entries: HashMap<GovernmentId, ShipId>,
    pub cooldown: u32,
}

impl GrudgeBook {
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn tick(&mut self) {
        self.cooldown = self.cooldown.saturating_sub(1);
    }

    pub fn requester(&self, attacker: &GovernmentId) -> Option<ShipId> {
        self.entries.get(attacker).copied()
    }

    fn live_requester<'a>(
        &self,
        attacker: &GovernmentId,
        ships: &'a [Ship],
        player: &PlayerState,
    ) -> Option<&'a Ship> {
        let id = self.entries.get(attacker)?;
        ships.iter().find(|ship| {
            ship.id == *id
                && !ship.is_destroyed()
                && !ship.is_disabled()
                && ship.system == player.system
        })
    }
}

/// A ship of `attacker`'s government just damaged `ships[target_index]`.
/// Player-caused damage pays off an open request with a thank-you; NPC
/// damage may raise a new request if the fight is lopsided enough.
#[allow(clippy::too_many_arguments)]
pub(crate) fn update_grudge(
    grudges: &mut GrudgeBook,
    target_index: usize,
    attacker: &GovernmentId,
    ships: &[Ship],
    player: &PlayerState,
    content: &WorldContent,
    constants: &Constants,
    messages: &mut dyn MessageSink,
    rng: &mut dyn RngCore,
) {
    let target = &ships[target_index];

    if content.is_player(attacker) {
        if let Some(previous) = grudges.live_requester(&target.government, ships, player) {
            let government = content
                .government(&previous.government)
                .map_or("Unknown", |def| def.name.as_str());
            messages.notify(format!(
                "{government} ship \"{}\": Thank you for your assistance, Captain {}!",
                previous.name, player.last_name
            ));
            grudges.entries.remove(&target.government);
        }
        return;
    }
    if grudges.cooldown > 0 {
        return;
    }

    // An existing live, present, non-disabled requester suppresses new
    // requests for this government; a dead or absent one is forgotten.
    if grudges.entries.contains_key(attacker) {
        if grudges.live_requester(attacker, ships, player).is_some() {
            return;
        }
        grudges.entries.remove(attacker);
    }

    // Only ask for help against the player's enemies, from ships that are
    // neither player-owned nor hostile to the player, can speak, and share a
    // language with the player.
    if content.is_player(&target.government) {
        return;
    }
    if !content.hostile(attacker, &player.government) {
        return;
    }
    if content.hostile(&target.government, &player.government) {
        return;
    }
    if target.personality.mute {
        return;
    }
    let language = content
        .government(&target.government)
        .and_then(|def| def.language.as_deref());
    if !player.knows_language(language) {
        return;
    }

    // Compare the victim's strength against everything of the attacking
    // government currently targeting it.
    let target_strength = target.strength();
    let mut attacker_strength = 0.0;
    let mut attacker_count = 0u32;
    for ship in ships {
        if ship.government == *attacker && ship.target == Some(target.id) {
            attacker_count += 1;
            attacker_strength += ship.strength();
        }
    }
    if attacker_strength <= target_strength {
        return;
    }

    // Ask for help more often the more lopsided the battle is.
    let ratio = if target_strength > 0.0 {
        attacker_strength / target_strength - 1.0
    } else {
        10.0
    };
    if rng.gen::<f64>() * 10.0 > ratio {
        return;
    }

    grudges.entries.insert(attacker.clone(), target.id);
    grudges.cooldown = constants.grudge_cooldown;

    let target_government = content
        .government(&target.government)
        .map_or("Unknown", |def| def.name.as_str());
    let attacker_name = content
        .government(attacker)
        .map_or("Unknown", |def| def.name.as_str());
    let plural = if attacker_count == 1 { "ship" } else { "ships" };
    let message = if target.personality.heroic {
        let these = if attacker_count == 1 { "this" } else { "these" };
        format!(
            "{target_government} ship \"{}\": Please assist us in destroying {these} {attacker_name} {plural}.",
            target.name
        )
    } else {
        let article = if attacker_count == 1 { "a " } else { "" };
        format!(
            "{target_government} ship \"{}\": We are under attack by {article}{attacker_name} {plural}. Please assist us!",
            target.name
        )
    };
    messages.notify(message);
}

/// At random intervals, one in-system NPC ship sends an ambient hail.
pub(crate) fn send_hails(
    ships: &[Ship],
    player: &PlayerState,
    content: &WorldContent,
    constants: &Constants,
    messages: &mut dyn MessageSink,
    rng: &mut dyn RngCore,
) {
    if ships.is_empty() || player.dead || rng.gen_range(0..constants.hail_period) != 0 {
        return;
    }
    let source = &ships[rng.gen_range(0..ships.len())];

    if source.should_be_removed() || content.is_player(&source.government) {
        return;
    }
    if source.system != player.system {
        return;
    }
    if source.is_disabled() || source.crew == 0 || source.cloak >= 1.0 {
        return;
    }
    let Some(message) = source.hail.as_ref().filter(|m| !m.is_empty()) else {
        return;
    };

    let government = content
        .government(&source.government)
        .map_or("Unknown", |def| def.name.as_str());
    let tag = if source.name.is_empty() {
        format!("{} ({government})", source.design.model_name)
    } else {
        format!("{government} ship \"{}\"", source.name)
    };
    messages.notify(format!("{tag}: {message}"));
}
