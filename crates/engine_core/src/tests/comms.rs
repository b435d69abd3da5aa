use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::comms::{send_hails, update_grudge, GrudgeBook};
use crate::hooks::MessageLog;
use crate::player::PlayerState;
use crate::ship::Ship;
use crate::test_fixtures::{base_content, build_ship};
use crate::types::{GovernmentId, SystemId};

fn pirate() -> GovernmentId {
    GovernmentId("pirate".to_string())
}

fn player_state() -> PlayerState {
    PlayerState::new(GovernmentId("player".to_string()), SystemId("sol".to_string()))
}

/// A merchant victim at index 0 and three pirate frigates locked onto it —
/// lopsided enough that the probability draw always succeeds.
fn lopsided_battle(content: &crate::WorldContent) -> Vec<Ship> {
    let mut ships = Vec::new();
    let victim = build_ship(content, 0, "test_freighter", "merchant");
    let victim_id = victim.id;
    ships.push(victim);
    for i in 1..=3 {
        let mut attacker = build_ship(content, i, "test_frigate", "pirate");
        attacker.target = Some(victim_id);
        ships.push(attacker);
    }
    ships
}

#[test]
fn lopsided_attack_raises_an_assistance_request() {
    let content = base_content();
    let player = player_state();
    let ships = lopsided_battle(&content);
    let mut grudges = GrudgeBook::default();
    let log = MessageLog::new();
    let mut sink = log.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(1);

    update_grudge(
        &mut grudges,
        0,
        &pirate(),
        &ships,
        &player,
        &content,
        &content.constants,
        &mut sink,
        &mut rng,
    );

    assert_eq!(grudges.requester(&pirate()), Some(ships[0].id));
    assert_eq!(grudges.cooldown, content.constants.grudge_cooldown);
    let messages = log.drain();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Please assist us"), "{messages:?}");
}

#[test]
fn live_requester_suppresses_further_requests() {
    let content = base_content();
    let player = player_state();
    let mut ships = lopsided_battle(&content);
    // A second merchant under the same kind of attack.
    let second = build_ship(&content, 10, "test_freighter", "merchant");
    let second_id = second.id;
    ships.push(second);
    for ship in &mut ships {
        if ship.government == pirate() && ship.target.is_none() {
            ship.target = Some(second_id);
        }
    }

    let mut grudges = GrudgeBook::default();
    let log = MessageLog::new();
    let mut sink = log.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    update_grudge(
        &mut grudges,
        0,
        &pirate(),
        &ships,
        &player,
        &content,
        &content.constants,
        &mut sink,
        &mut rng,
    );
    let first_requester = grudges.requester(&pirate());
    assert!(first_requester.is_some());
    log.drain();

    // Retarget the pirates at the second merchant and attack it. The global
    // cooldown is cleared so only the live-requester rule can suppress.
    for ship in &mut ships {
        if ship.government == pirate() {
            ship.target = Some(second_id);
        }
    }
    grudges.cooldown = 0;
    update_grudge(
        &mut grudges,
        4,
        &pirate(),
        &ships,
        &player,
        &content,
        &content.constants,
        &mut sink,
        &mut rng,
    );
    assert_eq!(grudges.requester(&pirate()), first_requester);
    assert!(log.drain().is_empty(), "no second request while the first ship lives");
}

#[test]
fn disabled_requester_frees_the_slot() {
    let content = base_content();
    let player = player_state();
    let mut ships = lopsided_battle(&content);
    let second = build_ship(&content, 10, "test_freighter", "merchant");
    let second_id = second.id;
    ships.push(second);

    let mut grudges = GrudgeBook::default();
    let log = MessageLog::new();
    let mut sink = log.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    update_grudge(
        &mut grudges,
        0,
        &pirate(),
        &ships,
        &player,
        &content,
        &content.constants,
        &mut sink,
        &mut rng,
    );
    assert_eq!(grudges.requester(&pirate()), Some(ships[0].id));
    log.drain();

    // The requester goes down; a later qualifying attack on the second
    // merchant may raise a new request.
    ships[0].hull = ships[0].min_hull - 1.0;
    assert!(ships[0].is_disabled());
    for ship in &mut ships {
        if ship.government == pirate() {
            ship.target = Some(second_id);
        }
    }
    grudges.cooldown = 0;
    update_grudge(
        &mut grudges,
        4,
        &pirate(),
        &ships,
        &player,
        &content,
        &content.constants,
        &mut sink,
        &mut rng,
    );
    assert_eq!(grudges.requester(&pirate()), Some(second_id));
    assert_eq!(log.drain().len(), 1);
}

#[test]
fn cooldown_suppresses_even_without_a_live_requester() {
    let content = base_content();
    let player = player_state();
    let ships = lopsided_battle(&content);
    let mut grudges = GrudgeBook::default();
    grudges.cooldown = 50;
    let log = MessageLog::new();
    let mut sink = log.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    update_grudge(
        &mut grudges,
        0,
        &pirate(),
        &ships,
        &player,
        &content,
        &content.constants,
        &mut sink,
        &mut rng,
    );
    assert_eq!(grudges.requester(&pirate()), None);
    assert!(log.drain().is_empty());
}

#[test]
fn player_damage_triggers_thanks_and_clears_the_entry() {
    let content = base_content();
    let player = player_state();
    let ships = lopsided_battle(&content);
    let mut grudges = GrudgeBook::default();
    let log = MessageLog::new();
    let mut sink = log.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    update_grudge(
        &mut grudges,
        0,
        &pirate(),
        &ships,
        &player,
        &content,
        &content.constants,
        &mut sink,
        &mut rng,
    );
    assert!(grudges.requester(&pirate()).is_some());
    log.drain();

    // The player shoots one of the pirates; the requester says thanks.
    update_grudge(
        &mut grudges,
        1,
        &GovernmentId("player".to_string()),
        &ships,
        &player,
        &content,
        &content.constants,
        &mut sink,
        &mut rng,
    );
    assert_eq!(grudges.requester(&pirate()), None);
    let messages = log.drain();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].contains("Thank you for your assistance"), "{messages:?}");
}

#[test]
fn mute_ships_never_ask_for_help() {
    let content = base_content();
    let player = player_state();
    let mut ships = lopsided_battle(&content);
    ships[0].personality.mute = true;
    let mut grudges = GrudgeBook::default();
    let log = MessageLog::new();
    let mut sink = log.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    update_grudge(
        &mut grudges,
        0,
        &pirate(),
        &ships,
        &player,
        &content,
        &content.constants,
        &mut sink,
        &mut rng,
    );
    assert_eq!(grudges.requester(&pirate()), None);
    assert!(log.drain().is_empty());
}

#[test]
fn ambient_hail_from_a_talkative_ship() {
    let mut content = base_content();
    content.constants.hail_period = 1;
    let player = player_state();
    let mut ship = build_ship(&content, 0, "test_freighter", "merchant");
    ship.hail = Some("Fine goods at fair prices, captain.".to_string());
    let ships = vec![ship];

    let log = MessageLog::new();
    let mut sink = log.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    send_hails(&ships, &player, &content, &content.constants, &mut sink, &mut rng);

    let messages = log.drain();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Merchant ship \"Test 0\":"), "{messages:?}");
    assert!(messages[0].contains("Fine goods"));
}

#[test]
fn cloaked_and_disabled_ships_stay_silent() {
    let mut content = base_content();
    content.constants.hail_period = 1;
    let player = player_state();
    let mut cloaked = build_ship(&content, 0, "test_freighter", "merchant");
    cloaked.hail = Some("hello".to_string());
    cloaked.cloak = 1.0;
    let ships = vec![cloaked];

    let log = MessageLog::new();
    let mut sink = log.clone();
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    send_hails(&ships, &player, &content, &content.constants, &mut sink, &mut rng);
    assert!(log.drain().is_empty());
}
