//! The per-step pipeline: prune → move → spawn → merge → collide → collect
//! → scan → assemble. Deterministic given the same seed and inputs; all
//! randomness flows through the owned RNG, all side effects through the
//! collaborator sinks.

use glam::DVec2;
use rand::{Rng, RngCore};

use crate::asteroid::AsteroidField;
use crate::collision::CollisionIndex;
use crate::combat::{collect_flotsam, record_harvest, resolve_projectile, ResolveCtx, ResolveOut};
use crate::comms::GrudgeBook;
use crate::content::WorldContent;
use crate::flotsam::Payload;
use crate::frame::FrameSnapshot;
use crate::hooks::{AudioSink, ControlContext, MessageSink, ShipController};
use crate::player::PlayerState;
use crate::ship::{Ship, ShipObs};
use crate::store::EntityStore;
use crate::types::{
    Counters, EventKind, EventSource, InputCapture, Personality, ShipEvent, ShipId, SoundKey,
};

pub struct Simulation {
    pub content: WorldContent,
    pub store: EntityStore,
    pub asteroids: AsteroidField,
    pub player: PlayerState,
    pub grudges: GrudgeBook,
    pub counters: Counters,
    pub(crate) events: Vec<ShipEvent>,
    pub(crate) controller: Box<dyn ShipController>,
    pub(crate) audio: Box<dyn AudioSink>,
    pub(crate) messages: Box<dyn MessageSink>,
    pub(crate) rng: Box<dyn RngCore + Send>,
    pub(crate) ship_index: CollisionIndex,
    pub(crate) cloaked_index: CollisionIndex,
    has_anti_missile: Vec<ShipId>,
    pub(crate) alarm_time: u32,
    pub(crate) had_hostiles: bool,
    /// A JUMP event is owed as soon as the flagship settles in the new
    /// system.
    do_enter: bool,
    do_flash: bool,
}

impl Simulation {
    pub fn new(
        content: WorldContent,
        player: PlayerState,
        controller: Box<dyn ShipController>,
        audio: Box<dyn AudioSink>,
        messages: Box<dyn MessageSink>,
        rng: Box<dyn RngCore + Send>,
    ) -> Self {
        let cell = content.constants.collision_cell_size;
        Self {
            content,
            store: EntityStore::default(),
            asteroids: AsteroidField::default(),
            player,
            grudges: GrudgeBook::default(),
            counters: Counters::default(),
            events: Vec::new(),
            controller,
            audio,
            messages,
            rng,
            ship_index: CollisionIndex::new(cell),
            cloaked_index: CollisionIndex::new(cell),
            has_anti_missile: Vec::new(),
            alarm_time: 0,
            had_hostiles: false,
            do_enter: false,
            do_flash: false,
        }
    }

    pub fn flagship(&self) -> Option<&Ship> {
        self.player.flagship.and_then(|id| self.store.ship(id))
    }

    /// Events accumulated since the last drain, handed to the foreground
    /// once per frame.
    pub fn drain_events(&mut self) -> Vec<ShipEvent> {
        std::mem::take(&mut self.events)
    }

    /// Spawn a ship of the given design directly into the live store.
    /// Used for initial placement, before the first step runs.
    pub fn add_ship(
        &mut self,
        design_id: &crate::types::DesignId,
        government: &crate::types::GovernmentId,
        name: String,
        personality: Personality,
    ) -> Option<ShipId> {
        let system = self.player.system.clone()?;
        let ship = crate::spawn::materialize_ship(
            &self.content,
            &mut self.counters,
            design_id,
            government,
            name,
            personality,
            &system,
            &mut *self.rng,
        )?;
        let id = ship.id;
        self.store.ships.push(ship);
        Some(id)
    }

    /// System-entry lifecycle: date advance, visited marking, arrival
    /// notification, asteroid reset, initial population, the entry raid
    /// check, and clearing of transient state.
    pub fn enter_system(&mut self) {
        let Some(system_id) = self.player.system.clone() else {
            return;
        };
        let Some(system) = self.content.system(&system_id).cloned() else {
            return;
        };
        self.do_enter = true;
        self.player.date.advance();
        self.player.visit(system_id.clone());
        self.player.update_travel_plan();
        let habitation = if system.inhabited {
            "."
        } else {
            ". No inhabited planets detected."
        };
        self.messages.notify(format!(
            "Entering the {} system on {}{habitation}",
            system.name, self.player.date
        ));

        self.asteroids
            .reset(&system.asteroids, &self.content.constants, &mut *self.rng);

        // Place a few periods' worth of traffic so the system is not empty
        // on arrival.
        let constants = &self.content.constants;
        for _ in 0..constants.entry_fleet_draws {
            for chance in &system.fleets {
                if chance.period == 0 {
                    continue;
                }
                if self.rng.gen_range(0..chance.period) < constants.entry_fleet_window {
                    if let Some(fleet) = self.content.fleet(&chance.fleet) {
                        crate::spawn::place_fleet(
                            fleet,
                            &self.content,
                            &system_id,
                            &mut self.store.staged.ships,
                            &mut self.counters,
                            &mut *self.rng,
                        );
                    }
                }
            }
        }
        crate::spawn::spawn_raids(
            &mut self.store,
            &self.content,
            &system,
            &self.player,
            &mut self.counters,
            &mut *self.messages,
            &mut *self.rng,
            true,
        );

        self.grudges.clear();
        self.store.projectiles.clear();
        self.store.visuals.clear();
        self.store.flotsam.clear();
        // Cancel whatever ships emitted mid-step; staged ships survive.
        self.store.staged.projectiles.clear();
        self.store.staged.visuals.clear();
        self.store.staged.flotsam.clear();
    }

    /// Run one full calculation into `frame`. `input` is the foreground
    /// capture for this frame; `step` the frame counter at `go()` time.
    #[allow(clippy::too_many_lines, clippy::cognitive_complexity)]
    pub fn calculate_step(&mut self, frame: &mut FrameSnapshot, input: &InputCapture, step: u64) {
        frame.clear(step, input.zoom);
        if self.player.system.is_none() {
            return;
        }

        self.store.prune();

        let observations: Vec<ShipObs> = self.store.ships.iter().map(Ship::observe).collect();
        let flagship_was_hyperspacing =
            self.flagship().is_some_and(Ship::is_hyperspacing);

        for i in 0..self.store.ships.len() {
            self.move_ship(i, &observations, step);
        }

        // Flagship just engaged its drive: one-shot departure sound.
        if !flagship_was_hyperspacing {
            if let Some(flagship) = self.flagship() {
                if flagship.is_hyperspacing() {
                    let key = if flagship.design.has_jump_drive {
                        SoundKey::JumpDrive
                    } else {
                        SoundKey::Hyperdrive
                    };
                    self.audio.play(key, None);
                }
            }
        }
        // Flagship arrived somewhere new: switch the active system.
        let flagship_system = self
            .flagship()
            .filter(|flagship| flagship.system != self.player.system)
            .map(|flagship| flagship.system.clone());
        if let Some(system) = flagship_system {
            self.do_flash = true;
            self.player.system = system;
            self.enter_system();
        }

        {
            let EntityStore {
                flotsam,
                visuals,
                staged,
                ..
            } = &mut self.store;
            self.asteroids
                .step(&mut staged.visuals, &mut staged.flotsam, &self.content.constants);
            for item in flotsam.iter_mut() {
                item.advance();
            }
            for visual in visuals.iter_mut() {
                visual.advance();
            }
        }
        // Projectiles home on their target's post-move position.
        let targets: ahash::AHashMap<ShipId, (DVec2, DVec2)> = self
            .store
            .ships
            .iter()
            .filter(|ship| ship.is_targetable())
            .map(|ship| (ship.id, (ship.position, ship.velocity)))
            .collect();
        for projectile in &mut self.store.projectiles {
            let lock = projectile.target.and_then(|id| targets.get(&id)).copied();
            projectile.advance(lock);
        }

        self.run_spawners();
        {
            let constants = &self.content.constants;
            crate::comms::send_hails(
                &self.store.ships,
                &self.player,
                &self.content,
                constants,
                &mut *self.messages,
                &mut *self.rng,
            );
        }
        // Clicks are only honored while the game has focus.
        if input.active {
            self.handle_clicks(input);
        }

        self.grudges.tick();
        // Index before the merge, resolve after it: projectiles fired this
        // step get their first travel leg tested, while newly staged ships
        // cannot yet be hit.
        self.fill_collision_sets();
        self.store.merge_staged();
        self.resolve_combat();

        // The pending JUMP event fires once the flagship is settled.
        if self.do_enter {
            if let Some(flagship) = self.flagship() {
                if flagship.in_flight() && !flagship.is_hyperspacing() {
                    let id = flagship.id;
                    self.do_enter = false;
                    self.events.push(ShipEvent {
                        source: EventSource::Ship(id),
                        target: id,
                        kind: EventKind::Jump,
                    });
                }
            }
        }

        frame.jump_flash = std::mem::take(&mut self.do_flash);
        crate::frame::assemble(self, frame, step);
    }

    /// Move one ship and run its action side effects: destruction
    /// reporting, hyperspace sounds, boarding, launching, and firing.
    fn move_ship(&mut self, i: usize, observations: &[ShipObs], step: u64) {
        let player_system = self.player.system.clone();
        let flagship_id = self.player.flagship;
        let (was_here, was_hyperspacing) = {
            let ship = &self.store.ships[i];
            (ship.system == player_system, ship.is_hyperspacing())
        };

        {
            let EntityStore { ships, staged, .. } = &mut self.store;
            let mut ctx = ControlContext {
                step,
                player_system: player_system.as_ref(),
                others: observations,
                visuals: &mut staged.visuals,
                flotsam: &mut staged.flotsam,
                rng: &mut *self.rng,
            };
            self.controller.update(&mut ships[i], &mut ctx);
        }

        let ship = &mut self.store.ships[i];
        if ship.should_be_removed() {
            // Record the destruction even if the ship did itself in.
            if !ship.destroy_reported {
                ship.destroy_reported = true;
                let id = ship.id;
                self.events.push(ShipEvent {
                    source: EventSource::None,
                    target: id,
                    kind: EventKind::Destroy,
                });
            }
            return;
        }

        // Hyperspace arrival/departure sounds for ships other than the
        // flagship.
        if Some(ship.id) != flagship_id && ship.in_flight() {
            let uses_jump_drive = ship.design.has_jump_drive;
            let position = ship.position;
            let now_here = ship.system == player_system;
            if was_here && !was_hyperspacing && ship.is_hyperspacing() {
                let key = if uses_jump_drive {
                    SoundKey::JumpOut
                } else {
                    SoundKey::HyperdriveOut
                };
                self.audio.play(key, Some(position));
            }
            if !was_here && now_here {
                let key = if uses_jump_drive {
                    SoundKey::JumpIn
                } else {
                    SoundKey::HyperdriveIn
                };
                self.audio.play(key, Some(position));
            }
        }

        self.resolve_boarding(i, observations);

        // Remaining actions require being in the active system.
        if self.store.ships[i].system != player_system {
            return;
        }
        {
            let EntityStore { ships, staged, .. } = &mut self.store;
            let ship = &mut ships[i];
            if ship.helm.launch {
                ship.launch(&mut staged.ships);
            }
            if ship.fire(&mut staged.projectiles) {
                self.has_anti_missile.push(ship.id);
            }
        }
    }

    /// A ship that pulls alongside its disabled target boards it: hostile
    /// boardings plunder (BOARD), friendly ones render aid (ASSIST).
    fn resolve_boarding(&mut self, i: usize, observations: &[ShipObs]) {
        let constants = &self.content.constants;
        let boarding_range = constants.boarding_range;
        let cooldown = constants.boarding_cooldown;
        let ship = &self.store.ships[i];
        if !ship.helm.board || ship.board_cooldown > 0 || !ship.can_act() {
            let ship = &mut self.store.ships[i];
            ship.board_cooldown = ship.board_cooldown.saturating_sub(1);
            return;
        }
        let Some(target_id) = ship.target else {
            return;
        };
        let Some(victim) = observations.iter().find(|obs| obs.id == target_id) else {
            return;
        };
        let close_enough = victim.system == ship.system
            && ship.position.distance(victim.position)
                <= ship.design.radius + victim.radius + boarding_range
            && (ship.velocity - victim.velocity).length() < 1.0;
        if !close_enough || !victim.disabled {
            return;
        }
        let hostile = self.content.hostile(&ship.government, &victim.government);
        let (boarder, victim_id) = (ship.id, victim.id);
        self.store.ships[i].board_cooldown = cooldown;
        self.events.push(ShipEvent {
            source: EventSource::Ship(boarder),
            target: victim_id,
            kind: if hostile {
                EventKind::Board
            } else {
                EventKind::Assist
            },
        });
    }

    fn run_spawners(&mut self) {
        let Some(system_id) = self.player.system.clone() else {
            return;
        };
        let Some(system) = self.content.system(&system_id).cloned() else {
            return;
        };
        crate::spawn::spawn_fleets(
            &mut self.store,
            &self.content,
            &system,
            self.player.system.as_ref(),
            &mut self.counters,
            &mut *self.rng,
        );
        crate::spawn::spawn_persons(
            &mut self.store,
            &self.content,
            &system,
            &mut self.counters,
            &mut *self.rng,
        );
        crate::spawn::spawn_raids(
            &mut self.store,
            &self.content,
            &system,
            &self.player,
            &mut self.counters,
            &mut *self.messages,
            &mut *self.rng,
            false,
        );
    }

    /// Clicks are resolved here, in the worker, against final positions.
    fn handle_clicks(&mut self, input: &InputCapture) {
        let Some(click) = input.click else {
            return;
        };
        let Some(flagship_id) = self.player.flagship else {
            return;
        };
        let Some(flagship) = self.store.ship(flagship_id) else {
            return;
        };
        let center = flagship.position;
        let flagship_in_flight = flagship.in_flight();
        let world_point = click.point / input.zoom.max(0.01) + center;

        // Left clicks on stellar objects set (or confirm) a landing target.
        let mut clicked_object: Option<(usize, String, bool)> = None;
        if !click.right && flagship_in_flight {
            if let Some(system) = self
                .player
                .system
                .as_ref()
                .and_then(|id| self.content.system(id))
            {
                for (index, object) in system.objects.iter().enumerate() {
                    if world_point.distance(object.position) < object.radius {
                        clicked_object = Some((index, object.name.clone(), object.landable));
                        break;
                    }
                }
            }
        }
        if let Some((index, name, landable)) = clicked_object {
            let Some(flagship) = self.store.ship_mut(flagship_id) else {
                return;
            };
            if flagship.target_object == Some(index) {
                if landable {
                    self.messages.notify(format!("Landing on {name}."));
                } else {
                    self.messages
                        .notify(format!("The authorities on {name} refuse to let you land."));
                }
            } else {
                flagship.target_object = Some(index);
            }
            return;
        }

        // Otherwise find the closest targetable ship near the click,
        // preferring an enemy on an exact hit.
        let mut click_range = 50.0;
        let mut clicked: Option<ShipId> = None;
        for ship in &self.store.ships {
            if ship.id == flagship_id
                || ship.system != self.player.system
                || !ship.is_targetable()
            {
                continue;
            }
            let range = world_point.distance(ship.position) - ship.design.radius;
            if range <= click_range {
                click_range = range;
                clicked = Some(ship.id);
                if range <= 0.0 && self.content.hostile(&ship.government, &self.player.government) {
                    break;
                }
            }
        }
        if let Some(target) = clicked {
            if let Some(flagship) = self.store.ship_mut(flagship_id) {
                flagship.target = Some(target);
            }
        }
    }

    /// Rebuild both collision indexes from ships in the active system at
    /// full zoom: visible ships in one, fully cloaked ships in the other.
    pub(crate) fn fill_collision_sets(&mut self) {
        self.ship_index.clear();
        self.cloaked_index.clear();
        for (i, ship) in self.store.ships.iter().enumerate() {
            if ship.should_be_removed()
                || ship.system != self.player.system
                || !ship.in_flight()
                || ship.is_hyperspacing()
            {
                continue;
            }
            if ship.cloak < 1.0 {
                self.ship_index.add(i, ship);
            } else {
                self.cloaked_index.add(i, ship);
            }
        }
    }

    pub(crate) fn resolve_combat(&mut self) {
        let collected = {
            let EntityStore {
                ships,
                projectiles,
                flotsam,
                visuals,
                staged,
            } = &mut self.store;
            let ctx = ResolveCtx {
                content: &self.content,
                ship_index: &self.ship_index,
                cloaked_index: &self.cloaked_index,
                has_anti_missile: &self.has_anti_missile,
            };
            let mut out = ResolveOut {
                ships,
                staged,
                visuals,
                asteroids: &mut self.asteroids,
                events: &mut self.events,
                grudges: &mut self.grudges,
                player: &self.player,
                messages: &mut *self.messages,
                rng: &mut *self.rng,
            };
            for projectile in projectiles.iter_mut() {
                resolve_projectile(projectile, &ctx, &mut out);
            }
            let mut collected: Vec<(ShipId, Payload)> = Vec::new();
            for item in flotsam.iter_mut() {
                if let Some(pickup) = collect_flotsam(item, &ctx, &mut out) {
                    collected.push(pickup);
                }
            }
            collected
        };
        // The anti-missile cache lives for exactly one resolution pass.
        self.has_anti_missile.clear();

        record_harvest(&mut self.player, &collected, &self.store.ships);
        crate::combat::do_scanning(&mut self.store.ships, &self.player, &mut self.events);
    }
}
