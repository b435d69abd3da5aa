//! Collaborator interfaces the engine drives but does not implement:
//! per-ship movement/intent, sound requests, and user-facing notifications.

use rand::RngCore;

use crate::ship::{Ship, ShipObs};
use crate::types::{SoundKey, SystemId};
use crate::visual::Visual;
use glam::DVec2;

/// Everything a controller may read and emit while updating one ship.
/// `others` is a pre-move snapshot: controllers never observe a ship that
/// has been half-updated this step.
pub struct ControlContext<'a> {
    pub step: u64,
    pub player_system: Option<&'a SystemId>,
    pub others: &'a [ShipObs],
    pub visuals: &'a mut Vec<Visual>,
    pub flotsam: &'a mut Vec<crate::flotsam::Flotsam>,
    pub rng: &'a mut dyn RngCore,
}

/// The movement/AI collaborator, invoked once per ship per step. It owns
/// physics integration and intent (the helm); the engine owns everything
/// that follows from the helm (firing, boarding, launching, collisions).
pub trait ShipController: Send {
    fn update(&mut self, ship: &mut Ship, ctx: &mut ControlContext<'_>);
}

/// Fire-and-forget keyed sound requests.
pub trait AudioSink: Send {
    fn play(&mut self, key: SoundKey, position: Option<DVec2>);
}

/// User-facing text notifications (hails, pickups, arrivals).
pub trait MessageSink: Send {
    fn notify(&mut self, message: String);
}

pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _key: SoundKey, _position: Option<DVec2>) {}
}

pub struct NullMessages;

impl MessageSink for NullMessages {
    fn notify(&mut self, _message: String) {}
}

/// Shared in-memory message log; tests and the CLI keep a handle and read
/// what the step produced.
#[derive(Clone, Default)]
pub struct MessageLog(std::sync::Arc<std::sync::Mutex<Vec<String>>>);

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut self.0.lock().expect("message log poisoned"))
    }
}

impl MessageSink for MessageLog {
    fn notify(&mut self, message: String) {
        self.0.lock().expect("message log poisoned").push(message);
    }
}

/// Shared in-memory sound log, same shape as [`MessageLog`].
#[derive(Clone, Default)]
pub struct AudioLog(std::sync::Arc<std::sync::Mutex<Vec<SoundKey>>>);

impl AudioLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<SoundKey> {
        std::mem::take(&mut self.0.lock().expect("audio log poisoned"))
    }
}

impl AudioSink for AudioLog {
    fn play(&mut self, key: SoundKey, _position: Option<DVec2>) {
        self.0.lock().expect("audio log poisoned").push(key);
    }
}
