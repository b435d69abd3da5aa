//! Double-buffered handoff between the foreground (render/UI) thread and
//! the one background calculation worker.
//!
//! Two full frame slots exist; at any instant exactly one is the draw slot
//! and the other belongs to the worker. The foreground drives frames with
//! `wait` → `step` → `go`: `wait` blocks until the previously requested
//! calculation has been published, `step` captures foreground-owned inputs
//! and collects events while the worker is parked, and `go` flips the draw
//! slot and releases the worker into the other one. No game-state field is
//! ever written by both threads in overlapping time.

use std::thread::JoinHandle;
use std::time::Instant;

use parking_lot::{Condvar, Mutex, MutexGuard};
use tracing::{debug, info};

use engine_core::{FrameSnapshot, InputCapture, ShipEvent, Simulation};

struct SyncState {
    step: u64,
    draw_slot: bool,
    calc_slot: bool,
    terminate: bool,
    input: InputCapture,
    events: Vec<ShipEvent>,
}

struct Shared {
    sync: Mutex<SyncState>,
    condvar: Condvar,
    /// Each slot is locked only by the side the tick-tock protocol assigns
    /// it to, so these never contend.
    frames: [Mutex<FrameSnapshot>; 2],
}

pub struct Engine {
    shared: std::sync::Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl Engine {
    /// Take ownership of the simulation and start the calculation worker.
    pub fn new(sim: Simulation) -> Self {
        let shared = std::sync::Arc::new(Shared {
            sync: Mutex::new(SyncState {
                step: 0,
                draw_slot: false,
                calc_slot: false,
                terminate: false,
                input: InputCapture::default(),
                events: Vec::new(),
            }),
            condvar: Condvar::new(),
            frames: [
                Mutex::new(FrameSnapshot::default()),
                Mutex::new(FrameSnapshot::default()),
            ],
        });
        let worker_shared = std::sync::Arc::clone(&shared);
        let worker = std::thread::Builder::new()
            .name("engine-calc".to_string())
            .spawn(move || worker_loop(worker_shared, sim))
            .expect("spawning the calculation worker");
        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Block until the calculation requested by the most recent `go` has
    /// been published. Returns exactly once per completed calculation.
    pub fn wait(&self) {
        let mut sync = self.shared.sync.lock();
        while sync.calc_slot != sync.draw_slot {
            self.shared.condvar.wait(&mut sync);
        }
    }

    /// Foreground-only, strictly between `wait` and `go`: capture this
    /// frame's inputs and take the events the completed step produced.
    pub fn step(&self, input: InputCapture) -> Vec<ShipEvent> {
        let mut sync = self.shared.sync.lock();
        debug_assert_eq!(
            sync.calc_slot, sync.draw_slot,
            "step() outside the wait/go window"
        );
        sync.input = input;
        std::mem::take(&mut sync.events)
    }

    /// Flip the draw slot to the frame just completed and release the
    /// worker into the other slot.
    pub fn go(&self) {
        {
            let mut sync = self.shared.sync.lock();
            sync.step += 1;
            sync.draw_slot = !sync.draw_slot;
        }
        self.shared.condvar.notify_all();
    }

    pub fn frame_count(&self) -> u64 {
        self.shared.sync.lock().step
    }

    /// The frame currently assigned for drawing. The worker is computing
    /// into the other slot, so this lock never blocks it.
    pub fn snapshot(&self) -> MutexGuard<'_, FrameSnapshot> {
        let slot = usize::from(self.shared.sync.lock().draw_slot);
        self.shared.frames[slot].lock()
    }
}

impl Drop for Engine {
    /// Teardown protocol: raise the terminate flag, wake the worker, join.
    /// The flag is only checked at the worker's wait point; a step that has
    /// begun always runs to completion.
    fn drop(&mut self) {
        {
            let mut sync = self.shared.sync.lock();
            sync.terminate = true;
        }
        self.shared.condvar.notify_all();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                info!("calculation worker panicked during shutdown");
            }
        }
    }
}

fn worker_loop(shared: std::sync::Arc<Shared>, mut sim: Simulation) {
    info!("calculation worker started");
    let mut load_sum = 0.0_f64;
    let mut load_count = 0u32;
    let mut load = 0.0_f64;
    loop {
        let (slot, input, step) = {
            let mut sync = shared.sync.lock();
            while sync.calc_slot == sync.draw_slot && !sync.terminate {
                shared.condvar.wait(&mut sync);
            }
            if sync.terminate {
                break;
            }
            (sync.calc_slot, sync.input, sync.step)
        };

        let started = Instant::now();
        {
            let mut frame = shared.frames[usize::from(slot)].lock();
            sim.calculate_step(&mut frame, &input, step);
            // Fold the rolling load average into the published frame.
            load_sum += started.elapsed().as_secs_f64();
            load_count += 1;
            if load_count == 60 {
                load = load_sum * 60.0;
                load_sum = 0.0;
                load_count = 0;
            }
            frame.load = load;
        }
        debug!(step, "calculation complete");

        {
            let mut sync = shared.sync.lock();
            let events = sim.drain_events();
            sync.events.extend(events);
            sync.calc_slot = sync.draw_slot;
        }
        shared.condvar.notify_all();
    }
    info!("calculation worker stopped");
}
