//! Motion sessions
//!
//! A session is one fixed-rate control loop. Each tick it snapshots the key
//! registry, advances the cursor physics and emits the resulting synthetic
//! input. It holds the keyboard grab for as long as it runs and stops at the
//! first tick boundary after cancellation.

pub mod cancel;
pub mod grab;
pub mod physics;

pub use cancel::{cancel_pair, CancelHandle, CancelSignal};
pub use grab::KeyboardGrab;
pub use physics::{MotionParams, MotionState};

use crate::display::DisplayClient;
use crate::emitter::Emitter;
use crate::keymap::KeyRegistry;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

/// Dispatcher's view of a running session
pub struct SessionHandle {
    id: u64,
    cancel: CancelHandle,
    task: JoinHandle<()>,
}

impl SessionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// True once the loop has exited and the grab is released
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::error!("Session {} task failed: {}", self.id, e);
        }
    }
}

/// Everything a session needs, fixed at spawn
pub struct SessionSpec<D: DisplayClient> {
    pub id: u64,
    pub display: Arc<D>,
    pub registry: Arc<KeyRegistry>,
    pub params: MotionParams,
    pub origin: (i16, i16),
    /// A cancelled session that must finish before this one grabs the keyboard
    pub predecessor: Option<SessionHandle>,
}

pub fn spawn_session<D: DisplayClient>(runtime: &Handle, spec: SessionSpec<D>) -> SessionHandle {
    let (cancel, signal) = cancel_pair();
    let id = spec.id;
    let task = runtime.spawn(run_session(spec, signal));
    SessionHandle { id, cancel, task }
}

async fn run_session<D: DisplayClient>(spec: SessionSpec<D>, mut signal: CancelSignal) {
    let SessionSpec {
        id,
        display,
        registry,
        params,
        origin,
        predecessor,
    } = spec;

    if let Some(previous) = predecessor {
        tracing::debug!("Session {} waiting for session {} to stop", id, previous.id());
        previous.join().await;
        if signal.is_cancelled() {
            tracing::info!("Session {} cancelled before it started", id);
            return;
        }
    }

    tracing::info!(
        "Session {} started at ({}, {}) (tick={:?})",
        id,
        origin.0,
        origin.1,
        params.tick_interval
    );

    let _grab = acquire_grab(id, display.clone()).await;

    let emitter = Emitter::new(display);
    let start = Instant::now();
    let mut state = MotionState::new(origin, &params, start);
    let mut ticks = time::interval_at(start + params.tick_interval, params.tick_interval);
    ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = signal.cancelled() => break,
            _ = ticks.tick() => {}
        }

        let snapshot = registry.snapshot();
        for event in state.tick(&snapshot, &params, Instant::now()) {
            tracing::trace!("Session {} emit {:?}", id, event);
            emitter.emit(event);
        }
    }

    let (x, y) = state.position();
    tracing::info!("Session {} stopped at ({:.0}, {:.0})", id, x, y);
}

/// The grab request waits on a server reply, so it runs off the async workers
async fn acquire_grab<D: DisplayClient>(id: u64, display: Arc<D>) -> Option<KeyboardGrab<D>> {
    match tokio::task::spawn_blocking(move || KeyboardGrab::acquire(display)).await {
        Ok(Ok(grab)) => Some(grab),
        Ok(Err(e)) => {
            tracing::warn!("Session {} running without keyboard grab: {}", id, e);
            None
        }
        Err(e) => {
            tracing::error!("Session {} grab task failed: {}", id, e);
            None
        }
    }
}
