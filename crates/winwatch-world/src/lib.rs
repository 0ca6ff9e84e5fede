//! winwatch-world: polling window/process state service.
//!
//! Maintains the previous-poll snapshot of every OS window and process,
//! diffs it against a fresh enumeration on a fixed interval, and publishes
//! the resulting transition events to an [`EventSink`].
//!
//! Two independent loops run as separate tokio tasks: the window loop
//! (existence, visibility, size-state, title, and focus transitions) and the
//! process loop (existence only). Neither shares mutable state with the
//! other; each exclusively owns its registry. Event publication is
//! synchronous on the polling task, so sink handlers must not block.

use std::{sync::Arc, time::Duration};

use parking_lot::Mutex;
use tokio::{
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

mod probe;
mod process;
mod sink;
mod window;

#[cfg(test)]
mod test_support;

pub use probe::{Pid, SysProbe, SystemProbe, WindowAttrs, WindowHandle};
pub use process::{ProcessRegistry, ProcessState};
pub use sink::{EntityRef, EventSink, WindowSummary};
pub use window::{WindowRegistry, WindowState};

/// Default poll interval for both loops.
pub const DEFAULT_POLL_MS: u64 = 100;

/// How long `end_watch` waits for each loop to acknowledge cancellation.
const STOP_WAIT_TIMEOUT_MS: u64 = 500;

/// Configuration for the watcher service.
#[derive(Clone, Copy, Debug)]
pub struct WatchCfg {
    /// Fixed interval between poll cycles.
    pub interval: Duration,
}

impl Default for WatchCfg {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_MS),
        }
    }
}

/// Handles to the two running watch loops.
struct Running {
    token: CancellationToken,
    window: JoinHandle<()>,
    process: JoinHandle<()>,
}

/// Owns the window and process watch loops.
///
/// `begin_watch` and `end_watch` are idempotent; `end_watch` is safe to call
/// when nothing is running. Cancellation is cooperative: a loop observes it
/// at the next cycle boundary and completes any in-flight poll first.
pub struct Watcher {
    probe: Arc<dyn SystemProbe>,
    sink: Arc<dyn EventSink>,
    cfg: WatchCfg,
    running: Mutex<Option<Running>>,
}

impl Watcher {
    /// Create a watcher over the given probe, publishing to `sink`.
    pub fn new(probe: Arc<dyn SystemProbe>, sink: Arc<dyn EventSink>, cfg: WatchCfg) -> Self {
        Self {
            probe,
            sink,
            cfg,
            running: Mutex::new(None),
        }
    }

    /// Start both loops. A no-op if they are already running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn begin_watch(&self) {
        let mut guard = self.running.lock();
        if guard.is_some() {
            debug!("begin_watch: already running");
            return;
        }
        let token = CancellationToken::new();
        let window = tokio::spawn(run_window_loop(
            self.probe.clone(),
            self.sink.clone(),
            token.clone(),
            self.cfg.interval,
        ));
        let process = tokio::spawn(run_process_loop(
            self.probe.clone(),
            self.sink.clone(),
            token.clone(),
            self.cfg.interval,
        ));
        *guard = Some(Running {
            token,
            window,
            process,
        });
        debug!(interval_ms = self.cfg.interval.as_millis() as u64, "watch started");
    }

    /// Request both loops to stop and wait for them to acknowledge.
    ///
    /// Safe to call when not running.
    pub async fn end_watch(&self) {
        let running = self.running.lock().take();
        let Some(running) = running else {
            return;
        };
        running.token.cancel();
        let deadline = Duration::from_millis(STOP_WAIT_TIMEOUT_MS);
        for handle in [running.window, running.process] {
            let _ = time::timeout(deadline, handle).await;
        }
        debug!("watch ended");
    }

    /// Whether the loops are currently running.
    pub fn is_running(&self) -> bool {
        self.running
            .lock()
            .as_ref()
            .is_some_and(|r| !r.window.is_finished() || !r.process.is_finished())
    }
}

/// Window loop: seed the registry, then poll/diff/dispatch until cancelled.
async fn run_window_loop(
    probe: Arc<dyn SystemProbe>,
    sink: Arc<dyn EventSink>,
    token: CancellationToken,
    interval: Duration,
) {
    let mut registry = WindowRegistry::new();
    registry.seed(probe.as_ref());
    trace!(windows = registry.len(), "window loop seeded");

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick of a tokio interval fires immediately; consume it so the
    // first diff happens one interval after seeding.
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                trace!("window loop cancelled");
                return;
            }
            _ = ticker.tick() => {
                registry.reconcile(probe.as_ref(), sink.as_ref());
            }
        }
    }
}

/// Process loop: same shape as the window loop, existence tracking only.
async fn run_process_loop(
    probe: Arc<dyn SystemProbe>,
    sink: Arc<dyn EventSink>,
    token: CancellationToken,
    interval: Duration,
) {
    let mut registry = ProcessRegistry::new();
    registry.seed(probe.list_processes());
    trace!(processes = registry.len(), "process loop seeded");

    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = token.cancelled() => {
                trace!("process loop cancelled");
                return;
            }
            _ = ticker.tick() => {
                registry.reconcile(probe.list_processes(), sink.as_ref());
            }
        }
    }
}
