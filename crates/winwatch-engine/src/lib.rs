//! winwatch engine
//!
//! Coordinates side effects for watched-state transitions:
//! - routes published events to triggers via the [`EventBus`]
//! - guards script launches against runaway spawn loops ([`LaunchGuard`])
//! - spawns matched scripts detached ([`ScriptLauncher`])
//! - emits user notifications ([`NotificationDispatcher`])
//!
//! [`Engine`] is the primary type: construct it over a system probe and a
//! notification channel, install triggers, then `begin_watch`.

use std::sync::Arc;

use config::Trigger;
use winwatch_world::{SystemProbe, WatchCfg, Watcher};

mod bus;
mod error;
mod guard;
mod launcher;
mod notification;

pub use bus::{EventBus, TriggerHandler};
pub use error::{Error, Result};
pub use guard::{DEFAULT_GRACE, DEFAULT_MAX_BURST, LaunchGuard, Verdict};
pub use launcher::ScriptLauncher;
pub use notification::{Alert, NotificationDispatcher, StderrAlert};

/// Owns the event bus and both watch loops; the engine's public surface is
/// what external collaborators (tray shell, settings dialog) consume.
pub struct Engine {
    bus: Arc<EventBus>,
    watcher: Watcher,
}

impl Engine {
    /// Create an engine over `probe`, sending notifications through
    /// `notifier`.
    pub fn new(
        probe: Arc<dyn SystemProbe>,
        notifier: NotificationDispatcher,
        cfg: WatchCfg,
    ) -> Self {
        let launcher = Arc::new(ScriptLauncher::new(notifier));
        let bus = Arc::new(EventBus::new(launcher));
        let watcher = Watcher::new(probe, bus.clone(), cfg);
        Self { bus, watcher }
    }

    /// Start both watch loops. Idempotent.
    pub fn begin_watch(&self) {
        self.watcher.begin_watch();
    }

    /// Stop both watch loops and wait for them to acknowledge. Safe to call
    /// when not running.
    pub async fn end_watch(&self) {
        self.watcher.end_watch().await;
    }

    /// Whether the watch loops are running.
    pub fn is_running(&self) -> bool {
        self.watcher.is_running()
    }

    /// Register one trigger.
    pub fn add_trigger(&self, trigger: Trigger) {
        self.bus.add_trigger(trigger);
    }

    /// Replace all registered triggers.
    pub fn reset_associations(&self, triggers: Vec<Trigger>) {
        self.bus.reset_associations(triggers);
    }

    /// All registered triggers, for persistence.
    pub fn get_triggers(&self) -> Vec<Trigger> {
        self.bus.triggers()
    }
}
