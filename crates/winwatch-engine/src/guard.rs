//! Loop-prevention heuristics for script launches.
//!
//! Two independent rules, both known approximations rather than proofs:
//! a structural self-loop rule (a native script registered as the start
//! trigger of its own process name would respawn itself forever) and a
//! rolling per-script burst counter with a grace-interval reset.

use std::{collections::HashMap, path::PathBuf, time::Duration};

use config::{ScriptKind, Trigger};
use parking_lot::Mutex;
use tokio::time::Instant;
use winwatch_protocol::EventKind;

/// Maximum consecutive launch attempts inside one grace window before
/// suppression kicks in; the attempt after this many is refused.
pub const DEFAULT_MAX_BURST: u32 = 3;

/// Quiet period after which a script's burst counter resets.
pub const DEFAULT_GRACE: Duration = Duration::from_millis(2000);

/// Outcome of a guard check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    /// Launch may proceed.
    Pass,
    /// The trigger would respawn its own process forever.
    SelfLoop,
    /// Too many consecutive launches inside the grace window.
    Burst,
}

impl Verdict {
    /// Whether the launch is suppressed.
    pub fn suppressed(self) -> bool {
        !matches!(self, Self::Pass)
    }
}

struct Slot {
    count: u32,
    last_attempt: Instant,
}

/// Per-script launch counters. The sole mutator of suppression state; one
/// lock suffices given dispatch-path-only access and low contention.
pub struct LaunchGuard {
    max_burst: u32,
    grace: Duration,
    slots: Mutex<HashMap<PathBuf, Slot>>,
}

impl LaunchGuard {
    /// Guard with the reference limits (burst of 3, 2000ms grace).
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_MAX_BURST, DEFAULT_GRACE)
    }

    /// Guard with custom limits.
    pub fn with_limits(max_burst: u32, grace: Duration) -> Self {
        Self {
            max_burst,
            grace,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Record one launch attempt for the trigger's script and decide
    /// pass/suppress.
    ///
    /// The counter resets lazily when the most recent attempt is older than
    /// the grace interval; suppressed attempts count as attempts. The
    /// self-loop rule applies regardless of counter state, even on the
    /// first attempt.
    pub fn check(&self, trigger: &Trigger) -> Verdict {
        let now = Instant::now();
        let mut slots = self.slots.lock();
        let slot = slots.entry(trigger.script.clone()).or_insert(Slot {
            count: 0,
            last_attempt: now,
        });
        if now.duration_since(slot.last_attempt) >= self.grace {
            slot.count = 0;
        }
        slot.count = slot.count.saturating_add(1);
        slot.last_attempt = now;
        let burst = slot.count > self.max_burst;
        drop(slots);

        if is_self_loop(trigger) {
            Verdict::SelfLoop
        } else if burst {
            Verdict::Burst
        } else {
            Verdict::Pass
        }
    }
}

impl Default for LaunchGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// A native script whose own base name equals its process-start match name
/// is the trivial infinite loop: launching it fires its own trigger.
fn is_self_loop(trigger: &Trigger) -> bool {
    trigger.kind == ScriptKind::Native
        && trigger.event == EventKind::ProcessStart
        && trigger
            .script
            .file_stem()
            .is_some_and(|stem| {
                stem.to_string_lossy()
                    .eq_ignore_ascii_case(&trigger.match_name)
            })
}
