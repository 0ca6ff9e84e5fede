//! Process snapshots and the process registry.
//!
//! The process side is the simpler variant of the window registry: existence
//! tracking only, no per-entity attribute deltas.

use std::collections::{HashMap, HashSet};

use tracing::debug;
use winwatch_protocol::EventKind;

use crate::{
    probe::Pid,
    sink::{EntityRef, EventSink},
};

/// Snapshot of one process. The name is resolved once at creation and never
/// re-read; a pid reused by the OS for a different program is a distinct
/// logical entity only by pid value. Accepted approximation of the polling
/// design.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessState {
    /// OS process id.
    pub pid: Pid,
    /// Process name captured when the pid was first observed.
    pub name: String,
}

/// Owns the previous-poll pid map and computes per-cycle deltas.
#[derive(Default)]
pub struct ProcessRegistry {
    known: HashMap<Pid, ProcessState>,
}

impl ProcessRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked processes.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// Whether the registry tracks no processes.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Capture the initial snapshot. Processes present at seed time fire no
    /// events.
    pub fn seed(&mut self, current: Vec<(Pid, String)>) {
        for (pid, name) in current {
            self.known.insert(pid, ProcessState { pid, name });
        }
    }

    /// Pure set difference against the known pid set, materialized before
    /// any mutation.
    pub fn diff(&self, current: &[(Pid, String)]) -> (Vec<Pid>, Vec<Pid>) {
        let current_set: HashSet<Pid> = current.iter().map(|(pid, _)| *pid).collect();
        let added = current
            .iter()
            .map(|(pid, _)| *pid)
            .filter(|pid| !self.known.contains_key(pid))
            .collect();
        let removed = self
            .known
            .keys()
            .copied()
            .filter(|pid| !current_set.contains(pid))
            .collect();
        (added, removed)
    }

    /// Run one poll cycle: exits for removed pids, then starts for added
    /// pids. Event construction is skipped when no subscriber wants the
    /// kind.
    pub fn reconcile(&mut self, current: Vec<(Pid, String)>, sink: &dyn EventSink) {
        let (added, removed) = self.diff(&current);
        if !added.is_empty() || !removed.is_empty() {
            debug!(added = added.len(), removed = removed.len(), "process diff");
        }

        let wants_exit = sink.wants(EventKind::ProcessExit);
        for pid in removed {
            if let Some(proc_) = self.known.remove(&pid) {
                if wants_exit {
                    sink.publish(EntityRef::Process(proc_), EventKind::ProcessExit);
                }
            }
        }

        let added: HashSet<Pid> = added.into_iter().collect();
        let wants_start = sink.wants(EventKind::ProcessStart);
        for (pid, name) in current {
            if added.contains(&pid) {
                let proc_ = ProcessState { pid, name };
                if wants_start {
                    sink.publish(EntityRef::Process(proc_.clone()), EventKind::ProcessStart);
                }
                self.known.insert(pid, proc_);
            }
        }
    }
}
