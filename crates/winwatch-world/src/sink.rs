//! Event publication seam between the watch loops and their subscriber.
//!
//! The loops never see trigger data; they publish `(entity, kind)` pairs to
//! an [`EventSink`] and may skip event construction entirely when
//! [`EventSink::wants`] says nobody could match.

use winwatch_protocol::EventKind;

use crate::probe::WindowHandle;
use crate::process::ProcessState;

/// Identity and display name of a window at publish time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WindowSummary {
    /// The window's OS handle.
    pub handle: WindowHandle,
    /// The window's title as of the current poll.
    pub title: String,
}

/// The entity an event fired for: a window or a process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EntityRef {
    /// A tracked window.
    Window(WindowSummary),
    /// A tracked process.
    Process(ProcessState),
}

impl EntityRef {
    /// The display name triggers are matched against: the window title or
    /// the process name.
    pub fn name(&self) -> &str {
        match self {
            Self::Window(win) => &win.title,
            Self::Process(proc_) => &proc_.name,
        }
    }
}

/// Receiver of watch-loop events. Implementations must not block
/// significantly: publication runs synchronously on the polling task.
pub trait EventSink: Send + Sync {
    /// Whether any subscriber is registered for `kind`. Loops use a `false`
    /// answer to skip event construction; correctness never depends on it.
    fn wants(&self, kind: EventKind) -> bool;

    /// Deliver one event.
    fn publish(&self, entity: EntityRef, kind: EventKind);
}
