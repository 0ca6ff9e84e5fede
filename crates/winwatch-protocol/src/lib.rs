//! Shared types crossing the watcher/engine boundary.
//!
//! - [`EventKind`]: the closed catalog of observable window and process
//!   transitions, with the symbolic names used by persisted trigger data and
//!   the verb phrases used in notification text.
//! - [`Notice`] and [`NotifyKind`]: the notification tuples the engine emits
//!   to whatever UI surface is attached.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An observable state transition of a tracked window or process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A titled window appeared in the enumeration.
    WindowOpen,
    /// A previously known titled window disappeared.
    WindowClose,
    /// A window transitioned into the minimized state.
    WindowMinimize,
    /// A window transitioned into the maximized state.
    WindowMaximize,
    /// A window's title text changed.
    WindowTitleChange,
    /// A window became visible.
    WindowShow,
    /// A window stopped being visible.
    WindowHide,
    /// A window became the foreground window.
    WindowFocus,
    /// A window stopped being the foreground window.
    WindowNoFocus,
    /// A process id appeared in the enumeration.
    ProcessStart,
    /// A previously known process id disappeared.
    ProcessExit,
}

impl EventKind {
    /// Every event kind, in catalog order.
    pub const ALL: [Self; 11] = [
        Self::WindowOpen,
        Self::WindowClose,
        Self::WindowMinimize,
        Self::WindowMaximize,
        Self::WindowTitleChange,
        Self::WindowShow,
        Self::WindowHide,
        Self::WindowFocus,
        Self::WindowNoFocus,
        Self::ProcessStart,
        Self::ProcessExit,
    ];

    /// Stable symbolic name used by persisted trigger data.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::WindowOpen => "OnWindowOpen",
            Self::WindowClose => "OnWindowClose",
            Self::WindowMinimize => "OnWindowMinimize",
            Self::WindowMaximize => "OnWindowMaximize",
            Self::WindowTitleChange => "OnWindowTitleChange",
            Self::WindowShow => "OnWindowShow",
            Self::WindowHide => "OnWindowHide",
            Self::WindowFocus => "OnWindowFocus",
            Self::WindowNoFocus => "OnWindowNoFocus",
            Self::ProcessStart => "OnProcessStart",
            Self::ProcessExit => "OnProcessExit",
        }
    }

    /// Resolve a symbolic name back to a kind. Unknown names are a
    /// per-entry recoverable condition for config loading.
    pub fn from_short_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.short_name() == name)
    }

    /// Present-tense verb phrase, e.g. "is opened" or "gains focus".
    pub fn present_phrase(self) -> &'static str {
        match self {
            Self::WindowOpen => "is opened",
            Self::WindowClose => "is closed",
            Self::WindowMinimize => "is minimized",
            Self::WindowMaximize => "is maximized",
            Self::WindowTitleChange => "changes its title",
            Self::WindowShow => "is shown",
            Self::WindowHide => "is hidden",
            Self::WindowFocus => "gains focus",
            Self::WindowNoFocus => "loses focus",
            Self::ProcessStart => "starts",
            Self::ProcessExit => "exits",
        }
    }

    /// Past-tense verb phrase, e.g. "was opened" or "gained focus".
    pub fn past_phrase(self) -> &'static str {
        match self {
            Self::WindowOpen => "was opened",
            Self::WindowClose => "was closed",
            Self::WindowMinimize => "was minimized",
            Self::WindowMaximize => "was maximized",
            Self::WindowTitleChange => "changed its title",
            Self::WindowShow => "was shown",
            Self::WindowHide => "was hidden",
            Self::WindowFocus => "gained focus",
            Self::WindowNoFocus => "lost focus",
            Self::ProcessStart => "started",
            Self::ProcessExit => "exited",
        }
    }

    /// Whether this kind is fired by the window loop (as opposed to the
    /// process loop).
    pub fn is_window_event(self) -> bool {
        !matches!(self, Self::ProcessStart | Self::ProcessExit)
    }

    /// The noun used for the firing entity in notification text.
    pub fn entity_noun(self) -> &'static str {
        if self.is_window_event() {
            "window"
        } else {
            "process"
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

/// Severity of a [`Notice`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotifyKind {
    /// Informational, e.g. a script was started.
    Info,
    /// Something was deliberately not done, e.g. a suppressed launch.
    Warn,
    /// Something failed, e.g. a missing interpreter.
    Error,
}

/// A user-visible notification emitted by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Severity of the notice.
    pub kind: NotifyKind,
    /// Short title, suitable for a tray balloon header.
    pub title: String,
    /// Body text.
    pub text: String,
}
