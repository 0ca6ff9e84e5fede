//! Window snapshots and the window registry.
//!
//! A [`WindowState`] holds the attributes of one window as of the previous
//! poll plus a pending queue of transition events detected during the
//! current diff pass. The [`WindowRegistry`] owns the previous-poll map and
//! drives the full per-cycle reconcile.

use std::collections::{HashMap, HashSet, VecDeque};

use tracing::debug;
use winwatch_protocol::EventKind;

use crate::{
    probe::{SystemProbe, WindowAttrs, WindowHandle},
    sink::{EntityRef, EventSink, WindowSummary},
};

/// Per-poll snapshot of one window plus its pending event queue.
#[derive(Clone, Debug)]
pub struct WindowState {
    handle: WindowHandle,
    title: String,
    visible: bool,
    minimized: bool,
    maximized: bool,
    foreground: bool,
    /// Events detected during the current diff pass, drained in FIFO order.
    pending: VecDeque<EventKind>,
}

impl WindowState {
    /// Capture a window's attributes at creation time. No events are
    /// queued for the initial state.
    pub fn new(handle: WindowHandle, attrs: WindowAttrs, foreground: bool) -> Self {
        Self {
            handle,
            title: attrs.title,
            visible: attrs.visible,
            minimized: attrs.minimized,
            maximized: attrs.maximized,
            foreground,
            pending: VecDeque::new(),
        }
    }

    /// The window's handle.
    pub fn handle(&self) -> WindowHandle {
        self.handle
    }

    /// The title as of the last applied attributes.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Untitled windows never fire Open or Close.
    pub fn has_title(&self) -> bool {
        !self.title.is_empty()
    }

    /// Compare fresh attributes against the stored snapshot and queue one
    /// event per detected change, updating the stored value as we go.
    ///
    /// The check order is fixed: visibility, minimize, maximize, title,
    /// focus. Minimize and maximize are independent booleans that queue only
    /// on a false-to-true edge; visibility and focus queue on any flip;
    /// title queues on inequality.
    pub fn apply(&mut self, attrs: WindowAttrs, foreground: bool) {
        if self.visible != attrs.visible {
            self.pending.push_back(if attrs.visible {
                EventKind::WindowShow
            } else {
                EventKind::WindowHide
            });
            self.visible = attrs.visible;
        }
        if !self.minimized && attrs.minimized {
            self.pending.push_back(EventKind::WindowMinimize);
        }
        self.minimized = attrs.minimized;
        if !self.maximized && attrs.maximized {
            self.pending.push_back(EventKind::WindowMaximize);
        }
        self.maximized = attrs.maximized;
        if self.title != attrs.title {
            self.pending.push_back(EventKind::WindowTitleChange);
            self.title = attrs.title;
        }
        if self.foreground != foreground {
            self.pending.push_back(if foreground {
                EventKind::WindowFocus
            } else {
                EventKind::WindowNoFocus
            });
            self.foreground = foreground;
        }
    }

    /// Pop the next pending event, if any.
    pub fn pop_event(&mut self) -> Option<EventKind> {
        self.pending.pop_front()
    }

    /// Number of queued events.
    pub fn queued(&self) -> usize {
        self.pending.len()
    }

    fn summary(&self) -> WindowSummary {
        WindowSummary {
            handle: self.handle,
            title: self.title.clone(),
        }
    }
}

/// Owns the previous-poll window map and computes per-cycle deltas.
#[derive(Default)]
pub struct WindowRegistry {
    known: HashMap<WindowHandle, WindowState>,
}

impl WindowRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked windows.
    pub fn len(&self) -> usize {
        self.known.len()
    }

    /// Whether the registry tracks no windows.
    pub fn is_empty(&self) -> bool {
        self.known.is_empty()
    }

    /// Capture the initial snapshot. Windows present at seed time fire no
    /// events.
    pub fn seed(&mut self, probe: &dyn SystemProbe) {
        let foreground = probe.foreground_window();
        for handle in probe.list_windows() {
            if let Some(attrs) = probe.window_attrs(handle) {
                self.known.insert(
                    handle,
                    WindowState::new(handle, attrs, foreground == Some(handle)),
                );
            }
        }
    }

    /// Pure set difference between the current enumeration and the known
    /// set. Both vectors are materialized before the caller mutates the
    /// registry; never remove from the map while iterating a view of it.
    pub fn diff(&self, current: &[WindowHandle]) -> (Vec<WindowHandle>, Vec<WindowHandle>) {
        let current_set: HashSet<WindowHandle> = current.iter().copied().collect();
        let added = current
            .iter()
            .copied()
            .filter(|h| !self.known.contains_key(h))
            .collect();
        let removed = self
            .known
            .keys()
            .copied()
            .filter(|h| !current_set.contains(h))
            .collect();
        (added, removed)
    }

    /// Run one full poll cycle: enumerate, diff, queue deltas, and publish.
    ///
    /// Publish order per cycle: Close for removed windows, Open for added
    /// windows, then each surviving window's queued updates in FIFO order.
    pub fn reconcile(&mut self, probe: &dyn SystemProbe, sink: &dyn EventSink) {
        let current = probe.list_windows();
        let foreground = probe.foreground_window();
        let (added, removed) = self.diff(&current);
        if !added.is_empty() || !removed.is_empty() {
            debug!(added = added.len(), removed = removed.len(), "window diff");
        }

        for handle in removed {
            if let Some(win) = self.known.remove(&handle) {
                if win.has_title() && sink.wants(EventKind::WindowClose) {
                    sink.publish(EntityRef::Window(win.summary()), EventKind::WindowClose);
                }
            }
        }

        for handle in &current {
            if let Some(win) = self.known.get_mut(handle) {
                // A handle that vanishes between enumeration and the
                // attribute read is already gone this cycle; the next diff
                // removes it.
                if let Some(attrs) = probe.window_attrs(*handle) {
                    win.apply(attrs, foreground == Some(*handle));
                }
            }
        }

        for handle in added {
            let Some(attrs) = probe.window_attrs(handle) else {
                continue;
            };
            let win = WindowState::new(handle, attrs, foreground == Some(handle));
            if win.has_title() && sink.wants(EventKind::WindowOpen) {
                sink.publish(EntityRef::Window(win.summary()), EventKind::WindowOpen);
            }
            self.known.insert(handle, win);
        }

        for win in self.known.values_mut() {
            while let Some(kind) = win.pop_event() {
                if sink.wants(kind) {
                    sink.publish(
                        EntityRef::Window(WindowSummary {
                            handle: win.handle,
                            title: win.title.clone(),
                        }),
                        kind,
                    );
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FakeProbe, RecordingSink};

    fn attrs(title: &str) -> WindowAttrs {
        WindowAttrs {
            title: title.to_string(),
            visible: true,
            minimized: false,
            maximized: false,
        }
    }

    #[test]
    fn apply_orders_events_by_fixed_attribute_check() {
        let mut win = WindowState::new(WindowHandle(1), attrs("a"), false);
        // Flip everything at once.
        win.apply(
            WindowAttrs {
                title: "b".to_string(),
                visible: false,
                minimized: true,
                maximized: true,
            },
            true,
        );
        let mut seen = Vec::new();
        while let Some(kind) = win.pop_event() {
            seen.push(kind);
        }
        assert_eq!(
            seen,
            vec![
                EventKind::WindowHide,
                EventKind::WindowMinimize,
                EventKind::WindowMaximize,
                EventKind::WindowTitleChange,
                EventKind::WindowFocus,
            ]
        );
    }

    #[test]
    fn size_state_only_fires_on_rising_edge() {
        let mut win = WindowState::new(
            WindowHandle(1),
            WindowAttrs {
                title: "a".to_string(),
                visible: true,
                minimized: true,
                maximized: false,
            },
            false,
        );
        // Restore from minimized: no minimize/maximize events.
        win.apply(attrs("a"), false);
        assert_eq!(win.pop_event(), None);
        // Minimize again: exactly one event.
        win.apply(
            WindowAttrs {
                title: "a".to_string(),
                visible: true,
                minimized: true,
                maximized: false,
            },
            false,
        );
        assert_eq!(win.pop_event(), Some(EventKind::WindowMinimize));
        assert_eq!(win.pop_event(), None);
    }

    #[test]
    fn diff_is_pure_set_difference() {
        let probe = FakeProbe::new();
        probe.add_window(1, "one");
        probe.add_window(2, "two");
        let mut reg = WindowRegistry::new();
        reg.seed(&probe);

        let current = vec![WindowHandle(2), WindowHandle(3)];
        let (added, removed) = reg.diff(&current);
        assert_eq!(added, vec![WindowHandle(3)]);
        assert_eq!(removed, vec![WindowHandle(1)]);
        // diff must not mutate the registry
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn diff_is_idempotent_on_identical_sets() {
        let probe = FakeProbe::new();
        probe.add_window(1, "one");
        let mut reg = WindowRegistry::new();
        reg.seed(&probe);

        let current = vec![WindowHandle(1)];
        let (added, removed) = reg.diff(&current);
        assert!(added.is_empty());
        assert!(removed.is_empty());
    }

    #[test]
    fn open_then_close_for_titled_window() {
        let probe = FakeProbe::new();
        let sink = RecordingSink::all();
        let mut reg = WindowRegistry::new();
        reg.seed(&probe);

        probe.add_window(1, "Notepad");
        reg.reconcile(&probe, &sink);
        probe.remove_window(1);
        reg.reconcile(&probe, &sink);

        assert_eq!(
            sink.events_for("Notepad"),
            vec![EventKind::WindowOpen, EventKind::WindowClose]
        );
    }

    #[test]
    fn untitled_window_never_fires_open_or_close() {
        let probe = FakeProbe::new();
        let sink = RecordingSink::all();
        let mut reg = WindowRegistry::new();
        reg.seed(&probe);

        probe.add_window(1, "");
        reg.reconcile(&probe, &sink);
        probe.remove_window(1);
        reg.reconcile(&probe, &sink);

        assert!(sink.events().is_empty());
    }

    #[test]
    fn title_appearing_later_is_a_title_change_not_open() {
        // A window first seen untitled is registered silently; when the
        // title shows up on a later cycle it is an update, not a creation.
        let probe = FakeProbe::new();
        let sink = RecordingSink::all();
        let mut reg = WindowRegistry::new();
        reg.seed(&probe);

        probe.add_window(1, "");
        reg.reconcile(&probe, &sink);
        assert!(sink.events().is_empty());

        probe.set_title(1, "Notepad");
        reg.reconcile(&probe, &sink);
        assert_eq!(
            sink.events_for("Notepad"),
            vec![EventKind::WindowTitleChange]
        );
    }

    #[test]
    fn open_precedes_queued_updates_for_other_windows() {
        let probe = FakeProbe::new();
        let sink = RecordingSink::all();
        let mut reg = WindowRegistry::new();

        probe.add_window(1, "steady");
        reg.seed(&probe);

        // In one cycle: window 1 minimizes and window 2 appears maximized.
        probe.set_minimized(1, true);
        probe.add_window_with(2, |attrs| {
            attrs.title = "fresh".to_string();
            attrs.maximized = true;
        });
        reg.reconcile(&probe, &sink);

        let events = sink.events();
        assert_eq!(
            events,
            vec![
                ("fresh".to_string(), EventKind::WindowOpen),
                ("steady".to_string(), EventKind::WindowMinimize),
            ]
        );
        // The new window's maximized state was captured at creation; it does
        // not fire a Maximize retroactively.
        probe.set_maximized(2, true);
        sink.clear();
        reg.reconcile(&probe, &sink);
        assert!(sink.events().is_empty());
    }

    #[test]
    fn focus_moves_between_windows_in_one_cycle() {
        let probe = FakeProbe::new();
        let sink = RecordingSink::all();
        let mut reg = WindowRegistry::new();

        probe.add_window(1, "a");
        probe.add_window(2, "b");
        probe.set_foreground(Some(1));
        reg.seed(&probe);

        probe.set_foreground(Some(2));
        reg.reconcile(&probe, &sink);

        let mut events = sink.events();
        events.sort();
        assert_eq!(
            events,
            vec![
                ("a".to_string(), EventKind::WindowNoFocus),
                ("b".to_string(), EventKind::WindowFocus),
            ]
        );
    }

    #[test]
    fn visibility_flips_fire_hide_then_show() {
        let probe = FakeProbe::new();
        let sink = RecordingSink::all();
        let mut reg = WindowRegistry::new();

        probe.add_window(1, "term");
        reg.seed(&probe);

        probe.set_visible(1, false);
        reg.reconcile(&probe, &sink);
        probe.set_visible(1, true);
        reg.reconcile(&probe, &sink);

        assert_eq!(
            sink.events_for("term"),
            vec![EventKind::WindowHide, EventKind::WindowShow]
        );
    }

    #[test]
    fn unwanted_kinds_are_not_published() {
        let probe = FakeProbe::new();
        let sink = RecordingSink::only([EventKind::WindowClose]);
        let mut reg = WindowRegistry::new();
        reg.seed(&probe);

        probe.add_window(1, "Notepad");
        reg.reconcile(&probe, &sink);
        assert!(sink.events().is_empty());

        probe.remove_window(1);
        reg.reconcile(&probe, &sink);
        assert_eq!(sink.events_for("Notepad"), vec![EventKind::WindowClose]);
    }

    #[test]
    fn vanished_handle_mid_cycle_is_skipped() {
        let probe = FakeProbe::new();
        let sink = RecordingSink::all();
        let mut reg = WindowRegistry::new();
        reg.seed(&probe);

        probe.add_window(1, "ghost");
        probe.hide_attrs(1);
        reg.reconcile(&probe, &sink);
        // Attribute read failed: never tracked, no Open.
        assert!(sink.events().is_empty());
        assert!(reg.is_empty());
    }
}
