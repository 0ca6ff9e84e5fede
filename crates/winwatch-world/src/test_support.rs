//! Scripted fakes for exercising registries and loops without an OS.

use std::collections::HashMap;

use parking_lot::Mutex;
use winwatch_protocol::EventKind;

use crate::{
    probe::{Pid, SystemProbe, WindowAttrs, WindowHandle},
    sink::{EntityRef, EventSink},
};

/// A probe whose window and process tables are mutated by the test between
/// poll cycles.
#[derive(Default)]
pub struct FakeProbe {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    windows: HashMap<WindowHandle, WindowAttrs>,
    /// Handles enumerated but with unreadable attributes, simulating a
    /// window vanishing between enumeration and the attribute read.
    unreadable: Vec<WindowHandle>,
    foreground: Option<WindowHandle>,
    processes: Vec<(Pid, String)>,
}

impl FakeProbe {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_window(&self, handle: u64, title: &str) {
        self.add_window_with(handle, |attrs| {
            attrs.title = title.to_string();
        });
    }

    /// Add a window with customized attributes. Defaults to visible,
    /// unminimized, unmaximized.
    pub fn add_window_with(&self, handle: u64, customize: impl FnOnce(&mut WindowAttrs)) {
        let mut attrs = WindowAttrs {
            visible: true,
            ..WindowAttrs::default()
        };
        customize(&mut attrs);
        self.state.lock().windows.insert(WindowHandle(handle), attrs);
    }

    pub fn remove_window(&self, handle: u64) {
        let mut state = self.state.lock();
        state.windows.remove(&WindowHandle(handle));
        if state.foreground == Some(WindowHandle(handle)) {
            state.foreground = None;
        }
    }

    pub fn set_title(&self, handle: u64, title: &str) {
        if let Some(attrs) = self.state.lock().windows.get_mut(&WindowHandle(handle)) {
            attrs.title = title.to_string();
        }
    }

    pub fn set_visible(&self, handle: u64, visible: bool) {
        if let Some(attrs) = self.state.lock().windows.get_mut(&WindowHandle(handle)) {
            attrs.visible = visible;
        }
    }

    pub fn set_minimized(&self, handle: u64, minimized: bool) {
        if let Some(attrs) = self.state.lock().windows.get_mut(&WindowHandle(handle)) {
            attrs.minimized = minimized;
        }
    }

    pub fn set_maximized(&self, handle: u64, maximized: bool) {
        if let Some(attrs) = self.state.lock().windows.get_mut(&WindowHandle(handle)) {
            attrs.maximized = maximized;
        }
    }

    pub fn set_foreground(&self, handle: Option<u64>) {
        self.state.lock().foreground = handle.map(WindowHandle);
    }

    /// Keep enumerating `handle` but fail its attribute reads.
    pub fn hide_attrs(&self, handle: u64) {
        self.state.lock().unreadable.push(WindowHandle(handle));
    }

    pub fn add_process(&self, pid: Pid, name: &str) {
        self.state.lock().processes.push((pid, name.to_string()));
    }

    pub fn remove_process(&self, pid: Pid) {
        self.state.lock().processes.retain(|(p, _)| *p != pid);
    }
}

impl SystemProbe for FakeProbe {
    fn list_windows(&self) -> Vec<WindowHandle> {
        self.state.lock().windows.keys().copied().collect()
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        self.state.lock().foreground
    }

    fn window_attrs(&self, handle: WindowHandle) -> Option<WindowAttrs> {
        let state = self.state.lock();
        if state.unreadable.contains(&handle) {
            return None;
        }
        state.windows.get(&handle).cloned()
    }

    fn list_processes(&self) -> Vec<(Pid, String)> {
        self.state.lock().processes.clone()
    }
}

/// Records every published event as `(entity name, kind)`.
pub struct RecordingSink {
    wanted: Option<Vec<EventKind>>,
    events: Mutex<Vec<(String, EventKind)>>,
}

impl RecordingSink {
    /// Record everything.
    pub fn all() -> Self {
        Self {
            wanted: None,
            events: Mutex::new(Vec::new()),
        }
    }

    /// Subscribe only to the given kinds.
    pub fn only(kinds: impl IntoIterator<Item = EventKind>) -> Self {
        Self {
            wanted: Some(kinds.into_iter().collect()),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<(String, EventKind)> {
        self.events.lock().clone()
    }

    pub fn events_for(&self, name: &str) -> Vec<EventKind> {
        self.events
            .lock()
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, kind)| *kind)
            .collect()
    }

    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn wants(&self, kind: EventKind) -> bool {
        self.wanted.as_ref().is_none_or(|w| w.contains(&kind))
    }

    fn publish(&self, entity: EntityRef, kind: EventKind) {
        self.events.lock().push((entity.name().to_string(), kind));
    }
}
