//! The OS enumeration seam.
//!
//! Watch loops never touch platform APIs directly; they poll a
//! [`SystemProbe`] trait object. [`SysProbe`] is the production
//! implementation: Win32 window enumeration on Windows, `sysinfo` process
//! enumeration everywhere.

use parking_lot::Mutex;
use sysinfo::System;

/// Opaque OS window handle, stable for the lifetime of the window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub u64);

/// OS process id.
pub type Pid = u32;

/// Attributes of one window as read in a single poll.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WindowAttrs {
    /// Window title text; may be empty.
    pub title: String,
    /// Whether the window is currently visible.
    pub visible: bool,
    /// Whether the window is minimized.
    pub minimized: bool,
    /// Whether the window is maximized.
    pub maximized: bool,
}

/// Source of raw OS state snapshots.
///
/// Enumeration order carries no meaning; callers treat results as unordered
/// sets. `window_attrs` returning `None` means the handle vanished between
/// enumeration and the attribute read; the caller treats the window as
/// already gone this cycle and lets the next diff reconcile.
pub trait SystemProbe: Send + Sync {
    /// Enumerate all current top-level window handles.
    fn list_windows(&self) -> Vec<WindowHandle>;

    /// The current foreground window, if any.
    fn foreground_window(&self) -> Option<WindowHandle>;

    /// Read the current attributes of one window.
    fn window_attrs(&self, handle: WindowHandle) -> Option<WindowAttrs>;

    /// Enumerate all current process ids with their names.
    fn list_processes(&self) -> Vec<(Pid, String)>;
}

/// Production probe backed by the host OS.
///
/// On non-Windows targets the window enumeration is empty (process watching
/// still works), which degrades the window loop to a no-op.
pub struct SysProbe {
    system: Mutex<System>,
}

impl SysProbe {
    /// Create a probe with a fresh process table.
    pub fn new() -> Self {
        Self {
            system: Mutex::new(System::new()),
        }
    }
}

impl Default for SysProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemProbe for SysProbe {
    fn list_windows(&self) -> Vec<WindowHandle> {
        #[cfg(windows)]
        {
            win32::list_windows()
        }
        #[cfg(not(windows))]
        {
            Vec::new()
        }
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        #[cfg(windows)]
        {
            win32::foreground_window()
        }
        #[cfg(not(windows))]
        {
            None
        }
    }

    fn window_attrs(&self, handle: WindowHandle) -> Option<WindowAttrs> {
        #[cfg(windows)]
        {
            win32::window_attrs(handle)
        }
        #[cfg(not(windows))]
        {
            let _ = handle;
            None
        }
    }

    fn list_processes(&self) -> Vec<(Pid, String)> {
        let mut system = self.system.lock();
        system.refresh_processes(sysinfo::ProcessesToUpdate::All);
        system
            .processes()
            .iter()
            .map(|(pid, proc_)| (pid.as_u32(), proc_.name().to_string_lossy().into_owned()))
            .collect()
    }
}

#[cfg(windows)]
mod win32 {
    //! Thin wrappers over the Win32 window APIs.

    use windows::Win32::{
        Foundation::{BOOL, HWND, LPARAM, TRUE},
        UI::WindowsAndMessaging::{
            EnumWindows, GetForegroundWindow, GetWindowPlacement, GetWindowTextW, IsWindow,
            IsWindowVisible, SW_SHOWMAXIMIZED, SW_SHOWMINIMIZED, WINDOWPLACEMENT,
        },
    };

    use super::{WindowAttrs, WindowHandle};

    unsafe extern "system" fn enum_cb(hwnd: HWND, lparam: LPARAM) -> BOOL {
        // Safety: lparam is the Vec passed by `list_windows` below, alive for
        // the duration of the EnumWindows call.
        let out = unsafe { &mut *(lparam.0 as *mut Vec<WindowHandle>) };
        out.push(WindowHandle(hwnd.0 as usize as u64));
        TRUE
    }

    pub(super) fn list_windows() -> Vec<WindowHandle> {
        let mut out: Vec<WindowHandle> = Vec::new();
        unsafe {
            let _ = EnumWindows(Some(enum_cb), LPARAM(&raw mut out as isize));
        }
        out
    }

    pub(super) fn foreground_window() -> Option<WindowHandle> {
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.0.is_null() {
            None
        } else {
            Some(WindowHandle(hwnd.0 as usize as u64))
        }
    }

    pub(super) fn window_attrs(handle: WindowHandle) -> Option<WindowAttrs> {
        let hwnd = HWND(handle.0 as usize as *mut core::ffi::c_void);
        unsafe {
            if !IsWindow(hwnd).as_bool() {
                return None;
            }
            let visible = IsWindowVisible(hwnd).as_bool();

            let mut placement = WINDOWPLACEMENT {
                length: size_of::<WINDOWPLACEMENT>() as u32,
                ..Default::default()
            };
            let _ = GetWindowPlacement(hwnd, &mut placement);
            let minimized = placement.showCmd == SW_SHOWMINIMIZED;
            let maximized = placement.showCmd == SW_SHOWMAXIMIZED;

            let mut buf = [0u16; 512];
            let len = GetWindowTextW(hwnd, &mut buf) as usize;
            let title = String::from_utf16_lossy(&buf[..len]);

            Some(WindowAttrs {
                title,
                visible,
                minimized,
                maximized,
            })
        }
    }
}
