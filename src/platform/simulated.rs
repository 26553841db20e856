//! In-memory desktop
//!
//! Models top-level windows, their show state and style, and the foreground
//! window. Installed hooks fire on foreground changes and window destruction,
//! like the OS notifications they stand in for.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard,
    },
};
use tracing::debug;

use crate::services::{
    Desktop, HookHandle, ShowState, WinEventCallback, WinEventHooks, WindowHandle, WindowStyle,
};

#[derive(Debug, Clone, Copy)]
struct SimWindow {
    show_state: ShowState,
    style: WindowStyle,
}

#[derive(Debug, Default)]
struct DesktopModel {
    windows: HashMap<WindowHandle, SimWindow>,
    foreground: Option<WindowHandle>,
}

type HookTable = Arc<Mutex<HashMap<u64, WinEventCallback>>>;

#[derive(Default)]
pub struct SimulatedDesktop {
    model: Mutex<DesktopModel>,
    hooks: HookTable,
    next_hook_id: AtomicU64,
}

impl SimulatedDesktop {
    pub fn new() -> Self {
        Self::default()
    }

    fn model(&self) -> MutexGuard<'_, DesktopModel> {
        self.model.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a normal, resizable top-level window
    pub fn open_window(&self, window: WindowHandle) -> WindowHandle {
        self.model().windows.insert(window, SimWindow {
            show_state: ShowState::Normal,
            style: WindowStyle(WindowStyle::RESIZABLE_FRAME),
        });
        window
    }

    /// Destroy a window and fire the destroy notification
    pub fn destroy_window(&self, window: WindowHandle) {
        {
            let mut model = self.model();
            if model.windows.remove(&window).is_none() {
                return;
            }
            if model.foreground == Some(window) {
                model.foreground = None;
            }
        }
        debug!("Simulated window {} destroyed", window);
        self.fire_hooks();
    }

    /// Change the foreground window and fire the foreground notification
    pub fn set_foreground(&self, window: Option<WindowHandle>) {
        {
            let mut model = self.model();
            if let Some(w) = window {
                if !model.windows.contains_key(&w) {
                    return;
                }
            }
            model.foreground = window;
        }
        self.fire_hooks();
    }

    pub fn set_show_state(&self, window: WindowHandle, show_state: ShowState) {
        if let Some(w) = self.model().windows.get_mut(&window) {
            w.show_state = show_state;
        }
    }

    /// Number of live hook registrations
    pub fn installed_hooks(&self) -> usize {
        self.hooks.lock().map(|h| h.len()).unwrap_or_default()
    }

    fn fire_hooks(&self) {
        let callbacks: Vec<WinEventCallback> = match self.hooks.lock() {
            Ok(hooks) => hooks.values().cloned().collect(),
            Err(_) => return,
        };
        for callback in callbacks {
            callback();
        }
    }
}

impl Desktop for SimulatedDesktop {
    fn is_window(&self, window: WindowHandle) -> bool {
        self.model().windows.contains_key(&window)
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        self.model().foreground
    }

    fn show_state(&self, window: WindowHandle) -> ShowState {
        self.model()
            .windows
            .get(&window)
            .map(|w| w.show_state)
            .unwrap_or(ShowState::Other)
    }

    fn window_style(&self, window: WindowHandle) -> WindowStyle {
        self.model()
            .windows
            .get(&window)
            .map(|w| w.style)
            .unwrap_or_default()
    }

    fn set_window_style(&self, window: WindowHandle, style: WindowStyle) {
        if let Some(w) = self.model().windows.get_mut(&window) {
            w.style = style;
        }
    }
}

impl WinEventHooks for SimulatedDesktop {
    fn install(&self, callback: WinEventCallback) -> anyhow::Result<HookHandle> {
        let id = self.next_hook_id.fetch_add(1, Ordering::Relaxed);
        self.hooks
            .lock()
            .map_err(|e| anyhow::anyhow!("hook table poisoned: {}", e))?
            .insert(id, callback);

        let hooks = Arc::clone(&self.hooks);
        Ok(HookHandle::new(move || {
            if let Ok(mut hooks) = hooks.lock() {
                hooks.remove(&id);
            }
        }))
    }
}

impl std::fmt::Debug for SimulatedDesktop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulatedDesktop")
            .field("model", &*self.model())
            .field("hooks", &self.installed_hooks())
            .finish()
    }
}
