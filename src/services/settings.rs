//! Magnification settings and the process-wide settings store

use std::{
    collections::HashMap,
    sync::Mutex,
};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use super::desktop::WindowHandle;

/// How the runtime captures the source window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum CaptureMethod {
    #[default]
    GraphicsCapture,
    DesktopDuplication,
    Gdi,
    DwmSharedSurface,
}

/// Process-wide flags that always override per-window values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GlobalFlags {
    pub breakpoint_mode: bool,
    pub disable_effect_cache: bool,
    pub save_effect_sources: bool,
    pub warnings_are_errors: bool,
    pub simulate_exclusive_fullscreen: bool,
}

/// Settings handed to the runtime for one magnification session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MagSettings {
    pub capture_method: CaptureMethod,
    pub is_3d_game_mode: bool,
    pub is_show_fps: bool,
    pub is_vsync: bool,
    pub is_draw_cursor: bool,
    pub cursor_scaling: f32,
    pub is_breakpoint_mode: bool,
    pub is_disable_effect_cache: bool,
    pub is_save_effect_sources: bool,
    pub is_warnings_are_errors: bool,
    pub is_simulate_exclusive_fullscreen: bool,
}

impl MagSettings {
    /// Overwrite the global-only fields with the process-wide flags
    pub fn apply_global(&mut self, flags: &GlobalFlags) {
        self.is_breakpoint_mode = flags.breakpoint_mode;
        self.is_disable_effect_cache = flags.disable_effect_cache;
        self.is_save_effect_sources = flags.save_effect_sources;
        self.is_warnings_are_errors = flags.warnings_are_errors;
        self.is_simulate_exclusive_fullscreen = flags.simulate_exclusive_fullscreen;
    }
}

impl Default for MagSettings {
    fn default() -> Self {
        Self {
            capture_method: CaptureMethod::default(),
            is_3d_game_mode: false,
            is_show_fps: false,
            is_vsync: true,
            is_draw_cursor: true,
            cursor_scaling: 1.0,
            is_breakpoint_mode: false,
            is_disable_effect_cache: false,
            is_save_effect_sources: false,
            is_warnings_are_errors: false,
            is_simulate_exclusive_fullscreen: false,
        }
    }
}

#[derive(Debug)]
struct Profiles {
    default: MagSettings,
    per_window: HashMap<WindowHandle, MagSettings>,
}

/// Configuration collaborator shared by the controller and the API
#[derive(Debug)]
pub struct AppSettings {
    down_count: Mutex<u32>,
    global: Mutex<GlobalFlags>,
    profiles: Mutex<Profiles>,
    auto_restore_tx: watch::Sender<bool>,
}

impl AppSettings {
    pub fn new(down_count: u32, auto_restore: bool, global: GlobalFlags) -> Self {
        let (auto_restore_tx, _) = watch::channel(auto_restore);
        Self {
            down_count: Mutex::new(down_count),
            global: Mutex::new(global),
            profiles: Mutex::new(Profiles {
                default: MagSettings::default(),
                per_window: HashMap::new(),
            }),
            auto_restore_tx,
        }
    }

    /// Countdown length in seconds
    pub fn down_count(&self) -> u32 {
        self.down_count.lock().map(|d| *d).unwrap_or_else(|e| *e.into_inner())
    }

    pub fn set_down_count(&self, seconds: u32) {
        match self.down_count.lock() {
            Ok(mut d) => *d = seconds,
            Err(e) => warn!("Failed to lock down count: {}", e),
        }
    }

    pub fn is_auto_restore(&self) -> bool {
        *self.auto_restore_tx.borrow()
    }

    /// Change the auto-restore flag; subscribers are only woken on a real change
    pub fn set_auto_restore(&self, enabled: bool) {
        let changed = self.auto_restore_tx.send_if_modified(|current| {
            if *current == enabled {
                false
            } else {
                *current = enabled;
                true
            }
        });
        if changed {
            info!("Auto-restore set to: {}", enabled);
        }
    }

    /// Change notifications for the auto-restore flag
    pub fn subscribe_auto_restore(&self) -> watch::Receiver<bool> {
        self.auto_restore_tx.subscribe()
    }

    pub fn global_flags(&self) -> GlobalFlags {
        self.global.lock().map(|g| *g).unwrap_or_else(|e| *e.into_inner())
    }

    pub fn set_global_flags(&self, flags: GlobalFlags) {
        match self.global.lock() {
            Ok(mut g) => *g = flags,
            Err(e) => warn!("Failed to lock global flags: {}", e),
        }
    }

    /// Register a profile used whenever `window` is magnified
    pub fn set_profile(&self, window: WindowHandle, settings: MagSettings) {
        match self.profiles.lock() {
            Ok(mut p) => {
                p.per_window.insert(window, settings);
            }
            Err(e) => warn!("Failed to lock profiles: {}", e),
        }
    }

    /// Per-window profile, falling back to the default profile
    pub fn settings_for(&self, window: Option<WindowHandle>) -> MagSettings {
        let profiles = match self.profiles.lock() {
            Ok(p) => p,
            Err(e) => e.into_inner(),
        };
        window
            .and_then(|w| profiles.per_window.get(&w))
            .unwrap_or(&profiles.default)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_flags_override_profile() {
        let settings = AppSettings::new(3, false, GlobalFlags {
            breakpoint_mode: true,
            warnings_are_errors: true,
            ..GlobalFlags::default()
        });
        let window = WindowHandle::from_raw(0x10).unwrap();
        settings.set_profile(window, MagSettings {
            is_breakpoint_mode: false,
            is_save_effect_sources: true,
            is_show_fps: true,
            ..MagSettings::default()
        });

        let mut effective = settings.settings_for(Some(window));
        effective.apply_global(&settings.global_flags());

        assert!(effective.is_show_fps);
        assert!(effective.is_breakpoint_mode);
        assert!(effective.is_warnings_are_errors);
        assert!(!effective.is_save_effect_sources);
    }

    #[test]
    fn unknown_window_uses_default_profile() {
        let settings = AppSettings::new(3, false, GlobalFlags::default());
        assert_eq!(settings.settings_for(WindowHandle::from_raw(0x99)), MagSettings::default());
        assert_eq!(settings.settings_for(None), MagSettings::default());
    }

    #[test]
    fn auto_restore_notifies_only_on_change() {
        let settings = AppSettings::new(3, false, GlobalFlags::default());
        let mut rx = settings.subscribe_auto_restore();

        settings.set_auto_restore(false);
        assert!(!rx.has_changed().unwrap());

        settings.set_auto_restore(true);
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());
        assert!(settings.is_auto_restore());
    }
}
