//! Desktop window queries and window-event hooks

use std::{fmt, sync::Arc};
use serde::{Deserialize, Serialize};

/// Opaque OS window identifier. The null handle is never represented;
/// "no window" is `Option::<WindowHandle>::None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WindowHandle(u64);

impl WindowHandle {
    /// Wrap a raw handle value, mapping the null sentinel to `None`
    pub fn from_raw(raw: u64) -> Option<Self> {
        if raw == 0 { None } else { Some(Self(raw)) }
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for WindowHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// Visual state of a top-level window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowState {
    Normal,
    Minimized,
    Maximized,
    Hidden,
    Other,
}

/// Window style bits of a top-level window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowStyle(pub u32);

impl WindowStyle {
    /// Sizing border (`WS_THICKFRAME`)
    pub const RESIZABLE_FRAME: u32 = 0x0004_0000;

    pub fn contains(self, bits: u32) -> bool {
        self.0 & bits == bits
    }

    pub fn with(self, bits: u32) -> Self {
        Self(self.0 | bits)
    }
}

/// Window queries the activation logic needs from the OS
pub trait Desktop: Send + Sync {
    /// Whether the handle still names an existing window
    fn is_window(&self, window: WindowHandle) -> bool;

    /// The window that currently has user focus, if any
    fn foreground_window(&self) -> Option<WindowHandle>;

    fn show_state(&self, window: WindowHandle) -> ShowState;

    fn window_style(&self, window: WindowHandle) -> WindowStyle;

    /// Replace the style bits and make the frame change take effect
    fn set_window_style(&self, window: WindowHandle, style: WindowStyle);
}

/// Parameterless notification: "something about the foreground changed"
pub type WinEventCallback = Arc<dyn Fn() + Send + Sync>;

/// Installs global foreground-changed and window-destroyed notifications.
///
/// The callback may run on any thread. Both notification kinds invoke the
/// same callback; event details are not forwarded.
pub trait WinEventHooks: Send + Sync {
    fn install(&self, callback: WinEventCallback) -> anyhow::Result<HookHandle>;
}

/// Revocable registration returned by [`WinEventHooks::install`].
///
/// Unhooking happens at most once, either through [`HookHandle::unhook`]
/// or on drop.
pub struct HookHandle {
    unhook: Option<Box<dyn FnOnce() + Send>>,
}

impl HookHandle {
    pub fn new(unhook: impl FnOnce() + Send + 'static) -> Self {
        Self { unhook: Some(Box::new(unhook)) }
    }

    pub fn unhook(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if let Some(unhook) = self.unhook.take() {
            unhook();
        }
    }
}

impl Drop for HookHandle {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for HookHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookHandle")
            .field("active", &self.unhook.is_some())
            .finish()
    }
}
