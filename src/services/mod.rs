//! Collaborator interfaces
//!
//! The magnification runtime, the desktop window system and the settings
//! store the activation logic talks to.

pub mod desktop;
pub mod runtime;
pub mod settings;

// Re-export main types
pub use desktop::{
    Desktop, HookHandle, ShowState, WinEventCallback, WinEventHooks, WindowHandle, WindowStyle,
};
pub use runtime::{LoopbackRuntime, LoopbackSession, MagRuntime};
pub use settings::{AppSettings, CaptureMethod, GlobalFlags, MagSettings};
