//! Desktop backends
//!
//! `win32` talks to the real window manager; `simulated` is an in-memory
//! desktop used by tests and on hosts without Win32.

pub mod simulated;
#[cfg(windows)]
pub mod win32;

use std::sync::Arc;

use crate::services::{Desktop, WinEventHooks};

pub use simulated::SimulatedDesktop;
#[cfg(windows)]
pub use win32::{Win32Desktop, Win32EventHooks};

/// Window queries and hook installer for the current host
pub fn native() -> (Arc<dyn Desktop>, Arc<dyn WinEventHooks>) {
    #[cfg(windows)]
    {
        (Arc::new(Win32Desktop::new()), Arc::new(Win32EventHooks::new()))
    }
    #[cfg(not(windows))]
    {
        tracing::warn!("No Win32 desktop on this host, using a simulated desktop");
        let desktop = Arc::new(SimulatedDesktop::new());
        (desktop.clone(), desktop)
    }
}
