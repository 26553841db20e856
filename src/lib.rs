//! Magpie Shell - scale activation for a screen magnifier
//!
//! Decides when to start and stop the magnification runtime from hotkeys,
//! a countdown and foreground-window changes, and remembers which window
//! should be magnified again once it regains focus.

pub mod api;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod platform;
pub mod services;
pub mod shell;
pub mod state;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use api::create_router;
pub use config::Config;
pub use controller::{ControllerDeps, ScaleController};
pub use dispatch::{HotkeyAction, UiDispatcher, UiMessage};
pub use shell::Shell;
pub use state::{AppState, ShellEvent};
pub use utils::signals::shutdown_signal;
