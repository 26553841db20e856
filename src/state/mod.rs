//! State management module
//!
//! This module contains the controller's state structures and the state
//! shared with the control API.

pub mod app_state;
pub mod controller_state;
pub mod countdown_state;
pub mod restore_state;

// Re-export main types
pub use app_state::AppState;
pub use controller_state::{ActivationState, ControllerSnapshot, ShellEvent};
pub use countdown_state::{CountdownState, ELAPSED_EPSILON_SECONDS};
pub use restore_state::RestoreState;
