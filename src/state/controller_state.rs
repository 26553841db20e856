//! Observable controller state and outward events

use serde::Serialize;

use crate::services::WindowHandle;

/// Activation state derived from the runtime's running flag and the countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActivationState {
    Idle,
    CountingDown,
    Running,
}

impl ActivationState {
    pub fn derive(runtime_running: bool, counting_down: bool) -> Self {
        if runtime_running {
            Self::Running
        } else if counting_down {
            Self::CountingDown
        } else {
            Self::Idle
        }
    }
}

/// Snapshot published after every handled UI message
#[derive(Debug, Clone, Serialize)]
pub struct ControllerSnapshot {
    pub state: ActivationState,
    pub countdown_remaining_seconds: Option<f32>,
    pub restore_target: Option<WindowHandle>,
    pub current_source: Option<WindowHandle>,
    pub auto_restore: bool,
    pub tracker_armed: bool,
}

impl ControllerSnapshot {
    pub fn new() -> Self {
        Self {
            state: ActivationState::Idle,
            countdown_remaining_seconds: None,
            restore_target: None,
            current_source: None,
            auto_restore: false,
            tracker_armed: false,
        }
    }
}

impl Default for ControllerSnapshot {
    fn default() -> Self {
        Self::new()
    }
}

/// Events the shell exposes to its UI
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "value", rename_all = "kebab-case")]
pub enum ShellEvent {
    CountdownActivationChanged(bool),
    CountdownTick(f32),
    RestoreTargetChanged(Option<WindowHandle>),
}
