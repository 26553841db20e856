//! UI-affinity message queue
//!
//! All controller state is owned by a single task. Everything else (OS hook
//! threads, the runtime, countdown ticks, API handlers) talks to it by
//! posting a [`UiMessage`] through a [`UiDispatcher`].

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Hotkey actions the shell reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HotkeyAction {
    Scale,
    Overlay,
}

impl HotkeyAction {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "scale" => Some(Self::Scale),
            "overlay" => Some(Self::Overlay),
            _ => None,
        }
    }
}

/// Work item for the UI-affinity task.
///
/// Messages carry no state snapshots; the handler re-reads current state.
#[derive(Debug, Clone, PartialEq)]
pub enum UiMessage {
    Hotkey(HotkeyAction),
    StartCountdown,
    StopCountdown,
    /// Periodic countdown tick for the given countdown generation
    CountdownTick { generation: u64 },
    /// The runtime's running flag changed
    RunningChanged,
    /// The auto-restore setting changed
    AutoRestoreChanged,
    /// Foreground or window-destroyed notification from the tracker
    CheckForeground,
    /// Drop the pending restore target without restoring it
    ClearRestoreTarget,
    Shutdown,
}

/// Cloneable handle for posting onto the UI queue from any thread
#[derive(Debug, Clone)]
pub struct UiDispatcher {
    tx: mpsc::UnboundedSender<UiMessage>,
}

impl UiDispatcher {
    /// Create a dispatcher and the receiving end of its queue
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Post a message. Returns `false` once the UI task has gone away.
    pub fn post(&self, message: UiMessage) -> bool {
        self.tx.send(message).is_ok()
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
