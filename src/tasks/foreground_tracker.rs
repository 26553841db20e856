//! Foreground window tracker

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::{
    dispatch::{UiDispatcher, UiMessage},
    services::{HookHandle, WinEventHooks},
};

/// Relays OS foreground/destroy notifications onto the UI queue.
///
/// The hook callback runs on an arbitrary thread and only posts
/// [`UiMessage::CheckForeground`]; the decision is made on the UI task.
pub struct ForegroundTracker {
    hooks: Arc<dyn WinEventHooks>,
    dispatcher: UiDispatcher,
    handle: Option<HookHandle>,
}

impl ForegroundTracker {
    pub fn new(hooks: Arc<dyn WinEventHooks>, dispatcher: UiDispatcher) -> Self {
        Self {
            hooks,
            dispatcher,
            handle: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Install the hooks; no-op if already armed
    pub fn arm(&mut self) {
        if self.is_armed() {
            return;
        }

        let dispatcher = self.dispatcher.clone();
        let callback = Arc::new(move || {
            dispatcher.post(UiMessage::CheckForeground);
        });

        match self.hooks.install(callback) {
            Ok(handle) => {
                info!("Foreground tracker armed");
                self.handle = Some(handle);
            }
            Err(e) => warn!("Failed to arm foreground tracker: {:#}", e),
        }
    }

    /// Remove the hooks; no-op if not armed
    pub fn disarm(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.unhook();
            info!("Foreground tracker disarmed");
        } else {
            debug!("Foreground tracker not armed");
        }
    }
}

impl std::fmt::Debug for ForegroundTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ForegroundTracker")
            .field("armed", &self.is_armed())
            .finish()
    }
}
