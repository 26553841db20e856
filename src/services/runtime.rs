//! Magnification runtime facade

use std::sync::Mutex;
use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info};

use super::{desktop::WindowHandle, settings::MagSettings};

/// The external engine that performs capture and scaling.
///
/// `run` completes asynchronously: success is only observable through the
/// running flag flipping to `true`.
pub trait MagRuntime: Send + Sync {
    fn is_running(&self) -> bool;

    /// Window being magnified, if a session is active
    fn hwnd_src(&self) -> Option<WindowHandle>;

    fn run(&self, window: WindowHandle, settings: MagSettings);

    fn stop(&self);

    fn toggle_overlay(&self);

    /// Running-flag change notifications
    fn subscribe_running(&self) -> watch::Receiver<bool>;
}

/// Snapshot of the loopback runtime's current session
#[derive(Debug, Clone, Serialize)]
pub struct LoopbackSession {
    pub window: WindowHandle,
    pub settings: MagSettings,
    pub overlay_visible: bool,
}

/// Runtime stand-in that accepts every `run` and reports it as running.
///
/// Used when no magnification engine is attached, and by tests to observe
/// what the controller asked for.
#[derive(Debug)]
pub struct LoopbackRuntime {
    running_tx: watch::Sender<bool>,
    session: Mutex<Option<LoopbackSession>>,
    run_calls: Mutex<Vec<WindowHandle>>,
    stop_calls: Mutex<usize>,
}

impl LoopbackRuntime {
    pub fn new() -> Self {
        let (running_tx, _) = watch::channel(false);
        Self {
            running_tx,
            session: Mutex::new(None),
            run_calls: Mutex::new(Vec::new()),
            stop_calls: Mutex::new(0),
        }
    }

    pub fn session(&self) -> Option<LoopbackSession> {
        self.session.lock().ok().and_then(|s| s.clone())
    }

    /// Every window `run` was called with, in order
    pub fn run_calls(&self) -> Vec<WindowHandle> {
        self.run_calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn stop_calls(&self) -> usize {
        self.stop_calls.lock().map(|c| *c).unwrap_or_default()
    }
}

impl Default for LoopbackRuntime {
    fn default() -> Self {
        Self::new()
    }
}

impl MagRuntime for LoopbackRuntime {
    fn is_running(&self) -> bool {
        *self.running_tx.borrow()
    }

    fn hwnd_src(&self) -> Option<WindowHandle> {
        self.session.lock().ok().and_then(|s| s.as_ref().map(|s| s.window))
    }

    fn run(&self, window: WindowHandle, settings: MagSettings) {
        if let Ok(mut calls) = self.run_calls.lock() {
            calls.push(window);
        }
        if self.is_running() {
            debug!("Loopback runtime already running, ignoring run for {}", window);
            return;
        }

        info!("Loopback runtime magnifying window {}", window);
        if let Ok(mut session) = self.session.lock() {
            *session = Some(LoopbackSession {
                window,
                settings,
                overlay_visible: false,
            });
        }
        self.running_tx.send_replace(true);
    }

    fn stop(&self) {
        if let Ok(mut calls) = self.stop_calls.lock() {
            *calls += 1;
        }
        if !self.is_running() {
            return;
        }

        info!("Loopback runtime stopped");
        if let Ok(mut session) = self.session.lock() {
            *session = None;
        }
        self.running_tx.send_replace(false);
    }

    fn toggle_overlay(&self) {
        if let Ok(mut session) = self.session.lock() {
            if let Some(session) = session.as_mut() {
                session.overlay_visible = !session.overlay_visible;
                debug!("Overlay visible: {}", session.overlay_visible);
            }
        }
    }

    fn subscribe_running(&self) -> watch::Receiver<bool> {
        self.running_tx.subscribe()
    }
}
