//! Wiring of the controller, its UI task and its notification relays

use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
};
use tracing::{debug, info, warn};

use crate::{
    controller::{ControllerDeps, ScaleController},
    dispatch::{UiDispatcher, UiMessage},
    state::{ControllerSnapshot, ShellEvent},
    tasks::{relay_changes, ui_loop_task, Subscription},
};

/// A running activation shell.
///
/// Construction order: channels, controller (which arms the tracker if
/// auto-restore is on), relays, then the UI task. Shutdown runs in reverse.
/// Dropping a `Shell` without [`Shell::shutdown`] still tells the UI task to
/// stop, but does not wait for it.
#[derive(Debug)]
pub struct Shell {
    dispatcher: UiDispatcher,
    events: broadcast::Sender<ShellEvent>,
    snapshot_rx: watch::Receiver<ControllerSnapshot>,
    subscriptions: Vec<Subscription>,
    ui_task: Option<JoinHandle<()>>,
}

impl Shell {
    /// Build the controller and start its UI task
    pub fn launch(deps: ControllerDeps) -> Self {
        let (dispatcher, ui_rx) = UiDispatcher::channel();
        let (events, _) = broadcast::channel(256);
        let (snapshot_tx, snapshot_rx) = watch::channel(ControllerSnapshot::new());

        let subscriptions = vec![
            relay_changes(
                "running",
                deps.runtime.subscribe_running(),
                dispatcher.clone(),
                UiMessage::RunningChanged,
            ),
            relay_changes(
                "auto-restore",
                deps.settings.subscribe_auto_restore(),
                dispatcher.clone(),
                UiMessage::AutoRestoreChanged,
            ),
        ];

        let controller = ScaleController::new(deps, dispatcher.clone(), events.clone(), snapshot_tx);
        let ui_task = tokio::spawn(ui_loop_task(controller, ui_rx));
        info!("Shell launched");

        Self {
            dispatcher,
            events,
            snapshot_rx,
            subscriptions,
            ui_task: Some(ui_task),
        }
    }

    pub fn dispatcher(&self) -> UiDispatcher {
        self.dispatcher.clone()
    }

    /// Subscribe to countdown and restore-target events
    pub fn subscribe(&self) -> broadcast::Receiver<ShellEvent> {
        self.events.subscribe()
    }

    pub fn snapshots(&self) -> watch::Receiver<ControllerSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Stop relaying notifications, drain the UI queue and wait for the UI task
    pub async fn shutdown(mut self) {
        for subscription in &mut self.subscriptions {
            subscription.cancel();
        }

        if let Some(ui_task) = self.ui_task.take() {
            if self.dispatcher.post(UiMessage::Shutdown) {
                if let Err(e) = ui_task.await {
                    warn!("UI task ended abnormally: {}", e);
                }
            }
        }
        info!("Shell shut down");
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        // The controller's own dispatchers keep the queue open, so it has to be told
        if self.ui_task.is_some() && self.dispatcher.post(UiMessage::Shutdown) {
            debug!("Shell dropped without shutdown, UI task told to stop");
        }
    }
}
