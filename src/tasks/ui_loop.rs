//! UI-affinity task

use tokio::sync::mpsc;
use tracing::info;

use crate::{controller::ScaleController, dispatch::UiMessage};

/// Own the controller and handle queued messages one at a time until shutdown
pub async fn ui_loop_task(mut controller: ScaleController, mut rx: mpsc::UnboundedReceiver<UiMessage>) {
    info!("Starting UI task");

    while let Some(message) = rx.recv().await {
        if !controller.handle(message) {
            break;
        }
    }

    info!("UI task finished");
}
