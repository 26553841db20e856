//! Shell event logging task

use tokio::sync::broadcast::{self, error::RecvError};
use tracing::{debug, info, warn};

use crate::state::ShellEvent;

/// Log shell events until the event channel closes
pub async fn event_log_task(mut rx: broadcast::Receiver<ShellEvent>) {
    loop {
        match rx.recv().await {
            Ok(ShellEvent::CountdownTick(left)) => debug!("Countdown: {:.2}s left", left),
            Ok(ShellEvent::CountdownActivationChanged(active)) => info!("Countdown active: {}", active),
            Ok(ShellEvent::RestoreTargetChanged(Some(window))) => info!("Restore target: {}", window),
            Ok(ShellEvent::RestoreTargetChanged(None)) => info!("Restore target cleared"),
            Err(RecvError::Lagged(skipped)) => warn!("Event log lagged, skipped {} events", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}
