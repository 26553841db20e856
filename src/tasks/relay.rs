//! Change-notification relays onto the UI queue

use tokio::{sync::watch, task::JoinHandle};
use tracing::debug;

use crate::dispatch::{UiDispatcher, UiMessage};

/// Revocable subscription; the relay stops when cancelled or dropped
#[derive(Debug)]
pub struct Subscription {
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn cancel(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|t| !t.is_finished())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Post `message` on the UI queue every time `rx` observes a change.
///
/// The new value is deliberately not forwarded: the UI task reads the
/// source of truth when it handles the message.
pub fn relay_changes<T>(
    name: &'static str,
    mut rx: watch::Receiver<T>,
    dispatcher: UiDispatcher,
    message: UiMessage,
) -> Subscription
where
    T: Send + Sync + 'static,
{
    let task = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            if !dispatcher.post(message.clone()) {
                break;
            }
        }
        debug!("{} relay finished", name);
    });

    Subscription { task: Some(task) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn relays_until_cancelled() {
        let (tx, rx) = watch::channel(false);
        let (dispatcher, mut ui) = UiDispatcher::channel();
        let mut subscription = relay_changes("test", rx, dispatcher, UiMessage::RunningChanged);

        tx.send_replace(true);
        assert_eq!(ui.recv().await, Some(UiMessage::RunningChanged));
        assert!(subscription.is_active());

        subscription.cancel();
        subscription.cancel();
        tokio::task::yield_now().await;
        tx.send_replace(false);
        tokio::task::yield_now().await;
        assert!(ui.try_recv().is_err());
    }
}
