//! Countdown timer with a periodic ticker task

use std::time::Duration;
use tokio::{
    sync::broadcast,
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    dispatch::{UiDispatcher, UiMessage},
    state::{CountdownState, ShellEvent},
};

/// Interval between countdown ticks
pub const TICK_INTERVAL: Duration = Duration::from_millis(25);

/// Result of handling one tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Tick from a countdown that has since been stopped or restarted
    Stale,
    /// The countdown ran out; it has been stopped
    Elapsed,
    Remaining(f32),
}

/// Countdown owned by the UI task.
///
/// Ticks are posted to the UI queue so they are handled in order with every
/// other message.
#[derive(Debug)]
pub struct CountdownTimer {
    state: CountdownState,
    ticker: Option<JoinHandle<()>>,
    dispatcher: UiDispatcher,
    events: broadcast::Sender<ShellEvent>,
}

impl CountdownTimer {
    pub fn new(dispatcher: UiDispatcher, events: broadcast::Sender<ShellEvent>) -> Self {
        Self {
            state: CountdownState::new(),
            ticker: None,
            dispatcher,
            events,
        }
    }

    /// Start a countdown of `seconds`; no-op while one is active
    pub fn start(&mut self, seconds: u32) {
        if !self.state.start(seconds, Instant::now()) {
            debug!("Countdown already active, ignoring start");
            return;
        }

        info!("Countdown started for {}s", seconds);
        self.ticker = Some(spawn_ticker(self.state.generation(), self.dispatcher.clone()));
        self.emit(ShellEvent::CountdownActivationChanged(true));
    }

    /// Stop the countdown; no-op while inactive
    pub fn stop(&mut self) {
        if !self.state.stop() {
            return;
        }

        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
        info!("Countdown stopped");
        self.emit(ShellEvent::CountdownActivationChanged(false));
    }

    pub fn is_counting_down(&self) -> bool {
        self.state.is_active()
    }

    pub fn remaining_seconds(&self) -> f32 {
        self.state.remaining_seconds(Instant::now())
    }

    pub fn state(&self) -> &CountdownState {
        &self.state
    }

    /// Handle a tick posted by the ticker task
    pub fn on_tick(&mut self, generation: u64) -> TickOutcome {
        if !self.state.is_active() || generation != self.state.generation() {
            return TickOutcome::Stale;
        }

        let now = Instant::now();
        if self.state.is_elapsed(now) {
            info!("Countdown elapsed");
            self.stop();
            return TickOutcome::Elapsed;
        }

        let left = self.state.remaining_seconds(now);
        self.emit(ShellEvent::CountdownTick(left));
        TickOutcome::Remaining(left)
    }

    fn emit(&self, event: ShellEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }
}

impl Drop for CountdownTimer {
    fn drop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

fn spawn_ticker(generation: u64, dispatcher: UiDispatcher) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(TICK_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        interval.tick().await;

        loop {
            interval.tick().await;
            if !dispatcher.post(UiMessage::CountdownTick { generation }) {
                warn!("UI queue closed, countdown ticker exiting");
                break;
            }
        }
    })
}
