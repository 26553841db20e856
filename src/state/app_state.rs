//! Shared state for the control API

use std::{
    sync::{Arc, Mutex},
    time::Instant,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::{
    dispatch::{UiDispatcher, UiMessage},
    services::AppSettings,
};
use super::ControllerSnapshot;

/// State shared by the HTTP handlers
#[derive(Debug)]
pub struct AppState {
    /// Queue into the UI task
    pub dispatcher: UiDispatcher,
    /// Latest controller snapshot
    pub snapshot_rx: watch::Receiver<ControllerSnapshot>,
    pub settings: Arc<AppSettings>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Arc<Mutex<Option<String>>>,
    pub last_action_time: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl AppState {
    pub fn new(
        dispatcher: UiDispatcher,
        snapshot_rx: watch::Receiver<ControllerSnapshot>,
        settings: Arc<AppSettings>,
        port: u16,
        host: String,
    ) -> Self {
        Self {
            dispatcher,
            snapshot_rx,
            settings,
            start_time: Instant::now(),
            port,
            host,
            last_action: Arc::new(Mutex::new(None)),
            last_action_time: Arc::new(Mutex::new(None)),
        }
    }

    /// Post a message to the UI task and record it as the last action
    pub fn post(&self, action: &str, message: UiMessage) -> Result<(), String> {
        if !self.dispatcher.post(message) {
            warn!("UI queue closed, dropping action: {}", action);
            return Err("UI task is not running".to_string());
        }

        info!("Action posted: {}", action);
        self.record_action(action);
        Ok(())
    }

    /// Change the auto-restore setting and record it as the last action
    pub fn set_auto_restore(&self, enabled: bool) {
        self.settings.set_auto_restore(enabled);
        self.record_action(if enabled { "auto-restore-on" } else { "auto-restore-off" });
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Get the latest controller snapshot
    pub fn get_snapshot(&self) -> ControllerSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
