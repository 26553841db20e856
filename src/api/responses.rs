//! API response structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::state::ControllerSnapshot;

/// Acknowledgement for action endpoints.
///
/// Actions are queued; `accepted` does not mean the action had any effect.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionResponse {
    pub status: String,
    pub action: String,
    pub timestamp: DateTime<Utc>,
}

impl ActionResponse {
    pub fn accepted(action: impl Into<String>) -> Self {
        Self {
            status: "accepted".to_string(),
            action: action.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Controller status with server metadata
#[derive(Debug, Clone, Serialize)]
pub struct StatusResponse {
    #[serde(flatten)]
    pub controller: ControllerSnapshot,
    pub uptime: String,
    pub port: u16,
    pub host: String,
    pub last_action: Option<String>,
    pub last_action_time: Option<DateTime<Utc>>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}
