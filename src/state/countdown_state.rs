//! Countdown state structure and arithmetic

use std::time::Duration;
use tokio::time::Instant;

/// Remaining time below which the countdown counts as elapsed
pub const ELAPSED_EPSILON_SECONDS: f32 = 0.01;

/// Countdown before automatic scale activation.
///
/// Active exactly when a start timestamp is recorded. Remaining time is
/// always derived from the monotonic clock, never from tick counts.
#[derive(Debug, Clone, Default)]
pub struct CountdownState {
    configured_seconds: u32,
    started_at: Option<Instant>,
    generation: u64,
}

impl CountdownState {
    /// Create an inactive countdown
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting down from `seconds`. Returns `false` if already active.
    pub fn start(&mut self, seconds: u32, now: Instant) -> bool {
        if self.is_active() {
            return false;
        }

        self.configured_seconds = seconds;
        self.started_at = Some(now);
        self.generation += 1;
        true
    }

    /// Deactivate the countdown. Returns `false` if it was not active.
    pub fn stop(&mut self) -> bool {
        if !self.is_active() {
            return false;
        }

        self.started_at = None;
        self.generation += 1;
        true
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn configured_seconds(&self) -> u32 {
        self.configured_seconds
    }

    /// Identifies one start/stop cycle; ticks carrying an older value are stale
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Seconds left at `now`, 0 when inactive, never negative
    pub fn remaining_seconds(&self, now: Instant) -> f32 {
        let Some(started_at) = self.started_at else {
            return 0.0;
        };

        let elapsed = now.saturating_duration_since(started_at);
        Duration::from_secs(u64::from(self.configured_seconds))
            .saturating_sub(elapsed)
            .as_secs_f32()
    }

    /// Whether the countdown has run out at `now`
    pub fn is_elapsed(&self, now: Instant) -> bool {
        self.is_active() && self.remaining_seconds(now) < ELAPSED_EPSILON_SECONDS
    }
}
