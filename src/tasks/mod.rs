//! Background tasks module
//!
//! The UI task that owns the controller, the countdown ticker, the
//! foreground tracker and the relays that feed the UI queue.

pub mod countdown_timer;
pub mod event_log;
pub mod foreground_tracker;
pub mod relay;
pub mod ui_loop;

// Re-export main types
pub use countdown_timer::{CountdownTimer, TickOutcome, TICK_INTERVAL};
pub use event_log::event_log_task;
pub use foreground_tracker::ForegroundTracker;
pub use relay::{relay_changes, Subscription};
pub use ui_loop::ui_loop_task;
