//! Scale-activation controller
//!
//! Decides, from hotkeys, countdown completion, runtime running changes and
//! foreground notifications, when to start or stop magnification and which
//! window should be magnified again when it regains focus.
//!
//! The controller is owned by the UI task and mutated only through
//! [`ScaleController::handle`]. Every handler re-reads the runtime, settings
//! and desktop instead of trusting what was true when the message was posted.

use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tracing::{debug, info};

use crate::{
    dispatch::{HotkeyAction, UiDispatcher, UiMessage},
    services::{AppSettings, Desktop, MagRuntime, ShowState, WinEventHooks, WindowHandle, WindowStyle},
    state::{ActivationState, ControllerSnapshot, RestoreState, ShellEvent},
    tasks::{CountdownTimer, ForegroundTracker, TickOutcome},
};

/// Collaborators the controller is built from
#[derive(Clone)]
pub struct ControllerDeps {
    pub runtime: Arc<dyn MagRuntime>,
    pub desktop: Arc<dyn Desktop>,
    pub hooks: Arc<dyn WinEventHooks>,
    pub settings: Arc<AppSettings>,
    /// Window whose resizable frame is put back when magnification ends
    pub host_window: Option<WindowHandle>,
}

pub struct ScaleController {
    runtime: Arc<dyn MagRuntime>,
    desktop: Arc<dyn Desktop>,
    settings: Arc<AppSettings>,
    host_window: Option<WindowHandle>,
    countdown: CountdownTimer,
    tracker: ForegroundTracker,
    restore: RestoreState,
    events: broadcast::Sender<ShellEvent>,
    snapshot_tx: watch::Sender<ControllerSnapshot>,
}

impl ScaleController {
    pub fn new(
        deps: ControllerDeps,
        dispatcher: UiDispatcher,
        events: broadcast::Sender<ShellEvent>,
        snapshot_tx: watch::Sender<ControllerSnapshot>,
    ) -> Self {
        let mut controller = Self {
            runtime: deps.runtime,
            desktop: deps.desktop,
            settings: deps.settings,
            host_window: deps.host_window,
            countdown: CountdownTimer::new(dispatcher.clone(), events.clone()),
            tracker: ForegroundTracker::new(deps.hooks, dispatcher),
            restore: RestoreState::new(),
            events,
            snapshot_tx,
        };
        controller.update_auto_restore();
        controller.publish_snapshot();
        controller
    }

    /// Handle one UI message. Returns `false` on shutdown.
    pub fn handle(&mut self, message: UiMessage) -> bool {
        debug!("Handling {:?}", message);
        match message {
            UiMessage::Hotkey(action) => self.on_hotkey(action),
            UiMessage::StartCountdown => self.countdown.start(self.settings.down_count()),
            UiMessage::StopCountdown => self.countdown.stop(),
            UiMessage::CountdownTick { generation } => self.on_countdown_tick(generation),
            UiMessage::RunningChanged => self.on_running_changed(),
            UiMessage::AutoRestoreChanged => self.update_auto_restore(),
            UiMessage::CheckForeground => self.check_foreground(),
            UiMessage::ClearRestoreTarget => self.clear_restore_target(),
            UiMessage::Shutdown => {
                self.shutdown();
                return false;
            }
        }
        self.publish_snapshot();
        true
    }

    pub fn activation_state(&self) -> ActivationState {
        ActivationState::derive(self.runtime.is_running(), self.countdown.is_counting_down())
    }

    pub fn restore_target(&self) -> Option<WindowHandle> {
        self.restore.target()
    }

    pub fn current_source(&self) -> Option<WindowHandle> {
        self.restore.current_source()
    }

    pub fn is_counting_down(&self) -> bool {
        self.countdown.is_counting_down()
    }

    pub fn countdown_remaining(&self) -> f32 {
        self.countdown.remaining_seconds()
    }

    pub fn is_tracker_armed(&self) -> bool {
        self.tracker.is_armed()
    }

    /// Forget the pending restore target
    fn clear_restore_target(&mut self) {
        if self.restore.clear_target() {
            info!("Restore target cleared");
            self.emit(ShellEvent::RestoreTargetChanged(None));
        }
    }

    fn on_hotkey(&mut self, action: HotkeyAction) {
        match action {
            HotkeyAction::Scale => {
                if self.runtime.is_running() {
                    info!("Scale hotkey: stopping runtime");
                    self.runtime.stop();
                    return;
                }
                self.start_scale(None);
            }
            HotkeyAction::Overlay => {
                if self.runtime.is_running() {
                    self.runtime.toggle_overlay();
                } else {
                    debug!("Overlay hotkey ignored, runtime not running");
                }
            }
        }
    }

    fn on_countdown_tick(&mut self, generation: u64) {
        if self.countdown.on_tick(generation) == TickOutcome::Elapsed {
            self.start_scale(None);
        }
    }

    fn on_running_changed(&mut self) {
        if self.runtime.is_running() {
            info!("Runtime started");
            self.countdown.stop();

            if self.settings.is_auto_restore() {
                self.restore.set_current_source(self.runtime.hwnd_src());
                self.clear_restore_target();
            }
        } else {
            info!("Runtime stopped");
            self.restore_host_frame();

            if self.settings.is_auto_restore() {
                // If focus never left the source window there is nothing to restore
                if let Some(source) = self.restore.take_current_source() {
                    if self.desktop.is_window(source)
                        && self.desktop.foreground_window() != Some(source)
                        && self.restore.set_target(source)
                    {
                        info!("Remembering {} for restore", source);
                        self.emit(ShellEvent::RestoreTargetChanged(Some(source)));
                    }
                }
            }
        }
    }

    /// Put back the host window's sizing border if magnification removed it
    fn restore_host_frame(&self) {
        let Some(host) = self.host_window else {
            return;
        };

        let style = self.desktop.window_style(host);
        if !style.contains(WindowStyle::RESIZABLE_FRAME) {
            debug!("Restoring resizable frame on host window {}", host);
            self.desktop
                .set_window_style(host, style.with(WindowStyle::RESIZABLE_FRAME));
        }
    }

    fn update_auto_restore(&mut self) {
        if self.settings.is_auto_restore() {
            // Takes effect immediately, even mid-session
            self.restore.set_current_source(self.runtime.hwnd_src());
            self.tracker.arm();
        } else {
            self.restore.set_current_source(None);
            self.clear_restore_target();
            self.tracker.disarm();
        }
    }

    fn check_foreground(&mut self) {
        let Some(target) = self.restore.target() else {
            return;
        };
        if self.runtime.is_running() {
            return;
        }

        if !self.desktop.is_window(target) {
            info!("Restore target {} no longer exists", target);
            self.clear_restore_target();
            return;
        }

        if self.desktop.foreground_window() != Some(target) {
            return;
        }

        info!("Restore target {} regained focus", target);
        self.start_scale(Some(target));
    }

    /// Ask the runtime to magnify `target`, or the foreground window
    fn start_scale(&mut self, target: Option<WindowHandle>) {
        let Some(window) = target.or_else(|| self.desktop.foreground_window()) else {
            debug!("No window to magnify");
            return;
        };

        let show_state = self.desktop.show_state(window);
        if show_state != ShowState::Normal {
            debug!("Window {} is {:?}, not magnifying", window, show_state);
            return;
        }

        let mut settings = self.settings.settings_for(Some(window));
        settings.apply_global(&self.settings.global_flags());

        info!("Starting magnification of {}", window);
        self.runtime.run(window, settings);
    }

    fn shutdown(&mut self) {
        info!("Controller shutting down");
        self.countdown.stop();
        self.tracker.disarm();
        self.publish_snapshot();
    }

    fn emit(&self, event: ShellEvent) {
        let _ = self.events.send(event);
    }

    fn publish_snapshot(&self) {
        let counting_down = self.countdown.is_counting_down();
        self.snapshot_tx.send_replace(ControllerSnapshot {
            state: self.activation_state(),
            countdown_remaining_seconds: counting_down.then(|| self.countdown.remaining_seconds()),
            restore_target: self.restore.target(),
            current_source: self.restore.current_source(),
            auto_restore: self.settings.is_auto_restore(),
            tracker_armed: self.tracker.is_armed(),
        });
    }
}

impl std::fmt::Debug for ScaleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaleController")
            .field("countdown", &self.countdown)
            .field("tracker", &self.tracker)
            .field("restore", &self.restore)
            .field("host_window", &self.host_window)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    use crate::{
        platform::SimulatedDesktop,
        services::{GlobalFlags, LoopbackRuntime, MagSettings},
    };

    fn hwnd(raw: u64) -> WindowHandle {
        WindowHandle::from_raw(raw).unwrap()
    }

    struct Harness {
        controller: ScaleController,
        runtime: Arc<LoopbackRuntime>,
        desktop: Arc<SimulatedDesktop>,
        settings: Arc<AppSettings>,
        events: broadcast::Receiver<ShellEvent>,
        _ui: mpsc::UnboundedReceiver<UiMessage>,
    }

    impl Harness {
        fn new(auto_restore: bool, host_window: Option<WindowHandle>) -> Self {
            let runtime = Arc::new(LoopbackRuntime::new());
            let desktop = Arc::new(SimulatedDesktop::new());
            let settings = Arc::new(AppSettings::new(3, auto_restore, GlobalFlags::default()));
            let (dispatcher, ui) = UiDispatcher::channel();
            let (events_tx, events) = broadcast::channel(64);
            let (snapshot_tx, _) = watch::channel(ControllerSnapshot::new());

            let controller = ScaleController::new(
                ControllerDeps {
                    runtime: runtime.clone(),
                    desktop: desktop.clone(),
                    hooks: desktop.clone(),
                    settings: settings.clone(),
                    host_window,
                },
                dispatcher,
                events_tx,
                snapshot_tx,
            );

            Self { controller, runtime, desktop, settings, events, _ui: ui }
        }

        /// Deliver the runtime's running-changed notification
        fn sync_running(&mut self) {
            self.controller.handle(UiMessage::RunningChanged);
        }

        fn drain_events(&mut self) -> Vec<ShellEvent> {
            let mut out = Vec::new();
            while let Ok(event) = self.events.try_recv() {
                out.push(event);
            }
            out
        }

        fn restore_events(&mut self) -> Vec<Option<WindowHandle>> {
            self.drain_events()
                .into_iter()
                .filter_map(|e| match e {
                    ShellEvent::RestoreTargetChanged(target) => Some(target),
                    _ => None,
                })
                .collect()
        }
    }

    #[tokio::test]
    async fn scale_hotkey_magnifies_foreground_window() {
        let mut h = Harness::new(false, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        h.desktop.set_foreground(Some(w1));

        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();

        assert_eq!(h.runtime.run_calls(), vec![w1]);
        assert_eq!(h.controller.activation_state(), ActivationState::Running);
    }

    #[tokio::test]
    async fn scale_hotkey_while_running_stops_without_starting() {
        let mut h = Harness::new(false, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        h.desktop.set_foreground(Some(w1));
        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();

        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();

        assert_eq!(h.runtime.stop_calls(), 1);
        assert_eq!(h.runtime.run_calls(), vec![w1]);
        assert_eq!(h.controller.activation_state(), ActivationState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn scale_hotkey_stops_runtime_regardless_of_countdown() {
        let mut h = Harness::new(false, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        h.desktop.set_foreground(Some(w1));
        h.runtime.run(w1, MagSettings::default());
        h.sync_running();

        h.controller.handle(UiMessage::StartCountdown);
        assert!(h.controller.is_counting_down());
        assert_eq!(h.controller.activation_state(), ActivationState::Running);
        let generation = h.controller.countdown.state().generation();

        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();
        assert_eq!(h.runtime.stop_calls(), 1);
        assert_eq!(h.runtime.run_calls(), vec![w1]);
        assert_eq!(h.controller.activation_state(), ActivationState::CountingDown);

        // The countdown keeps going and activates on its own
        tokio::time::advance(std::time::Duration::from_secs(3)).await;
        h.controller.handle(UiMessage::CountdownTick { generation });
        assert_eq!(h.runtime.run_calls(), vec![w1, w1]);
        assert!(!h.controller.is_counting_down());
    }

    #[tokio::test]
    async fn overlay_hotkey_only_acts_while_running() {
        let mut h = Harness::new(false, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        h.desktop.set_foreground(Some(w1));

        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Overlay));
        assert!(h.runtime.session().is_none());

        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Overlay));
        assert!(h.runtime.session().unwrap().overlay_visible);
    }

    #[tokio::test]
    async fn minimized_window_is_never_magnified() {
        let mut h = Harness::new(false, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        h.desktop.set_foreground(Some(w1));
        h.desktop.set_show_state(w1, ShowState::Minimized);

        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        assert!(h.runtime.run_calls().is_empty());

        h.desktop.set_show_state(w1, ShowState::Maximized);
        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        assert!(h.runtime.run_calls().is_empty());
    }

    #[tokio::test]
    async fn no_foreground_window_is_a_no_op() {
        let mut h = Harness::new(false, None);
        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        assert!(h.runtime.run_calls().is_empty());
    }

    #[tokio::test]
    async fn global_flags_reach_the_runtime() {
        let mut h = Harness::new(false, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        h.desktop.set_foreground(Some(w1));
        h.settings.set_profile(w1, MagSettings {
            is_show_fps: true,
            is_breakpoint_mode: true,
            ..MagSettings::default()
        });
        h.settings.set_global_flags(GlobalFlags {
            simulate_exclusive_fullscreen: true,
            ..GlobalFlags::default()
        });

        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));

        let settings = h.runtime.session().unwrap().settings;
        assert!(settings.is_show_fps);
        assert!(!settings.is_breakpoint_mode);
        assert!(settings.is_simulate_exclusive_fullscreen);
    }

    #[tokio::test(start_paused = true)]
    async fn elapsed_countdown_activates_once() {
        let mut h = Harness::new(false, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        h.desktop.set_foreground(Some(w1));

        h.controller.handle(UiMessage::StartCountdown);
        assert_eq!(h.controller.activation_state(), ActivationState::CountingDown);
        let generation = h.controller.countdown.state().generation();

        tokio::time::advance(std::time::Duration::from_millis(1500)).await;
        h.controller.handle(UiMessage::CountdownTick { generation });
        assert!(h.runtime.run_calls().is_empty());

        tokio::time::advance(std::time::Duration::from_millis(1500)).await;
        h.controller.handle(UiMessage::CountdownTick { generation });
        h.controller.handle(UiMessage::CountdownTick { generation });

        assert_eq!(h.runtime.run_calls(), vec![w1]);
        assert!(!h.controller.is_counting_down());

        let events = h.drain_events();
        let ticks_after_stop = events
            .iter()
            .skip_while(|e| **e != ShellEvent::CountdownActivationChanged(false))
            .filter(|e| matches!(e, ShellEvent::CountdownTick(_)))
            .count();
        assert_eq!(ticks_after_stop, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn runtime_start_stops_countdown() {
        let mut h = Harness::new(false, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        h.desktop.set_foreground(Some(w1));

        h.controller.handle(UiMessage::StartCountdown);
        h.runtime.run(w1, MagSettings::default());
        h.sync_running();

        assert!(!h.controller.is_counting_down());
        assert_eq!(h.controller.activation_state(), ActivationState::Running);
    }

    #[tokio::test]
    async fn host_frame_is_restored_when_runtime_stops() {
        let host = hwnd(0x1);
        let mut h = Harness::new(false, Some(host));
        h.desktop.open_window(host);
        h.desktop.set_window_style(host, WindowStyle(0x00C0_0000));
        let w1 = h.desktop.open_window(hwnd(0x10));
        h.desktop.set_foreground(Some(w1));

        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();
        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();

        assert_eq!(
            h.desktop.window_style(host),
            WindowStyle(0x00C0_0000 | WindowStyle::RESIZABLE_FRAME)
        );
    }

    #[tokio::test]
    async fn focus_leaving_source_remembers_and_restores_it() {
        let mut h = Harness::new(true, None);
        assert!(h.controller.is_tracker_armed());
        let w1 = h.desktop.open_window(hwnd(0x10));
        let w2 = h.desktop.open_window(hwnd(0x20));
        h.desktop.set_foreground(Some(w1));

        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();
        assert_eq!(h.controller.current_source(), Some(w1));

        h.desktop.set_foreground(Some(w2));
        h.runtime.stop();
        h.sync_running();

        assert_eq!(h.controller.restore_target(), Some(w1));
        assert_eq!(h.controller.current_source(), None);
        assert_eq!(h.restore_events(), vec![Some(w1)]);

        // Unrelated foreground changes do nothing
        h.controller.handle(UiMessage::CheckForeground);
        assert_eq!(h.runtime.run_calls(), vec![w1]);

        h.desktop.set_foreground(Some(w1));
        h.controller.handle(UiMessage::CheckForeground);
        h.controller.handle(UiMessage::CheckForeground);
        h.sync_running();

        assert_eq!(h.runtime.run_calls(), vec![w1, w1]);
        assert_eq!(h.controller.restore_target(), None);
        assert_eq!(h.restore_events(), vec![None]);
    }

    #[tokio::test]
    async fn stopping_with_source_still_foreground_remembers_nothing() {
        let mut h = Harness::new(true, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        h.desktop.set_foreground(Some(w1));

        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();
        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();

        assert_eq!(h.controller.restore_target(), None);
        assert!(h.restore_events().is_empty());
    }

    #[tokio::test]
    async fn destroyed_target_is_forgotten() {
        let mut h = Harness::new(true, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        let w2 = h.desktop.open_window(hwnd(0x20));
        h.desktop.set_foreground(Some(w1));
        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();
        h.desktop.set_foreground(Some(w2));
        h.runtime.stop();
        h.sync_running();
        assert_eq!(h.restore_events(), vec![Some(w1)]);

        h.desktop.destroy_window(w1);
        h.controller.handle(UiMessage::CheckForeground);

        assert_eq!(h.controller.restore_target(), None);
        assert_eq!(h.restore_events(), vec![None]);
        assert_eq!(h.runtime.run_calls(), vec![w1]);
    }

    #[tokio::test]
    async fn check_foreground_ignored_while_running() {
        let mut h = Harness::new(true, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        let w2 = h.desktop.open_window(hwnd(0x20));
        h.desktop.set_foreground(Some(w1));
        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();
        h.desktop.set_foreground(Some(w2));
        h.runtime.stop();
        h.sync_running();

        // Something else got magnified in the meantime
        h.runtime.run(w2, MagSettings::default());
        h.desktop.set_foreground(Some(w1));
        h.controller.handle(UiMessage::CheckForeground);

        assert_eq!(h.runtime.run_calls(), vec![w1, w2]);
    }

    #[tokio::test]
    async fn disabling_auto_restore_clears_and_disarms() {
        let mut h = Harness::new(true, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        let w2 = h.desktop.open_window(hwnd(0x20));
        h.desktop.set_foreground(Some(w1));
        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();
        h.desktop.set_foreground(Some(w2));
        h.runtime.stop();
        h.sync_running();
        assert_eq!(h.controller.restore_target(), Some(w1));
        assert_eq!(h.desktop.installed_hooks(), 1);

        h.settings.set_auto_restore(false);
        h.controller.handle(UiMessage::AutoRestoreChanged);

        assert_eq!(h.controller.restore_target(), None);
        assert_eq!(h.controller.current_source(), None);
        assert!(!h.controller.is_tracker_armed());
        assert_eq!(h.desktop.installed_hooks(), 0);
    }

    #[tokio::test]
    async fn enabling_auto_restore_mid_session_captures_source() {
        let mut h = Harness::new(false, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        let w2 = h.desktop.open_window(hwnd(0x20));
        h.desktop.set_foreground(Some(w1));
        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();
        assert_eq!(h.controller.current_source(), None);

        h.settings.set_auto_restore(true);
        h.controller.handle(UiMessage::AutoRestoreChanged);
        assert_eq!(h.controller.current_source(), Some(w1));
        assert!(h.controller.is_tracker_armed());

        h.desktop.set_foreground(Some(w2));
        h.runtime.stop();
        h.sync_running();
        assert_eq!(h.controller.restore_target(), Some(w1));
    }

    #[tokio::test]
    async fn clear_restore_target_forgets_pending_window_once() {
        let mut h = Harness::new(true, None);
        let w1 = h.desktop.open_window(hwnd(0x10));
        let w2 = h.desktop.open_window(hwnd(0x20));
        h.desktop.set_foreground(Some(w1));
        h.controller.handle(UiMessage::Hotkey(HotkeyAction::Scale));
        h.sync_running();
        h.desktop.set_foreground(Some(w2));
        h.runtime.stop();
        h.sync_running();
        assert_eq!(h.controller.restore_target(), Some(w1));
        assert_eq!(h.restore_events(), vec![Some(w1)]);

        h.controller.handle(UiMessage::ClearRestoreTarget);
        assert_eq!(h.controller.restore_target(), None);
        assert_eq!(h.restore_events(), vec![None]);

        h.controller.handle(UiMessage::ClearRestoreTarget);
        assert!(h.restore_events().is_empty());

        // Nothing left to bring back
        h.desktop.set_foreground(Some(w1));
        h.controller.handle(UiMessage::CheckForeground);
        assert_eq!(h.runtime.run_calls(), vec![w1]);
    }

    #[tokio::test]
    async fn shutdown_disarms_tracker() {
        let mut h = Harness::new(true, None);
        assert!(!h.controller.handle(UiMessage::Shutdown));
        assert!(!h.controller.is_tracker_armed());
        assert_eq!(h.desktop.installed_hooks(), 0);
    }
}
