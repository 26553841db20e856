//! Focus-restore bookkeeping

use crate::services::WindowHandle;

/// Which window should get magnified again once it regains focus
#[derive(Debug, Clone, Default)]
pub struct RestoreState {
    /// Window to re-magnify when it becomes foreground
    target: Option<WindowHandle>,
    /// Window that was magnified when the current session started
    current_source: Option<WindowHandle>,
}

impl RestoreState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn target(&self) -> Option<WindowHandle> {
        self.target
    }

    /// Returns `true` if the target changed
    pub fn set_target(&mut self, window: WindowHandle) -> bool {
        self.target.replace(window) != Some(window)
    }

    /// Returns `true` if a target was pending
    pub fn clear_target(&mut self) -> bool {
        self.target.take().is_some()
    }

    pub fn current_source(&self) -> Option<WindowHandle> {
        self.current_source
    }

    pub fn set_current_source(&mut self, window: Option<WindowHandle>) {
        self.current_source = window;
    }

    pub fn take_current_source(&mut self) -> Option<WindowHandle> {
        self.current_source.take()
    }
}
