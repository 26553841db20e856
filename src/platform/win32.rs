//! Win32 desktop backend

use std::{cell::RefCell, ffi::c_void, sync::mpsc, thread};
use anyhow::{anyhow, Context};
use tracing::{debug, error, warn};
use windows::Win32::{
    Foundation::{HMODULE, HWND, LPARAM, WPARAM},
    System::Threading::GetCurrentThreadId,
    UI::{
        Accessibility::{SetWinEventHook, UnhookWinEvent, HWINEVENTHOOK},
        WindowsAndMessaging::{
            DispatchMessageW, GetForegroundWindow, GetMessageW, GetWindowLongPtrW,
            GetWindowPlacement, IsWindow, PeekMessageW, PostThreadMessageW, SetWindowLongPtrW,
            SetWindowPos, TranslateMessage, GWL_STYLE, MSG, PM_NOREMOVE, SWP_FRAMECHANGED,
            SWP_NOMOVE, SWP_NOSIZE, SWP_NOZORDER, SW_SHOWMAXIMIZED, SW_SHOWMINIMIZED,
            SW_SHOWNORMAL, WINDOWPLACEMENT, WM_QUIT,
        },
    },
};

use crate::services::{
    Desktop, HookHandle, ShowState, WinEventCallback, WinEventHooks, WindowHandle, WindowStyle,
};

// WinEvent constants
const EVENT_SYSTEM_FOREGROUND: u32 = 0x0003;
const EVENT_OBJECT_DESTROY: u32 = 0x8001;
const WINEVENT_OUTOFCONTEXT: u32 = 0x0000;

fn to_hwnd(window: WindowHandle) -> HWND {
    HWND(window.raw() as usize as *mut c_void)
}

fn from_hwnd(hwnd: HWND) -> Option<WindowHandle> {
    WindowHandle::from_raw(hwnd.0 as usize as u64)
}

/// Live Win32 desktop
#[derive(Debug, Default)]
pub struct Win32Desktop;

impl Win32Desktop {
    pub fn new() -> Self {
        Self
    }
}

impl Desktop for Win32Desktop {
    fn is_window(&self, window: WindowHandle) -> bool {
        unsafe { IsWindow(to_hwnd(window)) }.as_bool()
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        from_hwnd(unsafe { GetForegroundWindow() })
    }

    fn show_state(&self, window: WindowHandle) -> ShowState {
        let mut placement = WINDOWPLACEMENT {
            length: std::mem::size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        };
        if let Err(e) = unsafe { GetWindowPlacement(to_hwnd(window), &mut placement) } {
            debug!("GetWindowPlacement failed for {}: {}", window, e);
            return ShowState::Other;
        }

        match placement.showCmd as i32 {
            cmd if cmd == SW_SHOWNORMAL.0 => ShowState::Normal,
            cmd if cmd == SW_SHOWMINIMIZED.0 => ShowState::Minimized,
            cmd if cmd == SW_SHOWMAXIMIZED.0 => ShowState::Maximized,
            0 => ShowState::Hidden,
            _ => ShowState::Other,
        }
    }

    fn window_style(&self, window: WindowHandle) -> WindowStyle {
        let style = unsafe { GetWindowLongPtrW(to_hwnd(window), GWL_STYLE) };
        WindowStyle(style as u32)
    }

    fn set_window_style(&self, window: WindowHandle, style: WindowStyle) {
        let hwnd = to_hwnd(window);
        unsafe {
            SetWindowLongPtrW(hwnd, GWL_STYLE, style.0 as isize);
            if let Err(e) = SetWindowPos(
                hwnd,
                HWND::default(),
                0,
                0,
                0,
                0,
                SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_FRAMECHANGED,
            ) {
                warn!("SetWindowPos failed for {}: {}", window, e);
            }
        }
    }
}

thread_local! {
    // Callback for the hooks installed on this thread
    static HOOK_CALLBACK: RefCell<Option<WinEventCallback>> = const { RefCell::new(None) };
}

unsafe extern "system" fn win_event_proc(
    _hook: HWINEVENTHOOK,
    _event: u32,
    _hwnd: HWND,
    _id_object: i32,
    _id_child: i32,
    _id_event_thread: u32,
    _event_time: u32,
) {
    let result = std::panic::catch_unwind(|| {
        let callback = HOOK_CALLBACK.with(|cb| cb.borrow().clone());
        if let Some(callback) = callback {
            callback();
        }
    });
    if result.is_err() {
        error!("Panic in WinEvent callback");
    }
}

/// Installs out-of-context WinEvent hooks on a dedicated message-pump thread
#[derive(Debug, Default)]
pub struct Win32EventHooks;

impl Win32EventHooks {
    pub fn new() -> Self {
        Self
    }
}

impl WinEventHooks for Win32EventHooks {
    fn install(&self, callback: WinEventCallback) -> anyhow::Result<HookHandle> {
        let (ready_tx, ready_rx) = mpsc::sync_channel::<Result<u32, String>>(1);

        let pump = thread::Builder::new()
            .name("winevent-hooks".to_string())
            .spawn(move || hook_thread(callback, ready_tx))
            .context("failed to spawn hook thread")?;

        let thread_id = ready_rx
            .recv()
            .context("hook thread exited before reporting")?
            .map_err(|e| anyhow!(e))?;

        Ok(HookHandle::new(move || {
            if let Err(e) = unsafe { PostThreadMessageW(thread_id, WM_QUIT, WPARAM(0), LPARAM(0)) } {
                warn!("Failed to stop hook thread: {}", e);
                return;
            }
            if pump.join().is_err() {
                warn!("Hook thread panicked");
            }
        }))
    }
}

fn hook_thread(callback: WinEventCallback, ready_tx: mpsc::SyncSender<Result<u32, String>>) {
    HOOK_CALLBACK.with(|cb| *cb.borrow_mut() = Some(callback));

    let hooks: Vec<HWINEVENTHOOK> = [EVENT_SYSTEM_FOREGROUND, EVENT_OBJECT_DESTROY]
        .into_iter()
        .map(|event| unsafe {
            SetWinEventHook(
                event,
                event,
                HMODULE::default(),
                Some(win_event_proc),
                0,
                0,
                WINEVENT_OUTOFCONTEXT,
            )
        })
        .collect();

    if hooks.iter().any(|h| h.is_invalid()) {
        for hook in hooks.iter().filter(|h| !h.is_invalid()) {
            unsafe {
                let _ = UnhookWinEvent(*hook);
            }
        }
        let _ = ready_tx.send(Err("SetWinEventHook failed".to_string()));
        return;
    }

    let mut msg = MSG::default();
    unsafe {
        // Make sure the thread has a message queue before reporting in
        let _ = PeekMessageW(&mut msg, HWND::default(), 0, 0, PM_NOREMOVE);
    }
    let reported = ready_tx.send(Ok(unsafe { GetCurrentThreadId() })).is_ok();
    debug!("WinEvent hooks installed");

    unsafe {
        while reported && GetMessageW(&mut msg, HWND::default(), 0, 0).0 > 0 {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }

        for hook in hooks {
            let _ = UnhookWinEvent(hook);
        }
    }
    HOOK_CALLBACK.with(|cb| *cb.borrow_mut() = None);
    debug!("WinEvent hooks removed");
}
