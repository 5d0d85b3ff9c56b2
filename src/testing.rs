/*
 * Recording stand-in for the Win32 seam. It keeps a per-handle "current
 * window procedure", routes delivered messages to installed hooks the way the
 * native routing procedure does, and records every forwarded message and
 * frame call so tests can assert on them without a message loop.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::native_api::{FrameChange, FrameMargins, NativeWindowApi, WindowMessageHook};
use crate::types::{NativeWindowHandle, Point, Rect, WindowMessage, WindowProcAddress};

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Weak;

pub(crate) const ORIGINAL_PROC: WindowProcAddress = WindowProcAddress(0x4000);
pub(crate) const ROUTING_PROC: WindowProcAddress = WindowProcAddress(0x7777);
/// Value every "original" window procedure returns.
pub(crate) const ORIGINAL_REPLY: isize = 0x55;
pub(crate) const DEFAULT_REPLY: isize = 0x66;

#[derive(Default)]
struct FakeState {
    procs: HashMap<NativeWindowHandle, WindowProcAddress>,
    rects: HashMap<NativeWindowHandle, Rect>,
    hooks: HashMap<NativeWindowHandle, (WindowProcAddress, Weak<dyn WindowMessageHook>)>,
    restores: HashMap<NativeWindowHandle, usize>,
    cursor: Point,
    forwarded: Vec<(WindowProcAddress, NativeWindowHandle, WindowMessage)>,
    extended: Vec<(NativeWindowHandle, FrameMargins)>,
    frame_changes: Vec<(NativeWindowHandle, FrameChange)>,
    fail_install: bool,
    fail_restore: bool,
    fail_extend: bool,
    fail_frame_change: bool,
    fail_cursor: bool,
}

#[derive(Default)]
pub(crate) struct FakeWindowApi {
    state: RefCell<FakeState>,
}

impl FakeWindowApi {
    pub(crate) fn with_window(handle: NativeWindowHandle, proc_address: WindowProcAddress) -> Self {
        let api = Self::default();
        api.add_window(handle, proc_address, Rect::default());
        api
    }

    pub(crate) fn add_window(
        &self,
        handle: NativeWindowHandle,
        proc_address: WindowProcAddress,
        rect: Rect,
    ) {
        let mut state = self.state.borrow_mut();
        state.procs.insert(handle, proc_address);
        state.rects.insert(handle, rect);
    }

    pub(crate) fn set_cursor(&self, cursor: Point) {
        self.state.borrow_mut().cursor = cursor;
    }

    pub(crate) fn set_rect(&self, handle: NativeWindowHandle, rect: Rect) {
        self.state.borrow_mut().rects.insert(handle, rect);
    }

    pub(crate) fn fail_install(&self, fail: bool) {
        self.state.borrow_mut().fail_install = fail;
    }

    pub(crate) fn fail_restore(&self, fail: bool) {
        self.state.borrow_mut().fail_restore = fail;
    }

    pub(crate) fn fail_extend(&self, fail: bool) {
        self.state.borrow_mut().fail_extend = fail;
    }

    pub(crate) fn fail_frame_change(&self, fail: bool) {
        self.state.borrow_mut().fail_frame_change = fail;
    }

    pub(crate) fn fail_cursor(&self, fail: bool) {
        self.state.borrow_mut().fail_cursor = fail;
    }

    pub(crate) fn restore_count(&self, handle: NativeWindowHandle) -> usize {
        self.state
            .borrow()
            .restores
            .get(&handle)
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn forwarded(&self) -> Vec<(WindowProcAddress, NativeWindowHandle, WindowMessage)> {
        self.state.borrow().forwarded.clone()
    }

    pub(crate) fn extended_frames(&self) -> Vec<(NativeWindowHandle, FrameMargins)> {
        self.state.borrow().extended.clone()
    }

    pub(crate) fn frame_changes(&self) -> Vec<(NativeWindowHandle, FrameChange)> {
        self.state.borrow().frame_changes.clone()
    }

    pub(crate) fn is_intercepted(&self, handle: NativeWindowHandle) -> bool {
        self.state.borrow().hooks.contains_key(&handle)
    }

    /*
     * Delivers a message the way the native routing procedure would: to the
     * live hook if there is one, otherwise to whatever procedure is current.
     */
    pub(crate) fn deliver(&self, handle: NativeWindowHandle, message: WindowMessage) -> isize {
        let (routed, current) = {
            let state = self.state.borrow();
            (
                state.hooks.get(&handle).cloned(),
                state.procs.get(&handle).copied(),
            )
        };
        match routed {
            Some((original, hook)) => match hook.upgrade() {
                Some(hook) => hook.handle_message(message),
                None => self.call_window_proc(original, handle, message),
            },
            None => match current {
                Some(proc_address) => self.call_window_proc(proc_address, handle, message),
                None => self.default_window_proc(handle, message),
            },
        }
    }
}

impl NativeWindowApi for FakeWindowApi {
    fn install_window_proc(
        &self,
        handle: NativeWindowHandle,
        hook: Weak<dyn WindowMessageHook>,
    ) -> PlatformResult<WindowProcAddress> {
        let mut state = self.state.borrow_mut();
        if state.hooks.contains_key(&handle) {
            return Err(PlatformError::InvalidState(format!(
                "{handle:?} is already intercepted"
            )));
        }
        if state.fail_install {
            return Err(PlatformError::NativeCallFailure(
                "SetWindowLongPtrW failed".to_string(),
            ));
        }
        let Some(previous) = state.procs.insert(handle, ROUTING_PROC) else {
            state.procs.remove(&handle);
            return Err(PlatformError::NativeCallFailure(format!(
                "invalid window handle {handle:?}"
            )));
        };
        state.hooks.insert(handle, (previous, hook));
        Ok(previous)
    }

    fn restore_window_proc(
        &self,
        handle: NativeWindowHandle,
        original: WindowProcAddress,
    ) -> PlatformResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_restore {
            return Err(PlatformError::NativeCallFailure(
                "SetWindowLongPtrW failed".to_string(),
            ));
        }
        state.procs.insert(handle, original);
        state.hooks.remove(&handle);
        *state.restores.entry(handle).or_insert(0) += 1;
        Ok(())
    }

    fn current_window_proc(&self, handle: NativeWindowHandle) -> PlatformResult<WindowProcAddress> {
        self.state
            .borrow()
            .procs
            .get(&handle)
            .copied()
            .ok_or_else(|| {
                PlatformError::NativeCallFailure(format!("invalid window handle {handle:?}"))
            })
    }

    fn call_window_proc(
        &self,
        proc_address: WindowProcAddress,
        handle: NativeWindowHandle,
        message: WindowMessage,
    ) -> isize {
        self.state
            .borrow_mut()
            .forwarded
            .push((proc_address, handle, message));
        ORIGINAL_REPLY
    }

    fn default_window_proc(&self, _handle: NativeWindowHandle, _message: WindowMessage) -> isize {
        DEFAULT_REPLY
    }

    fn cursor_position(&self) -> PlatformResult<Point> {
        let state = self.state.borrow();
        if state.fail_cursor {
            return Err(PlatformError::NativeCallFailure(
                "GetCursorPos failed".to_string(),
            ));
        }
        Ok(state.cursor)
    }

    fn window_rect(&self, handle: NativeWindowHandle) -> PlatformResult<Rect> {
        self.state
            .borrow()
            .rects
            .get(&handle)
            .copied()
            .ok_or_else(|| PlatformError::NativeCallFailure(format!("no rect for {handle:?}")))
    }

    fn extend_frame_into_client_area(
        &self,
        handle: NativeWindowHandle,
        margins: FrameMargins,
    ) -> PlatformResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_extend {
            return Err(PlatformError::NativeCallFailure(
                "DwmExtendFrameIntoClientArea failed".to_string(),
            ));
        }
        state.extended.push((handle, margins));
        Ok(())
    }

    fn notify_frame_changed(
        &self,
        handle: NativeWindowHandle,
        change: FrameChange,
    ) -> PlatformResult<()> {
        let mut state = self.state.borrow_mut();
        if state.fail_frame_change {
            return Err(PlatformError::NativeCallFailure(
                "SetWindowPos failed".to_string(),
            ));
        }
        state.frame_changes.push((handle, change));
        Ok(())
    }
}
