/*
 * The OS seam of the crate. Decorations and the interceptor never call Win32
 * directly; they go through `NativeWindowApi`, which `window_common` implements
 * on Windows and the test fake implements everywhere else. Every method is a
 * direct, synchronous call made on the window's own thread.
 */
use crate::error::Result as PlatformResult;
use crate::types::{NativeWindowHandle, Point, Rect, WindowMessage, WindowProcAddress};

use std::rc::Weak;

/*
 * Receiver of messages for an intercepted window. The native window procedure
 * looks the hook up by handle and hands it every message; the hook returns the
 * `LRESULT` value.
 */
pub trait WindowMessageHook {
    fn handle_message(&self, message: WindowMessage) -> isize;
}

/// Margins passed to the DWM when extending the frame into the client area.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameMargins {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl FrameMargins {
    pub const ZERO: FrameMargins = FrameMargins {
        left: 0,
        right: 0,
        top: 0,
        bottom: 0,
    };
}

/*
 * Options for the frame-changed re-layout. The window never moves, resizes or
 * changes z-order; only whether owned windows are reordered varies.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameChange {
    pub keep_owner_z_order: bool,
}

pub trait NativeWindowApi {
    /*
     * Replaces the window procedure of `handle` with the crate's routing
     * procedure and associates `hook` with the handle. Returns the previous
     * procedure. Fails if the handle is already intercepted.
     */
    fn install_window_proc(
        &self,
        handle: NativeWindowHandle,
        hook: Weak<dyn WindowMessageHook>,
    ) -> PlatformResult<WindowProcAddress>;

    /// Puts `original` back as the window procedure and forgets the hook.
    fn restore_window_proc(
        &self,
        handle: NativeWindowHandle,
        original: WindowProcAddress,
    ) -> PlatformResult<()>;

    fn current_window_proc(&self, handle: NativeWindowHandle) -> PlatformResult<WindowProcAddress>;

    fn call_window_proc(
        &self,
        proc_address: WindowProcAddress,
        handle: NativeWindowHandle,
        message: WindowMessage,
    ) -> isize;

    fn default_window_proc(&self, handle: NativeWindowHandle, message: WindowMessage) -> isize;

    /// Cursor position in screen coordinates.
    fn cursor_position(&self) -> PlatformResult<Point>;

    /// Window rectangle in screen coordinates, frame included.
    fn window_rect(&self, handle: NativeWindowHandle) -> PlatformResult<Rect>;

    fn extend_frame_into_client_area(
        &self,
        handle: NativeWindowHandle,
        margins: FrameMargins,
    ) -> PlatformResult<()>;

    /// Forces the OS to recompute the non-client area and redraw the frame.
    fn notify_frame_changed(
        &self,
        handle: NativeWindowHandle,
        change: FrameChange,
    ) -> PlatformResult<()>;
}
