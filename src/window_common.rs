/*
 * Win32 side of the crate. This module owns the routing window procedure that
 * replaces the host's procedure on every intercepted window, the per-thread
 * table mapping an intercepted HWND to its Rust hook and saved original
 * procedure, and `Win32WindowApi`, the `NativeWindowApi` implementation the
 * decorations use in production.
 *
 * Everything here must run on the thread that owns the windows involved; the
 * table is thread-local for that reason.
 */
use crate::binder::{HostWindow, RenderSurfacePath, resolve_surface_path};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::native_api::{FrameChange, FrameMargins, NativeWindowApi, WindowMessageHook};
use crate::types::{NativeWindowHandle, Point, Rect, WindowMessage, WindowProcAddress};

use windows::Win32::{
    Foundation::{GetLastError, HWND, LPARAM, LRESULT, POINT, RECT, SetLastError, WIN32_ERROR, WPARAM},
    Graphics::Dwm::DwmExtendFrameIntoClientArea,
    UI::Controls::MARGINS,
    UI::WindowsAndMessaging::{
        CallWindowProcW, DefWindowProcW, GW_CHILD, GW_HWNDNEXT, GWLP_WNDPROC, GetCursorPos,
        GetWindow, GetWindowLongPtrW, GetWindowRect, SWP_FRAMECHANGED, SWP_NOMOVE,
        SWP_NOOWNERZORDER, SWP_NOSIZE, SWP_NOZORDER, SetWindowLongPtrW, SetWindowPos, WNDPROC,
    },
};

use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::c_void;
use std::rc::Weak;

#[derive(Clone)]
struct InterceptedWindow {
    original: WindowProcAddress,
    hook: Weak<dyn WindowMessageHook>,
}

thread_local! {
    static INTERCEPTED_WINDOWS: RefCell<HashMap<NativeWindowHandle, InterceptedWindow>> =
        RefCell::new(HashMap::new());
}

pub(crate) fn hwnd_from_handle(handle: NativeWindowHandle) -> HWND {
    HWND(handle.0 as *mut c_void)
}

pub(crate) fn handle_from_hwnd(hwnd: HWND) -> NativeWindowHandle {
    NativeWindowHandle(hwnd.0 as isize)
}

fn wndproc_from_address(address: WindowProcAddress) -> WNDPROC {
    unsafe { std::mem::transmute::<isize, WNDPROC>(address.0) }
}

/// Address of the routing procedure installed on intercepted windows.
#[allow(clippy::fn_to_numeric_cast)]
pub(crate) fn routing_proc_address() -> WindowProcAddress {
    WindowProcAddress(decoration_wnd_proc as isize)
}

fn lookup_intercepted(handle: NativeWindowHandle) -> Option<InterceptedWindow> {
    INTERCEPTED_WINDOWS
        .try_with(|windows| windows.borrow().get(&handle).cloned())
        .ok()
        .flatten()
}

/*
 * Routing window procedure. The table borrow is released before the hook runs
 * because forwarding to the original procedure can synchronously deliver
 * further messages to this same window. A hook whose decoration has been
 * dropped without restoring degrades to plain forwarding.
 */
unsafe extern "system" fn decoration_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    let handle = handle_from_hwnd(hwnd);
    match lookup_intercepted(handle) {
        Some(entry) => match entry.hook.upgrade() {
            Some(hook) => LRESULT(hook.handle_message(WindowMessage::new(msg, wparam.0, lparam.0))),
            None => unsafe {
                CallWindowProcW(
                    wndproc_from_address(entry.original),
                    hwnd,
                    msg,
                    wparam,
                    lparam,
                )
            },
        },
        None => {
            log::warn!("decoration_wnd_proc: message 0x{msg:04X} for unknown window {handle:?}");
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }
    }
}

fn last_error_message(call: &str, handle: NativeWindowHandle, error: WIN32_ERROR) -> String {
    format!("{call} failed for {handle:?}: {error:?}")
}

/// `NativeWindowApi` backed by user32 and dwmapi.
#[derive(Debug, Default, Clone, Copy)]
pub struct Win32WindowApi;

impl NativeWindowApi for Win32WindowApi {
    fn install_window_proc(
        &self,
        handle: NativeWindowHandle,
        hook: Weak<dyn WindowMessageHook>,
    ) -> PlatformResult<WindowProcAddress> {
        if lookup_intercepted(handle).is_some() {
            return Err(PlatformError::InvalidState(format!(
                "{handle:?} already has an active interceptor"
            )));
        }
        let hwnd = hwnd_from_handle(handle);
        let current = unsafe { GetWindowLongPtrW(hwnd, GWLP_WNDPROC) };
        if current == 0 {
            let error = unsafe { GetLastError() };
            log::error!("Win32WindowApi: GetWindowLongPtrW failed for {handle:?}: {error:?}");
            return Err(PlatformError::NativeCallFailure(last_error_message(
                "GetWindowLongPtrW",
                handle,
                error,
            )));
        }

        // Registered before the swap so the first routed message finds its hook.
        INTERCEPTED_WINDOWS.with(|windows| {
            windows.borrow_mut().insert(
                handle,
                InterceptedWindow {
                    original: WindowProcAddress(current),
                    hook,
                },
            )
        });

        let previous = unsafe {
            SetLastError(WIN32_ERROR(0));
            SetWindowLongPtrW(hwnd, GWLP_WNDPROC, routing_proc_address().0)
        };
        if previous == 0 {
            let error = unsafe { GetLastError() };
            if error.0 != 0 {
                INTERCEPTED_WINDOWS.with(|windows| windows.borrow_mut().remove(&handle));
                log::error!("Win32WindowApi: SetWindowLongPtrW failed for {handle:?}: {error:?}");
                return Err(PlatformError::NativeCallFailure(last_error_message(
                    "SetWindowLongPtrW",
                    handle,
                    error,
                )));
            }
        }
        if previous != current {
            INTERCEPTED_WINDOWS.with(|windows| {
                if let Some(entry) = windows.borrow_mut().get_mut(&handle) {
                    entry.original = WindowProcAddress(previous);
                }
            });
        }
        log::debug!("Win32WindowApi: routing {handle:?}, original procedure 0x{previous:X}");
        Ok(WindowProcAddress(previous))
    }

    fn restore_window_proc(
        &self,
        handle: NativeWindowHandle,
        original: WindowProcAddress,
    ) -> PlatformResult<()> {
        let hwnd = hwnd_from_handle(handle);
        let replaced = unsafe {
            SetLastError(WIN32_ERROR(0));
            SetWindowLongPtrW(hwnd, GWLP_WNDPROC, original.0)
        };
        if replaced == 0 {
            let error = unsafe { GetLastError() };
            if error.0 != 0 {
                log::error!("Win32WindowApi: restoring procedure of {handle:?} failed: {error:?}");
                return Err(PlatformError::NativeCallFailure(last_error_message(
                    "SetWindowLongPtrW",
                    handle,
                    error,
                )));
            }
        }
        if WindowProcAddress(replaced) != routing_proc_address() {
            log::warn!(
                "Win32WindowApi: {handle:?} was subclassed again after interception (0x{replaced:X}); restoring the original anyway"
            );
        }
        INTERCEPTED_WINDOWS.with(|windows| windows.borrow_mut().remove(&handle));
        Ok(())
    }

    fn current_window_proc(&self, handle: NativeWindowHandle) -> PlatformResult<WindowProcAddress> {
        let address = unsafe { GetWindowLongPtrW(hwnd_from_handle(handle), GWLP_WNDPROC) };
        if address == 0 {
            let error = unsafe { GetLastError() };
            return Err(PlatformError::NativeCallFailure(last_error_message(
                "GetWindowLongPtrW",
                handle,
                error,
            )));
        }
        Ok(WindowProcAddress(address))
    }

    fn call_window_proc(
        &self,
        proc_address: WindowProcAddress,
        handle: NativeWindowHandle,
        message: WindowMessage,
    ) -> isize {
        unsafe {
            CallWindowProcW(
                wndproc_from_address(proc_address),
                hwnd_from_handle(handle),
                message.id,
                WPARAM(message.wparam),
                LPARAM(message.lparam),
            )
        }
        .0
    }

    fn default_window_proc(&self, handle: NativeWindowHandle, message: WindowMessage) -> isize {
        unsafe {
            DefWindowProcW(
                hwnd_from_handle(handle),
                message.id,
                WPARAM(message.wparam),
                LPARAM(message.lparam),
            )
        }
        .0
    }

    fn cursor_position(&self) -> PlatformResult<Point> {
        let mut point = POINT::default();
        unsafe { GetCursorPos(&mut point)? };
        Ok(Point::new(point.x, point.y))
    }

    fn window_rect(&self, handle: NativeWindowHandle) -> PlatformResult<Rect> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(hwnd_from_handle(handle), &mut rect)? };
        Ok(Rect::new(rect.left, rect.top, rect.right, rect.bottom))
    }

    fn extend_frame_into_client_area(
        &self,
        handle: NativeWindowHandle,
        margins: FrameMargins,
    ) -> PlatformResult<()> {
        let margins = MARGINS {
            cxLeftWidth: margins.left,
            cxRightWidth: margins.right,
            cyTopHeight: margins.top,
            cyBottomHeight: margins.bottom,
        };
        unsafe { DwmExtendFrameIntoClientArea(hwnd_from_handle(handle), &margins)? };
        Ok(())
    }

    fn notify_frame_changed(
        &self,
        handle: NativeWindowHandle,
        change: FrameChange,
    ) -> PlatformResult<()> {
        let mut flags = SWP_NOMOVE | SWP_NOSIZE | SWP_NOZORDER | SWP_FRAMECHANGED;
        if change.keep_owner_z_order {
            flags |= SWP_NOOWNERZORDER;
        }
        unsafe { SetWindowPos(hwnd_from_handle(handle), None, 0, 0, 0, 0, flags)? };
        Ok(())
    }
}

/*
 * Host window backed by a plain HWND. The rendering surface is found by
 * walking child windows along `surface_path`; at each level index `n` means
 * the n-th child in z-order (`GW_CHILD` followed by `n` times `GW_HWNDNEXT`).
 */
#[derive(Debug, Clone)]
pub struct Win32HostWindow {
    hwnd: HWND,
    surface_path: RenderSurfacePath,
}

impl Win32HostWindow {
    pub fn new(hwnd: HWND) -> Self {
        Self {
            hwnd,
            surface_path: RenderSurfacePath::default(),
        }
    }

    pub fn with_surface_path(mut self, surface_path: RenderSurfacePath) -> Self {
        self.surface_path = surface_path;
        self
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }
}

fn nth_child_window(parent: NativeWindowHandle, index: usize) -> Option<NativeWindowHandle> {
    let mut child = unsafe { GetWindow(hwnd_from_handle(parent), GW_CHILD) }.ok()?;
    for _ in 0..index {
        child = unsafe { GetWindow(child, GW_HWNDNEXT) }.ok()?;
    }
    (!child.is_invalid()).then(|| handle_from_hwnd(child))
}

impl HostWindow for Win32HostWindow {
    fn native_handle(&self) -> PlatformResult<NativeWindowHandle> {
        if self.hwnd.is_invalid() {
            return Err(PlatformError::HandleResolutionFailure(
                "host HWND is invalid".to_string(),
            ));
        }
        Ok(handle_from_hwnd(self.hwnd))
    }

    fn resolve_render_surface_handle(&self) -> PlatformResult<NativeWindowHandle> {
        let root = self.native_handle()?;
        let surface = resolve_surface_path(root, &self.surface_path, nth_child_window)?;
        log::debug!(
            "Win32HostWindow: render surface of {root:?} is {surface:?} (path {:?})",
            self.surface_path.indices()
        );
        Ok(surface)
    }
}
