/*
 * Platform-agnostic value types used by the classifier, the interceptor and
 * the decorations. These compile on every target so the decoration logic can
 * be exercised without a Win32 message loop.
 */

/// Window message ids the interceptor reacts to. Values match `WinUser.h`.
pub const WM_DESTROY: u32 = 0x0002;
pub const WM_NCCALCSIZE: u32 = 0x0083;
pub const WM_NCHITTEST: u32 = 0x0084;

/// A point in screen coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/*
 * Screen-space rectangle in the Win32 `RECT` convention: `right` and `bottom`
 * are exclusive.
 */
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }
}

/// Opaque OS window identifier. Owned by the OS; decorations only borrow it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeWindowHandle(pub isize);

impl NativeWindowHandle {
    pub const NULL: NativeWindowHandle = NativeWindowHandle(0);

    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

/// Address of a window procedure, used to compare handler identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowProcAddress(pub isize);

/// A raw window message as delivered to a window procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowMessage {
    pub id: u32,
    pub wparam: usize,
    pub lparam: isize,
}

impl WindowMessage {
    pub const fn new(id: u32, wparam: usize, lparam: isize) -> Self {
        Self { id, wparam, lparam }
    }

    pub fn kind(&self) -> InterceptedMessage {
        InterceptedMessage::from_id(self.id)
    }
}

/// The subset of messages the interceptor treats specially.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterceptedMessage {
    NonClientCalcSize,
    NonClientHitTest,
    Destroy,
    Other,
}

impl InterceptedMessage {
    pub fn from_id(id: u32) -> Self {
        match id {
            WM_NCCALCSIZE => InterceptedMessage::NonClientCalcSize,
            WM_NCHITTEST => InterceptedMessage::NonClientHitTest,
            WM_DESTROY => InterceptedMessage::Destroy,
            _ => InterceptedMessage::Other,
        }
    }
}

/*
 * Lifecycle notifications of the host window. Only `Opened`, `Closed` and
 * `Destroyed` drive the binder; the others are accepted and ignored so hosts
 * can forward their whole window-listener stream.
 */
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostWindowEvent {
    Opened,
    Closing,
    Closed,
    Destroyed,
    Iconified,
    Deiconified,
    Activated,
    Deactivated,
}
