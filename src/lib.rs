/*
 * Entry point for the chromehook crate: custom window chrome for Win32 hosts
 * whose content is drawn into a nested rendering surface. The native title bar
 * and borders are removed on the top-level window, and caption dragging plus
 * edge/corner resizing are re-created by answering WM_NCHITTEST from a pure
 * classifier.
 *
 * The classifier, parameters, interceptor and decorations only talk to the OS
 * through `NativeWindowApi`, so they compile and are tested on every platform.
 * The Win32 implementation of that trait lives in `window_common` and is only
 * built on Windows.
 */
pub mod binder;
pub mod decorations;
pub mod error;
pub mod interceptor;
pub mod native_api;
pub mod parameters;
#[cfg(test)]
pub(crate) mod testing;
pub mod types;
#[cfg(target_os = "windows")]
pub mod window_common;

pub use binder::{BinderState, DecorationLifecycleBinder, HostWindow, RenderSurfacePath};
pub use decorations::{PrimaryDecoration, TransparentOverlayDecoration};
pub use error::{PlatformError, Result as PlatformResult};
pub use hit_test::{HitTestResult, classify};
pub use interceptor::{HitTestResponse, WindowProcInterceptor};
pub use native_api::{NativeWindowApi, WindowMessageHook};
pub use parameters::{DecorationParameters, SharedParameters};
pub use types::{HostWindowEvent, NativeWindowHandle, Point, Rect, WindowMessage};
#[cfg(target_os = "windows")]
pub use window_common::{Win32HostWindow, Win32WindowApi};

/// Fails with `UnsupportedPlatform` everywhere except Windows.
pub fn ensure_platform_supported() -> PlatformResult<()> {
    if cfg!(target_os = "windows") {
        Ok(())
    } else {
        Err(PlatformError::UnsupportedPlatform(format!(
            "custom window chrome requires Windows, running on {}",
            std::env::consts::OS
        )))
    }
}

/*
 * Creates a binder wired to the real Win32 API. Feed it the host's
 * `HostWindowEvent::Opened` (with a `Win32HostWindow`) to decorate the window.
 * On other platforms this reports `UnsupportedPlatform` instead of a binder.
 */
pub fn win32_binder(params: DecorationParameters) -> PlatformResult<DecorationLifecycleBinder> {
    ensure_platform_supported()?;
    params.validate()?;
    #[cfg(target_os = "windows")]
    {
        Ok(DecorationLifecycleBinder::new(
            std::rc::Rc::new(Win32WindowApi),
            params,
        ))
    }
    #[cfg(not(target_os = "windows"))]
    {
        Err(PlatformError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}
