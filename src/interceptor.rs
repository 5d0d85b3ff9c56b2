/*
 * Window-procedure interception shared by both decorations. The interceptor
 * owns the chain record for one handle and implements the message policy that
 * is common to the primary and the overlay window:
 *
 * - WM_NCCALCSIZE returns 0 so the whole window rectangle becomes client area,
 *   which is what removes the native chrome.
 * - WM_NCHITTEST asks the owning decoration and either replies directly or
 *   forwards to the original procedure.
 * - WM_DESTROY restores the original procedure, then forwards the message.
 * - Everything else is forwarded unchanged.
 */
use crate::error::{PlatformError, Result as PlatformResult};
use crate::hit_test::HitTestResult;
use crate::native_api::{NativeWindowApi, WindowMessageHook};
use crate::types::{InterceptedMessage, NativeWindowHandle, WindowMessage, WindowProcAddress};

use std::cell::{Cell, OnceCell};
use std::rc::{Rc, Weak};

/// Answer of a decoration to a non-client hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTestResponse {
    /// Let the original procedure perform default processing.
    Forward,
    Reply(HitTestResult),
}

/*
 * Record of one installed replacement. `original` is captured once at install
 * time and is the only valid target for forwarding and restoring. `restored`
 * flips exactly once.
 */
#[derive(Debug)]
pub struct WindowProcChain {
    handle: NativeWindowHandle,
    original: WindowProcAddress,
    restored: Cell<bool>,
}

impl WindowProcChain {
    pub fn handle(&self) -> NativeWindowHandle {
        self.handle
    }

    pub fn original(&self) -> WindowProcAddress {
        self.original
    }

    pub fn is_restored(&self) -> bool {
        self.restored.get()
    }
}

/// Replaces the window procedure of `handle` and returns the chain record.
pub fn install(
    api: &dyn NativeWindowApi,
    handle: NativeWindowHandle,
    hook: Weak<dyn WindowMessageHook>,
) -> PlatformResult<WindowProcChain> {
    if handle.is_null() {
        return Err(PlatformError::HandleResolutionFailure(
            "cannot intercept the window procedure of a null handle".to_string(),
        ));
    }
    let original = api.install_window_proc(handle, hook)?;
    log::debug!("Interceptor: installed on {handle:?}, original procedure {original:?}");
    Ok(WindowProcChain {
        handle,
        original,
        restored: Cell::new(false),
    })
}

/*
 * Restores the original procedure. Returns `Ok(false)` without touching the OS
 * when the chain was already restored, so a repeated WM_DESTROY is harmless.
 * A failed restore leaves the chain unrestored and can be retried.
 */
pub fn uninstall(api: &dyn NativeWindowApi, chain: &WindowProcChain) -> PlatformResult<bool> {
    if chain.restored.get() {
        log::debug!(
            "Interceptor: {:?} already restored, skipping",
            chain.handle
        );
        return Ok(false);
    }
    api.restore_window_proc(chain.handle, chain.original)?;
    chain.restored.set(true);
    log::debug!(
        "Interceptor: restored original procedure {:?} on {:?}",
        chain.original,
        chain.handle
    );
    Ok(true)
}

/// One intercepted window: the native seam plus the chain once installed.
pub struct WindowProcInterceptor {
    api: Rc<dyn NativeWindowApi>,
    handle: NativeWindowHandle,
    chain: OnceCell<WindowProcChain>,
}

impl WindowProcInterceptor {
    pub fn new(api: Rc<dyn NativeWindowApi>, handle: NativeWindowHandle) -> Self {
        Self {
            api,
            handle,
            chain: OnceCell::new(),
        }
    }

    pub fn api(&self) -> &dyn NativeWindowApi {
        self.api.as_ref()
    }

    pub fn handle(&self) -> NativeWindowHandle {
        self.handle
    }

    pub fn chain(&self) -> Option<&WindowProcChain> {
        self.chain.get()
    }

    pub fn install(&self, hook: Weak<dyn WindowMessageHook>) -> PlatformResult<()> {
        if self.chain.get().is_some() {
            return Err(PlatformError::InvalidState(format!(
                "interceptor for {:?} is already installed",
                self.handle
            )));
        }
        let chain = install(self.api.as_ref(), self.handle, hook)?;
        if let Err(rejected) = self.chain.set(chain) {
            // A chain that cannot be stored would never be restored.
            uninstall(self.api.as_ref(), &rejected)?;
            return Err(PlatformError::InvalidState(format!(
                "interceptor for {:?} was installed concurrently",
                self.handle
            )));
        }
        Ok(())
    }

    /// Returns `Ok(true)` if this call performed the restore.
    pub fn uninstall(&self) -> PlatformResult<bool> {
        match self.chain.get() {
            Some(chain) => uninstall(self.api.as_ref(), chain),
            None => Ok(false),
        }
    }

    pub fn forward(&self, message: WindowMessage) -> isize {
        match self.chain.get() {
            Some(chain) => self
                .api
                .call_window_proc(chain.original, self.handle, message),
            None => self.api.default_window_proc(self.handle, message),
        }
    }

    pub fn dispatch<F>(&self, message: WindowMessage, hit_test: F) -> isize
    where
        F: FnOnce() -> HitTestResponse,
    {
        match message.kind() {
            InterceptedMessage::NonClientCalcSize => 0,
            InterceptedMessage::NonClientHitTest => match hit_test() {
                HitTestResponse::Forward => self.forward(message),
                HitTestResponse::Reply(result) => result.code(),
            },
            InterceptedMessage::Destroy => {
                if let Err(err) = self.uninstall() {
                    log::error!(
                        "Interceptor: failed to restore procedure on WM_DESTROY for {:?}: {err}",
                        self.handle
                    );
                }
                self.forward(message)
            }
            InterceptedMessage::Other => self.forward(message),
        }
    }
}

impl Drop for WindowProcInterceptor {
    fn drop(&mut self) {
        if let Some(chain) = self.chain.get()
            && !chain.is_restored()
            && let Err(err) = uninstall(self.api.as_ref(), chain)
        {
            log::warn!(
                "Interceptor: could not restore procedure for {:?} on drop: {err}",
                self.handle
            );
        }
    }
}
