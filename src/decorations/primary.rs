/*
 * Decoration of the top-level window. It removes the native chrome by
 * extending the DWM frame over the whole window and answering WM_NCCALCSIZE
 * with "no non-client area", then re-creates resize borders and the caption
 * by answering WM_NCHITTEST with the classifier's verdict.
 */
use crate::error::Result as PlatformResult;
use crate::hit_test::{self, HitTestResult};
use crate::interceptor::{HitTestResponse, WindowProcInterceptor};
use crate::native_api::{FrameChange, FrameMargins, NativeWindowApi, WindowMessageHook};
use crate::parameters::{DecorationParameters, SharedParameters};
use crate::types::{NativeWindowHandle, WindowMessage};

use std::rc::{Rc, Weak};

pub struct PrimaryDecoration {
    interceptor: WindowProcInterceptor,
    params: SharedParameters,
}

impl PrimaryDecoration {
    /*
     * Installs the interceptor on `handle`, extends the frame with zero margins
     * and forces a frame-changed re-layout so WM_NCCALCSIZE is re-evaluated.
     * If any frame call fails the interceptor is removed again before the
     * error is returned; a half-decorated window is never left behind.
     */
    pub fn attach(
        api: Rc<dyn NativeWindowApi>,
        handle: NativeWindowHandle,
        params: DecorationParameters,
    ) -> PlatformResult<Rc<Self>> {
        params.validate()?;
        let decoration = Rc::new(Self {
            interceptor: WindowProcInterceptor::new(api, handle),
            params: SharedParameters::new(params),
        });
        let weak: Weak<PrimaryDecoration> = Rc::downgrade(&decoration);
        decoration.interceptor.install(weak)?;

        if let Err(err) = decoration.apply_frame() {
            log::error!("PrimaryDecoration: frame setup failed for {handle:?}: {err}");
            if let Err(restore_err) = decoration.interceptor.uninstall() {
                log::error!(
                    "PrimaryDecoration: rollback of {handle:?} also failed: {restore_err}"
                );
            }
            return Err(err);
        }

        log::debug!("PrimaryDecoration: attached to {handle:?} with {params:?}");
        Ok(decoration)
    }

    fn apply_frame(&self) -> PlatformResult<()> {
        let api = self.interceptor.api();
        let handle = self.interceptor.handle();
        api.extend_frame_into_client_area(handle, FrameMargins::ZERO)?;
        api.notify_frame_changed(
            handle,
            FrameChange {
                keep_owner_z_order: true,
            },
        )
    }

    pub fn handle(&self) -> NativeWindowHandle {
        self.interceptor.handle()
    }

    pub fn params(&self) -> DecorationParameters {
        self.params.get()
    }

    pub fn set_params(&self, params: DecorationParameters) -> PlatformResult<()> {
        self.params.set(params)
    }

    pub fn update_params<F>(&self, f: F) -> PlatformResult<DecorationParameters>
    where
        F: FnOnce(DecorationParameters) -> DecorationParameters,
    {
        self.params.update(f)
    }

    /// A handle to the parameter cell that can be moved to other threads.
    pub fn shared_params(&self) -> SharedParameters {
        self.params.clone()
    }

    pub fn is_intercepting(&self) -> bool {
        self.interceptor
            .chain()
            .is_some_and(|chain| !chain.is_restored())
    }

    /*
     * Classifies the current cursor against this window's rectangle. `None`
     * when the OS queries fail; callers treat that like `Nowhere`.
     */
    pub(crate) fn classify_cursor(&self) -> Option<HitTestResult> {
        let api = self.interceptor.api();
        let handle = self.interceptor.handle();
        let cursor = match api.cursor_position() {
            Ok(cursor) => cursor,
            Err(err) => {
                log::warn!("PrimaryDecoration: cursor query failed, deferring hit test: {err}");
                return None;
            }
        };
        let rect = match api.window_rect(handle) {
            Ok(rect) => rect,
            Err(err) => {
                log::warn!("PrimaryDecoration: rect query for {handle:?} failed: {err}");
                return None;
            }
        };
        Some(hit_test::classify(cursor, rect, &self.params.get()))
    }

    fn hit_test_response(&self) -> HitTestResponse {
        match self.classify_cursor() {
            None | Some(HitTestResult::Nowhere) => HitTestResponse::Forward,
            Some(result) => HitTestResponse::Reply(result),
        }
    }

    /// Removes the interceptor ahead of WM_DESTROY.
    pub fn detach(&self) -> PlatformResult<()> {
        self.interceptor.uninstall().map(|_| ())
    }
}

impl WindowMessageHook for PrimaryDecoration {
    fn handle_message(&self, message: WindowMessage) -> isize {
        self.interceptor
            .dispatch(message, || self.hit_test_response())
    }
}

impl std::fmt::Debug for PrimaryDecoration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrimaryDecoration")
            .field("handle", &self.interceptor.handle())
            .field("params", &self.params.get())
            .field("intercepting", &self.is_intercepting())
            .finish()
    }
}
