/*
 * Decoration of the nested rendering-surface window. The surface covers the
 * same screen area as the top-level window, so without interception it would
 * receive every WM_NCHITTEST and the caption and resize borders would never
 * reach the primary window. The overlay classifies with the primary's
 * rectangle and parameters and answers HTTRANSPARENT for every chrome region,
 * which makes the OS re-deliver the hit test to the window underneath.
 */
use crate::decorations::primary::PrimaryDecoration;
use crate::error::Result as PlatformResult;
use crate::hit_test::HitTestResult;
use crate::interceptor::{HitTestResponse, WindowProcInterceptor};
use crate::native_api::{FrameChange, NativeWindowApi, WindowMessageHook};
use crate::types::{NativeWindowHandle, WindowMessage};

use std::rc::{Rc, Weak};

/*
 * Maps the primary's classification to the overlay's answer.
 *
 * `Client` is not produced by the classifier today. If it ever shows up it is
 * kept on the surface: escalating a client hit to the parent would route
 * content input into the parent's transparent area.
 */
pub fn overlay_response(result: HitTestResult) -> HitTestResponse {
    match result {
        HitTestResult::Nowhere => HitTestResponse::Forward,
        HitTestResult::Client => {
            log::warn!(
                "TransparentOverlayDecoration: classifier reported HTCLIENT; keeping it on the surface"
            );
            HitTestResponse::Reply(HitTestResult::Client)
        }
        _ => HitTestResponse::Reply(HitTestResult::Transparent),
    }
}

pub struct TransparentOverlayDecoration {
    interceptor: WindowProcInterceptor,
    primary: Weak<PrimaryDecoration>,
}

impl TransparentOverlayDecoration {
    pub fn attach(
        api: Rc<dyn NativeWindowApi>,
        handle: NativeWindowHandle,
        primary: &Rc<PrimaryDecoration>,
    ) -> PlatformResult<Rc<Self>> {
        let decoration = Rc::new(Self {
            interceptor: WindowProcInterceptor::new(api, handle),
            primary: Rc::downgrade(primary),
        });
        let weak: Weak<TransparentOverlayDecoration> = Rc::downgrade(&decoration);
        decoration.interceptor.install(weak)?;

        let frame_result = decoration.interceptor.api().notify_frame_changed(
            handle,
            FrameChange {
                keep_owner_z_order: false,
            },
        );
        if let Err(err) = frame_result {
            log::error!("TransparentOverlayDecoration: frame refresh failed for {handle:?}: {err}");
            if let Err(restore_err) = decoration.interceptor.uninstall() {
                log::error!(
                    "TransparentOverlayDecoration: rollback of {handle:?} also failed: {restore_err}"
                );
            }
            return Err(err);
        }

        log::debug!(
            "TransparentOverlayDecoration: attached to {handle:?} over primary {:?}",
            primary.handle()
        );
        Ok(decoration)
    }

    pub fn handle(&self) -> NativeWindowHandle {
        self.interceptor.handle()
    }

    pub fn is_intercepting(&self) -> bool {
        self.interceptor
            .chain()
            .is_some_and(|chain| !chain.is_restored())
    }

    fn hit_test_response(&self) -> HitTestResponse {
        let Some(primary) = self.primary.upgrade() else {
            log::debug!(
                "TransparentOverlayDecoration: primary gone, forwarding hit test for {:?}",
                self.interceptor.handle()
            );
            return HitTestResponse::Forward;
        };
        match primary.classify_cursor() {
            Some(result) => overlay_response(result),
            None => HitTestResponse::Forward,
        }
    }

    pub fn detach(&self) -> PlatformResult<()> {
        self.interceptor.uninstall().map(|_| ())
    }
}

impl WindowMessageHook for TransparentOverlayDecoration {
    fn handle_message(&self, message: WindowMessage) -> isize {
        self.interceptor
            .dispatch(message, || self.hit_test_response())
    }
}

impl std::fmt::Debug for TransparentOverlayDecoration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransparentOverlayDecoration")
            .field("handle", &self.interceptor.handle())
            .field("primary_alive", &(self.primary.strong_count() > 0))
            .field("intercepting", &self.is_intercepting())
            .finish()
    }
}
