/*
 * Ties the decorations to the lifetime of a host window. The binder is fed the
 * host's lifecycle events; on `Opened` it resolves both native handles and
 * attaches the primary and overlay decorations, on `Closed`/`Destroyed` it
 * drops them. It is the only strong owner of either decoration, so nothing
 * outlives the window it decorates.
 *
 * A binder is single-use: once disposed it cannot be reopened. Create a new
 * binder for every window instance.
 */
use crate::decorations::{PrimaryDecoration, TransparentOverlayDecoration};
use crate::error::{PlatformError, Result as PlatformResult};
use crate::native_api::NativeWindowApi;
use crate::parameters::DecorationParameters;
use crate::types::{HostWindowEvent, NativeWindowHandle};

use std::rc::Rc;

/*
 * The host window collaborator. `resolve_render_surface_handle` is the one
 * place that knows how the UI framework nests its rendering surface; when the
 * framework changes its internal window tree only that implementation moves.
 */
pub trait HostWindow {
    fn native_handle(&self) -> PlatformResult<NativeWindowHandle>;

    fn resolve_render_surface_handle(&self) -> PlatformResult<NativeWindowHandle>;
}

/*
 * Child indices to follow from the top-level window down to the rendering
 * surface. The default `[0, 0, 0]` is container -> container -> leaf, taking
 * the first child at each level.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderSurfacePath(Vec<usize>);

impl RenderSurfacePath {
    pub fn new(indices: Vec<usize>) -> PlatformResult<Self> {
        if indices.is_empty() {
            return Err(PlatformError::InvalidParameters(
                "render surface path must descend at least one level".to_string(),
            ));
        }
        Ok(Self(indices))
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }
}

impl Default for RenderSurfacePath {
    fn default() -> Self {
        Self(vec![0, 0, 0])
    }
}

/*
 * Walks `path` from `root`, asking `child_at` for the n-th child at each
 * level. Fails with `HandleResolutionFailure` naming the level that had no
 * such child.
 */
pub fn resolve_surface_path<F>(
    root: NativeWindowHandle,
    path: &RenderSurfacePath,
    mut child_at: F,
) -> PlatformResult<NativeWindowHandle>
where
    F: FnMut(NativeWindowHandle, usize) -> Option<NativeWindowHandle>,
{
    let mut current = root;
    for (depth, &index) in path.indices().iter().enumerate() {
        current = match child_at(current, index) {
            Some(child) if !child.is_null() => child,
            _ => {
                return Err(PlatformError::HandleResolutionFailure(format!(
                    "no child #{index} under {current:?} at depth {depth} (path {:?})",
                    path.indices()
                )));
            }
        };
    }
    Ok(current)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinderState {
    Unopened,
    Open,
    Disposed,
}

// Field order matters: the overlay is dropped before the primary it points at.
struct BoundDecorations {
    overlay: Rc<TransparentOverlayDecoration>,
    primary: Rc<PrimaryDecoration>,
}

pub struct DecorationLifecycleBinder {
    api: Rc<dyn NativeWindowApi>,
    params: DecorationParameters,
    state: BinderState,
    decorations: Option<BoundDecorations>,
}

impl DecorationLifecycleBinder {
    pub fn new(api: Rc<dyn NativeWindowApi>, params: DecorationParameters) -> Self {
        Self {
            api,
            params,
            state: BinderState::Unopened,
            decorations: None,
        }
    }

    pub fn state(&self) -> BinderState {
        self.state
    }

    pub fn primary(&self) -> Option<&Rc<PrimaryDecoration>> {
        self.decorations.as_ref().map(|bound| &bound.primary)
    }

    pub fn overlay(&self) -> Option<&Rc<TransparentOverlayDecoration>> {
        self.decorations.as_ref().map(|bound| &bound.overlay)
    }

    /// Current parameters: the live cell when open, the initial value otherwise.
    pub fn params(&self) -> DecorationParameters {
        match self.primary() {
            Some(primary) => primary.params(),
            None => self.params,
        }
    }

    /*
     * Replaces the parameters. While open this goes straight to the primary's
     * cell so both windows pick it up on the next hit test; before opening it
     * changes what `Opened` will attach with.
     */
    pub fn set_params(&mut self, params: DecorationParameters) -> PlatformResult<()> {
        params.validate()?;
        if let Some(primary) = self.primary() {
            primary.set_params(params)?;
        }
        self.params = params;
        Ok(())
    }

    pub fn handle_event(
        &mut self,
        event: HostWindowEvent,
        host: &dyn HostWindow,
    ) -> PlatformResult<()> {
        match event {
            HostWindowEvent::Opened => self.open(host),
            HostWindowEvent::Closed | HostWindowEvent::Destroyed => {
                self.dispose(event);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn open(&mut self, host: &dyn HostWindow) -> PlatformResult<()> {
        match self.state {
            BinderState::Unopened => {}
            BinderState::Open => {
                return Err(PlatformError::InvalidState(
                    "decorations are already attached to this window".to_string(),
                ));
            }
            BinderState::Disposed => {
                return Err(PlatformError::InvalidState(
                    "binder was disposed; create a new binder for a new window".to_string(),
                ));
            }
        }

        let primary_handle = host.native_handle()?;
        if primary_handle.is_null() {
            return Err(PlatformError::HandleResolutionFailure(
                "host window reported a null native handle".to_string(),
            ));
        }
        let surface_handle = host.resolve_render_surface_handle()?;
        if surface_handle == primary_handle {
            return Err(PlatformError::HandleResolutionFailure(format!(
                "render surface resolved to the top-level window itself ({primary_handle:?})"
            )));
        }
        log::debug!(
            "DecorationLifecycleBinder: window {primary_handle:?} opened, surface {surface_handle:?}"
        );

        let primary = PrimaryDecoration::attach(self.api.clone(), primary_handle, self.params)?;
        // On failure `primary` is dropped here, which removes its interceptor.
        let overlay = TransparentOverlayDecoration::attach(self.api.clone(), surface_handle, &primary)?;

        self.decorations = Some(BoundDecorations { overlay, primary });
        self.state = BinderState::Open;
        Ok(())
    }

    fn dispose(&mut self, event: HostWindowEvent) {
        match self.state {
            BinderState::Open => {
                log::debug!("DecorationLifecycleBinder: {event:?}, releasing decorations");
                self.decorations = None;
                self.state = BinderState::Disposed;
            }
            BinderState::Unopened => {
                log::debug!("DecorationLifecycleBinder: {event:?} before open, nothing to release");
                self.state = BinderState::Disposed;
            }
            BinderState::Disposed => {
                log::debug!("DecorationLifecycleBinder: {event:?} after dispose ignored");
            }
        }
    }
}

impl std::fmt::Debug for DecorationLifecycleBinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecorationLifecycleBinder")
            .field("state", &self.state)
            .field("params", &self.params())
            .field("primary", &self.primary())
            .field("overlay", &self.overlay())
            .finish()
    }
}
