/*
 * The two window decorations. `primary` handles the top-level window;
 * `overlay` handles the rendering surface nested inside it and defers every
 * chrome region to the primary.
 */
pub mod overlay;
pub mod primary;

pub use overlay::{TransparentOverlayDecoration, overlay_response};
pub use primary::PrimaryDecoration;
