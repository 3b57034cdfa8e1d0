//! Backend boundary: the render surface and its scrollable.
//!
//! The engine never creates or styles elements itself. A [`Backend`] owns the render
//! surface, knows which scrollable drives it (the surface itself or an ancestor), and
//! reports how big a chunk turned out to be once it was appended.

use crate::model::ContentType;
use crate::view_state::Measurement;

/// Render surface plus tracked scrollable, as seen by the engine.
///
/// Units are up to the implementation (pixels, terminal rows, ...) but must be the
/// same for heights, offsets and scroll positions.
pub trait Backend {
    /// Whatever the surface can be attached to.
    type Container;

    /// Failure while attaching or appending.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Attach the render surface to `container`.
    fn attach(&mut self, container: Self::Container) -> Result<(), Self::Error>;

    /// Detach the render surface from its container.
    fn detach(&mut self);

    /// Remove every chunk and filler from the surface.
    fn clear(&mut self);

    /// Append a spacer of the given height.
    fn push_filler(&mut self, height: f64);

    /// Append chunk `index` and report its geometry.
    fn push_chunk(
        &mut self,
        index: usize,
        content: &str,
        content_type: ContentType,
    ) -> Result<Measurement, Self::Error>;

    /// Raw scroll position of the tracked scrollable.
    fn scroll_position(&self) -> f64;

    /// Move the tracked scrollable.
    fn set_scroll_position(&mut self, position: f64);

    /// Static distance between the top of the scrollable and the top of the surface.
    fn surface_offset(&self) -> f64 {
        0.0
    }

    /// Current container width.
    fn width(&self) -> f64;

    /// Give input focus back to the container after a rebuild.
    fn focus(&mut self) {}

    /// Start or stop delivering scroll notifications.
    fn set_listening(&mut self, listening: bool);
}
