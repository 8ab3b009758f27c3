//! # Marker Traits
//!
//! This module defines the trait every drawable marker implements to take part
//! in a viewport decoration pass.

use crate::view::DecorateContext;

/// Core trait for markers drawn over a 3D viewport.
///
/// A marker is owned by whatever created it (usually a UI node). The
/// [`MarkerRegistry`](super::MarkerRegistry) only keeps a weak reference and
/// asks the marker to draw itself once per decoration pass, in registry order.
///
/// Methods take `&self`: markers are shared behind `Rc`, so implementations
/// that change over time keep their state in `Cell`/`RefCell`.
///
/// ## Examples
///
/// ```
/// use haggis_markers::markers::Marker;
/// use haggis_markers::view::{DecorateContext, MarkerGraphic};
/// use cgmath::Point2;
///
/// struct CornerBadge;
///
/// impl Marker for CornerBadge {
///     fn add_decoration(&self, context: &mut DecorateContext<'_>) {
///         context.add_graphic(MarkerGraphic::new(Point2::new(8.0, 8.0), 0.0, 12.0));
///     }
///
///     fn name(&self) -> &str { "Corner Badge" }
/// }
/// ```
pub trait Marker {
    /// Draw this marker into the given decoration context.
    ///
    /// Called once per decoration pass for every viewport the owning
    /// decorator accepts. Implementations may emit zero or more graphics.
    ///
    /// # Arguments
    ///
    /// * `context` - Decoration context for the viewport being drawn
    fn add_decoration(&self, context: &mut DecorateContext<'_>);

    /// Get the name of the marker, used for logging and debugging.
    fn name(&self) -> &str {
        "Marker"
    }
}
