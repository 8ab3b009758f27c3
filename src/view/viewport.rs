//! # Viewport Contract
//!
//! The host view system owns its viewports; this module only describes what
//! the marker layer needs from one: an identity, a camera to project through,
//! and optionally the ability to have its decorations invalidated.

use std::fmt;

use cgmath::{Matrix4, Point3, Vector2};

/// Identifier of a viewport within its view manager.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ViewportId(pub u32);

impl fmt::Debug for ViewportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ViewportId({})", self.0)
    }
}

/// Capability of a viewport to have its overlay marked stale.
///
/// An invalidated viewport redraws its decorations on the next frame.
pub trait InvalidateDecorations {
    /// Mark the viewport's decorations as stale.
    fn invalidate_decorations(&self);
}

/// A renderable view of a 3D scene.
pub trait Viewport {
    /// Identifier of this viewport.
    fn id(&self) -> ViewportId;

    /// Combined view-projection matrix of the viewport's camera.
    fn view_projection(&self) -> Matrix4<f32>;

    /// Size of the viewport in pixels.
    fn view_size(&self) -> Vector2<f32>;

    /// Probe for the decoration-invalidation capability.
    ///
    /// Viewports that cannot be invalidated return `None` (the default); such
    /// viewports are skipped by the default view filter.
    fn decoration_invalidation(&self) -> Option<&dyn InvalidateDecorations> {
        None
    }

    /// Consume a pending redraw request.
    ///
    /// Viewports without their own redraw tracking redraw every frame.
    fn take_redraw_request(&self) -> bool {
        true
    }
}

/// Project a world-space point into viewport pixel coordinates.
///
/// Returns `(x, y, depth)` with `x`/`y` in pixels from the top-left corner and
/// `depth` as normalized device depth, or `None` if the point is at or behind
/// the camera plane.
pub fn world_to_view(viewport: &dyn Viewport, world: Point3<f32>) -> Option<Point3<f32>> {
    let clip = viewport.view_projection() * world.to_homogeneous();
    if clip.w <= f32::EPSILON {
        return None;
    }

    let ndc = clip.truncate() / clip.w;
    let size = viewport.view_size();
    Some(Point3::new(
        (ndc.x + 1.0) * 0.5 * size.x,
        (1.0 - ndc.y) * 0.5 * size.y,
        ndc.z,
    ))
}
