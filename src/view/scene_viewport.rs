//! # Scene Viewport
//!
//! A concrete camera-driven [`Viewport`] with a redraw flag. Invalidating its
//! decorations requests a redraw that the frame loop consumes with
//! [`Viewport::take_redraw_request`].

use std::cell::Cell;

use cgmath::{perspective, Deg, Matrix4, Point3, SquareMatrix, Vector2, Vector3};

use super::viewport::{InvalidateDecorations, Viewport, ViewportId};

#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.0,
    0.0, 0.0, 0.5, 1.0,
);

/// Vertical field of view used by [`SceneViewport::looking_at`].
const DEFAULT_FOVY_DEGREES: f32 = 45.0;
const DEFAULT_ZNEAR: f32 = 0.1;
const DEFAULT_ZFAR: f32 = 100.0;

/// Viewport over a 3D scene with its own camera matrix and redraw flag.
#[derive(Debug)]
pub struct SceneViewport {
    id: ViewportId,
    view_projection: Cell<Matrix4<f32>>,
    size: Cell<Vector2<f32>>,
    supports_invalidation: bool,
    redraw_requested: Cell<bool>,
    invalidation_count: Cell<u32>,
}

impl SceneViewport {
    /// Create a viewport with an identity camera.
    ///
    /// World coordinates are treated as normalized device coordinates, which
    /// is handy for overlays and tests. A new viewport starts with a pending
    /// redraw so its first frame gets decorated.
    pub fn new(id: ViewportId, width: f32, height: f32) -> Self {
        Self {
            id,
            view_projection: Cell::new(Matrix4::identity()),
            size: Cell::new(Vector2::new(width, height)),
            supports_invalidation: true,
            redraw_requested: Cell::new(true),
            invalidation_count: Cell::new(0),
        }
    }

    /// Create a viewport with a Z-up perspective camera.
    ///
    /// # Arguments
    ///
    /// * `id` - Viewport identifier
    /// * `width` - Width in pixels
    /// * `height` - Height in pixels
    /// * `eye` - Camera position in world space
    /// * `target` - Point the camera looks at
    pub fn looking_at(
        id: ViewportId,
        width: f32,
        height: f32,
        eye: Point3<f32>,
        target: Point3<f32>,
    ) -> Self {
        let viewport = Self::new(id, width, height);
        viewport.set_camera(eye, target);
        viewport
    }

    /// Opt this viewport out of decoration invalidation.
    ///
    /// Such viewports are skipped by the default view filter.
    pub fn without_invalidation(mut self) -> Self {
        self.supports_invalidation = false;
        self
    }

    /// Point the camera from `eye` at `target`, keeping Z up.
    pub fn set_camera(&self, eye: Point3<f32>, target: Point3<f32>) {
        let size = self.size.get();
        let aspect = if size.y > 0.0 { size.x / size.y } else { 1.0 };
        let view = Matrix4::look_at_rh(eye, target, Vector3::unit_z());
        let proj = OPENGL_TO_WGPU_MATRIX
            * perspective(Deg(DEFAULT_FOVY_DEGREES), aspect, DEFAULT_ZNEAR, DEFAULT_ZFAR);
        self.set_view_projection(proj * view);
    }

    /// Replace the view-projection matrix directly.
    pub fn set_view_projection(&self, view_projection: Matrix4<f32>) {
        self.view_projection.set(view_projection);
        self.redraw_requested.set(true);
    }

    /// Resize the viewport. The camera matrix is left untouched.
    pub fn resize(&self, width: f32, height: f32) {
        self.size.set(Vector2::new(width, height));
        self.redraw_requested.set(true);
    }

    /// Whether a redraw is pending.
    pub fn redraw_requested(&self) -> bool {
        self.redraw_requested.get()
    }

    /// Number of times decorations were invalidated.
    pub fn invalidation_count(&self) -> u32 {
        self.invalidation_count.get()
    }
}

impl Viewport for SceneViewport {
    fn id(&self) -> ViewportId {
        self.id
    }

    fn view_projection(&self) -> Matrix4<f32> {
        self.view_projection.get()
    }

    fn view_size(&self) -> Vector2<f32> {
        self.size.get()
    }

    fn decoration_invalidation(&self) -> Option<&dyn InvalidateDecorations> {
        if self.supports_invalidation {
            Some(self)
        } else {
            None
        }
    }

    fn take_redraw_request(&self) -> bool {
        self.redraw_requested.replace(false)
    }
}

impl InvalidateDecorations for SceneViewport {
    fn invalidate_decorations(&self) {
        self.redraw_requested.set(true);
        self.invalidation_count.set(self.invalidation_count.get() + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalidation_requests_redraw() {
        let viewport = SceneViewport::new(ViewportId(3), 640.0, 480.0);
        assert!(viewport.take_redraw_request());
        assert!(!viewport.redraw_requested());

        viewport
            .decoration_invalidation()
            .expect("scene viewports support invalidation")
            .invalidate_decorations();

        assert!(viewport.redraw_requested());
        assert_eq!(viewport.invalidation_count(), 1);
    }

    #[test]
    fn test_without_invalidation_hides_capability() {
        let viewport = SceneViewport::new(ViewportId(4), 640.0, 480.0).without_invalidation();
        assert!(viewport.decoration_invalidation().is_none());
    }
}
