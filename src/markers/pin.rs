//! # Pin Marker
//!
//! A marker anchored at a world-space point. Each decoration pass projects
//! the anchor through the viewport camera and emits a single sprite graphic,
//! optionally labeled. Points behind the camera or outside the viewport emit
//! nothing.

use std::cell::{Cell, RefCell};

use cgmath::{Point2, Point3};

use super::traits::Marker;
use crate::view::{world_to_view, DecorateContext, MarkerGraphic};

/// Default sprite edge length in pixels.
const DEFAULT_SIZE: f32 = 16.0;

/// Default pin color (warm orange).
const DEFAULT_COLOR: [f32; 4] = [1.0, 0.55, 0.1, 1.0];

/// World-anchored marker with a label, size, color and visibility.
///
/// All setters take `&self` so the owning node can keep updating the pin
/// while the registry holds it.
#[derive(Debug)]
pub struct PinMarker {
    position: Cell<Point3<f32>>,
    label: RefCell<Option<String>>,
    size: Cell<f32>,
    color: Cell<[f32; 4]>,
    visible: Cell<bool>,
}

impl PinMarker {
    /// Create a visible, unlabeled pin at a world position.
    pub fn new(position: Point3<f32>) -> Self {
        Self {
            position: Cell::new(position),
            label: RefCell::new(None),
            size: Cell::new(DEFAULT_SIZE),
            color: Cell::new(DEFAULT_COLOR),
            visible: Cell::new(true),
        }
    }

    pub fn with_label(self, label: impl Into<String>) -> Self {
        self.set_label(Some(label.into()));
        self
    }

    pub fn with_size(self, size: f32) -> Self {
        self.size.set(size);
        self
    }

    pub fn with_color(self, color: [f32; 4]) -> Self {
        self.color.set(color);
        self
    }

    pub fn position(&self) -> Point3<f32> {
        self.position.get()
    }

    pub fn set_position(&self, position: Point3<f32>) {
        self.position.set(position);
    }

    pub fn label(&self) -> Option<String> {
        self.label.borrow().clone()
    }

    pub fn set_label(&self, label: Option<String>) {
        *self.label.borrow_mut() = label;
    }

    pub fn is_visible(&self) -> bool {
        self.visible.get()
    }

    pub fn set_visible(&self, visible: bool) {
        self.visible.set(visible);
    }
}

impl Marker for PinMarker {
    fn add_decoration(&self, context: &mut DecorateContext<'_>) {
        if !self.visible.get() {
            return;
        }

        let viewport = context.viewport();
        let Some(projected) = world_to_view(viewport, self.position.get()) else {
            return;
        };

        let size = viewport.view_size();
        let on_screen = (0.0..=size.x).contains(&projected.x) && (0.0..=size.y).contains(&projected.y);
        if !on_screen {
            return;
        }

        let mut graphic = MarkerGraphic::new(
            Point2::new(projected.x, projected.y),
            projected.z,
            self.size.get(),
        )
        .with_color(self.color.get());
        if let Some(label) = self.label.borrow().as_ref() {
            graphic = graphic.with_label(label.clone());
        }
        context.add_graphic(graphic);
    }

    fn name(&self) -> &str {
        "Pin Marker"
    }
}
