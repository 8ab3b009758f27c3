//! Decoration context handed to markers during a decoration pass.

use cgmath::Point2;

use super::viewport::Viewport;

/// One overlay element emitted by a marker, in viewport pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerGraphic {
    /// Anchor position in pixels from the top-left corner.
    pub position: Point2<f32>,
    /// Normalized device depth of the anchor.
    pub depth: f32,
    /// Edge length of the marker sprite in pixels.
    pub size: f32,
    /// RGBA color.
    pub color: [f32; 4],
    /// Optional text drawn next to the sprite.
    pub label: Option<String>,
}

impl MarkerGraphic {
    /// Create a white, unlabeled graphic.
    pub fn new(position: Point2<f32>, depth: f32, size: f32) -> Self {
        Self {
            position,
            depth,
            size,
            color: [1.0, 1.0, 1.0, 1.0],
            label: None,
        }
    }

    pub fn with_color(mut self, color: [f32; 4]) -> Self {
        self.color = color;
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

/// Rendering context for one decoration pass over one viewport.
///
/// Markers read the viewport (camera, size) and append graphics; the view
/// system collects them with [`into_graphics`](Self::into_graphics) once the
/// pass is over. Graphics are kept in emission order, so later entries are
/// drawn on top.
pub struct DecorateContext<'a> {
    viewport: &'a dyn Viewport,
    graphics: Vec<MarkerGraphic>,
}

impl<'a> DecorateContext<'a> {
    pub fn new(viewport: &'a dyn Viewport) -> Self {
        Self {
            viewport,
            graphics: Vec::new(),
        }
    }

    /// The viewport being decorated.
    pub fn viewport(&self) -> &'a dyn Viewport {
        self.viewport
    }

    pub fn add_graphic(&mut self, graphic: MarkerGraphic) {
        self.graphics.push(graphic);
    }

    pub fn graphics(&self) -> &[MarkerGraphic] {
        &self.graphics
    }

    pub fn into_graphics(self) -> Vec<MarkerGraphic> {
        self.graphics
    }
}

impl std::fmt::Debug for DecorateContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecorateContext")
            .field("viewport", &self.viewport.id())
            .field("graphics", &self.graphics.len())
            .finish()
    }
}
