//! # Haggis Markers Prelude
//!
//! Commonly used types and traits in one import:
//!
//! ```rust
//! use haggis_markers::prelude::*;
//! ```

// Re-export provider and context types
pub use crate::context::{
    marker_context, ContextScope, IntegrationContext, ProvideGuard, MARKER_DECORATION_CONTEXT,
};
pub use crate::error::MarkerError;
pub use crate::provider::{ProviderConfig, ProviderState, ViewIntegrationProvider};

// Re-export marker types
pub use crate::decoration::MarkerDecoration;
pub use crate::markers::{Marker, MarkerId, MarkerRegistry, PinMarker};

// Re-export view system types
pub use crate::view::{
    BasicViewManager, DecorateContext, Decorator, InvalidateDecorations, MarkerGraphic,
    SceneViewport, ViewFilter, ViewManager, Viewport, ViewportId,
};

// Re-export scheduling
pub use crate::invalidation::{InvalidationQueue, InvalidationStats};
pub use crate::scheduler::{Scheduler, TaskQueue};

// Re-export common external dependencies
pub use cgmath::{Point2, Point3};
