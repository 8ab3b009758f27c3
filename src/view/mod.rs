//! # View System Contract
//!
//! Everything the marker layer needs from the host's 3D view system.
//!
//! ## Key Components
//!
//! - [`Viewport`] - A renderable view with a camera, optionally invalidatable
//! - [`ViewManager`] - Owns the active viewports and the registered decorators
//! - [`Decorator`] - Draws overlays into a [`DecorateContext`] once per frame
//! - [`ViewFilter`] - Selects which viewports a decorator applies to
//! - [`BasicViewManager`] / [`SceneViewport`] - Ready-made host implementations

pub mod decorate;
pub mod filter;
pub mod manager;
pub mod scene_viewport;
pub mod viewport;

pub use decorate::{DecorateContext, MarkerGraphic};
pub use filter::ViewFilter;
pub use manager::{BasicViewManager, Decorator, DecoratorId, ViewManager};
pub use scene_viewport::SceneViewport;
pub use viewport::{world_to_view, InvalidateDecorations, Viewport, ViewportId};
