//! # Marker System
//!
//! Markers are drawable overlay elements anchored in a 3D scene. UI nodes
//! create them, register them with a [`MarkerRegistry`], and the registry's
//! decorator draws them into every eligible viewport each frame.
//!
//! ## Key Components
//!
//! - [`Marker`] - Base trait for anything that can draw itself into a viewport
//! - [`MarkerRegistry`] - Ordered, non-owning collection with move-to-front
//! - [`MarkerId`] - Generational handle for one registration
//! - [`PinMarker`] - World-anchored pin with label, size and color
//!
//! ## Usage
//!
//! ```
//! use std::rc::Rc;
//! use haggis_markers::markers::{MarkerRegistry, PinMarker};
//! use cgmath::Point3;
//!
//! let mut registry = MarkerRegistry::new();
//! let pin = Rc::new(PinMarker::new(Point3::new(0.0, 0.0, 0.5)));
//! let id = registry.register(pin.clone());
//! registry.refresh_position(id);
//! assert_eq!(registry.iter().next(), Some(id));
//! ```

pub mod id;
pub mod pin;
pub mod registry;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use id::MarkerId;
pub use pin::PinMarker;
pub use registry::MarkerRegistry;
pub use traits::Marker;
