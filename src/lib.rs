// src/lib.rs
//! Haggis Markers
//!
//! Marker decorations for 3D viewports. UI nodes register drawable markers
//! with a provider; the provider's decorator draws them into every eligible
//! viewport each frame, most recently refreshed first, and repaints affected
//! viewports through a coalesced, deferred invalidation pass.
//!
//! ## Architecture
//!
//! ```text
//!   UI node ──► IntegrationContext ──► MarkerRegistry (ordered, weak refs)
//!                     │                        ▲
//!                     ▼                        │ snapshot per pass
//!             InvalidationQueue         MarkerDecoration ◄── ViewManager::decorate
//!                     │ (Scheduler)
//!                     ▼
//!        Viewport::invalidate_decorations
//! ```
//!
//! - [`markers`] - The [`Marker`](markers::Marker) trait, registry and pin marker
//! - [`view`] - Host contract: viewports, decorators, view filters, view manager
//! - [`decoration`] - The registry-backed decorator
//! - [`invalidation`] / [`scheduler`] - Deferred, coalesced repaint requests
//! - [`context`] / [`provider`] - Lifecycle glue and the provider-required context

pub mod context;
pub mod decoration;
pub mod error;
pub mod invalidation;
pub mod markers;
pub mod prelude;
pub mod provider;
pub mod scheduler;
pub mod view;

// Re-export main types for convenience
pub use context::{marker_context, ContextScope, IntegrationContext};
pub use error::{MarkerError, Result};
pub use provider::{ProviderConfig, ViewIntegrationProvider};
