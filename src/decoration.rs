//! # Marker Decoration
//!
//! The [`Decorator`] a provider registers with the view manager. It draws the
//! markers of a shared [`MarkerRegistry`] into every viewport its
//! [`ViewFilter`] accepts, in registry order.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::trace;

use crate::markers::MarkerRegistry;
use crate::view::{DecorateContext, Decorator, ViewFilter, Viewport};

/// Registry-backed decorator with an updatable view filter.
pub struct MarkerDecoration {
    registry: Rc<RefCell<MarkerRegistry>>,
    view_filter: RefCell<ViewFilter>,
    active: Cell<bool>,
}

impl MarkerDecoration {
    /// Create a decoration over a shared registry.
    ///
    /// # Arguments
    ///
    /// * `registry` - Registry whose markers are drawn
    /// * `view_filter` - Viewport predicate; `None` selects [`ViewFilter::default`]
    pub fn new(registry: Rc<RefCell<MarkerRegistry>>, view_filter: Option<ViewFilter>) -> Self {
        Self {
            registry,
            view_filter: RefCell::new(view_filter.unwrap_or_default()),
            active: Cell::new(true),
        }
    }

    /// The registry whose markers this decoration draws.
    pub fn registry(&self) -> &Rc<RefCell<MarkerRegistry>> {
        &self.registry
    }

    /// The filter currently bound to this decoration.
    pub fn view_filter(&self) -> ViewFilter {
        self.view_filter.borrow().clone()
    }

    /// Replace the bound filter in place. Takes effect on the next pass.
    pub fn set_view_filter(&self, view_filter: ViewFilter) {
        *self.view_filter.borrow_mut() = view_filter;
    }

    /// Whether the bound filter accepts a viewport.
    pub fn accepts(&self, viewport: &dyn Viewport) -> bool {
        // The filter may itself touch this decoration, so do not hold the borrow.
        let filter = self.view_filter();
        filter.matches(viewport)
    }

    /// Whether this decoration currently draws anything.
    ///
    /// A decoration is deactivated when its registration with the view manager
    /// is released, so a host that still holds it draws nothing.
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub(crate) fn set_active(&self, active: bool) {
        self.active.set(active);
    }
}

impl Decorator for MarkerDecoration {
    fn decorate(&self, context: &mut DecorateContext<'_>) {
        if !self.active.get() || !self.accepts(context.viewport()) {
            return;
        }

        let markers = {
            let mut registry = self.registry.borrow_mut();
            let pruned = registry.prune_dropped();
            if pruned > 0 {
                trace!("decoration: pruned {} dropped marker(s)", pruned);
            }
            registry.snapshot()
        };
        for marker in markers {
            marker.add_decoration(context);
        }
    }
}

impl fmt::Debug for MarkerDecoration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MarkerDecoration")
            .field("markers", &self.registry.borrow().len())
            .field("active", &self.active.get())
            .finish_non_exhaustive()
    }
}
