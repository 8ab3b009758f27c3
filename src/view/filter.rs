//! View filters decide which viewports a decorator draws into and which
//! viewports an invalidation pass touches.

use std::fmt;
use std::rc::Rc;

use super::viewport::{Viewport, ViewportId};

/// Predicate over viewports.
///
/// The default filter accepts exactly the viewports that expose the
/// decoration-invalidation capability.
#[derive(Clone)]
pub struct ViewFilter(Rc<dyn Fn(&dyn Viewport) -> bool>);

impl ViewFilter {
    /// Wrap an arbitrary predicate.
    pub fn new(predicate: impl Fn(&dyn Viewport) -> bool + 'static) -> Self {
        Self(Rc::new(predicate))
    }

    /// Accept viewports that can have their decorations invalidated.
    pub fn accepts_decorations() -> Self {
        Self::new(|viewport| viewport.decoration_invalidation().is_some())
    }

    /// Accept every viewport.
    pub fn all() -> Self {
        Self::new(|_| true)
    }

    /// Accept only the listed viewports.
    pub fn only(ids: impl IntoIterator<Item = ViewportId>) -> Self {
        let ids: Vec<ViewportId> = ids.into_iter().collect();
        Self::new(move |viewport| ids.contains(&viewport.id()))
    }

    /// Evaluate the predicate for a viewport.
    pub fn matches(&self, viewport: &dyn Viewport) -> bool {
        (self.0)(viewport)
    }

    /// Whether two filters share the same predicate instance.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for ViewFilter {
    fn default() -> Self {
        Self::accepts_decorations()
    }
}

impl fmt::Debug for ViewFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ViewFilter(..)")
    }
}
