//! # View Manager
//!
//! The host side of the decoration contract. A [`ViewManager`] owns the list
//! of active viewports and the decorators that draw into them once per frame.
//! [`BasicViewManager`] is a self-contained implementation for applications
//! that do not already have a view system, and for tests.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::{debug, warn};

use super::decorate::{DecorateContext, MarkerGraphic};
use super::viewport::{Viewport, ViewportId};

/// Something that draws overlays into viewports during decoration passes.
pub trait Decorator {
    /// Draw into the context of one viewport for the current frame.
    fn decorate(&self, context: &mut DecorateContext<'_>);
}

/// Handle returned by [`ViewManager::add_decorator`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DecoratorId(pub u64);

impl fmt::Debug for DecoratorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DecoratorId({})", self.0)
    }
}

/// Contract consumed from the host view-management system.
///
/// Methods take `&self`: the manager is shared between the frame loop and
/// every provider that registers a decorator, all on one thread.
pub trait ViewManager {
    /// Snapshot of the currently active viewports.
    fn viewports(&self) -> Vec<Rc<dyn Viewport>>;

    /// Register a decorator for every future decoration pass.
    ///
    /// Viewports that can be invalidated are marked stale so the decorator
    /// shows up on their next frame.
    fn add_decorator(&self, decorator: Rc<dyn Decorator>) -> DecoratorId;

    /// Remove a decorator. Returns `false` if it was not registered.
    ///
    /// Viewports that can be invalidated are marked stale so nothing the
    /// decorator drew outlives it.
    fn drop_decorator(&self, id: DecoratorId) -> bool;
}

/// In-memory view manager with a simple frame loop.
pub struct BasicViewManager {
    /// Active viewports, in insertion order
    viewports: RefCell<Vec<Rc<dyn Viewport>>>,

    /// Registered decorators, drawn in registration order
    decorators: RefCell<Vec<(DecoratorId, Rc<dyn Decorator>)>>,

    next_decorator: Cell<u64>,
}

impl BasicViewManager {
    /// Create a manager with no viewports or decorators
    pub fn new() -> Self {
        Self {
            viewports: RefCell::new(Vec::new()),
            decorators: RefCell::new(Vec::new()),
            next_decorator: Cell::new(0),
        }
    }

    /// Add a viewport to the active set
    pub fn add_viewport(&self, viewport: Rc<dyn Viewport>) {
        debug!("view manager: added {:?}", viewport.id());
        self.viewports.borrow_mut().push(viewport);
    }

    /// Remove a viewport from the active set
    ///
    /// # Returns
    ///
    /// `true` if a viewport with that id was removed
    pub fn remove_viewport(&self, id: ViewportId) -> bool {
        let mut viewports = self.viewports.borrow_mut();
        let before = viewports.len();
        viewports.retain(|viewport| viewport.id() != id);
        before != viewports.len()
    }

    /// Get the number of active viewports
    pub fn viewport_count(&self) -> usize {
        self.viewports.borrow().len()
    }

    /// Get the number of registered decorators
    pub fn decorator_count(&self) -> usize {
        self.decorators.borrow().len()
    }

    /// Check if a decorator is registered
    pub fn has_decorator(&self, id: DecoratorId) -> bool {
        self.decorators.borrow().iter().any(|(existing, _)| *existing == id)
    }

    /// Run one decoration pass over a viewport
    ///
    /// Decorators are snapshotted first, so a decorator may add or drop
    /// decorators while drawing; the change applies from the next pass.
    ///
    /// # Arguments
    ///
    /// * `viewport` - The viewport to decorate
    ///
    /// # Returns
    ///
    /// Every graphic emitted during the pass, in draw order
    pub fn decorate(&self, viewport: &dyn Viewport) -> Vec<MarkerGraphic> {
        let decorators: Vec<Rc<dyn Decorator>> = self
            .decorators
            .borrow()
            .iter()
            .map(|(_, decorator)| Rc::clone(decorator))
            .collect();

        let mut context = DecorateContext::new(viewport);
        for decorator in decorators {
            decorator.decorate(&mut context);
        }
        context.into_graphics()
    }

    /// Decorate every viewport that has a pending redraw
    ///
    /// Each viewport's redraw request is consumed through
    /// [`Viewport::take_redraw_request`].
    ///
    /// # Returns
    ///
    /// The graphics drawn for each redrawn viewport
    pub fn render_frame(&self) -> Vec<(ViewportId, Vec<MarkerGraphic>)> {
        self.viewports()
            .into_iter()
            .filter(|viewport| viewport.take_redraw_request())
            .map(|viewport| (viewport.id(), self.decorate(viewport.as_ref())))
            .collect()
    }

    /// Mark every viewport that supports it as needing a decoration redraw
    fn invalidate_all(&self) {
        for viewport in self.viewports() {
            if let Some(target) = viewport.decoration_invalidation() {
                target.invalidate_decorations();
            }
        }
    }
}

impl Default for BasicViewManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewManager for BasicViewManager {
    fn viewports(&self) -> Vec<Rc<dyn Viewport>> {
        self.viewports.borrow().clone()
    }

    fn add_decorator(&self, decorator: Rc<dyn Decorator>) -> DecoratorId {
        let id = DecoratorId(self.next_decorator.get());
        self.next_decorator.set(id.0 + 1);
        self.decorators.borrow_mut().push((id, decorator));
        debug!("view manager: added {:?}", id);
        self.invalidate_all();
        id
    }

    fn drop_decorator(&self, id: DecoratorId) -> bool {
        let removed = {
            let mut decorators = self.decorators.borrow_mut();
            decorators
                .iter()
                .position(|(existing, _)| *existing == id)
                .map(|position| decorators.remove(position))
        };
        if removed.is_none() {
            warn!("view manager: drop of unknown {:?}", id);
            return false;
        }
        debug!("view manager: dropped {:?}", id);
        self.invalidate_all();
        true
    }
}

impl fmt::Debug for BasicViewManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasicViewManager")
            .field("viewports", &self.viewport_count())
            .field("decorators", &self.decorator_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::SceneViewport;
    use cgmath::Point2;

    struct Stamp(&'static str);

    impl Decorator for Stamp {
        fn decorate(&self, context: &mut DecorateContext<'_>) {
            context.add_graphic(MarkerGraphic::new(Point2::new(0.0, 0.0), 0.0, 1.0).with_label(self.0));
        }
    }

    #[test]
    fn test_decorators_draw_in_registration_order() {
        let manager = BasicViewManager::new();
        let viewport = SceneViewport::new(ViewportId(1), 10.0, 10.0);
        manager.add_decorator(Rc::new(Stamp("first")));
        manager.add_decorator(Rc::new(Stamp("second")));

        let labels: Vec<_> = manager
            .decorate(&viewport)
            .into_iter()
            .filter_map(|graphic| graphic.label)
            .collect();
        assert_eq!(labels, vec!["first", "second"]);
    }

    #[test]
    fn test_drop_decorator() {
        let manager = BasicViewManager::new();
        let id = manager.add_decorator(Rc::new(Stamp("only")));

        assert!(manager.has_decorator(id));
        assert!(manager.drop_decorator(id));
        assert!(!manager.drop_decorator(id));
        assert_eq!(manager.decorator_count(), 0);
    }

    #[test]
    fn test_adding_and_dropping_decorators_invalidates_viewports() {
        let manager = BasicViewManager::new();
        let capable = Rc::new(SceneViewport::new(ViewportId(1), 10.0, 10.0));
        let incapable = Rc::new(SceneViewport::new(ViewportId(2), 10.0, 10.0).without_invalidation());
        manager.add_viewport(capable.clone());
        manager.add_viewport(incapable.clone());
        capable.take_redraw_request();
        incapable.take_redraw_request();

        let id = manager.add_decorator(Rc::new(Stamp("x")));
        assert!(capable.redraw_requested());
        assert!(!incapable.redraw_requested());
        assert_eq!(manager.render_frame().len(), 1);

        assert!(manager.drop_decorator(id));
        assert_eq!(capable.invalidation_count(), 2);
        let frame = manager.render_frame();
        assert_eq!(frame.len(), 1);
        assert!(frame[0].1.is_empty());

        // Unknown ids leave viewports alone.
        assert!(!manager.drop_decorator(id));
        assert_eq!(capable.invalidation_count(), 2);
    }

    #[test]
    fn test_render_frame_only_decorates_pending_viewports() {
        let manager = BasicViewManager::new();
        let first = Rc::new(SceneViewport::new(ViewportId(1), 10.0, 10.0));
        let second = Rc::new(SceneViewport::new(ViewportId(2), 10.0, 10.0));
        manager.add_viewport(first.clone());
        manager.add_viewport(second.clone());
        manager.add_decorator(Rc::new(Stamp("x")));

        second.take_redraw_request();
        let frame = manager.render_frame();

        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].0, ViewportId(1));
        assert_eq!(frame[0].1.len(), 1);
        assert!(!first.redraw_requested());
        assert!(manager.render_frame().is_empty());
    }

    #[test]
    fn test_remove_viewport() {
        let manager = BasicViewManager::new();
        manager.add_viewport(Rc::new(SceneViewport::new(ViewportId(7), 10.0, 10.0)));

        assert!(manager.remove_viewport(ViewportId(7)));
        assert!(!manager.remove_viewport(ViewportId(7)));
        assert_eq!(manager.viewport_count(), 0);
    }
}
