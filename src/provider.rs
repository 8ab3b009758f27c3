//! # View Integration Provider
//!
//! Lifecycle glue between a UI tree and the host view system. A provider owns
//! one marker registry and its [`MarkerDecoration`]; mounting registers the
//! decoration with the [`ViewManager`], unmounting (or dropping the provider)
//! releases that registration. Descendant nodes reach the registry through
//! the [`IntegrationContext`] the provider publishes.
//!
//! ## Usage
//!
//! ```
//! use std::rc::Rc;
//! use haggis_markers::prelude::*;
//!
//! let views = Rc::new(BasicViewManager::new());
//! let tasks = TaskQueue::new();
//! let mut provider =
//!     ViewIntegrationProvider::new(views.clone(), Rc::new(tasks.clone()), ProviderConfig::default());
//! provider.mount()?;
//!
//! let scope = ContextScope::new();
//! let _published = provider.provide(&scope);
//!
//! // Somewhere deep in the UI tree:
//! let markers = marker_context(&scope.child())?;
//! let pin = Rc::new(PinMarker::new(Point3::new(0.0, 0.0, 0.5)));
//! let id = markers.register(pin.clone());
//! markers.unregister(id);
//! tasks.run_pending();
//! # Ok::<(), MarkerError>(())
//! ```

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::context::{ContextScope, IntegrationContext, ProvideGuard, MARKER_DECORATION_CONTEXT};
use crate::decoration::MarkerDecoration;
use crate::error::{MarkerError, Result};
use crate::invalidation::InvalidationQueue;
use crate::markers::MarkerRegistry;
use crate::scheduler::Scheduler;
use crate::view::{Decorator, DecoratorId, ViewFilter, ViewManager};

/// Provider configuration.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    /// Viewport predicate for decoration and invalidation; `None` selects
    /// [`ViewFilter::default`].
    pub view_filter: Option<ViewFilter>,

    /// Whether `refresh_position` also queues an invalidation pass.
    pub invalidate_on_refresh: bool,
}

impl ProviderConfig {
    /// Default configuration: default view filter, no invalidation on refresh.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a custom view filter.
    pub fn with_view_filter(mut self, view_filter: ViewFilter) -> Self {
        self.view_filter = Some(view_filter);
        self
    }

    /// Choose whether `refresh_position` queues an invalidation pass.
    pub fn with_invalidate_on_refresh(mut self, invalidate_on_refresh: bool) -> Self {
        self.invalidate_on_refresh = invalidate_on_refresh;
        self
    }
}

/// Lifecycle state of a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderState {
    Unmounted,
    Mounted,
}

/// A decoration registered with a view manager.
///
/// Dropping it removes the decorator from the manager and deactivates the
/// decoration, so hosts still holding the decorator no longer draw it.
pub struct DecoratorRegistration {
    view_manager: Rc<dyn ViewManager>,
    decoration: Rc<MarkerDecoration>,
    id: DecoratorId,
}

impl DecoratorRegistration {
    fn acquire(view_manager: &Rc<dyn ViewManager>, decoration: &Rc<MarkerDecoration>) -> Self {
        decoration.set_active(true);
        let decorator: Rc<dyn Decorator> = decoration.clone();
        let id = view_manager.add_decorator(decorator);
        Self {
            view_manager: Rc::clone(view_manager),
            decoration: Rc::clone(decoration),
            id,
        }
    }

    /// Id the view manager assigned to the decorator.
    pub fn id(&self) -> DecoratorId {
        self.id
    }
}

impl Drop for DecoratorRegistration {
    fn drop(&mut self) {
        self.decoration.set_active(false);
        self.view_manager.drop_decorator(self.id);
        debug!("released decorator registration {:?}", self.id);
    }
}

impl fmt::Debug for DecoratorRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecoratorRegistration")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Owns a marker registry and bridges it to a view manager and a UI tree.
pub struct ViewIntegrationProvider {
    view_manager: Rc<dyn ViewManager>,
    decoration: Rc<MarkerDecoration>,
    context: IntegrationContext,
    registration: Option<DecoratorRegistration>,
}

impl ViewIntegrationProvider {
    /// Create an unmounted provider.
    ///
    /// # Arguments
    ///
    /// * `view_manager` - Host view system the decoration is registered with
    /// * `scheduler` - Where deferred invalidation passes run
    /// * `config` - View filter and invalidation options
    pub fn new(
        view_manager: Rc<dyn ViewManager>,
        scheduler: Rc<dyn Scheduler>,
        config: ProviderConfig,
    ) -> Self {
        let registry = Rc::new(RefCell::new(MarkerRegistry::new()));
        let decoration = Rc::new(MarkerDecoration::new(registry, config.view_filter));
        decoration.set_active(false);

        let invalidation =
            InvalidationQueue::new(Rc::clone(&view_manager), scheduler, Rc::clone(&decoration));
        let context = IntegrationContext::new(
            Rc::clone(&decoration),
            invalidation,
            config.invalidate_on_refresh,
        );

        Self {
            view_manager,
            decoration,
            context,
            registration: None,
        }
    }

    /// Register the decoration with the view manager.
    ///
    /// # Errors
    ///
    /// [`MarkerError::AlreadyMounted`] if the provider is already mounted.
    pub fn mount(&mut self) -> Result<()> {
        if self.registration.is_some() {
            return Err(MarkerError::AlreadyMounted);
        }
        let registration = DecoratorRegistration::acquire(&self.view_manager, &self.decoration);
        debug!("provider mounted as {:?}", registration.id());
        self.registration = Some(registration);
        Ok(())
    }

    /// Release the decoration's registration.
    ///
    /// Registered markers are kept, so a later [`mount`](Self::mount) draws
    /// them again.
    ///
    /// # Returns
    ///
    /// `true` if the provider was mounted
    pub fn unmount(&mut self) -> bool {
        let was_mounted = self.registration.take().is_some();
        if was_mounted {
            debug!("provider unmounted");
        }
        was_mounted
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ProviderState {
        if self.registration.is_some() {
            ProviderState::Mounted
        } else {
            ProviderState::Unmounted
        }
    }

    /// Whether the decoration is registered with the view manager.
    pub fn is_mounted(&self) -> bool {
        self.registration.is_some()
    }

    /// Id of the live decorator registration, if mounted.
    pub fn decorator_id(&self) -> Option<DecoratorId> {
        self.registration.as_ref().map(DecoratorRegistration::id)
    }

    /// Update the bound view filter in place; `None` restores the default.
    ///
    /// The decorator stays registered under the same id.
    pub fn set_view_filter(&self, view_filter: Option<ViewFilter>) {
        self.decoration.set_view_filter(view_filter.unwrap_or_default());
    }

    /// The decoration this provider registers.
    pub fn decoration(&self) -> &Rc<MarkerDecoration> {
        &self.decoration
    }

    /// Context handed to descendant UI nodes.
    pub fn context(&self) -> IntegrationContext {
        self.context.clone()
    }

    /// Publish this provider's context into `scope` under
    /// [`MARKER_DECORATION_CONTEXT`].
    pub fn provide(&self, scope: &ContextScope) -> ProvideGuard {
        scope.provide(MARKER_DECORATION_CONTEXT, self.context())
    }
}

impl fmt::Debug for ViewIntegrationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewIntegrationProvider")
            .field("state", &self.state())
            .field("registration", &self.registration)
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::marker_context;
    use crate::markers::test_support::{DrawLog, RecordingMarker};
    use crate::markers::{Marker, MarkerId};
    use std::cell::Cell;
    use crate::scheduler::TaskQueue;
    use crate::view::{BasicViewManager, DecorateContext, SceneViewport, Viewport, ViewportId};

    struct Harness {
        views: Rc<BasicViewManager>,
        tasks: TaskQueue,
        viewport: Rc<SceneViewport>,
        provider: ViewIntegrationProvider,
    }

    fn harness(config: ProviderConfig) -> Harness {
        let views = Rc::new(BasicViewManager::new());
        let viewport = Rc::new(SceneViewport::new(ViewportId(1), 100.0, 100.0));
        views.add_viewport(viewport.clone());
        viewport.take_redraw_request();

        let tasks = TaskQueue::new();
        let provider = ViewIntegrationProvider::new(views.clone(), Rc::new(tasks.clone()), config);
        Harness {
            views,
            tasks,
            viewport,
            provider,
        }
    }

    #[test]
    fn test_refresh_then_unregister_scenario() {
        let h = harness(ProviderConfig::default());
        let ctx = h.provider.context();
        let (a, b, c) = (
            RecordingMarker::detached("A"),
            RecordingMarker::detached("B"),
            RecordingMarker::detached("C"),
        );
        let ia = ctx.register(a.clone());
        let ib = ctx.register(b.clone());
        let ic = ctx.register(c.clone());
        assert_eq!(ctx.marker_order(), vec![ia, ib, ic]);

        assert!(ctx.refresh_position(ib));
        assert_eq!(ctx.marker_order(), vec![ib, ia, ic]);
        assert_eq!(h.tasks.pending(), 0);

        assert!(ctx.unregister(ia));
        assert_eq!(ctx.marker_order(), vec![ib, ic]);
        assert_eq!(h.tasks.pending(), 1);

        h.tasks.run_pending();
        assert_eq!(h.viewport.invalidation_count(), 1);
    }

    #[test]
    fn test_unregister_absent_schedules_nothing() {
        let h = harness(ProviderConfig::default());
        let ctx = h.provider.context();
        let a = RecordingMarker::detached("A");
        let ia = ctx.register(a.clone());
        assert!(ctx.unregister(ia));
        h.tasks.run_pending();

        let before = ctx.marker_order();
        assert!(!ctx.unregister(ia));
        assert_eq!(ctx.marker_order(), before);
        assert_eq!(h.tasks.pending(), 0);
    }

    #[test]
    fn test_refresh_invalidates_when_configured() {
        let h = harness(ProviderConfig::new().with_invalidate_on_refresh(true));
        let ctx = h.provider.context();
        let a = RecordingMarker::detached("A");
        let ia = ctx.register(a.clone());

        assert!(ctx.refresh_position(ia));
        assert_eq!(h.tasks.pending(), 1);
    }

    #[test]
    fn test_mounted_provider_draws_markers() {
        let mut h = harness(ProviderConfig::default());
        h.provider.mount().unwrap();
        assert_eq!(h.provider.state(), ProviderState::Mounted);
        assert_eq!(h.views.decorator_count(), 1);

        let log = DrawLog::default();
        let ctx = h.provider.context();
        let first = RecordingMarker::new("first", &log);
        let second = RecordingMarker::new("second", &log);
        ctx.register(first.clone());
        let second_id = ctx.register(second.clone());
        ctx.refresh_position(second_id);

        let graphics = h.views.decorate(&*h.viewport);
        assert_eq!(graphics.len(), 2);
        assert_eq!(*log.borrow(), vec!["second", "first"]);
    }

    #[test]
    fn test_unmount_stops_decoration() {
        let mut h = harness(ProviderConfig::default());
        let a = RecordingMarker::detached("A");
        h.provider.context().register(a.clone());
        h.provider.mount().unwrap();
        let held: Rc<MarkerDecoration> = Rc::clone(h.provider.decoration());

        assert!(h.provider.unmount());
        assert_eq!(h.provider.state(), ProviderState::Unmounted);
        assert_eq!(h.views.decorator_count(), 0);
        assert!(h.views.decorate(&*h.viewport).is_empty());

        // A host still holding the old decorator draws nothing with it.
        let mut context = DecorateContext::new(&*h.viewport);
        held.decorate(&mut context);
        assert!(context.graphics().is_empty());
        assert!(!h.provider.unmount());
    }

    #[test]
    fn test_mount_and_unmount_request_redraw() {
        let mut h = harness(ProviderConfig::default());
        let ctx = h.provider.context();
        let a = RecordingMarker::detached("A");
        ctx.register(a.clone());

        h.provider.mount().unwrap();
        assert!(h.viewport.redraw_requested());
        let frame = h.views.render_frame();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].1.len(), 1);

        assert!(h.provider.unmount());
        h.tasks.run_pending();
        assert!(h.viewport.redraw_requested());
        let frame = h.views.render_frame();
        assert_eq!(frame.len(), 1);
        assert!(frame[0].1.is_empty());

        h.provider.mount().unwrap();
        assert!(h.viewport.redraw_requested());
        assert_eq!(h.views.render_frame()[0].1.len(), 1);
    }

    /// Unregisters a sibling the first time it is drawn.
    struct Remover {
        context: IntegrationContext,
        target: Cell<Option<MarkerId>>,
    }

    impl Marker for Remover {
        fn add_decoration(&self, _context: &mut DecorateContext<'_>) {
            if let Some(target) = self.target.take() {
                self.context.unregister(target);
            }
        }
    }

    #[test]
    fn test_unregister_during_draw_applies_to_next_pass() {
        let mut h = harness(ProviderConfig::default());
        h.provider.mount().unwrap();
        let ctx = h.provider.context();
        let log = DrawLog::default();
        let remover = Rc::new(Remover {
            context: ctx.clone(),
            target: Cell::new(None),
        });
        let victim = RecordingMarker::new("victim", &log);
        ctx.register(remover.clone());
        let victim_id = ctx.register(victim.clone());
        remover.target.set(Some(victim_id));

        // The pass in progress still draws its snapshot.
        assert_eq!(h.views.decorate(&*h.viewport).len(), 1);
        assert_eq!(*log.borrow(), vec!["victim"]);
        assert_eq!(ctx.marker_count(), 1);
        assert_eq!(h.tasks.pending(), 1);
        assert!(ctx.invalidation().is_pending());

        assert!(h.views.decorate(&*h.viewport).is_empty());
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(h.tasks.pending(), 1);
    }

    #[test]
    fn test_remount_after_unmount() {
        let mut h = harness(ProviderConfig::default());
        h.provider.mount().unwrap();
        let first_id = h.provider.decorator_id();
        h.provider.unmount();
        h.provider.mount().unwrap();

        assert_eq!(h.views.decorator_count(), 1);
        assert_ne!(h.provider.decorator_id(), first_id);
        assert!(h.provider.decoration().is_active());
    }

    #[test]
    fn test_double_mount_fails() {
        let mut h = harness(ProviderConfig::default());
        h.provider.mount().unwrap();
        assert_eq!(h.provider.mount(), Err(MarkerError::AlreadyMounted));
        assert_eq!(h.views.decorator_count(), 1);
    }

    #[test]
    fn test_dropping_provider_releases_decorator() {
        let Harness {
            views,
            mut provider,
            ..
        } = harness(ProviderConfig::default());
        provider.mount().unwrap();
        assert_eq!(views.decorator_count(), 1);

        drop(provider);
        assert_eq!(views.decorator_count(), 0);
    }

    #[test]
    fn test_filter_update_keeps_registration() {
        let mut h = harness(ProviderConfig::default());
        h.provider.mount().unwrap();
        let id = h.provider.decorator_id();
        let a = RecordingMarker::detached("A");
        h.provider.context().register(a.clone());

        h.provider.set_view_filter(Some(ViewFilter::only([ViewportId(9)])));
        assert_eq!(h.provider.decorator_id(), id);
        assert!(h.views.decorate(&*h.viewport).is_empty());

        h.provider.set_view_filter(None);
        assert_eq!(h.views.decorate(&*h.viewport).len(), 1);
    }

    #[test]
    fn test_default_filter_skips_incapable_viewport() {
        let mut h = harness(ProviderConfig::default());
        let incapable = Rc::new(SceneViewport::new(ViewportId(2), 100.0, 100.0).without_invalidation());
        h.views.add_viewport(incapable.clone());
        h.provider.mount().unwrap();
        let ctx = h.provider.context();
        let a = RecordingMarker::detached("A");
        let ia = ctx.register(a.clone());

        assert!(h.views.decorate(&*incapable).is_empty());
        assert_eq!(h.views.decorate(&*h.viewport).len(), 1);

        // One invalidation from mounting, one from the unregister pass.
        ctx.unregister(ia);
        h.tasks.run_pending();
        assert_eq!(h.viewport.invalidation_count(), 2);
        assert_eq!(incapable.invalidation_count(), 0);
    }

    #[test]
    fn test_render_frame_after_invalidation() {
        let mut h = harness(ProviderConfig::default());
        h.provider.mount().unwrap();
        let ctx = h.provider.context();
        let a = RecordingMarker::detached("A");
        ctx.register(a.clone());

        assert_eq!(h.views.render_frame().len(), 1);
        assert!(h.views.render_frame().is_empty());
        ctx.enqueue_view_invalidation();
        h.tasks.run_pending();

        let frame = h.views.render_frame();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].0, h.viewport.id());
        assert_eq!(frame[0].1.len(), 1);
    }

    #[test]
    fn test_context_reaches_descendants_through_scope() {
        let h = harness(ProviderConfig::default());
        let scope = ContextScope::new();
        assert!(marker_context(&scope).is_err());

        let guard = h.provider.provide(&scope);
        let descendant_scope = scope.child().child();
        let ctx = marker_context(&descendant_scope).unwrap();
        assert!(ctx.ptr_eq(&h.provider.context()));
        assert!(Rc::ptr_eq(ctx.decoration(), h.provider.decoration()));

        drop(guard);
        assert!(marker_context(&scope).is_err());
        assert!(marker_context(&descendant_scope).is_err());
    }
}
