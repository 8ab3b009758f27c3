//! # Integration Context
//!
//! [`IntegrationContext`] is what descendant UI nodes see of a provider: the
//! decoration handle plus register / unregister / refresh / invalidate
//! operations. It travels down the UI tree through a [`ContextScope`], a
//! keyed channel where lookups fail loudly when no provider is present.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use log::trace;

use crate::decoration::MarkerDecoration;
use crate::error::{MarkerError, Result};
use crate::invalidation::InvalidationQueue;
use crate::markers::{Marker, MarkerId};

/// Key under which providers publish their [`IntegrationContext`].
pub const MARKER_DECORATION_CONTEXT: &str = "MarkerDecorationContext";

struct ContextInner {
    decoration: Rc<MarkerDecoration>,
    invalidation: InvalidationQueue,
    invalidate_on_refresh: bool,
}

/// Registry operations exposed to descendant UI nodes.
///
/// Clones are cheap and share identity; two contexts compare equal under
/// [`ptr_eq`](Self::ptr_eq) exactly when they came from the same provider.
#[derive(Clone)]
pub struct IntegrationContext {
    inner: Rc<ContextInner>,
}

impl IntegrationContext {
    pub(crate) fn new(
        decoration: Rc<MarkerDecoration>,
        invalidation: InvalidationQueue,
        invalidate_on_refresh: bool,
    ) -> Self {
        Self {
            inner: Rc::new(ContextInner {
                decoration,
                invalidation,
                invalidate_on_refresh,
            }),
        }
    }

    /// The decorator drawing this context's markers.
    pub fn decoration(&self) -> &Rc<MarkerDecoration> {
        &self.inner.decoration
    }

    /// Append a marker to the draw order. No repaint is requested.
    pub fn register(&self, marker: Rc<dyn Marker>) -> MarkerId {
        self.inner.decoration.registry().borrow_mut().register(marker)
    }

    /// Remove a registration and, if it existed, queue an invalidation pass.
    pub fn unregister(&self, id: MarkerId) -> bool {
        let removed = self.inner.decoration.registry().borrow_mut().unregister(id);
        if removed {
            self.inner.invalidation.enqueue();
        }
        removed
    }

    /// Move a registration to the front of the draw order.
    ///
    /// Queues an invalidation pass only when the provider was configured with
    /// `invalidate_on_refresh`.
    pub fn refresh_position(&self, id: MarkerId) -> bool {
        let moved = self
            .inner
            .decoration
            .registry()
            .borrow_mut()
            .refresh_position(id);
        if moved && self.inner.invalidate_on_refresh {
            self.inner.invalidation.enqueue();
        }
        moved
    }

    /// Queue an invalidation pass over the affected viewports.
    ///
    /// Returns `false` if the request was folded into a pending pass.
    pub fn enqueue_view_invalidation(&self) -> bool {
        self.inner.invalidation.enqueue()
    }

    /// The queue that coalesces this context's invalidation requests.
    pub fn invalidation(&self) -> &InvalidationQueue {
        &self.inner.invalidation
    }

    /// Registration handles in current draw order.
    pub fn marker_order(&self) -> Vec<MarkerId> {
        self.inner.decoration.registry().borrow().iter().collect()
    }

    /// Number of live registrations.
    pub fn marker_count(&self) -> usize {
        self.inner.decoration.registry().borrow().len()
    }

    /// Whether both contexts belong to the same provider.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for IntegrationContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntegrationContext")
            .field("decoration", &self.inner.decoration)
            .field("invalidation", &self.inner.invalidation)
            .field("invalidate_on_refresh", &self.inner.invalidate_on_refresh)
            .finish()
    }
}

type Entries = HashMap<&'static str, Vec<(u64, Rc<dyn Any>)>>;

/// One level of the scope chain.
struct Frame {
    parent: Option<Rc<Frame>>,
    entries: RefCell<Entries>,
    next_token: Cell<u64>,
}

impl Frame {
    fn new(parent: Option<Rc<Frame>>) -> Self {
        Self {
            parent,
            entries: RefCell::new(HashMap::new()),
            next_token: Cell::new(0),
        }
    }

    fn ancestors(&self) -> impl Iterator<Item = &Frame> {
        std::iter::successors(Some(self), |frame| frame.parent.as_deref())
    }
}

/// Keyed, provider-required context channel.
///
/// Scopes form a chain mirroring the UI tree: [`child`](Self::child) opens a
/// frame below this one. Providers publish values into a frame with
/// [`provide`](Self::provide); consumers look them up with
/// [`require`](Self::require), which searches the frame and then its
/// ancestors. Within a frame the most recent provider wins. Clones share the
/// same frame.
#[derive(Clone)]
pub struct ContextScope {
    frame: Rc<Frame>,
}

impl ContextScope {
    /// Create a root scope with no providers.
    pub fn new() -> Self {
        Self {
            frame: Rc::new(Frame::new(None)),
        }
    }

    /// Open a nested scope. Values provided into it are invisible to this
    /// scope and to its other children.
    pub fn child(&self) -> Self {
        Self {
            frame: Rc::new(Frame::new(Some(Rc::clone(&self.frame)))),
        }
    }

    /// Publish a value under `key` until the returned guard is dropped.
    pub fn provide<T: 'static>(&self, key: &'static str, value: T) -> ProvideGuard {
        let token = self.frame.next_token.get();
        self.frame.next_token.set(token + 1);
        self.frame
            .entries
            .borrow_mut()
            .entry(key)
            .or_default()
            .push((token, Rc::new(value)));
        trace!("scope: provided `{}` (token {})", key, token);

        ProvideGuard {
            frame: Rc::downgrade(&self.frame),
            key,
            token,
        }
    }

    /// Look up the nearest value provided under `key`.
    ///
    /// # Errors
    ///
    /// [`MarkerError::ProviderMissing`] if no frame in the chain provides
    /// `key`, [`MarkerError::ContextTypeMismatch`] if the value is not a `T`.
    pub fn require<T: Clone + 'static>(&self, key: &'static str) -> Result<T> {
        let value = self
            .frame
            .ancestors()
            .find_map(|frame| {
                frame
                    .entries
                    .borrow()
                    .get(key)
                    .and_then(|stack| stack.last())
                    .map(|(_, value)| Rc::clone(value))
            })
            .ok_or(MarkerError::ProviderMissing { key })?;
        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or(MarkerError::ContextTypeMismatch { key })
    }

    /// Whether any frame in the chain provides `key`.
    pub fn is_provided(&self, key: &'static str) -> bool {
        self.frame.ancestors().any(|frame| {
            frame
                .entries
                .borrow()
                .get(key)
                .is_some_and(|stack| !stack.is_empty())
        })
    }

    /// Number of frames from the root down to this scope.
    pub fn depth(&self) -> usize {
        self.frame.ancestors().count()
    }
}

impl Default for ContextScope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ContextScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = self.frame.entries.borrow();
        let mut keys: Vec<_> = entries
            .iter()
            .filter(|(_, stack)| !stack.is_empty())
            .map(|(key, stack)| (*key, stack.len()))
            .collect();
        keys.sort_unstable();
        f.debug_struct("ContextScope")
            .field("depth", &self.depth())
            .field("provided", &keys)
            .finish()
    }
}

/// Keeps a provided value published; dropping it withdraws the value.
#[must_use = "the value is withdrawn as soon as the guard is dropped"]
pub struct ProvideGuard {
    frame: Weak<Frame>,
    key: &'static str,
    token: u64,
}

impl Drop for ProvideGuard {
    fn drop(&mut self) {
        let Some(frame) = self.frame.upgrade() else {
            return;
        };
        let mut entries = frame.entries.borrow_mut();
        if let Some(stack) = entries.get_mut(self.key) {
            stack.retain(|(token, _)| *token != self.token);
        }
        trace!("scope: withdrew `{}` (token {})", self.key, self.token);
    }
}

impl fmt::Debug for ProvideGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvideGuard")
            .field("key", &self.key)
            .field("token", &self.token)
            .finish()
    }
}

/// Fetch the marker context from the nearest enclosing provider.
///
/// # Errors
///
/// Fails with [`MarkerError::ProviderMissing`] when no
/// [`ViewIntegrationProvider`](crate::provider::ViewIntegrationProvider) has
/// published into `scope`.
pub fn marker_context(scope: &ContextScope) -> Result<IntegrationContext> {
    scope.require(MARKER_DECORATION_CONTEXT)
}
