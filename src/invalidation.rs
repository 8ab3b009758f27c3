//! # Viewport Invalidation
//!
//! Registry mutations do not repaint anything by themselves. Instead an
//! invalidation pass is queued on the host [`Scheduler`]; when it runs, every
//! viewport accepted by the decoration's filter that exposes the
//! invalidation capability is marked stale and redraws on its next frame.
//!
//! A pending flag coalesces requests: however many times
//! [`InvalidationQueue::enqueue`] is called before the pass runs, only one
//! pass is scheduled.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use log::{debug, trace};

use crate::decoration::MarkerDecoration;
use crate::scheduler::Scheduler;
use crate::view::ViewManager;

/// Counters describing invalidation activity since creation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InvalidationStats {
    /// Passes handed to the scheduler.
    pub scheduled: u64,
    /// Requests folded into an already pending pass.
    pub coalesced: u64,
    /// Passes that actually ran.
    pub passes: u64,
    /// Viewports marked stale across all passes.
    pub viewports_invalidated: u64,
}

struct Shared {
    view_manager: Rc<dyn ViewManager>,
    scheduler: Rc<dyn Scheduler>,
    decoration: Rc<MarkerDecoration>,
    pending: Cell<bool>,
    stats: Cell<InvalidationStats>,
}

impl Shared {
    fn update_stats(&self, update: impl FnOnce(&mut InvalidationStats)) {
        let mut stats = self.stats.get();
        update(&mut stats);
        self.stats.set(stats);
    }

    fn run_pass(&self) {
        self.pending.set(false);

        let viewports = self.view_manager.viewports();
        let mut invalidated = 0;
        for viewport in &viewports {
            if !self.decoration.accepts(viewport.as_ref()) {
                continue;
            }
            if let Some(target) = viewport.decoration_invalidation() {
                target.invalidate_decorations();
                invalidated += 1;
            }
        }

        self.update_stats(|stats| {
            stats.passes += 1;
            stats.viewports_invalidated += invalidated;
        });
        debug!(
            "invalidation pass: {} of {} viewport(s) invalidated",
            invalidated,
            viewports.len()
        );
    }
}

/// Coalescing, deferred "invalidate affected viewports" trigger.
///
/// Cloning yields another handle to the same queue and pending flag.
#[derive(Clone)]
pub struct InvalidationQueue {
    shared: Rc<Shared>,
}

impl InvalidationQueue {
    /// Create a queue for the viewports of `view_manager` that `decoration`
    /// accepts, running passes on `scheduler`.
    pub fn new(
        view_manager: Rc<dyn ViewManager>,
        scheduler: Rc<dyn Scheduler>,
        decoration: Rc<MarkerDecoration>,
    ) -> Self {
        Self {
            shared: Rc::new(Shared {
                view_manager,
                scheduler,
                decoration,
                pending: Cell::new(false),
                stats: Cell::new(InvalidationStats::default()),
            }),
        }
    }

    /// Request an invalidation pass.
    ///
    /// # Returns
    ///
    /// `true` if a new pass was scheduled, `false` if the request was folded
    /// into a pass that is already pending
    pub fn enqueue(&self) -> bool {
        if self.shared.pending.replace(true) {
            self.shared.update_stats(|stats| stats.coalesced += 1);
            trace!("invalidation request coalesced into pending pass");
            return false;
        }

        self.shared.update_stats(|stats| stats.scheduled += 1);
        let shared = Rc::downgrade(&self.shared);
        self.shared.scheduler.defer(Box::new(move || match shared.upgrade() {
            Some(shared) => shared.run_pass(),
            None => debug!("invalidation pass skipped: queue was dropped"),
        }));
        true
    }

    /// Whether a pass is scheduled but has not run yet.
    pub fn is_pending(&self) -> bool {
        self.shared.pending.get()
    }

    /// Counters accumulated since the queue was created.
    pub fn stats(&self) -> InvalidationStats {
        self.shared.stats.get()
    }
}

impl fmt::Debug for InvalidationQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InvalidationQueue")
            .field("pending", &self.is_pending())
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}
