//! # Deferred Task Scheduling
//!
//! Invalidation is never performed inline: it is handed to a [`Scheduler`]
//! that runs it later, after the current UI update has finished mutating the
//! registry. Hosts with their own event loop implement [`Scheduler`] on top of
//! it; [`TaskQueue`] is a ready-made microtask-style queue that the frame loop
//! drains with [`TaskQueue::run_pending`].

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use log::trace;

/// A deferred unit of work.
pub type Task = Box<dyn FnOnce()>;

/// Runs tasks at some later point on the same thread.
pub trait Scheduler {
    /// Queue a task to run after the current turn. Never runs it inline.
    fn defer(&self, task: Task);
}

/// FIFO queue of deferred tasks, drained explicitly by the host.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct TaskQueue {
    tasks: Rc<RefCell<VecDeque<Task>>>,
}

impl TaskQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tasks waiting to run.
    pub fn pending(&self) -> usize {
        self.tasks.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.borrow().is_empty()
    }

    /// Run queued tasks until the queue is empty.
    ///
    /// Tasks deferred by a running task are run in the same call, after the
    /// ones already queued.
    ///
    /// # Returns
    ///
    /// The number of tasks that ran
    pub fn run_pending(&self) -> usize {
        let mut ran = 0;
        // Pop in its own statement so the borrow ends before the task runs.
        loop {
            let next = self.tasks.borrow_mut().pop_front();
            let Some(task) = next else {
                break;
            };
            task();
            ran += 1;
        }
        if ran > 0 {
            trace!("task queue: ran {} deferred task(s)", ran);
        }
        ran
    }
}

impl Scheduler for TaskQueue {
    fn defer(&self, task: Task) {
        self.tasks.borrow_mut().push_back(task);
    }
}

impl fmt::Debug for TaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskQueue")
            .field("pending", &self.pending())
            .finish()
    }
}
