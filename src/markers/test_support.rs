//! Shared marker doubles for unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use cgmath::Point2;

use super::traits::Marker;
use crate::view::{DecorateContext, MarkerGraphic};

/// Names of markers in the order they were drawn.
pub(crate) type DrawLog = Rc<RefCell<Vec<String>>>;

/// Marker that records each draw into a log and emits one graphic.
pub(crate) struct RecordingMarker {
    label: String,
    log: DrawLog,
}

impl RecordingMarker {
    pub(crate) fn new(label: &str, log: &DrawLog) -> Rc<Self> {
        Rc::new(Self {
            label: label.to_owned(),
            log: Rc::clone(log),
        })
    }

    /// A marker with its own private log.
    pub(crate) fn detached(label: &str) -> Rc<Self> {
        Self::new(label, &DrawLog::default())
    }
}

impl Marker for RecordingMarker {
    fn add_decoration(&self, context: &mut DecorateContext<'_>) {
        self.log.borrow_mut().push(self.label.clone());
        context.add_graphic(
            MarkerGraphic::new(Point2::new(0.0, 0.0), 0.0, 1.0).with_label(self.label.clone()),
        );
    }

    fn name(&self) -> &str {
        &self.label
    }
}
