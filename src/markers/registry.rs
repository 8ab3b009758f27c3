//! # Marker Registry
//!
//! Ordered storage for registered markers. Registrations live in a slot arena
//! addressed by [`MarkerId`] handles; draw order is an intrusive doubly-linked
//! list threaded through the slots, so removal and move-to-front are O(1)
//! given a handle. Freed slots are recycled through a free list and their
//! generation is bumped so old handles stop matching.

use std::rc::{Rc, Weak};

use log::trace;

use super::id::{MarkerId, INVALID};
use super::traits::Marker;

#[derive(Debug)]
struct Slot {
    marker: Option<Weak<dyn Marker>>,
    generation: u32,
    prev: u32,
    next: u32,
}

/// Ordered collection of non-owning marker references.
///
/// Order semantics:
/// - [`register`](Self::register) appends at the back, without deduplication.
/// - [`refresh_position`](Self::refresh_position) moves a registration to the
///   front, keeping everything else in relative order.
/// - [`unregister`](Self::unregister) removes exactly that registration.
///
/// Unknown or stale handles are silent no-ops everywhere.
#[derive(Debug)]
pub struct MarkerRegistry {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    head: u32,
    tail: u32,
    len: usize,
}

impl Default for MarkerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            head: INVALID,
            tail: INVALID,
            len: 0,
        }
    }

    /// Append a marker to the end of the draw order.
    ///
    /// Only a weak reference is kept; the caller stays responsible for
    /// keeping the marker alive. Registering the same marker twice creates
    /// two independent registrations.
    ///
    /// # Arguments
    ///
    /// * `marker` - The marker to register
    ///
    /// # Returns
    ///
    /// A handle identifying this registration
    pub fn register(&mut self, marker: Rc<dyn Marker>) -> MarkerId {
        let weak = Rc::downgrade(&marker);
        let idx = if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize].marker = Some(weak);
            idx
        } else {
            let idx = self.slots.len() as u32;
            self.slots.push(Slot {
                marker: Some(weak),
                generation: 0,
                prev: INVALID,
                next: INVALID,
            });
            idx
        };

        self.link_back(idx);
        self.len += 1;

        let id = MarkerId {
            idx,
            generation: self.slots[idx as usize].generation,
        };
        trace!("registered marker '{}' as {:?}", marker.name(), id);
        id
    }

    /// Remove a registration.
    ///
    /// # Returns
    ///
    /// `true` if the handle was live and has been removed, `false` otherwise
    pub fn unregister(&mut self, id: MarkerId) -> bool {
        if !self.contains(id) {
            trace!("unregister ignored for unknown {:?}", id);
            return false;
        }

        let idx = id.idx;
        self.unlink(idx);
        let slot = &mut self.slots[idx as usize];
        slot.marker = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(idx);
        self.len -= 1;

        trace!("unregistered {:?}", id);
        true
    }

    /// Move a registration to the front of the draw order.
    ///
    /// The relative order of all other registrations is preserved.
    ///
    /// # Returns
    ///
    /// `true` if the handle was live, `false` otherwise
    pub fn refresh_position(&mut self, id: MarkerId) -> bool {
        if !self.contains(id) {
            return false;
        }
        if self.head != id.idx {
            self.unlink(id.idx);
            self.link_front(id.idx);
        }
        trace!("refreshed {:?} to front", id);
        true
    }

    /// Returns whether the handle refers to a live registration.
    #[must_use]
    pub fn contains(&self, id: MarkerId) -> bool {
        self.slots.get(id.idx as usize).is_some_and(|slot| {
            slot.generation == id.generation && slot.marker.is_some()
        })
    }

    /// Get the marker behind a registration, if both are still alive.
    pub fn get(&self, id: MarkerId) -> Option<Rc<dyn Marker>> {
        if !self.contains(id) {
            return None;
        }
        self.slots[id.idx as usize]
            .marker
            .as_ref()
            .and_then(Weak::upgrade)
    }

    /// Number of registrations, including ones whose marker was dropped.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check whether there are no registrations.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over registration handles in draw order.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            registry: self,
            current: self.head,
        }
    }

    /// Collect the live markers in draw order.
    ///
    /// Registrations whose marker has been dropped by its owner are skipped.
    /// Decoration passes draw from this snapshot so the registry can be
    /// mutated while markers draw.
    pub fn snapshot(&self) -> Vec<Rc<dyn Marker>> {
        self.iter().filter_map(|id| self.get(id)).collect()
    }

    /// Remove registrations whose marker has been dropped.
    ///
    /// # Returns
    ///
    /// The number of registrations removed
    pub fn prune_dropped(&mut self) -> usize {
        let dead: Vec<MarkerId> = self
            .iter()
            .filter(|id| self.get(*id).is_none())
            .collect();
        for id in &dead {
            self.unregister(*id);
        }
        dead.len()
    }

    /// Remove every registration. Existing handles become stale.
    pub fn clear(&mut self) {
        let ids: Vec<MarkerId> = self.iter().collect();
        for id in ids {
            self.unregister(id);
        }
    }

    fn link_back(&mut self, idx: u32) {
        self.slots[idx as usize].prev = self.tail;
        self.slots[idx as usize].next = INVALID;
        if self.tail == INVALID {
            self.head = idx;
        } else {
            self.slots[self.tail as usize].next = idx;
        }
        self.tail = idx;
    }

    fn link_front(&mut self, idx: u32) {
        self.slots[idx as usize].prev = INVALID;
        self.slots[idx as usize].next = self.head;
        if self.head == INVALID {
            self.tail = idx;
        } else {
            self.slots[self.head as usize].prev = idx;
        }
        self.head = idx;
    }

    fn unlink(&mut self, idx: u32) {
        let prev = self.slots[idx as usize].prev;
        let next = self.slots[idx as usize].next;

        if prev == INVALID {
            self.head = next;
        } else {
            self.slots[prev as usize].next = next;
        }

        if next == INVALID {
            self.tail = prev;
        } else {
            self.slots[next as usize].prev = prev;
        }

        self.slots[idx as usize].prev = INVALID;
        self.slots[idx as usize].next = INVALID;
    }
}

/// An iterator over registration handles in draw order.
///
/// Created by [`MarkerRegistry::iter`].
#[derive(Debug)]
pub struct Iter<'a> {
    registry: &'a MarkerRegistry,
    current: u32,
}

impl Iterator for Iter<'_> {
    type Item = MarkerId;

    fn next(&mut self) -> Option<MarkerId> {
        if self.current == INVALID {
            return None;
        }
        let idx = self.current;
        let slot = &self.registry.slots[idx as usize];
        self.current = slot.next;
        Some(MarkerId {
            idx,
            generation: slot.generation,
        })
    }
}

impl<'a> IntoIterator for &'a MarkerRegistry {
    type Item = MarkerId;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
