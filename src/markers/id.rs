//! Marker registration handles.

use std::fmt;

/// Sentinel value meaning "no slot" in the registry's link fields.
pub(crate) const INVALID: u32 = u32::MAX;

/// A handle to one registration in a [`MarkerRegistry`](super::MarkerRegistry).
///
/// Each call to `register` issues a fresh handle, so the same marker
/// registered twice is addressed by two distinct ids. The generation counter
/// makes handles stale once their registration is removed and the slot reused.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl MarkerId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for MarkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MarkerId({}@gen{})", self.idx, self.generation)
    }
}
