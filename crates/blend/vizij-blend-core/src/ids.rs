//! Identifiers and simple allocators for authoring entities.

use serde::{Deserialize, Serialize};

/// Identity of an authored state (leaf or sub-state-machine).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub u32);

/// Identity of a motion clip referenced by a state.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClipId(pub u32);

/// Monotonic allocator for StateId and ClipId.
/// Useful when building definitions in code rather than loading JSON.
#[derive(Default, Debug)]
pub struct IdAllocator {
    next_state: u32,
    next_clip: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn alloc_state(&mut self) -> StateId {
        let id = StateId(self.next_state);
        self.next_state = self.next_state.wrapping_add(1);
        id
    }

    #[inline]
    pub fn alloc_clip(&mut self) -> ClipId {
        let id = ClipId(self.next_clip);
        self.next_clip = self.next_clip.wrapping_add(1);
        id
    }

    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alloc_monotonic() {
        let mut alloc = IdAllocator::new();
        assert_eq!(alloc.alloc_state(), StateId(0));
        assert_eq!(alloc.alloc_state(), StateId(1));
        assert_eq!(alloc.alloc_clip(), ClipId(0));
        assert_eq!(alloc.alloc_clip(), ClipId(1));
        alloc.reset();
        assert_eq!(alloc.alloc_state(), StateId(0));
    }
}
