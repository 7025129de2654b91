use std::collections::BTreeSet;

use crate::Handle;

/// Allocations tracked on request. Whatever is still tracked when
/// [`LeakRegistry::report`] is called counts as leaked.
#[derive(Debug, Default)]
pub struct LeakRegistry {
    tracked: BTreeSet<Handle>,
}

impl LeakRegistry {
    pub fn track(&mut self, handle: Handle) {
        self.tracked.insert(handle);
    }

    /// Stop tracking `handle`. Untracked handles are ignored.
    pub fn release(&mut self, handle: Handle) {
        self.tracked.remove(&handle);
    }

    /// Tracked allocations that have not been released, in handle order.
    pub fn report(&self) -> Vec<Handle> {
        self.tracked.iter().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.tracked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracked.is_empty()
    }
}
