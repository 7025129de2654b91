use super::{Collector, Heap};
use crate::{CollectorKind, GcRef};

/// Reclaims objects whose count drops to zero, cascading through their
/// references. A full collection also traces from the roots so that
/// unreachable cycles are reclaimed.
pub(crate) struct ReferenceCounting;

impl ReferenceCounting {
    fn release_zero_counts(heap: &mut Heap) -> Vec<GcRef> {
        let mut pending: Vec<GcRef> = heap
            .refs()
            .filter(|r| heap.get(*r).is_some_and(|o| o.rc == 0))
            .collect();
        pending.sort_unstable();
        let mut dead = Vec::new();
        while let Some(r) = pending.pop() {
            let Some(object) = heap.remove(r) else {
                continue;
            };
            dead.push(r);
            for target in object.refs {
                if heap.get(target).is_some_and(|t| t.rc == 0) {
                    pending.push(target);
                }
            }
        }
        dead
    }
}

impl Collector for ReferenceCounting {
    fn kind(&self) -> CollectorKind {
        CollectorKind::ReferenceCounting
    }

    fn collect(&mut self, heap: &mut Heap) -> Vec<GcRef> {
        let mut dead = Self::release_zero_counts(heap);
        dead.extend(heap.full_collection());
        dead.sort_unstable();
        dead
    }

    fn on_threshold(&mut self, heap: &mut Heap) -> Vec<GcRef> {
        Self::release_zero_counts(heap)
    }
}
