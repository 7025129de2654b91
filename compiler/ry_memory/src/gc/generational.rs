use super::{Collector, Heap, ObjectFlags};
use crate::{CollectorKind, GcRef};

/// Minor collections an object must survive before promotion.
const PROMOTION_AGE: u8 = 2;

/// Threshold collections only sweep the young generation, treating every
/// old object as live. Full collections sweep both.
#[derive(Default)]
pub(crate) struct Generational {
    minor: usize,
}

impl Generational {
    fn age_survivors(heap: &mut Heap) {
        let live: Vec<GcRef> = heap.refs().collect();
        for r in live {
            if let Some(object) = heap.get_mut(r) {
                if !object.flags.contains(ObjectFlags::OLD) {
                    object.age += 1;
                    if object.age >= PROMOTION_AGE {
                        object.flags.insert(ObjectFlags::OLD);
                    }
                }
            }
        }
    }
}

impl Collector for Generational {
    fn kind(&self) -> CollectorKind {
        CollectorKind::Generational
    }

    fn collect(&mut self, heap: &mut Heap) -> Vec<GcRef> {
        let dead = heap.full_collection();
        Self::age_survivors(heap);
        dead
    }

    fn on_threshold(&mut self, heap: &mut Heap) -> Vec<GcRef> {
        self.minor += 1;
        heap.clear_marks();
        let mut start = heap.roots();
        start.extend(
            heap.refs()
                .filter(|r| heap.get(*r).is_some_and(|o| o.flags.contains(ObjectFlags::OLD))),
        );
        heap.mark_from(start);
        let dead = heap.sweep(|o| !o.flags.contains(ObjectFlags::OLD));
        heap.clear_marks();
        Self::age_survivors(heap);
        tracing::trace!(minor = self.minor, reclaimed = dead.len(), "minor collection");
        dead
    }
}
