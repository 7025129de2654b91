use super::{Collector, Heap, ObjectFlags};
use crate::{CollectorKind, GcRef};

/// Gray objects processed per threshold step.
const STEP_BUDGET: usize = 64;

/// Tri-color marking spread over threshold steps.
///
/// Marked objects with pending children are gray and sit on the work list.
/// While a cycle is in progress new objects are allocated black, and a link
/// from a marked object shades its target so nothing reachable is missed.
#[derive(Default)]
pub(crate) struct Incremental {
    /// `Some` while a marking cycle is in progress.
    gray: Option<Vec<GcRef>>,
}

impl Incremental {
    fn shade(heap: &mut Heap, gray: &mut Vec<GcRef>, r: GcRef) {
        if let Some(object) = heap.get_mut(r) {
            if !object.flags.contains(ObjectFlags::MARKED) {
                object.flags.insert(ObjectFlags::MARKED);
                gray.push(r);
            }
        }
    }

    fn start(heap: &mut Heap) -> Vec<GcRef> {
        heap.clear_marks();
        let mut gray = Vec::new();
        for root in heap.roots() {
            Self::shade(heap, &mut gray, root);
        }
        gray
    }

    /// Process up to `budget` gray objects. Sweeps and returns the garbage
    /// once marking completes.
    fn step(&mut self, heap: &mut Heap, budget: usize) -> Vec<GcRef> {
        let mut gray = match self.gray.take() {
            Some(gray) => gray,
            None => Self::start(heap),
        };
        let mut done = 0;
        while done < budget {
            let Some(r) = gray.pop() else {
                break;
            };
            let children = heap.get(r).map(|o| o.refs.clone()).unwrap_or_default();
            for child in children {
                Self::shade(heap, &mut gray, child);
            }
            done += 1;
        }
        if gray.is_empty() {
            let dead = heap.sweep(|_| true);
            heap.clear_marks();
            dead
        } else {
            self.gray = Some(gray);
            Vec::new()
        }
    }
}

impl Collector for Incremental {
    fn kind(&self) -> CollectorKind {
        CollectorKind::Incremental
    }

    fn collect(&mut self, heap: &mut Heap) -> Vec<GcRef> {
        // Marks from an unfinished cycle may be stale.
        self.gray = None;
        self.step(heap, usize::MAX)
    }

    fn on_threshold(&mut self, heap: &mut Heap) -> Vec<GcRef> {
        self.step(heap, STEP_BUDGET)
    }

    fn on_allocate(&mut self, heap: &mut Heap, r: GcRef) {
        if self.gray.is_some() {
            if let Some(object) = heap.get_mut(r) {
                object.flags.insert(ObjectFlags::MARKED);
            }
        }
    }

    fn on_link(&mut self, heap: &mut Heap, from: GcRef, to: GcRef) {
        let Some(gray) = self.gray.as_mut() else {
            return;
        };
        if from == to || heap.get(from).is_some_and(|o| o.flags.contains(ObjectFlags::MARKED)) {
            Self::shade(heap, gray, to);
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn link_from_marked_object_shades_target() {
        let mut heap = Heap::default();
        let mut gc = Incremental::default();
        let root = heap.insert(1);
        let child = heap.insert(1);
        let white = heap.insert(1);
        heap.add_root(root).unwrap();
        heap.add_reference(root, child).unwrap();

        // Root is scanned; child is still gray.
        assert!(gc.step(&mut heap, 1).is_empty());
        heap.add_reference(root, white).unwrap();
        gc.on_link(&mut heap, root, white);

        assert!(gc.step(&mut heap, usize::MAX).is_empty());
        assert!(heap.contains(white));
    }

    #[test]
    fn objects_allocated_mid_cycle_survive_it() {
        let mut heap = Heap::default();
        let mut gc = Incremental::default();
        let root = heap.insert(1);
        let child = heap.insert(1);
        heap.add_root(root).unwrap();
        heap.add_reference(root, child).unwrap();

        assert!(gc.step(&mut heap, 1).is_empty());
        let fresh = heap.insert(1);
        gc.on_allocate(&mut heap, fresh);
        assert!(gc.step(&mut heap, usize::MAX).is_empty());
        assert!(heap.contains(fresh));
        // The next full cycle reclaims it.
        assert_eq!(gc.collect(&mut heap), vec![fresh]);
    }
}
