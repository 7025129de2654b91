//! The collected heap and its collectors.
//!
//! All four collectors share one [`Heap`]: objects with a size, outgoing
//! references and a root count. They differ in how much work a collection
//! triggered by the allocation threshold does, but a full
//! [`Collector::collect`] always leaves exactly the objects reachable from
//! the roots.

mod generational;
mod incremental;
mod mark_sweep;
mod refcount;

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::{CollectorKind, GcRef, MemoryError};

pub(crate) use generational::Generational;
pub(crate) use incremental::Incremental;
pub(crate) use mark_sweep::MarkSweep;
pub(crate) use refcount::ReferenceCounting;

bitflags! {
    /// Per-object collector state.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    pub struct ObjectFlags: u8 {
        /// Reached in the current marking.
        const MARKED = 1 << 0;
        /// Promoted to the old generation.
        const OLD = 1 << 1;
    }
}

#[derive(Debug)]
pub(crate) struct GcObject {
    pub size: usize,
    pub refs: Vec<GcRef>,
    pub flags: ObjectFlags,
    /// Root registrations plus incoming references.
    pub rc: usize,
    /// Minor collections survived.
    pub age: u8,
}

#[derive(Debug, Default)]
pub(crate) struct Heap {
    objects: FxHashMap<GcRef, GcObject>,
    roots: FxHashMap<GcRef, usize>,
    next: u64,
    allocated: usize,
}

impl Heap {
    pub fn insert(&mut self, size: usize) -> GcRef {
        let r = GcRef::new(self.next);
        self.next += 1;
        self.allocated += size;
        self.objects.insert(
            r,
            GcObject {
                size,
                refs: Vec::new(),
                flags: ObjectFlags::empty(),
                rc: 0,
                age: 0,
            },
        );
        r
    }

    /// Remove `r`, dropping the counts it contributed to its targets.
    pub fn remove(&mut self, r: GcRef) -> Option<GcObject> {
        let object = self.objects.remove(&r)?;
        self.allocated -= object.size;
        self.roots.remove(&r);
        for target in &object.refs {
            if let Some(t) = self.objects.get_mut(target) {
                t.rc = t.rc.saturating_sub(1);
            }
        }
        Some(object)
    }

    pub fn get(&self, r: GcRef) -> Option<&GcObject> {
        self.objects.get(&r)
    }

    pub fn get_mut(&mut self, r: GcRef) -> Option<&mut GcObject> {
        self.objects.get_mut(&r)
    }

    pub fn contains(&self, r: GcRef) -> bool {
        self.objects.contains_key(&r)
    }

    pub fn add_root(&mut self, r: GcRef) -> Result<(), MemoryError> {
        let object = self.objects.get_mut(&r).ok_or(MemoryError::UnknownObject(r))?;
        object.rc += 1;
        *self.roots.entry(r).or_insert(0) += 1;
        Ok(())
    }

    pub fn remove_root(&mut self, r: GcRef) -> Result<(), MemoryError> {
        let Some(count) = self.roots.get_mut(&r) else {
            return Err(MemoryError::UnknownObject(r));
        };
        *count -= 1;
        if *count == 0 {
            self.roots.remove(&r);
        }
        if let Some(object) = self.objects.get_mut(&r) {
            object.rc = object.rc.saturating_sub(1);
        }
        Ok(())
    }

    pub fn add_reference(&mut self, from: GcRef, to: GcRef) -> Result<(), MemoryError> {
        if !self.objects.contains_key(&to) {
            return Err(MemoryError::UnknownObject(to));
        }
        let source = self.objects.get_mut(&from).ok_or(MemoryError::UnknownObject(from))?;
        source.refs.push(to);
        if let Some(target) = self.objects.get_mut(&to) {
            target.rc += 1;
        }
        Ok(())
    }

    pub fn remove_reference(&mut self, from: GcRef, to: GcRef) -> Result<(), MemoryError> {
        let source = self.objects.get_mut(&from).ok_or(MemoryError::UnknownObject(from))?;
        let Some(pos) = source.refs.iter().position(|r| *r == to) else {
            return Err(MemoryError::UnknownObject(to));
        };
        source.refs.swap_remove(pos);
        if let Some(target) = self.objects.get_mut(&to) {
            target.rc = target.rc.saturating_sub(1);
        }
        Ok(())
    }

    pub fn roots(&self) -> Vec<GcRef> {
        self.roots.keys().copied().collect()
    }

    pub fn refs(&self) -> impl Iterator<Item = GcRef> + '_ {
        self.objects.keys().copied()
    }

    pub fn allocated(&self) -> usize {
        self.allocated
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn clear_marks(&mut self) {
        for object in self.objects.values_mut() {
            object.flags.remove(ObjectFlags::MARKED);
        }
    }

    /// Mark everything reachable from `start`. Already marked objects are
    /// not traversed again.
    pub fn mark_from(&mut self, start: impl IntoIterator<Item = GcRef>) {
        let mut pending: Vec<GcRef> = start.into_iter().collect();
        while let Some(r) = pending.pop() {
            let Some(object) = self.objects.get_mut(&r) else {
                continue;
            };
            if object.flags.contains(ObjectFlags::MARKED) {
                continue;
            }
            object.flags.insert(ObjectFlags::MARKED);
            pending.extend(object.refs.iter().copied());
        }
    }

    /// Remove every unmarked object accepted by `filter`.
    pub fn sweep(&mut self, filter: impl Fn(&GcObject) -> bool) -> Vec<GcRef> {
        let mut dead: Vec<GcRef> = self
            .objects
            .iter()
            .filter(|(_, o)| !o.flags.contains(ObjectFlags::MARKED) && filter(o))
            .map(|(r, _)| *r)
            .collect();
        dead.sort_unstable();
        for r in &dead {
            self.remove(*r);
        }
        dead
    }

    /// Mark from the roots and sweep everything else.
    pub fn full_collection(&mut self) -> Vec<GcRef> {
        self.clear_marks();
        let roots = self.roots();
        self.mark_from(roots);
        let dead = self.sweep(|_| true);
        self.clear_marks();
        dead
    }
}

/// Strategy for reclaiming unreachable objects from a [`Heap`].
pub(crate) trait Collector: Send {
    fn kind(&self) -> CollectorKind;

    /// Reclaim every object not reachable from a root.
    fn collect(&mut self, heap: &mut Heap) -> Vec<GcRef>;

    /// Work done when the allocation threshold is reached. May leave some
    /// garbage for a later collection.
    fn on_threshold(&mut self, heap: &mut Heap) -> Vec<GcRef> {
        self.collect(heap)
    }

    fn on_allocate(&mut self, _heap: &mut Heap, _r: GcRef) {}

    /// Called after `from` gains a reference to `to`, or `to` becomes a root
    /// (with `from == to`).
    fn on_link(&mut self, _heap: &mut Heap, _from: GcRef, _to: GcRef) {}
}

pub(crate) fn collector(kind: CollectorKind) -> Box<dyn Collector> {
    match kind {
        CollectorKind::MarkSweep => Box::new(MarkSweep),
        CollectorKind::ReferenceCounting => Box::new(ReferenceCounting),
        CollectorKind::Generational => Box::new(Generational::default()),
        CollectorKind::Incremental => Box::new(Incremental::default()),
    }
}
