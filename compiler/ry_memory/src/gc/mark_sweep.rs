use super::{Collector, Heap};
use crate::{CollectorKind, GcRef};

pub(crate) struct MarkSweep;

impl Collector for MarkSweep {
    fn kind(&self) -> CollectorKind {
        CollectorKind::MarkSweep
    }

    fn collect(&mut self, heap: &mut Heap) -> Vec<GcRef> {
        heap.full_collection()
    }
}
