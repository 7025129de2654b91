use rustc_hash::FxHashMap;

use crate::{BufferId, MemoryError};

/// Named fixed buffers.
#[derive(Debug, Default)]
pub struct Buffers {
    buffers: FxHashMap<BufferId, (String, usize)>,
    next: u32,
}

impl Buffers {
    pub fn create(&mut self, name: impl Into<String>, size: usize) -> BufferId {
        let id = BufferId::new(self.next);
        self.next += 1;
        self.buffers.insert(id, (name.into(), size));
        id
    }

    pub fn destroy(&mut self, id: BufferId) -> Result<usize, MemoryError> {
        self.buffers
            .remove(&id)
            .map(|(_, size)| size)
            .ok_or(MemoryError::UnknownBuffer(id))
    }

    pub fn name(&self, id: BufferId) -> Option<&str> {
        self.buffers.get(&id).map(|(name, _)| name.as_str())
    }

    pub fn used_bytes(&self) -> usize {
        self.buffers.values().map(|(_, size)| size).sum()
    }
}
