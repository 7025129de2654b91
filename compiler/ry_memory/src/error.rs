use ry_diagnostic::{Diagnostic, ErrorCode};

use crate::{ArenaId, BufferId, GcRef, SlotId};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    #[error("pop from an empty stack")]
    StackUnderflow,

    #[error("unknown arena {0:?}")]
    UnknownArena(ArenaId),

    #[error("unknown pool slot {0:?}")]
    UnknownSlot(SlotId),

    #[error("pool slot {0:?} freed twice")]
    DoubleFree(SlotId),

    #[error("unknown buffer {0:?}")]
    UnknownBuffer(BufferId),

    #[error("unknown heap object {0:?}")]
    UnknownObject(GcRef),

    #[error("no object named `{0}`")]
    UnknownName(String),

    #[error("cannot allocate {requested} bytes: {available} of the heap are free")]
    HeapExhausted { requested: usize, available: usize },

    #[error("unknown collector `{0}` (expected marksweep, refcount, generational or incremental)")]
    UnknownCollector(String),
}

impl MemoryError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error(ErrorCode::E4003)
            .with_kind("MemoryError")
            .with_message(self.to_string())
    }
}
