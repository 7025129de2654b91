//! Opaque handles returned by the allocators.

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident($repr:ty)) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name($repr);

        impl $name {
            pub(crate) fn new(raw: $repr) -> Self {
                $name(raw)
            }

            pub fn raw(self) -> $repr {
                self.0
            }
        }
    };
}

handle!(
    /// A pushed stack frame.
    StackHandle(u32)
);
handle!(ArenaId(u32));
handle!(
    /// A slot of the fixed-size pool.
    SlotId(u32)
);
handle!(BufferId(u32));
handle!(
    /// An object on the collected heap.
    GcRef(u64)
);

/// Any allocation the leak registry can track.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Handle {
    Stack(StackHandle),
    Arena(ArenaId),
    Slot(SlotId),
    Buffer(BufferId),
    Gc(GcRef),
}
