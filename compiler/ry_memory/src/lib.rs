//! Memory runtime for executing Ryton programs.
//!
//! - [`Stack`], [`Arenas`], [`Pool`] and [`Buffers`]: explicit allocators
//! - [`LeakRegistry`]: allocations tracked on request and reported later
//! - a collected heap with four interchangeable [`CollectorKind`]s
//! - [`ObjectTable`]: values stored by name
//!
//! [`MemoryRuntime`] puts them behind locks for a running program.

mod arena;
mod buffers;
mod config;
mod error;
mod gc;
mod handle;
mod leaks;
mod objects;
mod pool;
mod runtime;
mod stack;

pub use arena::Arenas;
pub use buffers::Buffers;
pub use config::{
    CollectorKind, MemoryConfig, DEFAULT_HEAP_SIZE, DEFAULT_SLOT_SIZE, DEFAULT_THRESHOLD,
};
pub use error::MemoryError;
pub use gc::ObjectFlags;
pub use handle::{ArenaId, BufferId, GcRef, Handle, SlotId, StackHandle};
pub use leaks::LeakRegistry;
pub use objects::ObjectTable;
pub use pool::Pool;
pub use runtime::{MemoryRuntime, MemoryStats};
pub use stack::Stack;

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
