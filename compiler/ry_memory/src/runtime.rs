use parking_lot::{Mutex, RwLock};

use crate::gc::{self, Collector, Heap};
use crate::{
    ArenaId, Arenas, BufferId, Buffers, CollectorKind, GcRef, Handle, LeakRegistry, MemoryConfig,
    MemoryError, ObjectTable, Pool, SlotId, Stack, StackHandle,
};

/// Counters for the whole runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryStats {
    pub algorithm: CollectorKind,
    pub heap_size: usize,
    pub threshold: usize,
    /// Bytes currently allocated on the collected heap.
    pub total_allocated: usize,
    pub objects_count: usize,
    pub collections: usize,
    /// Objects reclaimed by the most recent collection.
    pub last_reclaimed: usize,
    pub stack_depth: usize,
    pub pool_slots_in_use: usize,
    pub named_objects: usize,
    pub named_bytes: usize,
}

struct GcState {
    heap: Heap,
    collector: Box<dyn Collector>,
    since_collect: usize,
    collections: usize,
    last_reclaimed: usize,
}

impl GcState {
    fn record(&mut self, dead: &[GcRef]) {
        self.collections += 1;
        self.last_reclaimed = dead.len();
        self.since_collect = 0;
    }
}

/// The memory services available to a running program.
///
/// Every allocator sits behind its own lock, so the runtime can be shared
/// across threads. `V` is the value type stored in the named-object table.
pub struct MemoryRuntime<V = ()> {
    config: MemoryConfig,
    stack: Mutex<Stack>,
    arenas: Mutex<Arenas>,
    pool: Mutex<Pool>,
    buffers: Mutex<Buffers>,
    leaks: Mutex<LeakRegistry>,
    gc: Mutex<GcState>,
    objects: RwLock<ObjectTable<V>>,
}

impl<V> Default for MemoryRuntime<V> {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

impl<V> MemoryRuntime<V> {
    pub fn new(config: MemoryConfig) -> Self {
        tracing::debug!(
            collector = %config.collector,
            heap_size = config.heap_size,
            threshold = config.threshold,
            "memory runtime created"
        );
        MemoryRuntime {
            config,
            stack: Mutex::new(Stack::default()),
            arenas: Mutex::new(Arenas::default()),
            pool: Mutex::new(Pool::new(config.slot_size)),
            buffers: Mutex::new(Buffers::default()),
            leaks: Mutex::new(LeakRegistry::default()),
            gc: Mutex::new(GcState {
                heap: Heap::default(),
                collector: gc::collector(config.collector),
                since_collect: 0,
                collections: 0,
                last_reclaimed: 0,
            }),
            objects: RwLock::new(ObjectTable::default()),
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    // Stack

    pub fn push_frame(&self, size: usize) -> StackHandle {
        self.stack.lock().push(size)
    }

    pub fn pop_frame(&self) -> Result<StackHandle, MemoryError> {
        let (handle, _) = self.stack.lock().pop()?;
        self.leaks.lock().release(Handle::Stack(handle));
        Ok(handle)
    }

    // Arenas

    pub fn create_arena(&self) -> ArenaId {
        self.arenas.lock().create()
    }

    pub fn arena_alloc(&self, arena: ArenaId, size: usize) -> Result<usize, MemoryError> {
        self.arenas.lock().allocate(arena, size)
    }

    pub fn free_arena(&self, arena: ArenaId) -> Result<usize, MemoryError> {
        let freed = self.arenas.lock().free(arena)?;
        self.leaks.lock().release(Handle::Arena(arena));
        Ok(freed)
    }

    // Pool

    pub fn pool_alloc(&self) -> SlotId {
        self.pool.lock().allocate()
    }

    pub fn pool_free(&self, slot: SlotId) -> Result<(), MemoryError> {
        self.pool.lock().free(slot)?;
        self.leaks.lock().release(Handle::Slot(slot));
        Ok(())
    }

    // Buffers

    pub fn create_buffer(&self, name: impl Into<String>, size: usize) -> BufferId {
        self.buffers.lock().create(name, size)
    }

    pub fn destroy_buffer(&self, id: BufferId) -> Result<usize, MemoryError> {
        let size = self.buffers.lock().destroy(id)?;
        self.leaks.lock().release(Handle::Buffer(id));
        Ok(size)
    }

    // Leak registry

    pub fn track(&self, handle: Handle) {
        self.leaks.lock().track(handle);
    }

    /// Tracked allocations not yet released.
    pub fn leaks(&self) -> Vec<Handle> {
        self.leaks.lock().report()
    }

    // Collected heap

    /// Allocate `size` bytes on the collected heap.
    ///
    /// Reaching the allocation threshold runs the collector's threshold
    /// work first; running out of heap runs a full collection. The new
    /// object is unreachable until it is rooted or referenced.
    pub fn allocate(&self, size: usize) -> Result<GcRef, MemoryError> {
        self.allocate_in(&mut self.gc.lock(), size)
    }

    /// Allocate and root in one step, so no collection can run in between.
    pub fn allocate_rooted(&self, size: usize) -> Result<GcRef, MemoryError> {
        let mut gc = self.gc.lock();
        let r = self.allocate_in(&mut gc, size)?;
        gc.heap.add_root(r)?;
        let GcState { heap, collector, .. } = &mut *gc;
        collector.on_link(heap, r, r);
        Ok(r)
    }

    fn allocate_in(&self, gc: &mut GcState, size: usize) -> Result<GcRef, MemoryError> {
        if gc.since_collect >= self.config.threshold {
            let GcState { heap, collector, .. } = &mut *gc;
            let dead = collector.on_threshold(heap);
            gc.record(&dead);
            self.release_reclaimed(&dead);
        }
        if gc.heap.allocated() + size > self.config.heap_size {
            let GcState { heap, collector, .. } = &mut *gc;
            let dead = collector.collect(heap);
            gc.record(&dead);
            self.release_reclaimed(&dead);
        }
        let available = self.config.heap_size.saturating_sub(gc.heap.allocated());
        if size > available {
            return Err(MemoryError::HeapExhausted {
                requested: size,
                available,
            });
        }
        let GcState { heap, collector, .. } = &mut *gc;
        let r = heap.insert(size);
        collector.on_allocate(heap, r);
        gc.since_collect += 1;
        Ok(r)
    }

    pub fn free(&self, r: GcRef) -> Result<(), MemoryError> {
        self.gc
            .lock()
            .heap
            .remove(r)
            .ok_or(MemoryError::UnknownObject(r))?;
        self.leaks.lock().release(Handle::Gc(r));
        Ok(())
    }

    pub fn add_root(&self, r: GcRef) -> Result<(), MemoryError> {
        let mut gc = self.gc.lock();
        gc.heap.add_root(r)?;
        let GcState { heap, collector, .. } = &mut *gc;
        collector.on_link(heap, r, r);
        Ok(())
    }

    pub fn remove_root(&self, r: GcRef) -> Result<(), MemoryError> {
        self.gc.lock().heap.remove_root(r)
    }

    pub fn add_reference(&self, from: GcRef, to: GcRef) -> Result<(), MemoryError> {
        let mut gc = self.gc.lock();
        gc.heap.add_reference(from, to)?;
        let GcState { heap, collector, .. } = &mut *gc;
        collector.on_link(heap, from, to);
        Ok(())
    }

    pub fn remove_reference(&self, from: GcRef, to: GcRef) -> Result<(), MemoryError> {
        self.gc.lock().heap.remove_reference(from, to)
    }

    pub fn is_live(&self, r: GcRef) -> bool {
        self.gc.lock().heap.contains(r)
    }

    /// Run a full collection, returning the reclaimed objects.
    pub fn collect(&self) -> Vec<GcRef> {
        let mut gc = self.gc.lock();
        let GcState { heap, collector, .. } = &mut *gc;
        let dead = collector.collect(heap);
        gc.record(&dead);
        tracing::debug!(
            collector = %gc.collector.kind(),
            reclaimed = dead.len(),
            live = gc.heap.len(),
            "collection finished"
        );
        self.release_reclaimed(&dead);
        dead
    }

    fn release_reclaimed(&self, dead: &[GcRef]) {
        let mut leaks = self.leaks.lock();
        for r in dead {
            leaks.release(Handle::Gc(*r));
        }
    }

    // Named objects

    /// Store `value` under `name`, accounting `size` bytes.
    pub fn store(&self, name: impl Into<String>, value: V, size: usize) -> Option<V> {
        self.objects.write().allocate(name, value, size)
    }

    pub fn free_object(&self, name: &str) -> Result<V, MemoryError> {
        self.objects.write().free(name)
    }

    pub fn load(&self, name: &str) -> Option<V>
    where
        V: Clone,
    {
        self.objects.read().get(name).cloned()
    }

    /// Drop every named object, returning how many were stored.
    pub fn clear_objects(&self) -> usize {
        let values = self.objects.write().drain();
        // Values may hold heap roots; drop them once the table is unlocked.
        let count = values.len();
        drop(values);
        count
    }

    pub fn stats(&self) -> MemoryStats {
        let gc = self.gc.lock();
        let objects = self.objects.read();
        MemoryStats {
            algorithm: gc.collector.kind(),
            heap_size: self.config.heap_size,
            threshold: self.config.threshold,
            total_allocated: gc.heap.allocated(),
            objects_count: gc.heap.len(),
            collections: gc.collections,
            last_reclaimed: gc.last_reclaimed,
            stack_depth: self.stack.lock().depth(),
            pool_slots_in_use: self.pool.lock().in_use(),
            named_objects: objects.live_count(),
            named_bytes: objects.total_bytes(),
        }
    }
}
