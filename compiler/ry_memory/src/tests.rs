use pretty_assertions::assert_eq;
use proptest::prelude::*;

use crate::*;

fn runtime(kind: CollectorKind) -> MemoryRuntime<String> {
    MemoryRuntime::new(MemoryConfig::default().with_collector(kind))
}

#[test]
fn stack_pops_in_reverse_order() {
    let mut stack = Stack::default();
    let a = stack.push(16);
    let b = stack.push(32);
    assert_eq!(stack.used_bytes(), 48);
    assert_eq!(stack.pop().unwrap(), (b, 32));
    assert_eq!(stack.pop().unwrap(), (a, 16));
    assert_eq!(stack.pop(), Err(MemoryError::StackUnderflow));
}

#[test]
fn arena_frees_all_blocks_together() {
    let mut arenas = Arenas::default();
    let arena = arenas.create();
    assert_eq!(arenas.allocate(arena, 10).unwrap(), 0);
    assert_eq!(arenas.allocate(arena, 6).unwrap(), 10);
    assert_eq!(arenas.used_bytes(), 16);
    assert_eq!(arenas.free(arena).unwrap(), 16);
    assert!(arenas.is_empty());
    assert_eq!(arenas.allocate(arena, 1), Err(MemoryError::UnknownArena(arena)));
}

#[test]
fn pool_reuses_freed_slots() {
    let mut pool = Pool::new(64);
    let a = pool.allocate();
    let b = pool.allocate();
    pool.free(a).unwrap();
    assert_eq!(pool.allocate(), a);
    assert_eq!(pool.capacity(), 2);
    assert_eq!(pool.in_use(), 2);
    pool.free(b).unwrap();
    assert_eq!(pool.free(b), Err(MemoryError::DoubleFree(b)));
}

#[test]
fn buffers_are_destroyed_by_id() {
    let mut buffers = Buffers::default();
    let id = buffers.create("frame", 128);
    assert_eq!(buffers.name(id), Some("frame"));
    assert_eq!(buffers.destroy(id).unwrap(), 128);
    assert_eq!(buffers.destroy(id), Err(MemoryError::UnknownBuffer(id)));
}

#[test]
fn object_table_accounts_bytes() {
    let mut table = ObjectTable::default();
    assert_eq!(table.allocate("a", 1, 8), None);
    assert_eq!(table.allocate("b", 2, 4), None);
    assert_eq!(table.allocate("a", 3, 2), Some(1));
    assert_eq!(table.total_bytes(), 6);
    assert_eq!(table.get("a"), Some(&3));
    assert_eq!(table.free("b").unwrap(), 2);
    assert_eq!(table.free("b"), Err(MemoryError::UnknownName("b".into())));
    assert_eq!(table.drain().len(), 1);
    assert_eq!(table.live_count(), 0);
    assert_eq!(table.total_bytes(), 0);
}

#[test]
fn every_collector_keeps_reachable_objects() {
    for kind in CollectorKind::ALL {
        let rt = runtime(kind);
        let root = rt.allocate(10).unwrap();
        let child = rt.allocate(20).unwrap();
        let garbage = rt.allocate(30).unwrap();
        rt.add_root(root).unwrap();
        rt.add_reference(root, child).unwrap();

        let dead = rt.collect();
        assert_eq!(dead, vec![garbage], "{kind}");
        assert!(rt.is_live(root) && rt.is_live(child), "{kind}");
        assert_eq!(rt.stats().total_allocated, 30, "{kind}");

        rt.remove_root(root).unwrap();
        let mut dead = rt.collect();
        dead.sort();
        assert_eq!(dead, vec![root, child], "{kind}");
        assert_eq!(rt.stats().objects_count, 0, "{kind}");
    }
}

#[test]
fn rooted_allocations_survive_concurrent_threshold_work() {
    for kind in CollectorKind::ALL {
        let rt: MemoryRuntime<String> =
            MemoryRuntime::new(MemoryConfig::default().with_collector(kind).with_threshold(1));
        let rooted: Vec<GcRef> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        (0..50)
                            .map(|_| {
                                rt.allocate(8).unwrap();
                                rt.allocate_rooted(8).unwrap()
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|w| w.join().unwrap())
                .collect()
        });
        assert_eq!(rooted.len(), 200);
        assert!(rooted.iter().all(|r| rt.is_live(*r)), "{kind}");
        rt.collect();
        assert!(rooted.iter().all(|r| rt.is_live(*r)), "{kind}");
        assert_eq!(rt.stats().objects_count, 200, "{kind}");
    }
}

#[test]
fn every_collector_reclaims_unreachable_cycles() {
    for kind in CollectorKind::ALL {
        let rt = runtime(kind);
        let a = rt.allocate(1).unwrap();
        let b = rt.allocate(1).unwrap();
        rt.add_reference(a, b).unwrap();
        rt.add_reference(b, a).unwrap();
        assert_eq!(rt.collect().len(), 2, "{kind}");
    }
}

#[test]
fn explicit_free_releases_bytes() {
    for kind in CollectorKind::ALL {
        let rt = runtime(kind);
        let r = rt.allocate(64).unwrap();
        rt.add_root(r).unwrap();
        rt.free(r).unwrap();
        assert!(!rt.is_live(r));
        assert_eq!(rt.stats().total_allocated, 0);
        assert_eq!(rt.free(r), Err(MemoryError::UnknownObject(r)));
    }
}

#[test]
fn leak_registry_empties_after_forced_collection() {
    for kind in CollectorKind::ALL {
        let rt = runtime(kind);
        let r = rt.allocate(8).unwrap();
        let slot = rt.pool_alloc();
        rt.track(Handle::Gc(r));
        rt.track(Handle::Slot(slot));
        assert_eq!(rt.leaks(), vec![Handle::Slot(slot), Handle::Gc(r)]);

        rt.pool_free(slot).unwrap();
        rt.collect();
        assert_eq!(rt.leaks(), Vec::<Handle>::new(), "{kind}");
    }
}

#[test]
fn heap_exhaustion_collects_before_failing() {
    let rt: MemoryRuntime = MemoryRuntime::new(MemoryConfig::default().with_heap_size(100));
    let kept = rt.allocate(60).unwrap();
    rt.add_root(kept).unwrap();
    rt.allocate(40).unwrap();
    // The unrooted 40 bytes are reclaimed to make room.
    let second = rt.allocate(30).unwrap();
    rt.add_root(second).unwrap();
    assert_eq!(rt.stats().collections, 1);
    assert_eq!(
        rt.allocate(50),
        Err(MemoryError::HeapExhausted {
            requested: 50,
            available: 10,
        })
    );
}

#[test]
fn threshold_triggers_collection() {
    for kind in CollectorKind::ALL {
        let rt: MemoryRuntime =
            MemoryRuntime::new(MemoryConfig::default().with_collector(kind).with_threshold(4));
        for _ in 0..5 {
            rt.allocate(1).unwrap();
        }
        let stats = rt.stats();
        assert_eq!(stats.collections, 1, "{kind}");
        assert_eq!(stats.algorithm, kind);
    }
}

#[test]
fn generational_minor_collection_spares_old_objects() {
    let rt: MemoryRuntime = MemoryRuntime::new(
        MemoryConfig::default()
            .with_collector(CollectorKind::Generational)
            .with_threshold(1),
    );
    let old = rt.allocate(1).unwrap();
    rt.add_root(old).unwrap();
    // Two minor collections promote `old`.
    rt.allocate(1).unwrap();
    rt.allocate(1).unwrap();
    rt.remove_root(old).unwrap();
    rt.allocate(1).unwrap();
    assert!(rt.is_live(old));
    rt.collect();
    assert!(!rt.is_live(old));
}

#[test]
fn incremental_steps_keep_linked_objects() {
    let rt: MemoryRuntime = MemoryRuntime::new(
        MemoryConfig::default()
            .with_collector(CollectorKind::Incremental)
            .with_threshold(1),
    );
    let root = rt.allocate(1).unwrap();
    rt.add_root(root).unwrap();
    // Each allocation runs one marking step.
    let late = rt.allocate(1).unwrap();
    rt.add_reference(root, late).unwrap();
    rt.allocate(1).unwrap();
    assert!(rt.is_live(late));
}

#[test]
fn runtime_stack_and_buffers_release_tracked_handles() {
    let rt = runtime(CollectorKind::MarkSweep);
    let frame = rt.push_frame(32);
    let buffer = rt.create_buffer("scratch", 16);
    let arena = rt.create_arena();
    rt.arena_alloc(arena, 8).unwrap();
    rt.track(Handle::Stack(frame));
    rt.track(Handle::Buffer(buffer));
    rt.track(Handle::Arena(arena));
    assert_eq!(rt.pop_frame().unwrap(), frame);
    rt.destroy_buffer(buffer).unwrap();
    assert_eq!(rt.leaks(), vec![Handle::Arena(arena)]);
    assert_eq!(rt.free_arena(arena).unwrap(), 8);
    assert!(rt.leaks().is_empty());
    assert_eq!(rt.pop_frame(), Err(MemoryError::StackUnderflow));
}

#[test]
fn runtime_named_objects() {
    let rt = runtime(CollectorKind::MarkSweep);
    rt.store("greeting", "hello".to_string(), 5);
    assert_eq!(rt.load("greeting").as_deref(), Some("hello"));
    let stats = rt.stats();
    assert_eq!((stats.named_objects, stats.named_bytes), (1, 5));
    assert_eq!(rt.clear_objects(), 1);
    assert_eq!(rt.load("greeting"), None);
}

#[test]
fn memory_error_diagnostic() {
    let diag = MemoryError::StackUnderflow.to_diagnostic();
    assert_eq!(diag.code, ry_diagnostic::ErrorCode::E4003);
    assert_eq!(diag.kind, "MemoryError");
}

proptest! {
    #[test]
    fn collection_keeps_exactly_the_reachable_set(
        edges in prop::collection::vec((0usize..8, 0usize..8), 0..20),
        roots in prop::collection::vec(0usize..8, 0..3),
        kind in prop::sample::select(CollectorKind::ALL.to_vec()),
    ) {
        let rt = runtime(kind);
        let refs: Vec<GcRef> = (0..8).map(|_| rt.allocate(1).unwrap()).collect();
        for (a, b) in &edges {
            rt.add_reference(refs[*a], refs[*b]).unwrap();
        }
        for r in &roots {
            rt.add_root(refs[*r]).unwrap();
        }

        let mut reachable = [false; 8];
        let mut pending = roots.clone();
        while let Some(i) = pending.pop() {
            if !reachable[i] {
                reachable[i] = true;
                pending.extend(edges.iter().filter(|(a, _)| *a == i).map(|(_, b)| *b));
            }
        }

        rt.collect();
        for (i, r) in refs.iter().enumerate() {
            prop_assert_eq!(rt.is_live(*r), reachable[i]);
        }
    }
}
