//! Allocation accounting for the rewind ring: tearing a ring down, or
//! failing to build one, must leave no live allocations behind.

use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;

use smsplus_core::{MemoryBudget, RewindBuffer, RewindConfig, RewindError, SaveStateSource};

struct Counting;

/// Chunk size used by the heap-probe test; nothing else allocates exactly this.
const PROBE_CHUNK: usize = 777_777;

thread_local! {
    static LIVE: Cell<isize> = const { Cell::new(0) };
    static PROBE_CHUNKS: Cell<usize> = const { Cell::new(0) };
}

fn adjust(delta: isize) {
    let _ = LIVE.try_with(|live| live.set(live.get() + delta));
}

fn note_alloc(size: usize) {
    if size == PROBE_CHUNK {
        let _ = PROBE_CHUNKS.try_with(|n| n.set(n.get() + 1));
    }
}

unsafe impl GlobalAlloc for Counting {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            adjust(layout.size() as isize);
            note_alloc(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        adjust(-(layout.size() as isize));
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new = System.realloc(ptr, layout, new_size);
        if !new.is_null() { adjust(new_size as isize - layout.size() as isize); }
        new
    }
}

#[global_allocator]
static GLOBAL: Counting = Counting;

fn live() -> isize {
    LIVE.with(|live| live.get())
}

struct Blob {
    byte: u8,
}

impl SaveStateSource for Blob {
    fn state_size(&self) -> usize { 1024 }

    fn save_state(&mut self, buf: &mut [u8]) -> bool {
        buf.fill(self.byte);
        true
    }

    fn load_state(&mut self, buf: &[u8]) -> bool {
        self.byte = buf[0];
        true
    }
}

// Counters are per thread, so tests in this file cannot see each other's allocations.
#[test]
fn test_rings_release_everything() {
    let mut blob = Blob { byte: 0 };
    let baseline = live();

    // Never saved.
    let ring = RewindBuffer::new(RewindConfig::with_slots(8), &blob).unwrap();
    assert_eq!(live() - baseline, 8 * 1024);
    ring.destroy();
    assert_eq!(live(), baseline);

    // One save.
    let mut ring = RewindBuffer::new(RewindConfig::with_slots(8), &blob).unwrap();
    ring.save(&mut blob).unwrap();
    drop(ring);
    assert_eq!(live(), baseline);

    // Wrapped several times, then rewound.
    let mut ring = RewindBuffer::new(RewindConfig::with_slots(8), &blob).unwrap();
    for i in 0..50u8 {
        blob.byte = i;
        ring.save(&mut blob).unwrap();
    }
    ring.restore(&mut blob).unwrap();
    assert_eq!(blob.byte, 49);

    // Reallocation frees the old arena before building the new one.
    let ring = ring.realloc(&blob).unwrap();
    assert_eq!(live() - baseline, 8 * 1024);
    ring.destroy();
    assert_eq!(live(), baseline);

    // Failed construction leaves nothing behind.
    let err = RewindBuffer::new(RewindConfig::with_bytes(1000), &blob).err();
    assert!(matches!(err, Some(RewindError::InsufficientMemory { .. })));
    let err = RewindBuffer::new(RewindConfig::with_slots(usize::MAX / 2048), &blob).err();
    assert!(matches!(err, Some(RewindError::AllocationFailed { .. })));
    assert_eq!(live(), baseline);
}

struct Huge;

impl SaveStateSource for Huge {
    fn state_size(&self) -> usize { 100 * 1024 * 1024 }
    fn save_state(&mut self, _: &mut [u8]) -> bool { true }
    fn load_state(&mut self, _: &[u8]) -> bool { true }
}

#[test]
fn test_failed_probe_budget_measures_once() {
    let config = RewindConfig {
        budget: MemoryBudget::Probe { chunk_size: PROBE_CHUNK, max_chunks: 3 },
        ..RewindConfig::default()
    };
    let before = PROBE_CHUNKS.with(|n| n.get());
    let baseline = live();

    let err = RewindBuffer::new(config, &Huge).err();

    let budget = (3.0 * PROBE_CHUNK as f64 * 0.85) as usize;
    assert_eq!(err, Some(RewindError::InsufficientMemory { budget, slot_size: 100 * 1024 * 1024 }));
    assert_eq!(PROBE_CHUNKS.with(|n| n.get()) - before, 3);
    assert_eq!(live(), baseline);
}
