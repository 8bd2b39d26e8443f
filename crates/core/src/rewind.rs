//! Rewind history: a fixed-capacity ring of serialized machine states.
//!
//! All slots live in one contiguous arena and the cursors are slot indices,
//! so tearing the ring down is a single deallocation.
//!
//! ```text
//!   start                current
//!     v                     v
//!   [ s0 | s1 | s2 | s3 | (next write) | ... ]   (wraps around)
//! ```
//!
//! `save` writes at `current` and advances it. When `current` catches up
//! with `start`, `start` moves forward too and the oldest snapshot is lost.
//! `restore` steps `current` back and loads that slot, but never past `start`.

use crate::config::{LoadFailurePolicy, RewindConfig};
use crate::error::RewindError;
use crate::machine::SaveStateSource;

/// Ring of fixed-size save-state slots.
///
/// Built once per session with [`RewindBuffer::new`]; holds at most
/// `capacity() - 1` restorable snapshots.
pub struct RewindBuffer {
    slots: Vec<u8>,
    slot_size: usize,
    count: usize,
    /// Oldest slot still valid for restoration.
    start: usize,
    /// Next slot to write; the slot before it is the newest snapshot.
    current: usize,
    config: RewindConfig,
}

impl RewindBuffer {
    /// Size the ring from `source.state_size()` and the configured budget.
    pub fn new<S: SaveStateSource + ?Sized>(config: RewindConfig, source: &S) -> Result<Self, RewindError> {
        let slot_size = source.state_size();
        if slot_size == 0 {
            return Err(RewindError::ZeroStateSize);
        }

        let (budget, count) = config.budget.plan(slot_size, config.headroom);
        if count == 0 {
            return Err(RewindError::InsufficientMemory { budget: budget.unwrap_or(0), slot_size });
        }

        let alloc_err = || RewindError::AllocationFailed { slots: count, slot_size };
        let bytes = count.checked_mul(slot_size).ok_or_else(alloc_err)?;
        let mut slots = Vec::new();
        slots.try_reserve_exact(bytes).map_err(|_| alloc_err())?;
        slots.resize(bytes, 0);

        log::debug!("rewind: {} slots of {} bytes ({} bytes total)", count, slot_size, bytes);

        Ok(RewindBuffer { slots, slot_size, count, start: 0, current: 0, config })
    }

    /// Tear the ring down and build a fresh one for the same machine,
    /// e.g. after its state size changed. Existing history is discarded.
    pub fn realloc<S: SaveStateSource + ?Sized>(self, source: &S) -> Result<Self, RewindError> {
        let config = self.config;
        self.destroy();
        let ring = Self::new(config, source)?;
        log::debug!("rewind: reallocated to {} slots", ring.count);
        Ok(ring)
    }

    /// Release every slot.
    pub fn destroy(self) {
        log::debug!("rewind: releasing {} slots", self.count);
    }

    /// Serialize the machine into the next slot.
    ///
    /// On failure neither cursor moves.
    pub fn save<S: SaveStateSource + ?Sized>(&mut self, source: &mut S) -> Result<(), RewindError> {
        let range = self.slot_range(self.current);
        if !source.save_state(&mut self.slots[range]) {
            log::warn!("rewind: machine failed to save slot {}", self.current);
            return Err(RewindError::SaveFailed);
        }

        self.current = self.next(self.current);
        if self.current == self.start {
            self.start = self.next(self.start);
            log::trace!("rewind: evicted slot {}", self.current);
        }
        Ok(())
    }

    /// Step one snapshot back and load it into the machine.
    pub fn restore<S: SaveStateSource + ?Sized>(&mut self, source: &mut S) -> Result<(), RewindError> {
        if self.current == self.start {
            return Err(RewindError::NoHistory);
        }

        let previous = self.current;
        self.current = self.prev(self.current);
        let range = self.slot_range(self.current);
        if !source.load_state(&self.slots[range]) {
            log::warn!("rewind: machine failed to load slot {}", self.current);
            if self.config.on_load_failure == LoadFailurePolicy::Rollback {
                self.current = previous;
            }
            return Err(RewindError::LoadFailed);
        }
        Ok(())
    }

    /// Forget all history older than now. Slots are kept allocated.
    pub fn reset(&mut self) {
        self.start = self.current;
    }

    /// Number of slots (`state_count`).
    pub fn capacity(&self) -> usize { self.count }

    /// Bytes per slot (`state_data_size`).
    pub fn slot_size(&self) -> usize { self.slot_size }

    /// How many `restore` calls would currently succeed.
    pub fn history_len(&self) -> usize {
        (self.current + self.count - self.start) % self.count
    }

    /// Whether a `restore` call would find a snapshot.
    pub fn can_restore(&self) -> bool { self.current != self.start }

    /// Bytes held by the slot arena.
    pub fn memory_usage(&self) -> usize { self.slots.len() }

    /// Configuration the ring was built with (reused by `realloc`).
    pub fn config(&self) -> &RewindConfig { &self.config }

    fn next(&self, idx: usize) -> usize {
        (idx + 1) % self.count
    }

    fn prev(&self, idx: usize) -> usize {
        (idx + self.count - 1) % self.count
    }

    fn slot_range(&self, idx: usize) -> std::ops::Range<usize> {
        let base = idx * self.slot_size;
        base..base + self.slot_size
    }
}
