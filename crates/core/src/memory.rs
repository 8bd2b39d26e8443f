//! Memory budgeting for the rewind ring.

use serde::{Deserialize, Serialize};

/// Default probe chunk: 64 KB.
pub const PROBE_CHUNK_SIZE: usize = 64 * 1024;
/// Default probe chunk count (64 KB * 1024 = 64 MB cap).
pub const PROBE_MAX_CHUNKS: usize = 1024;
/// Share of the measured budget handed to rewind history.
pub const DEFAULT_HEADROOM: f64 = 0.85;

/// How much memory the rewind ring may use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MemoryBudget {
    /// Exactly this many slots.
    Slots(usize),
    /// A byte budget, scaled by the configured headroom.
    Bytes(usize),
    /// Measure free heap by reserving chunks until the allocator refuses,
    /// then scale by the configured headroom.
    Probe { chunk_size: usize, max_chunks: usize },
}

impl Default for MemoryBudget {
    fn default() -> Self {
        MemoryBudget::Probe { chunk_size: PROBE_CHUNK_SIZE, max_chunks: PROBE_MAX_CHUNKS }
    }
}

impl MemoryBudget {
    /// Usable bytes for history, or `None` when the budget is a slot count.
    pub fn bytes(&self, headroom: f64) -> Option<usize> {
        let raw = match *self {
            MemoryBudget::Slots(_) => return None,
            MemoryBudget::Bytes(b) => b,
            MemoryBudget::Probe { chunk_size, max_chunks } => probe_free_memory(chunk_size, max_chunks),
        };
        Some((raw as f64 * headroom) as usize)
    }

    /// Measure the budget once and size slots of `slot_size` bytes from it.
    ///
    /// Returns the usable byte budget (as [`bytes`](Self::bytes)) and the
    /// slot count derived from that same measurement.
    pub fn plan(&self, slot_size: usize, headroom: f64) -> (Option<usize>, usize) {
        if let MemoryBudget::Slots(n) = *self {
            return (None, if slot_size == 0 { 0 } else { n });
        }
        let bytes = self.bytes(headroom);
        let count = match bytes {
            Some(b) if slot_size > 0 => b / slot_size,
            _ => 0,
        };
        (bytes, count)
    }

    /// Number of slots of `slot_size` bytes this budget affords.
    pub fn slot_count(&self, slot_size: usize, headroom: f64) -> usize {
        self.plan(slot_size, headroom).1
    }
}

/// Estimate free heap: reserve up to `max_chunks` chunks of `chunk_size`
/// bytes, stop at the first refusal, release everything, and report the total.
pub fn probe_free_memory(chunk_size: usize, max_chunks: usize) -> usize {
    if chunk_size == 0 { return 0; }
    let mut reserved: Vec<Vec<u8>> = Vec::new();
    for _ in 0..max_chunks {
        let mut chunk = Vec::new();
        if chunk.try_reserve_exact(chunk_size).is_err() { break; }
        if reserved.try_reserve(1).is_err() { break; }
        reserved.push(chunk);
    }
    let total = reserved.len() * chunk_size;
    log::debug!("memory probe: {} of {} chunks ({} bytes)", reserved.len(), max_chunks, total);
    total
}
