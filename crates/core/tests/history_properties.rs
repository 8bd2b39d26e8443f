//! Property tests for rewind history: capacity sizing, save/restore
//! sequencing, eviction, and reset.

use proptest::prelude::*;
use smsplus_core::{RewindBuffer, RewindConfig, RewindError, SaveStateSource};

/// Machine holding a `u64` counter, serialized into `size` bytes.
struct Tape {
    value: u64,
    size: usize,
}

impl Tape {
    fn new(size: usize) -> Self {
        Tape { value: 0, size }
    }
}

impl SaveStateSource for Tape {
    fn state_size(&self) -> usize { self.size }

    fn save_state(&mut self, buf: &mut [u8]) -> bool {
        buf.fill(0xAA);
        buf[..8].copy_from_slice(&self.value.to_le_bytes());
        true
    }

    fn load_state(&mut self, buf: &[u8]) -> bool {
        let mut raw = [0u8; 8];
        raw.copy_from_slice(&buf[..8]);
        self.value = u64::from_le_bytes(raw);
        true
    }
}

proptest! {
    #[test]
    fn capacity_follows_byte_budget(slot_size in 8usize..4096, memory in 0usize..1 << 20) {
        let tape = Tape::new(slot_size);
        let expected = ((memory as f64 * 0.85) as usize) / slot_size;
        match RewindBuffer::new(RewindConfig::with_bytes(memory), &tape) {
            Ok(ring) => {
                prop_assert!(expected > 0);
                prop_assert_eq!(ring.capacity(), expected);
                prop_assert_eq!(ring.memory_usage(), expected * slot_size);
            }
            Err(e) => {
                prop_assert_eq!(expected, 0);
                let is_insufficient = matches!(e, RewindError::InsufficientMemory { .. });
                prop_assert!(is_insufficient);
            }
        }
    }

    #[test]
    fn restores_walk_back_to_baseline(capacity in 2usize..32, saves in 0usize..32) {
        let saves = saves % capacity;
        let mut tape = Tape::new(16);
        let mut ring = RewindBuffer::new(RewindConfig::with_slots(capacity), &tape).unwrap();

        for i in 1..=saves as u64 {
            tape.value = i;
            ring.save(&mut tape).unwrap();
        }
        tape.value = u64::MAX;

        for i in (1..=saves as u64).rev() {
            ring.restore(&mut tape).unwrap();
            prop_assert_eq!(tape.value, i);
        }
        prop_assert_eq!(ring.restore(&mut tape), Err(RewindError::NoHistory));
    }

    #[test]
    fn eviction_keeps_capacity_minus_one(capacity in 1usize..16, extra in 1usize..40) {
        let mut tape = Tape::new(8);
        let mut ring = RewindBuffer::new(RewindConfig::with_slots(capacity), &tape).unwrap();
        let total = (capacity + extra) as u64;

        for i in 1..=total {
            tape.value = i;
            ring.save(&mut tape).unwrap();
        }
        prop_assert_eq!(ring.history_len(), capacity - 1);

        for back in 0..(capacity - 1) as u64 {
            ring.restore(&mut tape).unwrap();
            prop_assert_eq!(tape.value, total - back);
        }
        prop_assert_eq!(ring.restore(&mut tape), Err(RewindError::NoHistory));
    }

    #[test]
    fn reset_leaves_nothing_to_restore(capacity in 1usize..16, saves in 0usize..40, restores in 0usize..8) {
        let mut tape = Tape::new(8);
        let mut ring = RewindBuffer::new(RewindConfig::with_slots(capacity), &tape).unwrap();
        for i in 0..saves as u64 {
            tape.value = i;
            ring.save(&mut tape).unwrap();
        }
        for _ in 0..restores {
            let _ = ring.restore(&mut tape);
        }
        ring.reset();
        prop_assert!(!ring.can_restore());
        prop_assert_eq!(ring.restore(&mut tape), Err(RewindError::NoHistory));
    }
}
