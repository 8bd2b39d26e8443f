//! Rewind and emulator options.
//!
//! Plain serde structs; persisting them is up to the embedding frontend.

use serde::{Deserialize, Serialize};

use crate::memory::{MemoryBudget, DEFAULT_HEADROOM};

/// What `restore` does with its cursor when the machine rejects a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LoadFailurePolicy {
    /// Move the cursor back to where it was, leaving history untouched.
    #[default]
    Rollback,
    /// Keep the cursor one step back; the rejected snapshot is skipped.
    Consume,
}

/// How the rewind ring is sized and how it reacts to rejected snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RewindConfig {
    /// Memory available to history.
    pub budget: MemoryBudget,
    /// Fraction of a byte budget given to history (ignored for `Slots`).
    pub headroom: f64,
    /// Cursor handling when the machine rejects a snapshot.
    pub on_load_failure: LoadFailurePolicy,
}

impl Default for RewindConfig {
    fn default() -> Self {
        RewindConfig {
            budget: MemoryBudget::default(),
            headroom: DEFAULT_HEADROOM,
            on_load_failure: LoadFailurePolicy::default(),
        }
    }
}

impl RewindConfig {
    /// Fixed slot count, default policy.
    pub fn with_slots(slots: usize) -> Self {
        RewindConfig { budget: MemoryBudget::Slots(slots), ..Self::default() }
    }

    /// Byte budget scaled by the default headroom, default policy.
    pub fn with_bytes(bytes: usize) -> Self {
        RewindConfig { budget: MemoryBudget::Bytes(bytes), ..Self::default() }
    }
}

/// Largest frameskip offered by the options menu.
pub const MAX_FRAMESKIP: u32 = 5;

/// Per-frame driver options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmulatorOptions {
    /// Frames skipped between rendered frames (0 = render every frame).
    pub frameskip: u32,
    /// Keep a rewind history.
    pub rewind: bool,
    /// Rendered frames between rewind saves.
    pub rewind_interval: u32,
}

impl Default for EmulatorOptions {
    fn default() -> Self {
        EmulatorOptions { frameskip: 1, rewind: true, rewind_interval: 1 }
    }
}

impl EmulatorOptions {
    /// Clamp out-of-range values coming from a stored config.
    pub fn sanitized(self) -> Self {
        EmulatorOptions {
            frameskip: self.frameskip.min(MAX_FRAMESKIP),
            rewind: self.rewind,
            rewind_interval: self.rewind_interval.max(1),
        }
    }
}
