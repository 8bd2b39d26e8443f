//! Interface to the emulation engine.
//!
//! The Z80/VDP/PSG core lives outside this crate. It is reached only through
//! these traits, which also lets tests substitute small fakes.

use serde::{Deserialize, Serialize};

/// Target system. Save-state footprints differ between the two, which is
/// why a system switch reallocates the rewind ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SystemKind {
    MasterSystem,
    GameGear,
}

impl SystemKind {
    /// Byte stored in quick-save headers.
    pub fn to_byte(self) -> u8 {
        match self {
            SystemKind::MasterSystem => 0,
            SystemKind::GameGear => 1,
        }
    }

    pub fn from_byte(b: u8) -> Option<Self> {
        match b {
            0 => Some(SystemKind::MasterSystem),
            1 => Some(SystemKind::GameGear),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SystemKind::MasterSystem => "Master System",
            SystemKind::GameGear => "Game Gear",
        }
    }
}

/// Serialize / deserialize / size-query hooks of the emulation engine.
///
/// Buffers passed in are exactly `state_size()` bytes long and must not be
/// retained past the call.
pub trait SaveStateSource {
    /// Bytes one serialized snapshot occupies. Stable for the lifetime of a ring.
    fn state_size(&self) -> usize;
    /// Write the full machine state into `buf`. Returns false on failure.
    fn save_state(&mut self, buf: &mut [u8]) -> bool;
    /// Replace the live machine state with a snapshot written by `save_state`.
    fn load_state(&mut self, buf: &[u8]) -> bool;
}

/// A machine the frame driver can run.
pub trait Machine: SaveStateSource {
    fn system(&self) -> SystemKind;
    /// Emulate one video frame. `render` is false for skipped frames.
    fn run_frame(&mut self, render: bool);
}
