//! Error types for rewind history and quick-save files.

use thiserror::Error;

/// Failures reported by [`crate::rewind::RewindBuffer`].
///
/// `NoHistory` is an expected condition ("nothing to rewind to") and is kept
/// apart from `LoadFailed` ("the machine rejected the snapshot").
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewindError {
    #[error("machine reported a zero-byte save state")]
    ZeroStateSize,
    #[error("rewind budget of {budget} bytes cannot hold a single {slot_size}-byte state")]
    InsufficientMemory { budget: usize, slot_size: usize },
    #[error("failed to allocate {slots} rewind slots of {slot_size} bytes")]
    AllocationFailed { slots: usize, slot_size: usize },
    #[error("machine failed to serialize its state")]
    SaveFailed,
    #[error("no earlier state to rewind to")]
    NoHistory,
    #[error("machine failed to load a rewind state")]
    LoadFailed,
}

/// Failures reading or writing a quick-save file.
#[derive(Debug, Error)]
pub enum StateFileError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialize error: {0}")]
    Encode(#[from] bincode::Error),
    #[error("decompress error: {0}")]
    Decompress(String),
    #[error("file too small")]
    TooSmall,
    #[error("invalid save state file (bad magic)")]
    BadMagic,
    #[error("unsupported save state version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
    #[error("unknown system byte {0:#04x}")]
    UnknownSystem(u8),
    #[error("system mismatch: save={saved} current={current}")]
    SystemMismatch { saved: &'static str, current: &'static str },
    #[error("state is {found} bytes, machine expects {expected}")]
    SizeMismatch { found: usize, expected: usize },
    #[error("machine failed to serialize its state")]
    SaveFailed,
    #[error("machine rejected the saved state")]
    LoadFailed,
}
