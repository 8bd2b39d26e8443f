//! Quick save / quick load of a single machine snapshot.
//!
//! Separate from rewind history: this writes one snapshot to disk for the
//! frontend's save-state slots. The payload is the engine's own opaque
//! state bytes, bincode-wrapped with the frame number and deflate-compressed.
//!
//! ## File format
//!
//! ```text
//! +------------------+
//! | Magic "SMPS"     |  4 bytes
//! +------------------+
//! | Format version   |  u32 little-endian (currently 1)
//! +------------------+
//! | System           |  u8 (0 = Master System, 1 = Game Gear)
//! +------------------+
//! | Compressed data  |  deflate-compressed bincode payload
//! +------------------+
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::StateFileError;
use crate::machine::SystemKind;

/// Magic bytes identifying a quick-save file.
const MAGIC: &[u8; 4] = b"SMPS";
/// Current quick-save format version.
const FORMAT_VERSION: u32 = 1;
const HEADER_LEN: usize = 9;
/// Directory, beside the game file, holding quick-saves.
pub const STATE_DIR: &str = "states";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateFile {
    /// Frame number when the snapshot was taken
    pub frame: u64,
    /// Engine state, exactly `state_size()` bytes
    pub state: Vec<u8>,
}

/// Save state to file with header and deflate compression.
pub fn save_to_file(file: &StateFile, system: SystemKind, path: &Path) -> Result<(), StateFileError> {
    let payload = bincode::serialize(file)?;
    let compressed = miniz_oxide::deflate::compress_to_vec(&payload, 6);

    let mut out = Vec::with_capacity(HEADER_LEN + compressed.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.push(system.to_byte());
    out.extend_from_slice(&compressed);

    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() { std::fs::create_dir_all(dir)?; }
    }
    std::fs::write(path, &out)?;
    log::info!("Saved state to {:?} ({} bytes)", path, out.len());
    Ok(())
}

/// Load state from file, verifying magic, version, and system.
pub fn load_from_file(path: &Path, expected: SystemKind) -> Result<StateFile, StateFileError> {
    let data = std::fs::read(path)?;
    let file = decode(&data, expected)?;
    log::info!("Loaded state from {:?} (frame {})", path, file.frame);
    Ok(file)
}

fn decode(data: &[u8], expected: SystemKind) -> Result<StateFile, StateFileError> {
    if data.len() < HEADER_LEN {
        return Err(StateFileError::TooSmall);
    }
    if &data[0..4] != MAGIC {
        return Err(StateFileError::BadMagic);
    }
    let version = u32::from_le_bytes([data[4], data[5], data[6], data[7]]);
    if version != FORMAT_VERSION {
        return Err(StateFileError::UnsupportedVersion { found: version, expected: FORMAT_VERSION });
    }
    let saved = SystemKind::from_byte(data[8]).ok_or(StateFileError::UnknownSystem(data[8]))?;
    if saved != expected {
        return Err(StateFileError::SystemMismatch { saved: saved.name(), current: expected.name() });
    }

    let decompressed = miniz_oxide::inflate::decompress_to_vec(&data[HEADER_LEN..])
        .map_err(|e| StateFileError::Decompress(format!("{:?}", e)))?;
    Ok(bincode::deserialize(&decompressed)?)
}

/// Derive the quick-save path for a slot from the game file path.
/// `roms/sonic.sms`, slot 0 → `roms/states/sonic.s0`
pub fn state_path(game_path: &Path, slot: u8) -> PathBuf {
    let stem = game_path.file_stem().and_then(|s| s.to_str()).unwrap_or("game");
    let dir = game_path.parent().unwrap_or(Path::new("."));
    dir.join(STATE_DIR).join(format!("{}.s{}", stem, slot))
}
