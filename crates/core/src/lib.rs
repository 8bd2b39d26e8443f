//! # smsplus-core
//!
//! Emulation-side support for the SMS Plus handheld port (Sega Master System /
//! Game Gear): save-state rewind, the per-frame driver, and quick-save files.
//!
//! The Z80/VDP/PSG machine itself is not part of this crate. It plugs in through
//! [`SaveStateSource`] (serialize / deserialize / size query) and [`Machine`]
//! (run one frame). Display, audio, input and menus belong to the frontend.
//!
//! ## Architecture
//!
//! - [`RewindBuffer`] — Fixed-capacity ring of save states with O(1) save / restore / reset
//! - [`memory`] — Rewind memory budgets, including the free-heap probe
//! - [`config`] — Rewind settings and per-frame driver options
//! - [`FrameDriver`] — Runs frames with frameskip, records rewind history, steps back on request
//! - [`savestate`] — Compressed single-snapshot quick-save files
//! - [`error`] — [`RewindError`] and [`StateFileError`]
//!
//! ## Rewind
//!
//! ```text
//! let mut ring = RewindBuffer::new(RewindConfig::with_slots(600), &machine)?;
//! ring.save(&mut machine)?;      // once per rendered frame
//! ring.restore(&mut machine)?;   // while the rewind button is held
//! ```
//!
//! A ring of `n` slots can be rewound at most `n - 1` steps; older snapshots
//! are evicted one at a time as new ones are saved.

pub mod config;
pub mod driver;
pub mod error;
pub mod machine;
pub mod memory;
pub mod rewind;
pub mod savestate;

pub use config::{EmulatorOptions, LoadFailurePolicy, RewindConfig};
pub use driver::{FrameDriver, FrameOutcome};
pub use error::{RewindError, StateFileError};
pub use machine::{Machine, SaveStateSource, SystemKind};
pub use memory::MemoryBudget;
pub use rewind::RewindBuffer;
