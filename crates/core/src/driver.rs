//! Per-frame emulation driver.
//!
//! Runs the machine one frame at a time, applies frameskip, feeds the rewind
//! ring on rendered frames, and steps backward while the rewind button is held.

use std::path::Path;

use crate::config::{EmulatorOptions, RewindConfig};
use crate::error::{RewindError, StateFileError};
use crate::machine::Machine;
use crate::rewind::RewindBuffer;
use crate::savestate::{self, StateFile};

/// What a call to [`FrameDriver::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Emulated one frame forward.
    Ran { rendered: bool },
    /// Loaded an earlier snapshot and ran one rendered frame from it.
    ///
    /// The first step of a press skips the newest snapshot when it holds the
    /// live state, so the machine never lands ahead of the frame on screen
    /// when the press began. Each later step lands one history point further back.
    Rewound,
    /// Rewind requested but no history is left; the machine was not run.
    RewindExhausted,
    /// The machine rejected a rewind snapshot; the frame ran from the current state.
    RewindFailed,
}

pub struct FrameDriver<M: Machine> {
    machine: M,
    rewind: Option<RewindBuffer>,
    rewind_config: RewindConfig,
    options: EmulatorOptions,
    /// Frames emulated forward (skipped or not)
    frame_count: u64,
    /// Counts frames since the last rendered one
    skip_counter: u32,
    /// Counts rendered frames since the last rewind save
    interval_counter: u32,
    /// The newest snapshot was taken on the last frame run
    newest_is_live: bool,
}

impl<M: Machine> FrameDriver<M> {
    /// Build a driver. A rewind ring that cannot be allocated is not fatal:
    /// the driver runs without rewind.
    pub fn new(machine: M, options: EmulatorOptions, rewind_config: RewindConfig) -> Self {
        let options = options.sanitized();
        let rewind = if options.rewind { build_rewind(rewind_config, &machine) } else { None };
        FrameDriver {
            machine,
            rewind,
            rewind_config,
            options,
            frame_count: 0,
            skip_counter: 0,
            interval_counter: 0,
            newest_is_live: false,
        }
    }

    /// Advance one frame, or rewind one snapshot if `rewind_held`.
    pub fn step(&mut self, rewind_held: bool) -> FrameOutcome {
        if rewind_held {
            if let Some(ring) = self.rewind.as_mut() {
                // Reloading the live state would only replay the frame on screen.
                let skipped = if std::mem::take(&mut self.newest_is_live) {
                    ring.restore(&mut self.machine)
                } else {
                    Ok(())
                };
                let outcome = match skipped.and_then(|()| ring.restore(&mut self.machine)) {
                    Ok(()) => FrameOutcome::Rewound,
                    Err(RewindError::NoHistory) => return FrameOutcome::RewindExhausted,
                    Err(_) => FrameOutcome::RewindFailed,
                };
                // Render the restored point without recording it again.
                self.machine.run_frame(true);
                self.interval_counter = 0;
                return outcome;
            }
        }

        let render = self.skip_counter == 0;
        self.skip_counter = (self.skip_counter + 1) % (self.options.frameskip + 1);

        self.machine.run_frame(render);
        self.frame_count += 1;
        self.newest_is_live = false;

        if render {
            self.record_rewind();
        }
        FrameOutcome::Ran { rendered: render }
    }

    fn record_rewind(&mut self) {
        let Some(ring) = self.rewind.as_mut() else { return };
        self.interval_counter += 1;
        if self.interval_counter < self.options.rewind_interval { return; }
        self.interval_counter = 0;
        // A failed save only costs one history point; the ring is unchanged.
        if let Err(e) = ring.save(&mut self.machine) {
            log::trace!("rewind: no history point for frame {}: {}", self.frame_count, e);
            return;
        }
        self.newest_is_live = true;
    }

    /// Start a fresh session: history from before now cannot be rewound into.
    pub fn reset_history(&mut self) {
        if let Some(ring) = self.rewind.as_mut() { ring.reset(); }
        self.interval_counter = 0;
        self.newest_is_live = false;
    }

    /// Rebuild the rewind ring for the machine's current state size.
    pub fn reallocate_rewind(&mut self) {
        if let Some(ring) = self.rewind.take() {
            match ring.realloc(&self.machine) {
                Ok(ring) => self.rewind = Some(ring),
                Err(e) => log::warn!("Rewind disabled: {}", e),
            }
        } else if self.options.rewind {
            self.rewind = build_rewind(self.rewind_config, &self.machine);
        }
        self.interval_counter = 0;
        self.newest_is_live = false;
    }

    /// Replace the rewind budget or policy and rebuild the ring.
    pub fn reconfigure_rewind(&mut self, config: RewindConfig) {
        self.rewind_config = config;
        if let Some(ring) = self.rewind.take() { ring.destroy(); }
        if self.options.rewind {
            self.rewind = build_rewind(config, &self.machine);
        }
        self.interval_counter = 0;
        self.newest_is_live = false;
    }

    /// Apply new options, creating or dropping the rewind ring as needed.
    pub fn set_options(&mut self, options: EmulatorOptions) {
        let options = options.sanitized();
        match (options.rewind, self.rewind.is_some()) {
            (true, false) => self.rewind = build_rewind(self.rewind_config, &self.machine),
            (false, true) => {
                if let Some(ring) = self.rewind.take() { ring.destroy(); }
            }
            _ => {}
        }
        self.options = options;
        self.skip_counter = 0;
        self.interval_counter = 0;
        self.newest_is_live = false;
    }

    /// Write the current machine state to a quick-save file.
    pub fn quick_save(&mut self, path: &Path) -> Result<(), StateFileError> {
        let mut state = vec![0u8; self.machine.state_size()];
        if !self.machine.save_state(&mut state) {
            return Err(StateFileError::SaveFailed);
        }
        let file = StateFile { frame: self.frame_count, state };
        savestate::save_to_file(&file, self.machine.system(), path)
    }

    /// Load a quick-save file. Rewind history is reset on success.
    pub fn quick_load(&mut self, path: &Path) -> Result<(), StateFileError> {
        let file = savestate::load_from_file(path, self.machine.system())?;
        let expected = self.machine.state_size();
        if file.state.len() != expected {
            return Err(StateFileError::SizeMismatch { found: file.state.len(), expected });
        }
        if !self.machine.load_state(&file.state) {
            return Err(StateFileError::LoadFailed);
        }
        self.frame_count = file.frame;
        self.reset_history();
        Ok(())
    }

    pub fn frame_count(&self) -> u64 { self.frame_count }

    pub fn options(&self) -> &EmulatorOptions { &self.options }

    pub fn machine(&self) -> &M { &self.machine }

    pub fn machine_mut(&mut self) -> &mut M { &mut self.machine }

    pub fn rewind(&self) -> Option<&RewindBuffer> { self.rewind.as_ref() }

    pub fn into_machine(self) -> M {
        if let Some(ring) = self.rewind { ring.destroy(); }
        self.machine
    }
}

fn build_rewind<M: Machine>(config: RewindConfig, machine: &M) -> Option<RewindBuffer> {
    match RewindBuffer::new(config, machine) {
        Ok(ring) => Some(ring),
        Err(e) => {
            log::warn!("Rewind disabled: {}", e);
            None
        }
    }
}
