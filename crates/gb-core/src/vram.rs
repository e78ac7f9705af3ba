//! Video RAM region (8 KiB at 0x8000)

use crate::error::{EmulatorError, Result};

/// First mapped address
pub const VRAM_START: u16 = 0x8000;
/// VRAM size in bytes
pub const VRAM_SIZE: usize = 0x2000;

/// Video RAM store
#[derive(Debug, Clone)]
pub struct Vram {
    memory: [u8; VRAM_SIZE],
}

impl Vram {
    pub fn new() -> Self {
        Self {
            memory: [0; VRAM_SIZE],
        }
    }

    /// Read `size` bytes at region-relative `offset`
    pub fn read(&self, offset: u16, size: usize) -> Result<&[u8]> {
        let start = offset as usize;
        self.memory
            .get(start..start.saturating_add(size))
            .ok_or(EmulatorError::Addressing {
                address: VRAM_START.wrapping_add(offset),
            })
    }

    /// Write `value` starting at region-relative `offset`.
    /// Nothing is stored if the write would run past the end.
    pub fn write(&mut self, offset: u16, value: &[u8]) -> Result<()> {
        let start = offset as usize;
        let slots = self
            .memory
            .get_mut(start..start.saturating_add(value.len()))
            .ok_or(EmulatorError::Addressing {
                address: VRAM_START.wrapping_add(offset),
            })?;
        for (slot, byte) in slots.iter_mut().zip(value) {
            *slot = *byte;
        }
        Ok(())
    }
}

impl Default for Vram {
    fn default() -> Self {
        Self::new()
    }
}
