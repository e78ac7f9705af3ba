//! Memory-mapped I/O register block (0xFF00-0xFF7F)
//!
//! A flat byte store plus a per-byte hook. Every byte written is stored and
//! then handed to the [`IoHandler`] with its absolute address, in ascending
//! address order.

use crate::error::{EmulatorError, Result};

/// First mapped address
pub const IO_START: u16 = 0xFF00;
/// Block size in bytes
pub const IO_SIZE: usize = 0x80;

/// Receives every byte written to the I/O block
pub trait IoHandler {
    /// Decode a write of `value` to the register at absolute `address`
    fn write_register(&mut self, address: u16, value: u8) -> Result<()>;
}

/// I/O register store
#[derive(Debug, Clone)]
pub struct IoRegisters<H> {
    memory: [u8; IO_SIZE],
    handler: H,
}

impl<H: IoHandler> IoRegisters<H> {
    pub fn new(handler: H) -> Self {
        Self {
            memory: [0; IO_SIZE],
            handler,
        }
    }

    /// Read `size` bytes at region-relative `offset`
    pub fn read(&self, offset: u16, size: usize) -> Result<&[u8]> {
        let start = offset as usize;
        self.memory
            .get(start..start.saturating_add(size))
            .ok_or(EmulatorError::Addressing {
                address: IO_START.wrapping_add(offset),
            })
    }

    /// Store `value` at region-relative `offset`, invoking the handler once per byte
    pub fn write(&mut self, offset: u16, value: &[u8]) -> Result<()> {
        let start = offset as usize;
        if start.saturating_add(value.len()) > IO_SIZE {
            return Err(EmulatorError::Addressing {
                address: IO_START.wrapping_add(offset),
            });
        }
        for (index, &byte) in value.iter().enumerate() {
            self.memory[start + index] = byte;
            let address = IO_START + (start + index) as u16;
            self.handler.write_register(address, byte)?;
        }
        Ok(())
    }

    /// The register decoder
    pub fn handler(&self) -> &H {
        &self.handler
    }

    pub fn handler_mut(&mut self) -> &mut H {
        &mut self.handler
    }
}
