//! Memory bus and address routing
//!
//! The DMG memory map as far as this core models it:
//! $0000-$00FF - Boot ROM overlay (while enabled)
//! $0000-$3FFF - Cartridge ROM bank 0
//! $8000-$9FFF - Video RAM
//! $FF00-$FF7F - I/O registers
//!
//! Anything else is unmapped. Ranges are tested in the order above and the
//! first match wins, so the boot overlay shadows the cartridge header.

use std::ops::Range;

use crate::boot::BootRom;
use crate::cartridge::Cartridge;
use crate::cpu::Bus as CpuBus;
use crate::error::{EmulatorError, Result};
use crate::io::{IoHandler, IoRegisters, IO_SIZE, IO_START};
use crate::vram::{Vram, VRAM_SIZE, VRAM_START};

/// Boot overlay window
pub const BOOT_RANGE: Range<u16> = 0x0000..0x0100;
/// Cartridge window
pub const CARTRIDGE_RANGE: Range<u16> = 0x0000..0x4000;
/// Video RAM window
pub const VRAM_RANGE: Range<u16> = VRAM_START..VRAM_START + VRAM_SIZE as u16;
/// I/O register window
pub const IO_RANGE: Range<u16> = IO_START..IO_START + IO_SIZE as u16;

/// Region an address resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Boot,
    Cartridge,
    Vram,
    Io,
}

/// Memory bus structure
#[derive(Debug)]
pub struct Bus<H> {
    boot: Option<BootRom>,
    boot_enabled: bool,
    cartridge: Cartridge,
    vram: Vram,
    io: IoRegisters<H>,
}

impl<H: IoHandler> Bus<H> {
    /// Create a bus; the boot overlay is enabled exactly when `boot` is present
    pub fn new(boot: Option<BootRom>, cartridge: Cartridge, io_handler: H) -> Self {
        Self {
            boot_enabled: boot.is_some(),
            boot,
            cartridge,
            vram: Vram::new(),
            io: IoRegisters::new(io_handler),
        }
    }

    /// Resolve `address` to a region using the fixed priority order
    pub fn region(&self, address: u16) -> Option<Region> {
        if self.boot_enabled && BOOT_RANGE.contains(&address) {
            Some(Region::Boot)
        } else if CARTRIDGE_RANGE.contains(&address) {
            Some(Region::Cartridge)
        } else if VRAM_RANGE.contains(&address) {
            Some(Region::Vram)
        } else if IO_RANGE.contains(&address) {
            Some(Region::Io)
        } else {
            None
        }
    }

    /// Return to power-on state: VRAM and the I/O store are cleared, the
    /// I/O hook is replaced by `io_handler` and the boot overlay is enabled
    /// again when a boot image is present. The ROM images are kept.
    pub fn reset(&mut self, io_handler: H) {
        self.vram = Vram::new();
        self.io = IoRegisters::new(io_handler);
        self.set_boot_enabled(true);
    }

    /// Whether the boot ROM currently shadows the cartridge
    pub fn boot_enabled(&self) -> bool {
        self.boot_enabled
    }

    /// Toggle the boot overlay. It stays off when no boot image was supplied.
    pub fn set_boot_enabled(&mut self, enabled: bool) {
        let enabled = enabled && self.boot.is_some();
        if enabled != self.boot_enabled {
            log::debug!("boot overlay {}", if enabled { "enabled" } else { "disabled" });
        }
        self.boot_enabled = enabled;
    }

    pub fn cartridge(&self) -> &Cartridge {
        &self.cartridge
    }

    pub fn vram(&self) -> &Vram {
        &self.vram
    }

    pub fn vram_mut(&mut self) -> &mut Vram {
        &mut self.vram
    }

    pub fn io(&self) -> &IoRegisters<H> {
        &self.io
    }

    /// The I/O write hook
    pub fn io_handler(&self) -> &H {
        self.io.handler()
    }

    pub fn io_handler_mut(&mut self) -> &mut H {
        self.io.handler_mut()
    }
}

impl<H: IoHandler> CpuBus for Bus<H> {
    fn read(&self, address: u16, size: usize) -> Result<&[u8]> {
        match self.region(address) {
            Some(Region::Boot) => match &self.boot {
                Some(boot) => boot.read(address - BOOT_RANGE.start, size),
                None => Err(EmulatorError::Addressing { address }),
            },
            Some(Region::Cartridge) => self.cartridge.read(address - CARTRIDGE_RANGE.start, size),
            Some(Region::Vram) => self.vram.read(address - VRAM_RANGE.start, size),
            Some(Region::Io) => self.io.read(address - IO_RANGE.start, size),
            None => Err(EmulatorError::Addressing { address }),
        }
    }

    fn write(&mut self, address: u16, value: &[u8]) -> Result<()> {
        match self.region(address) {
            Some(Region::Boot | Region::Cartridge) => {
                Err(EmulatorError::WriteProtected { address })
            }
            Some(Region::Vram) => self.vram.write(address - VRAM_RANGE.start, value),
            Some(Region::Io) => self.io.write(address - IO_RANGE.start, value),
            None => Err(EmulatorError::Addressing { address }),
        }
    }
}
