//! Game Boy system integration
//!
//! Owns the CPU, the bus and the audio decoder installed on the bus, and
//! keeps the running cycle count.

use std::convert::Infallible;

use crate::apu::Apu;
use crate::boot::BootRom;
use crate::bus::Bus;
use crate::cartridge::Cartridge;
use crate::config::Config;
use crate::cpu::Bus as CpuBus;
use crate::cpu::Cpu;
use crate::error::Result;

/// Game Boy system - integrates all components
#[derive(Debug)]
pub struct Motherboard {
    cpu: Cpu,
    bus: Bus<Apu>,
    /// Cycles consumed since construction or the last reset
    cycles: u64,
}

impl Motherboard {
    /// Build the system. The boot overlay is enabled when `boot` is given.
    pub fn new(boot: Option<BootRom>, cartridge: Cartridge, config: &Config) -> Self {
        log::debug!(
            "motherboard: boot image {}, cartridge {} bytes, {:?}",
            boot.as_ref().map_or("absent".to_string(), |b| format!("{} bytes", b.len())),
            cartridge.len(),
            config
        );
        Self {
            cpu: Cpu::new(config),
            bus: Bus::new(boot, cartridge, Apu::new()),
            cycles: 0,
        }
    }

    /// Execute one instruction; returns the cycles it took
    pub fn step(&mut self) -> Result<u32> {
        let cycles = self.cpu.tick(&mut self.bus)?;
        self.cycles += u64::from(cycles);
        Ok(cycles)
    }

    /// Step until the first fatal error, which is returned
    pub fn run(&mut self) -> Result<Infallible> {
        loop {
            self.step()?;
        }
    }

    /// Return to power-on state, keeping the loaded boot and cartridge images
    pub fn reset(&mut self) {
        *self.cpu.registers_mut() = Default::default();
        self.bus.reset(Apu::new());
        self.cycles = 0;
        log::debug!("motherboard reset");
    }

    /// Get CPU reference
    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    /// Get mutable CPU reference
    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus<Apu> {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus<Apu> {
        &mut self.bus
    }

    /// Get APU reference
    pub fn apu(&self) -> &Apu {
        self.bus.io_handler()
    }

    /// Total cycles consumed
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Read a byte from memory via the bus
    pub fn read_memory(&self, address: u16) -> Result<u8> {
        self.bus.read_byte(address)
    }

    /// Write a byte to memory via the bus
    pub fn write_memory(&mut self, address: u16, value: u8) -> Result<()> {
        self.bus.write(address, &[value])
    }
}
