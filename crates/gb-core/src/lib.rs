//! GB Core - Pure Rust Game Boy emulator library
//!
//! This crate provides the instruction-execution core of the Game Boy (DMG)
//! CPU together with the memory bus that connects it to the boot ROM,
//! cartridge ROM, video RAM and memory-mapped I/O registers.
//! It contains no windowing or audio-device dependencies; hosts drive it
//! through [`motherboard::Motherboard`].

#![forbid(unsafe_code)]

/// Bit helpers for 8-bit values
pub mod bits;
/// Error types shared by every component
pub mod error;
/// Runtime configuration
pub mod config;
/// CPU module containing registers, instructions and the dispatch engine
pub mod cpu;
/// Memory bus and address routing
pub mod bus;
/// Boot ROM region
pub mod boot;
/// Cartridge ROM region
pub mod cartridge;
/// Video RAM region
pub mod vram;
/// Memory-mapped I/O register block
pub mod io;
/// Audio register decoder
pub mod apu;
/// Integration module wiring CPU, bus and peripherals together
pub mod motherboard;

pub use config::{Config, HalfCarryRule};
pub use error::{EmulatorError, LoadError, Result};
pub use motherboard::Motherboard;
