//! Error types
//!
//! Every [`EmulatorError`] is fatal to the run loop: nothing inside the core
//! retries or recovers, the error travels up to the host.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias used throughout the core
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Fatal emulation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EmulatorError {
    /// Unmapped address, or a request running past the end of a region
    #[error("address 0x{address:04X} is not mapped")]
    Addressing { address: u16 },
    /// Write attempted against the boot or cartridge ranges
    #[error("address 0x{address:04X} is write protected")]
    WriteProtected { address: u16 },
    /// Opcode without a registered instruction
    #[error("{}", describe_opcode(.opcode, .prefix))]
    UnknownOpcode { opcode: u8, prefix: Option<u8> },
    /// I/O write to a register the peripheral decoders do not know
    #[error("no decoder for I/O register 0x{address:04X} (value 0x{value:02X})")]
    UnknownRegister { address: u16, value: u8 },
}

fn describe_opcode(opcode: &u8, prefix: &Option<u8>) -> String {
    match prefix {
        Some(prefix) => format!(
            "no instruction with opcode 0x{prefix:02X} 0x{opcode:02X} is registered"
        ),
        None => format!("no instruction with opcode 0x{opcode:02X} is registered"),
    }
}

/// Errors raised while loading boot or cartridge images
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("image {} is empty", .path.display())]
    Empty { path: PathBuf },
}
