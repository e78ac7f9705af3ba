//! Boot ROM region
//!
//! The boot image is mapped at 0x0000 and shadows the start of the cartridge
//! while the bus keeps the overlay enabled.

use std::fs;
use std::path::Path;

use crate::error::{EmulatorError, LoadError, Result};

/// Default location of the DMG boot image
pub const DEFAULT_BOOT_PATH: &str = "boot/dmg_boot.bin";

/// Boot ROM image
#[derive(Debug, Clone, Default)]
pub struct BootRom {
    content: Vec<u8>,
}

impl BootRom {
    /// Wrap an in-memory boot image
    pub fn from_bytes(content: Vec<u8>) -> Self {
        Self { content }
    }

    /// Load the boot image from `path`
    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, LoadError> {
        let path = path.as_ref();
        let content = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.is_empty() {
            return Err(LoadError::Empty { path: path.to_path_buf() });
        }
        log::debug!("boot image {} loaded ({} bytes)", path.display(), content.len());
        Ok(Self { content })
    }

    /// Read `size` bytes at `address`, bounded by the loaded image
    pub fn read(&self, address: u16, size: usize) -> Result<&[u8]> {
        let start = address as usize;
        self.content
            .get(start..start.saturating_add(size))
            .ok_or(EmulatorError::Addressing { address })
    }

    /// Image length in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
