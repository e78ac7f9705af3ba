//! Cartridge ROM region
//!
//! Only the fixed first bank is mapped; there is no memory bank controller
//! and the ROM is never written.

use std::fs;
use std::path::Path;

use crate::error::{EmulatorError, LoadError, Result};

/// Cartridge header offsets
pub const ENTRY_POINT: u16 = 0x0100;
pub const TITLE_START: usize = 0x0134;
pub const TITLE_END: usize = 0x0144;

/// Cartridge ROM image
#[derive(Debug, Clone, Default)]
pub struct Cartridge {
    content: Vec<u8>,
}

impl Cartridge {
    /// A cartridge slot with nothing inserted; every read fails
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap an in-memory ROM image
    pub fn from_bytes(content: Vec<u8>) -> Self {
        Self { content }
    }

    /// Load a ROM image from `path`
    pub fn load(path: impl AsRef<Path>) -> std::result::Result<Self, LoadError> {
        let path = path.as_ref();
        let content = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if content.is_empty() {
            return Err(LoadError::Empty { path: path.to_path_buf() });
        }
        let cartridge = Self { content };
        log::debug!(
            "cartridge {} loaded ({} bytes, title {:?})",
            path.display(),
            cartridge.len(),
            cartridge.title()
        );
        Ok(cartridge)
    }

    /// Read `size` bytes at `address`, bounded by the loaded image
    pub fn read(&self, address: u16, size: usize) -> Result<&[u8]> {
        let start = address as usize;
        self.content
            .get(start..start.saturating_add(size))
            .ok_or(EmulatorError::Addressing { address })
    }

    /// Game title from the header, if the image is long enough to have one
    pub fn title(&self) -> Option<String> {
        let raw = self.content.get(TITLE_START..TITLE_END)?;
        let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
        Some(String::from_utf8_lossy(&raw[..end]).trim().to_string())
    }

    /// Image length in bytes
    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
