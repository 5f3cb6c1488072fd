//! Boot catalog entry types
//!
//! Initial/Default and Section entries share one 32-byte layout:
//!
//! ```text
//! 0x00  1   Boot indicator (0x88 bootable, 0x00 not bootable)
//! 0x01  1   Boot media type (low nibble)
//! 0x02  2   Load segment (0 = default 0x7C0)
//! 0x04  1   System type
//! 0x06  2   Sector count (512-byte virtual sectors)
//! 0x08  4   Load RBA (ISO sector)
//! ```

use crate::error::{Iso9660Error, Result};
use crate::types::{BootImage, BootMediaType, BootPlatform};
use crate::utils::{le_u16, le_u32};

/// Bootable indicator
pub const BOOTABLE: u8 = 0x88;

/// Not bootable indicator
pub const NOT_BOOTABLE: u8 = 0x00;

/// Entry size
pub const ENTRY_SIZE: usize = 32;

/// Decode the media type nibble
pub fn media_type(byte: u8) -> BootMediaType {
    match byte & 0x0F {
        1 => BootMediaType::Floppy12M,
        2 => BootMediaType::Floppy144M,
        3 => BootMediaType::Floppy288M,
        4 => BootMediaType::HardDisk,
        _ => BootMediaType::NoEmulation,
    }
}

/// Parse one initial/default or section entry
pub fn parse(data: &[u8], platform: BootPlatform) -> Result<BootImage> {
    if data.len() < ENTRY_SIZE {
        return Err(Iso9660Error::InvalidBootEntry);
    }

    let bootable = match data[0] {
        BOOTABLE => true,
        NOT_BOOTABLE => false,
        _ => return Err(Iso9660Error::InvalidBootEntry),
    };

    Ok(BootImage {
        bootable,
        media_type: media_type(data[1]),
        load_segment: le_u16(data, 2),
        system_type: data[4],
        sector_count: le_u16(data, 6),
        load_rba: le_u32(data, 8),
        platform,
    })
}

impl BootImage {
    /// Get image size in bytes (sector_count * 512)
    pub fn image_size(&self) -> u32 {
        self.sector_count as u32 * 512
    }
}
