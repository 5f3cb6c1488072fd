//! Boot catalog validation entry
//!
//! The validation entry verifies catalog integrity via checksum.
//!
//! ```text
//! 0x00  1   Header ID (1)
//! 0x01  1   Platform ID
//! 0x02  2   Reserved
//! 0x04  24  Manufacturer/developer ID string
//! 0x1C  2   Checksum word (all 16 words sum to zero)
//! 0x1E  2   Key bytes 0x55 0xAA
//! ```

use crate::error::{Iso9660Error, Result};
use crate::types::BootPlatform;
use crate::utils::checksum;

/// Validation Entry (first 32 bytes of the catalog)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationEntry {
    /// Platform of the initial/default entry
    pub platform: BootPlatform,

    /// Manufacturer/developer ID string (24 bytes)
    pub id_string: [u8; 24],
}

impl ValidationEntry {
    /// Header ID constant
    pub const HEADER_ID: u8 = 0x01;

    /// Key bytes constant
    pub const KEY_BYTES: [u8; 2] = [0x55, 0xAA];

    /// Entry size
    pub const SIZE: usize = 32;

    /// Parse and validate the entry
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE {
            return Err(Iso9660Error::InvalidBootCatalog);
        }
        let data = &data[..Self::SIZE];

        if data[0] != Self::HEADER_ID || data[30..32] != Self::KEY_BYTES {
            return Err(Iso9660Error::InvalidBootCatalog);
        }

        if !checksum::verify_checksum_16(data) {
            return Err(Iso9660Error::ChecksumFailed);
        }

        let mut id_string = [0u8; 24];
        id_string.copy_from_slice(&data[4..28]);

        Ok(Self {
            platform: BootPlatform::from_id(data[1]),
            id_string,
        })
    }
}
