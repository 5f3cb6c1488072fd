//! Directory Record structure
//!
//! Directory records describe files and subdirectories.
//!
//! ```text
//! BP 1      Length of directory record
//! BP 2      Extended attribute record length
//! BP 3-10   Extent location (both-endian u32)
//! BP 11-18  Data length (both-endian u32)
//! BP 19-25  Recording date and time
//! BP 26     File flags
//! BP 27-32  Interleave and volume sequence fields
//! BP 33     File identifier length
//! BP 34-    File identifier, padding, system use
//! ```

use crate::error::{Iso9660Error, Result};
use crate::types::FileFlags;
use crate::utils::le_u32;

const EXTENT_LBA: usize = 2;
const DATA_LENGTH: usize = 10;
const FILE_FLAGS: usize = 25;
const FILE_ID_LEN: usize = 32;
const FILE_ID: usize = 33;

/// Borrowed view of one directory record
#[derive(Debug, Clone, Copy)]
pub struct DirectoryRecord<'a> {
    data: &'a [u8],
}

impl<'a> DirectoryRecord<'a> {
    /// Minimum record length (fixed part plus a one-byte identifier)
    pub const MIN_LENGTH: usize = 34;

    /// Parse directory record from bytes
    pub fn parse(data: &'a [u8]) -> Result<Self> {
        if data.len() < Self::MIN_LENGTH {
            return Err(Iso9660Error::InvalidDirectoryRecord);
        }

        let length = data[0] as usize;
        if length < Self::MIN_LENGTH || length > data.len() {
            return Err(Iso9660Error::InvalidDirectoryRecord);
        }

        if FILE_ID + data[FILE_ID_LEN] as usize > length {
            return Err(Iso9660Error::InvalidDirectoryRecord);
        }

        Ok(Self {
            data: &data[..length],
        })
    }

    /// Total record length in bytes
    pub fn length(&self) -> usize {
        self.data.len()
    }

    /// Get extent LBA (little-endian part of both-endian field)
    pub fn extent_lba(&self) -> u32 {
        le_u32(self.data, EXTENT_LBA)
    }

    /// Get data length (little-endian part)
    pub fn data_length(&self) -> u32 {
        le_u32(self.data, DATA_LENGTH)
    }

    /// Parse file flags
    pub fn flags(&self) -> FileFlags {
        FileFlags::from_bits(self.data[FILE_FLAGS])
    }

    /// Get file identifier bytes
    pub fn file_identifier(&self) -> &'a [u8] {
        let len = self.data[FILE_ID_LEN] as usize;
        &self.data[FILE_ID..FILE_ID + len]
    }

    /// "." or ".." pseudo entry
    pub fn is_self_or_parent(&self) -> bool {
        matches!(self.file_identifier(), [0x00] | [0x01])
    }
}
