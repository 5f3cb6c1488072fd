//! Primary Volume Descriptor parsing
//!
//! The Primary Volume Descriptor (PVD) is always present and describes
//! the basic ISO9660 filesystem structure. See ECMA-119 8.4.
//!
//! ```text
//! Offset  Size  Field
//! 0       1     Type code (1)
//! 1       5     "CD001"
//! 6       1     Version (1)
//! 8       32    System identifier
//! 40      32    Volume identifier
//! 80      8     Volume space size (both-endian u32)
//! 128     4     Logical block size (both-endian u16)
//! 156     34    Root directory record
//! ```

use crate::directory::record::DirectoryRecord;
use crate::error::{Iso9660Error, Result};
use crate::types::SECTOR_SIZE;
use crate::utils::{le_u16, le_u32};

const VOLUME_ID: usize = 40;
const VOLUME_SPACE_SIZE: usize = 80;
const LOGICAL_BLOCK_SIZE: usize = 128;
const ROOT_RECORD: usize = 156;
const ROOT_RECORD_LEN: usize = 34;

/// Fields of the PVD the reader relies on
#[derive(Debug, Clone)]
pub struct PrimaryVolumeDescriptor {
    /// Volume identifier (32 d-characters)
    pub volume_id: [u8; 32],

    /// Volume space size in logical blocks
    pub volume_space_size: u32,

    /// Logical block size, usually 2048
    pub logical_block_size: u16,

    /// Root directory extent (LBA)
    pub root_extent_lba: u32,

    /// Root directory extent length (bytes)
    pub root_extent_len: u32,
}

/// Parse Primary Volume Descriptor from sector data
pub fn parse(data: &[u8; SECTOR_SIZE]) -> Result<PrimaryVolumeDescriptor> {
    if data[0] != 1 || &data[1..6] != b"CD001" {
        return Err(Iso9660Error::InvalidSignature);
    }

    if data[6] != 1 {
        return Err(Iso9660Error::UnsupportedVersion);
    }

    let root = DirectoryRecord::parse(&data[ROOT_RECORD..ROOT_RECORD + ROOT_RECORD_LEN])?;
    if !root.flags().directory {
        return Err(Iso9660Error::InvalidDirectoryRecord);
    }

    let mut volume_id = [0u8; 32];
    volume_id.copy_from_slice(&data[VOLUME_ID..VOLUME_ID + 32]);

    Ok(PrimaryVolumeDescriptor {
        volume_id,
        volume_space_size: le_u32(data, VOLUME_SPACE_SIZE),
        logical_block_size: le_u16(data, LOGICAL_BLOCK_SIZE),
        root_extent_lba: root.extent_lba(),
        root_extent_len: root.data_length(),
    })
}
