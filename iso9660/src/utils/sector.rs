//! Sector addressing on top of a block device
//!
//! ISO9660 structures are addressed in 2048-byte sectors while the backing
//! `BlockIo` may use any block size. `SectorReader` translates between the
//! two and bounds-checks every read against the device size.

use crate::error::{Iso9660Error, Result};
use crate::types::SECTOR_SIZE;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

/// Calculate number of sectors needed for byte count
pub fn sectors_for_bytes(byte_count: u64) -> u64 {
    byte_count.div_ceil(SECTOR_SIZE as u64)
}

/// Convert sector number to byte offset
pub fn sector_to_byte(sector: u64) -> u64 {
    sector * SECTOR_SIZE as u64
}

/// Reads 2048-byte ISO sectors from an arbitrary block device
pub struct SectorReader<'a, B: BlockIo> {
    block_io: &'a mut B,
    /// First ISO sector of the volume on the device
    base_sector: u64,
    block_size: u64,
    device_bytes: u64,
    scratch: Vec<u8>,
}

impl<'a, B: BlockIo> SectorReader<'a, B> {
    /// Wrap a block device; `base_sector` is the volume start in ISO sectors
    pub fn new(block_io: &'a mut B, base_sector: u64) -> Result<Self> {
        let block_size = block_io.block_size().to_u64();
        let blocks = block_io
            .num_blocks()
            .map_err(|_| Iso9660Error::IoError)?;

        Ok(Self {
            block_io,
            base_sector,
            block_size,
            device_bytes: blocks.saturating_mul(block_size),
            scratch: Vec::new(),
        })
    }

    /// Number of whole ISO sectors available from `base_sector` on
    pub fn sector_count(&self) -> u64 {
        (self.device_bytes / SECTOR_SIZE as u64).saturating_sub(self.base_sector)
    }

    /// Is `sector` (relative to the volume) fully inside the device?
    pub fn contains(&self, sector: u64) -> bool {
        sector < self.sector_count()
    }

    /// Read one ISO sector into `dst`
    pub fn read_sector(&mut self, sector: u64, dst: &mut [u8; SECTOR_SIZE]) -> Result<()> {
        if !self.contains(sector) {
            return Err(Iso9660Error::ExtentOutOfBounds);
        }

        let byte = sector_to_byte(self.base_sector + sector);
        let first_block = byte / self.block_size;
        let last_block = (byte + SECTOR_SIZE as u64 - 1) / self.block_size;
        let span = ((last_block - first_block + 1) * self.block_size) as usize;

        self.scratch.resize(span, 0);
        self.block_io
            .read_blocks(Lba(first_block), &mut self.scratch)
            .map_err(|_| Iso9660Error::IoError)?;

        let skip = (byte - first_block * self.block_size) as usize;
        dst.copy_from_slice(&self.scratch[skip..skip + SECTOR_SIZE]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sectors_for_bytes() {
        assert_eq!(sectors_for_bytes(0), 0);
        assert_eq!(sectors_for_bytes(1), 1);
        assert_eq!(sectors_for_bytes(2048), 1);
        assert_eq!(sectors_for_bytes(2049), 2);
    }

    #[test]
    fn test_sector_to_byte() {
        assert_eq!(sector_to_byte(16), 32768);
    }
}
