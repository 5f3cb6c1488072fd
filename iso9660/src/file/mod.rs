//! File reading from extents

use crate::error::{Iso9660Error, Result};
use crate::types::{FileEntry, VolumeInfo, SECTOR_SIZE};
use crate::utils::sector::SectorReader;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

/// Read file contents
///
/// # Arguments
/// * `block_io` - Block device
/// * `volume` - Mounted volume the entry belongs to
/// * `file` - File entry to read
/// * `buffer` - Buffer to read into
///
/// # Returns
/// Number of bytes read
pub fn read_file<B: BlockIo>(
    block_io: &mut B,
    volume: &VolumeInfo,
    file: &FileEntry,
    buffer: &mut [u8],
) -> Result<usize> {
    let file_size = file.size as usize;
    if buffer.len() < file_size {
        return Err(Iso9660Error::ReadFailed);
    }

    let mut reader = SectorReader::new(block_io, volume.start_sector)?;
    read_extent(&mut reader, file.extent_lba, &mut buffer[..file_size])?;
    Ok(file_size)
}

/// Read file into new Vec
pub fn read_file_vec<B: BlockIo>(
    block_io: &mut B,
    volume: &VolumeInfo,
    file: &FileEntry,
) -> Result<Vec<u8>> {
    let mut buffer = alloc::vec![0u8; file.size as usize];
    read_file(block_io, volume, file, &mut buffer)?;
    Ok(buffer)
}

/// Read at most `limit` leading bytes of a file
pub fn read_file_prefix<B: BlockIo>(
    reader: &mut SectorReader<'_, B>,
    file: &FileEntry,
    limit: usize,
) -> Result<Vec<u8>> {
    let len = core::cmp::min(file.size as usize, limit);
    let mut buffer = alloc::vec![0u8; len];
    read_extent(reader, file.extent_lba, &mut buffer)?;
    Ok(buffer)
}

/// Fill `dst` from consecutive sectors starting at `start_lba`
fn read_extent<B: BlockIo>(
    reader: &mut SectorReader<'_, B>,
    start_lba: u32,
    dst: &mut [u8],
) -> Result<()> {
    let mut sector = [0u8; SECTOR_SIZE];

    for (i, chunk) in dst.chunks_mut(SECTOR_SIZE).enumerate() {
        reader.read_sector(start_lba as u64 + i as u64, &mut sector)?;
        chunk.copy_from_slice(&sector[..chunk.len()]);
    }

    Ok(())
}
