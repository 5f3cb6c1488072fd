//! Directory record parsing and navigation

pub mod iterator;
pub mod record;
pub mod walk;

use crate::error::{Iso9660Error, Result};
use crate::types::{FileEntry, FileFlags, VolumeInfo, MAX_DIRECTORY_DEPTH};
use crate::utils::sector::SectorReader;
use alloc::string::String;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

pub use walk::{walk_tree, WalkLimits, WalkSummary};

/// Find a file or directory by path
///
/// Navigates the directory tree from root to locate a file/directory.
/// Paths are case-insensitive and support both `/` and `\` separators.
///
/// # Arguments
/// * `block_io` - Block device
/// * `volume` - Mounted volume info
/// * `path` - Path to find (e.g., "/isolinux/isolinux.bin", "/EFI/BOOT/BOOTX64.EFI")
///
/// # Returns
/// File entry if found, with metadata and extent location
///
/// # Example
/// ```ignore
/// use iso9660::{mount, find_file};
///
/// let volume = mount(&mut block_io, 0)?;
/// let file = find_file(&mut block_io, &volume, "/isolinux/isolinux.bin")?;
/// ```
pub fn find_file<B: BlockIo>(
    block_io: &mut B,
    volume: &VolumeInfo,
    path: &str,
) -> Result<FileEntry> {
    let mut reader = SectorReader::new(block_io, volume.start_sector)?;
    find_file_with(&mut reader, volume, path)
}

/// [`find_file`] over an existing sector reader
pub fn find_file_with<B: BlockIo>(
    reader: &mut SectorReader<'_, B>,
    volume: &VolumeInfo,
    path: &str,
) -> Result<FileEntry> {
    let components: Vec<&str> = path
        .split(['/', '\\'])
        .filter(|c| !c.is_empty() && *c != ".")
        .collect();

    if components.len() > MAX_DIRECTORY_DEPTH {
        return Err(Iso9660Error::PathTooLong);
    }

    let mut current = root_entry(volume);

    for component in components {
        if !current.is_directory() {
            return Err(Iso9660Error::NotFound);
        }

        let mut found = None;
        for result in iterator::DirectoryIterator::new(reader, current.extent_lba, current.data_length) {
            let entry = result?;
            if entry.name.eq_ignore_ascii_case(component) {
                found = Some(entry);
                break;
            }
        }

        current = found.ok_or(Iso9660Error::NotFound)?;
    }

    Ok(current)
}

/// Synthesized entry for the root directory
pub fn root_entry(volume: &VolumeInfo) -> FileEntry {
    FileEntry {
        name: String::from("/"),
        size: volume.root_extent_len as u64,
        extent_lba: volume.root_extent_lba,
        data_length: volume.root_extent_len,
        flags: FileFlags {
            directory: true,
            ..FileFlags::default()
        },
    }
}
