//! El Torito boot support
//!
//! Parsing boot catalogs and boot images from ISO9660 volumes.

pub mod catalog;
pub mod entry;
pub mod platform;
pub mod validation;

pub use catalog::BootCatalog;

use crate::error::{Iso9660Error, Result};
use crate::types::{BootImage, VolumeInfo, SECTOR_SIZE};
use crate::utils::sector::SectorReader;
use gpt_disk_io::BlockIo;

/// Read and parse the catalog stored at `catalog_lba`
pub fn read_boot_catalog<B: BlockIo>(
    reader: &mut SectorReader<'_, B>,
    catalog_lba: u32,
) -> Result<BootCatalog> {
    let mut sector = [0u8; SECTOR_SIZE];
    reader.read_sector(catalog_lba as u64, &mut sector)?;
    BootCatalog::parse(&sector)
}

/// Find boot image from El Torito boot catalog
///
/// # Arguments
/// * `block_io` - Block device
/// * `volume` - Mounted volume
///
/// # Returns
/// The first bootable catalog entry
pub fn find_boot_image<B: BlockIo>(block_io: &mut B, volume: &VolumeInfo) -> Result<BootImage> {
    let catalog_lba = volume.boot_catalog_lba.ok_or(Iso9660Error::NoBootCatalog)?;

    let mut reader = SectorReader::new(block_io, volume.start_sector)?;
    let catalog = read_boot_catalog(&mut reader, catalog_lba)?;

    let entry = catalog
        .bootable_entries()
        .next()
        .cloned()
        .ok_or(Iso9660Error::InvalidBootEntry);
    entry
}
