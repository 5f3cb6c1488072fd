//! Volume descriptor parsing
//!
//! ISO9660 volume descriptors start at sector 16 and describe the filesystem layout.
//! Multiple descriptors may be present (Primary, Supplementary, Boot Record).

pub mod boot_record;
pub mod primary;

use crate::error::{Iso9660Error, Result, SectorError};
use crate::types::{
    VolumeDescriptorType, VolumeInfo, MAX_VOLUME_DESCRIPTORS, SECTOR_SIZE,
    VOLUME_DESCRIPTOR_START,
};
use crate::utils::sector::SectorReader;
use gpt_disk_io::BlockIo;

/// CD001 magic bytes
pub const STANDARD_ID: &[u8; 5] = b"CD001";

/// Everything learned from one pass over the descriptor set
#[derive(Debug, Clone, Default)]
pub struct DescriptorSet {
    /// Primary volume, if a PVD was present
    pub primary: Option<VolumeInfo>,

    /// Boot catalog sector from an El Torito boot record
    pub boot_catalog_lba: Option<u32>,

    /// A supplementary (Joliet) descriptor was seen
    pub has_joliet: bool,

    /// Descriptors read, terminator included
    pub descriptor_count: u64,
}

/// Check the 7-byte header shared by every volume descriptor
fn has_standard_header(data: &[u8; SECTOR_SIZE]) -> bool {
    &data[1..6] == STANDARD_ID && data[6] == 1
}

/// Walk the volume descriptor set
///
/// Returns `Ok(None)` when the device does not carry ISO9660 at all (too
/// short for sector 16, or no `CD001` there). Once the set has started,
/// running off the device or past [`MAX_VOLUME_DESCRIPTORS`] without a
/// terminator is an error. Errors carry the descriptor sector.
pub fn read_descriptor_set<B: BlockIo>(
    reader: &mut SectorReader<'_, B>,
) -> core::result::Result<Option<DescriptorSet>, SectorError> {
    let mut buffer = [0u8; SECTOR_SIZE];

    if !reader.contains(VOLUME_DESCRIPTOR_START) {
        return Ok(None);
    }
    reader
        .read_sector(VOLUME_DESCRIPTOR_START, &mut buffer)
        .map_err(|e| SectorError::new(VOLUME_DESCRIPTOR_START, e))?;
    if !has_standard_header(&buffer) {
        return Ok(None);
    }

    let mut set = DescriptorSet::default();
    let mut sector = VOLUME_DESCRIPTOR_START;
    loop {
        let fail = move |error: Iso9660Error| SectorError::new(sector, error);

        if set.descriptor_count >= MAX_VOLUME_DESCRIPTORS {
            return Err(fail(Iso9660Error::UnterminatedDescriptorSet));
        }
        if sector != VOLUME_DESCRIPTOR_START {
            if !reader.contains(sector) {
                return Err(fail(Iso9660Error::UnterminatedDescriptorSet));
            }
            reader.read_sector(sector, &mut buffer).map_err(fail)?;
            if !has_standard_header(&buffer) {
                return Err(fail(Iso9660Error::InvalidSignature));
            }
        }
        set.descriptor_count += 1;

        match VolumeDescriptorType::from_code(buffer[0]) {
            VolumeDescriptorType::BootRecord => {
                if let Some(lba) = boot_record::el_torito_catalog(&buffer) {
                    tracing::debug!(catalog_lba = lba, "El Torito boot record");
                    set.boot_catalog_lba.get_or_insert(lba);
                }
            }
            VolumeDescriptorType::Primary => {
                if set.primary.is_none() {
                    let pvd = primary::parse(&buffer).map_err(fail)?;
                    set.primary = Some(VolumeInfo {
                        start_sector: 0,
                        volume_id: pvd.volume_id,
                        root_extent_lba: pvd.root_extent_lba,
                        root_extent_len: pvd.root_extent_len,
                        logical_block_size: pvd.logical_block_size,
                        volume_space_size: pvd.volume_space_size,
                        boot_catalog_lba: None,
                        has_joliet: false,
                    });
                }
            }
            VolumeDescriptorType::Supplementary => set.has_joliet = true,
            VolumeDescriptorType::Terminator => break,
            VolumeDescriptorType::Partition | VolumeDescriptorType::Reserved(_) => {}
        }

        sector += 1;
    }

    let boot_catalog_lba = set.boot_catalog_lba;
    let has_joliet = set.has_joliet;
    if let Some(ref mut vi) = set.primary {
        vi.boot_catalog_lba = boot_catalog_lba;
        vi.has_joliet = has_joliet;
    }

    Ok(Some(set))
}

/// Mount an ISO9660 volume from a block device
///
/// Reads volume descriptors starting at sector 16 and builds VolumeInfo.
///
/// # Arguments
/// * `block_io` - Block device containing the ISO
/// * `start_sector` - Starting ISO sector of the volume (0 if raw ISO)
///
/// # Returns
/// Parsed volume information
pub fn mount<B: BlockIo>(block_io: &mut B, start_sector: u64) -> Result<VolumeInfo> {
    let mut reader = SectorReader::new(block_io, start_sector)?;
    let set = read_descriptor_set(&mut reader)
        .map_err(|e| e.error)?
        .ok_or(Iso9660Error::InvalidSignature)?;

    let mut volume = set.primary.ok_or(Iso9660Error::InvalidSignature)?;
    volume.start_sector = start_sector;
    Ok(volume)
}
