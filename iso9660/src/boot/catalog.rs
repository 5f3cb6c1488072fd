//! Boot catalog parsing
//!
//! The boot catalog starts with a validation entry followed by the
//! initial/default entry, then optional section headers each followed by
//! their section entries. Only the first catalog sector (64 entries) is read.

use super::entry::{self, ENTRY_SIZE};
use super::validation::ValidationEntry;
use crate::error::{Iso9660Error, Result};
use crate::types::{BootImage, BootPlatform, SECTOR_SIZE};
use crate::utils::le_u16;
use alloc::vec::Vec;

/// Section header, more headers follow
pub const SECTION_HEADER: u8 = 0x90;

/// Final section header
pub const FINAL_SECTION_HEADER: u8 = 0x91;

/// Section entry extension record
pub const SECTION_EXTENSION: u8 = 0x44;

/// Parsed boot catalog
#[derive(Debug, Clone)]
pub struct BootCatalog {
    /// Validation entry
    pub validation: ValidationEntry,

    /// Initial/default entry first, then section entries in catalog order
    pub entries: Vec<BootImage>,
}

impl BootCatalog {
    /// Parse boot catalog from sector data
    pub fn parse(data: &[u8; SECTOR_SIZE]) -> Result<Self> {
        let validation = ValidationEntry::parse(&data[..ENTRY_SIZE])?;

        let mut entries = Vec::new();
        entries.push(entry::parse(&data[ENTRY_SIZE..2 * ENTRY_SIZE], validation.platform)?);

        let mut offset = 2 * ENTRY_SIZE;
        while offset + ENTRY_SIZE <= SECTOR_SIZE {
            let header = data[offset];
            if header != SECTION_HEADER && header != FINAL_SECTION_HEADER {
                break;
            }

            let platform = BootPlatform::from_id(data[offset + 1]);
            let mut remaining = le_u16(data, offset + 2);
            offset += ENTRY_SIZE;

            while remaining > 0 {
                if offset + ENTRY_SIZE > SECTOR_SIZE {
                    return Err(Iso9660Error::InvalidBootCatalog);
                }
                let raw = &data[offset..offset + ENTRY_SIZE];
                offset += ENTRY_SIZE;

                if raw[0] == SECTION_EXTENSION {
                    continue;
                }
                entries.push(entry::parse(raw, platform)?);
                remaining -= 1;
            }

            if header == FINAL_SECTION_HEADER {
                break;
            }
        }

        Ok(Self { validation, entries })
    }

    /// Entries whose boot indicator is set
    pub fn bootable_entries(&self) -> impl Iterator<Item = &BootImage> {
        self.entries.iter().filter(|e| e.bootable)
    }
}
