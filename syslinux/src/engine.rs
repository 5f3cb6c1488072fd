//! Patch computation
//!
//! Reads the reserved area of a loader image as described by its
//! [`LoaderLayout`] and produces the writes that make the embedded sector
//! table match the sectors the file occupies on the destination medium.
//! Nothing here touches a device; input and output are plain buffers.

use crate::checksum::dword_complement;
use crate::error::{PatchError, PatchErrorKind, PatchStage, Result};
use crate::extent::encode_runs;
use crate::layout::{
    Anchor, Capacity, ChecksumSpec, Field, LoaderLayout, PathSlot, SyslinuxFields, TableLocation,
};
use crate::ldlinux::{BOOT_SECTOR_SIZE, LDLINUX_SYS, RAID_PATCH};
use crate::options::PatchOptions;
use crate::patch::{apply_patches, Patch};
use alloc::string::String;
use alloc::vec::Vec;

/// Patches for an `ldlinux.sys` image with default options
///
/// # Arguments
/// * `file_path` - Path the patches are addressed to
/// * `content` - Current bytes of the file
/// * `sectors` - Destination sectors of the file followed by its two ADV sectors
///
/// # Returns
/// The writes to perform, checksum last; empty if the file carries no
/// patch area
pub fn calculate_patches(file_path: &str, content: &[u8], sectors: &[u64]) -> Result<Vec<Patch>> {
    calculate_patches_with(&LDLINUX_SYS, file_path, content, sectors, &PatchOptions::default())
}

/// Patches for any loader layout
pub fn calculate_patches_with(
    layout: &LoaderLayout,
    file_path: &str,
    content: &[u8],
    sectors: &[u64],
    options: &PatchOptions,
) -> Result<Vec<Patch>> {
    if content.is_empty() {
        return Ok(Vec::new());
    }

    let Some(signature) = layout.find_signature(content) else {
        tracing::debug!(file = file_path, loader = layout.name, "no patch area signature");
        return Ok(Vec::new());
    };
    tracing::debug!(file = file_path, offset = signature, "patch area signature found");

    let expected = layout.expected_sectors(content.len());
    if sectors.len() != expected {
        return Err(PatchError::new(
            file_path,
            PatchStage::AreaDecode,
            PatchErrorKind::SectorCountMismatch {
                expected,
                actual: sectors.len(),
            },
        ));
    }

    let mut encoder = Encoder {
        layout,
        file: file_path,
        content,
        signature,
        extended: None,
        patches: Vec::new(),
    };
    if let Some(field) = layout.extended_area {
        encoder.extended = Some(encoder.read_offset(field, PatchStage::AreaDecode)?);
    }

    let file_sectors = layout.file_sectors(content.len());
    let (data, trailing) = sectors.split_at(file_sectors);

    if let Some(sys) = &layout.syslinux {
        encoder.boot_sector(sys, data[0], options)?;
    }

    encoder.write_field(layout.sector_count, file_sectors as u64, PatchStage::TableEncoding)?;
    if let Some(sys) = &layout.syslinux {
        encoder.write_field(sys.adv_sectors, trailing.len() as u64, PatchStage::TableEncoding)?;
        encoder.write_field(sys.dwords, (content.len() / 4) as u64, PatchStage::TableEncoding)?;
        if options.stupid_mode {
            encoder.write_field(sys.max_transfer, 1, PatchStage::TableEncoding)?;
        }
    }

    let skip = layout.table.skip_leading.min(data.len());
    encoder.sector_table(&data[skip..])?;

    if let Some(sys) = &layout.syslinux {
        encoder.adv_pointers(sys, trailing)?;
        if let Some(subdir) = &options.subdir {
            encoder.path_slot(sys.subdir, subdir)?;
        }
        if let Some(subvol) = &options.subvol {
            encoder.path_slot(sys.subvol, subvol)?;
        }
    }

    encoder.checksum()?;
    Ok(encoder.patches)
}

struct Encoder<'a> {
    layout: &'a LoaderLayout,
    file: &'a str,
    content: &'a [u8],
    signature: usize,
    extended: Option<usize>,
    patches: Vec<Patch>,
}

impl<'a> Encoder<'a> {
    fn err(&self, stage: PatchStage, kind: PatchErrorKind) -> PatchError {
        PatchError::new(self.file, stage, kind)
    }

    fn out_of_bounds(&self, stage: PatchStage, field: &'static str, offset: usize) -> PatchError {
        self.err(stage, PatchErrorKind::FieldOutOfBounds { field, offset })
    }

    fn anchor(&self, anchor: Anchor, stage: PatchStage) -> Result<usize> {
        match anchor {
            Anchor::Signature => Ok(self.signature),
            Anchor::File => Ok(0),
            Anchor::Extended => self
                .extended
                .ok_or_else(|| self.out_of_bounds(stage, "extended area", 0)),
        }
    }

    /// Make sure `offset..offset + len` lies inside the file
    fn region(&self, stage: PatchStage, name: &'static str, offset: usize, len: usize) -> Result<()> {
        match offset.checked_add(len) {
            Some(end) if end <= self.content.len() => Ok(()),
            _ => Err(self.out_of_bounds(stage, name, offset)),
        }
    }

    /// Absolute offset of a field
    fn locate(&self, field: Field, stage: PatchStage) -> Result<usize> {
        let base = self.anchor(field.anchor, stage)?;
        let offset = base
            .checked_add(field.offset)
            .ok_or_else(|| self.out_of_bounds(stage, field.name, base))?;
        self.region(stage, field.name, offset, field.width.bytes())?;
        Ok(offset)
    }

    fn read(&self, field: Field, stage: PatchStage) -> Result<u64> {
        let offset = self.locate(field, stage)?;
        field
            .width
            .read(self.content, offset)
            .ok_or_else(|| self.out_of_bounds(stage, field.name, offset))
    }

    fn read_offset(&self, field: Field, stage: PatchStage) -> Result<usize> {
        let value = self.read(field, stage)?;
        usize::try_from(value).map_err(|_| self.out_of_bounds(stage, field.name, usize::MAX))
    }

    fn encode(&self, field: Field, value: u64, stage: PatchStage, out: &mut Vec<u8>) -> Result<()> {
        field.width.encode_into(value, out).ok_or_else(|| {
            self.err(
                stage,
                PatchErrorKind::ValueOverflow {
                    field: field.name,
                    value,
                },
            )
        })
    }

    fn push(&mut self, file_path: &str, offset: usize, data: Vec<u8>) {
        self.patches.push(Patch {
            file_path: String::from(file_path),
            offset,
            data,
        });
    }

    fn write_field(&mut self, field: Field, value: u64, stage: PatchStage) -> Result<()> {
        let offset = self.locate(field, stage)?;
        let mut data = Vec::with_capacity(field.width.bytes());
        self.encode(field, value, stage, &mut data)?;
        self.push(self.file, offset, data);
        Ok(())
    }

    /// First sector pointer and RAID word in the companion boot sector
    fn boot_sector(&mut self, sys: &SyslinuxFields, first: u64, options: &PatchOptions) -> Result<()> {
        let Some(boot_path) = options.boot_sector_path.as_deref() else {
            return Ok(());
        };

        let mut writes = Vec::new();
        writes.push((sys.first_sector_lo, (first as u32).to_le_bytes().to_vec()));
        writes.push((sys.first_sector_hi, ((first >> 32) as u32).to_le_bytes().to_vec()));
        if options.raid_mode {
            writes.push((sys.raid_patch, RAID_PATCH.to_le_bytes().to_vec()));
        }

        for (field, data) in writes {
            let offset = self.read_offset(field, PatchStage::AreaDecode)?;
            if offset + data.len() > BOOT_SECTOR_SIZE {
                return Err(self.out_of_bounds(PatchStage::TableEncoding, field.name, offset));
            }
            self.push(boot_path, offset, data);
        }
        tracing::debug!(boot_sector = boot_path, first_sector = first, "boot sector pointer");
        Ok(())
    }

    /// The run-length encoded table, unused slots zeroed
    fn sector_table(&mut self, sectors: &[u64]) -> Result<()> {
        let table = self.layout.table;
        let stage = PatchStage::TableEncoding;

        let offset = match table.location {
            TableLocation::At(anchor, at) => {
                let base = self.anchor(anchor, stage)?;
                base.checked_add(at)
                    .ok_or_else(|| self.out_of_bounds(stage, "sector table", base))?
            }
            TableLocation::Pointer(field) => self.read_offset(field, PatchStage::AreaDecode)?,
        };
        let capacity = match table.capacity {
            Capacity::Fixed(n) => n,
            Capacity::Field(field) => self.read_offset(field, PatchStage::AreaDecode)?,
        };

        let runs = encode_runs(
            sectors,
            self.layout.sector_size as u64,
            table.entry.length.max(),
            self.layout.run_limit,
        );
        if runs.len() > capacity {
            return Err(self.err(
                stage,
                PatchErrorKind::PatchAreaTooSmall {
                    runs: runs.len(),
                    capacity,
                },
            ));
        }

        let size = capacity
            .checked_mul(table.entry.size())
            .ok_or_else(|| self.out_of_bounds(stage, "sector table", offset))?;
        self.region(stage, "sector table", offset, size)?;

        let start = Field::new("sector table start", Anchor::File, offset, table.entry.start);
        let length = Field::new("sector table length", Anchor::File, offset, table.entry.length);
        let mut data = Vec::with_capacity(size);
        for run in &runs {
            self.encode(start, run.start, stage, &mut data)?;
            self.encode(length, run.len, stage, &mut data)?;
        }
        data.resize(size, 0);

        tracing::debug!(runs = runs.len(), capacity, offset, "sector table encoded");
        if !data.is_empty() {
            self.push(self.file, offset, data);
        }
        Ok(())
    }

    /// Pointers to the trailing ADV sectors
    fn adv_pointers(&mut self, sys: &SyslinuxFields, sectors: &[u64]) -> Result<()> {
        let stage = PatchStage::TableEncoding;
        let offset = self.read_offset(sys.adv_pointers, PatchStage::AreaDecode)?;
        let slot = Field::new(sys.adv_pointers.name, Anchor::File, offset, sys.adv_pointer_width);

        let mut data = Vec::new();
        for &sector in sectors {
            self.encode(slot, sector, stage, &mut data)?;
        }
        self.region(stage, sys.adv_pointers.name, offset, data.len())?;
        self.push(self.file, offset, data);
        Ok(())
    }

    /// NUL-terminated string into a slot
    fn path_slot(&mut self, slot: PathSlot, value: &str) -> Result<()> {
        let stage = PatchStage::TableEncoding;
        let offset = self.read_offset(slot.offset, PatchStage::AreaDecode)?;
        let capacity = self.read_offset(slot.len, PatchStage::AreaDecode)?;

        let mut data = Vec::with_capacity(value.len() + 1);
        data.extend_from_slice(value.as_bytes());
        data.push(0);
        if data.len() > capacity {
            return Err(self.err(
                stage,
                PatchErrorKind::PathTooLong {
                    field: slot.offset.name,
                    len: data.len(),
                    capacity,
                },
            ));
        }

        self.region(stage, slot.offset.name, offset, data.len())?;
        self.push(self.file, offset, data);
        Ok(())
    }

    /// Checksum over the image with every other patch applied
    fn checksum(&mut self) -> Result<()> {
        let ChecksumSpec::DwordComplement { field, seed } = self.layout.checksum else {
            return Ok(());
        };
        let stage = PatchStage::Checksum;
        let offset = self.locate(field, stage)?;

        let mut image = self.content.to_vec();
        apply_patches(&mut image, self.file, &self.patches).map_err(|e| self.err(stage, e.kind))?;
        image[offset..offset + field.width.bytes()].fill(0);

        let csum = dword_complement(&image, seed);
        tracing::debug!(checksum = csum, "checksum computed");
        self.write_field(field, csum as u64, stage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{RunEntry, RunLimit, TableSpec, Width};
    use alloc::vec;

    const STUB: LoaderLayout = LoaderLayout {
        name: "stub",
        signature: b"SECTMAP1",
        signature_align: 8,
        sector_size: 512,
        trailing_sectors: 0,
        extended_area: None,
        sector_count: Field::new("count", Anchor::Signature, 8, Width::U32),
        table: TableSpec {
            location: TableLocation::At(Anchor::Signature, 12),
            capacity: Capacity::Fixed(4),
            entry: RunEntry {
                start: Width::U32,
                length: Width::U16,
            },
            skip_leading: 0,
        },
        run_limit: RunLimit::Unbounded,
        checksum: ChecksumSpec::None,
        syslinux: None,
    };

    fn stub_image() -> Vec<u8> {
        let mut image = vec![0u8; 5 * 512];
        image[16..24].copy_from_slice(b"SECTMAP1");
        image
    }

    #[test]
    fn test_scenario() {
        let image = stub_image();
        let patches =
            calculate_patches_with(&STUB, "stub.bin", &image, &[100, 101, 102, 200, 201], &PatchOptions::default())
                .unwrap();

        assert_eq!(patches.len(), 2);
        assert_eq!(patches[0].offset, 24);
        assert_eq!(patches[0].data, 5u32.to_le_bytes());

        let table = &patches[1];
        assert_eq!(table.offset, 16 + 12);
        assert_eq!(table.data.len(), 4 * 6);
        assert_eq!(&table.data[..6], &[100, 0, 0, 0, 3, 0]);
        assert_eq!(&table.data[6..12], &[200, 0, 0, 0, 2, 0]);
        assert!(table.data[12..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_start_overflows_narrow_slot() {
        let image = stub_image();
        let sectors = [1 << 40, 1, 2, 3, 4];
        let err = calculate_patches_with(&STUB, "stub.bin", &image, &sectors, &PatchOptions::default())
            .unwrap_err();
        assert_eq!(err.stage, PatchStage::TableEncoding);
        assert!(matches!(err.kind, PatchErrorKind::ValueOverflow { value, .. } if value == 1 << 40));
    }

    #[test]
    fn test_table_past_end_of_file() {
        let mut image = vec![0u8; 40];
        image[16..24].copy_from_slice(b"SECTMAP1");
        let err = calculate_patches_with(&STUB, "stub.bin", &image, &[7], &PatchOptions::default())
            .unwrap_err();
        assert!(matches!(
            err.kind,
            PatchErrorKind::FieldOutOfBounds {
                field: "sector table",
                offset: 28
            }
        ));
    }
}
