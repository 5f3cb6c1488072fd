//! `ldlinux.sys` reserved area
//!
//! ```text
//! patch area (at the signature)         extended patch area (at epaoffset)
//! 0x00  u32  magic 0x3EB202FE           0x00  u16  advptroffset
//! 0x04  u32  instance                   0x02  u16  diroffset
//! 0x08  u16  data_sectors               0x04  u16  dirlen
//! 0x0A  u16  adv_sectors                0x06  u16  subvoloffset
//! 0x0C  u32  dwords                     0x08  u16  subvollen
//! 0x10  u32  checksum                   0x0A  u16  secptroffset
//! 0x14  u16  maxtransfer                0x0C  u16  secptrcnt
//! 0x16  u16  epaoffset                  0x0E  u16  sect1ptr0
//!                                       0x10  u16  sect1ptr1
//!                                       0x12  u16  raidpatch
//! ```
//!
//! Offsets stored in the extended area are absolute file offsets, except
//! `sect1ptr0`, `sect1ptr1` and `raidpatch` which point into the boot
//! sector. Sector table slots are `(u64 lba, u16 len)`, packed.

use crate::layout::{
    Anchor, Capacity, ChecksumSpec, Field, LoaderLayout, PathSlot, RunEntry, RunLimit,
    SyslinuxFields, TableLocation, TableSpec, Width,
};

/// Signature of the patch area
pub const LDLINUX_MAGIC: u32 = 0x3EB2_02FE;

const MAGIC_BYTES: [u8; 4] = LDLINUX_MAGIC.to_le_bytes();

/// Bytes per destination sector
pub const SECTOR_SIZE: usize = 512;

/// Auxiliary data vector sectors following the image
pub const ADV_SECTORS: usize = 2;

/// Load address of the first table sector
pub const LOAD_ADDRESS: u64 = 0x8000;

/// `int 18h`, written over the boot sector's error path in RAID mode
pub const RAID_PATCH: u16 = 0x18CD;

/// Size of the companion boot sector
pub const BOOT_SECTOR_SIZE: usize = 512;

const fn patch_area(name: &'static str, offset: usize, width: Width) -> Field {
    Field::new(name, Anchor::Signature, offset, width)
}

const fn epa(name: &'static str, offset: usize) -> Field {
    Field::new(name, Anchor::Extended, offset, Width::U16)
}

/// Layout of `ldlinux.sys`
pub const LDLINUX_SYS: LoaderLayout = LoaderLayout {
    name: "ldlinux.sys",
    signature: &MAGIC_BYTES,
    signature_align: 4,
    sector_size: SECTOR_SIZE,
    trailing_sectors: ADV_SECTORS,
    extended_area: Some(patch_area("epaoffset", 0x16, Width::U16)),
    sector_count: patch_area("data_sectors", 0x08, Width::U16),
    table: TableSpec {
        location: TableLocation::Pointer(epa("secptroffset", 0x0A)),
        capacity: Capacity::Field(epa("secptrcnt", 0x0C)),
        entry: RunEntry {
            start: Width::U64,
            length: Width::U16,
        },
        skip_leading: 1,
    },
    run_limit: RunLimit::LoadWindow {
        base: LOAD_ADDRESS,
        max_bytes: 65536,
    },
    checksum: ChecksumSpec::DwordComplement {
        field: patch_area("checksum", 0x10, Width::U32),
        seed: LDLINUX_MAGIC,
    },
    syslinux: Some(SyslinuxFields {
        adv_sectors: patch_area("adv_sectors", 0x0A, Width::U16),
        dwords: patch_area("dwords", 0x0C, Width::U32),
        max_transfer: patch_area("maxtransfer", 0x14, Width::U16),
        adv_pointers: epa("advptroffset", 0x00),
        adv_pointer_width: Width::U64,
        first_sector_lo: epa("sect1ptr0", 0x0E),
        first_sector_hi: epa("sect1ptr1", 0x10),
        raid_patch: epa("raidpatch", 0x12),
        subdir: PathSlot {
            offset: epa("diroffset", 0x02),
            len: epa("dirlen", 0x04),
        },
        subvol: PathSlot {
            offset: epa("subvoloffset", 0x06),
            len: epa("subvollen", 0x08),
        },
    }),
};

/// Sector list length for an `ldlinux.sys` of `len` bytes
pub fn required_sectors(len: usize) -> usize {
    LDLINUX_SYS.expected_sectors(len)
}
