//! Synthetic `ldlinux.sys` images

#![allow(dead_code)]

use morpheus_syslinux::LDLINUX_MAGIC;

/// Patch area offset inside the stub
pub const SIGNATURE_AT: usize = 0x40;
/// Extended patch area
pub const EPA_AT: usize = 0x80;
/// ADV pointer slots
pub const ADV_PTR_AT: usize = 0x100;
/// Install directory slot
pub const DIR_AT: usize = 0x120;
/// Install directory slot size
pub const DIR_LEN: usize = 16;
/// Subvolume slot
pub const SUBVOL_AT: usize = 0x140;
/// Subvolume slot size
pub const SUBVOL_LEN: usize = 8;
/// Sector table
pub const TABLE_AT: usize = 0x200;
/// Bytes per table slot
pub const SLOT_SIZE: usize = 10;
/// Boot sector offsets of the first sector pointer and the RAID word
pub const SECT1_LO: usize = 0x1F8;
pub const SECT1_HI: usize = 0x1FC;
pub const RAID_AT: usize = 0x1F0;

fn put16(image: &mut [u8], at: usize, value: usize) {
    image[at..at + 2].copy_from_slice(&(value as u16).to_le_bytes());
}

/// A loader of `sectors` 512-byte sectors with `capacity` table slots
///
/// Filler bytes are non-zero so the checksum covers real data.
pub fn stub_ldlinux(sectors: usize, capacity: usize) -> Vec<u8> {
    let mut image: Vec<u8> = (0..sectors * 512).map(|i| (i * 7 + 3) as u8).collect();

    image[SIGNATURE_AT..SIGNATURE_AT + 0x18].fill(0);
    image[SIGNATURE_AT..SIGNATURE_AT + 4].copy_from_slice(&LDLINUX_MAGIC.to_le_bytes());
    image[SIGNATURE_AT + 4..SIGNATURE_AT + 8].copy_from_slice(&0xDEAD_BEEFu32.to_le_bytes());
    put16(&mut image, SIGNATURE_AT + 0x14, 127);
    put16(&mut image, SIGNATURE_AT + 0x16, EPA_AT);

    let epa = [
        ADV_PTR_AT, DIR_AT, DIR_LEN, SUBVOL_AT, SUBVOL_LEN, TABLE_AT, capacity, SECT1_LO,
        SECT1_HI, RAID_AT,
    ];
    for (i, value) in epa.into_iter().enumerate() {
        put16(&mut image, EPA_AT + i * 2, value);
    }

    image[TABLE_AT..TABLE_AT + capacity * SLOT_SIZE].fill(0);
    image
}

/// `(start, len)` pairs stored in the table of a patched stub
pub fn read_table(image: &[u8], capacity: usize) -> Vec<(u64, u16)> {
    (0..capacity)
        .map(|i| {
            let at = TABLE_AT + i * SLOT_SIZE;
            let start = u64::from_le_bytes(image[at..at + 8].try_into().unwrap());
            let len = u16::from_le_bytes(image[at + 8..at + 10].try_into().unwrap());
            (start, len)
        })
        .take_while(|&(_, len)| len != 0)
        .collect()
}

/// Little-endian u16 at `at`
pub fn read16(image: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([image[at], image[at + 1]])
}

/// Little-endian u32 at `at`
pub fn read32(image: &[u8], at: usize) -> u32 {
    u32::from_le_bytes(image[at..at + 4].try_into().unwrap())
}

/// Little-endian u64 at `at`
pub fn read64(image: &[u8], at: usize) -> u64 {
    u64::from_le_bytes(image[at..at + 8].try_into().unwrap())
}
