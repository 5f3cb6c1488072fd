//! Declarative description of a loader's reserved patch area
//!
//! A loader image carries a signature followed by a fixed header. Some
//! header fields hold values the installer writes (sector counts), others
//! hold file offsets of further structures (the extended area, the sector
//! table). All integers are little endian.

use alloc::vec::Vec;

/// Integer field width
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    /// 16 bits
    U16,
    /// 32 bits
    U32,
    /// 64 bits
    U64,
}

impl Width {
    /// Size in bytes
    pub const fn bytes(self) -> usize {
        match self {
            Width::U16 => 2,
            Width::U32 => 4,
            Width::U64 => 8,
        }
    }

    /// Largest representable value
    pub const fn max(self) -> u64 {
        match self {
            Width::U16 => u16::MAX as u64,
            Width::U32 => u32::MAX as u64,
            Width::U64 => u64::MAX,
        }
    }

    /// Read a value at `offset`; `None` if it does not fit in `data`
    pub fn read(self, data: &[u8], offset: usize) -> Option<u64> {
        let bytes = data.get(offset..offset.checked_add(self.bytes())?)?;
        let mut buf = [0u8; 8];
        buf[..bytes.len()].copy_from_slice(bytes);
        Some(u64::from_le_bytes(buf))
    }

    /// Append `value` in this width; `None` if it does not fit
    pub fn encode_into(self, value: u64, out: &mut Vec<u8>) -> Option<()> {
        if value > self.max() {
            return None;
        }
        out.extend_from_slice(&value.to_le_bytes()[..self.bytes()]);
        Some(())
    }
}

/// Base a field offset is relative to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// First byte of the signature
    Signature,
    /// Start of the extended area
    Extended,
    /// Start of the file
    File,
}

/// One named integer in the reserved area
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Name used in errors
    pub name: &'static str,
    /// Base of `offset`
    pub anchor: Anchor,
    /// Offset from the anchor
    pub offset: usize,
    /// Width of the value
    pub width: Width,
}

impl Field {
    /// Describe a field
    pub const fn new(name: &'static str, anchor: Anchor, offset: usize, width: Width) -> Self {
        Self {
            name,
            anchor,
            offset,
            width,
        }
    }
}

/// Where the sector table lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableLocation {
    /// Directly at an offset from an anchor
    At(Anchor, usize),
    /// At the absolute file offset stored in a field
    Pointer(Field),
}

/// Number of slots in the sector table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capacity {
    /// Known up front
    Fixed(usize),
    /// Stored in the image
    Field(Field),
}

/// Layout of one table slot: `(start, length)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunEntry {
    /// Width of the start sector
    pub start: Width,
    /// Width of the run length
    pub length: Width,
}

impl RunEntry {
    /// Bytes per slot
    pub const fn size(&self) -> usize {
        self.start.bytes() + self.length.bytes()
    }
}

/// The run-length encoded sector table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSpec {
    /// Table position
    pub location: TableLocation,
    /// Slot count
    pub capacity: Capacity,
    /// Slot format
    pub entry: RunEntry,
    /// Leading sectors mapped somewhere else and left out of the table
    pub skip_leading: usize,
}

/// Extra constraint on how far a run may grow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunLimit {
    /// Only the slot's length width limits a run
    Unbounded,
    /// Runs are loaded to consecutive memory starting at `base`; a run
    /// stays below `max_bytes` and its last byte stays in the 64 KiB
    /// segment of the sector that extends it
    LoadWindow {
        /// Load address of the first table sector
        base: u64,
        /// Exclusive upper bound on a run's byte size
        max_bytes: u64,
    },
}

/// Image checksum algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChecksumSpec {
    /// No known checksum; nothing is emitted
    None,
    /// `seed - Σ dwords` over every complete dword, field zeroed first
    DwordComplement {
        /// Checksum field
        field: Field,
        /// Value the dword sum must reach
        seed: u32,
    },
}

/// Offset/length pair of a NUL-terminated string slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSlot {
    /// Field holding the absolute offset of the slot
    pub offset: Field,
    /// Field holding the slot size
    pub len: Field,
}

/// Fields only SYSLINUX-family loaders carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyslinuxFields {
    /// Trailing (ADV) sector count
    pub adv_sectors: Field,
    /// Number of complete dwords in the image
    pub dwords: Field,
    /// Maximum sectors per BIOS transfer
    pub max_transfer: Field,
    /// Field holding the file offset of the ADV sector pointers
    pub adv_pointers: Field,
    /// Width of each ADV sector pointer
    pub adv_pointer_width: Width,
    /// Field holding the boot sector offset of the low first-sector dword
    pub first_sector_lo: Field,
    /// Field holding the boot sector offset of the high first-sector dword
    pub first_sector_hi: Field,
    /// Field holding the boot sector offset of the RAID patch word
    pub raid_patch: Field,
    /// Install subdirectory slot
    pub subdir: PathSlot,
    /// Btrfs subvolume slot
    pub subvol: PathSlot,
}

/// Everything the encoder needs to know about a loader image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoaderLayout {
    /// Loader file name
    pub name: &'static str,
    /// Signature bytes
    pub signature: &'static [u8],
    /// Signature is searched at multiples of this
    pub signature_align: usize,
    /// Bytes per destination sector
    pub sector_size: usize,
    /// Sectors following the file data in the sector list
    pub trailing_sectors: usize,
    /// Field holding the absolute file offset of the extended area
    pub extended_area: Option<Field>,
    /// Receives the number of file sectors
    pub sector_count: Field,
    /// Sector table
    pub table: TableSpec,
    /// Run growth constraint
    pub run_limit: RunLimit,
    /// Checksum
    pub checksum: ChecksumSpec,
    /// SYSLINUX extras
    pub syslinux: Option<SyslinuxFields>,
}

impl LoaderLayout {
    /// Sectors the file content itself occupies
    pub fn file_sectors(&self, content_len: usize) -> usize {
        content_len.div_ceil(self.sector_size)
    }

    /// Length the sector list must have for `content_len` bytes
    pub fn expected_sectors(&self, content_len: usize) -> usize {
        self.file_sectors(content_len) + self.trailing_sectors
    }

    /// First aligned offset of the signature
    pub fn find_signature(&self, content: &[u8]) -> Option<usize> {
        let len = self.signature.len();
        if len == 0 || content.len() < len {
            return None;
        }
        (0..=content.len() - len)
            .step_by(self.signature_align.max(1))
            .find(|&at| &content[at..at + len] == self.signature)
    }
}
