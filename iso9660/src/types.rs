//! Common types and constants for ISO9660

use alloc::string::String;

/// ISO9660 sector size (always 2048 bytes)
pub const SECTOR_SIZE: usize = 2048;

/// Volume descriptor set starts at sector 16
pub const VOLUME_DESCRIPTOR_START: u64 = 16;

/// Upper bound on descriptors read before the terminator must appear
pub const MAX_VOLUME_DESCRIPTORS: u64 = 64;

/// Maximum path length
pub const MAX_PATH_LENGTH: usize = 255;

/// Maximum directory depth
pub const MAX_DIRECTORY_DEPTH: usize = 8;

/// Volume descriptor type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeDescriptorType {
    /// Boot Record (El Torito)
    BootRecord,
    /// Primary Volume Descriptor
    Primary,
    /// Supplementary Volume Descriptor (Joliet)
    Supplementary,
    /// Volume Partition Descriptor
    Partition,
    /// Volume Descriptor Set Terminator
    Terminator,
    /// Reserved type code
    Reserved(u8),
}

impl VolumeDescriptorType {
    /// Map a raw type code
    pub fn from_code(code: u8) -> Self {
        match code {
            0 => Self::BootRecord,
            1 => Self::Primary,
            2 => Self::Supplementary,
            3 => Self::Partition,
            255 => Self::Terminator,
            other => Self::Reserved(other),
        }
    }
}

/// Parsed volume information
#[derive(Debug, Clone)]
pub struct VolumeInfo {
    /// First ISO sector of the volume on the device (0 for a raw image)
    pub start_sector: u64,

    /// Volume identifier (32 chars)
    pub volume_id: [u8; 32],

    /// Root directory extent location (LBA)
    pub root_extent_lba: u32,

    /// Root directory extent length (bytes)
    pub root_extent_len: u32,

    /// Logical block size (usually 2048)
    pub logical_block_size: u16,

    /// Volume space size (total sectors)
    pub volume_space_size: u32,

    /// El Torito boot catalog LBA (if present)
    pub boot_catalog_lba: Option<u32>,

    /// Whether a Joliet supplementary descriptor is present
    pub has_joliet: bool,
}

impl VolumeInfo {
    /// Volume identifier with padding removed
    pub fn volume_label(&self) -> &str {
        crate::utils::string::dchars_to_str(&self.volume_id).unwrap_or("")
    }
}

/// File entry metadata
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// File identifier (version suffix stripped)
    pub name: String,

    /// File size in bytes
    pub size: u64,

    /// Extent location (LBA)
    pub extent_lba: u32,

    /// Data length (bytes)
    pub data_length: u32,

    /// File flags
    pub flags: FileFlags,
}

impl FileEntry {
    /// Is this a directory?
    pub fn is_directory(&self) -> bool {
        self.flags.directory
    }

    /// Is this a regular file?
    pub fn is_file(&self) -> bool {
        !self.flags.directory
    }
}

/// File flags from directory record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FileFlags {
    /// Hidden file
    pub hidden: bool,

    /// Directory (not a file)
    pub directory: bool,

    /// Associated file
    pub associated: bool,

    /// Not final directory record for this file
    pub not_final: bool,
}

impl FileFlags {
    /// Decode the flags byte of a directory record
    pub fn from_bits(bits: u8) -> Self {
        Self {
            hidden: bits & 0x01 != 0,
            directory: bits & 0x02 != 0,
            associated: bits & 0x04 != 0,
            not_final: bits & 0x80 != 0,
        }
    }
}

/// Boot image information (one El Torito catalog entry)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootImage {
    /// Bootable flag
    pub bootable: bool,

    /// Boot media type
    pub media_type: BootMediaType,

    /// Load segment (x86)
    pub load_segment: u16,

    /// System type
    pub system_type: u8,

    /// Sector count (512-byte virtual sectors)
    pub sector_count: u16,

    /// Image location (ISO sector)
    pub load_rba: u32,

    /// Platform this entry targets
    pub platform: BootPlatform,
}

/// Boot media type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootMediaType {
    /// No emulation
    NoEmulation,
    /// 1.2MB floppy
    Floppy12M,
    /// 1.44MB floppy
    Floppy144M,
    /// 2.88MB floppy
    Floppy288M,
    /// Hard disk
    HardDisk,
}

/// Boot platform ID
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootPlatform {
    /// x86 PC
    X86,
    /// PowerPC
    PowerPC,
    /// Mac
    Mac,
    /// EFI
    Efi,
    /// Unassigned platform id
    Other(u8),
}
