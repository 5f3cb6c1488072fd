//! Error types for ISO9660 operations

use core::fmt;

/// Result type for ISO9660 operations
pub type Result<T> = core::result::Result<T, Iso9660Error>;

/// Errors that can occur while reading ISO9660 structures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Iso9660Error {
    /// I/O error reading from block device
    IoError,

    /// Invalid volume descriptor signature
    InvalidSignature,

    /// Unsupported ISO9660 version
    UnsupportedVersion,

    /// Volume descriptor set has no terminator within the image
    UnterminatedDescriptorSet,

    /// Corrupted directory record
    InvalidDirectoryRecord,

    /// File or directory not found
    NotFound,

    /// Path is too long
    PathTooLong,

    /// Sector or extent lies outside the image
    ExtentOutOfBounds,

    /// No El Torito boot record in the descriptor set
    NoBootRecord,

    /// Invalid boot catalog
    InvalidBootCatalog,

    /// No boot catalog found
    NoBootCatalog,

    /// Invalid boot entry
    InvalidBootEntry,

    /// Validation entry checksum failed
    ChecksumFailed,

    /// Destination buffer too small
    ReadFailed,
}

impl fmt::Display for Iso9660Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IoError => write!(f, "I/O error reading block device"),
            Self::InvalidSignature => write!(f, "Invalid volume descriptor signature"),
            Self::UnsupportedVersion => write!(f, "Unsupported ISO9660 version"),
            Self::UnterminatedDescriptorSet => {
                write!(f, "Volume descriptor set is not terminated")
            }
            Self::InvalidDirectoryRecord => write!(f, "Corrupted directory record"),
            Self::NotFound => write!(f, "File or directory not found"),
            Self::PathTooLong => write!(f, "Path exceeds maximum length"),
            Self::ExtentOutOfBounds => write!(f, "Extent lies outside the image"),
            Self::NoBootRecord => write!(f, "Boot record volume descriptor not found"),
            Self::InvalidBootCatalog => write!(f, "Invalid El Torito boot catalog"),
            Self::NoBootCatalog => write!(f, "No boot catalog found"),
            Self::InvalidBootEntry => write!(f, "Invalid boot entry"),
            Self::ChecksumFailed => write!(f, "Validation entry checksum failed"),
            Self::ReadFailed => write!(f, "Read operation failed"),
        }
    }
}

/// An [`Iso9660Error`] tied to the ISO sector being processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectorError {
    /// ISO sector relative to the volume start
    pub sector: u64,
    /// Underlying error
    pub error: Iso9660Error,
}

impl SectorError {
    /// Attach a sector to an error
    pub fn new(sector: u64, error: Iso9660Error) -> Self {
        Self { sector, error }
    }
}

impl fmt::Display for SectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (sector {})", self.error, self.sector)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Iso9660Error {}

#[cfg(feature = "std")]
impl std::error::Error for SectorError {}
