//! Error types for patch computation

use alloc::string::String;
use core::fmt;

/// Result type for patch operations
pub type Result<T> = core::result::Result<T, PatchError>;

/// Phase of patch computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchStage {
    /// Scanning for the loader signature
    SignatureSearch,
    /// Reading the reserved area fields
    AreaDecode,
    /// Building the sector table and pointer fields
    TableEncoding,
    /// Recomputing the image checksum
    Checksum,
    /// Writing patches into a buffer
    Apply,
}

impl fmt::Display for PatchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PatchStage::SignatureSearch => "signature search",
            PatchStage::AreaDecode => "area decode",
            PatchStage::TableEncoding => "table encoding",
            PatchStage::Checksum => "checksum",
            PatchStage::Apply => "apply",
        };
        f.write_str(name)
    }
}

/// What went wrong
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchErrorKind {
    /// More sector runs than table slots
    PatchAreaTooSmall {
        /// Runs needed
        runs: usize,
        /// Slots available
        capacity: usize,
    },

    /// The sector list does not cover the file plus its trailing sectors
    SectorCountMismatch {
        /// Sectors required
        expected: usize,
        /// Sectors supplied
        actual: usize,
    },

    /// A field or region lies (partly) outside the buffer it belongs to
    FieldOutOfBounds {
        /// Field name
        field: &'static str,
        /// Absolute offset of the field
        offset: usize,
    },

    /// A value does not fit the width of its field
    ValueOverflow {
        /// Field name
        field: &'static str,
        /// Value that did not fit
        value: u64,
    },

    /// A path string, NUL included, is longer than its slot
    PathTooLong {
        /// Field name
        field: &'static str,
        /// Bytes needed
        len: usize,
        /// Slot size
        capacity: usize,
    },
}

impl fmt::Display for PatchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::PatchAreaTooSmall { runs, capacity } => {
                write!(f, "{} sector runs exceed table capacity {}", runs, capacity)
            }
            Self::SectorCountMismatch { expected, actual } => {
                write!(f, "expected {} sectors, got {}", expected, actual)
            }
            Self::FieldOutOfBounds { field, offset } => {
                write!(f, "field {} at offset {:#x} is out of bounds", field, offset)
            }
            Self::ValueOverflow { field, value } => {
                write!(f, "value {} does not fit field {}", value, field)
            }
            Self::PathTooLong {
                field,
                len,
                capacity,
            } => write!(f, "{} needs {} bytes, slot holds {}", field, len, capacity),
        }
    }
}

/// Fatal patch computation error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchError {
    /// File being patched
    pub file: String,
    /// Where it failed
    pub stage: PatchStage,
    /// Why
    pub kind: PatchErrorKind,
}

impl PatchError {
    /// Build an error for `file`
    pub fn new(file: &str, stage: PatchStage, kind: PatchErrorKind) -> Self {
        Self {
            file: String::from(file),
            stage,
            kind,
        }
    }
}

impl fmt::Display for PatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} failed: {}", self.file, self.stage, self.kind)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for PatchError {}
