//! Analyzer errors

use crate::error::{Iso9660Error, SectorError};
use core::fmt;

/// Phase of image parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStage {
    /// Querying the block device
    Device,
    /// Volume descriptor set
    VolumeDescriptors,
    /// El Torito boot catalog
    BootCatalog,
    /// Directory tree walk
    DirectoryTree,
    /// Loader banner scan
    LoaderBanner,
}

impl fmt::Display for ParseStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParseStage::Device => "device",
            ParseStage::VolumeDescriptors => "volume descriptors",
            ParseStage::BootCatalog => "boot catalog",
            ParseStage::DirectoryTree => "directory tree",
            ParseStage::LoaderBanner => "loader banner",
        };
        f.write_str(name)
    }
}

/// Fatal analyzer error
///
/// Only the structures every later step depends on can fail the
/// analysis; probe failures are logged and dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzeError {
    /// The block device failed to answer a read
    ImageUnreadable {
        /// Where parsing was
        stage: ParseStage,
        /// ISO sector being read
        sector: u64,
    },

    /// The volume descriptor chain is broken
    MalformedImageStructure {
        /// Where parsing was
        stage: ParseStage,
        /// ISO sector of the offending structure
        sector: u64,
        /// What was wrong with it
        cause: Iso9660Error,
    },
}

impl AnalyzeError {
    /// Classify a low-level error
    pub fn at(stage: ParseStage, sector: u64, cause: Iso9660Error) -> Self {
        match cause {
            Iso9660Error::IoError => AnalyzeError::ImageUnreadable { stage, sector },
            cause => AnalyzeError::MalformedImageStructure {
                stage,
                sector,
                cause,
            },
        }
    }

    /// Same as [`AnalyzeError::at`] for an error that already knows its sector
    pub fn from_sector_error(stage: ParseStage, err: SectorError) -> Self {
        Self::at(stage, err.sector, err.error)
    }

    /// Stage the error occurred in
    pub fn stage(&self) -> ParseStage {
        match *self {
            AnalyzeError::ImageUnreadable { stage, .. } => stage,
            AnalyzeError::MalformedImageStructure { stage, .. } => stage,
        }
    }

    /// ISO sector the error refers to
    pub fn sector(&self) -> u64 {
        match *self {
            AnalyzeError::ImageUnreadable { sector, .. } => sector,
            AnalyzeError::MalformedImageStructure { sector, .. } => sector,
        }
    }
}

impl fmt::Display for AnalyzeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnalyzeError::ImageUnreadable { stage, sector } => {
                write!(f, "image unreadable while reading {} at sector {}", stage, sector)
            }
            AnalyzeError::MalformedImageStructure {
                stage,
                sector,
                cause,
            } => write!(f, "malformed {} at sector {}: {}", stage, sector, cause),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AnalyzeError {}
