//! ISO9660 Filesystem Implementation
//!
//! A `no_std` ISO9660 reader with El Torito catalog parsing and bootloader
//! classification of disc images.
//!
//! # Overview
//!
//! - Volume descriptor parsing (Primary, Supplementary, Boot Record)
//! - Directory tree navigation and bounded tree walks
//! - File reading from extent-based storage
//! - El Torito boot catalog parsing, section entries included
//! - Bootloader classification (`analysis`)
//!
//! Any `gpt_disk_io::BlockIo` works as the backing device; block sizes
//! other than 2048 are translated by [`utils::sector::SectorReader`].
//!
//! # Usage
//!
//! ```ignore
//! use iso9660::{mount, find_file, read_file_vec};
//!
//! let volume = mount(&mut block_io, 0)?;
//! let file = find_file(&mut block_io, &volume, "/isolinux/isolinux.bin")?;
//! let data = read_file_vec(&mut block_io, &volume, &file)?;
//! ```
//!
//! # Classification
//!
//! ```ignore
//! use iso9660::{analyze, BootloaderType};
//!
//! let tags = analyze(&mut block_io)?;
//! if tags.contains(BootloaderType::Syslinux) {
//!     // install SYSLINUX
//! }
//! ```

#![no_std]
#![warn(missing_docs)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod analysis;
pub mod boot;
pub mod directory;
pub mod error;
pub mod file;
pub mod types;
pub mod utils;
pub mod volume;

pub use error::{Iso9660Error, Result, SectorError};
pub use types::{BootImage, BootMediaType, BootPlatform, FileEntry, VolumeInfo};

// High-level API exports
pub use analysis::{
    analyze, analyze_image, AnalyzeError, AnalyzeLimits, BootloaderSet, BootloaderType,
    ImageReport, ParseStage, SyslinuxVersion,
};
pub use boot::{find_boot_image, BootCatalog};
pub use directory::find_file;
pub use file::{read_file, read_file_vec};
pub use volume::mount;
