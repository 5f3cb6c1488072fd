//! SYSLINUX sector map patching
//!
//! `ldlinux.sys` only loads its first sector through the boot sector; the
//! rest of the image is found through a run-length encoded sector table
//! inside the file itself. After the file has been written to a medium,
//! the installer learns which sectors it landed on and patches the table,
//! a few header fields and the checksum to match.
//!
//! This crate computes those patches. It does not read devices or find
//! sectors; callers supply the file bytes and the sector list.
//!
//! ```ignore
//! use morpheus_syslinux::{apply_patches, calculate_patches, required_sectors};
//!
//! let sectors = lookup_sectors("ldlinux.sys", required_sectors(image.len()));
//! let patches = calculate_patches("ldlinux.sys", &image, &sectors)?;
//! apply_patches(&mut image, "ldlinux.sys", &patches)?;
//! ```
//!
//! Other loaders are handled by describing their reserved area with a
//! [`LoaderLayout`] and calling [`calculate_patches_with`].

#![no_std]
#![warn(missing_docs)]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

pub mod checksum;
pub mod engine;
pub mod error;
pub mod extent;
pub mod layout;
pub mod ldlinux;
pub mod options;
pub mod patch;

pub use engine::{calculate_patches, calculate_patches_with};
pub use error::{PatchError, PatchErrorKind, PatchStage, Result};
pub use extent::{encode_runs, expand_runs, SectorRun};
pub use layout::{
    Anchor, Capacity, ChecksumSpec, Field, LoaderLayout, PathSlot, RunEntry, RunLimit,
    SyslinuxFields, TableLocation, TableSpec, Width,
};
pub use ldlinux::{required_sectors, LDLINUX_MAGIC, LDLINUX_SYS};
pub use options::{PatchOptions, DEFAULT_BOOT_SECTOR};
pub use patch::{apply_patches, Patch};
