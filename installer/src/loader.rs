//! Loader patching on host files
//!
//! Joins a [`SectorSource`] to the patch engine: look up where the
//! installed loader lives, compute the patches and apply them to copies
//! of the loader and its boot sector.

use crate::sectors::{SectorSource, SectorSourceError};
use morpheus_syslinux::{
    apply_patches, calculate_patches_with, required_sectors, Patch, PatchError, PatchOptions,
    LDLINUX_SYS,
};
use std::path::Path;
use thiserror::Error;

/// Failure while patching a loader
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error(transparent)]
    Sectors(#[from] SectorSourceError),

    #[error(transparent)]
    Patch(#[from] PatchError),

    #[error("installed loader maps {actual} sectors, {needed} needed")]
    TooFewSectors { needed: usize, actual: usize },

    #[error("no patch area found in {0}")]
    NoPatchArea(String),
}

/// Patched copies, ready to be written out
#[derive(Debug, Clone)]
pub struct PatchedLoader {
    /// Loader image with its sector map filled in
    pub loader: Vec<u8>,
    /// Boot sector with the first sector pointer, if one was supplied
    pub boot_sector: Option<Vec<u8>>,
    /// Every patch, in the order applied
    pub patches: Vec<Patch>,
}

/// Sector list for a loader of `content_len` bytes installed at `installed`
///
/// The installed file carries the ADV sectors after the image, so its map
/// is at least as long as the engine needs; extra sectors are dropped.
pub fn sector_map(
    source: &dyn SectorSource,
    installed: &Path,
    content_len: usize,
) -> Result<Vec<u64>, LoaderError> {
    let mut sectors = source.physical_sectors(installed)?;
    let needed = required_sectors(content_len);
    if sectors.len() < needed {
        return Err(LoaderError::TooFewSectors {
            needed,
            actual: sectors.len(),
        });
    }
    sectors.truncate(needed);
    Ok(sectors)
}

/// Patch `content` (named `loader_name`) and, if given, its boot sector
pub fn patch_loader(
    loader_name: &str,
    content: &[u8],
    boot_sector: Option<&[u8]>,
    sectors: &[u64],
    options: &PatchOptions,
) -> Result<PatchedLoader, LoaderError> {
    let options = match boot_sector {
        Some(_) => options.clone(),
        None => options.clone().boot_sector(None),
    };

    let patches = calculate_patches_with(&LDLINUX_SYS, loader_name, content, sectors, &options)?;
    if patches.is_empty() {
        return Err(LoaderError::NoPatchArea(loader_name.to_string()));
    }

    let mut loader = content.to_vec();
    let applied = apply_patches(&mut loader, loader_name, &patches)?;

    let boot_sector = match (boot_sector, options.boot_sector_path.as_deref()) {
        (Some(bytes), Some(path)) => {
            let mut bytes = bytes.to_vec();
            apply_patches(&mut bytes, path, &patches)?;
            Some(bytes)
        }
        _ => None,
    };

    tracing::info!(
        loader = loader_name,
        patches = patches.len(),
        loader_patches = applied,
        "loader patched"
    );
    Ok(PatchedLoader {
        loader,
        boot_sector,
        patches,
    })
}
