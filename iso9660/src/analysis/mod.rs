//! Bootloader classification of disc images
//!
//! Reads the volume descriptors, the El Torito catalog and the directory
//! tree of an image and reports which boot mechanisms it carries. The
//! probes are independent: each one that fails logs a warning and adds no
//! tags, so a broken boot catalog never hides `/EFI/BOOT/BOOTX64.EFI`.
//!
//! Only a broken descriptor chain or an unreadable device fails the whole
//! analysis. Anything that is not ISO9660 at all yields an empty set.

pub mod bootloader;
pub mod error;
pub mod rules;
pub mod version;

pub use bootloader::{BootloaderSet, BootloaderType};
pub use error::{AnalyzeError, ParseStage};
pub use version::SyslinuxVersion;

use crate::boot::read_boot_catalog;
use crate::directory::walk::{child_path, walk_tree, WalkLimits, WalkSummary};
use crate::file::read_file_prefix;
use crate::types::{BootImage, BootPlatform, FileEntry, VolumeInfo, MAX_DIRECTORY_DEPTH};
use crate::utils::sector::SectorReader;
use crate::volume::read_descriptor_set;
use alloc::string::String;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

/// Default number of leading bytes scanned for a loader banner
pub const DEFAULT_VERSION_PROBE_BYTES: usize = 64 * 1024;

/// Bounds on the work one analysis may do
#[derive(Debug, Clone)]
pub struct AnalyzeLimits {
    /// Deepest directory level walked (root is level 0)
    pub max_depth: usize,
    /// Directory entries visited before the walk stops
    pub max_entries: usize,
    /// Leading bytes of a loader binary searched for its banner
    pub version_probe_bytes: usize,
}

impl Default for AnalyzeLimits {
    fn default() -> Self {
        Self {
            max_depth: MAX_DIRECTORY_DEPTH,
            max_entries: 4096,
            version_probe_bytes: DEFAULT_VERSION_PROBE_BYTES,
        }
    }
}

impl AnalyzeLimits {
    /// Set directory walk bounds.
    pub fn walk(mut self, max_depth: usize, max_entries: usize) -> Self {
        self.max_depth = max_depth;
        self.max_entries = max_entries;
        self
    }

    /// Set banner scan size.
    pub fn version_probe(mut self, bytes: usize) -> Self {
        self.version_probe_bytes = bytes;
        self
    }

    fn walk_limits(&self) -> WalkLimits {
        WalkLimits {
            max_depth: self.max_depth,
            max_entries: self.max_entries,
        }
    }
}

/// Everything learned about an image
#[derive(Debug, Clone, Default)]
pub struct ImageReport {
    /// Boot mechanisms found
    pub bootloaders: BootloaderSet,
    /// A volume descriptor set was found at sector 16
    pub is_iso9660: bool,
    /// Volume label of the primary descriptor
    pub volume_label: String,
    /// Boot catalog entries, initial entry first
    pub boot_entries: Vec<BootImage>,
    /// Version from the first loader banner found
    pub syslinux_version: Option<SyslinuxVersion>,
    /// Path of the file the version was read from
    pub syslinux_banner_path: Option<String>,
    /// Coverage of the directory walk
    pub walk: WalkSummary,
}

/// Classify the boot mechanisms of an image
///
/// # Arguments
/// * `block_io` - Device holding the image at block 0
///
/// # Returns
/// The set of recognized mechanisms (empty if none)
pub fn analyze<B: BlockIo>(block_io: &mut B) -> Result<BootloaderSet, AnalyzeError> {
    analyze_image(block_io, &AnalyzeLimits::default()).map(|report| report.bootloaders)
}

/// Full analysis with explicit limits
pub fn analyze_image<B: BlockIo>(
    block_io: &mut B,
    limits: &AnalyzeLimits,
) -> Result<ImageReport, AnalyzeError> {
    let mut reader =
        SectorReader::new(block_io, 0).map_err(|e| AnalyzeError::at(ParseStage::Device, 0, e))?;
    let mut report = ImageReport::default();

    let set = match read_descriptor_set(&mut reader)
        .map_err(|e| AnalyzeError::from_sector_error(ParseStage::VolumeDescriptors, e))?
    {
        Some(set) => set,
        None => {
            tracing::debug!(sectors = reader.sector_count(), "no ISO9660 descriptor set");
            return Ok(report);
        }
    };
    report.is_iso9660 = true;
    tracing::debug!(descriptors = set.descriptor_count, "descriptor set parsed");

    if let Some(catalog_lba) = set.boot_catalog_lba {
        probe_el_torito(&mut reader, catalog_lba, &mut report);
    }

    match set.primary {
        Some(volume) => {
            report.volume_label = String::from(volume.volume_label());
            probe_filesystem(&mut reader, &volume, limits, &mut report);
        }
        None => tracing::warn!("descriptor set has no primary volume, skipping filesystem probes"),
    }

    tracing::debug!(bootloaders = %report.bootloaders, "analysis complete");
    Ok(report)
}

/// Tags from the bootable catalog entries
fn probe_el_torito<B: BlockIo>(
    reader: &mut SectorReader<'_, B>,
    catalog_lba: u32,
    report: &mut ImageReport,
) {
    let catalog = match read_boot_catalog(reader, catalog_lba) {
        Ok(catalog) => catalog,
        Err(e) => {
            tracing::warn!(
                stage = %ParseStage::BootCatalog,
                sector = catalog_lba,
                error = %e,
                "boot catalog probe failed"
            );
            return;
        }
    };

    for entry in catalog.bootable_entries() {
        match entry.platform {
            BootPlatform::X86 => report.bootloaders.insert(BootloaderType::BiosElTorito),
            BootPlatform::Efi => report.bootloaders.insert(BootloaderType::UefiElTorito),
            other => tracing::debug!(platform = ?other, "ignoring catalog entry platform"),
        }
    }
    report.boot_entries = catalog.entries;
}

/// Filename rules, the isolinux catalog rule and the banner scan
fn probe_filesystem<B: BlockIo>(
    reader: &mut SectorReader<'_, B>,
    volume: &VolumeInfo,
    limits: &AnalyzeLimits,
    report: &mut ImageReport,
) {
    let mut tags = BootloaderSet::new();
    let mut isolinux_extents = Vec::new();
    let mut banner_candidates: Vec<(usize, String, FileEntry)> = Vec::new();

    report.walk = walk_tree(reader, volume, limits.walk_limits(), |parent, entry| {
        tags.extend_from(rules::classify(parent, entry));

        if let Some(rank) = rules::banner_rank(entry) {
            if rank == 0 {
                isolinux_extents.push(entry.extent_lba);
            }
            banner_candidates.push((rank, child_path(parent, &entry.name), entry.clone()));
        }
    });
    if report.walk.failed_directories > 0 {
        tracing::warn!(
            stage = %ParseStage::DirectoryTree,
            failed = report.walk.failed_directories,
            "directory probe incomplete"
        );
    }
    report.bootloaders.extend_from(tags);

    let catalog_loads_isolinux = report.boot_entries.iter().any(|entry| {
        entry.bootable
            && entry.platform == BootPlatform::X86
            && isolinux_extents.contains(&entry.load_rba)
    });
    if catalog_loads_isolinux {
        report.bootloaders.insert(BootloaderType::IsolinuxCatalog);
    }

    // stable sort keeps walk order within a rank
    banner_candidates.sort_by_key(|(rank, _, _)| *rank);
    for (_, path, entry) in banner_candidates {
        let prefix = match read_file_prefix(reader, &entry, limits.version_probe_bytes) {
            Ok(prefix) => prefix,
            Err(e) => {
                tracing::warn!(
                    stage = %ParseStage::LoaderBanner,
                    path = path.as_str(),
                    error = %e,
                    "cannot read loader"
                );
                continue;
            }
        };

        if let Some(version) = SyslinuxVersion::parse_banner(&prefix) {
            tracing::debug!(path = path.as_str(), version = %version, "loader banner");
            report.syslinux_version = Some(version);
            report.syslinux_banner_path = Some(path);
            break;
        }
    }
}
