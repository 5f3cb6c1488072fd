//! Install plans
//!
//! Decides from an [`ImageReport`] how an image should be put on a USB
//! drive. The plan only describes the steps; nothing is executed here.

use crate::resources::{Resource, ResourceLocator, UEFI_NTFS_IMAGE};
use crate::unattend::UnattendFlags;
use iso9660::{BootloaderType, ImageReport, SyslinuxVersion};
use std::fmt;

/// SYSLINUX version assumed when no banner was found
pub const FALLBACK_SYSLINUX: SyslinuxVersion = SyslinuxVersion {
    major: 6,
    minor: 4,
    ext: String::new(),
};

/// Where the answer file goes on the target
pub const UNATTEND_PATH: &str = "/autounattend.xml";

/// Kind of installation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    /// Windows setup media
    Windows,
    /// SYSLINUX-booted media
    Syslinux,
    /// Files copied to FAT32, booted by the loader already on the image
    FileCopy,
    /// Image written as is
    RawWrite,
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlanKind::Windows => "Windows",
            PlanKind::Syslinux => "SYSLINUX",
            PlanKind::FileCopy => "file copy",
            PlanKind::RawWrite => "raw write",
        };
        f.write_str(name)
    }
}

/// One step of a plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Create a file system on the target
    Format {
        /// File system name
        filesystem: &'static str,
    },
    /// Extract every file of the image to the target
    CopyFiles,
    /// Write the whole image to the device
    WriteImage,
    /// Place a generated answer file
    WriteUnattend {
        /// Destination on the target
        path: &'static str,
        /// Sections it contains
        flags: UnattendFlags,
    },
    /// Copy a loader resource to the target
    InstallResource {
        /// Name on the target
        name: &'static str,
        /// Where it comes from
        resource: Resource,
    },
    /// Map the installed loader's sectors and patch it
    PatchLoader {
        /// Loader file on the target
        loader: &'static str,
        /// Boot sector receiving the first sector pointer
        boot_sector: &'static str,
    },
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Format { filesystem } => write!(f, "format the target as {}", filesystem),
            Step::CopyFiles => f.write_str("copy all image files to the target"),
            Step::WriteImage => f.write_str("write the image to the device"),
            Step::WriteUnattend { path, flags } => {
                write!(f, "write answer file {} (flags {:#x})", path, flags.bits())
            }
            Step::InstallResource { name, resource } => write!(f, "install {}: {}", name, resource),
            Step::PatchLoader {
                loader,
                boot_sector,
            } => write!(f, "patch {} sector map and {}", loader, boot_sector),
        }
    }
}

/// Steps for one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    /// Kind of installation
    pub kind: PlanKind,
    /// SYSLINUX version the resources were chosen for
    pub syslinux: Option<SyslinuxVersion>,
    /// Ordered steps
    pub steps: Vec<Step>,
}

impl InstallPlan {
    /// Resources that must be downloaded before installing
    pub fn missing_resources(&self) -> impl Iterator<Item = &Resource> {
        self.steps.iter().filter_map(|step| match step {
            Step::InstallResource { resource, .. } if matches!(resource, Resource::Download(_)) => {
                Some(resource)
            }
            _ => None,
        })
    }
}

/// Choose how to install an analyzed image
pub fn build_plan(report: &ImageReport, locator: &ResourceLocator, flags: UnattendFlags) -> InstallPlan {
    let tags = &report.bootloaders;
    let uefi = tags.contains(BootloaderType::UefiRemovable) || tags.contains(BootloaderType::UefiElTorito);

    let plan = if tags.contains(BootloaderType::Windows) {
        let mut steps = vec![Step::Format { filesystem: "NTFS" }, Step::CopyFiles];
        steps.push(Step::WriteUnattend {
            path: UNATTEND_PATH,
            flags,
        });
        if uefi {
            steps.push(Step::InstallResource {
                name: UEFI_NTFS_IMAGE,
                resource: locator.locate(UEFI_NTFS_IMAGE, None, ""),
            });
        }
        InstallPlan {
            kind: PlanKind::Windows,
            syslinux: None,
            steps,
        }
    } else if tags.contains(BootloaderType::Syslinux) || tags.contains(BootloaderType::IsolinuxCatalog) {
        let version = report.syslinux_version.clone().unwrap_or(FALLBACK_SYSLINUX);
        let mut steps = vec![Step::Format { filesystem: "FAT32" }, Step::CopyFiles];
        for name in ["ldlinux.sys", "ldlinux.bss"] {
            steps.push(Step::InstallResource {
                name,
                resource: locator.locate_syslinux(name, &version),
            });
        }
        steps.push(Step::PatchLoader {
            loader: "ldlinux.sys",
            boot_sector: "ldlinux.bss",
        });
        InstallPlan {
            kind: PlanKind::Syslinux,
            syslinux: Some(version),
            steps,
        }
    } else if uefi || tags.contains(BootloaderType::Grub2) || tags.contains(BootloaderType::GrubLegacy) {
        InstallPlan {
            kind: PlanKind::FileCopy,
            syslinux: None,
            steps: vec![Step::Format { filesystem: "FAT32" }, Step::CopyFiles],
        }
    } else {
        InstallPlan {
            kind: PlanKind::RawWrite,
            syslinux: None,
            steps: vec![Step::WriteImage],
        }
    };

    tracing::info!(kind = %plan.kind, steps = plan.steps.len(), "install plan");
    plan
}
