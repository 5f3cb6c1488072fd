//! MorpheusX USB installer
//!
//! Host-side glue around the `iso9660` analyzer and the SYSLINUX patch
//! engine: image files as block devices, physical sector lookup, Windows
//! answer files, bundled loader resources and install planning.
//!
//! Nothing in this crate writes to a block device.

pub mod image;
pub mod loader;
pub mod plan;
pub mod resources;
pub mod sectors;
pub mod unattend;

pub use image::FileBlockIo;
pub use loader::{patch_loader, sector_map, LoaderError, PatchedLoader};
pub use plan::{build_plan, InstallPlan, PlanKind, Step};
pub use resources::{DownloadInstruction, Resource, ResourceLocator};
pub use sectors::{FilefragSource, SectorListFile, SectorSource, SectorSourceError};
pub use unattend::{bypass_registry_keys, generate_unattend_xml, UnattendFlags};
