//! Installer choices that change the patch set

use alloc::string::String;

/// Default companion boot sector file
pub const DEFAULT_BOOT_SECTOR: &str = "ldlinux.bss";

/// Patch options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchOptions {
    /// File receiving the boot sector patches; `None` skips them
    pub boot_sector_path: Option<String>,
    /// Fall back to the next BIOS boot device (`int 18h`) on failure
    pub raid_mode: bool,
    /// Transfer one sector at a time for broken BIOSes
    pub stupid_mode: bool,
    /// Directory the loader is installed in
    pub subdir: Option<String>,
    /// Btrfs subvolume holding the loader
    pub subvol: Option<String>,
}

impl Default for PatchOptions {
    fn default() -> Self {
        Self {
            boot_sector_path: Some(String::from(DEFAULT_BOOT_SECTOR)),
            raid_mode: false,
            stupid_mode: false,
            subdir: None,
            subvol: None,
        }
    }
}

impl PatchOptions {
    /// Set the boot sector file.
    pub fn boot_sector(mut self, path: Option<&str>) -> Self {
        self.boot_sector_path = path.map(String::from);
        self
    }

    /// Enable RAID mode.
    pub fn raid(mut self, enabled: bool) -> Self {
        self.raid_mode = enabled;
        self
    }

    /// Enable single-sector transfers.
    pub fn stupid(mut self, enabled: bool) -> Self {
        self.stupid_mode = enabled;
        self
    }

    /// Set the install directory.
    pub fn subdir(mut self, dir: &str) -> Self {
        self.subdir = Some(String::from(dir));
        self
    }

    /// Set the subvolume.
    pub fn subvol(mut self, subvol: &str) -> Self {
        self.subvol = Some(String::from(subvol));
        self
    }
}
