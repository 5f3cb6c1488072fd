//! Filename rules of the filesystem probe
//!
//! All comparisons are ASCII case-insensitive. `parent` is the directory
//! path as produced by the tree walk (`/` for the root).

use super::bootloader::{BootloaderSet, BootloaderType};
use crate::types::FileEntry;

/// Files that mark a SYSLINUX-family loader wherever they appear
const SYSLINUX_FILES: &[&str] = &[
    "isolinux.cfg",
    "syslinux.cfg",
    "extlinux.conf",
    "txt.cfg",
    "live.cfg",
    "ldlinux.c32",
    "isolinux.bin",
];

const GRUB2_FILES: &[&str] = &["grub.cfg", "loopback.cfg"];

const GRUB2_DIRS: &[&str] = &["/boot/grub/i386-pc", "/boot/grub2/i386-pc"];

const REACTOS_FILES: &[&str] = &["setupldr.sys", "freeldr.sys"];

/// Fallback loaders of the UEFI removable-media path
const EFI_BOOT_DIR: &str = "/efi/boot";
const EFI_BOOT_FILES: &[&str] = &[
    "bootx64.efi",
    "bootia32.efi",
    "bootaa64.efi",
    "bootarm.efi",
    "bootriscv64.efi",
    "bootloongarch64.efi",
    "bootmgr.efi",
];

/// Loader binaries scanned for a version banner, in preference order
pub const BANNER_FILES: &[&str] = &["isolinux.bin", "ldlinux.sys", "ldlinux.c32"];

fn any_eq(candidates: &[&str], name: &str) -> bool {
    candidates.iter().any(|c| c.eq_ignore_ascii_case(name))
}

fn is_root(parent: &str) -> bool {
    parent == "/" || parent.is_empty()
}

/// Tags implied by one directory entry
pub fn classify(parent: &str, entry: &FileEntry) -> BootloaderSet {
    let mut tags = BootloaderSet::new();
    let name = entry.name.as_str();

    if entry.is_directory() {
        if GRUB2_DIRS.iter().any(|d| is_child_path(parent, name, d)) {
            tags.insert(BootloaderType::Grub2);
        }
        return tags;
    }

    if any_eq(SYSLINUX_FILES, name) {
        tags.insert(BootloaderType::Syslinux);
    }
    if any_eq(GRUB2_FILES, name) {
        tags.insert(BootloaderType::Grub2);
    }
    if any_eq(REACTOS_FILES, name) {
        tags.insert(BootloaderType::ReactOs);
    }

    if is_root(parent) {
        if name.eq_ignore_ascii_case("grldr") {
            tags.insert(BootloaderType::GrubLegacy);
        } else if name.eq_ignore_ascii_case("bootmgr") {
            tags.insert(BootloaderType::Windows);
        } else if name.eq_ignore_ascii_case("bootmgr.efi") {
            tags.insert(BootloaderType::Windows);
            tags.insert(BootloaderType::UefiRemovable);
        } else if name.eq_ignore_ascii_case("kolibri.img") {
            tags.insert(BootloaderType::KolibriOs);
        }
    }

    if parent.eq_ignore_ascii_case(EFI_BOOT_DIR) && any_eq(EFI_BOOT_FILES, name) {
        tags.insert(BootloaderType::UefiRemovable);
    }

    tags
}

/// Is `parent/name` equal to `path`, ignoring case?
fn is_child_path(parent: &str, name: &str, path: &str) -> bool {
    let Some((dir, last)) = path.rsplit_once('/') else {
        return false;
    };
    let dir = if dir.is_empty() { "/" } else { dir };
    dir.eq_ignore_ascii_case(parent) && last.eq_ignore_ascii_case(name)
}

/// Preference rank of a banner candidate, lower is better
pub fn banner_rank(entry: &FileEntry) -> Option<usize> {
    if !entry.is_file() {
        return None;
    }
    BANNER_FILES
        .iter()
        .position(|f| f.eq_ignore_ascii_case(&entry.name))
}
