//! Bounded traversal of the whole directory tree
//!
//! Used by the bootloader probes. A directory that fails to parse is skipped
//! and counted; it never aborts the rest of the walk.

use crate::directory::iterator::DirectoryIterator;
use crate::types::{FileEntry, VolumeInfo, MAX_DIRECTORY_DEPTH};
use crate::utils::sector::SectorReader;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use gpt_disk_io::BlockIo;

/// Bounds on a tree walk
#[derive(Debug, Clone, Copy)]
pub struct WalkLimits {
    /// Deepest directory level visited (root is level 0)
    pub max_depth: usize,
    /// Entries visited before the walk stops
    pub max_entries: usize,
}

impl Default for WalkLimits {
    fn default() -> Self {
        Self {
            max_depth: MAX_DIRECTORY_DEPTH,
            max_entries: 4096,
        }
    }
}

/// What a walk covered
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkSummary {
    /// Entries handed to the visitor
    pub entries: usize,
    /// Directories that could not be read completely
    pub failed_directories: usize,
    /// The entry limit cut the walk short
    pub truncated: bool,
}

/// Visit every entry below the root, depth first
///
/// The visitor receives the parent directory path (`/` for the root, no
/// trailing slash otherwise) and the entry.
pub fn walk_tree<B, F>(
    reader: &mut SectorReader<'_, B>,
    volume: &VolumeInfo,
    limits: WalkLimits,
    mut visit: F,
) -> WalkSummary
where
    B: BlockIo,
    F: FnMut(&str, &FileEntry),
{
    let mut summary = WalkSummary::default();
    let mut pending = vec![(
        String::from("/"),
        volume.root_extent_lba,
        volume.root_extent_len,
        0usize,
    )];

    while let Some((path, lba, len, depth)) = pending.pop() {
        for result in DirectoryIterator::new(reader, lba, len) {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!(path = path.as_str(), error = %e, "skipping unreadable directory");
                    summary.failed_directories += 1;
                    break;
                }
            };

            if summary.entries >= limits.max_entries {
                summary.truncated = true;
                tracing::warn!(limit = limits.max_entries, "directory walk truncated");
                return summary;
            }
            summary.entries += 1;
            visit(&path, &entry);

            if entry.is_directory() && depth < limits.max_depth {
                pending.push((child_path(&path, &entry.name), entry.extent_lba, entry.data_length, depth + 1));
            }
        }
    }

    summary
}

/// Join a directory path and an entry name
pub fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{}", name)
    } else {
        format!("{}/{}", parent, name)
    }
}
