//! Byte-level write operations

use crate::error::{PatchError, PatchErrorKind, PatchStage, Result};
use alloc::string::String;
use alloc::vec::Vec;

/// Write `data` at `offset` of the file at `file_path`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patch {
    /// Target file
    pub file_path: String,
    /// Byte offset inside the file
    pub offset: usize,
    /// Bytes to write
    pub data: Vec<u8>,
}

impl Patch {
    /// One past the last byte written, `None` if that overflows
    pub fn end(&self) -> Option<usize> {
        self.offset.checked_add(self.data.len())
    }
}

/// Apply, in order, the patches that target `file_path`
///
/// Returns how many patches were applied. A patch that does not fit
/// inside `content` fails before anything after it is written.
pub fn apply_patches(content: &mut [u8], file_path: &str, patches: &[Patch]) -> Result<usize> {
    let mut applied = 0;
    for patch in patches.iter().filter(|p| p.file_path == file_path) {
        let dst = patch.end().and_then(|end| content.get_mut(patch.offset..end));
        let dst = dst.ok_or_else(|| {
            PatchError::new(
                file_path,
                PatchStage::Apply,
                PatchErrorKind::FieldOutOfBounds {
                    field: "patch",
                    offset: patch.offset,
                },
            )
        })?;
        dst.copy_from_slice(&patch.data);
        applied += 1;
    }
    Ok(applied)
}
