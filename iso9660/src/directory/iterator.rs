//! Directory iteration
//!
//! Iterator for reading directory entries sequentially.

use crate::directory::record::DirectoryRecord;
use crate::error::Result;
use crate::types::{FileEntry, SECTOR_SIZE};
use crate::utils::sector::SectorReader;
use crate::utils::string;
use alloc::boxed::Box;
use alloc::string::String;
use gpt_disk_io::BlockIo;

/// Directory iterator
///
/// Yields every entry except "." and "..". The first error ends iteration.
pub struct DirectoryIterator<'r, 'a, B: BlockIo> {
    reader: &'r mut SectorReader<'a, B>,
    extent_lba: u32,
    extent_len: u32,
    offset: usize,
    current_sector: Box<[u8; SECTOR_SIZE]>,
    current_sector_lba: Option<u64>,
}

impl<'r, 'a, B: BlockIo> DirectoryIterator<'r, 'a, B> {
    /// Create new directory iterator
    pub fn new(reader: &'r mut SectorReader<'a, B>, extent_lba: u32, extent_len: u32) -> Self {
        Self {
            reader,
            extent_lba,
            extent_len,
            offset: 0,
            current_sector: Box::new([0u8; SECTOR_SIZE]),
            current_sector_lba: None,
        }
    }

    fn finish(&mut self) {
        self.offset = self.extent_len as usize;
    }
}

impl<'r, 'a, B: BlockIo> Iterator for DirectoryIterator<'r, 'a, B> {
    type Item = Result<FileEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.offset >= self.extent_len as usize {
                return None;
            }

            let sector_offset = self.offset / SECTOR_SIZE;
            let lba = self.extent_lba as u64 + sector_offset as u64;
            let offset_in_sector = self.offset % SECTOR_SIZE;

            if self.current_sector_lba != Some(lba) {
                if let Err(e) = self.reader.read_sector(lba, &mut self.current_sector) {
                    self.finish();
                    return Some(Err(e));
                }
                self.current_sector_lba = Some(lba);
            }

            // Records never straddle sectors; a zero length byte pads to the next one
            let sector_data = &self.current_sector[offset_in_sector..];
            if sector_data[0] == 0 {
                self.offset = (sector_offset + 1) * SECTOR_SIZE;
                continue;
            }

            let record = match DirectoryRecord::parse(sector_data) {
                Ok(r) => r,
                Err(e) => {
                    self.offset = self.extent_len as usize;
                    return Some(Err(e));
                }
            };
            self.offset += record.length();

            if record.is_self_or_parent() {
                continue;
            }

            let file_id = record.file_identifier();
            let name = match string::dchars_to_str(file_id) {
                Ok(s) => String::from(string::strip_version(s)),
                Err(_) => String::from_utf8_lossy(file_id).into_owned(),
            };

            return Some(Ok(FileEntry {
                name,
                size: record.data_length() as u64,
                extent_lba: record.extent_lba(),
                data_length: record.data_length(),
                flags: record.flags(),
            }));
        }
    }
}
