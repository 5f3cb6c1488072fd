//! Image files as block devices
//!
//! Gives the `iso9660` crate a `BlockIo` over a disc image on the host
//! filesystem. The device is read-only; writes are rejected.

use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

/// ISO9660 logical sector size
pub const ISO_BLOCK_SIZE: u32 = 2048;

/// Read-only block device backed by an image file
#[derive(Debug)]
pub struct FileBlockIo {
    file: File,
    len: u64,
    block_size: BlockSize,
}

impl FileBlockIo {
    /// Open an image with 2048-byte blocks
    pub fn open(path: &Path) -> io::Result<Self> {
        Self::from_file(File::open(path)?, ISO_BLOCK_SIZE)
    }

    /// Wrap an open file, exposing it with `block_size` byte blocks
    pub fn from_file(file: File, block_size: u32) -> io::Result<Self> {
        let block_size = BlockSize::new(block_size).ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "unsupported block size")
        })?;
        let len = file.metadata()?.len();
        Ok(Self {
            file,
            len,
            block_size,
        })
    }

    /// Image size in bytes
    pub fn len(&self) -> u64 {
        self.len
    }

    /// True for a zero-length image
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl BlockIo for FileBlockIo {
    type Error = io::Error;

    fn block_size(&self) -> BlockSize {
        self.block_size
    }

    /// A trailing partial block counts as a whole one
    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok(self.len.div_ceil(u64::from(self.block_size.to_u32())))
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        let offset = start_lba
            .0
            .checked_mul(u64::from(self.block_size.to_u32()))
            .filter(|&offset| offset < self.len)
            .ok_or_else(|| {
                io::Error::new(io::ErrorKind::UnexpectedEof, "read beyond end of image")
            })?;

        self.file.seek(SeekFrom::Start(offset))?;
        let mut filled = 0;
        while filled < dst.len() {
            match self.file.read(&mut dst[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        // Past EOF reads as zeros, like padding
        dst[filled..].fill(0);
        Ok(())
    }

    fn write_blocks(&mut self, _start_lba: Lba, _src: &[u8]) -> Result<(), Self::Error> {
        Err(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "image is opened read-only",
        ))
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_image(name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("morpheus-image-{}-{}", std::process::id(), name));
        let mut file = File::create(&path).unwrap();
        file.write_all(data).unwrap();
        path
    }

    #[test]
    fn test_reads_blocks() {
        let mut data = vec![0u8; 3 * 2048];
        data[2048] = 0xAB;
        let path = temp_image("read", &data);

        let mut device = FileBlockIo::open(&path).unwrap();
        assert_eq!(device.num_blocks().unwrap(), 3);

        let mut buf = vec![0u8; 2048];
        device.read_blocks(Lba(1), &mut buf).unwrap();
        assert_eq!(buf[0], 0xAB);

        assert!(device.read_blocks(Lba(3), &mut buf).is_err());
        assert!(device.write_blocks(Lba(0), &buf).is_err());
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_partial_tail_is_zero_padded() {
        let path = temp_image("tail", &[0xFFu8; 2048 + 100]);
        let mut device = FileBlockIo::open(&path).unwrap();
        assert_eq!(device.num_blocks().unwrap(), 2);

        let mut buf = vec![1u8; 2048];
        device.read_blocks(Lba(1), &mut buf).unwrap();
        assert!(buf[..100].iter().all(|&b| b == 0xFF));
        assert!(buf[100..].iter().all(|&b| b == 0));
        std::fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_rejects_bad_block_size() {
        let path = temp_image("bs", &[0u8; 512]);
        let file = File::open(&path).unwrap();
        assert!(FileBlockIo::from_file(file, 0).is_err());
        std::fs::remove_file(path).unwrap();
    }
}
