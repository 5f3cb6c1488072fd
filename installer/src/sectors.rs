//! Physical sector lookup for installed files
//!
//! The patch engine needs the 512-byte device sectors a file occupies, in
//! file order. [`FilefragSource`] asks the filesystem through `filefrag`;
//! [`SectorListFile`] reads a list prepared elsewhere.

use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Unit all sector numbers are expressed in
pub const SECTOR_SIZE: u64 = 512;

/// Why a sector list could not be produced
#[derive(Error, Debug)]
pub enum SectorSourceError {
    #[error("{}: sectors cannot be mapped ({reason})", path.display())]
    UnsupportedFilesystem { path: PathBuf, reason: String },

    #[error("{}: permission denied", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("cannot parse sector map: {0}")]
    Parse(String),

    #[error("{program} exited with {status}: {stderr}")]
    Command {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
}

/// Anything that can tell where a file lives on its device
pub trait SectorSource {
    /// Device sectors of `path`, one entry per 512 bytes of file data
    fn physical_sectors(&self, path: &Path) -> Result<Vec<u64>, SectorSourceError>;
}

/// Extent flags meaning the data has no fixed, directly readable location
const UNMAPPABLE_FLAGS: &[&str] = &[
    "unknown_loc",
    "delalloc",
    "inline",
    "data_inline",
    "data_tail",
    "encoded",
    "data_encrypted",
    "not_aligned",
];

lazy_static! {
    // "   0:        0..     119:    2048000..   2048119:    120:             last,eof"
    static ref EXTENT_LINE: Regex = Regex::new(
        r"^\s*\d+:\s*(\d+)\.\.\s*(\d+):\s*(\d+)\.\.\s*(\d+):\s*(\d+):\s*(?:\d+:)?\s*(\S*)\s*$"
    )
    .expect("extent pattern");
    static ref FILE_SIZE: Regex =
        Regex::new(r"^File size of .* is (\d+) ").expect("file size pattern");
}

/// Runs `filefrag -v -b512` on the file
#[derive(Debug, Clone)]
pub struct FilefragSource {
    program: PathBuf,
}

impl Default for FilefragSource {
    fn default() -> Self {
        Self {
            program: PathBuf::from("filefrag"),
        }
    }
}

impl FilefragSource {
    /// Use another `filefrag` binary
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SectorSource for FilefragSource {
    fn physical_sectors(&self, path: &Path) -> Result<Vec<u64>, SectorSourceError> {
        // Surface missing files and permissions before spawning anything
        fs::metadata(path).map_err(|e| io_error(path, e))?;

        let output = Command::new(&self.program)
            .arg("-v")
            .arg("-b512")
            .arg(path)
            .output()?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if stderr.contains("Permission denied") {
            return Err(SectorSourceError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        if stderr.contains("not supported") || stdout.contains("not supported") {
            return Err(SectorSourceError::UnsupportedFilesystem {
                path: path.to_path_buf(),
                reason: String::from("FIEMAP not supported"),
            });
        }
        if !output.status.success() {
            return Err(SectorSourceError::Command {
                program: self.program.display().to_string(),
                status: output.status,
                stderr: stderr.trim().to_string(),
            });
        }

        let sectors = parse_filefrag(path, &stdout)?;
        tracing::debug!(path = %path.display(), sectors = sectors.len(), "sector map read");
        Ok(sectors)
    }
}

fn io_error(path: &Path, e: io::Error) -> SectorSourceError {
    match e.kind() {
        io::ErrorKind::PermissionDenied => SectorSourceError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => SectorSourceError::Io(e),
    }
}

/// Turn `filefrag -v -b512` output into a sector list
///
/// Extents must cover the file without holes. The list is cut to the
/// reported file size, since the last extent is rounded up to whole
/// filesystem blocks.
pub fn parse_filefrag(path: &Path, output: &str) -> Result<Vec<u64>, SectorSourceError> {
    let unsupported = |reason: String| SectorSourceError::UnsupportedFilesystem {
        path: path.to_path_buf(),
        reason,
    };

    let mut size = None;
    let mut sectors = Vec::new();

    for line in output.lines() {
        if let Some(caps) = FILE_SIZE.captures(line) {
            size = Some(number(&caps[1])?);
            continue;
        }
        let Some(caps) = EXTENT_LINE.captures(line) else {
            continue;
        };

        let logical = number(&caps[1])?;
        let physical = number(&caps[3])?;
        let length = number(&caps[5])?;
        if let Some(flag) = caps[6].split(',').find(|f| UNMAPPABLE_FLAGS.contains(f)) {
            return Err(unsupported(format!("extent at {} is {}", logical, flag)));
        }
        if logical != sectors.len() as u64 {
            return Err(unsupported(format!("hole before logical sector {}", logical)));
        }
        sectors.extend(physical..physical + length);
    }

    if let Some(size) = size {
        let needed = size.div_ceil(SECTOR_SIZE) as usize;
        if sectors.len() < needed {
            return Err(unsupported(format!(
                "{} of {} sectors mapped",
                sectors.len(),
                needed
            )));
        }
        sectors.truncate(needed);
    }
    Ok(sectors)
}

fn number(text: &str) -> Result<u64, SectorSourceError> {
    text.parse()
        .map_err(|_| SectorSourceError::Parse(format!("bad number {:?}", text)))
}

/// A prepared sector list, separated by whitespace or commas
#[derive(Debug, Clone)]
pub struct SectorListFile {
    list: PathBuf,
}

impl SectorListFile {
    /// Read the list from `list`
    pub fn new(list: impl Into<PathBuf>) -> Self {
        Self { list: list.into() }
    }
}

impl SectorSource for SectorListFile {
    /// The target path is not consulted; the list describes it
    fn physical_sectors(&self, _path: &Path) -> Result<Vec<u64>, SectorSourceError> {
        let text = fs::read_to_string(&self.list).map_err(|e| io_error(&self.list, e))?;
        parse_sector_list(&text)
    }
}

/// Decimal or `0x` hex sector numbers, separated by whitespace or commas
pub fn parse_sector_list(text: &str) -> Result<Vec<u64>, SectorSourceError> {
    text.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|token| !token.is_empty())
        .map(|token| {
            let parsed = match token.strip_prefix("0x") {
                Some(hex) => u64::from_str_radix(hex, 16),
                None => token.parse(),
            };
            parsed.map_err(|_| SectorSourceError::Parse(format!("bad sector {:?}", token)))
        })
        .collect()
}
