//! Bundled loader files
//!
//! SYSLINUX must be installed in the same version the image was built
//! with. Two versions ship in the resource directory; anything else is
//! fetched from the upstream mirror, which this module only describes.

use iso9660::SyslinuxVersion;
use std::fmt;
use std::path::{Path, PathBuf};

/// Mirror hosting SYSLINUX builds
pub const DEFAULT_BASE_URL: &str = "https://rufus.ie/files";

/// UEFI:NTFS helper partition image
pub const UEFI_NTFS_IMAGE: &str = "uefi-ntfs.img";

/// Versions present under `syslinux/` and their file name suffix
const EMBEDDED_SYSLINUX: [(&str, &str); 2] = [("4.07", "v4"), ("6.04", "v6")];

/// Where to get a file that is not available locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadInstruction {
    /// Source URL, if one is known
    pub url: Option<String>,
    /// Name to store the file under
    pub filename: String,
    /// Explanation for the user
    pub message: String,
}

/// Outcome of a resource lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resource {
    /// File present on disk
    Local(PathBuf),
    /// File must be downloaded first
    Download(DownloadInstruction),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::Local(path) => write!(f, "local {}", path.display()),
            Resource::Download(dl) => match &dl.url {
                Some(url) => write!(f, "download {} ({})", url, dl.message),
                None => write!(f, "unavailable: {}", dl.message),
            },
        }
    }
}

/// Maps resource names to files under a resource directory
#[derive(Debug, Clone)]
pub struct ResourceLocator {
    root: PathBuf,
    base_url: String,
}

impl ResourceLocator {
    /// Look up files under `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }

    /// Use another download mirror
    pub fn with_base_url(mut self, url: &str) -> Self {
        self.base_url = url.trim_end_matches('/').to_string();
        self
    }

    /// Resource directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Locate `filename`
    ///
    /// # Arguments
    /// * `filename` - `uefi-ntfs.img` or an `ldlinux.*` file
    /// * `version` - SYSLINUX `major.minor`, required for `ldlinux.*`
    /// * `ext` - Build extension as it appears in mirror paths, e.g. `/2014-10-06`
    pub fn locate(&self, filename: &str, version: Option<&str>, ext: &str) -> Resource {
        if filename == UEFI_NTFS_IMAGE {
            let local = self.root.join("uefi").join(UEFI_NTFS_IMAGE);
            if local.is_file() {
                return Resource::Local(local);
            }
            return Resource::Download(DownloadInstruction {
                url: Some(format!("{}/{}", self.base_url, UEFI_NTFS_IMAGE)),
                filename: filename.to_string(),
                message: format!("{} is missing from {}", UEFI_NTFS_IMAGE, self.root.display()),
            });
        }

        if !filename.starts_with("ldlinux") {
            return Resource::Download(DownloadInstruction {
                url: None,
                filename: filename.to_string(),
                message: String::from("unknown resource"),
            });
        }

        let Some(version) = version else {
            return Resource::Download(DownloadInstruction {
                url: None,
                filename: filename.to_string(),
                message: String::from("a SYSLINUX version is required for ldlinux files"),
            });
        };

        if let Some(local) = self.embedded_syslinux(filename, version) {
            tracing::debug!(file = filename, path = %local.display(), "embedded resource");
            return Resource::Local(local);
        }

        Resource::Download(DownloadInstruction {
            url: Some(format!(
                "{}/syslinux-{}{}/{}",
                self.base_url, version, ext, filename
            )),
            filename: filename.to_string(),
            message: format!("SYSLINUX {}{} is not bundled", version, ext),
        })
    }

    /// Locate an `ldlinux.*` file matching a detected loader
    pub fn locate_syslinux(&self, filename: &str, version: &SyslinuxVersion) -> Resource {
        self.locate(filename, Some(&version.number()), &version.ext)
    }

    fn embedded_syslinux(&self, filename: &str, version: &str) -> Option<PathBuf> {
        let (_, suffix) = EMBEDDED_SYSLINUX.iter().find(|(v, _)| *v == version)?;
        let name = match Path::new(filename).extension() {
            Some(ext) => format!("ldlinux_{}.{}", suffix, ext.to_string_lossy()),
            None => format!("ldlinux_{}", suffix),
        };
        let local = self.root.join("syslinux").join(name);
        local.is_file().then_some(local)
    }
}
