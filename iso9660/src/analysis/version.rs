//! SYSLINUX version banner
//!
//! Loader binaries embed a banner such as `ISOLINUX 6.04 2019-02-03` or
//! `SYSLINUX 4.07`. Pre-releases and dated builds append an extension
//! directly after the minor number (`6.04-pre1`, `4.07/2013-07-25`).

use alloc::string::String;
use core::fmt;

const BANNER_TAIL: &[u8] = b"LINUX ";
const BANNER_PREFIXES: &[&[u8]] = &[b"ISO", b"SYS", b"EXT", b"PXE"];
const MAX_EXT_LEN: usize = 32;

/// Version of a SYSLINUX-family loader
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SyslinuxVersion {
    /// Major version
    pub major: u8,
    /// Minor version
    pub minor: u8,
    /// Build extension, `/` mapped to `-` (empty for a release)
    pub ext: String,
}

impl SyslinuxVersion {
    /// Find and parse the first banner in `data`
    pub fn parse_banner(data: &[u8]) -> Option<Self> {
        let mut from = 0;
        while let Some(pos) = find(&data[from..], BANNER_TAIL) {
            let at = from + pos;
            from = at + 1;

            if at < 3 || !BANNER_PREFIXES.contains(&&data[at - 3..at]) {
                continue;
            }
            if let Some(version) = parse_version(&data[at + BANNER_TAIL.len()..]) {
                return Some(version);
            }
        }
        None
    }

    /// `major.minor` as used in resource paths, e.g. `6.04`
    pub fn number(&self) -> String {
        alloc::format!("{}.{:02}", self.major, self.minor)
    }
}

impl fmt::Display for SyslinuxVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}{}", self.major, self.minor, self.ext)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Up to two decimal digits
fn parse_number(data: &[u8]) -> Option<(u8, usize)> {
    let digits = data.iter().take(2).take_while(|b| b.is_ascii_digit()).count();
    if digits == 0 || data.get(digits).is_some_and(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = data[..digits]
        .iter()
        .fold(0u8, |acc, b| acc * 10 + (b - b'0'));
    Some((value, digits))
}

fn parse_version(data: &[u8]) -> Option<SyslinuxVersion> {
    let (major, used) = parse_number(data)?;
    if major == 0 || data.get(used) != Some(&b'.') {
        return None;
    }
    let rest = &data[used + 1..];
    let (minor, used) = parse_number(rest)?;
    let rest = &rest[used..];

    let mut ext = String::new();
    if matches!(rest.first(), Some(b'-') | Some(b'/')) {
        for &b in rest.iter().take(MAX_EXT_LEN) {
            if !b.is_ascii_graphic() {
                break;
            }
            ext.push(if b == b'/' { '-' } else { b as char });
        }
    }

    Some(SyslinuxVersion { major, minor, ext })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn test_release_banner() {
        let data = b"\x00\x00junk ISOLINUX 6.04 2019-02-03 Copyright";
        let v = SyslinuxVersion::parse_banner(data).unwrap();
        assert_eq!((v.major, v.minor), (6, 4));
        assert_eq!(v.ext, "");
        assert_eq!(v.to_string(), "6.04");
        assert_eq!(v.number(), "6.04");
    }

    #[test]
    fn test_extension() {
        let v = SyslinuxVersion::parse_banner(b"SYSLINUX 6.04-pre1 ").unwrap();
        assert_eq!(v.ext, "-pre1");
        assert_eq!(v.to_string(), "6.04-pre1");

        let v = SyslinuxVersion::parse_banner(b"EXTLINUX 4.07/2013-07-25\0").unwrap();
        assert_eq!(v.number(), "4.07");
        assert_eq!(v.ext, "-2013-07-25");
    }

    #[test]
    fn test_rejects_other_banners() {
        assert!(SyslinuxVersion::parse_banner(b"GNU/LINUX 5.10").is_none());
        assert!(SyslinuxVersion::parse_banner(b"SYSLINUX v6").is_none());
        assert!(SyslinuxVersion::parse_banner(b"").is_none());
    }

    #[test]
    fn test_skips_bogus_match() {
        let v = SyslinuxVersion::parse_banner(b"SYSLINUX x.y ISOLINUX 3.86 ").unwrap();
        assert_eq!((v.major, v.minor), (3, 86));
    }
}
