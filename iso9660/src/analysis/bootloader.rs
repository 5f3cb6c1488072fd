//! Bootloader mechanism tags and the set that accumulates them

use core::fmt;

/// A boot mechanism found on an image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BootloaderType {
    /// Bootable x86 entry in the El Torito catalog
    BiosElTorito,
    /// Bootable EFI (platform 0xEF) entry in the El Torito catalog
    UefiElTorito,
    /// `isolinux.bin` is the image the x86 catalog entry loads
    IsolinuxCatalog,
    /// SYSLINUX family configuration or modules
    Syslinux,
    /// GRUB 2
    Grub2,
    /// GRUB4DOS / legacy GRUB (`grldr`)
    GrubLegacy,
    /// Removable-media UEFI loader under `/EFI/BOOT`
    UefiRemovable,
    /// Windows boot manager
    Windows,
    /// ReactOS setup or FreeLoader
    ReactOs,
    /// KolibriOS floppy image
    KolibriOs,
    /// Nothing recognized; matches only the empty set
    Unknown,
}

impl BootloaderType {
    /// Every tag that can be stored in a [`BootloaderSet`]
    pub const ALL: [BootloaderType; 10] = [
        BootloaderType::BiosElTorito,
        BootloaderType::UefiElTorito,
        BootloaderType::IsolinuxCatalog,
        BootloaderType::Syslinux,
        BootloaderType::Grub2,
        BootloaderType::GrubLegacy,
        BootloaderType::UefiRemovable,
        BootloaderType::Windows,
        BootloaderType::ReactOs,
        BootloaderType::KolibriOs,
    ];

    fn bit(self) -> u16 {
        match self {
            BootloaderType::BiosElTorito => 1 << 0,
            BootloaderType::UefiElTorito => 1 << 1,
            BootloaderType::IsolinuxCatalog => 1 << 2,
            BootloaderType::Syslinux => 1 << 3,
            BootloaderType::Grub2 => 1 << 4,
            BootloaderType::GrubLegacy => 1 << 5,
            BootloaderType::UefiRemovable => 1 << 6,
            BootloaderType::Windows => 1 << 7,
            BootloaderType::ReactOs => 1 << 8,
            BootloaderType::KolibriOs => 1 << 9,
            BootloaderType::Unknown => 0,
        }
    }

    /// Human readable name
    pub fn name(self) -> &'static str {
        match self {
            BootloaderType::BiosElTorito => "BIOS El Torito",
            BootloaderType::UefiElTorito => "UEFI El Torito",
            BootloaderType::IsolinuxCatalog => "ISOLINUX (catalog)",
            BootloaderType::Syslinux => "SYSLINUX",
            BootloaderType::Grub2 => "GRUB 2",
            BootloaderType::GrubLegacy => "GRUB legacy",
            BootloaderType::UefiRemovable => "UEFI removable",
            BootloaderType::Windows => "Windows",
            BootloaderType::ReactOs => "ReactOS",
            BootloaderType::KolibriOs => "KolibriOS",
            BootloaderType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for BootloaderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of [`BootloaderType`] tags
///
/// `Unknown` is never stored: inserting it is a no-op and
/// `contains(Unknown)` holds exactly when the set is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BootloaderSet {
    bits: u16,
}

impl BootloaderSet {
    /// Empty set
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    /// Add a tag
    pub fn insert(&mut self, tag: BootloaderType) {
        self.bits |= tag.bit();
    }

    /// Add every tag of `other`
    pub fn extend_from(&mut self, other: BootloaderSet) {
        self.bits |= other.bits;
    }

    /// Is `tag` present?
    pub fn contains(&self, tag: BootloaderType) -> bool {
        match tag {
            BootloaderType::Unknown => self.is_empty(),
            _ => self.bits & tag.bit() != 0,
        }
    }

    /// No tag recorded
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Number of tags recorded
    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Stored tags in declaration order
    pub fn iter(&self) -> impl Iterator<Item = BootloaderType> + '_ {
        BootloaderType::ALL
            .iter()
            .copied()
            .filter(move |tag| self.contains(*tag))
    }
}

impl FromIterator<BootloaderType> for BootloaderSet {
    fn from_iter<I: IntoIterator<Item = BootloaderType>>(iter: I) -> Self {
        let mut set = BootloaderSet::new();
        for tag in iter {
            set.insert(tag);
        }
        set
    }
}

impl fmt::Display for BootloaderSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str(BootloaderType::Unknown.name());
        }
        for (i, tag) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(tag.name())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;
    use alloc::vec::Vec;

    #[test]
    fn test_unknown_is_empty_alias() {
        let mut set = BootloaderSet::new();
        assert!(set.contains(BootloaderType::Unknown));

        set.insert(BootloaderType::Unknown);
        assert!(set.is_empty());

        set.insert(BootloaderType::Grub2);
        assert!(!set.contains(BootloaderType::Unknown));
        assert!(set.contains(BootloaderType::Grub2));
    }

    #[test]
    fn test_iter_order_and_display() {
        let set: BootloaderSet = [BootloaderType::Windows, BootloaderType::BiosElTorito]
            .into_iter()
            .collect();

        let tags: Vec<_> = set.iter().collect();
        assert_eq!(tags, [BootloaderType::BiosElTorito, BootloaderType::Windows]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.to_string(), "BIOS El Torito, Windows");
        assert_eq!(BootloaderSet::new().to_string(), "Unknown");
    }
}
