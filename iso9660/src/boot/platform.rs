//! Boot platform identifiers

use crate::types::BootPlatform;

impl BootPlatform {
    /// x86 (PC-compatible)
    pub const X86_ID: u8 = 0x00;

    /// PowerPC
    pub const POWER_PC_ID: u8 = 0x01;

    /// Mac
    pub const MAC_ID: u8 = 0x02;

    /// EFI
    pub const EFI_ID: u8 = 0xEF;

    /// Parse from validation entry or section header platform ID
    pub fn from_id(id: u8) -> Self {
        match id {
            Self::X86_ID => BootPlatform::X86,
            Self::POWER_PC_ID => BootPlatform::PowerPC,
            Self::MAC_ID => BootPlatform::Mac,
            Self::EFI_ID => BootPlatform::Efi,
            other => BootPlatform::Other(other),
        }
    }
}
