//! Boot Record Volume Descriptor (type 0)
//!
//! El Torito marks its presence with a boot record whose boot system
//! identifier is "EL TORITO SPECIFICATION" and whose first system-use
//! dword holds the absolute sector of the boot catalog.

use crate::types::SECTOR_SIZE;
use crate::utils::{le_u32, string};

/// Boot system identifier used by El Torito
pub const EL_TORITO_ID: &[u8] = b"EL TORITO SPECIFICATION";

const SYSTEM_ID: usize = 7;
const SYSTEM_ID_LEN: usize = 32;
const CATALOG_POINTER: usize = 0x47;

/// Returns the boot catalog LBA if this boot record is El Torito
pub fn el_torito_catalog(data: &[u8; SECTOR_SIZE]) -> Option<u32> {
    let system_id = string::trim_padding(&data[SYSTEM_ID..SYSTEM_ID + SYSTEM_ID_LEN]);
    if system_id != EL_TORITO_ID {
        return None;
    }
    Some(le_u32(data, CATALOG_POINTER))
}
