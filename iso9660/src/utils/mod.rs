//! Byte-level helpers shared by the parsers

pub mod checksum;
pub mod sector;
pub mod string;

/// Little-endian u16 at `offset`
///
/// Callers guarantee `offset + 2 <= data.len()`.
pub fn le_u16(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

/// Little-endian u32 at `offset`
///
/// Callers guarantee `offset + 4 <= data.len()`.
pub fn le_u32(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}
