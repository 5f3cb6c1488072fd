//! Checksum calculations for validation

/// Calculate 16-bit checksum (sum of little-endian 16-bit words)
///
/// Used for El Torito validation entry
pub fn checksum_16(data: &[u8]) -> u16 {
    data.chunks_exact(2)
        .map(|chunk| u16::from_le_bytes([chunk[0], chunk[1]]))
        .fold(0u16, |sum, word| sum.wrapping_add(word))
}

/// Verify checksum is zero (validation check)
pub fn verify_checksum_16(data: &[u8]) -> bool {
    checksum_16(data) == 0
}

/// Calculate checksum that makes total sum zero
pub fn calculate_complement_16(data: &[u8]) -> u16 {
    0u16.wrapping_sub(checksum_16(data))
}
