//! Dword-complement image checksum
//!
//! SYSLINUX stores `seed - Σ dwords` so that the wrapping sum of every
//! complete little-endian dword of the finished image equals the seed.

/// Wrapping sum of all complete little-endian dwords
pub fn dword_sum(data: &[u8]) -> u32 {
    data.chunks_exact(4)
        .map(|w| u32::from_le_bytes([w[0], w[1], w[2], w[3]]))
        .fold(0u32, u32::wrapping_add)
}

/// Checksum value for `data`, whose checksum field must already be zero
pub fn dword_complement(data: &[u8], seed: u32) -> u32 {
    seed.wrapping_sub(dword_sum(data))
}
