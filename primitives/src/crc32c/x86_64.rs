//! CRC32C folding with the SSE4.2 `crc32` instruction.

use super::portable;
use core::arch::x86_64::_mm_crc32_u64;

/// Folds `data` into the register eight bytes per instruction. Trailing bytes that do not
/// fill a full word are folded by the portable routine.
///
/// # Safety
///
/// The CPU must support `sse4.2`.
#[target_feature(enable = "sse4.2")]
pub(super) unsafe fn update(mut crc: u32, data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(8);
    for chunk in chunks.by_ref() {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);

        // The instruction consumes the word in memory order, so it must be loaded
        // little-endian on every host.
        crc = _mm_crc32_u64(u64::from(crc), u64::from_le_bytes(word)) as u32;
    }
    for &byte in chunks.remainder() {
        crc = portable::update_byte(crc, byte);
    }
    crc
}
