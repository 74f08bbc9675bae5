//! CRC32C folding with the ARMv8 `crc32cx` instruction.

use super::portable;
use core::arch::aarch64::__crc32cd;

/// Folds `data` into the register eight bytes per instruction. Trailing bytes that do not
/// fill a full word are folded by the portable routine.
///
/// # Safety
///
/// The CPU must support the `crc` extension.
#[target_feature(enable = "crc")]
pub(super) unsafe fn update(mut crc: u32, data: &[u8]) -> u32 {
    let mut chunks = data.chunks_exact(8);
    for chunk in chunks.by_ref() {
        let mut word = [0u8; 8];
        word.copy_from_slice(chunk);
        crc = __crc32cd(crc, u64::from_le_bytes(word));
    }
    for &byte in chunks.remainder() {
        crc = portable::update_byte(crc, byte);
    }
    crc
}
