//! AES block encryption and key expansion with the ARMv8 cryptography extension.

use super::BLOCK_SIZE;
use core::arch::aarch64::{
    vaeseq_u8, vaesmcq_u8, vdupq_n_u32, vdupq_n_u8, veorq_u8, vgetq_lane_u32, vld1q_u8,
    vreinterpretq_u32_u8, vreinterpretq_u8_u32, vst1q_u8,
};

/// Applies the S-box to each byte of a key-schedule word (little-endian).
///
/// With the word repeated in every column ShiftRows is a no-op, so `AESE` with a zero round
/// key reduces to SubBytes.
///
/// # Safety
///
/// The CPU must support `aes`.
#[target_feature(enable = "aes")]
pub(super) unsafe fn sub_word(word: u32) -> u32 {
    let state = vreinterpretq_u8_u32(vdupq_n_u32(word));
    let substituted = vaeseq_u8(state, vdupq_n_u8(0));
    vgetq_lane_u32::<0>(vreinterpretq_u32_u8(substituted))
}

/// Encrypts `block` in place with the given round keys (`rounds + 1` entries).
///
/// `AESE` adds the round key before substitution, so the schedule is consumed one key
/// earlier than in FIPS-197 and the last key is added with a plain XOR.
///
/// # Safety
///
/// The CPU must support `aes`.
#[target_feature(enable = "aes")]
pub(super) unsafe fn encrypt(round_keys: &[[u8; BLOCK_SIZE]], block: &mut [u8; BLOCK_SIZE]) {
    let rounds = round_keys.len() - 1;
    let mut state = vld1q_u8(block.as_ptr());
    for round_key in &round_keys[..rounds - 1] {
        state = vaesmcq_u8(vaeseq_u8(state, vld1q_u8(round_key.as_ptr())));
    }
    state = vaeseq_u8(state, vld1q_u8(round_keys[rounds - 1].as_ptr()));
    state = veorq_u8(state, vld1q_u8(round_keys[rounds].as_ptr()));
    vst1q_u8(block.as_mut_ptr(), state);
}
