//! AES block encryption and key expansion with AES-NI.

use super::BLOCK_SIZE;
use core::arch::x86_64::{
    __m128i, _mm_aesenc_si128, _mm_aesenclast_si128, _mm_aeskeygenassist_si128, _mm_cvtsi128_si32,
    _mm_loadu_si128, _mm_set1_epi32, _mm_storeu_si128, _mm_xor_si128,
};

#[inline(always)]
unsafe fn load(bytes: &[u8; BLOCK_SIZE]) -> __m128i {
    _mm_loadu_si128(bytes.as_ptr().cast::<__m128i>())
}

/// Applies the S-box to each byte of a key-schedule word (little-endian).
///
/// `AESKEYGENASSIST` writes SubWord of the input's second dword to the output's first dword.
///
/// # Safety
///
/// The CPU must support `aes`.
#[target_feature(enable = "aes")]
pub(super) unsafe fn sub_word(word: u32) -> u32 {
    let assist = _mm_aeskeygenassist_si128::<0>(_mm_set1_epi32(word as i32));
    _mm_cvtsi128_si32(assist) as u32
}

/// Encrypts `block` in place with the given round keys (`rounds + 1` entries).
///
/// FIPS-197 round keys are used as-is: AES-NI keeps the state in the same byte order.
///
/// # Safety
///
/// The CPU must support `aes`.
#[target_feature(enable = "aes")]
pub(super) unsafe fn encrypt(round_keys: &[[u8; BLOCK_SIZE]], block: &mut [u8; BLOCK_SIZE]) {
    let rounds = round_keys.len() - 1;
    let mut state = _mm_xor_si128(load(block), load(&round_keys[0]));
    for round_key in &round_keys[1..rounds] {
        state = _mm_aesenc_si128(state, load(round_key));
    }
    state = _mm_aesenclast_si128(state, load(&round_keys[rounds]));
    _mm_storeu_si128(block.as_mut_ptr().cast::<__m128i>(), state);
}
