//! Byte-oriented AES (FIPS-197) key expansion and block encryption.
//!
//! SubBytes is computed arithmetically (inversion in GF(2^8) followed by the affine
//! transform) with no branches or table lookups on secret data.

use super::{BLOCK_SIZE, MAX_ROUND_KEYS};
use zeroize::Zeroize;

/// Multiplies by `x` in GF(2^8) modulo `x^8 + x^4 + x^3 + x + 1`.
#[inline(always)]
const fn xtime(x: u8) -> u8 {
    (x << 1) ^ (0u8.wrapping_sub(x >> 7) & 0x1b)
}

/// Multiplies in GF(2^8), always running eight steps.
#[inline(always)]
const fn gmul(mut a: u8, b: u8) -> u8 {
    let mut product = 0;
    let mut i = 0;
    while i < 8 {
        product ^= a & 0u8.wrapping_sub((b >> i) & 1);
        a = xtime(a);
        i += 1;
    }
    product
}

/// Computes `x^254`, the multiplicative inverse of `x` (and `0` for `0`).
#[inline(always)]
const fn invert(x: u8) -> u8 {
    let x2 = gmul(x, x);
    let x3 = gmul(x2, x);
    let x6 = gmul(x3, x3);
    let x12 = gmul(x6, x6);
    let x15 = gmul(x12, x3);
    let x30 = gmul(x15, x15);
    let x60 = gmul(x30, x30);
    let x120 = gmul(x60, x60);
    let x240 = gmul(x120, x120);
    let x252 = gmul(x240, x12);
    gmul(x252, x2)
}

/// Applies the forward S-box to one byte.
#[inline(always)]
const fn sub_byte(x: u8) -> u8 {
    let inverse = invert(x);
    inverse
        ^ inverse.rotate_left(1)
        ^ inverse.rotate_left(2)
        ^ inverse.rotate_left(3)
        ^ inverse.rotate_left(4)
        ^ 0x63
}

/// Applies the forward S-box to each byte of a key-schedule word.
pub(super) fn sub_word(word: u32) -> u32 {
    u32::from_le_bytes(word.to_le_bytes().map(sub_byte))
}

/// Expands `key` (4 or 8 words) into `round_keys`, one slot per round plus the whitening key.
pub(super) fn expand_key(key: &[u8], round_keys: &mut [[u8; BLOCK_SIZE]]) {
    expand_key_with(key, round_keys, sub_word);
}

/// Expands `key` into `round_keys` using `sub_word` for the S-box step.
///
/// Words are little-endian: byte 0 of a word is its least significant byte.
pub(super) fn expand_key_with(
    key: &[u8],
    round_keys: &mut [[u8; BLOCK_SIZE]],
    sub_word: impl Fn(u32) -> u32,
) {
    let nk = key.len() / 4;
    let total = 4 * round_keys.len();
    debug_assert!(nk == 4 || nk == 8);

    let mut words = [0u32; 4 * MAX_ROUND_KEYS];
    for (word, bytes) in words.iter_mut().zip(key.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    let mut rcon = 1u8;
    for i in nk..total {
        let mut temp = words[i - 1];
        if i % nk == 0 {
            // RotWord moves byte 0 to byte 3
            temp = sub_word(temp.rotate_right(8)) ^ rcon as u32;
            rcon = xtime(rcon);
        } else if nk > 6 && i % nk == 4 {
            temp = sub_word(temp);
        }
        words[i] = words[i - nk] ^ temp;
    }

    for (round_key, chunk) in round_keys.iter_mut().zip(words.chunks_exact(4)) {
        for (bytes, word) in round_key.chunks_exact_mut(4).zip(chunk) {
            bytes.copy_from_slice(&word.to_le_bytes());
        }
    }
    words.zeroize();
}

#[inline(always)]
fn add_round_key(state: &mut [u8; BLOCK_SIZE], round_key: &[u8; BLOCK_SIZE]) {
    for (byte, key) in state.iter_mut().zip(round_key) {
        *byte ^= key;
    }
}

#[inline(always)]
fn sub_bytes(state: &mut [u8; BLOCK_SIZE]) {
    for byte in state.iter_mut() {
        *byte = sub_byte(*byte);
    }
}

/// State is column-major: byte `r + 4c` is row `r` of column `c`. Row `r` rotates left by `r`.
#[inline(always)]
fn shift_rows(state: &mut [u8; BLOCK_SIZE]) {
    let prev = *state;
    for c in 0..4 {
        for r in 1..4 {
            state[r + 4 * c] = prev[r + 4 * ((c + r) % 4)];
        }
    }
}

#[inline(always)]
fn mix_columns(state: &mut [u8; BLOCK_SIZE]) {
    for column in state.chunks_exact_mut(4) {
        let [a0, a1, a2, a3] = [column[0], column[1], column[2], column[3]];
        let all = a0 ^ a1 ^ a2 ^ a3;
        column[0] = a0 ^ all ^ xtime(a0 ^ a1);
        column[1] = a1 ^ all ^ xtime(a1 ^ a2);
        column[2] = a2 ^ all ^ xtime(a2 ^ a3);
        column[3] = a3 ^ all ^ xtime(a3 ^ a0);
    }
}

/// Encrypts `block` in place with the given round keys (`rounds + 1` entries).
pub(super) fn encrypt(round_keys: &[[u8; BLOCK_SIZE]], block: &mut [u8; BLOCK_SIZE]) {
    let rounds = round_keys.len() - 1;
    add_round_key(block, &round_keys[0]);
    for round_key in &round_keys[1..rounds] {
        sub_bytes(block);
        shift_rows(block);
        mix_columns(block);
        add_round_key(block, round_key);
    }
    sub_bytes(block);
    shift_rows(block);
    add_round_key(block, &round_keys[rounds]);
}
