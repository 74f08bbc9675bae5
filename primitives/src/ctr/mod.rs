//! Counter-mode (CTR) encryption over AES.
//!
//! Key-stream block `i` is the encryption of the 16-byte big-endian encoding of the 64-bit
//! block counter `i` (the upper eight bytes are always zero). Data is XORed against the
//! key-stream, so encryption and decryption are the same operation.
//!
//! A [Ctr] keeps the unused tail of its last key-stream block between calls: splitting input
//! across any number of calls produces the same output as one call over the concatenation,
//! which in turn equals [encrypt] from the same initial counter.
//!
//! The counter is a raw block index supplied by the caller. No nonce is mixed in and the
//! counter wraps after `2^64` blocks; callers must not encrypt more than `2^64` blocks with one
//! key and starting counter.
//!
//! # Example
//! ```rust
//! use commonware_primitives::{ctr, Ctr, ExpandedKey};
//!
//! let key = ExpandedKey::from(&[0x42; 32]);
//! let plaintext = b"a message that spans more than one block";
//!
//! // Stream the message in pieces
//! let mut stream = Ctr::new(&key, 7);
//! let mut ciphertext = plaintext.to_vec();
//! let (head, tail) = ciphertext.split_at_mut(5);
//! stream.apply_keystream(head);
//! stream.apply_keystream(tail);
//!
//! // Matches the one-shot result, which also decrypts
//! assert_eq!(ciphertext, ctr::encrypt(&key, 7, plaintext));
//! assert_eq!(ctr::encrypt(&key, 7, &ciphertext), plaintext);
//! ```

use crate::{
    aes::{ExpandedKey, BLOCK_SIZE},
    cpu::Backend,
};
use rayon::prelude::*;
use std::fmt;
use tracing::debug;
use zeroize::Zeroize;

/// Bytes encrypted by each worker in [par_encrypt_in_place] (a whole number of blocks).
pub const PARALLEL_REGION: usize = 64 * 1024;

/// XORs `keystream` into `data` (which must not be longer).
#[inline(always)]
fn xor(data: &mut [u8], keystream: &[u8]) {
    for (byte, key) in data.iter_mut().zip(keystream) {
        *byte ^= key;
    }
}

/// Streaming CTR state over a borrowed [ExpandedKey].
///
/// The key must outlive every stream built on it. Streams are single-writer; independent
/// streams (even over the same key) can run in parallel.
pub struct Ctr<'a> {
    key: &'a ExpandedKey,
    backend: Backend,

    /// Index of the next key-stream block to generate.
    counter: u64,

    /// Last generated key-stream block.
    block: [u8; BLOCK_SIZE],

    /// Bytes of `block` already consumed (`BLOCK_SIZE` when empty).
    offset: usize,
}

impl<'a> Ctr<'a> {
    /// Create a stream whose first key-stream block is block `counter`.
    pub fn new(key: &'a ExpandedKey, counter: u64) -> Self {
        Self::with_backend(key, counter, Backend::block_cipher())
    }

    /// Create a stream that encrypts key-stream blocks with an explicit [Backend].
    ///
    /// # Panics
    ///
    /// Panics if `backend` is not available on this CPU (see
    /// [Backend::is_block_cipher_available]).
    pub fn with_backend(key: &'a ExpandedKey, counter: u64, backend: Backend) -> Self {
        assert!(
            backend.is_block_cipher_available(),
            "aes backend {backend:?} is not supported on this cpu"
        );
        Self {
            key,
            backend,
            counter,
            block: [0u8; BLOCK_SIZE],
            offset: BLOCK_SIZE,
        }
    }

    /// Create a stream positioned `offset` bytes into the key-stream that starts at block
    /// `counter`.
    ///
    /// Used to encrypt or decrypt a region of a larger message without processing the bytes
    /// before it.
    pub fn at_offset(key: &'a ExpandedKey, counter: u64, offset: u64) -> Self {
        let mut stream = Self::new(key, counter.wrapping_add(offset / BLOCK_SIZE as u64));
        let skip = (offset % BLOCK_SIZE as u64) as usize;
        if skip > 0 {
            stream.refill();
            stream.offset = skip;
        }
        stream
    }

    /// Returns the index of the next key-stream block this stream will generate.
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Returns the number of generated key-stream bytes not yet consumed.
    pub fn buffered(&self) -> usize {
        BLOCK_SIZE - self.offset
    }

    /// Generates the key-stream block for the current counter and advances the counter.
    fn refill(&mut self) {
        self.block = [0u8; BLOCK_SIZE];
        self.block[8..].copy_from_slice(&self.counter.to_be_bytes());
        self.key.encrypt_block_with(self.backend, &mut self.block);
        self.counter = self.counter.wrapping_add(1);
        self.offset = 0;
    }

    /// Encrypts (or decrypts) `buf` in place.
    pub fn apply_keystream(&mut self, buf: &mut [u8]) {
        // Consume what is left of the previous block
        let buffered = self.buffered().min(buf.len());
        let (head, rest) = buf.split_at_mut(buffered);
        xor(head, &self.block[self.offset..self.offset + buffered]);
        self.offset += buffered;

        let mut blocks = rest.chunks_exact_mut(BLOCK_SIZE);
        for chunk in blocks.by_ref() {
            self.refill();
            xor(chunk, &self.block);
            self.offset = BLOCK_SIZE;
        }

        // Keep the unused tail of a partial block for the next call
        let tail = blocks.into_remainder();
        if !tail.is_empty() {
            self.refill();
            xor(tail, &self.block[..tail.len()]);
            self.offset = tail.len();
        }
    }

    /// Encrypts (or decrypts) `input` into `output`.
    ///
    /// # Panics
    ///
    /// Panics if `input` and `output` differ in length.
    pub fn process(&mut self, input: &[u8], output: &mut [u8]) {
        assert_eq!(
            input.len(),
            output.len(),
            "input and output must have the same length"
        );
        output.copy_from_slice(input);
        self.apply_keystream(output);
    }
}

impl fmt::Debug for Ctr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ctr")
            .field("key", self.key)
            .field("backend", &self.backend)
            .field("counter", &self.counter)
            .field("buffered", &self.buffered())
            .field("block", &"[REDACTED]")
            .finish()
    }
}

impl Drop for Ctr<'_> {
    fn drop(&mut self) {
        self.block.zeroize();
    }
}

/// Encrypts (or decrypts) `data` starting at key-stream block `counter`.
pub fn encrypt(key: &ExpandedKey, counter: u64, data: &[u8]) -> Vec<u8> {
    let mut output = data.to_vec();
    encrypt_in_place(key, counter, &mut output);
    output
}

/// Encrypts (or decrypts) `buf` in place starting at key-stream block `counter`.
pub fn encrypt_in_place(key: &ExpandedKey, counter: u64, buf: &mut [u8]) {
    Ctr::new(key, counter).apply_keystream(buf);
}

/// Encrypts (or decrypts) `buf` in place on the rayon thread pool.
///
/// `buf` is split into [PARALLEL_REGION]-byte regions, each processed by its own [Ctr] seeded
/// with the block index at which the region starts. Output is identical to [encrypt_in_place].
pub fn par_encrypt_in_place(key: &ExpandedKey, counter: u64, buf: &mut [u8]) {
    debug!(
        len = buf.len(),
        regions = buf.len().div_ceil(PARALLEL_REGION),
        "encrypting in parallel"
    );
    buf.par_chunks_mut(PARALLEL_REGION)
        .enumerate()
        .for_each(|(index, region)| {
            let start = counter.wrapping_add((index * (PARALLEL_REGION / BLOCK_SIZE)) as u64);
            Ctr::new(key, start).apply_keystream(region);
        });
}
