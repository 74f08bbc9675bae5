//! AES-128 and AES-256 single-block encryption.
//!
//! An [ExpandedKey] holds the round keys derived from a 16- or 32-byte key. It is immutable
//! once created, so one key can be shared by reference across any number of streams and
//! threads. Round-key material is zeroized when the key is dropped.
//!
//! Blocks are encrypted with AES instructions when [cpu::supports_hw_block_cipher] reports
//! support, otherwise with a byte-oriented implementation. Both paths share the same key
//! schedule and produce identical output.
//!
//! # Example
//! ```rust
//! use commonware_primitives::ExpandedKey;
//!
//! let key = ExpandedKey::new(&[0u8; 32]).unwrap();
//! let mut block = [0u8; 16];
//! key.encrypt_block(&mut block);
//! assert_ne!(block, [0u8; 16]);
//! ```

use crate::{
    cpu::{self, Backend},
    Error,
};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

mod portable;

/// Size of an AES block in bytes.
pub const BLOCK_SIZE: usize = 16;

/// Round keys needed by the largest supported key (14 rounds plus whitening).
const MAX_ROUND_KEYS: usize = 15;

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "x86_64", not(feature = "portable")))] {
        mod x86_64;

        fn hardware(round_keys: &[[u8; BLOCK_SIZE]], block: &mut [u8; BLOCK_SIZE]) {
            // SAFETY: only reached after `cpu::supports_hw_block_cipher` confirmed aes.
            unsafe { x86_64::encrypt(round_keys, block) }
        }

        fn hardware_expand(key: &[u8], round_keys: &mut [[u8; BLOCK_SIZE]]) {
            // SAFETY: only reached after `cpu::supports_hw_block_cipher` confirmed aes.
            portable::expand_key_with(key, round_keys, |word| unsafe { x86_64::sub_word(word) });
        }
    } else if #[cfg(all(target_arch = "aarch64", not(feature = "portable")))] {
        mod aarch64;

        fn hardware(round_keys: &[[u8; BLOCK_SIZE]], block: &mut [u8; BLOCK_SIZE]) {
            // SAFETY: only reached after `cpu::supports_hw_block_cipher` confirmed aes.
            unsafe { aarch64::encrypt(round_keys, block) }
        }

        fn hardware_expand(key: &[u8], round_keys: &mut [[u8; BLOCK_SIZE]]) {
            // SAFETY: only reached after `cpu::supports_hw_block_cipher` confirmed aes.
            portable::expand_key_with(key, round_keys, |word| unsafe { aarch64::sub_word(word) });
        }
    } else {
        fn hardware(_: &[[u8; BLOCK_SIZE]], _: &mut [u8; BLOCK_SIZE]) {
            unreachable!("no hardware aes on this target")
        }

        fn hardware_expand(_: &[u8], _: &mut [[u8; BLOCK_SIZE]]) {
            unreachable!("no hardware aes on this target")
        }
    }
}

/// Supported AES key sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeySize {
    /// 16-byte key, 10 rounds.
    Aes128,
    /// 32-byte key, 14 rounds.
    Aes256,
}

impl KeySize {
    /// Returns the key size matching a key of `len` bytes.
    pub fn from_key_len(len: usize) -> Result<Self, Error> {
        match len {
            16 => Ok(Self::Aes128),
            32 => Ok(Self::Aes256),
            _ => Err(Error::InvalidKeyLength(len)),
        }
    }

    /// Length of the raw key in bytes.
    pub const fn key_len(self) -> usize {
        match self {
            Self::Aes128 => 16,
            Self::Aes256 => 32,
        }
    }

    /// Number of cipher rounds.
    pub const fn rounds(self) -> usize {
        match self {
            Self::Aes128 => 10,
            Self::Aes256 => 14,
        }
    }
}

/// Round keys derived from an AES key.
///
/// Round keys are wiped when the key is dropped. There is no way to wipe a key that is still
/// in use.
pub struct ExpandedKey {
    round_keys: [[u8; BLOCK_SIZE]; MAX_ROUND_KEYS],
    size: KeySize,
}

impl ExpandedKey {
    /// Expands a 16-byte (AES-128) or 32-byte (AES-256) key.
    pub fn new(key: &[u8]) -> Result<Self, Error> {
        let size = KeySize::from_key_len(key.len())?;
        Ok(Self::expand(size, key))
    }

    fn expand(size: KeySize, key: &[u8]) -> Self {
        Self::expand_with(Backend::block_cipher(), size, key)
    }

    /// Derives the round keys, computing the S-box step with `backend`.
    fn expand_with(backend: Backend, size: KeySize, key: &[u8]) -> Self {
        let mut expanded = Self {
            round_keys: [[0u8; BLOCK_SIZE]; MAX_ROUND_KEYS],
            size,
        };
        let round_keys = &mut expanded.round_keys[..=size.rounds()];
        match backend {
            Backend::Portable => portable::expand_key(key, round_keys),
            Backend::Hardware => {
                assert!(
                    cpu::supports_hw_block_cipher(),
                    "hardware aes is not supported on this cpu"
                );
                hardware_expand(key, round_keys);
            }
        }
        expanded
    }

    fn wipe(&mut self) {
        self.round_keys.zeroize();
    }

    /// Returns the size of the key this schedule was expanded from.
    pub fn size(&self) -> KeySize {
        self.size
    }

    fn round_keys(&self) -> &[[u8; BLOCK_SIZE]] {
        &self.round_keys[..=self.size.rounds()]
    }

    /// Encrypts one block in place using the preferred [Backend].
    #[inline]
    pub fn encrypt_block(&self, block: &mut [u8; BLOCK_SIZE]) {
        self.encrypt_block_with(Backend::block_cipher(), block);
    }

    /// Encrypts one block in place using an explicit [Backend].
    ///
    /// # Panics
    ///
    /// Panics if `backend` is not available on this CPU (see
    /// [Backend::is_block_cipher_available]).
    pub fn encrypt_block_with(&self, backend: Backend, block: &mut [u8; BLOCK_SIZE]) {
        match backend {
            Backend::Portable => portable::encrypt(self.round_keys(), block),
            Backend::Hardware => {
                assert!(
                    cpu::supports_hw_block_cipher(),
                    "hardware aes is not supported on this cpu"
                );
                hardware(self.round_keys(), block);
            }
        }
    }
}

impl From<&[u8; 16]> for ExpandedKey {
    fn from(key: &[u8; 16]) -> Self {
        Self::expand(KeySize::Aes128, key)
    }
}

impl From<&[u8; 32]> for ExpandedKey {
    fn from(key: &[u8; 32]) -> Self {
        Self::expand(KeySize::Aes256, key)
    }
}

impl TryFrom<&[u8]> for ExpandedKey {
    type Error = Error;

    fn try_from(key: &[u8]) -> Result<Self, Self::Error> {
        Self::new(key)
    }
}

impl Drop for ExpandedKey {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl ZeroizeOnDrop for ExpandedKey {}

impl fmt::Debug for ExpandedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpandedKey")
            .field("size", &self.size)
            .field("round_keys", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ::aes::cipher::{BlockEncrypt, KeyInit};
    use rand::{rngs::StdRng, RngCore, SeedableRng};
    use test_case::test_case;

    const FIPS_PLAINTEXT: [u8; BLOCK_SIZE] = [
        0x00, 0x11, 0x22, 0x33, 0x44, 0x55, 0x66, 0x77, 0x88, 0x99, 0xaa, 0xbb, 0xcc, 0xdd, 0xee,
        0xff,
    ];

    fn backends() -> Vec<Backend> {
        [Backend::Portable, Backend::Hardware]
            .into_iter()
            .filter(|backend| backend.is_block_cipher_available())
            .collect()
    }

    fn sequential_key(len: usize) -> Vec<u8> {
        (0..len as u8).collect()
    }

    // FIPS-197 Appendix C.1 and C.3
    #[test_case(16, [0x69, 0xc4, 0xe0, 0xd8, 0x6a, 0x7b, 0x04, 0x30, 0xd8, 0xcd, 0xb7, 0x80, 0x70, 0xb4, 0xc5, 0x5a]; "aes128")]
    #[test_case(32, [0x8e, 0xa2, 0xb7, 0xca, 0x51, 0x67, 0x45, 0xbf, 0xea, 0xfc, 0x49, 0x90, 0x4b, 0x49, 0x60, 0x89]; "aes256")]
    fn test_fips197(key_len: usize, expected: [u8; BLOCK_SIZE]) {
        let key = ExpandedKey::new(&sequential_key(key_len)).unwrap();
        for backend in backends() {
            let mut block = FIPS_PLAINTEXT;
            key.encrypt_block_with(backend, &mut block);
            assert_eq!(block, expected, "{backend:?}");
        }
        let mut block = FIPS_PLAINTEXT;
        key.encrypt_block(&mut block);
        assert_eq!(block, expected);
    }

    #[test_case(0; "empty")]
    #[test_case(15; "short")]
    #[test_case(17; "long")]
    #[test_case(24; "aes192")]
    #[test_case(64; "oversized")]
    fn test_invalid_key_length(len: usize) {
        let key = vec![0x42; len];
        assert_eq!(
            ExpandedKey::new(&key).unwrap_err(),
            Error::InvalidKeyLength(len)
        );
        assert!(ExpandedKey::try_from(key.as_slice()).is_err());
    }

    #[test]
    fn test_key_size() {
        assert_eq!(ExpandedKey::from(&[0u8; 16]).size(), KeySize::Aes128);
        assert_eq!(ExpandedKey::from(&[0u8; 32]).size(), KeySize::Aes256);
        assert_eq!(KeySize::Aes128.key_len(), 16);
        assert_eq!(KeySize::Aes256.key_len(), 32);
        assert_eq!(KeySize::from_key_len(32), Ok(KeySize::Aes256));
    }

    #[test]
    fn test_typed_constructors_match_slice() {
        let raw = [7u8; 32];
        let mut typed = [1u8; BLOCK_SIZE];
        let mut sliced = typed;
        ExpandedKey::from(&raw).encrypt_block(&mut typed);
        ExpandedKey::new(&raw).unwrap().encrypt_block(&mut sliced);
        assert_eq!(typed, sliced);
    }

    #[test]
    fn test_hardware_matches_portable() {
        if !Backend::Hardware.is_block_cipher_available() {
            return;
        }
        let mut rng = StdRng::seed_from_u64(0);
        for key_len in [16, 32] {
            for _ in 0..64 {
                let mut raw = vec![0u8; key_len];
                rng.fill_bytes(&mut raw);
                let key = ExpandedKey::new(&raw).unwrap();

                let mut portable = [0u8; BLOCK_SIZE];
                rng.fill_bytes(&mut portable);
                let mut hardware = portable;
                key.encrypt_block_with(Backend::Portable, &mut portable);
                key.encrypt_block_with(Backend::Hardware, &mut hardware);
                assert_eq!(portable, hardware);
            }
        }
    }

    #[test]
    fn test_reference_crate() {
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..32 {
            let mut block = [0u8; BLOCK_SIZE];
            rng.fill_bytes(&mut block);

            let mut raw = [0u8; 16];
            rng.fill_bytes(&mut raw);
            let mut expected = ::aes::Block::clone_from_slice(&block);
            ::aes::Aes128::new_from_slice(&raw)
                .unwrap()
                .encrypt_block(&mut expected);
            for backend in backends() {
                let mut actual = block;
                ExpandedKey::from(&raw).encrypt_block_with(backend, &mut actual);
                assert_eq!(actual.as_slice(), expected.as_slice(), "{backend:?}");
            }

            let mut raw = [0u8; 32];
            rng.fill_bytes(&mut raw);
            let mut expected = ::aes::Block::clone_from_slice(&block);
            ::aes::Aes256::new_from_slice(&raw)
                .unwrap()
                .encrypt_block(&mut expected);
            for backend in backends() {
                let mut actual = block;
                ExpandedKey::from(&raw).encrypt_block_with(backend, &mut actual);
                assert_eq!(actual.as_slice(), expected.as_slice(), "{backend:?}");
            }
        }
    }

    #[test]
    fn test_hardware_schedule_matches_portable() {
        if !Backend::Hardware.is_block_cipher_available() {
            return;
        }
        let mut rng = StdRng::seed_from_u64(2);
        for size in [KeySize::Aes128, KeySize::Aes256] {
            for _ in 0..64 {
                let mut raw = vec![0u8; size.key_len()];
                rng.fill_bytes(&mut raw);
                let portable = ExpandedKey::expand_with(Backend::Portable, size, &raw);
                let hardware = ExpandedKey::expand_with(Backend::Hardware, size, &raw);
                assert_eq!(portable.round_keys(), hardware.round_keys(), "{size:?}");
            }
        }
    }

    #[test]
    fn test_wiped_on_drop() {
        fn assert_zeroize_on_drop<T: ZeroizeOnDrop>() {}
        assert_zeroize_on_drop::<ExpandedKey>();

        let mut key = ExpandedKey::from(&[0xFF; 32]);
        assert!(key.round_keys().iter().flatten().any(|&b| b != 0));
        key.wipe();
        assert!(key.round_keys.iter().flatten().all(|&b| b == 0));
    }

    #[test]
    fn test_debug_redacted() {
        let key = ExpandedKey::from(&[0xAB; 16]);
        let debug = format!("{key:?}");
        assert!(debug.contains("REDACTED"));
        assert!(debug.contains("Aes128"));
        assert!(!debug.contains("171"));
    }

    #[test]
    fn test_shared_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ExpandedKey>();

        let key = ExpandedKey::from(&[3u8; 16]);
        let mut expected = [0u8; BLOCK_SIZE];
        key.encrypt_block(&mut expected);
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    let mut block = [0u8; BLOCK_SIZE];
                    key.encrypt_block(&mut block);
                    assert_eq!(block, expected);
                });
            }
        });
    }

    #[test]
    #[cfg(feature = "portable")]
    #[should_panic(expected = "hardware aes is not supported")]
    fn test_forced_hardware_panics_when_unavailable() {
        let key = ExpandedKey::from(&[0u8; 16]);
        key.encrypt_block_with(Backend::Hardware, &mut [0u8; BLOCK_SIZE]);
    }
}
