//! Incremental CRC32C (Castagnoli) checksums.
//!
//! The register starts at `0x82F63B78` (the reflected encoding of `x^32` modulo the
//! Castagnoli polynomial) and is not inverted on output. The 4-byte digest lists the
//! checksum polynomial's coefficients from the highest degree down, which is the reflected
//! register written least-significant byte first. Output does not depend on host endianness.
//!
//! The register is folded with the CPU's CRC32C instruction when [cpu::supports_hw_crc]
//! reports support, otherwise with a slicing-by-8 table. Both paths compute the same
//! function, so a checksum may be built from any mix of calls.
//!
//! # Example
//! ```rust
//! use commonware_primitives::Crc32c;
//!
//! // Incremental
//! let mut crc = Crc32c::new();
//! crc.update(b"hello ");
//! crc.update(b"world");
//! let digest = crc.finalize();
//!
//! // One-shot
//! assert_eq!(digest, Crc32c::checksum(b"hello world"));
//! assert_eq!(digest, [0xca, 0x13, 0x0b, 0xaa]);
//! ```

use crate::cpu::{self, Backend};

mod portable;

/// Size of a CRC32C digest in bytes.
pub const SIZE: usize = 4;

/// Reflected Castagnoli polynomial (`0x1EDC6F41` bit-reversed).
const POLYNOMIAL: u32 = 0x82F6_3B78;

/// Register value before any input is folded.
const INITIAL: u32 = POLYNOMIAL;

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "x86_64", not(feature = "portable")))] {
        mod x86_64;

        fn hardware(crc: u32, data: &[u8]) -> u32 {
            // SAFETY: only reached after `cpu::supports_hw_crc` confirmed sse4.2.
            unsafe { x86_64::update(crc, data) }
        }
    } else if #[cfg(all(target_arch = "aarch64", not(feature = "portable")))] {
        mod aarch64;

        fn hardware(crc: u32, data: &[u8]) -> u32 {
            // SAFETY: only reached after `cpu::supports_hw_crc` confirmed the crc extension.
            unsafe { aarch64::update(crc, data) }
        }
    } else {
        fn hardware(_: u32, _: &[u8]) -> u32 {
            unreachable!("no hardware crc32c on this target")
        }
    }
}

/// Folds `data` into `crc` using `backend`.
///
/// # Panics
///
/// Panics if `backend` is [Backend::Hardware] and the CPU has no CRC32C instruction.
fn fold(backend: Backend, crc: u32, data: &[u8]) -> u32 {
    match backend {
        Backend::Portable => portable::update(crc, data),
        Backend::Hardware => {
            assert!(
                cpu::supports_hw_crc(),
                "hardware crc32c is not supported on this cpu"
            );
            hardware(crc, data)
        }
    }
}

/// Incremental CRC32C hasher for computing checksums over multiple data chunks.
///
/// Cloning a hasher forks the running checksum.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Crc32c {
    state: u32,
}

impl Default for Crc32c {
    fn default() -> Self {
        Self::new()
    }
}

impl Crc32c {
    /// Create a new incremental hasher.
    #[inline]
    pub fn new() -> Self {
        Self { state: INITIAL }
    }

    /// Add data to the checksum computation.
    ///
    /// The backend is resolved once per call.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        self.update_with(Backend::crc(), data);
    }

    /// Add data to the checksum computation using an explicit [Backend].
    ///
    /// # Panics
    ///
    /// Panics if `backend` is not available on this CPU (see [Backend::is_crc_available]).
    pub fn update_with(&mut self, backend: Backend, data: &[u8]) {
        if data.is_empty() {
            return;
        }
        self.state = fold(backend, self.state, data);
    }

    /// Finalize and return the digest.
    #[inline]
    pub fn finalize(self) -> [u8; SIZE] {
        self.state.to_le_bytes()
    }

    /// Compute the CRC32C digest of the given data.
    #[inline]
    pub fn checksum(data: &[u8]) -> [u8; SIZE] {
        let mut hasher = Self::new();
        hasher.update(data);
        hasher.finalize()
    }
}
