//! Compute CRC32C checksums and AES-CTR key-streams with runtime hardware dispatch.
//!
//! Both primitives select a hardware-accelerated path when the running CPU supports it
//! (SSE4.2 and AES-NI on x86_64, the `crc` and `aes` extensions on aarch64) and otherwise
//! fall back to a portable implementation with byte-identical output. Output never depends
//! on how input is split across calls.
//!
//! # Example
//!
//! ```rust
//! use commonware_primitives::{ctr, Crc32c, ExpandedKey};
//!
//! // Checksum a message in two pieces
//! let mut crc = Crc32c::new();
//! crc.update(b"hello ");
//! crc.update(b"world");
//! assert_eq!(crc.finalize(), [0xca, 0x13, 0x0b, 0xaa]);
//!
//! // Encrypt a message starting at block 0
//! let key = ExpandedKey::from(&[0u8; 16]);
//! let ciphertext = ctr::encrypt(&key, 0, b"attack at dawn");
//! assert_eq!(ctr::encrypt(&key, 0, &ciphertext), b"attack at dawn");
//! ```
//!
//! # Status
//!
//! `commonware-primitives` is **ALPHA** software and is not yet recommended for production use. Developers should
//! expect breaking changes and occasional instability.

use thiserror::Error;

pub mod aes;
pub use crate::aes::{ExpandedKey, KeySize};
pub mod cpu;
pub use crate::cpu::Backend;
pub mod crc32c;
pub use crate::crc32c::Crc32c;
pub mod ctr;
pub use crate::ctr::Ctr;

/// Errors that can occur when constructing primitives.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Error {
    #[error("invalid key length: {0} (expected 16 or 32)")]
    InvalidKeyLength(usize),
}
