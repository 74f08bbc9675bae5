//! Detect CPU features used to accelerate checksums and block encryption.
//!
//! Detection runs at most once per process. The result is cached in a [OnceLock] and every
//! later query is a plain read of the cached [Capabilities]. A feature that cannot be detected
//! is reported as unsupported.
//!
//! When the `portable` feature is enabled, no hardware support is ever reported and every
//! primitive runs its portable implementation.

use std::sync::OnceLock;
use tracing::debug;

/// Process-wide detection result.
static CAPABILITIES: OnceLock<Capabilities> = OnceLock::new();

/// Hardware features relevant to this crate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// The CPU has a CRC32C (Castagnoli) instruction.
    pub crc: bool,

    /// The CPU has AES round instructions.
    pub aes: bool,
}

cfg_if::cfg_if! {
    if #[cfg(feature = "portable")] {
        fn detect() -> Capabilities {
            Capabilities::default()
        }
    } else if #[cfg(target_arch = "x86_64")] {
        fn detect() -> Capabilities {
            Capabilities {
                crc: std::arch::is_x86_feature_detected!("sse4.2"),
                aes: std::arch::is_x86_feature_detected!("aes"),
            }
        }
    } else if #[cfg(target_arch = "aarch64")] {
        fn detect() -> Capabilities {
            Capabilities {
                crc: std::arch::is_aarch64_feature_detected!("crc"),
                aes: std::arch::is_aarch64_feature_detected!("aes"),
            }
        }
    } else {
        fn detect() -> Capabilities {
            Capabilities::default()
        }
    }
}

/// Returns the cached [Capabilities] of the running CPU, detecting them on first use.
pub fn capabilities() -> Capabilities {
    *CAPABILITIES.get_or_init(|| {
        let detected = detect();
        debug!(
            crc = detected.crc,
            aes = detected.aes,
            arch = std::env::consts::ARCH,
            "detected cpu capabilities"
        );
        detected
    })
}

/// Returns whether the CPU can compute CRC32C in hardware.
#[inline]
pub fn supports_hw_crc() -> bool {
    capabilities().crc
}

/// Returns whether the CPU can compute AES rounds in hardware.
#[inline]
pub fn supports_hw_block_cipher() -> bool {
    capabilities().aes
}

/// Implementation strategy for a primitive.
///
/// Both strategies of a primitive produce identical output for identical input. [Backend::crc]
/// and [Backend::block_cipher] return the fastest strategy available on this CPU; an explicit
/// [Backend] can be passed to the `*_with` entry points to force one path (e.g. to compare them).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Dedicated CPU instructions.
    Hardware,
    /// Table-driven software, available everywhere.
    Portable,
}

impl Backend {
    /// Returns the preferred backend for CRC32C.
    #[inline]
    pub fn crc() -> Self {
        if supports_hw_crc() {
            Self::Hardware
        } else {
            Self::Portable
        }
    }

    /// Returns the preferred backend for AES block encryption.
    #[inline]
    pub fn block_cipher() -> Self {
        if supports_hw_block_cipher() {
            Self::Hardware
        } else {
            Self::Portable
        }
    }

    /// Returns whether this backend can compute CRC32C on the running CPU.
    pub fn is_crc_available(self) -> bool {
        match self {
            Self::Hardware => supports_hw_crc(),
            Self::Portable => true,
        }
    }

    /// Returns whether this backend can encrypt AES blocks on the running CPU.
    pub fn is_block_cipher_available(self) -> bool {
        match self {
            Self::Hardware => supports_hw_block_cipher(),
            Self::Portable => true,
        }
    }
}
