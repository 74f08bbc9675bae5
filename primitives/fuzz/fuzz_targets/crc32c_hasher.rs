#![no_main]

use arbitrary::Arbitrary;
use commonware_primitives::{Backend, Crc32c};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
pub struct FuzzInput {
    pub chunks: Vec<Vec<u8>>,
    pub backends: Vec<bool>,
    pub case_selector: u8,
}

fn backend(hardware: bool) -> Backend {
    if hardware && Backend::Hardware.is_crc_available() {
        Backend::Hardware
    } else {
        Backend::Portable
    }
}

// Chunked vs all-at-once
fn fuzz_chunked_vs_whole(chunks: &[Vec<u8>]) {
    let mut hasher = Crc32c::new();
    let mut all_data = Vec::new();
    for chunk in chunks {
        all_data.extend_from_slice(chunk);
        hasher.update(chunk);
    }
    assert_eq!(hasher.finalize(), Crc32c::checksum(&all_data));
}

// Arbitrary mix of backends across calls
fn fuzz_mixed_backends(chunks: &[Vec<u8>], backends: &[bool]) {
    let mut mixed = Crc32c::new();
    let mut portable = Crc32c::new();
    for (i, chunk) in chunks.iter().enumerate() {
        let hardware = backends.get(i).copied().unwrap_or(false);
        mixed.update_with(backend(hardware), chunk);
        portable.update_with(Backend::Portable, chunk);
    }
    assert_eq!(mixed.finalize(), portable.finalize());
}

// Differential fuzzing against a bit-at-a-time model of the register
fn fuzz_diff_bitwise(chunks: &[Vec<u8>]) {
    let mut state: u32 = 0x82F6_3B78;
    for byte in chunks.iter().flatten() {
        state ^= *byte as u32;
        for _ in 0..8 {
            state = if state & 1 == 1 {
                (state >> 1) ^ 0x82F6_3B78
            } else {
                state >> 1
            };
        }
    }
    assert_eq!(Crc32c::checksum(&chunks.concat()), state.to_le_bytes());
}

// Forking a running checksum
fn fuzz_clone(chunks: &[Vec<u8>]) {
    let Some((last, rest)) = chunks.split_last() else {
        return;
    };
    let mut hasher = Crc32c::default();
    for chunk in rest {
        hasher.update(chunk);
    }
    let mut fork = hasher.clone();
    fork.update(last);
    hasher.update(last);
    assert_eq!(hasher.finalize(), fork.finalize());
}

fn fuzz(input: FuzzInput) {
    match input.case_selector % 4 {
        0 => fuzz_chunked_vs_whole(&input.chunks),
        1 => fuzz_mixed_backends(&input.chunks, &input.backends),
        2 => fuzz_diff_bitwise(&input.chunks),
        3 => fuzz_clone(&input.chunks),
        _ => unreachable!(),
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
