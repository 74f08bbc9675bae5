#![no_main]

use ::ctr::cipher::{KeyIvInit, StreamCipher};
use arbitrary::Arbitrary;
use commonware_primitives::{ctr::encrypt, Backend, Ctr, ExpandedKey};
use libfuzzer_sys::fuzz_target;

type RefAes128Ctr = ::ctr::Ctr128BE<::aes::Aes128>;
type RefAes256Ctr = ::ctr::Ctr128BE<::aes::Aes256>;

#[derive(Debug, Arbitrary)]
pub struct FuzzInput {
    pub key: [u8; 32],
    pub wide_key: bool,
    pub counter: u64,
    pub offset: u16,
    pub chunks: Vec<Vec<u8>>,
    pub case_selector: u8,
}

fn expand(input: &FuzzInput) -> ExpandedKey {
    if input.wide_key {
        ExpandedKey::from(&input.key)
    } else {
        let mut key = [0u8; 16];
        key.copy_from_slice(&input.key[..16]);
        ExpandedKey::from(&key)
    }
}

// Chunked streaming vs one-shot
fn fuzz_chunked_vs_whole(input: &FuzzInput) {
    let key = expand(input);
    let mut stream = Ctr::new(&key, input.counter);
    let mut streamed = Vec::new();
    for chunk in &input.chunks {
        let mut output = vec![0u8; chunk.len()];
        stream.process(chunk, &mut output);
        streamed.extend_from_slice(&output);
    }
    assert_eq!(
        streamed,
        encrypt(&key, input.counter, &input.chunks.concat())
    );
}

// Applying the key-stream twice restores the input
fn fuzz_involution(input: &FuzzInput) {
    let key = expand(input);
    let data = input.chunks.concat();
    let ciphertext = encrypt(&key, input.counter, &data);
    assert_eq!(encrypt(&key, input.counter, &ciphertext), data);
}

// Differential fuzzing against RustCrypto (counter kept clear of the 64-bit wrap)
fn fuzz_diff_reference(input: &FuzzInput) {
    let key = expand(input);
    let data = input.chunks.concat();
    let counter = input.counter >> 1;
    let mut iv = [0u8; 16];
    iv[8..].copy_from_slice(&counter.to_be_bytes());

    let mut expected = data.clone();
    if input.wide_key {
        RefAes256Ctr::new(&input.key.into(), &iv.into()).apply_keystream(&mut expected);
    } else {
        let mut short = [0u8; 16];
        short.copy_from_slice(&input.key[..16]);
        RefAes128Ctr::new(&short.into(), &iv.into()).apply_keystream(&mut expected);
    }
    assert_eq!(encrypt(&key, counter, &data), expected);
}

// Seeking into the key-stream
fn fuzz_at_offset(input: &FuzzInput) {
    let key = expand(input);
    let data = input.chunks.concat();
    let offset = (input.offset as usize).min(data.len());
    let expected = encrypt(&key, input.counter, &data);

    let mut tail = data[offset..].to_vec();
    Ctr::at_offset(&key, input.counter, offset as u64).apply_keystream(&mut tail);
    assert_eq!(tail, expected[offset..]);
}

// Hardware and portable streams agree
fn fuzz_backends(input: &FuzzInput) {
    if !Backend::Hardware.is_block_cipher_available() {
        return;
    }
    let key = expand(input);
    let mut hardware = Ctr::with_backend(&key, input.counter, Backend::Hardware);
    let mut portable = Ctr::with_backend(&key, input.counter, Backend::Portable);
    for chunk in &input.chunks {
        let mut a = chunk.clone();
        let mut b = chunk.clone();
        hardware.apply_keystream(&mut a);
        portable.apply_keystream(&mut b);
        assert_eq!(a, b);
    }
    assert_eq!(hardware.counter(), portable.counter());
    assert_eq!(hardware.buffered(), portable.buffered());
}

fn fuzz(input: FuzzInput) {
    match input.case_selector % 5 {
        0 => fuzz_chunked_vs_whole(&input),
        1 => fuzz_involution(&input),
        2 => fuzz_diff_reference(&input),
        3 => fuzz_at_offset(&input),
        4 => fuzz_backends(&input),
        _ => unreachable!(),
    }
}

fuzz_target!(|input: FuzzInput| {
    fuzz(input);
});
