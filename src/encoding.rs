//! Little-endian conversion between bytes and state words.
//!
//! All endianness handling lives here so the permutation only ever sees
//! `u32` words.

use crate::{BLOCK_SIZE, STATE_WORDS};

/// Decode `4 * N` bytes into `N` little-endian words.
#[inline]
pub(crate) fn load_words<const N: usize>(bytes: &[u8]) -> [u32; N] {
    debug_assert_eq!(bytes.len(), 4 * N);
    let mut words = [0u32; N];
    for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
        *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
    }
    words
}

/// Encode the 16 state words as a 64-byte block, least-significant byte first.
#[inline]
pub(crate) fn store_words(words: &[u32; STATE_WORDS]) -> [u8; BLOCK_SIZE] {
    let mut block = [0u8; BLOCK_SIZE];
    for (chunk, word) in block.chunks_exact_mut(4).zip(words) {
        chunk.copy_from_slice(&word.to_le_bytes());
    }
    block
}

/// XOR `keystream` into `data`, stopping at the shorter of the two.
#[inline]
pub(crate) fn xor_in_place(data: &mut [u8], keystream: &[u8]) {
    data.iter_mut()
        .zip(keystream)
        .for_each(|(b, &ks)| *b ^= ks);
}
