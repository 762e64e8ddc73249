//! Runtime-configurable ChaCha state machine.
//!
//! [`ChaChaState`] owns the 16 state words and the round count. Constructing
//! one *is* initialization, so there is no uninitialized state to misuse.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use zeroize::Zeroize;

use crate::{
    BLOCK_SIZE, KeyLength, NONCE_SIZE, STATE_WORDS,
    encoding,
    error::{Error, Result},
    permutation,
    rounds::Rounds,
};

const COUNTER_LO: usize = 12;
const COUNTER_HI: usize = 13;
const NONCE_START: usize = 14;

/// Lay out constants, key, zero counter and nonce.
///
/// Lengths must already be validated: `key` holds `key_length.bytes()` bytes
/// and `nonce` holds [`NONCE_SIZE`] bytes.
pub(crate) fn load_state(key_length: KeyLength, key: &[u8], nonce: &[u8]) -> [u32; STATE_WORDS] {
    debug_assert_eq!(key.len(), key_length.bytes());
    debug_assert_eq!(nonce.len(), NONCE_SIZE);

    let mut words = [0u32; STATE_WORDS];
    words[..4].copy_from_slice(&encoding::load_words::<4>(key_length.constants()));

    let key_lo: [u32; 4] = encoding::load_words(&key[..16]);
    let key_hi: [u32; 4] = match key_length {
        // A 128-bit key fills both halves of the key block.
        KeyLength::Bits128 => key_lo,
        KeyLength::Bits256 => encoding::load_words(&key[16..32]),
    };
    words[4..8].copy_from_slice(&key_lo);
    words[8..12].copy_from_slice(&key_hi);

    words[NONCE_START..].copy_from_slice(&encoding::load_words::<2>(nonce));
    words
}

/// Validate buffer lengths, then lay out the state.
fn checked_state(key_length: KeyLength, key: &[u8], nonce: &[u8]) -> Result<[u32; STATE_WORDS]> {
    if key.len() != key_length.bytes() {
        return Err(Error::InvalidLength {
            context: "key",
            expected: key_length.bytes(),
            actual: key.len(),
        });
    }
    if nonce.len() != NONCE_SIZE {
        return Err(Error::InvalidLength {
            context: "nonce",
            expected: NONCE_SIZE,
            actual: nonce.len(),
        });
    }
    Ok(load_state(key_length, key, nonce))
}

/// Advance the 64-bit block counter by one, carrying from the low word into
/// the high word.
#[inline]
pub(crate) fn advance_counter(words: &mut [u32; STATE_WORDS]) {
    words[COUNTER_LO] = words[COUNTER_LO].wrapping_add(1);
    if words[COUNTER_LO] == 0 {
        words[COUNTER_HI] = words[COUNTER_HI].wrapping_add(1);
        if words[COUNTER_HI] == 0 {
            log::warn!("ChaCha block counter wrapped around 2^64, keystream will repeat");
        }
    }
}

#[inline]
pub(crate) fn block_counter(words: &[u32; STATE_WORDS]) -> u64 {
    (u64::from(words[COUNTER_HI]) << 32) | u64::from(words[COUNTER_LO])
}

#[inline]
pub(crate) fn set_block_counter(words: &mut [u32; STATE_WORDS], counter: u64) {
    words[COUNTER_LO] = counter as u32;
    words[COUNTER_HI] = (counter >> 32) as u32;
}

/// A keyed ChaCha instance producing keystream one 64-byte block at a time.
///
/// The same operations encrypt and decrypt, since applying the keystream is
/// an XOR. Each instance assumes exclusive ownership of its stream; give
/// concurrent users their own instance.
///
/// Running past 2^64 blocks for one key and nonce wraps the counter and
/// reuses keystream. Avoiding that is the caller's job.
#[derive(Clone, Zeroize)]
pub struct ChaChaState {
    words: [u32; STATE_WORDS],
    #[zeroize(skip)]
    rounds: Rounds,
    #[zeroize(skip)]
    key_length: KeyLength,
}

impl ChaChaState {
    /// Initialize a state from a key, its size in bits (128 or 256) and an
    /// 8-byte nonce. The block counter starts at zero and the round count
    /// defaults to 20.
    pub fn new(key: &[u8], key_bits: u32, nonce: &[u8]) -> Result<Self> {
        let key_length = KeyLength::from_bits(key_bits)?;
        let words = checked_state(key_length, key, nonce)?;
        let rounds = Rounds::default();
        log::debug!("initialized ChaCha state: {key_bits}-bit key, {rounds} rounds");
        Ok(Self {
            words,
            rounds,
            key_length,
        })
    }

    /// Replace the round count, builder style.
    pub fn with_rounds(mut self, rounds: Rounds) -> Self {
        self.rounds = rounds;
        self
    }

    /// Re-key in place. Key, nonce and counter are reset; the round count is
    /// kept. On error the state is left untouched.
    pub fn initialize(&mut self, key: &[u8], key_bits: u32, nonce: &[u8]) -> Result<()> {
        let key_length = KeyLength::from_bits(key_bits)?;
        self.words = checked_state(key_length, key, nonce)?;
        self.key_length = key_length;
        log::debug!(
            "re-initialized ChaCha state: {key_bits}-bit key, {} rounds",
            self.rounds
        );
        Ok(())
    }

    /// Set the number of rounds; must be even and non-zero.
    pub fn set_rounds(&mut self, rounds: u32) -> Result<()> {
        self.rounds = Rounds::new(rounds)?;
        log::debug!("ChaCha round count set to {rounds}");
        Ok(())
    }

    pub fn rounds(&self) -> Rounds {
        self.rounds
    }

    pub fn key_length(&self) -> KeyLength {
        self.key_length
    }

    /// The nonce bytes this state was initialized with.
    pub fn nonce(&self) -> [u8; NONCE_SIZE] {
        let mut nonce = [0u8; NONCE_SIZE];
        for (chunk, word) in nonce.chunks_exact_mut(4).zip(&self.words[NONCE_START..]) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        nonce
    }

    /// Index of the next block to be produced.
    pub fn block_counter(&self) -> u64 {
        block_counter(&self.words)
    }

    /// Seek to block `counter`; the next block produced uses this value.
    pub fn set_block_counter(&mut self, counter: u64) {
        log::trace!("ChaCha seek to block {counter}");
        set_block_counter(&mut self.words, counter);
    }

    /// Snapshot of the 16 state words, for diagnostics.
    pub fn words(&self) -> [u32; STATE_WORDS] {
        self.words
    }

    /// Produce the keystream block for the current counter and advance it.
    pub fn keystream_block(&mut self) -> [u8; BLOCK_SIZE] {
        let keystream = permutation::transform(&self.words, self.rounds);
        advance_counter(&mut self.words);
        keystream
    }

    /// XOR one keystream block into `block` in place.
    pub fn apply_block(&mut self, block: &mut [u8; BLOCK_SIZE]) {
        let keystream = self.keystream_block();
        encoding::xor_in_place(block, &keystream);
    }

    /// Encrypt or decrypt one 64-byte block. An all-zero input yields the raw
    /// keystream block.
    pub fn produce_block(&mut self, input: &[u8]) -> Result<[u8; BLOCK_SIZE]> {
        let mut block: [u8; BLOCK_SIZE] =
            input.try_into().map_err(|_| Error::InvalidLength {
                context: "block",
                expected: BLOCK_SIZE,
                actual: input.len(),
            })?;
        self.apply_block(&mut block);
        Ok(block)
    }

    /// XOR keystream into `data` in place. A trailing partial block uses only
    /// the keystream bytes it needs but still consumes a whole counter value.
    /// Empty input is a no-op.
    pub fn apply_keystream(&mut self, data: &mut [u8]) {
        log::trace!(
            "applying ChaCha keystream to {} bytes from block {}",
            data.len(),
            self.block_counter()
        );
        for chunk in data.chunks_mut(BLOCK_SIZE) {
            let keystream = self.keystream_block();
            encoding::xor_in_place(chunk, &keystream);
        }
    }

    /// Encrypt or decrypt an arbitrary-length byte sequence.
    pub fn produce_stream(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        if input.is_empty() {
            return Err(Error::EmptyInput {
                context: "produce_stream",
            });
        }
        let mut output = input.to_vec();
        self.apply_keystream(&mut output);
        Ok(output)
    }

    /// Raw keystream of `len` bytes.
    pub fn keystream(&mut self, len: usize) -> Result<Vec<u8>> {
        if len == 0 {
            return Err(Error::EmptyInput {
                context: "keystream",
            });
        }
        let mut output = vec![0u8; len];
        self.apply_keystream(&mut output);
        Ok(output)
    }
}

impl fmt::Debug for ChaChaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChaChaState")
            .field("key_length", &self.key_length)
            .field("rounds", &self.rounds)
            .field("block_counter", &self.block_counter())
            .finish_non_exhaustive()
    }
}
