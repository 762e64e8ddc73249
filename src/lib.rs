//! ChaCha stream cipher core.
//!
//! Two entry points share one permutation:
//!
//! * [`ChaChaState`], a runtime-configurable state machine (key size, round
//!   count and block counter chosen at run time) for test-vector work and
//!   callers that need block-level control.
//! * The `cipher` crate traits, through [`ChaChaCore`] and the
//!   `ChaCha*Cipher*` aliases, with key size and rounds fixed at compile
//!   time.
//!
//! The state uses the original 64-bit counter / 64-bit nonce layout.

#![no_std]
#![cfg_attr(feature = "chacha_simd", feature(portable_simd))]

extern crate alloc;

pub use cipher; // Re-export cipher crate for downstream users

pub use crate::core::ChaChaCore;
pub use crate::error::{Error, Result};
pub use crate::permutation::{permute, quarter_round, transform};
pub use crate::rounds::Rounds;
pub use crate::state::ChaChaState;

use cipher::generic_array::ArrayLength;

// --- Security Parameter Abstraction ---

/// Supported key sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyLength {
    /// 16-byte key, duplicated into both halves of the key block.
    Bits128,
    /// 32-byte key.
    Bits256,
}

impl KeyLength {
    /// Map a key size selector in bits to a key length.
    pub const fn from_bits(bits: u32) -> Result<Self> {
        match bits {
            128 => Ok(Self::Bits128),
            256 => Ok(Self::Bits256),
            _ => Err(Error::UnsupportedKeySize { bits }),
        }
    }

    pub const fn bits(self) -> u32 {
        match self {
            Self::Bits128 => 128,
            Self::Bits256 => 256,
        }
    }

    pub const fn bytes(self) -> usize {
        match self {
            Self::Bits128 => 16,
            Self::Bits256 => 32,
        }
    }

    /// The 16-byte constant block for this key size.
    pub const fn constants(self) -> &'static [u8; 16] {
        match self {
            Self::Bits128 => TAU,
            Self::Bits256 => SIGMA,
        }
    }
}

mod sealed {
    pub trait Sealed {}
}

/// A trait to define the parameters of a compile-time ChaCha variant.
///
/// Sealed: the variants below are the only implementations. The key layout
/// is derived from `KeySize`, see [`ChaChaCore::KEY_LENGTH`].
pub trait ChaChaVariant: sealed::Sealed + Clone {
    type KeySize: ArrayLength<u8> + 'static;
    const ROUNDS: Rounds;
}

macro_rules! define_variant {
    ($name:ident, $doc:expr, $key_size:ty, $rounds:ident) => {
        #[doc = $doc]
        #[derive(Clone, Debug)]
        pub struct $name;

        impl sealed::Sealed for $name {}

        impl ChaChaVariant for $name {
            type KeySize = $key_size;
            const ROUNDS: Rounds = Rounds::$rounds;
        }
    };
}

define_variant!(ChaCha8_128, "ChaCha with 8 rounds and a 128-bit key.", cipher::consts::U16, R8);
define_variant!(ChaCha8_256, "ChaCha with 8 rounds and a 256-bit key.", cipher::consts::U32, R8);
define_variant!(ChaCha12_128, "ChaCha with 12 rounds and a 128-bit key.", cipher::consts::U16, R12);
define_variant!(ChaCha12_256, "ChaCha with 12 rounds and a 256-bit key.", cipher::consts::U32, R12);
define_variant!(ChaCha20_128, "ChaCha with 20 rounds and a 128-bit key.", cipher::consts::U16, R20);
define_variant!(ChaCha20_256, "ChaCha with 20 rounds and a 256-bit key.", cipher::consts::U32, R20);

// --- Core Cipher Logic ---

pub(crate) mod core;
pub(crate) mod encoding;
pub mod error;
pub mod permutation;
pub mod rounds;
pub mod state;

// --- Backends ---
pub(crate) mod backends;

// --- Constants ---

/// Number of 32-bit words in the state.
pub const STATE_WORDS: usize = 16;
/// Keystream block size in bytes.
pub const BLOCK_SIZE: usize = 64;
/// Nonce size in bytes.
pub const NONCE_SIZE: usize = 8;

const SIGMA: &[u8; 16] = b"expand 32-byte k";
const TAU: &[u8; 16] = b"expand 16-byte k";

// --- Convenience Type Aliases for Users ---
pub type ChaCha8Cipher128 = cipher::StreamCipherCoreWrapper<ChaChaCore<ChaCha8_128>>;
pub type ChaCha8Cipher256 = cipher::StreamCipherCoreWrapper<ChaChaCore<ChaCha8_256>>;
pub type ChaCha12Cipher128 = cipher::StreamCipherCoreWrapper<ChaChaCore<ChaCha12_128>>;
pub type ChaCha12Cipher256 = cipher::StreamCipherCoreWrapper<ChaChaCore<ChaCha12_256>>;
pub type ChaCha20Cipher128 = cipher::StreamCipherCoreWrapper<ChaChaCore<ChaCha20_128>>;
pub type ChaCha20Cipher256 = cipher::StreamCipherCoreWrapper<ChaChaCore<ChaCha20_256>>;
