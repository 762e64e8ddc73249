//! Error type for the ChaCha core.

use core::fmt;

/// Precondition violations reported by the cipher state machine.
///
/// Every operation is a pure computation, so these are the only failures:
/// they are raised immediately and never retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Key size selector other than 128 or 256 bits.
    UnsupportedKeySize { bits: u32 },

    /// A key, nonce or block buffer of the wrong length.
    InvalidLength {
        context: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Round count that is zero or odd.
    InvalidRounds { rounds: u32 },

    /// Zero-length input where at least one byte is required.
    EmptyInput { context: &'static str },
}

/// Result type for ChaCha operations.
pub type Result<T> = core::result::Result<T, Error>;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedKeySize { bits } => {
                write!(f, "unsupported key size: {bits} bits (expected 128 or 256)")
            }
            Self::InvalidLength {
                context,
                expected,
                actual,
            } => write!(
                f,
                "invalid {context} length: expected {expected} bytes, got {actual}"
            ),
            Self::InvalidRounds { rounds } => {
                write!(f, "invalid round count {rounds}: must be even and non-zero")
            }
            Self::EmptyInput { context } => write!(f, "{context}: input must not be empty"),
        }
    }
}

impl core::error::Error for Error {}
