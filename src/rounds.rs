use core::fmt;

use crate::error::{Error, Result};

/// Number of ChaCha rounds applied per block.
///
/// Rounds are applied as column/diagonal pairs, so the count is always even
/// and non-zero. Reduced-round variants (8, 12) are as valid as the standard
/// 20-round cipher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rounds(u32);

impl Rounds {
    /// ChaCha8.
    pub const R8: Self = Self(8);
    /// ChaCha12.
    pub const R12: Self = Self(12);
    /// ChaCha20.
    pub const R20: Self = Self(20);

    /// Validate a round count.
    pub const fn new(rounds: u32) -> Result<Self> {
        if rounds == 0 || rounds % 2 != 0 {
            return Err(Error::InvalidRounds { rounds });
        }
        Ok(Self(rounds))
    }

    /// Total number of rounds.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Number of column/diagonal pairs.
    pub const fn double_rounds(self) -> u32 {
        self.0 / 2
    }
}

impl Default for Rounds {
    fn default() -> Self {
        Self::R20
    }
}

impl TryFrom<u32> for Rounds {
    type Error = Error;

    fn try_from(rounds: u32) -> Result<Self> {
        Self::new(rounds)
    }
}

impl From<Rounds> for u32 {
    fn from(rounds: Rounds) -> u32 {
        rounds.0
    }
}

impl fmt::Display for Rounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}
