//! The ChaCha permutation and block function.

use crate::{BLOCK_SIZE, STATE_WORDS, encoding, rounds::Rounds};

/// The ChaCha quarter-round on the words at indices `a`, `b`, `c`, `d`.
#[inline(always)]
pub fn quarter_round(x: &mut [u32; STATE_WORDS], a: usize, b: usize, c: usize, d: usize) {
    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(16);

    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(12);

    x[a] = x[a].wrapping_add(x[b]);
    x[d] = (x[d] ^ x[a]).rotate_left(8);

    x[c] = x[c].wrapping_add(x[d]);
    x[b] = (x[b] ^ x[c]).rotate_left(7);
}

/// One column round followed by one diagonal round.
#[inline(always)]
pub(crate) fn double_round(x: &mut [u32; STATE_WORDS]) {
    // columns
    quarter_round(x, 0, 4, 8, 12);
    quarter_round(x, 1, 5, 9, 13);
    quarter_round(x, 2, 6, 10, 14);
    quarter_round(x, 3, 7, 11, 15);

    // diagonals
    quarter_round(x, 0, 5, 10, 15);
    quarter_round(x, 1, 6, 11, 12);
    quarter_round(x, 2, 7, 8, 13);
    quarter_round(x, 3, 4, 9, 14);
}

/// Run `rounds` rounds over a copy of `input` and add `input` back in
/// (feed-forward). Returns the resulting words.
#[inline]
pub fn permute(input: &[u32; STATE_WORDS], rounds: Rounds) -> [u32; STATE_WORDS] {
    let mut x = *input;
    for _ in 0..rounds.double_rounds() {
        double_round(&mut x);
    }
    for (xi, &si) in x.iter_mut().zip(input) {
        *xi = xi.wrapping_add(si);
    }
    x
}

/// The block function: permute with feed-forward and serialize the words
/// little-endian into a 64-byte keystream block.
///
/// Pure; the caller owns counter advancement.
#[inline]
pub fn transform(input: &[u32; STATE_WORDS], rounds: Rounds) -> [u8; BLOCK_SIZE] {
    encoding::store_words(&permute(input, rounds))
}

#[cfg(test)]
mod tests {
    use super::*;

    // RFC 7539, section 2.3.2: key 00..1f, counter 1, nonce 00000009 0000004a 00000000.
    const RFC_BLOCK_INPUT: [u32; STATE_WORDS] = [
        0x61707865, 0x3320646e, 0x79622d32, 0x6b206574, 0x03020100, 0x07060504, 0x0b0a0908,
        0x0f0e0d0c, 0x13121110, 0x17161514, 0x1b1a1918, 0x1f1e1d1c, 0x00000001, 0x09000000,
        0x4a000000, 0x00000000,
    ];

    #[test]
    fn test_quarter_round() {
        let (a, b, c, d) = (0x11111111, 0x01020304, 0x9b8d6f43, 0x01234567);
        let mut x = [a, b, c, d, a, b, c, d, a, b, c, d, a, b, c, d];
        quarter_round(&mut x, 0, 1, 2, 3);
        assert_eq!(x[..4], [0xea2a92f4, 0xcb1cf8ce, 0x4581472e, 0x5881c4bb]);
        // Untouched slots keep their values.
        assert_eq!(x[4..8], [a, b, c, d]);
    }

    #[test]
    fn test_quarter_round_on_diagonal() {
        let mut x = [
            0x879531e0, 0xc5ecf37d, 0x516461b1, 0xc9a62f8a, 0x44c20ef3, 0x3390af7f, 0xd9fc690b,
            0x2a5f714c, 0x53372767, 0xb00a5631, 0x974c541a, 0x359e9963, 0x5c971061, 0x3d631689,
            0x2098d9d6, 0x91dbd320,
        ];
        quarter_round(&mut x, 2, 7, 8, 13);
        assert_eq!(x[2], 0xbdb886dc);
        assert_eq!(x[7], 0xcfacafd2);
        assert_eq!(x[8], 0xe46bea80);
        assert_eq!(x[13], 0xccc07c79);
    }

    #[test]
    fn test_permute_rfc_block() {
        let out = permute(&RFC_BLOCK_INPUT, Rounds::R20);
        assert_eq!(
            out,
            [
                0xe4e7f110, 0x15593bd1, 0x1fdd0f50, 0xc47120a3, 0xc7f4d1c7, 0x0368c033, 0x9aaa2204,
                0x4e6cd4c3, 0x466482d2, 0x09aa9f07, 0x05d7c214, 0xa2028bd9, 0xd19c12b5, 0xb94e16de,
                0xe883d0cb, 0x4e3c50a2,
            ]
        );
    }

    #[test]
    fn test_transform_serializes_little_endian() {
        let block = transform(&RFC_BLOCK_INPUT, Rounds::R20);
        assert_eq!(
            block[..16],
            hex::decode("10f1e7e4d13b5915500fdd1fa32071c4").unwrap()[..]
        );
        assert_eq!(&block[28..32], &[0xc3, 0xd4, 0x6c, 0x4e]);
    }

    #[test]
    fn test_transform_does_not_touch_input() {
        let input = RFC_BLOCK_INPUT;
        let _ = transform(&input, Rounds::R8);
        assert_eq!(input, RFC_BLOCK_INPUT);
    }
}
