use crate::{BLOCK_SIZE, ChaChaVariant, STATE_WORDS, core::ChaChaCore, encoding, rounds::Rounds, state};
use cipher::{
    Block, BlockSizeUser, ParBlocksSizeUser, StreamBackend,
    consts::{U1, U64},
};
use core::simd::prelude::*;

/// The portable SIMD backend for ChaCha.
pub(crate) struct Backend<'a, V: ChaChaVariant>(pub(crate) &'a mut ChaChaCore<V>);

impl<V: ChaChaVariant> BlockSizeUser for Backend<'_, V> {
    type BlockSize = U64;
}

impl<V: ChaChaVariant> ParBlocksSizeUser for Backend<'_, V> {
    type ParBlocksSize = U1;
}

impl<V: ChaChaVariant> StreamBackend for Backend<'_, V> {
    #[inline]
    fn gen_ks_block(&mut self, block: &mut Block<Self>) {
        let keystream = block_simd(&self.0.state, V::ROUNDS);
        block.copy_from_slice(&keystream);
        state::advance_counter(&mut self.0.state);
    }
}

#[inline(always)]
fn rotate_left(v: u32x4, n: u32) -> u32x4 {
    (v << u32x4::splat(n)) | (v >> u32x4::splat(32 - n))
}

/// Four quarter-rounds at once, one per lane.
#[inline(always)]
fn quarter_rounds(a: &mut u32x4, b: &mut u32x4, c: &mut u32x4, d: &mut u32x4) {
    *a += *b;
    *d = rotate_left(*d ^ *a, 16);
    *c += *d;
    *b = rotate_left(*b ^ *c, 12);
    *a += *b;
    *d = rotate_left(*d ^ *a, 8);
    *c += *d;
    *b = rotate_left(*b ^ *c, 7);
}

/// The block function with the state held as four row vectors. Column
/// rounds work on the rows directly; diagonal rounds rotate rows 1-3 so the
/// diagonals line up in lanes, then rotate them back.
#[inline(always)]
fn block_simd(state: &[u32; STATE_WORDS], rounds: Rounds) -> [u8; BLOCK_SIZE] {
    let rows = [
        u32x4::from_slice(&state[0..4]),
        u32x4::from_slice(&state[4..8]),
        u32x4::from_slice(&state[8..12]),
        u32x4::from_slice(&state[12..16]),
    ];
    let [mut a, mut b, mut c, mut d] = rows;

    for _ in 0..rounds.double_rounds() {
        quarter_rounds(&mut a, &mut b, &mut c, &mut d);

        b = simd_swizzle!(b, [1, 2, 3, 0]);
        c = simd_swizzle!(c, [2, 3, 0, 1]);
        d = simd_swizzle!(d, [3, 0, 1, 2]);

        quarter_rounds(&mut a, &mut b, &mut c, &mut d);

        b = simd_swizzle!(b, [3, 0, 1, 2]);
        c = simd_swizzle!(c, [2, 3, 0, 1]);
        d = simd_swizzle!(d, [1, 2, 3, 0]);
    }

    let mut words = [0u32; STATE_WORDS];
    (a + rows[0]).copy_to_slice(&mut words[0..4]);
    (b + rows[1]).copy_to_slice(&mut words[4..8]);
    (c + rows[2]).copy_to_slice(&mut words[8..12]);
    (d + rows[3]).copy_to_slice(&mut words[12..16]);
    encoding::store_words(&words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutation;

    #[test]
    fn test_matches_scalar_block_function() {
        let mut state = [0u32; STATE_WORDS];
        for (i, word) in state.iter_mut().enumerate() {
            *word = (i as u32).wrapping_mul(0x9e37_79b9);
        }
        for rounds in [Rounds::R8, Rounds::R12, Rounds::R20] {
            assert_eq!(block_simd(&state, rounds), permutation::transform(&state, rounds));
        }
    }
}
