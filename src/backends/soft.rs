use crate::{ChaChaVariant, core::ChaChaCore, permutation, state};
use cipher::{
    Block, BlockSizeUser, ParBlocksSizeUser, StreamBackend,
    consts::{U1, U64},
};

/// The software backend for ChaCha.
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
        // Keystream for the current counter, then step the counter. The
        // wrapper does the XOR.
        let keystream = permutation::transform(&self.0.state, V::ROUNDS);
        block.copy_from_slice(&keystream);
        state::advance_counter(&mut self.0.state);
    }
}
