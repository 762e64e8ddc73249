use crate::{ChaChaVariant, KeyLength, STATE_WORDS, backends, state};
use cfg_if::cfg_if;
use cipher::{
    AlgorithmName, BlockSizeUser, Iv, IvSizeUser, Key, KeyIvInit, KeySizeUser, StreamCipherCore,
    StreamCipherSeekCore, StreamClosure,
    consts::{U8, U64},
    typenum::Unsigned,
};
use core::{fmt, marker::PhantomData};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The core state for the ChaCha cipher, for use with the `cipher` traits.
#[derive(Clone)]
pub struct ChaChaCore<V: ChaChaVariant> {
    /// Constants, key, block counter and nonce
    pub(crate) state: [u32; STATE_WORDS],
    /// PhantomData to tie the struct to the ChaChaVariant
    pub(crate) _variant: PhantomData<V>,
}

impl<V: ChaChaVariant> ChaChaCore<V> {
    /// Key layout implied by the variant's key size. Evaluating it for a key
    /// size other than 16 or 32 bytes fails the build.
    pub const KEY_LENGTH: KeyLength = match <V::KeySize as Unsigned>::USIZE {
        16 => KeyLength::Bits128,
        32 => KeyLength::Bits256,
        _ => panic!("ChaCha keys are 16 or 32 bytes"),
    };
}

impl<V: ChaChaVariant> KeySizeUser for ChaChaCore<V> {
    type KeySize = V::KeySize;
}

impl<V: ChaChaVariant> IvSizeUser for ChaChaCore<V> {
    type IvSize = U8;
}

impl<V: ChaChaVariant> BlockSizeUser for ChaChaCore<V> {
    type BlockSize = U64; // 512-bit blocks
}

impl<V: ChaChaVariant> KeyIvInit for ChaChaCore<V> {
    fn new(key: &Key<Self>, iv: &Iv<Self>) -> Self {
        let state = state::load_state(Self::KEY_LENGTH, key, iv);
        log::debug!(
            "initialized ChaCha core: {}-bit key, {} rounds",
            Self::KEY_LENGTH.bits(),
            V::ROUNDS
        );

        Self {
            state,
            _variant: PhantomData,
        }
    }
}

impl<V: ChaChaVariant> StreamCipherCore for ChaChaCore<V> {
    fn process_with_backend(&mut self, f: impl StreamClosure<BlockSize = Self::BlockSize>) {
        cfg_if! {
            if #[cfg(all(feature = "chacha_simd", not(chacha_force_soft)))] {
                f.call(&mut backends::simd::Backend(self));
            } else {
                f.call(&mut backends::soft::Backend(self));
            }
        }
    }

    // The 64-bit counter wraps instead of running out.
    fn remaining_blocks(&self) -> Option<usize> {
        None
    }
}

impl<V: ChaChaVariant> StreamCipherSeekCore for ChaChaCore<V> {
    type Counter = u64;

    fn get_block_pos(&self) -> Self::Counter {
        state::block_counter(&self.state)
    }

    fn set_block_pos(&mut self, pos: Self::Counter) {
        state::set_block_counter(&mut self.state, pos);
    }
}

impl<V: ChaChaVariant> AlgorithmName for ChaChaCore<V> {
    fn write_alg_name(f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChaCha{}-{}", V::ROUNDS, Self::KEY_LENGTH.bits())
    }
}

impl<V: ChaChaVariant> Drop for ChaChaCore<V> {
    fn drop(&mut self) {
        self.state.zeroize();
    }
}

impl<V: ChaChaVariant> ZeroizeOnDrop for ChaChaCore<V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ChaCha8_128, ChaCha12_128, ChaCha12_256, ChaCha20_128, ChaCha20_256, ChaChaState, Rounds};
    use alloc::format;
    use cipher::{StreamCipher, StreamCipherCoreWrapper};

    #[test]
    fn test_core_layout_matches_state_machine() {
        let key = [0x11u8; 16];
        let nonce = [0x22u8; 8];
        let chacha = ChaChaCore::<ChaCha12_128>::new(&key.into(), &nonce.into());
        let state = ChaChaState::new(&key, 128, &nonce).unwrap();
        assert_eq!(chacha.state, state.words());
    }

    #[test]
    fn test_key_length_follows_key_size() {
        assert_eq!(ChaChaCore::<ChaCha8_128>::KEY_LENGTH, KeyLength::Bits128);
        assert_eq!(ChaChaCore::<ChaCha20_128>::KEY_LENGTH, KeyLength::Bits128);
        assert_eq!(ChaChaCore::<ChaCha12_256>::KEY_LENGTH, KeyLength::Bits256);
        assert_eq!(ChaChaCore::<ChaCha20_256>::KEY_LENGTH, KeyLength::Bits256);
    }

    #[test]
    fn test_every_key_byte_reaches_the_state() {
        let mut key = [0u8; 32];
        let base = ChaChaCore::<ChaCha20_256>::new(&key.into(), &[0u8; 8].into()).state;
        key[31] = 1;
        let flipped = ChaChaCore::<ChaCha20_256>::new(&key.into(), &[0u8; 8].into()).state;
        assert_ne!(base, flipped);
        assert_eq!(flipped[11], 0x0100_0000);

        let mut cipher = StreamCipherCoreWrapper::<ChaChaCore<ChaCha20_256>>::new(
            &[0u8; 32].into(),
            &[0u8; 8].into(),
        );
        let mut other =
            StreamCipherCoreWrapper::<ChaChaCore<ChaCha20_256>>::new(&key.into(), &[0u8; 8].into());
        let (mut a, mut b) = ([0u8; 64], [0u8; 64]);
        cipher.apply_keystream(&mut a);
        other.apply_keystream(&mut b);
        assert_ne!(a, b);
    }

    #[test]
    fn test_block_pos_spans_both_counter_words() {
        let mut chacha = ChaChaCore::<ChaCha20_256>::new(&[0u8; 32].into(), &[0u8; 8].into());
        chacha.set_block_pos(0x0000_0001_ffff_fffe);
        assert_eq!(chacha.state[12..14], [0xffff_fffe, 1]);
        assert_eq!(chacha.get_block_pos(), 0x0000_0001_ffff_fffe);
    }

    #[test]
    fn test_wrapper_advances_counter_per_block() {
        let mut cipher = StreamCipherCoreWrapper::<ChaChaCore<ChaCha20_256>>::new(
            &[0u8; 32].into(),
            &[0u8; 8].into(),
        );
        let mut data = [0u8; 70];
        cipher.apply_keystream(&mut data);

        let mut state = ChaChaState::new(&[0u8; 32], 256, &[0u8; 8])
            .unwrap()
            .with_rounds(Rounds::R20);
        assert_eq!(data[..], state.keystream(70).unwrap()[..]);
    }

    struct Name<V>(PhantomData<V>);

    impl<V: ChaChaVariant> fmt::Display for Name<V> {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            ChaChaCore::<V>::write_alg_name(f)
        }
    }

    #[test]
    fn test_algorithm_name() {
        assert_eq!(format!("{}", Name::<ChaCha12_128>(PhantomData)), "ChaCha12-128");
        assert_eq!(format!("{}", Name::<ChaCha20_256>(PhantomData)), "ChaCha20-256");
    }
}
