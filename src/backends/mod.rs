use cfg_if::cfg_if;

cfg_if! {
    if #[cfg(all(feature = "chacha_simd", not(chacha_force_soft)))] {
        pub(crate) mod simd;
    } else {
        pub(crate) mod soft;
    }
}
