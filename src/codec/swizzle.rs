//! Channel expansion/swap helpers, SIMD-accelerated via `garb` with the
//! `simd` feature and scalar otherwise.

/// Gray (1 byte/px) → RGBA, alpha = 255.
pub(super) fn gray_to_rgba(src: &[u8], dst: &mut [u8]) {
    #[cfg(feature = "simd")]
    {
        if garb::bytes::gray_to_rgba(src, dst).is_ok() {
            return;
        }
    }
    for (&l, px) in src.iter().zip(dst.chunks_exact_mut(4)) {
        px.copy_from_slice(&[l, l, l, 255]);
    }
}

/// Gray+alpha (2 bytes/px) → RGBA with R = G = B = gray.
pub(super) fn gray_alpha_to_rgba(src: &[u8], dst: &mut [u8]) {
    #[cfg(feature = "simd")]
    {
        if garb::bytes::gray_alpha_to_rgba(src, dst).is_ok() {
            return;
        }
    }
    for (la, px) in src.chunks_exact(2).zip(dst.chunks_exact_mut(4)) {
        px.copy_from_slice(&[la[0], la[0], la[0], la[1]]);
    }
}

/// Swap B and R in place for 4-byte pixels.
#[cfg_attr(not(feature = "bcn"), allow(dead_code))]
pub(super) fn bgra_to_rgba_inplace(buf: &mut [u8]) {
    #[cfg(feature = "simd")]
    {
        if garb::bytes::bgra_to_rgba_inplace(buf).is_ok() {
            return;
        }
    }
    for px in buf.chunks_exact_mut(4) {
        px.swap(0, 2);
    }
}
