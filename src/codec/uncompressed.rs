//! Per-pixel unpacking for the uncompressed formats.
//!
//! Packed 16- and 32-bit GX2 formats are little-endian words with the first
//! named channel in the lowest bits. RGBA8 is the exception: it is unpacked as
//! a big-endian `RRGGBBAA` word.

use alloc::vec::Vec;

/// Map every `N`-byte source element to one RGBA pixel.
///
/// Stops at whichever of `src` and `out` runs out first; pixels without a
/// source element keep their existing value.
pub(super) fn expand<const N: usize>(src: &[u8], out: &mut [u8], f: impl Fn([u8; N]) -> [u8; 4]) {
    for (chunk, px) in src.chunks_exact(N).zip(out.chunks_exact_mut(4)) {
        let mut element = [0u8; N];
        element.copy_from_slice(chunk);
        px.copy_from_slice(&f(element));
    }
}

/// Expand 4-bit samples, two per byte, low nibble first. Each row starts on a
/// byte boundary.
pub(super) fn expand_nibbles(
    src: &[u8],
    width: u32,
    height: u32,
    out: &mut [u8],
    f: impl Fn(u8) -> [u8; 4],
) {
    let w = width as usize;
    let stride = w.div_ceil(2);
    for y in 0..height as usize {
        for x in 0..w {
            let Some(&byte) = src.get(y * stride + x / 2) else {
                return;
            };
            let nibble = if x % 2 == 0 { byte & 0x0F } else { byte >> 4 };
            let off = (y * w + x) * 4;
            out[off..off + 4].copy_from_slice(&f(nibble * 0x11));
        }
    }
}

#[inline]
fn scale5(v: u16) -> u8 {
    ((v << 3) | (v >> 2)) as u8
}

#[inline]
fn scale6(v: u16) -> u8 {
    ((v << 2) | (v >> 4)) as u8
}

#[inline]
fn scale4(v: u16) -> u8 {
    (v * 0x11) as u8
}

pub(super) fn la4([b]: [u8; 1]) -> [u8; 4] {
    let l = (b & 0x0F) * 0x11;
    let a = (b >> 4) * 0x11;
    [l, l, l, a]
}

pub(super) fn rgb565(bytes: [u8; 2]) -> [u8; 4] {
    let v = u16::from_le_bytes(bytes);
    [
        scale5(v & 0x1F),
        scale6((v >> 5) & 0x3F),
        scale5(v >> 11),
        255,
    ]
}

pub(super) fn rgb5a1(bytes: [u8; 2]) -> [u8; 4] {
    let v = u16::from_le_bytes(bytes);
    [
        scale5(v & 0x1F),
        scale5((v >> 5) & 0x1F),
        scale5((v >> 10) & 0x1F),
        if v & 0x8000 != 0 { 255 } else { 0 },
    ]
}

pub(super) fn rgba4(bytes: [u8; 2]) -> [u8; 4] {
    let v = u16::from_le_bytes(bytes);
    [
        scale4(v & 0xF),
        scale4((v >> 4) & 0xF),
        scale4((v >> 8) & 0xF),
        scale4(v >> 12),
    ]
}

pub(super) fn rgb10a2(bytes: [u8; 4]) -> [u8; 4] {
    let v = u32::from_le_bytes(bytes);
    [
        ((v & 0x3FF) >> 2) as u8,
        (((v >> 10) & 0x3FF) >> 2) as u8,
        (((v >> 20) & 0x3FF) >> 2) as u8,
        ((v >> 30) as u8) * 85,
    ]
}

/// Unpack a big-endian `RRGGBBAA` word.
pub(super) fn rgba8(bytes: [u8; 4]) -> [u8; 4] {
    let word = u32::from_be_bytes(bytes);
    [
        (word >> 24) as u8,
        (word >> 16) as u8,
        (word >> 8) as u8,
        word as u8,
    ]
}

/// Pack RGBA pixels into big-endian `RRGGBBAA` words.
pub(super) fn pack_rgba8(rgba: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgba.len());
    for px in rgba.chunks_exact(4) {
        let word = (u32::from(px[0]) << 24)
            | (u32::from(px[1]) << 16)
            | (u32::from(px[2]) << 8)
            | u32::from(px[3]);
        out.extend_from_slice(&word.to_be_bytes());
    }
    out
}
