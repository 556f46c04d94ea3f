//! Linear general and linear aligned (pitch-padded) layouts.

use alloc::vec;
use alloc::vec::Vec;
use enough::Stop;

use crate::error::FlimError;
use crate::format::ElementShape;

/// Row pitch, in elements, of a linear-aligned surface.
///
/// Rows are padded to `max(64, 2048 / element_bits)` bytes. `element_bits`
/// is the size of one addressable element, not the per-pixel depth from the
/// format table: 64 or 128 for a 4x4 BC/ETC block, 8 for an L4/A4 pixel
/// pair. For 32-bit pixels the alignment is 64 bytes, so a 10-pixel row is
/// stored as 16 pixels; for BC1 (64-bit blocks) it is 64 bytes as well, so a
/// row of 2 blocks is stored as 8.
pub const fn aligned_pitch(width_elements: u32, element_bits: u32) -> u32 {
    let bytes_per_element = if element_bits >= 8 { element_bits / 8 } else { 1 };
    let bits = if element_bits == 0 { 8 } else { element_bits };
    let alignment = if 2048 / bits > 64 { 2048 / bits } else { 64 };
    let row_bytes = width_elements * bytes_per_element;
    row_bytes.next_multiple_of(alignment) / bytes_per_element
}

/// Copy up to `size` bytes of `src`; missing bytes stay zero.
pub(super) fn copy_bounded(src: &[u8], size: usize) -> Vec<u8> {
    let mut out = vec![0u8; size];
    let n = src.len().min(size);
    out[..n].copy_from_slice(&src[..n]);
    out
}

/// Bytes of `row_bytes` that start at `offset` and lie within `len`,
/// rounded down to whole elements.
fn available_row(len: usize, offset: usize, row_bytes: usize, element_bytes: usize) -> usize {
    let avail = len.saturating_sub(offset).min(row_bytes);
    avail - avail % element_bytes
}

pub(super) fn detile_aligned(
    tiled: &[u8],
    element: ElementShape,
    across: u32,
    down: u32,
    stop: &dyn Stop,
) -> Result<Vec<u8>, FlimError> {
    let bpe = element.bytes();
    let row_bytes = across as usize * bpe;
    let pitch_bytes = aligned_pitch(across, element.bits) as usize * bpe;
    let mut out = vec![0u8; row_bytes * down as usize];
    if row_bytes == 0 {
        return Ok(out);
    }

    for (y, dst) in out.chunks_exact_mut(row_bytes).enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        let src = y * pitch_bytes;
        let n = available_row(tiled.len(), src, row_bytes, bpe);
        if n == 0 {
            break;
        }
        dst[..n].copy_from_slice(&tiled[src..src + n]);
    }
    Ok(out)
}

pub(super) fn retile_aligned(
    linear: &[u8],
    element: ElementShape,
    across: u32,
    down: u32,
    stop: &dyn Stop,
) -> Result<Vec<u8>, FlimError> {
    let bpe = element.bytes();
    let row_bytes = across as usize * bpe;
    let pitch_bytes = aligned_pitch(across, element.bits) as usize * bpe;
    let mut out = vec![0u8; pitch_bytes * down as usize];
    if row_bytes == 0 {
        return Ok(out);
    }

    for (y, dst) in out.chunks_exact_mut(pitch_bytes).enumerate() {
        if y % 16 == 0 {
            stop.check()?;
        }
        let src = y * row_bytes;
        let n = available_row(linear.len(), src, row_bytes, bpe);
        if n == 0 {
            break;
        }
        dst[..n].copy_from_slice(&linear[src..src + n]);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use enough::Unstoppable;

    const RGBA: ElementShape = ElementShape {
        width: 1,
        height: 1,
        bits: 32,
    };

    #[test]
    fn pitch_alignment_rules() {
        // 32 bpp: 64-byte alignment -> 16 pixels
        assert_eq!(aligned_pitch(10, 32), 16);
        assert_eq!(aligned_pitch(16, 32), 16);
        assert_eq!(aligned_pitch(17, 32), 32);
        // 8 bpp: 256-byte alignment
        assert_eq!(aligned_pitch(10, 8), 256);
        // 16 bpp: 128-byte alignment -> 64 pixels
        assert_eq!(aligned_pitch(3, 16), 64);
        // BC1 block (64 bits): 64-byte alignment -> 8 blocks
        assert_eq!(aligned_pitch(3, 64), 8);
        // BC3 block (128 bits): 64-byte alignment -> 4 blocks
        assert_eq!(aligned_pitch(5, 128), 8);
    }

    #[test]
    fn detile_reads_rows_at_aligned_pitch() {
        let (w, h) = (10u32, 3u32);
        let pitch = 16 * 4;
        let mut tiled = vec![0xEEu8; pitch * h as usize];
        for y in 0..h as usize {
            for x in 0..w as usize {
                let off = y * pitch + x * 4;
                tiled[off..off + 4].copy_from_slice(&[y as u8, x as u8, 0xA0, 0xFF]);
            }
        }
        let linear = detile_aligned(&tiled, RGBA, w, h, &Unstoppable).unwrap();
        assert_eq!(linear.len(), 10 * 3 * 4);
        for y in 0..h as usize {
            for x in 0..w as usize {
                let off = (y * w as usize + x) * 4;
                assert_eq!(&linear[off..off + 4], &[y as u8, x as u8, 0xA0, 0xFF]);
            }
        }
        // Padding bytes never leak into the output.
        assert!(!linear.contains(&0xEE));
    }

    #[test]
    fn detile_truncated_input_leaves_zeros() {
        let (w, h) = (10u32, 4u32);
        // Only the first row and a half (in elements) are present.
        let tiled = vec![0x55u8; 64 + 5 * 4 + 2];
        let linear = detile_aligned(&tiled, RGBA, w, h, &Unstoppable).unwrap();
        assert_eq!(linear.len(), 10 * 4 * 4);
        assert!(linear[..40].iter().all(|&b| b == 0x55));
        assert!(linear[40..60].iter().all(|&b| b == 0x55));
        assert!(linear[60..].iter().all(|&b| b == 0));
    }

    #[test]
    fn retile_then_detile_is_identity() {
        let (w, h) = (5u32, 7u32);
        let linear: Vec<u8> = (0..w * h * 4).map(|i| (i % 251) as u8).collect();
        let tiled = retile_aligned(&linear, RGBA, w, h, &Unstoppable).unwrap();
        assert_eq!(tiled.len(), 16 * 4 * 7);
        let back = detile_aligned(&tiled, RGBA, w, h, &Unstoppable).unwrap();
        assert_eq!(back, linear);
    }
}
