//! Block-compressed formats: the [`BlockCodec`] seam, the built-in
//! implementation, and whole-image block partitioning.

use alloc::borrow::Cow;
use alloc::format;
use alloc::vec;
use alloc::vec::Vec;
use enough::Stop;

use crate::error::FlimError;
use crate::format::BlockKind;

/// Per-block decompression/compression capability.
///
/// `decompress` turns a whole image's worth of packed blocks (row-major block
/// order, partial edge blocks included) into `width * height * 4` RGBA bytes.
/// Single-channel kinds put their value in R, two-channel kinds in R and G.
/// `compress_block` packs one 4x4 RGBA block into `out`, which is exactly
/// [`BlockKind::bytes_per_block`] long.
pub trait BlockCodec: Sync {
    fn decompress(
        &self,
        kind: BlockKind,
        width: u32,
        height: u32,
        packed: &[u8],
    ) -> Result<Vec<u8>, FlimError>;

    fn compress_block(
        &self,
        kind: BlockKind,
        pixels: &[u8; 64],
        out: &mut [u8],
    ) -> Result<(), FlimError>;
}

/// Block codec backed by `squish` (BC1-BC3) and `texture2ddecoder`
/// (BC4, BC5, ETC1). Requires the `bcn` feature; without it every call
/// returns [`FlimError::BlockCodec`].
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinBlockCodec;

#[cfg(feature = "bcn")]
fn squish_format(kind: BlockKind) -> Option<squish::Format> {
    match kind {
        BlockKind::Bc1 => Some(squish::Format::Bc1),
        BlockKind::Bc2 => Some(squish::Format::Bc2),
        BlockKind::Bc3 => Some(squish::Format::Bc3),
        BlockKind::Bc4 | BlockKind::Bc5 | BlockKind::Etc1 => None,
    }
}

#[cfg(feature = "bcn")]
type PackedDecoder = fn(&[u8], usize, usize, &mut [u32]) -> Result<(), &'static str>;

impl BlockCodec for BuiltinBlockCodec {
    #[cfg(feature = "bcn")]
    fn decompress(
        &self,
        kind: BlockKind,
        width: u32,
        height: u32,
        packed: &[u8],
    ) -> Result<Vec<u8>, FlimError> {
        let (w, h) = (width as usize, height as usize);
        let mut out = vec![0u8; w * h * 4];

        let decoder: PackedDecoder = match kind {
            BlockKind::Bc4 => texture2ddecoder::decode_bc4,
            BlockKind::Bc5 => texture2ddecoder::decode_bc5,
            BlockKind::Etc1 => texture2ddecoder::decode_etc1,
            BlockKind::Bc1 | BlockKind::Bc2 | BlockKind::Bc3 => {
                if let Some(format) = squish_format(kind) {
                    // squish writes whole 4x4 blocks, so decode at block size and crop.
                    let (bx, by) = block_count(width, height);
                    let (pw, ph) = (bx * 4, by * 4);
                    let mut padded = vec![0u8; pw * ph * 4];
                    format.decompress(packed, pw, ph, &mut padded);
                    crop(&padded, pw, &mut out, w);
                }
                return Ok(out);
            }
        };

        let mut image = vec![0u32; w * h];
        decoder(packed, w, h, &mut image)
            .map_err(|e| FlimError::BlockCodec(format!("{kind:?} decode failed: {e}")))?;
        for (&px, dst) in image.iter().zip(out.chunks_exact_mut(4)) {
            dst.copy_from_slice(&px.to_le_bytes());
        }
        // texture2ddecoder emits BGRA words.
        super::swizzle::bgra_to_rgba_inplace(&mut out);
        Ok(out)
    }

    #[cfg(not(feature = "bcn"))]
    fn decompress(
        &self,
        kind: BlockKind,
        _width: u32,
        _height: u32,
        _packed: &[u8],
    ) -> Result<Vec<u8>, FlimError> {
        Err(FlimError::BlockCodec(format!(
            "{kind:?} decoding requires the `bcn` feature"
        )))
    }

    #[cfg(feature = "bcn")]
    fn compress_block(
        &self,
        kind: BlockKind,
        pixels: &[u8; 64],
        out: &mut [u8],
    ) -> Result<(), FlimError> {
        let format = match kind {
            BlockKind::Bc1 | BlockKind::Bc3 => squish_format(kind),
            _ => None,
        }
        .ok_or_else(|| FlimError::BlockCodec(format!("{kind:?} compression is not supported")))?;
        if out.len() != kind.bytes_per_block() {
            return Err(FlimError::BufferTooSmall {
                needed: kind.bytes_per_block(),
                actual: out.len(),
            });
        }
        format.compress(pixels, 4, 4, squish::Params::default(), out);
        Ok(())
    }

    #[cfg(not(feature = "bcn"))]
    fn compress_block(
        &self,
        kind: BlockKind,
        _pixels: &[u8; 64],
        _out: &mut [u8],
    ) -> Result<(), FlimError> {
        Err(FlimError::BlockCodec(format!(
            "{kind:?} compression requires the `bcn` feature"
        )))
    }
}

const fn block_count(width: u32, height: u32) -> (usize, usize) {
    (width.div_ceil(4) as usize, height.div_ceil(4) as usize)
}

/// Copy the top-left `width`-pixel-wide region of a `padded_width` RGBA
/// image into `out`.
#[cfg_attr(not(feature = "bcn"), allow(dead_code))]
fn crop(padded: &[u8], padded_width: usize, out: &mut [u8], width: usize) {
    if width == 0 {
        return;
    }
    for (dst, src) in out
        .chunks_exact_mut(width * 4)
        .zip(padded.chunks_exact(padded_width * 4))
    {
        dst.copy_from_slice(&src[..width * 4]);
    }
}

/// Decompress through `codec`, zero-padding a short payload to the full
/// block count first so the collaborator never reads past the input.
pub(super) fn decompress(
    codec: &dyn BlockCodec,
    kind: BlockKind,
    width: u32,
    height: u32,
    packed: &[u8],
) -> Result<Vec<u8>, FlimError> {
    let (bx, by) = block_count(width, height);
    let needed = bx * by * kind.bytes_per_block();
    let input: Cow<'_, [u8]> = if packed.len() >= needed {
        Cow::Borrowed(&packed[..needed])
    } else {
        let mut padded = packed.to_vec();
        padded.resize(needed, 0);
        Cow::Owned(padded)
    };

    let rgba = codec.decompress(kind, width, height, &input)?;
    let expected = width as usize * height as usize * 4;
    if rgba.len() != expected {
        return Err(FlimError::BlockCodec(format!(
            "{kind:?} decoder returned {} bytes, expected {expected}",
            rgba.len()
        )));
    }
    Ok(rgba)
}

/// ETC1 colour blocks are little-endian 64-bit words; decoders expect them
/// big-endian.
pub(super) fn etc1_to_big_endian(blocks: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(blocks.len());
    for block in blocks.chunks_exact(8) {
        out.extend(block.iter().rev());
    }
    out
}

/// Decode ETC1A4: per 4x4 block, 8 bytes of 4-bit alpha (little-endian,
/// column-major) followed by one ETC1 colour block.
pub(super) fn decode_etc1a4(
    codec: &dyn BlockCodec,
    packed: &[u8],
    width: u32,
    height: u32,
) -> Result<Vec<u8>, FlimError> {
    let (bx, by) = block_count(width, height);
    let mut alpha = vec![0u64; bx * by];
    let mut color = vec![0u8; bx * by * 8];
    for (i, block) in packed.chunks_exact(16).take(bx * by).enumerate() {
        let mut word = [0u8; 8];
        word.copy_from_slice(&block[..8]);
        alpha[i] = u64::from_le_bytes(word);
        color[i * 8..i * 8 + 8].copy_from_slice(&block[8..]);
    }

    let mut rgba = decompress(codec, BlockKind::Etc1, width, height, &etc1_to_big_endian(&color))?;
    let w = width as usize;
    for (i, &word) in alpha.iter().enumerate() {
        let (block_x, block_y) = (i % bx, i / bx);
        for px in 0..4 {
            for py in 0..4 {
                let (x, y) = (block_x * 4 + px, block_y * 4 + py);
                if x >= w || y >= height as usize {
                    continue;
                }
                let nibble = ((word >> ((px * 4 + py) * 4)) & 0xF) as u8;
                rgba[(y * w + x) * 4 + 3] = nibble * 0x11;
            }
        }
    }
    Ok(rgba)
}

/// Gather the 4x4 block at (`block_x`, `block_y`), clamping coordinates past
/// the image edge to the nearest in-bounds pixel.
fn gather_block(rgba: &[u8], width: u32, height: u32, block_x: usize, block_y: usize) -> [u8; 64] {
    let (w, h) = (width as usize, height as usize);
    let mut block = [0u8; 64];
    for py in 0..4 {
        let y = (block_y * 4 + py).min(h - 1);
        for px in 0..4 {
            let x = (block_x * 4 + px).min(w - 1);
            let src = (y * w + x) * 4;
            let dst = (py * 4 + px) * 4;
            block[dst..dst + 4].copy_from_slice(&rgba[src..src + 4]);
        }
    }
    block
}

fn compress_row(
    codec: &dyn BlockCodec,
    kind: BlockKind,
    rgba: &[u8],
    width: u32,
    height: u32,
    block_y: usize,
    row: &mut [u8],
) -> Result<(), FlimError> {
    for (block_x, out) in row.chunks_exact_mut(kind.bytes_per_block()).enumerate() {
        let block = gather_block(rgba, width, height, block_x, block_y);
        codec.compress_block(kind, &block, out)?;
    }
    Ok(())
}

/// Compress a whole RGBA image into row-major blocks of `kind`.
///
/// `rgba` must hold at least `width * height * 4` bytes and both dimensions
/// must be non-zero.
pub(super) fn compress(
    codec: &dyn BlockCodec,
    kind: BlockKind,
    rgba: &[u8],
    width: u32,
    height: u32,
    stop: &dyn Stop,
) -> Result<Vec<u8>, FlimError> {
    let (bx, by) = block_count(width, height);
    let row_bytes = bx * kind.bytes_per_block();
    let mut out = vec![0u8; row_bytes * by];
    stop.check()?;

    #[cfg(feature = "rayon")]
    {
        use rayon::prelude::*;
        out.par_chunks_mut(row_bytes)
            .enumerate()
            .try_for_each(|(block_y, row)| {
                if block_y % 4 == 0 {
                    stop.check()?;
                }
                compress_row(codec, kind, rgba, width, height, block_y, row)
            })?;
    }

    #[cfg(not(feature = "rayon"))]
    {
        for (block_y, row) in out.chunks_exact_mut(row_bytes).enumerate() {
            if block_y % 4 == 0 {
                stop.check()?;
            }
            compress_row(codec, kind, rgba, width, height, block_y, row)?;
        }
    }

    Ok(out)
}
