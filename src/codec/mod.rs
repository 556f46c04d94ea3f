//! Pixel codec dispatch: linear element-ordered payload bytes to RGBA8 and
//! back.
//!
//! Decoding matches exhaustively on [`TextureFormat`], so every format in the
//! table has an explicit rule. Encoding is implemented for RGBA8, BC1 and BC3
//! (plus their sRGB twins, which share the byte representation).

mod block;
mod swizzle;
mod uncompressed;

pub use block::{BlockCodec, BuiltinBlockCodec};

use alloc::vec;
use alloc::vec::Vec;
use enough::Stop;

use crate::decode::DecodeOptions;
use crate::error::FlimError;
use crate::format::{BlockKind, FormatDescriptor, TextureFormat, lookup};

/// Neutral gray used by [`Fallback::Placeholder`].
pub const PLACEHOLDER_RGBA: [u8; 4] = [128, 128, 128, 255];

/// What a decode does when it meets an unsupported format or tile mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Fallback {
    /// Propagate the error.
    #[default]
    Error,
    /// Return a [`PLACEHOLDER_RGBA`] image of the right size and log a
    /// warning. Meant for batch tools that must keep going across mixed files.
    Placeholder,
}

/// Where single-channel alpha formats (A4, A8, BC4A) put their sample.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlphaConvention {
    /// Sample in R, G and B with A = 255, so the channel is visible when
    /// inspected.
    #[default]
    Visualize,
    /// White with the sample in A, for compositing.
    Composite,
}

impl AlphaConvention {
    #[inline]
    fn apply(self, value: u8) -> [u8; 4] {
        match self {
            Self::Visualize => [value, value, value, 255],
            Self::Composite => [255, 255, 255, value],
        }
    }
}

/// An RGBA image filled with [`PLACEHOLDER_RGBA`].
pub fn placeholder(width: u32, height: u32) -> Vec<u8> {
    PLACEHOLDER_RGBA.repeat(width as usize * height as usize)
}

/// Decode linear element-ordered bytes of format `format_id` to RGBA8.
///
/// Unknown ids fail with [`FlimError::UnsupportedFormat`] unless the options
/// select [`Fallback::Placeholder`].
pub fn decode(
    format_id: u8,
    linear: &[u8],
    width: u32,
    height: u32,
    options: &DecodeOptions<'_>,
    stop: &dyn Stop,
) -> Result<Vec<u8>, FlimError> {
    if let Some(limits) = options.limits {
        limits.check_rgba_output(width, height)?;
    }
    let result = match lookup(format_id) {
        Some(desc) => decode_format(desc, linear, width, height, options, stop),
        None => Err(FlimError::UnsupportedFormat(format_id)),
    };
    match result {
        Err(FlimError::UnsupportedFormat(id)) if options.fallback == Fallback::Placeholder => {
            log::warn!("format 0x{id:02x} unsupported, substituting {width}x{height} placeholder");
            Ok(placeholder(width, height))
        }
        other => other,
    }
}

fn replicate_red(rgba: &mut [u8], f: impl Fn(u8) -> [u8; 4]) {
    for px in rgba.chunks_exact_mut(4) {
        let mapped = f(px[0]);
        px.copy_from_slice(&mapped);
    }
}

pub(crate) fn decode_format(
    desc: &FormatDescriptor,
    linear: &[u8],
    width: u32,
    height: u32,
    options: &DecodeOptions<'_>,
    stop: &dyn Stop,
) -> Result<Vec<u8>, FlimError> {
    use TextureFormat::*;

    let pixels = width as usize * height as usize;
    let blocks = options.blocks;
    let alpha = options.alpha;
    stop.check()?;

    let mut out = vec![0u8; pixels * 4];
    match desc.format {
        L8 => swizzle::gray_to_rgba(&linear[..linear.len().min(pixels)], &mut out),
        A8 => uncompressed::expand::<1>(linear, &mut out, |[a]| alpha.apply(a)),
        La4 => uncompressed::expand::<1>(linear, &mut out, uncompressed::la4),
        La8 => {
            let n = linear.len().min(pixels * 2) & !1;
            swizzle::gray_alpha_to_rgba(&linear[..n], &mut out);
        }
        Hilo8 => uncompressed::expand::<2>(linear, &mut out, |[hi, lo]| [hi, lo, 0, 255]),
        Rgb565 | Rgb565Indirect => uncompressed::expand::<2>(linear, &mut out, uncompressed::rgb565),
        Rgb5a1 => uncompressed::expand::<2>(linear, &mut out, uncompressed::rgb5a1),
        Rgba4 => uncompressed::expand::<2>(linear, &mut out, uncompressed::rgba4),
        Rgbx8 => uncompressed::expand::<4>(linear, &mut out, |word| {
            let [r, g, b, _] = uncompressed::rgba8(word);
            [r, g, b, 255]
        }),
        Rgba8 | Rgba8Srgb => uncompressed::expand::<4>(linear, &mut out, uncompressed::rgba8),
        Rgb10a2 => uncompressed::expand::<4>(linear, &mut out, uncompressed::rgb10a2),
        L4 => uncompressed::expand_nibbles(linear, width, height, &mut out, |l| [l, l, l, 255]),
        A4 => uncompressed::expand_nibbles(linear, width, height, &mut out, |a| alpha.apply(a)),
        Bc1 | Bc1Srgb => out = block::decompress(blocks, BlockKind::Bc1, width, height, linear)?,
        Bc2 | Bc2Srgb => out = block::decompress(blocks, BlockKind::Bc2, width, height, linear)?,
        Bc3 | Bc3Srgb => out = block::decompress(blocks, BlockKind::Bc3, width, height, linear)?,
        Bc4L => {
            out = block::decompress(blocks, BlockKind::Bc4, width, height, linear)?;
            replicate_red(&mut out, |l| [l, l, l, 255]);
        }
        Bc4A => {
            out = block::decompress(blocks, BlockKind::Bc4, width, height, linear)?;
            replicate_red(&mut out, |a| alpha.apply(a));
        }
        Bc5 => {
            // Single visualised channel; use `decode_rg8` for both.
            out = block::decompress(blocks, BlockKind::Bc5, width, height, linear)?;
            replicate_red(&mut out, |r| [r, r, r, 255]);
        }
        Etc1 => {
            let swapped = block::etc1_to_big_endian(linear);
            out = block::decompress(blocks, BlockKind::Etc1, width, height, &swapped)?;
        }
        Etc1a4 => out = block::decode_etc1a4(blocks, linear, width, height)?,
    }
    Ok(out)
}

/// Decode a two-channel format (BC5, HILO8) to 2 bytes per pixel.
pub fn decode_rg8(
    format_id: u8,
    linear: &[u8],
    width: u32,
    height: u32,
    options: &DecodeOptions<'_>,
    stop: &dyn Stop,
) -> Result<Vec<u8>, FlimError> {
    let pixels = width as usize * height as usize;
    stop.check()?;
    match TextureFormat::from_id(format_id) {
        Some(TextureFormat::Bc5) => {
            let rgba = block::decompress(options.blocks, BlockKind::Bc5, width, height, linear)?;
            Ok(rgba.chunks_exact(4).flat_map(|px| [px[0], px[1]]).collect())
        }
        Some(TextureFormat::Hilo8) => {
            let mut out = vec![0u8; pixels * 2];
            let n = linear.len().min(out.len());
            out[..n].copy_from_slice(&linear[..n]);
            Ok(out)
        }
        _ => Err(FlimError::UnsupportedFormat(format_id)),
    }
}

/// Encode RGBA8 pixels into the linear byte representation of `format_id`.
pub fn encode(
    format_id: u8,
    rgba: &[u8],
    width: u32,
    height: u32,
    blocks: &dyn BlockCodec,
    stop: &dyn Stop,
) -> Result<Vec<u8>, FlimError> {
    let desc = lookup(format_id).ok_or(FlimError::UnsupportedFormat(format_id))?;
    if width == 0 || height == 0 {
        return Err(FlimError::InvalidHeader(alloc::format!(
            "cannot encode a {width}x{height} image"
        )));
    }
    let needed = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or(FlimError::DimensionsTooLarge { width, height })?;
    if rgba.len() < needed {
        return Err(FlimError::BufferTooSmall {
            needed,
            actual: rgba.len(),
        });
    }
    let rgba = &rgba[..needed];

    match desc.format {
        TextureFormat::Rgba8 | TextureFormat::Rgba8Srgb => {
            stop.check()?;
            Ok(uncompressed::pack_rgba8(rgba))
        }
        TextureFormat::Bc1 | TextureFormat::Bc1Srgb => {
            block::compress(blocks, BlockKind::Bc1, rgba, width, height, stop)
        }
        TextureFormat::Bc3 | TextureFormat::Bc3Srgb => {
            block::compress(blocks, BlockKind::Bc3, rgba, width, height, stop)
        }
        _ => Err(FlimError::EncodingNotImplemented(format_id)),
    }
}
