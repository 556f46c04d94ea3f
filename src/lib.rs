//! # zenflim
//!
//! Decoder and encoder for Wii U FLIM textures: a GPU-native (possibly
//! tiled) image payload followed by a small `FLIM`/`imag` footer.
//!
//! ## Pipeline
//!
//! Decoding parses the footer, detiles the payload into linear element
//! order, then unpacks the format's pixels to RGBA8. Encoding runs the same
//! stages backward.
//!
//! - [`container`]: footer parsing (backward scan for the `imag` block,
//!   byte-order mark) and writing.
//! - [`format`]: the fixed table of 26 format ids.
//! - [`tiling`]: linear general (identity), linear aligned (padded pitch)
//!   and the tiled modes 2..=15, which go through a [`SurfaceLayout`].
//! - [`codec`]: per-format unpacking, and BCn/ETC1 through a [`BlockCodec`].
//!
//! ## Zero-Copy Decoding
//!
//! RGBA8 surfaces stored in linear general mode are returned borrowed from
//! the input: the big-endian `RRGGBBAA` word unpack is the identity on bytes.
//! Everything else allocates.
//!
//! ## Collaborators
//!
//! Macro-tiled address math is not implemented here. Supply a
//! [`SurfaceLayout`] (an addrlib port, for instance) through
//! [`DecodeRequest::with_surface_layout`]. Without one, tile modes 2..=15
//! fail with [`FlimError::SurfaceLayout`]. Block decompression defaults to
//! [`BuiltinBlockCodec`] (squish and texture2ddecoder, `bcn` feature).
//!
//! ## Non-Goals
//!
//! - Mip levels beyond 0, resizing, colour management
//! - Encoding formats other than RGBA8, BC1 and BC3
//! - File I/O and CLI handling
//!
//! ## Usage
//!
//! ```no_run
//! use zenflim::{DecodeRequest, EncodeOptions, ImageInfo, Texture, Unstoppable};
//!
//! let data: Vec<u8> = Vec::new(); // your .bflim bytes
//!
//! // Probe without decoding
//! let info = ImageInfo::from_bytes(&data)?;
//! println!("{}x{} {:?} tile mode {}", info.width, info.height, info.format, info.tile_mode);
//!
//! // Decode to RGBA8
//! let image = DecodeRequest::new(&data).decode(Unstoppable)?;
//! let mut rgba = image.into_pixels();
//!
//! // Edit and write back in place
//! rgba.iter_mut().skip(3).step_by(4).for_each(|a| *a = 255);
//! let mut texture = Texture::from_bytes(data)?;
//! texture.replace_pixels(&rgba, &EncodeOptions::default(), Unstoppable)?;
//! let patched: Vec<u8> = texture.into_bytes();
//! # Ok::<(), zenflim::FlimError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

mod error;
mod info;
mod limits;
mod pixel;

pub mod codec;
pub mod container;
pub mod format;
pub mod tiling;

mod decode;
mod encode;
mod texture;

// Re-exports
pub use codec::{AlphaConvention, BlockCodec, BuiltinBlockCodec, Fallback, PLACEHOLDER_RGBA};
pub use container::{ByteOrder, Metadata, parse};
pub use decode::{DecodeOptions, DecodeOutput, DecodeRequest};
pub use encode::{DEFAULT_ALIGNMENT, EncodeOptions, EncodeRequest};
pub use enough::{Stop, Unstoppable};
pub use error::FlimError;
pub use format::{BlockKind, ChannelLayout, FormatDescriptor, TextureFormat, lookup};
pub use info::ImageInfo;
pub use limits::Limits;
#[cfg(feature = "rgb")]
pub use pixel::DecodePixel;
pub use pixel::PixelLayout;
pub use texture::Texture;
pub use tiling::{
    BankPipeSwizzle, SurfaceDescriptor, SurfaceDim, SurfaceLayout, TileMode, TiledSurface,
    UnsupportedSurfaceLayout,
};

/// Probe a FLIM buffer's metadata.
pub fn probe(data: &[u8]) -> Result<ImageInfo, FlimError> {
    ImageInfo::from_bytes(data)
}

/// Decode a FLIM buffer to RGBA8 with default options.
pub fn decode(data: &[u8], stop: impl Stop) -> Result<DecodeOutput<'_>, FlimError> {
    DecodeRequest::new(data).decode(stop)
}
