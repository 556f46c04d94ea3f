//! Owned FLIM file with in-place pixel replacement.

use alloc::vec::Vec;
use enough::Stop;

use crate::container::{self, Metadata};
use crate::decode::{self, DecodeOptions, DecodeOutput};
use crate::encode::EncodeOptions;
use crate::error::FlimError;
use crate::tiling::TileMode;

/// A parsed FLIM file that keeps its raw bytes.
///
/// [`replace_pixels`](Self::replace_pixels) re-encodes new pixels with the
/// stored format, tile mode and swizzle and writes them over the start of the
/// payload region. The footer and any bytes past the new payload are left
/// as they were.
#[derive(Clone, Debug)]
pub struct Texture {
    raw: Vec<u8>,
    metadata: Metadata,
}

impl Texture {
    /// Parse `raw`, taking ownership of the buffer.
    pub fn from_bytes(raw: Vec<u8>) -> Result<Self, FlimError> {
        let (metadata, _) = container::parse(&raw)?;
        Ok(Self { raw, metadata })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn width(&self) -> u32 {
        u32::from(self.metadata.width)
    }

    pub fn height(&self) -> u32 {
        u32::from(self.metadata.height)
    }

    /// The stored (tiled) image payload.
    pub fn payload(&self) -> &[u8] {
        &self.raw[..self.metadata.image_data_size as usize]
    }

    /// The whole file.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.raw
    }

    /// Decode to RGBA8.
    pub fn decode(
        &self,
        options: &DecodeOptions<'_>,
        stop: impl Stop,
    ) -> Result<DecodeOutput<'_>, FlimError> {
        decode::decode_rgba(&self.metadata, self.payload(), options, &stop)
    }

    /// Re-encode `rgba` into the payload region.
    ///
    /// Linear general surfaces are rejected with [`FlimError::NotTiled`].
    /// An encoding larger than the declared payload fails with
    /// [`FlimError::SizeMismatch`]. On any error the buffer is unchanged.
    pub fn replace_pixels(
        &mut self,
        rgba: &[u8],
        options: &EncodeOptions<'_>,
        stop: impl Stop,
    ) -> Result<(), FlimError> {
        let surface = self.metadata.surface()?;
        if surface.tile_mode == TileMode::LinearGeneral {
            return Err(FlimError::NotTiled(self.metadata.tile_mode_bits()));
        }
        let encoded = options.encode_surface(&surface, rgba, &stop)?;
        let available = self.metadata.image_data_size as usize;
        if encoded.len() > available {
            return Err(FlimError::SizeMismatch {
                encoded: encoded.len(),
                available,
            });
        }
        log::debug!(
            "replacing {} of {available} payload bytes",
            encoded.len()
        );
        self.raw[..encoded.len()].copy_from_slice(&encoded);
        Ok(())
    }
}
