use crate::container::{self, ByteOrder};
use crate::error::FlimError;
use crate::format::TextureFormat;
use crate::tiling::BankPipeSwizzle;

/// Image metadata read from the footer, without touching the payload.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub format: TextureFormat,
    /// Raw tile mode bits; values 16..=31 are reported but cannot be decoded.
    pub tile_mode: u8,
    pub swizzle: BankPipeSwizzle,
    pub alignment: u16,
    pub byte_order: ByteOrder,
    pub image_data_size: u32,
    pub srgb: bool,
}

impl ImageInfo {
    /// Probe a FLIM buffer.
    pub fn from_bytes(data: &[u8]) -> Result<Self, FlimError> {
        let (meta, _) = container::parse(data)?;
        Ok(Self {
            width: u32::from(meta.width),
            height: u32::from(meta.height),
            format: meta.format.format,
            tile_mode: meta.tile_mode_bits(),
            swizzle: meta.swizzle(),
            alignment: meta.alignment,
            byte_order: meta.byte_order,
            image_data_size: meta.image_data_size,
            srgb: meta.format.srgb,
        })
    }

    /// Bytes of RGBA8 output a full decode produces.
    pub fn rgba_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }
}
