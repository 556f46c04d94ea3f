//! FLIM pixel format table.
//!
//! The container stores a one-byte format id. Every id the format defines has
//! exactly one [`FormatDescriptor`]; anything else is unsupported and must be
//! reported as such rather than decoded as a guessed default.

/// Block-compression family handled by the [`BlockCodec`](crate::BlockCodec)
/// collaborator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Bc1,
    Bc2,
    Bc3,
    Bc4,
    Bc5,
    Etc1,
}

impl BlockKind {
    /// Packed bytes per 4x4 block.
    pub const fn bytes_per_block(self) -> usize {
        match self {
            Self::Bc1 | Self::Bc4 | Self::Etc1 => 8,
            Self::Bc2 | Self::Bc3 | Self::Bc5 => 16,
        }
    }
}

/// How the stored channels map onto RGBA.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChannelLayout {
    Luminance,
    Alpha,
    LuminanceAlpha,
    /// Two independent 8-bit channels (HILO8).
    HighLow,
    Color,
    ColorAlpha,
    /// ETC1 colour blocks preceded by 4-bit alpha blocks.
    Etc1Alpha4,
    BlockCompressed(BlockKind),
}

/// Every format id a FLIM container may carry.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TextureFormat {
    L8 = 0x00,
    A8 = 0x01,
    La4 = 0x02,
    La8 = 0x03,
    Hilo8 = 0x04,
    Rgb565 = 0x05,
    Rgbx8 = 0x06,
    Rgb5a1 = 0x07,
    Rgba4 = 0x08,
    Rgba8 = 0x09,
    Etc1 = 0x0A,
    Etc1a4 = 0x0B,
    Bc1 = 0x0C,
    Bc2 = 0x0D,
    Bc3 = 0x0E,
    Bc4L = 0x0F,
    Bc4A = 0x10,
    Bc5 = 0x11,
    L4 = 0x12,
    A4 = 0x13,
    Rgba8Srgb = 0x14,
    Bc1Srgb = 0x15,
    Bc2Srgb = 0x16,
    Bc3Srgb = 0x17,
    Rgb10a2 = 0x18,
    Rgb565Indirect = 0x19,
}

/// Immutable description of one format id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FormatDescriptor {
    pub id: u8,
    pub format: TextureFormat,
    pub name: &'static str,
    pub layout: ChannelLayout,
    pub bits_per_pixel: u8,
    pub srgb: bool,
    /// GX2 surface format handed to the surface-layout collaborator.
    /// `None` for formats the GX2 hardware has no equivalent for.
    pub surface_format: Option<u32>,
}

/// Shape of the smallest addressable unit of a format's payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementShape {
    /// Pixels covered horizontally.
    pub width: u32,
    /// Pixels covered vertically.
    pub height: u32,
    /// Stored bits per element.
    pub bits: u32,
}

impl ElementShape {
    pub const fn bytes(&self) -> usize {
        (self.bits / 8) as usize
    }

    /// Elements needed to cover `pixels` horizontally.
    pub const fn across(&self, pixels: u32) -> u32 {
        pixels.div_ceil(self.width)
    }

    /// Elements needed to cover `pixels` vertically.
    pub const fn down(&self, pixels: u32) -> u32 {
        pixels.div_ceil(self.height)
    }
}

impl FormatDescriptor {
    /// Element geometry used by the layout transcoder.
    pub const fn element(&self) -> ElementShape {
        match self.layout {
            ChannelLayout::BlockCompressed(_) | ChannelLayout::Etc1Alpha4 => ElementShape {
                width: 4,
                height: 4,
                bits: self.bits_per_pixel as u32 * 16,
            },
            _ if self.bits_per_pixel == 4 => ElementShape {
                width: 2,
                height: 1,
                bits: 8,
            },
            _ => ElementShape {
                width: 1,
                height: 1,
                bits: self.bits_per_pixel as u32,
            },
        }
    }

    /// Bytes of linear (untiled) payload for a `width` x `height` image.
    pub const fn linear_size(&self, width: u32, height: u32) -> usize {
        let e = self.element();
        e.across(width) as usize * e.down(height) as usize * e.bytes()
    }
}

impl TextureFormat {
    /// Look up a format by its container id.
    pub fn from_id(id: u8) -> Option<Self> {
        lookup(id).map(|d| d.format)
    }

    pub const fn id(self) -> u8 {
        self as u8
    }

    pub fn descriptor(self) -> &'static FormatDescriptor {
        // The table is indexed by id, and every variant's discriminant is a table index.
        &FORMATS[self as usize]
    }
}

/// Look up the descriptor for a raw format id.
///
/// Returns `None` for every byte outside the enumerated set. No default
/// format is ever substituted.
pub fn lookup(id: u8) -> Option<&'static FormatDescriptor> {
    FORMATS.get(id as usize)
}

/// All supported formats, indexed by id.
pub fn all_formats() -> &'static [FormatDescriptor] {
    &FORMATS
}

macro_rules! fmt {
    ($id:literal, $format:ident, $name:literal, $layout:expr, $bpp:literal, $srgb:literal, $gx2:expr) => {
        FormatDescriptor {
            id: $id,
            format: TextureFormat::$format,
            name: $name,
            layout: $layout,
            bits_per_pixel: $bpp,
            srgb: $srgb,
            surface_format: $gx2,
        }
    };
}

use BlockKind::*;
use ChannelLayout::*;

static FORMATS: [FormatDescriptor; 26] = [
    fmt!(0x00, L8, "L8_UNORM", Luminance, 8, false, Some(0x0001)),
    fmt!(0x01, A8, "A8_UNORM", Alpha, 8, false, Some(0x0001)),
    fmt!(0x02, La4, "LA4_UNORM", LuminanceAlpha, 8, false, Some(0x0002)),
    fmt!(0x03, La8, "LA8_UNORM", LuminanceAlpha, 16, false, Some(0x0007)),
    fmt!(0x04, Hilo8, "HILO8", HighLow, 16, false, Some(0x0007)),
    fmt!(0x05, Rgb565, "RGB565_UNORM", Color, 16, false, Some(0x0008)),
    fmt!(0x06, Rgbx8, "RGBX8_UNORM", Color, 32, false, Some(0x001a)),
    fmt!(0x07, Rgb5a1, "RGB5A1_UNORM", ColorAlpha, 16, false, Some(0x000a)),
    fmt!(0x08, Rgba4, "RGBA4_UNORM", ColorAlpha, 16, false, Some(0x000b)),
    fmt!(0x09, Rgba8, "RGBA8_UNORM", ColorAlpha, 32, false, Some(0x001a)),
    fmt!(0x0A, Etc1, "ETC1_UNORM", BlockCompressed(Etc1), 4, false, None),
    fmt!(0x0B, Etc1a4, "ETC1A4_UNORM", Etc1Alpha4, 8, false, None),
    fmt!(0x0C, Bc1, "BC1_UNORM", BlockCompressed(Bc1), 4, false, Some(0x0031)),
    fmt!(0x0D, Bc2, "BC2_UNORM", BlockCompressed(Bc2), 8, false, Some(0x0032)),
    fmt!(0x0E, Bc3, "BC3_UNORM", BlockCompressed(Bc3), 8, false, Some(0x0033)),
    fmt!(0x0F, Bc4L, "BC4L_UNORM", BlockCompressed(Bc4), 4, false, Some(0x0034)),
    fmt!(0x10, Bc4A, "BC4A_UNORM", BlockCompressed(Bc4), 4, false, Some(0x0034)),
    fmt!(0x11, Bc5, "BC5_UNORM", BlockCompressed(Bc5), 8, false, Some(0x0035)),
    fmt!(0x12, L4, "L4_UNORM", Luminance, 4, false, Some(0x0001)),
    fmt!(0x13, A4, "A4_UNORM", Alpha, 4, false, Some(0x0001)),
    fmt!(0x14, Rgba8Srgb, "RGBA8_SRGB", ColorAlpha, 32, true, Some(0x041a)),
    fmt!(0x15, Bc1Srgb, "BC1_SRGB", BlockCompressed(Bc1), 4, true, Some(0x0431)),
    fmt!(0x16, Bc2Srgb, "BC2_SRGB", BlockCompressed(Bc2), 8, true, Some(0x0432)),
    fmt!(0x17, Bc3Srgb, "BC3_SRGB", BlockCompressed(Bc3), 8, true, Some(0x0433)),
    fmt!(0x18, Rgb10a2, "RGB10A2_UNORM", ColorAlpha, 32, false, Some(0x0019)),
    fmt!(0x19, Rgb565Indirect, "RGB565_INDIRECT_UNORM", Color, 16, false, Some(0x0008)),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_total_over_all_bytes() {
        let found = (0..=255u8).filter(|&id| lookup(id).is_some()).count();
        assert_eq!(found, 26);
        for id in 0..=255u8 {
            match lookup(id) {
                Some(desc) => {
                    assert!(id <= 0x19);
                    assert_eq!(desc.id, id);
                    assert_eq!(desc.format.id(), id);
                }
                None => assert!(id > 0x19, "id 0x{id:02x} missing from table"),
            }
        }
    }

    #[test]
    fn descriptor_round_trips_through_enum() {
        for desc in all_formats() {
            assert_eq!(TextureFormat::from_id(desc.id), Some(desc.format));
            assert_eq!(desc.format.descriptor(), desc);
        }
    }

    #[test]
    fn element_shapes() {
        let bc1 = TextureFormat::Bc1.descriptor().element();
        assert_eq!((bc1.width, bc1.height, bc1.bytes()), (4, 4, 8));
        let bc3 = TextureFormat::Bc3.descriptor().element();
        assert_eq!(bc3.bytes(), 16);
        let l4 = TextureFormat::L4.descriptor().element();
        assert_eq!((l4.width, l4.height, l4.bytes()), (2, 1, 1));
        let rgba = TextureFormat::Rgba8.descriptor().element();
        assert_eq!((rgba.width, rgba.height, rgba.bytes()), (1, 1, 4));
    }

    #[test]
    fn linear_size_rounds_up_partial_blocks() {
        assert_eq!(TextureFormat::Bc1.descriptor().linear_size(5, 5), 4 * 8);
        assert_eq!(TextureFormat::L4.descriptor().linear_size(3, 2), 4);
        assert_eq!(TextureFormat::Rgba8.descriptor().linear_size(10, 3), 120);
    }
}
