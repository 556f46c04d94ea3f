//! FLIM container footer: parsing and writing (internal).
//!
//! A FLIM file is the image payload followed by two 20-byte records: the
//! `FLIM` file header (byte-order mark, version, file size) and the `imag`
//! metadata block (dimensions, format, tile mode/swizzle, payload size).

mod read;
mod write;

pub use read::parse;
pub(crate) use write::{FooterFields, write_container};

use crate::error::FlimError;
use crate::format::FormatDescriptor;
use crate::tiling::{BankPipeSwizzle, TileMode, TiledSurface};

/// Size of the `imag` metadata block.
pub const METADATA_BLOCK_SIZE: usize = 0x14;
/// Size of the `FLIM` file header record.
pub const FILE_HEADER_SIZE: usize = 0x14;
/// How far back from the end of the buffer the metadata block is searched for.
pub const MAGIC_SCAN_WINDOW: usize = 0x50;

pub(crate) const FILE_MAGIC: &[u8; 4] = b"FLIM";
pub(crate) const BLOCK_MAGIC: &[u8; 4] = b"imag";
pub(crate) const FILE_VERSION: u32 = 0x0202_0000;

/// Byte order of the footer's multi-byte fields.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Console-native order, marked by `FE FF`.
    #[default]
    Big,
    /// Marked by `FF FE`, or assumed when no file header is present.
    Little,
}

impl ByteOrder {
    pub(crate) fn from_mark(mark: [u8; 2]) -> Option<Self> {
        match mark {
            [0xFE, 0xFF] => Some(Self::Big),
            [0xFF, 0xFE] => Some(Self::Little),
            _ => None,
        }
    }

    pub(crate) fn mark(self) -> [u8; 2] {
        match self {
            Self::Big => [0xFE, 0xFF],
            Self::Little => [0xFF, 0xFE],
        }
    }

    pub(crate) fn read_u16(self, bytes: [u8; 2]) -> u16 {
        match self {
            Self::Big => u16::from_be_bytes(bytes),
            Self::Little => u16::from_le_bytes(bytes),
        }
    }

    pub(crate) fn read_u32(self, bytes: [u8; 4]) -> u32 {
        match self {
            Self::Big => u32::from_be_bytes(bytes),
            Self::Little => u32::from_le_bytes(bytes),
        }
    }

    pub(crate) fn u16_bytes(self, v: u16) -> [u8; 2] {
        match self {
            Self::Big => v.to_be_bytes(),
            Self::Little => v.to_le_bytes(),
        }
    }

    pub(crate) fn u32_bytes(self, v: u32) -> [u8; 4] {
        match self {
            Self::Big => v.to_be_bytes(),
            Self::Little => v.to_le_bytes(),
        }
    }
}

/// Fields of the `FLIM` file header record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FileHeader {
    pub header_size: u16,
    pub version: u32,
    pub file_size: u32,
    pub block_count: u16,
}

/// Parsed `imag` metadata block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Metadata {
    pub width: u16,
    pub height: u16,
    pub alignment: u16,
    pub format: &'static FormatDescriptor,
    /// Combined byte: tile mode in the low 5 bits, swizzle in the high 3.
    pub tile_byte: u8,
    pub image_data_size: u32,
    pub byte_order: ByteOrder,
    /// The `FLIM` record, when one precedes the metadata block.
    pub file_header: Option<FileHeader>,
    /// Offset of the `imag` block within the buffer.
    pub block_offset: usize,
}

impl Metadata {
    pub fn format_id(&self) -> u8 {
        self.format.id
    }

    /// Raw tile mode bits (0..=31).
    pub fn tile_mode_bits(&self) -> u8 {
        self.tile_byte & 0x1F
    }

    pub fn tile_mode(&self) -> Result<TileMode, FlimError> {
        TileMode::from_tile_byte(self.tile_byte)
    }

    pub fn swizzle(&self) -> BankPipeSwizzle {
        BankPipeSwizzle::from_tile_byte(self.tile_byte)
    }

    /// Start of the footer: the file header if present, else the metadata block.
    pub fn footer_offset(&self) -> usize {
        match self.file_header {
            Some(_) => self.block_offset.saturating_sub(FILE_HEADER_SIZE),
            None => self.block_offset,
        }
    }

    /// The stored surface, for handing to the layout transcoder.
    pub fn surface(&self) -> Result<TiledSurface, FlimError> {
        Ok(TiledSurface::new(
            self.format,
            u32::from(self.width),
            u32::from(self.height),
            self.tile_mode()?,
        )
        .with_swizzle(self.swizzle()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TextureFormat;

    #[test]
    fn footer_offset_never_underflows() {
        let meta = Metadata {
            width: 1,
            height: 1,
            alignment: 0,
            format: TextureFormat::Rgba8.descriptor(),
            tile_byte: 0,
            image_data_size: 0,
            byte_order: ByteOrder::Big,
            file_header: Some(FileHeader {
                header_size: 0x14,
                version: FILE_VERSION,
                file_size: 0,
                block_count: 1,
            }),
            block_offset: 4,
        };
        assert_eq!(meta.footer_offset(), 0);
        let meta = Metadata {
            block_offset: 64,
            ..meta
        };
        assert_eq!(meta.footer_offset(), 44);
    }
}
