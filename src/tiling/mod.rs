//! Conversion between the on-disk tiled byte order and linear row-major order.
//!
//! Three regimes, selected by the low five bits of the container's
//! tile-mode byte:
//!
//! - mode 0 (linear general): the stored order already is linear.
//! - mode 1 (linear aligned): rows are padded to an aligned pitch; handled here.
//! - modes 2..=15 (1D/2D tiled): bank/pipe addressing is delegated to a
//!   [`SurfaceLayout`] implementation.
//!
//! Every direction returns a buffer of the full expected size. Source bytes
//! that fall outside the input are skipped and the corresponding output stays
//! zero, so truncated or malformed payloads never cause out-of-bounds reads.

mod linear;
mod surface;

pub use linear::aligned_pitch;
pub use surface::{SurfaceDescriptor, SurfaceDim, SurfaceLayout, UnsupportedSurfaceLayout};

use alloc::vec::Vec;
use enough::Stop;

use crate::error::FlimError;
use crate::format::FormatDescriptor;

/// Base value OR'd into the surface swizzle for macro-tiled modes.
pub const MACRO_SWIZZLE_BASE: u32 = 0xD_0000;

/// Tile mode from the low five bits of the tile-mode/swizzle byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileMode {
    LinearGeneral,
    LinearAligned,
    /// GX2 tile modes 2..=15 (1D thin/thick and 2D/3D macro tiling).
    Tiled(u8),
}

impl TileMode {
    /// Decode a tile mode; values 16..=31 are rejected.
    pub fn from_bits(bits: u8) -> Result<Self, FlimError> {
        match bits {
            0 => Ok(Self::LinearGeneral),
            1 => Ok(Self::LinearAligned),
            2..=15 => Ok(Self::Tiled(bits)),
            other => Err(FlimError::UnknownTileMode(other)),
        }
    }

    /// Tile mode stored in a combined tile-mode/swizzle byte.
    pub fn from_tile_byte(byte: u8) -> Result<Self, FlimError> {
        Self::from_bits(byte & 0x1F)
    }

    pub const fn bits(self) -> u8 {
        match self {
            Self::LinearGeneral => 0,
            Self::LinearAligned => 1,
            Self::Tiled(bits) => bits,
        }
    }

    /// Whether bank/pipe swizzling applies (2D and 3D tiled modes).
    pub const fn is_macro_tiled(self) -> bool {
        matches!(self, Self::Tiled(4..=15))
    }
}

/// Bank/pipe swizzle from the high three bits of the tile-mode byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BankPipeSwizzle {
    /// 1-bit pipe selector.
    pub pipe: u8,
    /// 2-bit bank selector.
    pub bank: u8,
}

impl BankPipeSwizzle {
    /// Split the three swizzle bits (already shifted down).
    pub const fn from_bits(bits: u8) -> Self {
        Self {
            pipe: bits & 0x1,
            bank: (bits >> 1) & 0x3,
        }
    }

    /// Swizzle stored in a combined tile-mode/swizzle byte.
    pub const fn from_tile_byte(byte: u8) -> Self {
        Self::from_bits(byte >> 5)
    }

    pub const fn bits(self) -> u8 {
        ((self.bank & 0x3) << 1) | (self.pipe & 0x1)
    }

    /// Swizzle value in the surface-layout collaborator's convention.
    pub const fn surface_value(self, mode: TileMode) -> u32 {
        let base = if mode.is_macro_tiled() {
            MACRO_SWIZZLE_BASE
        } else {
            0
        };
        base | ((self.bits() as u32) << 8)
    }
}

/// Pack a tile mode and swizzle back into the container byte.
pub const fn tile_byte(mode: TileMode, swizzle: BankPipeSwizzle) -> u8 {
    (swizzle.bits() << 5) | (mode.bits() & 0x1F)
}

/// One mip-0 surface as stored in a container.
#[derive(Clone, Copy, Debug)]
pub struct TiledSurface {
    pub format: &'static FormatDescriptor,
    pub width: u32,
    pub height: u32,
    pub tile_mode: TileMode,
    pub swizzle: BankPipeSwizzle,
}

impl TiledSurface {
    pub fn new(format: &'static FormatDescriptor, width: u32, height: u32, tile_mode: TileMode) -> Self {
        Self {
            format,
            width,
            height,
            tile_mode,
            swizzle: BankPipeSwizzle::default(),
        }
    }

    pub fn with_swizzle(mut self, swizzle: BankPipeSwizzle) -> Self {
        self.swizzle = swizzle;
        self
    }

    /// Bytes of the linear (row-major, element-ordered) representation.
    pub fn linear_size(&self) -> usize {
        self.format.linear_size(self.width, self.height)
    }

    /// Detile `tiled` into linear element order.
    pub fn to_linear(
        &self,
        tiled: &[u8],
        layout: &dyn SurfaceLayout,
        stop: &dyn Stop,
    ) -> Result<Vec<u8>, FlimError> {
        let element = self.format.element();
        let across = element.across(self.width);
        let down = element.down(self.height);
        match self.tile_mode {
            TileMode::LinearGeneral => {
                log::trace!("linear general: identity copy of {} bytes", self.linear_size());
                Ok(linear::copy_bounded(tiled, self.linear_size()))
            }
            TileMode::LinearAligned => {
                log::trace!(
                    "linear aligned: {across}x{down} elements, pitch {}",
                    aligned_pitch(across, element.bits)
                );
                linear::detile_aligned(tiled, element, across, down, stop)
            }
            TileMode::Tiled(mode) => {
                log::trace!("tile mode {mode}: delegating to surface layout");
                surface::detile(self, tiled, layout)
            }
        }
    }

    /// Tile `linear` (element-ordered) into the stored byte order.
    pub fn to_tiled(
        &self,
        linear: &[u8],
        layout: &dyn SurfaceLayout,
        stop: &dyn Stop,
    ) -> Result<Vec<u8>, FlimError> {
        let element = self.format.element();
        let across = element.across(self.width);
        let down = element.down(self.height);
        match self.tile_mode {
            TileMode::LinearGeneral => Ok(linear::copy_bounded(linear, self.linear_size())),
            TileMode::LinearAligned => linear::retile_aligned(linear, element, across, down, stop),
            TileMode::Tiled(_) => surface::retile(self, linear, layout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::TextureFormat;
    use enough::Unstoppable;

    #[test]
    fn tile_mode_ranges() {
        assert_eq!(TileMode::from_bits(0).unwrap(), TileMode::LinearGeneral);
        assert_eq!(TileMode::from_bits(1).unwrap(), TileMode::LinearAligned);
        assert_eq!(TileMode::from_bits(4).unwrap(), TileMode::Tiled(4));
        assert!(matches!(
            TileMode::from_bits(16),
            Err(FlimError::UnknownTileMode(16))
        ));
        assert!(!TileMode::Tiled(2).is_macro_tiled());
        assert!(TileMode::Tiled(4).is_macro_tiled());
    }

    #[test]
    fn tile_byte_splits_swizzle() {
        // SSSTTTTT: swizzle 0b101 (bank 0b10, pipe 1), tile mode 4
        let byte = 0b101_00100;
        assert_eq!(TileMode::from_tile_byte(byte).unwrap(), TileMode::Tiled(4));
        let swizzle = BankPipeSwizzle::from_tile_byte(byte);
        assert_eq!(swizzle, BankPipeSwizzle { pipe: 1, bank: 2 });
        assert_eq!(tile_byte(TileMode::Tiled(4), swizzle), byte);
    }

    #[test]
    fn surface_swizzle_value() {
        let swizzle = BankPipeSwizzle { pipe: 1, bank: 3 };
        assert_eq!(
            swizzle.surface_value(TileMode::Tiled(4)),
            MACRO_SWIZZLE_BASE | (0b111 << 8)
        );
        assert_eq!(swizzle.surface_value(TileMode::Tiled(2)), 0b111 << 8);
        assert_eq!(BankPipeSwizzle::default().surface_value(TileMode::Tiled(4)), 0xD_0000);
    }

    #[test]
    fn linear_general_round_trip() {
        let desc = TextureFormat::La8.descriptor();
        let surface = TiledSurface::new(desc, 7, 3, TileMode::LinearGeneral);
        let data: Vec<u8> = (0..surface.linear_size()).map(|i| (i * 7) as u8).collect();
        let tiled = surface
            .to_tiled(&data, &UnsupportedSurfaceLayout, &Unstoppable)
            .unwrap();
        let back = surface
            .to_linear(&tiled, &UnsupportedSurfaceLayout, &Unstoppable)
            .unwrap();
        assert_eq!(back, data);
    }

    #[test]
    fn bc1_aligned_pitch_uses_block_bits() {
        // 8x8 BC1: 2x2 blocks of 8 bytes, rows padded to 64 bytes (8 blocks).
        let desc = TextureFormat::Bc1.descriptor();
        let surface = TiledSurface::new(desc, 8, 8, TileMode::LinearAligned);
        let mut tiled = vec![0xEEu8; 64 * 2];
        tiled[..16].fill(0x11);
        tiled[64..80].fill(0x22);
        let linear = surface
            .to_linear(&tiled, &UnsupportedSurfaceLayout, &Unstoppable)
            .unwrap();
        assert_eq!(linear.len(), 32);
        assert!(linear[..16].iter().all(|&b| b == 0x11));
        assert!(linear[16..].iter().all(|&b| b == 0x22));
    }

    #[test]
    fn macro_modes_need_a_surface_layout() {
        let desc = TextureFormat::Rgba8.descriptor();
        let surface = TiledSurface::new(desc, 4, 4, TileMode::Tiled(4));
        let err = surface
            .to_linear(&[0; 64], &UnsupportedSurfaceLayout, &Unstoppable)
            .unwrap_err();
        assert!(matches!(err, FlimError::SurfaceLayout(_)));
    }
}
