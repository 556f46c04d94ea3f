//! Delegation of 1D/2D tiled modes to a GX2 surface-layout implementation.

use alloc::format;
use alloc::vec;
use alloc::vec::Vec;

use super::{TileMode, TiledSurface};
use crate::error::FlimError;

/// GX2 surface dimensionality.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SurfaceDim {
    Tex1D = 0,
    Tex2D = 1,
    Tex3D = 2,
    Cube = 3,
}

/// Surface description handed to a [`SurfaceLayout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceDescriptor {
    pub dim: SurfaceDim,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_levels: u32,
    /// GX2 surface format code.
    pub format: u32,
    /// GX2 tile mode (0 = linear general).
    pub tile_mode: u8,
    pub swizzle: u32,
}

/// GX2 address library capability for the tiled modes this crate does not
/// compute itself.
///
/// Implementations convert whole mip-0 surfaces between layouts. `copy_surface`
/// receives buffers at least `calc_size` bytes long for their descriptors.
pub trait SurfaceLayout: Sync {
    /// Byte size of a surface in the layout `desc` describes.
    fn calc_size(&self, desc: &SurfaceDescriptor) -> Result<usize, FlimError>;

    /// Copy `src` (laid out per `src_desc`) into `dst` (laid out per `dst_desc`).
    fn copy_surface(
        &self,
        src: &[u8],
        src_desc: &SurfaceDescriptor,
        dst: &mut [u8],
        dst_desc: &SurfaceDescriptor,
    ) -> Result<(), FlimError>;
}

/// Default layout: reports tiled modes as unavailable.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnsupportedSurfaceLayout;

impl SurfaceLayout for UnsupportedSurfaceLayout {
    fn calc_size(&self, desc: &SurfaceDescriptor) -> Result<usize, FlimError> {
        Err(FlimError::SurfaceLayout(format!(
            "no surface layout configured for tile mode {}",
            desc.tile_mode
        )))
    }

    fn copy_surface(
        &self,
        _src: &[u8],
        src_desc: &SurfaceDescriptor,
        _dst: &mut [u8],
        dst_desc: &SurfaceDescriptor,
    ) -> Result<(), FlimError> {
        Err(FlimError::SurfaceLayout(format!(
            "no surface layout configured for tile mode {} -> {}",
            src_desc.tile_mode, dst_desc.tile_mode
        )))
    }
}

impl TiledSurface {
    /// Descriptor for this surface in `mode`, with the swizzle for that mode.
    pub fn descriptor(&self, mode: TileMode) -> Result<SurfaceDescriptor, FlimError> {
        let format = self.format.surface_format.ok_or_else(|| {
            FlimError::SurfaceLayout(format!(
                "{} has no GX2 surface format",
                self.format.name
            ))
        })?;
        let element = self.format.element();
        // Sub-byte formats are laid out as 8-bit surfaces of packed pairs.
        let width = if element.height == 1 && element.width > 1 {
            element.across(self.width)
        } else {
            self.width
        };
        Ok(SurfaceDescriptor {
            dim: SurfaceDim::Tex2D,
            width,
            height: self.height,
            depth: 1,
            mip_levels: 1,
            format,
            tile_mode: mode.bits(),
            swizzle: match mode {
                TileMode::Tiled(_) => self.swizzle.surface_value(mode),
                TileMode::LinearGeneral | TileMode::LinearAligned => 0,
            },
        })
    }
}

/// Copy `data` into a zeroed buffer of at least `size` bytes so the
/// collaborator never reads past the end of a truncated payload.
fn padded(data: &[u8], size: usize) -> Vec<u8> {
    let mut out = vec![0u8; size.max(data.len())];
    out[..data.len()].copy_from_slice(data);
    out
}

pub(super) fn detile(
    surface: &TiledSurface,
    tiled: &[u8],
    layout: &dyn SurfaceLayout,
) -> Result<Vec<u8>, FlimError> {
    let src_desc = surface.descriptor(surface.tile_mode)?;
    let dst_desc = surface.descriptor(TileMode::LinearGeneral)?;

    let src_size = layout.calc_size(&src_desc)?;
    let src = padded(tiled, src_size);
    let mut dst = vec![0u8; layout.calc_size(&dst_desc)?];
    layout.copy_surface(&src, &src_desc, &mut dst, &dst_desc)?;

    dst.resize(surface.linear_size(), 0);
    Ok(dst)
}

pub(super) fn retile(
    surface: &TiledSurface,
    linear: &[u8],
    layout: &dyn SurfaceLayout,
) -> Result<Vec<u8>, FlimError> {
    let src_desc = surface.descriptor(TileMode::LinearGeneral)?;
    let dst_desc = surface.descriptor(surface.tile_mode)?;

    let src = padded(linear, layout.calc_size(&src_desc)?);
    let mut dst = vec![0u8; layout.calc_size(&dst_desc)?];
    layout.copy_surface(&src, &src_desc, &mut dst, &dst_desc)?;
    Ok(dst)
}
