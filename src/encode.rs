use alloc::vec::Vec;
use enough::Stop;

use crate::codec::{self, BlockCodec, BuiltinBlockCodec};
use crate::container::{ByteOrder, FooterFields, write_container};
use crate::error::FlimError;
use crate::format::TextureFormat;
use crate::limits::Limits;
use crate::tiling::{
    BankPipeSwizzle, SurfaceLayout, TileMode, TiledSurface, UnsupportedSurfaceLayout, tile_byte,
};

/// Default value of the metadata block's alignment field.
pub const DEFAULT_ALIGNMENT: u16 = 0x200;

/// Collaborators used when re-encoding pixels.
#[derive(Clone, Copy)]
pub struct EncodeOptions<'a> {
    pub(crate) limits: Option<&'a Limits>,
    pub(crate) surface: &'a dyn SurfaceLayout,
    pub(crate) blocks: &'a dyn BlockCodec,
}

impl Default for EncodeOptions<'_> {
    fn default() -> Self {
        Self {
            limits: None,
            surface: &UnsupportedSurfaceLayout,
            blocks: &BuiltinBlockCodec,
        }
    }
}

impl core::fmt::Debug for EncodeOptions<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EncodeOptions")
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl<'a> EncodeOptions<'a> {
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_surface_layout(mut self, layout: &'a dyn SurfaceLayout) -> Self {
        self.surface = layout;
        self
    }

    pub fn with_block_codec(mut self, codec: &'a dyn BlockCodec) -> Self {
        self.blocks = codec;
        self
    }

    /// Encode RGBA8 into the stored byte order of `surface`.
    pub(crate) fn encode_surface(
        &self,
        surface: &TiledSurface,
        rgba: &[u8],
        stop: &dyn Stop,
    ) -> Result<Vec<u8>, FlimError> {
        if let Some(limits) = self.limits {
            limits.check_dimensions(surface.width, surface.height)?;
            limits.check_allocation(surface.linear_size())?;
        }
        let linear = codec::encode(
            surface.format.id,
            rgba,
            surface.width,
            surface.height,
            self.blocks,
            stop,
        )?;
        stop.check()?;
        let stored = surface.to_tiled(&linear, self.surface, stop)?;
        if let Some(limits) = self.limits {
            limits.check_allocation(stored.len())?;
        }
        Ok(stored)
    }
}

/// Build a new FLIM file from RGBA8 pixels.
///
/// ```no_run
/// use zenflim::{EncodeRequest, TextureFormat, TileMode, Unstoppable};
///
/// let rgba = vec![255u8; 16 * 16 * 4];
/// let flim = EncodeRequest::new(TextureFormat::Rgba8)
///     .with_tile_mode(TileMode::LinearAligned)
///     .encode(&rgba, 16, 16, Unstoppable)?;
/// # Ok::<(), zenflim::FlimError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct EncodeRequest<'a> {
    format: TextureFormat,
    tile_mode: TileMode,
    swizzle: BankPipeSwizzle,
    alignment: u16,
    byte_order: ByteOrder,
    options: EncodeOptions<'a>,
}

impl<'a> EncodeRequest<'a> {
    /// Linear aligned, unswizzled, big-endian output in `format`.
    pub fn new(format: TextureFormat) -> Self {
        Self {
            format,
            tile_mode: TileMode::LinearAligned,
            swizzle: BankPipeSwizzle::default(),
            alignment: DEFAULT_ALIGNMENT,
            byte_order: ByteOrder::Big,
            options: EncodeOptions::default(),
        }
    }

    pub fn with_tile_mode(mut self, mode: TileMode) -> Self {
        self.tile_mode = mode;
        self
    }

    pub fn with_swizzle(mut self, swizzle: BankPipeSwizzle) -> Self {
        self.swizzle = swizzle;
        self
    }

    pub fn with_alignment(mut self, alignment: u16) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn with_byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    pub fn with_options(mut self, options: EncodeOptions<'a>) -> Self {
        self.options = options;
        self
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.options = self.options.with_limits(limits);
        self
    }

    pub fn with_surface_layout(mut self, layout: &'a dyn SurfaceLayout) -> Self {
        self.options = self.options.with_surface_layout(layout);
        self
    }

    pub fn with_block_codec(mut self, codec: &'a dyn BlockCodec) -> Self {
        self.options = self.options.with_block_codec(codec);
        self
    }

    /// Encode `rgba` (`width * height * 4` bytes) into a complete container.
    pub fn encode(
        self,
        rgba: &[u8],
        width: u32,
        height: u32,
        stop: impl Stop,
    ) -> Result<Vec<u8>, FlimError> {
        let (Ok(w16), Ok(h16)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(FlimError::DimensionsTooLarge { width, height });
        };
        let surface = TiledSurface::new(self.format.descriptor(), width, height, self.tile_mode)
            .with_swizzle(self.swizzle);
        let payload = self.options.encode_surface(&surface, rgba, &stop)?;
        if u32::try_from(payload.len()).is_err() {
            return Err(FlimError::DimensionsTooLarge { width, height });
        }
        Ok(write_container(
            &payload,
            &FooterFields {
                width: w16,
                height: h16,
                alignment: self.alignment,
                format_id: self.format.id(),
                tile_byte: tile_byte(self.tile_mode, self.swizzle),
                byte_order: self.byte_order,
            },
        ))
    }
}
