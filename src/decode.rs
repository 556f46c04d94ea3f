use alloc::borrow::Cow;
use alloc::vec::Vec;
use enough::Stop;

#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use crate::codec::{self, AlphaConvention, BlockCodec, BuiltinBlockCodec, Fallback};
use crate::container::{self, Metadata};
use crate::error::FlimError;
use crate::format::TextureFormat;
use crate::limits::Limits;
use crate::pixel::PixelLayout;
use crate::tiling::{SurfaceLayout, TileMode, TiledSurface, UnsupportedSurfaceLayout};

/// Collaborators and policies for a decode.
///
/// The defaults handle linear surfaces with the built-in block codec, reject
/// macro-tiled surfaces, propagate errors and visualise alpha-only formats.
#[derive(Clone, Copy)]
pub struct DecodeOptions<'a> {
    pub(crate) limits: Option<&'a Limits>,
    pub(crate) surface: &'a dyn SurfaceLayout,
    pub(crate) blocks: &'a dyn BlockCodec,
    pub(crate) fallback: Fallback,
    pub(crate) alpha: AlphaConvention,
}

impl Default for DecodeOptions<'_> {
    fn default() -> Self {
        Self {
            limits: None,
            surface: &UnsupportedSurfaceLayout,
            blocks: &BuiltinBlockCodec,
            fallback: Fallback::Error,
            alpha: AlphaConvention::Visualize,
        }
    }
}

impl core::fmt::Debug for DecodeOptions<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DecodeOptions")
            .field("limits", &self.limits)
            .field("fallback", &self.fallback)
            .field("alpha", &self.alpha)
            .finish_non_exhaustive()
    }
}

impl<'a> DecodeOptions<'a> {
    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    /// Addressing implementation for tile modes 2..=15.
    pub fn with_surface_layout(mut self, layout: &'a dyn SurfaceLayout) -> Self {
        self.surface = layout;
        self
    }

    pub fn with_block_codec(mut self, codec: &'a dyn BlockCodec) -> Self {
        self.blocks = codec;
        self
    }

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn with_alpha_convention(mut self, alpha: AlphaConvention) -> Self {
        self.alpha = alpha;
        self
    }
}

/// Decoded image output. Pixels may be borrowed (zero-copy) or owned.
#[derive(Clone, Debug)]
pub struct DecodeOutput<'a> {
    pixels: Cow<'a, [u8]>,
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
}

impl<'a> DecodeOutput<'a> {
    /// Access the pixel data.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Take ownership of the pixel data (copies if borrowed).
    pub fn into_owned(self) -> DecodeOutput<'static> {
        DecodeOutput {
            pixels: Cow::Owned(self.pixels.into_owned()),
            width: self.width,
            height: self.height,
            layout: self.layout,
        }
    }

    /// Move the pixels out as a `Vec` (copies if borrowed).
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels.into_owned()
    }

    /// Whether the pixel data is borrowed from the input buffer.
    pub fn is_borrowed(&self) -> bool {
        matches!(self.pixels, Cow::Borrowed(_))
    }

    pub(crate) fn borrowed(data: &'a [u8], width: u32, height: u32, layout: PixelLayout) -> Self {
        Self {
            pixels: Cow::Borrowed(data),
            width,
            height,
            layout,
        }
    }

    pub(crate) fn owned(data: Vec<u8>, width: u32, height: u32, layout: PixelLayout) -> Self {
        Self {
            pixels: Cow::Owned(data),
            width,
            height,
            layout,
        }
    }

    /// Reinterpret pixel data as a typed pixel slice.
    ///
    /// Returns [`FlimError::LayoutMismatch`] if the pixel layout doesn't match `P`.
    #[cfg(feature = "rgb")]
    pub fn as_pixels<P: crate::DecodePixel>(&self) -> Result<&[P], FlimError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        if self.layout != P::layout() {
            return Err(FlimError::LayoutMismatch {
                expected: P::layout(),
                actual: self.layout,
            });
        }
        Ok(self.pixels().as_pixels())
    }

    /// View as an [`imgref::ImgRef`] borrowing this output's buffer.
    #[cfg(feature = "imgref")]
    pub fn as_imgref<P: crate::DecodePixel>(&self) -> Result<imgref::ImgRef<'_, P>, FlimError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Ok(imgref::ImgRef::new(
            pixels,
            self.width as usize,
            self.height as usize,
        ))
    }

    #[cfg(feature = "imgref")]
    pub fn to_imgvec<P: crate::DecodePixel>(&self) -> Result<imgref::ImgVec<P>, FlimError>
    where
        [u8]: rgb::AsPixels<P>,
    {
        let pixels: &[P] = self.as_pixels()?;
        Ok(imgref::ImgVec::new(
            pixels.to_vec(),
            self.width as usize,
            self.height as usize,
        ))
    }
}

/// Decode request for a FLIM buffer.
///
/// ```no_run
/// use zenflim::{DecodeRequest, Limits, Unstoppable};
///
/// let data: &[u8] = &[]; // FLIM bytes
/// let limits = Limits {
///     max_pixels: Some(16 * 1024 * 1024),
///     ..Default::default()
/// };
/// let image = DecodeRequest::new(data)
///     .with_limits(&limits)
///     .decode(Unstoppable)?;
/// assert_eq!(image.pixels().len(), image.width as usize * image.height as usize * 4);
/// # Ok::<(), zenflim::FlimError>(())
/// ```
#[derive(Clone, Copy, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    options: DecodeOptions<'a>,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            options: DecodeOptions::default(),
        }
    }

    /// Replace all options at once.
    pub fn with_options(mut self, options: DecodeOptions<'a>) -> Self {
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

    pub fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.options = self.options.with_fallback(fallback);
        self
    }

    pub fn with_alpha_convention(mut self, alpha: AlphaConvention) -> Self {
        self.options = self.options.with_alpha_convention(alpha);
        self
    }

    /// Parse, detile and decode to RGBA8.
    ///
    /// RGBA8 surfaces stored in linear general mode are returned borrowed
    /// from the input.
    pub fn decode(self, stop: impl Stop) -> Result<DecodeOutput<'a>, FlimError> {
        let (meta, payload) = container::parse(self.data)?;
        decode_rgba(&meta, payload, &self.options, &stop)
    }

    /// Parse, detile and decode a two-channel format (BC5, HILO8) to
    /// [`PixelLayout::Rg8`].
    pub fn decode_rg8(self, stop: impl Stop) -> Result<DecodeOutput<'static>, FlimError> {
        let (meta, payload) = container::parse(self.data)?;
        let (width, height) = (u32::from(meta.width), u32::from(meta.height));
        let surface = prepare(&meta, &self.options)?;
        let linear = surface.to_linear(payload, self.options.surface, &stop)?;
        let pixels = codec::decode_rg8(meta.format_id(), &linear, width, height, &self.options, &stop)?;
        Ok(DecodeOutput::owned(pixels, width, height, PixelLayout::Rg8))
    }
}

fn prepare(meta: &Metadata, options: &DecodeOptions<'_>) -> Result<TiledSurface, FlimError> {
    let surface = meta.surface()?;
    if let Some(limits) = options.limits {
        limits.check_dimensions(surface.width, surface.height)?;
        limits.check_allocation(surface.linear_size())?;
    }
    Ok(surface)
}

/// Borrow RGBA8 straight from a linear general payload.
fn zero_copy<'a>(meta: &Metadata, payload: &'a [u8]) -> Option<&'a [u8]> {
    let rgba8 = matches!(
        meta.format.format,
        TextureFormat::Rgba8 | TextureFormat::Rgba8Srgb
    );
    if !rgba8 || meta.tile_mode().ok()? != TileMode::LinearGeneral {
        return None;
    }
    let needed = usize::from(meta.width) * usize::from(meta.height) * 4;
    payload.get(..needed)
}

pub(crate) fn decode_rgba<'a>(
    meta: &Metadata,
    payload: &'a [u8],
    options: &DecodeOptions<'_>,
    stop: &dyn Stop,
) -> Result<DecodeOutput<'a>, FlimError> {
    let (width, height) = (u32::from(meta.width), u32::from(meta.height));
    log::debug!(
        "decoding {width}x{height} {} tile byte 0x{:02x}",
        meta.format.name,
        meta.tile_byte
    );

    let surface = match prepare(meta, options) {
        Ok(surface) => surface,
        Err(FlimError::UnknownTileMode(bits)) if options.fallback == Fallback::Placeholder => {
            if let Some(limits) = options.limits {
                limits.check_rgba_output(width, height)?;
            }
            log::warn!("tile mode {bits} unknown, substituting {width}x{height} placeholder");
            return Ok(DecodeOutput::owned(
                codec::placeholder(width, height),
                width,
                height,
                PixelLayout::Rgba8,
            ));
        }
        Err(e) => return Err(e),
    };
    stop.check()?;

    if let Some(pixels) = zero_copy(meta, payload) {
        if let Some(limits) = options.limits {
            limits.check_rgba_output(width, height)?;
        }
        return Ok(DecodeOutput::borrowed(pixels, width, height, PixelLayout::Rgba8));
    }

    let linear = surface.to_linear(payload, options.surface, stop)?;
    let pixels = codec::decode(meta.format_id(), &linear, width, height, options, stop)?;
    Ok(DecodeOutput::owned(pixels, width, height, PixelLayout::Rgba8))
}
