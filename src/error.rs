use alloc::string::String;
use enough::StopReason;

/// Errors from FLIM parsing, transcoding, decoding and encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum FlimError {
    #[error("input too short: {len} bytes, need at least 20")]
    TooShort { len: usize },

    #[error("no `imag` metadata block in the trailing bytes")]
    MissingMagic,

    #[error("unsupported texture format id 0x{0:02x}")]
    UnsupportedFormat(u8),

    #[error("unknown tile mode {0}")]
    UnknownTileMode(u8),

    #[error("image data truncated: header declares {declared} bytes, {available} available")]
    TruncatedPayload { declared: usize, available: usize },

    #[error("encoding not implemented for format id 0x{0:02x}")]
    EncodingNotImplemented(u8),

    #[error("encoded payload is {encoded} bytes, original region holds {available}")]
    SizeMismatch { encoded: usize, available: usize },

    #[error("tile mode {0} is not a tiled encode target")]
    NotTiled(u8),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("pixel layout mismatch: expected {expected:?}, got {actual:?}")]
    LayoutMismatch {
        expected: crate::PixelLayout,
        actual: crate::PixelLayout,
    },

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("surface layout: {0}")]
    SurfaceLayout(String),

    #[error("block codec: {0}")]
    BlockCodec(String),

    #[error("operation cancelled")]
    Cancelled(StopReason),
}

impl From<StopReason> for FlimError {
    fn from(r: StopReason) -> Self {
        FlimError::Cancelled(r)
    }
}
