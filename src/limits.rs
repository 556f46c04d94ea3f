use crate::error::FlimError;

/// Resource limits for decode/encode operations.
///
/// All fields default to `None` (no limit). FLIM dimensions are 16-bit, so
/// the defaults are already bounded at 65535x65535; limits exist for callers
/// that batch-convert untrusted files and want a tighter ceiling.
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u32>,
    pub max_height: Option<u32>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum bytes for any single buffer the codec allocates
    /// (detiled payload, RGBA output, re-encoded payload).
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Reject dimensions outside the configured ceilings.
    pub(crate) fn check_dimensions(&self, width: u32, height: u32) -> Result<(), FlimError> {
        if let Some(max_w) = self.max_width {
            if width > max_w {
                return Err(FlimError::LimitExceeded(alloc::format!(
                    "width {width} exceeds limit {max_w}"
                )));
            }
        }
        if let Some(max_h) = self.max_height {
            if height > max_h {
                return Err(FlimError::LimitExceeded(alloc::format!(
                    "height {height} exceeds limit {max_h}"
                )));
            }
        }
        if let Some(max_px) = self.max_pixels {
            let pixels = u64::from(width) * u64::from(height);
            if pixels > max_px {
                return Err(FlimError::LimitExceeded(alloc::format!(
                    "pixel count {pixels} exceeds limit {max_px}"
                )));
            }
        }
        Ok(())
    }

    /// Reject an allocation larger than `max_memory_bytes`.
    pub(crate) fn check_allocation(&self, bytes: usize) -> Result<(), FlimError> {
        match self.max_memory_bytes {
            Some(max) if bytes as u64 > max => Err(FlimError::LimitExceeded(alloc::format!(
                "allocation of {bytes} bytes exceeds memory limit {max}"
            ))),
            _ => Ok(()),
        }
    }

    /// Dimension check plus the RGBA8 output allocation for an image.
    pub(crate) fn check_rgba_output(&self, width: u32, height: u32) -> Result<(), FlimError> {
        self.check_dimensions(width, height)?;
        self.check_allocation(width as usize * height as usize * 4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_ceiling_is_enforced() {
        let limits = Limits {
            max_width: Some(100),
            max_height: Some(50),
            max_pixels: Some(1000),
            max_memory_bytes: Some(4000),
        };
        assert!(limits.check_dimensions(100, 10).is_ok());
        assert!(matches!(limits.check_dimensions(101, 1), Err(FlimError::LimitExceeded(_))));
        assert!(matches!(limits.check_dimensions(1, 51), Err(FlimError::LimitExceeded(_))));
        assert!(matches!(limits.check_dimensions(40, 40), Err(FlimError::LimitExceeded(_))));
        assert!(limits.check_rgba_output(20, 50).is_ok());
        assert!(matches!(limits.check_allocation(4001), Err(FlimError::LimitExceeded(_))));
    }

    #[test]
    fn default_is_unbounded() {
        let limits = Limits::default();
        assert!(limits.check_rgba_output(u32::from(u16::MAX), u32::from(u16::MAX)).is_ok());
    }
}
