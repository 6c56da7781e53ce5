//! Decode resource limits.
//!
//! Limits are passed explicitly to every decode call; there is no global
//! limit state.

use serde::{Deserialize, Serialize};

use crate::error::{Error, LimitKind, Result};

/// Default allocation cap: 512 MiB.
pub const DEFAULT_MAX_ALLOC: u64 = 512 * 1024 * 1024;

/// Resource caps applied while decoding.
///
/// `None` means unlimited for that axis.
///
/// ```
/// use dynimg_core::Limits;
///
/// let limits = Limits { max_image_width: Some(64), ..Limits::default() };
/// assert!(limits.check_dimensions(64, 4096).is_ok());
/// assert!(limits.check_dimensions(65, 1).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum decoded width in pixels.
    pub max_image_width: Option<u32>,
    /// Maximum decoded height in pixels.
    pub max_image_height: Option<u32>,
    /// Maximum bytes a single decode may allocate.
    pub max_alloc: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_image_width: None,
            max_image_height: None,
            max_alloc: Some(DEFAULT_MAX_ALLOC),
        }
    }
}

impl Limits {
    /// Limits with every cap removed.
    pub const fn no_limits() -> Self {
        Self {
            max_image_width: None,
            max_image_height: None,
            max_alloc: None,
        }
    }

    /// Fails with [`LimitKind::Dimensions`] if either axis is over its cap.
    pub fn check_dimensions(&self, width: u32, height: u32) -> Result<()> {
        if let Some(max) = self.max_image_width {
            if width > max {
                return Err(Error::limits(
                    LimitKind::Dimensions,
                    format!("image width {width} exceeds limit {max}"),
                ));
            }
        }
        if let Some(max) = self.max_image_height {
            if height > max {
                return Err(Error::limits(
                    LimitKind::Dimensions,
                    format!("image height {height} exceeds limit {max}"),
                ));
            }
        }
        Ok(())
    }

    /// Fails with [`LimitKind::InsufficientMemory`] if `bytes` is over the cap.
    pub fn check_alloc(&self, bytes: u64) -> Result<()> {
        match self.max_alloc {
            Some(max) if bytes > max => Err(Error::limits(
                LimitKind::InsufficientMemory,
                format!("allocation of {bytes} bytes exceeds limit {max}"),
            )),
            _ => Ok(()),
        }
    }

    /// Checks dimensions, then the buffer size for `bytes_per_pixel`.
    pub fn check_image(&self, width: u32, height: u32, bytes_per_pixel: u8) -> Result<()> {
        self.check_dimensions(width, height)?;
        let bytes = (width as u64)
            .saturating_mul(height as u64)
            .saturating_mul(bytes_per_pixel as u64);
        self.check_alloc(bytes)
    }
}
