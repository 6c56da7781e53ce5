//! Pixel layouts.
//!
//! [`ColorModel`] is the closed set of layouts a decoded image can live in.
//! [`ExtendedColorType`] adds packed, sub-byte and byte-order variants that a
//! codec may want to see at the encode boundary; it is never an in-memory
//! layout.

use std::fmt;

/// In-memory pixel layout: sample depth times channel set.
///
/// | Variant | Channels | Sample |
/// |---------|----------|--------|
/// | `L8` / `La8` / `Rgb8` / `Rgba8` | 1 / 2 / 3 / 4 | `u8` |
/// | `L16` / `La16` / `Rgb16` / `Rgba16` | 1 / 2 / 3 / 4 | `u16` |
/// | `Rgb32F` / `Rgba32F` | 3 / 4 | `f32` |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorModel {
    /// 8-bit luma.
    L8,
    /// 8-bit luma with alpha.
    La8,
    /// 8-bit RGB.
    Rgb8,
    /// 8-bit RGB with alpha.
    Rgba8,
    /// 16-bit luma.
    L16,
    /// 16-bit luma with alpha.
    La16,
    /// 16-bit RGB.
    Rgb16,
    /// 16-bit RGB with alpha.
    Rgba16,
    /// 32-bit float RGB.
    Rgb32F,
    /// 32-bit float RGB with alpha.
    Rgba32F,
}

impl ColorModel {
    /// All ten layouts, in declaration order.
    pub const ALL: [ColorModel; 10] = [
        ColorModel::L8,
        ColorModel::La8,
        ColorModel::Rgb8,
        ColorModel::Rgba8,
        ColorModel::L16,
        ColorModel::La16,
        ColorModel::Rgb16,
        ColorModel::Rgba16,
        ColorModel::Rgb32F,
        ColorModel::Rgba32F,
    ];

    /// Number of channels per pixel.
    #[inline]
    pub const fn channel_count(self) -> u8 {
        match self {
            Self::L8 | Self::L16 => 1,
            Self::La8 | Self::La16 => 2,
            Self::Rgb8 | Self::Rgb16 | Self::Rgb32F => 3,
            Self::Rgba8 | Self::Rgba16 | Self::Rgba32F => 4,
        }
    }

    /// Returns `true` if the last channel is alpha.
    #[inline]
    pub const fn has_alpha(self) -> bool {
        matches!(
            self,
            Self::La8 | Self::Rgba8 | Self::La16 | Self::Rgba16 | Self::Rgba32F
        )
    }

    /// Returns `true` for RGB layouts.
    #[inline]
    pub const fn has_color(self) -> bool {
        matches!(
            self,
            Self::Rgb8 | Self::Rgba8 | Self::Rgb16 | Self::Rgba16 | Self::Rgb32F | Self::Rgba32F
        )
    }

    /// Returns `true` for floating-point layouts.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Rgb32F | Self::Rgba32F)
    }

    /// Bytes per sample (1, 2 or 4).
    #[inline]
    pub const fn bytes_per_sample(self) -> u8 {
        match self {
            Self::L8 | Self::La8 | Self::Rgb8 | Self::Rgba8 => 1,
            Self::L16 | Self::La16 | Self::Rgb16 | Self::Rgba16 => 2,
            Self::Rgb32F | Self::Rgba32F => 4,
        }
    }

    /// Bytes per pixel.
    #[inline]
    pub const fn bytes_per_pixel(self) -> u8 {
        self.channel_count() * self.bytes_per_sample()
    }

    /// Bits per pixel.
    #[inline]
    pub const fn bits_per_pixel(self) -> u16 {
        self.bytes_per_pixel() as u16 * 8
    }
}

impl fmt::Display for ColorModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::L8 => "L8",
            Self::La8 => "LA8",
            Self::Rgb8 => "RGB8",
            Self::Rgba8 => "RGBA8",
            Self::L16 => "L16",
            Self::La16 => "LA16",
            Self::Rgb16 => "RGB16",
            Self::Rgba16 => "RGBA16",
            Self::Rgb32F => "RGB32F",
            Self::Rgba32F => "RGBA32F",
        };
        f.write_str(name)
    }
}

/// Color type tag handed to encoders.
///
/// A superset of [`ColorModel`]: also names alpha-only, sub-byte packed,
/// BGR byte order and CMYK layouts that some containers store natively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExtendedColorType {
    /// 8-bit alpha only.
    A8,
    /// 1-bit luma.
    L1,
    /// 1-bit luma with alpha.
    La1,
    /// 1-bit RGB.
    Rgb1,
    /// 1-bit RGBA.
    Rgba1,
    /// 2-bit luma.
    L2,
    /// 2-bit luma with alpha.
    La2,
    /// 2-bit RGB.
    Rgb2,
    /// 2-bit RGBA.
    Rgba2,
    /// 4-bit luma.
    L4,
    /// 4-bit luma with alpha.
    La4,
    /// 4-bit RGB.
    Rgb4,
    /// 4-bit RGBA.
    Rgba4,
    /// 8-bit luma.
    L8,
    /// 8-bit luma with alpha.
    La8,
    /// 8-bit RGB.
    Rgb8,
    /// 8-bit RGBA.
    Rgba8,
    /// 16-bit luma.
    L16,
    /// 16-bit luma with alpha.
    La16,
    /// 16-bit RGB.
    Rgb16,
    /// 16-bit RGBA.
    Rgba16,
    /// 8-bit BGR.
    Bgr8,
    /// 8-bit BGRA.
    Bgra8,
    /// 32-bit float RGB.
    Rgb32F,
    /// 32-bit float RGBA.
    Rgba32F,
    /// 8-bit CMYK.
    Cmyk8,
    /// Layout with the given bits per pixel that has no name here.
    Unknown(u8),
}

impl ExtendedColorType {
    /// Number of channels per pixel. `Unknown` reports 0.
    pub const fn channel_count(self) -> u8 {
        match self {
            Self::A8 | Self::L1 | Self::L2 | Self::L4 | Self::L8 | Self::L16 => 1,
            Self::La1 | Self::La2 | Self::La4 | Self::La8 | Self::La16 => 2,
            Self::Rgb1
            | Self::Rgb2
            | Self::Rgb4
            | Self::Rgb8
            | Self::Rgb16
            | Self::Bgr8
            | Self::Rgb32F => 3,
            Self::Rgba1
            | Self::Rgba2
            | Self::Rgba4
            | Self::Rgba8
            | Self::Rgba16
            | Self::Bgra8
            | Self::Rgba32F
            | Self::Cmyk8 => 4,
            Self::Unknown(_) => 0,
        }
    }

    /// Bits per pixel.
    pub const fn bits_per_pixel(self) -> u16 {
        let bits_per_channel: u16 = match self {
            Self::L1 | Self::La1 | Self::Rgb1 | Self::Rgba1 => 1,
            Self::L2 | Self::La2 | Self::Rgb2 | Self::Rgba2 => 2,
            Self::L4 | Self::La4 | Self::Rgb4 | Self::Rgba4 => 4,
            Self::A8
            | Self::L8
            | Self::La8
            | Self::Rgb8
            | Self::Rgba8
            | Self::Bgr8
            | Self::Bgra8
            | Self::Cmyk8 => 8,
            Self::L16 | Self::La16 | Self::Rgb16 | Self::Rgba16 => 16,
            Self::Rgb32F | Self::Rgba32F => 32,
            Self::Unknown(bpp) => return bpp as u16,
        };
        bits_per_channel * self.channel_count() as u16
    }

    /// Returns the in-memory layout with the same bytes, if there is one.
    pub const fn color_model(self) -> Option<ColorModel> {
        Some(match self {
            Self::L8 => ColorModel::L8,
            Self::La8 => ColorModel::La8,
            Self::Rgb8 => ColorModel::Rgb8,
            Self::Rgba8 => ColorModel::Rgba8,
            Self::L16 => ColorModel::L16,
            Self::La16 => ColorModel::La16,
            Self::Rgb16 => ColorModel::Rgb16,
            Self::Rgba16 => ColorModel::Rgba16,
            Self::Rgb32F => ColorModel::Rgb32F,
            Self::Rgba32F => ColorModel::Rgba32F,
            _ => return None,
        })
    }
}

impl From<ColorModel> for ExtendedColorType {
    fn from(model: ColorModel) -> Self {
        match model {
            ColorModel::L8 => Self::L8,
            ColorModel::La8 => Self::La8,
            ColorModel::Rgb8 => Self::Rgb8,
            ColorModel::Rgba8 => Self::Rgba8,
            ColorModel::L16 => Self::L16,
            ColorModel::La16 => Self::La16,
            ColorModel::Rgb16 => Self::Rgb16,
            ColorModel::Rgba16 => Self::Rgba16,
            ColorModel::Rgb32F => Self::Rgb32F,
            ColorModel::Rgba32F => Self::Rgba32F,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bytes_per_pixel() {
        assert_eq!(ColorModel::L8.bytes_per_pixel(), 1);
        assert_eq!(ColorModel::La16.bytes_per_pixel(), 4);
        assert_eq!(ColorModel::Rgb16.bytes_per_pixel(), 6);
        assert_eq!(ColorModel::Rgba32F.bytes_per_pixel(), 16);
        assert_eq!(ColorModel::Rgb32F.bits_per_pixel(), 96);
    }

    #[test]
    fn test_alpha_and_color() {
        assert!(ColorModel::La8.has_alpha());
        assert!(!ColorModel::La8.has_color());
        assert!(ColorModel::Rgba16.has_alpha());
        assert!(!ColorModel::Rgb32F.has_alpha());
        assert!(ColorModel::Rgb32F.is_float());
    }

    #[test]
    fn test_extended_roundtrip() {
        for model in ColorModel::ALL {
            let ext = ExtendedColorType::from(model);
            assert_eq!(ext.color_model(), Some(model));
            assert_eq!(ext.bits_per_pixel(), model.bits_per_pixel());
            assert_eq!(ext.channel_count(), model.channel_count());
        }
    }

    #[test]
    fn test_extended_only_variants() {
        assert_eq!(ExtendedColorType::L1.bits_per_pixel(), 1);
        assert_eq!(ExtendedColorType::Rgba4.bits_per_pixel(), 16);
        assert_eq!(ExtendedColorType::Bgra8.bits_per_pixel(), 32);
        assert_eq!(ExtendedColorType::Cmyk8.channel_count(), 4);
        assert_eq!(ExtendedColorType::Unknown(12).bits_per_pixel(), 12);
        assert_eq!(ExtendedColorType::Bgr8.color_model(), None);
    }
}
