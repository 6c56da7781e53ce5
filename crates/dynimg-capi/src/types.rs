//! Plain C mirrors of the engine's value types.

use dynimg::{ColorModel, ExtendedColorType, FilterKind, ImageFormat, Limits, Rgba};

/// Pixel layout.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DynimgColorModel {
    L8 = 0,
    La8,
    Rgb8,
    Rgba8,
    L16,
    La16,
    Rgb16,
    Rgba16,
    Rgb32F,
    Rgba32F,
}

impl From<DynimgColorModel> for ColorModel {
    fn from(model: DynimgColorModel) -> Self {
        match model {
            DynimgColorModel::L8 => Self::L8,
            DynimgColorModel::La8 => Self::La8,
            DynimgColorModel::Rgb8 => Self::Rgb8,
            DynimgColorModel::Rgba8 => Self::Rgba8,
            DynimgColorModel::L16 => Self::L16,
            DynimgColorModel::La16 => Self::La16,
            DynimgColorModel::Rgb16 => Self::Rgb16,
            DynimgColorModel::Rgba16 => Self::Rgba16,
            DynimgColorModel::Rgb32F => Self::Rgb32F,
            DynimgColorModel::Rgba32F => Self::Rgba32F,
        }
    }
}

impl From<ColorModel> for DynimgColorModel {
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

impl TryFrom<ExtendedColorType> for DynimgColorModel {
    type Error = ExtendedColorType;

    fn try_from(color: ExtendedColorType) -> Result<Self, Self::Error> {
        Ok(match color {
            ExtendedColorType::L8 => Self::L8,
            ExtendedColorType::La8 => Self::La8,
            ExtendedColorType::Rgb8 => Self::Rgb8,
            ExtendedColorType::Rgba8 => Self::Rgba8,
            ExtendedColorType::L16 => Self::L16,
            ExtendedColorType::La16 => Self::La16,
            ExtendedColorType::Rgb16 => Self::Rgb16,
            ExtendedColorType::Rgba16 => Self::Rgba16,
            ExtendedColorType::Rgb32F => Self::Rgb32F,
            ExtendedColorType::Rgba32F => Self::Rgba32F,
            other => return Err(other),
        })
    }
}

/// Container format.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DynimgFormat {
    Png = 0,
    Jpeg,
    Gif,
    WebP,
    Pnm,
    Tiff,
    Tga,
    Dds,
    Bmp,
    Ico,
    Hdr,
    OpenExr,
    Farbfeld,
    Avif,
    Qoi,
}

impl From<DynimgFormat> for ImageFormat {
    fn from(format: DynimgFormat) -> Self {
        match format {
            DynimgFormat::Png => Self::Png,
            DynimgFormat::Jpeg => Self::Jpeg,
            DynimgFormat::Gif => Self::Gif,
            DynimgFormat::WebP => Self::WebP,
            DynimgFormat::Pnm => Self::Pnm,
            DynimgFormat::Tiff => Self::Tiff,
            DynimgFormat::Tga => Self::Tga,
            DynimgFormat::Dds => Self::Dds,
            DynimgFormat::Bmp => Self::Bmp,
            DynimgFormat::Ico => Self::Ico,
            DynimgFormat::Hdr => Self::Hdr,
            DynimgFormat::OpenExr => Self::OpenExr,
            DynimgFormat::Farbfeld => Self::Farbfeld,
            DynimgFormat::Avif => Self::Avif,
            DynimgFormat::Qoi => Self::Qoi,
        }
    }
}

/// Resampling filter.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum DynimgFilter {
    Nearest = 0,
    Triangle,
    CatmullRom,
    Gaussian,
    Lanczos3,
}

impl From<DynimgFilter> for FilterKind {
    fn from(filter: DynimgFilter) -> Self {
        match filter {
            DynimgFilter::Nearest => Self::Nearest,
            DynimgFilter::Triangle => Self::Triangle,
            DynimgFilter::CatmullRom => Self::CatmullRom,
            DynimgFilter::Gaussian => Self::Gaussian,
            DynimgFilter::Lanczos3 => Self::Lanczos3,
        }
    }
}

/// 8-bit RGBA pixel.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct DynimgRgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl From<Rgba> for DynimgRgba {
    fn from(px: Rgba) -> Self {
        let [r, g, b, a] = px.channels();
        Self { r, g, b, a }
    }
}

impl From<DynimgRgba> for Rgba {
    fn from(DynimgRgba { r, g, b, a }: DynimgRgba) -> Self {
        Rgba::new(r, g, b, a)
    }
}

/// Width and height.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[allow(missing_docs)]
pub struct DynimgDimensions {
    pub width: u32,
    pub height: u32,
}

/// Decode limits. A zero field means "no limit" for that field.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DynimgLimits {
    /// Maximum width in pixels.
    pub max_image_width: u32,
    /// Maximum height in pixels.
    pub max_image_height: u32,
    /// Maximum bytes one decode may allocate.
    pub max_alloc: u64,
}

impl From<DynimgLimits> for Limits {
    fn from(limits: DynimgLimits) -> Self {
        let nonzero32 = |v: u32| (v != 0).then_some(v);
        Self {
            max_image_width: nonzero32(limits.max_image_width),
            max_image_height: nonzero32(limits.max_image_height),
            max_alloc: (limits.max_alloc != 0).then_some(limits.max_alloc),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_model_bijection() {
        let all = [
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
        for model in all {
            assert_eq!(ColorModel::from(DynimgColorModel::from(model)), model);
            assert_eq!(DynimgColorModel::try_from(ExtendedColorType::from(model)), Ok(model.into()));
        }
        assert_eq!(
            DynimgColorModel::try_from(ExtendedColorType::Cmyk8),
            Err(ExtendedColorType::Cmyk8)
        );
    }

    #[test]
    fn test_format_order_matches_engine() {
        assert_eq!(ImageFormat::from(DynimgFormat::Png), ImageFormat::ALL[0]);
        assert_eq!(ImageFormat::from(DynimgFormat::Qoi), ImageFormat::ALL[14]);
        assert_eq!(ImageFormat::from(DynimgFormat::Farbfeld), ImageFormat::ALL[12]);
    }

    #[test]
    fn test_zero_limits_mean_unlimited() {
        let limits = Limits::from(DynimgLimits::default());
        assert_eq!(limits, Limits::no_limits());
        let limits = Limits::from(DynimgLimits { max_image_width: 5, ..Default::default() });
        assert_eq!(limits.max_image_width, Some(5));
        assert_eq!(limits.max_alloc, None);
    }
}
