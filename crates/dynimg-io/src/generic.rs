//! Bridge to the `image` crate for the remaining containers.
//!
//! GIF, WebP, PNM, TGA, DDS, BMP, ICO, OpenEXR, farbfeld, QOI and AVIF
//! (write only) go through here. Limits are forwarded to the `image`
//! decoders and `image` errors are mapped onto the dynimg taxonomy.

use std::io::{Cursor, Seek, Write};

use dynimg_core::{
    ColorModel, Error, ExtendedColorType, ImageFormat, LimitKind, Limits, ParameterKind, PixelBuffer, Result,
};
use image::error::{ImageFormatHint, LimitErrorKind, ParameterErrorKind, UnsupportedErrorKind};
use image::{DynamicImage, ImageError, ImageReader};
use tracing::trace;

fn to_image_format(format: ImageFormat) -> image::ImageFormat {
    match format {
        ImageFormat::Png => image::ImageFormat::Png,
        ImageFormat::Jpeg => image::ImageFormat::Jpeg,
        ImageFormat::Gif => image::ImageFormat::Gif,
        ImageFormat::WebP => image::ImageFormat::WebP,
        ImageFormat::Pnm => image::ImageFormat::Pnm,
        ImageFormat::Tiff => image::ImageFormat::Tiff,
        ImageFormat::Tga => image::ImageFormat::Tga,
        ImageFormat::Dds => image::ImageFormat::Dds,
        ImageFormat::Bmp => image::ImageFormat::Bmp,
        ImageFormat::Ico => image::ImageFormat::Ico,
        ImageFormat::Hdr => image::ImageFormat::Hdr,
        ImageFormat::OpenExr => image::ImageFormat::OpenExr,
        ImageFormat::Farbfeld => image::ImageFormat::Farbfeld,
        ImageFormat::Avif => image::ImageFormat::Avif,
        ImageFormat::Qoi => image::ImageFormat::Qoi,
    }
}

fn from_image_format(format: image::ImageFormat) -> Option<ImageFormat> {
    ImageFormat::ALL.into_iter().find(|f| to_image_format(*f) == format)
}

fn to_image_color(model: ColorModel) -> image::ExtendedColorType {
    match model {
        ColorModel::L8 => image::ExtendedColorType::L8,
        ColorModel::La8 => image::ExtendedColorType::La8,
        ColorModel::Rgb8 => image::ExtendedColorType::Rgb8,
        ColorModel::Rgba8 => image::ExtendedColorType::Rgba8,
        ColorModel::L16 => image::ExtendedColorType::L16,
        ColorModel::La16 => image::ExtendedColorType::La16,
        ColorModel::Rgb16 => image::ExtendedColorType::Rgb16,
        ColorModel::Rgba16 => image::ExtendedColorType::Rgba16,
        ColorModel::Rgb32F => image::ExtendedColorType::Rgb32F,
        ColorModel::Rgba32F => image::ExtendedColorType::Rgba32F,
    }
}

fn from_image_color(color: image::ExtendedColorType) -> ExtendedColorType {
    use image::ExtendedColorType as C;
    match color {
        C::A8 => ExtendedColorType::A8,
        C::L1 => ExtendedColorType::L1,
        C::La1 => ExtendedColorType::La1,
        C::Rgb1 => ExtendedColorType::Rgb1,
        C::Rgba1 => ExtendedColorType::Rgba1,
        C::L2 => ExtendedColorType::L2,
        C::La2 => ExtendedColorType::La2,
        C::Rgb2 => ExtendedColorType::Rgb2,
        C::Rgba2 => ExtendedColorType::Rgba2,
        C::L4 => ExtendedColorType::L4,
        C::La4 => ExtendedColorType::La4,
        C::Rgb4 => ExtendedColorType::Rgb4,
        C::Rgba4 => ExtendedColorType::Rgba4,
        C::L8 => ExtendedColorType::L8,
        C::La8 => ExtendedColorType::La8,
        C::Rgb8 => ExtendedColorType::Rgb8,
        C::Rgba8 => ExtendedColorType::Rgba8,
        C::L16 => ExtendedColorType::L16,
        C::La16 => ExtendedColorType::La16,
        C::Rgb16 => ExtendedColorType::Rgb16,
        C::Rgba16 => ExtendedColorType::Rgba16,
        C::Bgr8 => ExtendedColorType::Bgr8,
        C::Bgra8 => ExtendedColorType::Bgra8,
        C::Rgb32F => ExtendedColorType::Rgb32F,
        C::Rgba32F => ExtendedColorType::Rgba32F,
        C::Cmyk8 => ExtendedColorType::Cmyk8,
        C::Unknown(bits) => ExtendedColorType::Unknown(bits),
        other => ExtendedColorType::Unknown(other.bits_per_pixel().min(255) as u8),
    }
}

fn to_image_limits(limits: &Limits) -> image::Limits {
    let mut out = image::Limits::no_limits();
    out.max_image_width = limits.max_image_width;
    out.max_image_height = limits.max_image_height;
    out.max_alloc = limits.max_alloc;
    out
}

fn hint_format(hint: ImageFormatHint) -> Option<ImageFormat> {
    match hint {
        ImageFormatHint::Exact(format) => from_image_format(format),
        _ => None,
    }
}

/// Maps an `image` error onto [`Error`], keeping its category.
pub(crate) fn map_image_error(err: ImageError) -> Error {
    match err {
        ImageError::Decoding(e) => Error::decoding(hint_format(e.format_hint()), e.to_string()),
        ImageError::Encoding(e) => Error::encoding(hint_format(e.format_hint()), e.to_string()),
        ImageError::Parameter(e) => {
            let kind = match e.kind() {
                ParameterErrorKind::DimensionMismatch => ParameterKind::DimensionMismatch,
                ParameterErrorKind::FailedAlready => ParameterKind::FailedAlready,
                ParameterErrorKind::NoMoreData => ParameterKind::NoMoreData,
                _ => ParameterKind::Malformed,
            };
            Error::parameter(kind, e.to_string())
        }
        ImageError::Limits(e) => {
            let kind = match e.kind() {
                LimitErrorKind::DimensionError => LimitKind::Dimensions,
                LimitErrorKind::InsufficientMemory => LimitKind::InsufficientMemory,
                _ => LimitKind::Unsupported,
            };
            Error::limits(kind, e.to_string())
        }
        ImageError::Unsupported(e) => match e.kind() {
            UnsupportedErrorKind::Color(color) => {
                Error::unsupported_color(hint_format(e.format_hint()), from_image_color(color))
            }
            UnsupportedErrorKind::Format(hint) => Error::unsupported_format(hint.to_string()),
            _ => Error::Unsupported(e.to_string()),
        },
        ImageError::IoError(e) => Error::Io(e),
    }
}

fn from_dynamic(img: DynamicImage) -> Result<PixelBuffer> {
    let (width, height) = (img.width(), img.height());
    match img {
        DynamicImage::ImageLuma8(b) => PixelBuffer::from_raw_u8(width, height, ColorModel::L8, b.into_raw()),
        DynamicImage::ImageLumaA8(b) => PixelBuffer::from_raw_u8(width, height, ColorModel::La8, b.into_raw()),
        DynamicImage::ImageRgb8(b) => PixelBuffer::from_raw_u8(width, height, ColorModel::Rgb8, b.into_raw()),
        DynamicImage::ImageRgba8(b) => PixelBuffer::from_raw_u8(width, height, ColorModel::Rgba8, b.into_raw()),
        DynamicImage::ImageLuma16(b) => PixelBuffer::from_raw_u16(width, height, ColorModel::L16, b.into_raw()),
        DynamicImage::ImageLumaA16(b) => PixelBuffer::from_raw_u16(width, height, ColorModel::La16, b.into_raw()),
        DynamicImage::ImageRgb16(b) => PixelBuffer::from_raw_u16(width, height, ColorModel::Rgb16, b.into_raw()),
        DynamicImage::ImageRgba16(b) => PixelBuffer::from_raw_u16(width, height, ColorModel::Rgba16, b.into_raw()),
        DynamicImage::ImageRgb32F(b) => PixelBuffer::from_raw_f32(width, height, ColorModel::Rgb32F, b.into_raw()),
        DynamicImage::ImageRgba32F(b) => {
            PixelBuffer::from_raw_f32(width, height, ColorModel::Rgba32F, b.into_raw())
        }
        other => PixelBuffer::from_raw_f32(width, height, ColorModel::Rgba32F, other.into_rgba32f().into_raw()),
    }
}

/// Decodes `bytes` as `format` through the `image` crate.
pub(crate) fn decode(bytes: &[u8], format: ImageFormat, limits: &Limits) -> Result<PixelBuffer> {
    let mut reader = ImageReader::with_format(Cursor::new(bytes), to_image_format(format));
    reader.limits(to_image_limits(limits));
    // A short read from memory is a truncated stream.
    let img = reader.decode().map_err(|e| match e {
        ImageError::IoError(io) => Error::decoding(Some(format), io.to_string()),
        other => map_image_error(other),
    })?;
    trace!(%format, width = img.width(), height = img.height(), color = ?img.color(), "image decode");
    from_dynamic(img)
}

/// Encodes `buffer` as `format` through the `image` crate.
pub(crate) fn encode<W: Write + Seek>(buffer: &PixelBuffer, writer: &mut W, format: ImageFormat) -> Result<()> {
    let (width, height) = buffer.dimensions();
    trace!(%format, width, height, "image encode");
    image::write_buffer_with_format(
        writer,
        buffer.as_bytes(),
        width,
        height,
        to_image_color(buffer.color_model()),
        to_image_format(format),
    )
    .map_err(map_image_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dynimg_core::ErrorKind;
    use dynimg_core::IoKind;
    use image::error::{DecodingError, LimitError, UnsupportedError};

    #[test]
    fn test_format_mapping_is_bijective() {
        for format in ImageFormat::ALL {
            assert_eq!(from_image_format(to_image_format(format)), Some(format));
        }
    }

    #[test]
    fn test_error_categories() {
        let err = map_image_error(ImageError::Decoding(DecodingError::new(
            ImageFormatHint::Exact(image::ImageFormat::Gif),
            "bad frame",
        )));
        assert_eq!(err.kind(), ErrorKind::Decoding);
        assert!(err.to_string().starts_with("GIF"));

        let err = map_image_error(ImageError::Limits(LimitError::from_kind(LimitErrorKind::DimensionError)));
        assert_eq!(err.kind(), ErrorKind::DimensionError);

        let err = map_image_error(ImageError::Limits(LimitError::from_kind(
            LimitErrorKind::InsufficientMemory,
        )));
        assert_eq!(err.kind(), ErrorKind::InsufficientMemory);

        let err = map_image_error(ImageError::Unsupported(UnsupportedError::from_format_and_kind(
            ImageFormatHint::Exact(image::ImageFormat::Bmp),
            UnsupportedErrorKind::Color(image::ExtendedColorType::Rgb16),
        )));
        assert_eq!(err.kind(), ErrorKind::UnsupportedColor);

        let err = map_image_error(ImageError::IoError(std::io::ErrorKind::BrokenPipe.into()));
        assert_eq!(err.kind(), ErrorKind::Io(IoKind::BrokenPipe));
    }

    #[test]
    fn test_bmp_rejects_sixteen_bit() {
        let buf = PixelBuffer::new(2, 2, ColorModel::Rgb16);
        let mut sink = Cursor::new(Vec::new());
        let err = encode(&buf, &mut sink, ImageFormat::Bmp).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedColor);
    }

    #[test]
    fn test_webp_lossless_roundtrip() {
        let data: Vec<u8> = (0..6 * 4 * 4).map(|i| (i * 5 % 256) as u8).collect();
        let buf = PixelBuffer::from_raw_u8(6, 4, ColorModel::Rgba8, data).unwrap();
        let mut sink = Cursor::new(Vec::new());
        encode(&buf, &mut sink, ImageFormat::WebP).unwrap();
        let back = decode(sink.get_ref(), ImageFormat::WebP, &Limits::default()).unwrap();
        assert_eq!(back, buf);
    }

    #[test]
    fn test_openexr_float_roundtrip() {
        let data = vec![0.0f32, 0.5, 2.0, -1.0, 1.0e3, 0.125];
        let buf = PixelBuffer::from_raw_f32(2, 1, ColorModel::Rgb32F, data).unwrap();
        let mut sink = Cursor::new(Vec::new());
        encode(&buf, &mut sink, ImageFormat::OpenExr).unwrap();
        let back = decode(sink.get_ref(), ImageFormat::OpenExr, &Limits::default()).unwrap();
        assert_eq!(back.dimensions(), (2, 1));
        assert!(back.color_model().is_float());
    }

    #[test]
    fn test_truncated_stream_is_decoding_error() {
        let data: Vec<u8> = (0..8 * 8 * 3).map(|i| (i * 3 % 256) as u8).collect();
        let buf = PixelBuffer::from_raw_u8(8, 8, ColorModel::Rgb8, data).unwrap();
        for format in [ImageFormat::Bmp, ImageFormat::Pnm] {
            let mut sink = Cursor::new(Vec::new());
            encode(&buf, &mut sink, format).unwrap();
            let bytes = sink.into_inner();
            let err = decode(&bytes[..bytes.len() / 2], format, &Limits::default()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Decoding, "{format}");
        }
    }
}
