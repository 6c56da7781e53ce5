//! TIFF format support.
//!
//! Reads and writes baseline TIFF through the `tiff` crate.
//!
//! | Layout | Read | Write |
//! |--------|------|-------|
//! | L8, L16 | Yes | Yes |
//! | La8, La16 | Yes | No |
//! | Rgb8, Rgb16, Rgb32F | Yes | Yes |
//! | Rgba8, Rgba16, Rgba32F | Yes | Yes |
//!
//! The `tiff` encoder has no grey+alpha color type, so luma-alpha buffers
//! fail with [`ErrorKind::UnsupportedColor`](dynimg_core::ErrorKind::UnsupportedColor).

use std::io::{Cursor, Seek, Write};

use dynimg_core::{ColorModel, Error, ImageFormat, LimitKind, Limits, PixelBuffer, Result};
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::{ColorType, TiffError};
use tracing::trace;

const FORMAT: Option<ImageFormat> = Some(ImageFormat::Tiff);

fn decoding_error(err: TiffError) -> Error {
    match err {
        TiffError::LimitsExceeded => Error::limits(LimitKind::InsufficientMemory, "TIFF decoder limits exceeded"),
        other => Error::decoding(FORMAT, other.to_string()),
    }
}

fn encoding_error(err: TiffError) -> Error {
    match err {
        TiffError::IoError(e) => Error::Io(e),
        other => Error::encoding(FORMAT, other.to_string()),
    }
}

/// Decodes the first image of a TIFF file in memory.
pub fn decode(bytes: &[u8], limits: &Limits) -> Result<PixelBuffer> {
    let mut tiff_limits = tiff::decoder::Limits::default();
    if let Some(max) = limits.max_alloc {
        tiff_limits.decoding_buffer_size = usize::try_from(max).unwrap_or(usize::MAX);
    }
    let mut decoder = Decoder::new(Cursor::new(bytes))
        .map_err(decoding_error)?
        .with_limits(tiff_limits);

    let (width, height) = decoder.dimensions().map_err(decoding_error)?;
    let color = decoder.colortype().map_err(decoding_error)?;
    let model = match color {
        ColorType::Gray(8) => ColorModel::L8,
        ColorType::GrayA(8) => ColorModel::La8,
        ColorType::RGB(8) => ColorModel::Rgb8,
        ColorType::RGBA(8) => ColorModel::Rgba8,
        ColorType::Gray(16) => ColorModel::L16,
        ColorType::GrayA(16) => ColorModel::La16,
        ColorType::RGB(16) => ColorModel::Rgb16,
        ColorType::RGBA(16) => ColorModel::Rgba16,
        ColorType::RGB(32) => ColorModel::Rgb32F,
        ColorType::RGBA(32) => ColorModel::Rgba32F,
        other => return Err(Error::Unsupported(format!("TIFF color type {other:?}"))),
    };
    limits.check_image(width, height, model.bytes_per_pixel())?;
    trace!(width, height, ?color, layout = %model, "tiff image");

    let buffer = match (model.bytes_per_sample(), decoder.read_image().map_err(decoding_error)?) {
        (1, DecodingResult::U8(data)) => PixelBuffer::from_raw_u8(width, height, model, data),
        (2, DecodingResult::U16(data)) => PixelBuffer::from_raw_u16(width, height, model, data),
        (4, DecodingResult::F32(data)) => PixelBuffer::from_raw_f32(width, height, model, data),
        _ => {
            return Err(Error::Unsupported(format!("TIFF sample format for {color:?}")));
        }
    };
    buffer.map_err(|e| Error::decoding(FORMAT, e.to_string()))
}

/// Encodes `buffer` as an uncompressed TIFF into `writer`.
pub fn encode<W: Write + Seek>(buffer: &PixelBuffer, writer: W) -> Result<()> {
    let (width, height) = buffer.dimensions();
    let mut encoder = TiffEncoder::new(writer).map_err(encoding_error)?;
    match buffer {
        PixelBuffer::L8(b) => encoder.write_image::<colortype::Gray8>(width, height, b.as_slice()),
        PixelBuffer::Rgb8(b) => encoder.write_image::<colortype::RGB8>(width, height, b.as_slice()),
        PixelBuffer::Rgba8(b) => encoder.write_image::<colortype::RGBA8>(width, height, b.as_slice()),
        PixelBuffer::L16(b) => encoder.write_image::<colortype::Gray16>(width, height, b.as_slice()),
        PixelBuffer::Rgb16(b) => encoder.write_image::<colortype::RGB16>(width, height, b.as_slice()),
        PixelBuffer::Rgba16(b) => encoder.write_image::<colortype::RGBA16>(width, height, b.as_slice()),
        PixelBuffer::Rgb32F(b) => encoder.write_image::<colortype::RGB32Float>(width, height, b.as_slice()),
        PixelBuffer::Rgba32F(b) => encoder.write_image::<colortype::RGBA32Float>(width, height, b.as_slice()),
        PixelBuffer::La8(_) | PixelBuffer::La16(_) => {
            return Err(Error::unsupported_color(FORMAT, buffer.color_model()));
        }
    }
    .map_err(encoding_error)
}
