//! JPEG format support.
//!
//! Decoding uses `jpeg-decoder`, encoding uses `jpeg-encoder`.
//!
//! | Stored as | Decoded to |
//! |-----------|------------|
//! | 8-bit grey | `L8` |
//! | 16-bit grey (lossless) | `L16` |
//! | YCbCr / RGB | `Rgb8` |
//! | CMYK / YCCK | `Rgb8` |
//!
//! Writing accepts `L8`, `Rgb8` and `Rgba8`; alpha is dropped because JPEG
//! cannot store it. Every other layout fails with
//! [`ErrorKind::UnsupportedColor`](dynimg_core::ErrorKind::UnsupportedColor).

use std::io::{Cursor, Write};

use dynimg_core::{ColorModel, Error, ImageFormat, Limits, PixelBuffer, Result};
use jpeg_decoder::PixelFormat;
use jpeg_encoder::{ColorType as JpegColorType, Encoder};
use tracing::trace;

const FORMAT: Option<ImageFormat> = Some(ImageFormat::Jpeg);

fn decoding_error(err: jpeg_decoder::Error) -> Error {
    Error::decoding(FORMAT, err.to_string())
}

/// CMYK to RGB, as stored by Adobe applications.
fn cmyk_to_rgb(cmyk: &[u8]) -> Vec<u8> {
    cmyk.chunks_exact(4)
        .flat_map(|px| {
            let k = px[3] as f32 / 255.0;
            let ch = |c: u8| ((1.0 - c as f32 / 255.0) * (1.0 - k) * 255.0).round() as u8;
            [ch(px[0]), ch(px[1]), ch(px[2])]
        })
        .collect()
}

/// Decodes a JPEG from memory.
pub fn decode(bytes: &[u8], limits: &Limits) -> Result<PixelBuffer> {
    let mut decoder = jpeg_decoder::Decoder::new(Cursor::new(bytes));
    decoder.read_info().map_err(decoding_error)?;
    let info = decoder
        .info()
        .ok_or_else(|| Error::decoding(FORMAT, "missing JPEG frame header"))?;
    let width = info.width as u32;
    let height = info.height as u32;

    let model = match info.pixel_format {
        PixelFormat::L8 => ColorModel::L8,
        PixelFormat::L16 => ColorModel::L16,
        PixelFormat::RGB24 | PixelFormat::CMYK32 => ColorModel::Rgb8,
    };
    limits.check_image(width, height, model.bytes_per_pixel())?;
    if let Some(max) = limits.max_alloc {
        decoder.set_max_decoding_buffer_size(usize::try_from(max).unwrap_or(usize::MAX));
    }

    let pixels = decoder.decode().map_err(decoding_error)?;
    trace!(width, height, pixel_format = ?info.pixel_format, "jpeg frame");

    match info.pixel_format {
        PixelFormat::L8 | PixelFormat::RGB24 => PixelBuffer::from_raw_u8(width, height, model, pixels),
        PixelFormat::CMYK32 => PixelBuffer::from_raw_u8(width, height, model, cmyk_to_rgb(&pixels)),
        PixelFormat::L16 => {
            let samples = pixels
                .chunks_exact(2)
                .map(|b| u16::from_be_bytes([b[0], b[1]]))
                .collect();
            PixelBuffer::from_raw_u16(width, height, model, samples)
        }
    }
    .map_err(|e| Error::decoding(FORMAT, e.to_string()))
}

/// Encodes `buffer` as JPEG into `writer` at `quality` (1..=100).
pub fn encode<W: Write>(buffer: &PixelBuffer, writer: W, quality: u8) -> Result<()> {
    let color = match buffer.color_model() {
        ColorModel::L8 => JpegColorType::Luma,
        ColorModel::Rgb8 => JpegColorType::Rgb,
        ColorModel::Rgba8 => JpegColorType::Rgba,
        other => return Err(Error::unsupported_color(FORMAT, other)),
    };

    let (width, height) = buffer.dimensions();
    let (w, h) = match (u16::try_from(width), u16::try_from(height)) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(Error::encoding(
                FORMAT,
                format!("{width}x{height} exceeds the 65535 pixel JPEG maximum"),
            ));
        }
    };

    let quality = quality.clamp(1, 100);
    trace!(width, height, quality, "jpeg encode");
    Encoder::new(writer, quality)
        .encode(buffer.as_bytes(), w, h, color)
        .map_err(|e| Error::encoding(FORMAT, e.to_string()))
}
