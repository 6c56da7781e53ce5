//! PNG format support.
//!
//! Reads and writes PNG through the `png` crate.
//!
//! # Layouts
//!
//! - Read: grey, grey+alpha, RGB, RGBA at 8 or 16 bits. Palette images,
//!   sub-byte grey and `tRNS` transparency are expanded to 8-bit layouts.
//! - Write: the eight integer layouts. Float layouts are rejected with
//!   [`ErrorKind::UnsupportedColor`](dynimg_core::ErrorKind::UnsupportedColor).
//!
//! PNG stores 16-bit samples big-endian; buffers hold them native-endian.

use std::io::{Cursor, Write};

use dynimg_core::{ColorModel, Error, ImageFormat, LimitKind, Limits, PixelBuffer, PngCompression, Result};
use png::{BitDepth, ColorType, Transformations};
use tracing::trace;

const FORMAT: Option<ImageFormat> = Some(ImageFormat::Png);

fn decoding_error(err: png::DecodingError) -> Error {
    match err {
        png::DecodingError::LimitsExceeded => Error::limits(LimitKind::InsufficientMemory, "PNG decoder limits exceeded"),
        other => Error::decoding(FORMAT, other.to_string()),
    }
}

fn encoding_error(err: png::EncodingError) -> Error {
    match err {
        png::EncodingError::IoError(e) => Error::Io(e),
        other => Error::encoding(FORMAT, other.to_string()),
    }
}

/// Decodes a PNG from memory.
pub fn decode(bytes: &[u8], limits: &Limits) -> Result<PixelBuffer> {
    let mut png_limits = png::Limits::default();
    if let Some(max) = limits.max_alloc {
        png_limits.bytes = usize::try_from(max).unwrap_or(usize::MAX);
    }
    let mut decoder = png::Decoder::new_with_limits(Cursor::new(bytes), png_limits);
    decoder.set_transformations(Transformations::EXPAND);

    let mut reader = decoder.read_info().map_err(decoding_error)?;
    let (width, height) = {
        let info = reader.info();
        (info.width, info.height)
    };
    limits.check_dimensions(width, height)?;

    let (color, depth) = reader.output_color_type();
    let model = match (color, depth) {
        (ColorType::Grayscale, BitDepth::Sixteen) => ColorModel::L16,
        (ColorType::GrayscaleAlpha, BitDepth::Sixteen) => ColorModel::La16,
        (ColorType::Rgb, BitDepth::Sixteen) => ColorModel::Rgb16,
        (ColorType::Rgba, BitDepth::Sixteen) => ColorModel::Rgba16,
        (ColorType::Grayscale, _) => ColorModel::L8,
        (ColorType::GrayscaleAlpha, _) => ColorModel::La8,
        (ColorType::Rgb, _) => ColorModel::Rgb8,
        (ColorType::Rgba, _) => ColorModel::Rgba8,
        (ColorType::Indexed, _) => {
            return Err(Error::decoding(FORMAT, "palette was not expanded"));
        }
    };
    limits.check_image(width, height, model.bytes_per_pixel())?;

    let size = reader
        .output_buffer_size()
        .ok_or_else(|| Error::limits(LimitKind::InsufficientMemory, "PNG output buffer size overflows"))?;
    let mut data = vec![0u8; size];
    let frame = reader.next_frame(&mut data).map_err(decoding_error)?;
    data.truncate(frame.buffer_size());
    trace!(width, height, ?color, ?depth, layout = %model, "png frame");

    if model.bytes_per_sample() == 2 {
        let samples = data
            .chunks_exact(2)
            .map(|b| u16::from_be_bytes([b[0], b[1]]))
            .collect();
        PixelBuffer::from_raw_u16(width, height, model, samples)
    } else {
        PixelBuffer::from_raw_u8(width, height, model, data)
    }
    .map_err(|e| Error::decoding(FORMAT, e.to_string()))
}

/// Encodes `buffer` as PNG into `writer`.
pub fn encode<W: Write>(buffer: &PixelBuffer, writer: W, compression: PngCompression) -> Result<()> {
    let model = buffer.color_model();
    let color = match model {
        ColorModel::L8 | ColorModel::L16 => ColorType::Grayscale,
        ColorModel::La8 | ColorModel::La16 => ColorType::GrayscaleAlpha,
        ColorModel::Rgb8 | ColorModel::Rgb16 => ColorType::Rgb,
        ColorModel::Rgba8 | ColorModel::Rgba16 => ColorType::Rgba,
        ColorModel::Rgb32F | ColorModel::Rgba32F => {
            return Err(Error::unsupported_color(FORMAT, model));
        }
    };
    let depth = if model.bytes_per_sample() == 2 {
        BitDepth::Sixteen
    } else {
        BitDepth::Eight
    };

    let (width, height) = buffer.dimensions();
    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(color);
    encoder.set_depth(depth);
    encoder.set_compression(match compression {
        PngCompression::Fast => png::Compression::Fast,
        PngCompression::Default => png::Compression::Balanced,
        PngCompression::Best => png::Compression::High,
    });

    let mut png_writer = encoder.write_header().map_err(encoding_error)?;
    match buffer {
        PixelBuffer::L16(b) | PixelBuffer::La16(b) | PixelBuffer::Rgb16(b) | PixelBuffer::Rgba16(b) => {
            let be: Vec<u8> = b.as_slice().iter().flat_map(|v| v.to_be_bytes()).collect();
            png_writer.write_image_data(&be)
        }
        other => png_writer.write_image_data(other.as_bytes()),
    }
    .map_err(encoding_error)?;
    png_writer.finish().map_err(encoding_error)
}
