//! # dynimg-io
//!
//! Codec gateway for the dynimg image engine.
//!
//! Turns bytes into a [`PixelBuffer`] and back. Decoding always goes by
//! content (magic bytes); file extensions are only consulted by [`save`].
//!
//! - [`decode`] / [`decode_with_format`] - Bytes to pixels, under explicit [`Limits`]
//! - [`encode`] / [`write_to`] - Pixels to bytes or to any `Write + Seek` sink
//! - [`encode_with`] - Hand raw samples to a [`CustomEncoder`]
//! - [`save`] / [`save_with_format`] - Pixels to a file
//!
//! # Quick Start
//!
//! ```rust
//! use dynimg_core::{ColorModel, EncodeOptions, ImageFormat, Limits, PixelBuffer};
//!
//! let buf = PixelBuffer::new(8, 8, ColorModel::Rgba8);
//! let png = dynimg_io::encode(&buf, ImageFormat::Png, &EncodeOptions::default()).unwrap();
//! let back = dynimg_io::decode(&png, &Limits::default()).unwrap();
//! assert_eq!(back, buf);
//! ```
//!
//! # Supported Formats
//!
//! | Format | Read | Write | Layouts | Backend |
//! |--------|------|-------|---------|---------|
//! | PNG | Yes | Yes | L, LA, RGB, RGBA at 8/16 bit | `png` |
//! | JPEG | Yes | Yes | L8, RGB8 (CMYK read as RGB8, L16 read) | `jpeg-decoder`, `jpeg-encoder` |
//! | TIFF | Yes | Yes | 8/16 bit, RGB(A) f32; LA read only | `tiff` |
//! | HDR | Yes | Yes | RGB f32 (any layout written) | in-tree RGBE |
//! | GIF, WebP, PNM, TGA, BMP, ICO, OpenEXR, farbfeld, QOI | Yes | Yes | per codec | `image` |
//! | DDS | Yes | No | per codec | `image` |
//! | AVIF | No | Yes | 8 bit | `image` |
//!
//! Encoding a layout a format cannot hold fails with
//! [`ErrorKind::UnsupportedColor`](dynimg_core::ErrorKind::UnsupportedColor).

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod encoder;
mod generic;
mod sink;

pub mod hdr;
pub mod jpeg;
pub mod png;
pub mod tiff;

pub use encoder::{encode_with, CustomEncoder};
pub use sink::MemorySink;

use std::fs::File;
use std::io::{BufWriter, Seek, Write};
use std::path::Path;

use dynimg_core::{EncodeOptions, Error, ImageFormat, Limits, PixelBuffer, Result};
use tracing::{debug, warn};

/// Decodes an image, detecting the format from its leading bytes.
///
/// # Errors
///
/// - [`ErrorKind::Decoding`](dynimg_core::ErrorKind::Decoding) if no known
///   signature matches or the data is corrupt
/// - [`ErrorKind::UnsupportedFormat`](dynimg_core::ErrorKind::UnsupportedFormat)
///   if the container is recognized but has no built-in decoder
/// - [`ErrorKind::DimensionError`](dynimg_core::ErrorKind::DimensionError) or
///   [`ErrorKind::InsufficientMemory`](dynimg_core::ErrorKind::InsufficientMemory)
///   if `limits` are exceeded
pub fn decode(bytes: &[u8], limits: &Limits) -> Result<PixelBuffer> {
    let format = ImageFormat::from_bytes(bytes).ok_or_else(|| {
        warn!(len = bytes.len(), "unrecognized image signature");
        Error::decoding(None, "unrecognized image signature")
    })?;
    decode_with_format(bytes, format, limits)
}

/// Decodes an image as `format`, skipping detection.
pub fn decode_with_format(bytes: &[u8], format: ImageFormat, limits: &Limits) -> Result<PixelBuffer> {
    debug!(%format, len = bytes.len(), "decode");
    if !format.can_read() {
        warn!(%format, "no built-in decoder");
        return Err(Error::unsupported_format(format!("{format} decoding is not built in")));
    }

    let buffer = match format {
        ImageFormat::Png => png::decode(bytes, limits),
        ImageFormat::Jpeg => jpeg::decode(bytes, limits),
        ImageFormat::Tiff => tiff::decode(bytes, limits),
        ImageFormat::Hdr => hdr::decode(bytes, limits),
        other => generic::decode(bytes, other, limits),
    }
    .inspect_err(|e| warn!(%format, error = %e, "decode failed"))?;

    debug!(
        %format,
        width = buffer.width(),
        height = buffer.height(),
        layout = %buffer.color_model(),
        "decoded"
    );
    Ok(buffer)
}

/// Encodes `buffer` as `format` into a new byte vector.
pub fn encode(buffer: &PixelBuffer, format: ImageFormat, options: &EncodeOptions) -> Result<Vec<u8>> {
    let mut sink = MemorySink::new();
    write_to(buffer, &mut sink, format, options)?;
    Ok(sink.into_inner())
}

/// Encodes `buffer` as `format` into `writer`.
///
/// The writer may be seeked by codecs that patch headers after the fact
/// (TIFF, some `image` encoders).
pub fn write_to<W: Write + Seek>(
    buffer: &PixelBuffer,
    writer: &mut W,
    format: ImageFormat,
    options: &EncodeOptions,
) -> Result<()> {
    ensure_writable(format)?;
    debug!(
        %format,
        width = buffer.width(),
        height = buffer.height(),
        layout = %buffer.color_model(),
        "encode"
    );

    match format {
        ImageFormat::Png => png::encode(buffer, writer, options.png_compression),
        ImageFormat::Jpeg => jpeg::encode(buffer, writer, options.jpeg_quality),
        ImageFormat::Tiff => tiff::encode(buffer, writer),
        ImageFormat::Hdr => hdr::encode(buffer, writer),
        other => generic::encode(buffer, writer, other),
    }
    .inspect_err(|e| warn!(%format, error = %e, "encode failed"))
}

/// Saves `buffer` to `path`, picking the format from the extension.
///
/// # Errors
///
/// [`ErrorKind::UnsupportedFormat`](dynimg_core::ErrorKind::UnsupportedFormat)
/// if the extension is missing or unknown, plus any encode or I/O failure.
pub fn save<P: AsRef<Path>>(buffer: &PixelBuffer, path: P, options: &EncodeOptions) -> Result<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path).ok_or_else(|| {
        warn!(path = %path.display(), "cannot infer format from extension");
        Error::unsupported_format(format!("cannot infer image format from {}", path.display()))
    })?;
    save_with_format(buffer, path, format, options)
}

/// Saves `buffer` to `path` as `format`, ignoring the extension.
pub fn save_with_format<P: AsRef<Path>>(
    buffer: &PixelBuffer,
    path: P,
    format: ImageFormat,
    options: &EncodeOptions,
) -> Result<()> {
    let path = path.as_ref();
    ensure_writable(format)?;
    debug!(path = %path.display(), %format, "save");

    let mut writer = BufWriter::new(File::create(path)?);
    write_to(buffer, &mut writer, format, options)?;
    writer.flush()?;
    Ok(())
}

fn ensure_writable(format: ImageFormat) -> Result<()> {
    if format.can_write() {
        Ok(())
    } else {
        warn!(%format, "no built-in encoder");
        Err(Error::unsupported_format(format!("{format} encoding is not built in")))
    }
}
