//! # dynimg
//!
//! In-memory dynamic image engine.
//!
//! Decode bytes into a [`DynamicImage`], transform it, inspect it through
//! point queries or a lazy [`ExternalIterator`], and encode it back.
//!
//! - [`load`] / [`load_with_format`] - Bytes to image, under explicit [`Limits`]
//! - [`DynamicImage`] - Geometry, resampling, color, filters, conversions
//! - [`iter`] - The external iterator protocol
//!
//! # Quick Start
//!
//! ```rust
//! use dynimg::{ColorModel, DynamicImage, EncodeOptions, FilterKind, ImageFormat, Limits};
//!
//! let img = DynamicImage::new(32, 32, ColorModel::Rgba8);
//! let png = img
//!     .rotate_90()
//!     .resize(16, 16, FilterKind::Lanczos3)
//!     .encode(ImageFormat::Png, &EncodeOptions::default())
//!     .unwrap();
//!
//! let back = dynimg::load(&png, &Limits::default()).unwrap();
//! assert_eq!(back.dimensions(), (16, 16));
//! ```
//!
//! # Errors
//!
//! Fallible calls return [`Result`]; [`Error::kind`] projects every error
//! onto the closed [`ErrorKind`] taxonomy. Contract violations panic:
//! [`DynamicImage::get_pixel`] out of bounds and
//! [`ExternalIterator::step_by`] with a zero step.
//!
//! # Features
//!
//! - `parallel` (default) - Row-parallel kernels on the rayon pool

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod image;
pub mod iter;

pub use dynimg_core::{
    ColorModel, Config, EncodeOptions, Error, ErrorKind, ExtendedColorType, ImageFormat, IoKind, LimitKind,
    Limits, ParameterKind, PixelBuffer, PngCompression, Result, Rgba, SampleBuffer,
};
pub use dynimg_io::{CustomEncoder, MemorySink};
pub use dynimg_ops::FilterKind;
pub use image::{DynamicImage, PixelItem};
pub use iter::{ExternalIterator, Peekable, SizeHint};

use tracing::debug;

/// Decodes an image, detecting the format from its content.
///
/// # Errors
///
/// - [`ErrorKind::Decoding`] for unrecognized or corrupt data
/// - [`ErrorKind::UnsupportedFormat`] for a recognized container without a
///   built-in decoder
/// - [`ErrorKind::DimensionError`] / [`ErrorKind::InsufficientMemory`] when
///   `limits` are exceeded
pub fn load(bytes: &[u8], limits: &Limits) -> Result<DynamicImage> {
    let buffer = dynimg_io::decode(bytes, limits)?;
    debug!(dimensions = ?buffer.dimensions(), layout = %buffer.color_model(), "loaded");
    DynamicImage::from_buffer(buffer)
}

/// Decodes an image as `format`, skipping content detection.
pub fn load_with_format(bytes: &[u8], format: ImageFormat, limits: &Limits) -> Result<DynamicImage> {
    dynimg_io::decode_with_format(bytes, format, limits).and_then(DynamicImage::from_buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_feature_drives_kernels() {
        assert_eq!(dynimg_ops::parallel::is_parallel(), cfg!(feature = "parallel"));
    }

    #[test]
    fn test_load_malformed() {
        let err = load(&[0x00, 0x01], &Limits::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decoding);
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_load_keeps_native_layout() {
        for model in [ColorModel::L8, ColorModel::Rgba16, ColorModel::La8, ColorModel::Rgb16] {
            let img = DynamicImage::new(3, 4, model);
            let png = img.encode(ImageFormat::Png, &EncodeOptions::default()).unwrap();
            assert_eq!(load(&png, &Limits::default()).unwrap().color_model(), model);
        }
    }

    #[test]
    fn test_load_limits() {
        let img = DynamicImage::new(64, 64, ColorModel::Rgb8);
        let png = img.encode(ImageFormat::Png, &EncodeOptions::default()).unwrap();
        let limits = Limits {
            max_image_width: Some(32),
            ..Limits::default()
        };
        assert_eq!(load(&png, &limits).unwrap_err().kind(), ErrorKind::DimensionError);
    }

    #[test]
    fn test_load_with_format_skips_sniffing() {
        let img = DynamicImage::new(2, 2, ColorModel::L8);
        let png = img.encode(ImageFormat::Png, &EncodeOptions::default()).unwrap();
        assert_eq!(load_with_format(&png, ImageFormat::Png, &Limits::default()).unwrap(), img);
        let err = load_with_format(&png, ImageFormat::Jpeg, &Limits::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decoding);
        let err = load_with_format(&png, ImageFormat::Avif, &Limits::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }
}
