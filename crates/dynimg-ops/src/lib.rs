//! # dynimg-ops
//!
//! Pixel kernels for the dynimg engine.
//!
//! Every function here works on a typed [`SampleBuffer<T>`](dynimg_core::SampleBuffer)
//! and returns a new buffer, except [`color::invert`] which works in place.
//! Integer samples are processed as normalized `f32` and stored back with
//! rounding and saturation.
//!
//! # Modules
//!
//! - [`transform`] - Crop, flips, quarter-turn rotations
//! - [`resize`] - Separable resampling with five filters
//! - [`filter`] - Gaussian blur, unsharp mask, 3x3 convolution
//! - [`color`] - Brightness, contrast, inversion, hue rotation, grayscale
//! - [`convert`] - Total conversions between the ten layouts
//! - [`parallel`] - Row dispatch (rayon when the `parallel` feature is on)
//!
//! # Example
//!
//! ```rust
//! use dynimg_core::SampleBuffer;
//! use dynimg_ops::{resize, FilterKind};
//!
//! let src: SampleBuffer<u8> = SampleBuffer::new(64, 32, 3);
//! let dst = resize::resize(&src, 16, 8, FilterKind::Lanczos3);
//! assert_eq!(dst.dimensions(), (16, 8));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod error;
pub mod color;
pub mod convert;
pub mod filter;
pub mod parallel;
pub mod resize;
pub mod transform;

pub use error::{OpsError, OpsResult};
pub use filter::Kernel;
pub use resize::FilterKind;

use dynimg_core::{SampleBuffer, Sample};

/// Number of leading color channels (alpha excluded) for a channel count.
#[inline]
pub(crate) fn color_channels(channels: u8) -> usize {
    match channels {
        2 | 4 => channels as usize - 1,
        c => c as usize,
    }
}

/// Stores a normalized value, saturating to `[0, 1]` for every sample type.
#[inline]
pub(crate) fn store<T: Sample>(v: f32) -> T {
    T::from_f32(v.clamp(0.0, 1.0))
}

/// Normalized copy of all samples.
pub(crate) fn to_f32_vec<T: Sample>(buf: &SampleBuffer<T>) -> Vec<f32> {
    buf.as_slice().iter().map(|v| v.to_f32()).collect()
}

/// Fills a new buffer of the given shape from normalized values.
pub(crate) fn from_f32_vec<T: Sample>(
    width: u32,
    height: u32,
    channels: u8,
    values: &[f32],
    convert: impl Fn(f32) -> T,
) -> SampleBuffer<T> {
    let mut dst = SampleBuffer::new(width, height, channels);
    for (d, &v) in dst.as_mut_slice().iter_mut().zip(values) {
        *d = convert(v);
    }
    dst
}
