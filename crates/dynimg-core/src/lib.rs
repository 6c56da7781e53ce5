//! # dynimg-core
//!
//! Core types for the dynimg image engine.
//!
//! This crate provides the leaf types every other dynimg crate builds on:
//!
//! - [`ColorModel`] - The closed set of ten in-memory pixel layouts
//! - [`ExtendedColorType`] - Superset of layouts used only at the encode boundary
//! - [`Sample`] - Trait for sample types (`u8`, `u16`, `f32`)
//! - [`SampleBuffer`] - Dimensioned, contiguous sample storage
//! - [`PixelBuffer`] - A [`SampleBuffer`] tagged with its [`ColorModel`]
//! - [`Rgba`] - The 8-bit pixel sample returned by point queries
//! - [`Error`], [`ErrorKind`] - The failure taxonomy
//! - [`Limits`], [`Config`] - Explicit decode limits and encoder settings
//!
//! ## Design Philosophy
//!
//! One image type covers ten pixel layouts through a sum type rather than a
//! trait object per layout. Code that needs the concrete sample type matches
//! on [`PixelBuffer`] (usually through [`dynamic_map!`]) and works on a typed
//! [`SampleBuffer<T>`]:
//!
//! ```
//! use dynimg_core::{ColorModel, PixelBuffer};
//!
//! let buffer = PixelBuffer::new(4, 2, ColorModel::Rgba16);
//! assert_eq!(buffer.as_bytes().len(), 4 * 2 * 8);
//! ```
//!
//! ## Crate Structure
//!
//! ```text
//! dynimg-core (this crate)
//!    ^
//!    +-- dynimg-ops (numeric kernels)
//!    +-- dynimg-io (codec gateway)
//!    +-- dynimg (DynamicImage facade, external iterators)
//!    +-- dynimg-capi (C ABI)
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod buffer;
pub mod color;
pub mod config;
pub mod error;
pub mod format;
pub mod limits;
pub mod pixel;
pub mod sample;

// Re-exports for convenience
pub use buffer::{PixelBuffer, SampleBuffer};
pub use color::{ColorModel, ExtendedColorType};
pub use config::{Config, EncodeOptions, PngCompression};
pub use error::{Error, ErrorKind, IoKind, LimitKind, ParameterKind, Result};
pub use format::ImageFormat;
pub use limits::Limits;
pub use pixel::{luminance_rec709, Rgba, REC709_LUMA_B, REC709_LUMA_G, REC709_LUMA_R};
pub use sample::Sample;

/// Prelude module for convenient imports.
///
/// ```
/// use dynimg_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::buffer::{PixelBuffer, SampleBuffer};
    pub use crate::color::{ColorModel, ExtendedColorType};
    pub use crate::config::{Config, EncodeOptions};
    pub use crate::error::{Error, ErrorKind, Result};
    pub use crate::format::ImageFormat;
    pub use crate::limits::Limits;
    pub use crate::pixel::Rgba;
    pub use crate::sample::Sample;
}
