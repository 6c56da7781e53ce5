//! Sample storage.
//!
//! - [`SampleBuffer<T>`] - width, height, channel count and a contiguous
//!   row-major `Vec<T>` of interleaved samples
//! - [`PixelBuffer`] - a [`SampleBuffer`] tagged with one of the ten
//!   [`ColorModel`] layouts
//!
//! # Memory Layout
//!
//! ```text
//! Memory: [R G B R G B R G B ...]  <- Row 0
//!         [R G B R G B R G B ...]  <- Row 1
//!         ...
//! ```
//!
//! Zero-area buffers are legal and hold no samples.

use std::fmt;

use crate::color::{ColorModel, ExtendedColorType};
use crate::error::{Error, Result};
use crate::pixel::Rgba;
use crate::sample::Sample;

/// Owned, dimensioned, interleaved sample storage.
///
/// Invariant: `data.len() == width * height * channels`.
#[derive(Clone, PartialEq)]
pub struct SampleBuffer<T: Sample> {
    width: u32,
    height: u32,
    channels: u8,
    data: Vec<T>,
}

impl<T: Sample> SampleBuffer<T> {
    /// Creates a zero-filled buffer.
    ///
    /// # Panics
    ///
    /// Panics if `channels` is 0.
    pub fn new(width: u32, height: u32, channels: u8) -> Self {
        assert!(channels > 0, "sample buffer needs at least one channel");
        let len = width as usize * height as usize * channels as usize;
        Self {
            width,
            height,
            channels,
            data: vec![T::zero(); len],
        }
    }

    /// Wraps existing samples.
    ///
    /// Fails with `ParameterDimensionMismatch` when `data.len()` does not
    /// equal `width * height * channels`.
    pub fn from_raw(width: u32, height: u32, channels: u8, data: Vec<T>) -> Result<Self> {
        let expected = (width as u64) * (height as u64) * (channels as u64);
        if data.len() as u64 != expected || channels == 0 {
            return Err(Error::dimension_mismatch(format!(
                "{width}x{height}x{channels} needs {expected} samples, got {}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// Builds a buffer by evaluating `f(x, y)` for every pixel.
    ///
    /// # Panics
    ///
    /// Panics unless `1 <= N <= 255`.
    pub fn from_fn<const N: usize>(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> [T; N]) -> Self {
        assert!((1..=u8::MAX as usize).contains(&N), "sample buffer needs 1 to 255 channels");
        let mut data = Vec::with_capacity(width as usize * height as usize * N);
        for y in 0..height {
            for x in 0..width {
                data.extend_from_slice(&f(x, y));
            }
        }
        Self {
            width,
            height,
            channels: N as u8,
            data,
        }
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Samples per pixel.
    #[inline]
    pub fn channels(&self) -> u8 {
        self.channels
    }

    /// Returns `true` for zero-area buffers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns `true` if `(x, y)` addresses a pixel.
    #[inline]
    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Samples per row.
    #[inline]
    pub fn row_len(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        assert!(
            self.in_bounds(x, y),
            "pixel ({x}, {y}) out of bounds for image {}x{}",
            self.width,
            self.height
        );
        (y as usize * self.width as usize + x as usize) * self.channels as usize
    }

    /// Samples of one pixel.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> &[T] {
        let i = self.offset(x, y);
        &self.data[i..i + self.channels as usize]
    }

    /// Mutable samples of one pixel.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    #[inline]
    pub fn pixel_mut(&mut self, x: u32, y: u32) -> &mut [T] {
        let i = self.offset(x, y);
        let n = self.channels as usize;
        &mut self.data[i..i + n]
    }

    /// Samples of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[T] {
        assert!(y < self.height, "row {y} out of bounds for height {}", self.height);
        let len = self.row_len();
        let start = y as usize * len;
        &self.data[start..start + len]
    }

    /// Mutable samples of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [T] {
        assert!(y < self.height, "row {y} out of bounds for height {}", self.height);
        let len = self.row_len();
        let start = y as usize * len;
        &mut self.data[start..start + len]
    }

    /// All samples, row-major.
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// All samples, mutable.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Native-endian byte view of the samples.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Takes the sample vector.
    #[inline]
    pub fn into_raw(self) -> Vec<T> {
        self.data
    }

    /// Applies `f` to every sample, keeping dimensions and channel count.
    pub fn map_samples<U: Sample>(&self, f: impl FnMut(T) -> U) -> SampleBuffer<U> {
        SampleBuffer {
            width: self.width,
            height: self.height,
            channels: self.channels,
            data: self.data.iter().copied().map(f).collect(),
        }
    }

    /// 8-bit RGBA view of one pixel.
    ///
    /// Luma expands to grey, missing alpha becomes 255, wider samples narrow
    /// with rounding.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn rgba_at(&self, x: u32, y: u32) -> Rgba {
        let p = self.pixel(x, y);
        let n = |v: T| u8::from_f32(v.to_f32());
        match *p {
            [l] => Rgba::from_luma(n(l)),
            [l, a] => {
                let l = n(l);
                Rgba::new(l, l, l, n(a))
            }
            [r, g, b] => Rgba::new(n(r), n(g), n(b), 255),
            [r, g, b, a] => Rgba::new(n(r), n(g), n(b), n(a)),
            _ => Rgba::default(),
        }
    }
}

impl<T: Sample> fmt::Debug for SampleBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SampleBuffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("channels", &self.channels)
            .field("samples", &self.data.len())
            .finish()
    }
}

/// Image storage in one of the ten layouts.
///
/// Each variant owns exactly one [`SampleBuffer`] with the sample type and
/// channel count of its [`ColorModel`].
#[derive(Debug, Clone, PartialEq)]
pub enum PixelBuffer {
    /// 8-bit luma.
    L8(SampleBuffer<u8>),
    /// 8-bit luma with alpha.
    La8(SampleBuffer<u8>),
    /// 8-bit RGB.
    Rgb8(SampleBuffer<u8>),
    /// 8-bit RGBA.
    Rgba8(SampleBuffer<u8>),
    /// 16-bit luma.
    L16(SampleBuffer<u16>),
    /// 16-bit luma with alpha.
    La16(SampleBuffer<u16>),
    /// 16-bit RGB.
    Rgb16(SampleBuffer<u16>),
    /// 16-bit RGBA.
    Rgba16(SampleBuffer<u16>),
    /// 32-bit float RGB.
    Rgb32F(SampleBuffer<f32>),
    /// 32-bit float RGBA.
    Rgba32F(SampleBuffer<f32>),
}

/// Applies an expression to the [`SampleBuffer`] inside any [`PixelBuffer`].
///
/// - `dynamic_map!(buf, b => expr)` rebuilds the same variant around `expr`
/// - `dynamic_map!(buf, b -> expr)` evaluates `expr` and returns it as is
///
/// ```
/// use dynimg_core::{dynamic_map, ColorModel, PixelBuffer};
///
/// let buf = PixelBuffer::new(3, 2, ColorModel::La16);
/// let samples = dynamic_map!(&buf, b -> b.as_slice().len());
/// assert_eq!(samples, 12);
/// let copy = dynamic_map!(&buf, b => b.clone());
/// assert_eq!(copy, buf);
/// ```
#[macro_export]
macro_rules! dynamic_map {
    ($buf:expr, $b:ident => $action:expr) => {
        match $buf {
            $crate::PixelBuffer::L8($b) => $crate::PixelBuffer::L8($action),
            $crate::PixelBuffer::La8($b) => $crate::PixelBuffer::La8($action),
            $crate::PixelBuffer::Rgb8($b) => $crate::PixelBuffer::Rgb8($action),
            $crate::PixelBuffer::Rgba8($b) => $crate::PixelBuffer::Rgba8($action),
            $crate::PixelBuffer::L16($b) => $crate::PixelBuffer::L16($action),
            $crate::PixelBuffer::La16($b) => $crate::PixelBuffer::La16($action),
            $crate::PixelBuffer::Rgb16($b) => $crate::PixelBuffer::Rgb16($action),
            $crate::PixelBuffer::Rgba16($b) => $crate::PixelBuffer::Rgba16($action),
            $crate::PixelBuffer::Rgb32F($b) => $crate::PixelBuffer::Rgb32F($action),
            $crate::PixelBuffer::Rgba32F($b) => $crate::PixelBuffer::Rgba32F($action),
        }
    };
    ($buf:expr, $b:ident -> $action:expr) => {
        match $buf {
            $crate::PixelBuffer::L8($b) => $action,
            $crate::PixelBuffer::La8($b) => $action,
            $crate::PixelBuffer::Rgb8($b) => $action,
            $crate::PixelBuffer::Rgba8($b) => $action,
            $crate::PixelBuffer::L16($b) => $action,
            $crate::PixelBuffer::La16($b) => $action,
            $crate::PixelBuffer::Rgb16($b) => $action,
            $crate::PixelBuffer::Rgba16($b) => $action,
            $crate::PixelBuffer::Rgb32F($b) => $action,
            $crate::PixelBuffer::Rgba32F($b) => $action,
        }
    };
}

impl PixelBuffer {
    /// Creates a zero-filled buffer in `model`.
    pub fn new(width: u32, height: u32, model: ColorModel) -> Self {
        let c = model.channel_count();
        match model {
            ColorModel::L8 => Self::L8(SampleBuffer::new(width, height, c)),
            ColorModel::La8 => Self::La8(SampleBuffer::new(width, height, c)),
            ColorModel::Rgb8 => Self::Rgb8(SampleBuffer::new(width, height, c)),
            ColorModel::Rgba8 => Self::Rgba8(SampleBuffer::new(width, height, c)),
            ColorModel::L16 => Self::L16(SampleBuffer::new(width, height, c)),
            ColorModel::La16 => Self::La16(SampleBuffer::new(width, height, c)),
            ColorModel::Rgb16 => Self::Rgb16(SampleBuffer::new(width, height, c)),
            ColorModel::Rgba16 => Self::Rgba16(SampleBuffer::new(width, height, c)),
            ColorModel::Rgb32F => Self::Rgb32F(SampleBuffer::new(width, height, c)),
            ColorModel::Rgba32F => Self::Rgba32F(SampleBuffer::new(width, height, c)),
        }
    }

    /// Wraps 8-bit samples. `model` must be an 8-bit layout.
    pub fn from_raw_u8(width: u32, height: u32, model: ColorModel, data: Vec<u8>) -> Result<Self> {
        let buf = SampleBuffer::from_raw(width, height, model.channel_count(), data)?;
        match model {
            ColorModel::L8 => Ok(Self::L8(buf)),
            ColorModel::La8 => Ok(Self::La8(buf)),
            ColorModel::Rgb8 => Ok(Self::Rgb8(buf)),
            ColorModel::Rgba8 => Ok(Self::Rgba8(buf)),
            other => Err(Error::malformed(format!("{other} does not hold u8 samples"))),
        }
    }

    /// Wraps 16-bit samples. `model` must be a 16-bit layout.
    pub fn from_raw_u16(width: u32, height: u32, model: ColorModel, data: Vec<u16>) -> Result<Self> {
        let buf = SampleBuffer::from_raw(width, height, model.channel_count(), data)?;
        match model {
            ColorModel::L16 => Ok(Self::L16(buf)),
            ColorModel::La16 => Ok(Self::La16(buf)),
            ColorModel::Rgb16 => Ok(Self::Rgb16(buf)),
            ColorModel::Rgba16 => Ok(Self::Rgba16(buf)),
            other => Err(Error::malformed(format!("{other} does not hold u16 samples"))),
        }
    }

    /// Wraps float samples. `model` must be a float layout.
    pub fn from_raw_f32(width: u32, height: u32, model: ColorModel, data: Vec<f32>) -> Result<Self> {
        let buf = SampleBuffer::from_raw(width, height, model.channel_count(), data)?;
        match model {
            ColorModel::Rgb32F => Ok(Self::Rgb32F(buf)),
            ColorModel::Rgba32F => Ok(Self::Rgba32F(buf)),
            other => Err(Error::malformed(format!("{other} does not hold f32 samples"))),
        }
    }

    /// Copies native-endian sample bytes into a buffer of `model`.
    pub fn from_bytes(width: u32, height: u32, model: ColorModel, bytes: &[u8]) -> Result<Self> {
        let expected = width as u64 * height as u64 * model.bytes_per_pixel() as u64;
        if bytes.len() as u64 != expected {
            return Err(Error::dimension_mismatch(format!(
                "{width}x{height} {model} needs {expected} bytes, got {}",
                bytes.len()
            )));
        }
        match model.bytes_per_sample() {
            1 => Self::from_raw_u8(width, height, model, bytes.to_vec()),
            2 => {
                let data = bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_ne_bytes([c[0], c[1]]))
                    .collect();
                Self::from_raw_u16(width, height, model, data)
            }
            _ => {
                let data = bytes
                    .chunks_exact(4)
                    .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                    .collect();
                Self::from_raw_f32(width, height, model, data)
            }
        }
    }

    /// Layout tag.
    pub fn color_model(&self) -> ColorModel {
        match self {
            Self::L8(_) => ColorModel::L8,
            Self::La8(_) => ColorModel::La8,
            Self::Rgb8(_) => ColorModel::Rgb8,
            Self::Rgba8(_) => ColorModel::Rgba8,
            Self::L16(_) => ColorModel::L16,
            Self::La16(_) => ColorModel::La16,
            Self::Rgb16(_) => ColorModel::Rgb16,
            Self::Rgba16(_) => ColorModel::Rgba16,
            Self::Rgb32F(_) => ColorModel::Rgb32F,
            Self::Rgba32F(_) => ColorModel::Rgba32F,
        }
    }

    /// Checks that the inner buffer has the channel count of the layout.
    ///
    /// The variants are public, so a buffer built by hand can carry the
    /// wrong channel count for its tag.
    ///
    /// ```
    /// use dynimg_core::{PixelBuffer, SampleBuffer};
    ///
    /// assert!(PixelBuffer::Rgb8(SampleBuffer::new(2, 2, 3)).check_layout().is_ok());
    /// assert!(PixelBuffer::Rgb8(SampleBuffer::new(2, 2, 1)).check_layout().is_err());
    /// ```
    pub fn check_layout(&self) -> Result<()> {
        let model = self.color_model();
        let channels = dynamic_map!(self, b -> b.channels());
        if channels == model.channel_count() {
            Ok(())
        } else {
            Err(Error::dimension_mismatch(format!(
                "{model} needs {} channels, buffer has {channels}",
                model.channel_count()
            )))
        }
    }

    /// Layout tag as seen by encoders.
    #[inline]
    pub fn extended_color_type(&self) -> ExtendedColorType {
        self.color_model().into()
    }

    /// `(width, height)`.
    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        dynamic_map!(self, b -> b.dimensions())
    }

    /// Width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.dimensions().0
    }

    /// Height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.dimensions().1
    }

    /// Returns `true` for zero-area buffers.
    #[inline]
    pub fn is_empty(&self) -> bool {
        dynamic_map!(self, b -> b.is_empty())
    }

    /// Returns `true` if `(x, y)` addresses a pixel.
    #[inline]
    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        dynamic_map!(self, b -> b.in_bounds(x, y))
    }

    /// Native-endian sample bytes, `width * height * bytes_per_pixel` long.
    pub fn as_bytes(&self) -> &[u8] {
        dynamic_map!(self, b -> b.as_bytes())
    }

    /// Consumes the buffer and returns its native-endian sample bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::L8(b) | Self::La8(b) | Self::Rgb8(b) | Self::Rgba8(b) => b.into_raw(),
            other => other.as_bytes().to_vec(),
        }
    }

    /// 8-bit RGBA view of one pixel.
    ///
    /// # Panics
    ///
    /// Panics if `(x, y)` is out of bounds.
    pub fn rgba_at(&self, x: u32, y: u32) -> Rgba {
        dynamic_map!(self, b -> b.rgba_at(x, y))
    }
}
