//! Image resize and resampling operations.
//!
//! Separable two-pass resampling (horizontal, then vertical) with
//! precomputed, normalized contributions per output coordinate.
//!
//! # Filters
//!
//! - [`FilterKind::Nearest`] - No interpolation, bit-exact samples
//! - [`FilterKind::Triangle`] - Linear interpolation
//! - [`FilterKind::CatmullRom`] - Cubic with B=0, C=0.5
//! - [`FilterKind::Gaussian`] - Gaussian with sigma 0.5
//! - [`FilterKind::Lanczos3`] - Windowed sinc, best for downscaling
//!
//! # Degenerate targets
//!
//! A zero target width or height never fails; it produces a zero-area
//! buffer of the requested shape.
//!
//! # Example
//!
//! ```rust
//! use dynimg_ops::resize::{resize_f32, FilterKind};
//!
//! let src: Vec<f32> = vec![0.0; 64 * 64 * 4]; // 64x64 RGBA
//! let dst = resize_f32(&src, 64, 64, 4, 128, 128, FilterKind::Lanczos3).unwrap();
//! assert_eq!(dst.len(), 128 * 128 * 4);
//! ```

use dynimg_core::{Sample, SampleBuffer};
use tracing::{debug, trace};

use crate::parallel::for_each_row;
use crate::{from_f32_vec, to_f32_vec, OpsError, OpsResult};

/// Resampling filter for resize operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterKind {
    /// Nearest-neighbor (fastest, no interpolation).
    Nearest,
    /// Linear interpolation.
    Triangle,
    /// Catmull-Rom cubic spline.
    #[default]
    CatmullRom,
    /// Gaussian (soft).
    Gaussian,
    /// Lanczos with a window of 3.
    Lanczos3,
}

impl FilterKind {
    /// All filters.
    pub const ALL: [FilterKind; 5] = [
        Self::Nearest,
        Self::Triangle,
        Self::CatmullRom,
        Self::Gaussian,
        Self::Lanczos3,
    ];

    /// Returns the support radius for this filter.
    #[inline]
    pub fn support(self) -> f32 {
        match self {
            Self::Nearest => 0.5,
            Self::Triangle => 1.0,
            Self::CatmullRom => 2.0,
            Self::Gaussian => 3.0,
            Self::Lanczos3 => 3.0,
        }
    }

    /// Evaluates the filter kernel at position x.
    #[inline]
    pub fn weight(self, x: f32) -> f32 {
        match self {
            Self::Nearest => nearest_weight(x),
            Self::Triangle => triangle_weight(x),
            Self::CatmullRom => cubic_bc_weight(x, 0.0, 0.5),
            Self::Gaussian => gaussian_weight(x, 0.5),
            Self::Lanczos3 => lanczos_weight(x, 3.0),
        }
    }
}

#[inline]
fn nearest_weight(x: f32) -> f32 {
    if x.abs() <= 0.5 { 1.0 } else { 0.0 }
}

#[inline]
fn triangle_weight(x: f32) -> f32 {
    let ax = x.abs();
    if ax < 1.0 { 1.0 - ax } else { 0.0 }
}

/// Mitchell-Netravali family cubic.
#[inline]
fn cubic_bc_weight(x: f32, b: f32, c: f32) -> f32 {
    let ax = x.abs();
    if ax < 1.0 {
        ((12.0 - 9.0 * b - 6.0 * c) * ax * ax * ax
            + (-18.0 + 12.0 * b + 6.0 * c) * ax * ax
            + (6.0 - 2.0 * b))
            / 6.0
    } else if ax < 2.0 {
        ((-b - 6.0 * c) * ax * ax * ax
            + (6.0 * b + 30.0 * c) * ax * ax
            + (-12.0 * b - 48.0 * c) * ax
            + (8.0 * b + 24.0 * c))
            / 6.0
    } else {
        0.0
    }
}

#[inline]
fn gaussian_weight(x: f32, sigma: f32) -> f32 {
    (-(x * x) / (2.0 * sigma * sigma)).exp()
}

#[inline]
fn lanczos_weight(x: f32, a: f32) -> f32 {
    let ax = x.abs();
    if ax < 1e-8 {
        1.0
    } else if ax < a {
        let pi_x = std::f32::consts::PI * ax;
        let pi_x_a = pi_x / a;
        (pi_x.sin() / pi_x) * (pi_x_a.sin() / pi_x_a)
    } else {
        0.0
    }
}

/// Source taps for one output coordinate.
struct Contribution {
    start: usize,
    weights: Vec<f32>,
}

/// Normalized taps for every output coordinate along one axis.
fn contributions(src_len: usize, dst_len: usize, filter: FilterKind) -> Vec<Contribution> {
    let scale = src_len as f32 / dst_len as f32;
    let filter_scale = scale.max(1.0);
    let support = filter.support() * filter_scale;

    (0..dst_len)
        .map(|i| {
            let center = (i as f32 + 0.5) * scale - 0.5;
            let left = ((center - support).floor() as isize).max(0) as usize;
            let right = ((center + support).ceil() as isize).min(src_len as isize - 1) as usize;
            let mut weights: Vec<f32> = (left..=right)
                .map(|s| filter.weight((s as f32 - center) / filter_scale))
                .collect();
            let sum: f32 = weights.iter().sum();
            if sum.abs() > f32::EPSILON {
                weights.iter_mut().for_each(|w| *w /= sum);
            } else {
                // Degenerate window: fall back to the nearest source sample.
                let nearest = (center.round().max(0.0) as usize).min(src_len - 1);
                return Contribution {
                    start: nearest,
                    weights: vec![1.0],
                };
            }
            Contribution {
                start: left,
                weights,
            }
        })
        .collect()
}

/// Resizes interleaved f32 samples.
///
/// # Arguments
///
/// * `src` - Source samples
/// * `src_w`, `src_h` - Source dimensions
/// * `channels` - Samples per pixel
/// * `dst_w`, `dst_h` - Destination dimensions
/// * `filter` - Resampling filter
///
/// A zero destination axis yields an empty vector. A zero-area source with
/// a non-empty destination yields zeros.
pub fn resize_f32(
    src: &[f32],
    src_w: usize,
    src_h: usize,
    channels: usize,
    dst_w: usize,
    dst_h: usize,
    filter: FilterKind,
) -> OpsResult<Vec<f32>> {
    let expected = src_w * src_h * channels;
    if src.len() != expected {
        return Err(OpsError::InvalidDimensions(format!(
            "expected {} samples, got {}",
            expected,
            src.len()
        )));
    }
    if dst_w == 0 || dst_h == 0 || channels == 0 {
        return Ok(Vec::new());
    }
    if src_w == 0 || src_h == 0 {
        return Ok(vec![0.0; dst_w * dst_h * channels]);
    }
    trace!(src_w, src_h, dst_w, dst_h, ?filter, "resize_f32");

    let temp = resize_horizontal(src, src_w, channels, dst_w, filter);
    Ok(resize_vertical(&temp, dst_w, src_h, channels, dst_h, filter))
}

/// Horizontal resize pass.
fn resize_horizontal(
    src: &[f32],
    src_w: usize,
    channels: usize,
    dst_w: usize,
    filter: FilterKind,
) -> Vec<f32> {
    let src_h = src.len() / (src_w * channels);
    let taps = contributions(src_w, dst_w, filter);
    let mut dst = vec![0.0f32; dst_w * src_h * channels];

    for_each_row(&mut dst, dst_w * channels, |y, row| {
        let src_row = &src[y * src_w * channels..(y + 1) * src_w * channels];
        for (x, tap) in taps.iter().enumerate() {
            let out = &mut row[x * channels..(x + 1) * channels];
            for (k, &w) in tap.weights.iter().enumerate() {
                let idx = (tap.start + k) * channels;
                for c in 0..channels {
                    out[c] += src_row[idx + c] * w;
                }
            }
        }
    });

    dst
}

/// Vertical resize pass.
fn resize_vertical(
    src: &[f32],
    width: usize,
    src_h: usize,
    channels: usize,
    dst_h: usize,
    filter: FilterKind,
) -> Vec<f32> {
    let row_len = width * channels;
    let taps = contributions(src_h, dst_h, filter);
    let mut dst = vec![0.0f32; row_len * dst_h];

    for_each_row(&mut dst, row_len, |y, row| {
        let tap = &taps[y];
        for (k, &w) in tap.weights.iter().enumerate() {
            let src_row = &src[(tap.start + k) * row_len..(tap.start + k + 1) * row_len];
            for (d, &s) in row.iter_mut().zip(src_row) {
                *d += s * w;
            }
        }
    });

    dst
}

/// Nearest-neighbor resize on native samples, bit-exact.
fn resize_nearest<T: Sample>(src: &SampleBuffer<T>, dst_w: u32, dst_h: u32) -> SampleBuffer<T> {
    let (src_w, src_h) = src.dimensions();
    let c = src.channels() as usize;
    let mut dst = SampleBuffer::new(dst_w, dst_h, src.channels());
    let sx_of = |x: u32| -> u32 {
        let s = ((x as f64 + 0.5) * src_w as f64 / dst_w as f64) as u32;
        s.min(src_w - 1)
    };
    let cols: Vec<u32> = (0..dst_w).map(sx_of).collect();

    for y in 0..dst_h {
        let sy = (((y as f64 + 0.5) * src_h as f64 / dst_h as f64) as u32).min(src_h - 1);
        let src_row = src.row(sy);
        let dst_row = dst.row_mut(y);
        for (x, &sx) in cols.iter().enumerate() {
            let s = sx as usize * c;
            dst_row[x * c..(x + 1) * c].copy_from_slice(&src_row[s..s + c]);
        }
    }

    dst
}

/// Resizes a buffer to exactly `dst_w x dst_h`.
///
/// Integer samples are resampled as normalized floats and stored back with
/// rounding and saturation. A zero target axis gives a zero-area buffer of
/// that shape.
pub fn resize<T: Sample>(
    src: &SampleBuffer<T>,
    dst_w: u32,
    dst_h: u32,
    filter: FilterKind,
) -> SampleBuffer<T> {
    let (src_w, src_h) = src.dimensions();
    let channels = src.channels();
    if dst_w == 0 || dst_h == 0 || src.is_empty() {
        return SampleBuffer::new(dst_w, dst_h, channels);
    }
    if (dst_w, dst_h) == (src_w, src_h) {
        return src.clone();
    }
    debug!(src_w, src_h, dst_w, dst_h, ?filter, "resize");

    if filter == FilterKind::Nearest {
        return resize_nearest(src, dst_w, dst_h);
    }

    let values = to_f32_vec(src);
    let c = channels as usize;
    let temp = resize_horizontal(&values, src_w as usize, c, dst_w as usize, filter);
    let out = resize_vertical(&temp, dst_w as usize, src_h as usize, c, dst_h as usize, filter);
    from_f32_vec(dst_w, dst_h, channels, &out, T::from_f32)
}

/// Largest size with the source aspect ratio that fits in `max_w x max_h`.
///
/// Any zero input gives `(0, 0)`. Each axis is at least 1 otherwise.
///
/// # Example
///
/// ```rust
/// use dynimg_ops::resize::fit_dimensions;
///
/// // Fit 1920x1080 into 640x480 box
/// assert_eq!(fit_dimensions(1920, 1080, 640, 480), (640, 360));
/// ```
pub fn fit_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 || max_w == 0 || max_h == 0 {
        return (0, 0);
    }
    let scale_w = max_w as f64 / src_w as f64;
    let scale_h = max_h as f64 / src_h as f64;
    scaled(src_w, src_h, scale_w.min(scale_h), (max_w, max_h))
}

/// Smallest size with the source aspect ratio that covers `min_w x min_h`.
///
/// # Example
///
/// ```rust
/// use dynimg_ops::resize::fill_dimensions;
///
/// // Fill 640x480 with 1920x1080 (crop sides)
/// assert_eq!(fill_dimensions(1920, 1080, 640, 480), (853, 480));
/// ```
pub fn fill_dimensions(src_w: u32, src_h: u32, min_w: u32, min_h: u32) -> (u32, u32) {
    if src_w == 0 || src_h == 0 || min_w == 0 || min_h == 0 {
        return (0, 0);
    }
    let scale_w = min_w as f64 / src_w as f64;
    let scale_h = min_h as f64 / src_h as f64;
    let scale = scale_w.max(scale_h);
    let (w, h) = scaled(src_w, src_h, scale, (u32::MAX, u32::MAX));
    // Rounding must never leave the target uncovered.
    (w.max(min_w), h.max(min_h))
}

fn scaled(src_w: u32, src_h: u32, scale: f64, bound: (u32, u32)) -> (u32, u32) {
    let w = (src_w as f64 * scale).round().clamp(1.0, bound.0 as f64) as u32;
    let h = (src_h as f64 * scale).round().clamp(1.0, bound.1 as f64) as u32;
    (w, h)
}

/// Like [`fit_dimensions`] but never larger than the source.
pub fn thumbnail_dimensions(src_w: u32, src_h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if src_w <= max_w && src_h <= max_h && max_w > 0 && max_h > 0 {
        return (src_w, src_h);
    }
    fit_dimensions(src_w, src_h, max_w, max_h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_filter_weights() {
        assert_relative_eq!(FilterKind::Nearest.weight(0.0), 1.0);
        assert_relative_eq!(FilterKind::Nearest.weight(0.6), 0.0);
        assert_relative_eq!(FilterKind::Triangle.weight(0.5), 0.5);
        assert_relative_eq!(FilterKind::CatmullRom.weight(0.0), 1.0);
        assert_relative_eq!(FilterKind::CatmullRom.weight(1.0), 0.0, epsilon = 1e-6);
        assert_relative_eq!(FilterKind::Lanczos3.weight(0.0), 1.0);
        assert_relative_eq!(FilterKind::Lanczos3.weight(3.0), 0.0);
        assert!(FilterKind::Gaussian.weight(0.0) > FilterKind::Gaussian.weight(0.5));
    }

    #[test]
    fn test_constant_stays_constant() {
        let src = vec![0.5f32; 4 * 4 * 4];
        for filter in FilterKind::ALL {
            let dst = resize_f32(&src, 4, 4, 4, 9, 7, filter).unwrap();
            assert_eq!(dst.len(), 9 * 7 * 4);
            for v in dst {
                assert_relative_eq!(v, 0.5, epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_downscale() {
        let src = vec![0.25f32; 64 * 64 * 3];
        let dst = resize_f32(&src, 64, 64, 3, 16, 16, FilterKind::Lanczos3).unwrap();
        assert_eq!(dst.len(), 16 * 16 * 3);
    }

    #[test]
    fn test_length_mismatch() {
        assert!(resize_f32(&[0.0; 5], 2, 2, 1, 4, 4, FilterKind::Triangle).is_err());
    }

    #[test]
    fn test_zero_target() {
        let src = vec![1.0f32; 8 * 8];
        assert!(resize_f32(&src, 8, 8, 1, 0, 5, FilterKind::Nearest).unwrap().is_empty());

        let buf: SampleBuffer<u8> = SampleBuffer::new(8, 8, 3);
        let dst = resize(&buf, 4, 0, FilterKind::Lanczos3);
        assert_eq!(dst.dimensions(), (4, 0));
        assert!(dst.is_empty());
    }

    #[test]
    fn test_nearest_is_exact() {
        let src = SampleBuffer::from_raw(2, 2, 1, vec![10u8, 20, 30, 40]).unwrap();
        let dst = resize(&src, 4, 4, FilterKind::Nearest);
        assert_eq!(
            dst.as_slice(),
            &[10, 10, 20, 20, 10, 10, 20, 20, 30, 30, 40, 40, 30, 30, 40, 40]
        );
    }

    #[test]
    fn test_u16_saturates() {
        // Lanczos overshoots at a hard edge; samples must stay in range.
        let mut data = vec![0u16; 16];
        data[8..].fill(u16::MAX);
        let src = SampleBuffer::from_raw(16, 1, 1, data).unwrap();
        let dst = resize(&src, 40, 1, FilterKind::Lanczos3);
        assert_eq!(dst.as_slice().len(), 40);
        assert_eq!(*dst.as_slice().last().unwrap(), u16::MAX);
    }

    #[test]
    fn test_fit_dimensions() {
        assert_eq!(fit_dimensions(1920, 1080, 640, 640), (640, 360));
        assert_eq!(fit_dimensions(1080, 1920, 640, 640), (360, 640));
        assert_eq!(fit_dimensions(320, 240, 640, 480), (640, 480));
        assert_eq!(fit_dimensions(320, 240, 0, 480), (0, 0));
    }

    #[test]
    fn test_fill_dimensions() {
        assert_eq!(fill_dimensions(1920, 1080, 640, 640), (1138, 640));
        assert_eq!(fill_dimensions(10, 10, 3, 0), (0, 0));
    }

    #[test]
    fn test_thumbnail_never_upscales() {
        assert_eq!(thumbnail_dimensions(100, 50, 400, 400), (100, 50));
        assert_eq!(thumbnail_dimensions(400, 200, 100, 100), (100, 50));
        assert_eq!(thumbnail_dimensions(400, 200, 0, 100), (0, 0));
    }
}
