//! Image filtering and convolution operations.
//!
//! - [`blur`] - Separable Gaussian blur
//! - [`unsharpen`] - Unsharp mask with a threshold
//! - [`filter3x3`] - Arbitrary 3x3 convolution
//!
//! All filters clamp at the edges (border samples are repeated) and run
//! over every channel, alpha included.
//!
//! # Example
//!
//! ```rust
//! use dynimg_ops::filter::{convolve, Kernel};
//!
//! let src = vec![0.5f32; 16 * 16 * 3];
//! let kernel = Kernel::box_blur(3);
//! let blurred = convolve(&src, 16, 16, 3, &kernel).unwrap();
//! assert_eq!(blurred.len(), src.len());
//! ```

use dynimg_core::{Sample, SampleBuffer};
use tracing::{debug, trace};

use crate::parallel::for_each_row;
use crate::{from_f32_vec, store, to_f32_vec, OpsError, OpsResult};

/// Convolution kernel for image filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Kernel {
    /// Kernel weights, row-major.
    pub data: Vec<f32>,
    /// Kernel width (odd).
    pub width: usize,
    /// Kernel height (odd).
    pub height: usize,
}

impl Kernel {
    /// Creates a new kernel from data.
    ///
    /// Width and height must be odd numbers.
    pub fn new(data: Vec<f32>, width: usize, height: usize) -> OpsResult<Self> {
        if width % 2 == 0 || height % 2 == 0 {
            return Err(OpsError::InvalidParameter(
                "kernel dimensions must be odd".into(),
            ));
        }
        if data.len() != width * height {
            return Err(OpsError::InvalidParameter(format!(
                "kernel data size {} doesn't match {}x{}",
                data.len(),
                width,
                height
            )));
        }
        Ok(Self { data, width, height })
    }

    /// Creates a 3x3 kernel, normalized by its sum when the sum is non-zero.
    ///
    /// # Example
    ///
    /// ```rust
    /// use dynimg_ops::filter::Kernel;
    ///
    /// let k = Kernel::from_3x3(&[1.0; 9]).unwrap();
    /// assert!((k.data[4] - 1.0 / 9.0).abs() < 1e-6);
    /// assert!(Kernel::from_3x3(&[1.0; 8]).is_err());
    /// ```
    pub fn from_3x3(taps: &[f32]) -> OpsResult<Self> {
        if taps.len() != 9 {
            return Err(OpsError::InvalidParameter(format!(
                "3x3 kernel needs 9 coefficients, got {}",
                taps.len()
            )));
        }
        let sum: f32 = taps.iter().sum();
        let data = if sum != 0.0 && sum.is_finite() {
            taps.iter().map(|t| t / sum).collect()
        } else {
            taps.to_vec()
        };
        Ok(Self {
            data,
            width: 3,
            height: 3,
        })
    }

    /// Creates a box blur kernel (simple average).
    pub fn box_blur(size: usize) -> Self {
        let size = if size % 2 == 0 { size + 1 } else { size };
        let count = size * size;
        let weight = 1.0 / count as f32;
        Self {
            data: vec![weight; count],
            width: size,
            height: size,
        }
    }

    /// Returns the kernel radius (half-size).
    #[inline]
    pub fn radius(&self) -> (usize, usize) {
        (self.width / 2, self.height / 2)
    }
}

/// One-dimensional normalized Gaussian taps with radius `ceil(3 * sigma)`.
///
/// # Example
///
/// ```rust
/// use dynimg_ops::filter::gaussian_taps;
///
/// let taps = gaussian_taps(1.0);
/// assert_eq!(taps.len(), 7);
/// assert!((taps.iter().sum::<f32>() - 1.0).abs() < 1e-5);
/// ```
pub fn gaussian_taps(sigma: f32) -> Vec<f32> {
    let radius = (3.0 * sigma).ceil().max(1.0) as i32;
    let sigma2 = 2.0 * sigma * sigma;
    let mut taps: Vec<f32> = (-radius..=radius)
        .map(|i| (-((i * i) as f32) / sigma2).exp())
        .collect();
    let sum: f32 = taps.iter().sum();
    taps.iter_mut().for_each(|t| *t /= sum);
    taps
}

/// Applies a convolution kernel to interleaved f32 samples.
pub fn convolve(
    src: &[f32],
    width: usize,
    height: usize,
    channels: usize,
    kernel: &Kernel,
) -> OpsResult<Vec<f32>> {
    trace!(width, height, channels, kernel_w = kernel.width, kernel_h = kernel.height, "convolve");

    let expected = width * height * channels;
    if src.len() != expected {
        return Err(OpsError::InvalidDimensions(format!(
            "expected {} samples, got {}",
            expected,
            src.len()
        )));
    }

    let mut dst = vec![0.0f32; expected];
    let (rx, ry) = kernel.radius();

    for_each_row(&mut dst, width * channels, |y, row| {
        for x in 0..width {
            let out = &mut row[x * channels..(x + 1) * channels];
            for ky in 0..kernel.height {
                let sy = (y as isize + ky as isize - ry as isize).clamp(0, height as isize - 1) as usize;
                for kx in 0..kernel.width {
                    // Source coordinates with edge clamping
                    let sx = (x as isize + kx as isize - rx as isize).clamp(0, width as isize - 1) as usize;
                    let kw = kernel.data[ky * kernel.width + kx];
                    let idx = (sy * width + sx) * channels;
                    for c in 0..channels {
                        out[c] += src[idx + c] * kw;
                    }
                }
            }
        }
    });

    Ok(dst)
}

/// Separable Gaussian blur of interleaved f32 samples.
pub fn gaussian_blur(
    src: &[f32],
    width: usize,
    height: usize,
    channels: usize,
    sigma: f32,
) -> OpsResult<Vec<f32>> {
    let expected = width * height * channels;
    if src.len() != expected {
        return Err(OpsError::InvalidDimensions(format!(
            "expected {} samples, got {}",
            expected,
            src.len()
        )));
    }
    if !(sigma > 0.0 && sigma.is_finite()) || expected == 0 {
        return Ok(src.to_vec());
    }

    let taps = gaussian_taps(sigma);
    let radius = (taps.len() / 2) as isize;
    trace!(width, height, channels, sigma, radius, "gaussian_blur");

    let row_len = width * channels;

    // Horizontal pass
    let mut temp = vec![0.0f32; expected];
    for_each_row(&mut temp, row_len, |y, row| {
        let src_row = &src[y * row_len..(y + 1) * row_len];
        for x in 0..width {
            for (k, &w) in taps.iter().enumerate() {
                let sx = (x as isize + k as isize - radius).clamp(0, width as isize - 1) as usize;
                for c in 0..channels {
                    row[x * channels + c] += src_row[sx * channels + c] * w;
                }
            }
        }
    });

    // Vertical pass
    let mut dst = vec![0.0f32; expected];
    for_each_row(&mut dst, row_len, |y, row| {
        for (k, &w) in taps.iter().enumerate() {
            let sy = (y as isize + k as isize - radius).clamp(0, height as isize - 1) as usize;
            let src_row = &temp[sy * row_len..(sy + 1) * row_len];
            for (d, &s) in row.iter_mut().zip(src_row) {
                *d += s * w;
            }
        }
    });

    Ok(dst)
}

fn blur_values<T: Sample>(src: &SampleBuffer<T>, sigma: f32) -> Vec<f32> {
    let values = to_f32_vec(src);
    let (w, h) = src.dimensions();
    // Length always matches the buffer's own shape.
    gaussian_blur(&values, w as usize, h as usize, src.channels() as usize, sigma)
        .unwrap_or(values)
}

/// Gaussian blur over all channels.
///
/// `sigma <= 0` or a non-finite sigma returns an unchanged copy.
pub fn blur<T: Sample>(src: &SampleBuffer<T>, sigma: f32) -> SampleBuffer<T> {
    if !(sigma > 0.0 && sigma.is_finite()) || src.is_empty() {
        return src.clone();
    }
    debug!(width = src.width(), height = src.height(), sigma, "blur");
    let (w, h) = src.dimensions();
    from_f32_vec(w, h, src.channels(), &blur_values(src, sigma), T::from_f32)
}

/// Unsharp mask.
///
/// With `d = v - blur(v)`, samples where `|d| * 255 > threshold` become
/// `clamp(v + d)`; the rest are kept as is. The threshold is in 8-bit units
/// for every sample type.
pub fn unsharpen<T: Sample>(src: &SampleBuffer<T>, sigma: f32, threshold: i32) -> SampleBuffer<T> {
    if src.is_empty() {
        return src.clone();
    }
    debug!(width = src.width(), height = src.height(), sigma, threshold, "unsharpen");
    let blurred = blur_values(src, sigma);
    let mut dst = src.clone();
    for (v, b) in dst.as_mut_slice().iter_mut().zip(blurred) {
        let f = v.to_f32();
        let d = f - b;
        if d.abs() * 255.0 > threshold as f32 {
            *v = store(f + d);
        }
    }
    dst
}

/// Convolves every channel with a 3x3 kernel.
///
/// The kernel must have exactly 9 coefficients; it is normalized by its sum
/// when that sum is non-zero. Results saturate to `[0, 1]` (normalized).
///
/// # Errors
///
/// [`OpsError::InvalidParameter`] for a kernel of the wrong length. Nothing
/// is allocated before the check.
pub fn filter3x3<T: Sample>(src: &SampleBuffer<T>, taps: &[f32]) -> OpsResult<SampleBuffer<T>> {
    let kernel = Kernel::from_3x3(taps)?;
    if src.is_empty() {
        return Ok(src.clone());
    }
    let (w, h) = src.dimensions();
    let c = src.channels();
    let out = convolve(&to_f32_vec(src), w as usize, h as usize, c as usize, &kernel)?;
    Ok(from_f32_vec(w, h, c, &out, store))
}
