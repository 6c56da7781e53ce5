//! Geometric transformation operations.
//!
//! Index permutations only: every output sample is a bit-exact copy of an
//! input sample, and channel count is preserved.
//!
//! # Operations
//!
//! - [`crop`] - Extract region of interest, clamped to the image
//! - [`flip_h`] - Horizontal flip (mirror)
//! - [`flip_v`] - Vertical flip
//! - [`rotate_90_cw`], [`rotate_180`], [`rotate_90_ccw`] - Quarter turns
//!
//! # Example
//!
//! ```rust
//! use dynimg_core::SampleBuffer;
//! use dynimg_ops::transform::{crop, flip_h};
//!
//! let src: SampleBuffer<u8> = SampleBuffer::new(64, 64, 4);
//!
//! let flipped = flip_h(&src);
//! let cropped = crop(&src, 16, 16, 32, 32);
//! assert_eq!(cropped.dimensions(), (32, 32));
//! ```

use dynimg_core::{Sample, SampleBuffer};
use tracing::trace;

/// Crops `[x, x+w) x [y, y+h)` intersected with the image.
///
/// Never fails: a region hanging off the edge is clipped, and an origin
/// outside the image yields a zero-area buffer.
///
/// # Example
///
/// ```rust
/// use dynimg_core::SampleBuffer;
/// use dynimg_ops::transform::crop;
///
/// let src: SampleBuffer<u8> = SampleBuffer::new(10, 10, 1);
/// assert_eq!(crop(&src, 9, 0, 10, 1).dimensions(), (1, 1));
/// ```
pub fn crop<T: Sample>(src: &SampleBuffer<T>, x: u32, y: u32, w: u32, h: u32) -> SampleBuffer<T> {
    let (src_w, src_h) = src.dimensions();
    let x = x.min(src_w);
    let y = y.min(src_h);
    let w = w.min(src_w - x);
    let h = h.min(src_h - y);
    trace!(x, y, w, h, "crop");

    let channels = src.channels();
    let mut dst = SampleBuffer::new(w, h, channels);
    let c = channels as usize;
    for row in 0..h {
        let src_row = src.row(y + row);
        let start = x as usize * c;
        dst.row_mut(row)
            .copy_from_slice(&src_row[start..start + w as usize * c]);
    }
    dst
}

/// Flips image horizontally (left-right mirror).
pub fn flip_h<T: Sample>(src: &SampleBuffer<T>) -> SampleBuffer<T> {
    let (width, height) = src.dimensions();
    let c = src.channels() as usize;
    let mut dst = SampleBuffer::new(width, height, src.channels());

    for y in 0..height {
        let src_row = src.row(y);
        let dst_row = dst.row_mut(y);
        for (dst_px, src_px) in dst_row.chunks_exact_mut(c).zip(src_row.chunks_exact(c).rev()) {
            dst_px.copy_from_slice(src_px);
        }
    }

    dst
}

/// Flips image vertically (top-bottom mirror).
pub fn flip_v<T: Sample>(src: &SampleBuffer<T>) -> SampleBuffer<T> {
    let (width, height) = src.dimensions();
    let mut dst = SampleBuffer::new(width, height, src.channels());

    for y in 0..height {
        dst.row_mut(height - 1 - y).copy_from_slice(src.row(y));
    }

    dst
}

/// Rotates image 90 degrees clockwise. Width and height swap.
///
/// # Example
///
/// ```rust
/// use dynimg_core::SampleBuffer;
/// use dynimg_ops::transform::rotate_90_cw;
///
/// let src: SampleBuffer<f32> = SampleBuffer::new(4, 2, 3);
/// assert_eq!(rotate_90_cw(&src).dimensions(), (2, 4));
/// ```
pub fn rotate_90_cw<T: Sample>(src: &SampleBuffer<T>) -> SampleBuffer<T> {
    let (width, height) = src.dimensions();
    let mut dst = SampleBuffer::new(height, width, src.channels());

    for y in 0..height {
        for x in 0..width {
            // (x, y) -> (height-1-y, x)
            dst.pixel_mut(height - 1 - y, x).copy_from_slice(src.pixel(x, y));
        }
    }

    dst
}

/// Rotates image 180 degrees.
pub fn rotate_180<T: Sample>(src: &SampleBuffer<T>) -> SampleBuffer<T> {
    let c = src.channels() as usize;
    let mut dst = SampleBuffer::new(src.width(), src.height(), src.channels());

    for (dst_px, src_px) in dst
        .as_mut_slice()
        .chunks_exact_mut(c)
        .zip(src.as_slice().chunks_exact(c).rev())
    {
        dst_px.copy_from_slice(src_px);
    }

    dst
}

/// Rotates image 90 degrees counter-clockwise. Width and height swap.
pub fn rotate_90_ccw<T: Sample>(src: &SampleBuffer<T>) -> SampleBuffer<T> {
    let (width, height) = src.dimensions();
    let mut dst = SampleBuffer::new(height, width, src.channels());

    for y in 0..height {
        for x in 0..width {
            // (x, y) -> (y, width-1-x)
            dst.pixel_mut(y, width - 1 - x).copy_from_slice(src.pixel(x, y));
        }
    }

    dst
}
