//! Point color operations.
//!
//! Each operation touches color channels only; alpha (the last channel of a
//! 2- or 4-channel buffer) passes through unchanged. Results saturate to the
//! valid range of the sample type, `[0, 1]` for floats.
//!
//! # Example
//!
//! ```rust
//! use dynimg_core::SampleBuffer;
//! use dynimg_ops::color::brighten;
//!
//! let src = SampleBuffer::from_raw(1, 1, 4, vec![250u8, 10, 0, 7]).unwrap();
//! let dst = brighten(&src, 20);
//! assert_eq!(dst.as_slice(), &[255, 30, 20, 7]);
//! ```

use dynimg_core::{luminance_rec709, Sample, SampleBuffer};
use tracing::trace;

use crate::{color_channels, store};

/// Saturating store of a value in sample units.
#[inline]
fn saturate_units<T: Sample>(v: f32) -> T {
    if T::IS_FLOAT {
        T::from_f32(v.clamp(0.0, 1.0))
    } else {
        T::saturate(v)
    }
}

fn map_color<T: Sample>(src: &SampleBuffer<T>, f: impl Fn(T) -> T) -> SampleBuffer<T> {
    let mut dst = src.clone();
    map_color_in_place(&mut dst, f);
    dst
}

fn map_color_in_place<T: Sample>(buf: &mut SampleBuffer<T>, f: impl Fn(T) -> T) {
    let c = buf.channels() as usize;
    let cc = color_channels(buf.channels());
    for px in buf.as_mut_slice().chunks_exact_mut(c) {
        for v in &mut px[..cc] {
            *v = f(*v);
        }
    }
}

/// Adds `delta` to every color sample.
///
/// `delta` is in 8-bit units: it is scaled by `MAX / 255` for the sample
/// type (exact for u8, times 257 for u16, divided by 255 for f32).
pub fn brighten<T: Sample>(src: &SampleBuffer<T>, delta: i32) -> SampleBuffer<T> {
    let add = delta as f32 * T::MAX_VALUE / 255.0;
    trace!(delta, add, "brighten");
    map_color(src, |v| saturate_units(v.to_units() + add))
}

/// Adjusts contrast around mid-grey.
///
/// `percent = ((100 + c) / 100)^2`, then `v' = (v - 0.5) * percent + 0.5`
/// on normalized samples. Negative `c` reduces contrast.
pub fn contrast<T: Sample>(src: &SampleBuffer<T>, c: f32) -> SampleBuffer<T> {
    let percent = ((100.0 + c) / 100.0).powi(2);
    trace!(c, percent, "contrast");
    map_color(src, |v| store((v.to_f32() - 0.5) * percent + 0.5))
}

/// Inverts color samples in place: `v' = MAX - v`.
pub fn invert<T: Sample>(buf: &mut SampleBuffer<T>) {
    trace!(width = buf.width(), height = buf.height(), "invert");
    map_color_in_place(buf, |v| saturate_units(T::MAX_VALUE - v.to_units()));
}

/// Hue-rotation matrix for `degrees`, row-major.
pub fn hue_rotation_matrix(degrees: i32) -> [f32; 9] {
    let angle = (degrees as f64).to_radians();
    let cosv = angle.cos();
    let sinv = angle.sin();
    let m: [f64; 9] = [
        // Reds
        0.213 + cosv * 0.787 - sinv * 0.213,
        0.715 - cosv * 0.715 - sinv * 0.715,
        0.072 - cosv * 0.072 + sinv * 0.928,
        // Greens
        0.213 - cosv * 0.213 + sinv * 0.143,
        0.715 + cosv * 0.285 + sinv * 0.140,
        0.072 - cosv * 0.072 - sinv * 0.283,
        // Blues
        0.213 - cosv * 0.213 - sinv * 0.787,
        0.715 - cosv * 0.715 + sinv * 0.715,
        0.072 + cosv * 0.928 + sinv * 0.072,
    ];
    m.map(|v| v as f32)
}

/// Rotates hue by `degrees`. Buffers without RGB are returned unchanged.
pub fn huerotate<T: Sample>(src: &SampleBuffer<T>, degrees: i32) -> SampleBuffer<T> {
    if color_channels(src.channels()) < 3 {
        return src.clone();
    }
    let m = hue_rotation_matrix(degrees);
    trace!(degrees, "huerotate");
    let c = src.channels() as usize;
    let mut dst = src.clone();
    for px in dst.as_mut_slice().chunks_exact_mut(c) {
        let (r, g, b) = (px[0].to_f32(), px[1].to_f32(), px[2].to_f32());
        px[0] = store(m[0] * r + m[1] * g + m[2] * b);
        px[1] = store(m[3] * r + m[4] * g + m[5] * b);
        px[2] = store(m[6] * r + m[7] * g + m[8] * b);
    }
    dst
}

/// Rec.709 luma of an RGB(A) buffer.
///
/// RGB becomes 1 channel, RGBA becomes luma plus alpha; luma buffers are
/// copied as is.
pub fn grayscale<T: Sample>(src: &SampleBuffer<T>) -> SampleBuffer<T> {
    let c = src.channels();
    if color_channels(c) < 3 {
        return src.clone();
    }
    let out_c = if c == 4 { 2 } else { 1 };
    let mut dst = SampleBuffer::new(src.width(), src.height(), out_c);
    for (d, s) in dst
        .as_mut_slice()
        .chunks_exact_mut(out_c as usize)
        .zip(src.as_slice().chunks_exact(c as usize))
    {
        d[0] = T::from_f32(luminance_rec709(s[0].to_f32(), s[1].to_f32(), s[2].to_f32()));
        if out_c == 2 {
            d[1] = s[3];
        }
    }
    dst
}
